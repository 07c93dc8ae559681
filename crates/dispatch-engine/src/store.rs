//! Read-only persistence seams the scheduling core consumes.
//!
//! These traits are intentionally minimal and backend-agnostic. The
//! surrounding booking system implements them over its own database; tests
//! and embedded deployments use [`InMemoryStore`].
//!
//! Not-found and transient failure are distinguishable conditions:
//! `Ok(None)` (or an empty list) means the record does not exist, while
//! `Err(StoreError)` means the read itself failed and the caller must treat
//! the day as unresolvable (fail-closed, never fail-open).

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use thiserror::Error;

use crate::model::{Appointment, DefaultAvailability, Holiday, OverrideAvailability, Service};

/// A transient persistence read failure.
#[derive(Debug, Clone, Error)]
#[error("store read failed: {0}")]
pub struct StoreError(pub String);

/// Persistence reads consumed by availability resolution, conflict
/// checking, and slot generation.
///
/// All methods take `&self`; the core issues only reads and is reentrant
/// across resources and dates. The surrounding system's check-then-insert
/// sequence is *not* atomic through this interface; the write path must
/// enforce that (exclusion constraint or serializable transaction around
/// check + book).
pub trait SchedulingStore {
    /// Date-specific availability override for a resource, if any.
    fn override_for(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> Result<Option<OverrideAvailability>, StoreError>;

    /// Recurring weekly availability for a resource on a weekday, if any.
    fn default_for(
        &self,
        resource_id: &str,
        weekday: Weekday,
    ) -> Result<Option<DefaultAvailability>, StoreError>;

    /// Holiday record for a calendar date, if any.
    fn holiday_on(&self, date: NaiveDate) -> Result<Option<Holiday>, StoreError>;

    /// Service metadata (duration and buffer), if the service exists.
    fn service(&self, service_id: &str) -> Result<Option<Service>, StoreError>;

    /// Time-blocking appointments for a resource whose raw stored interval
    /// overlaps `[start, end)` under the half-open rule
    /// (`existing.start < end && existing.end > start`).
    ///
    /// Only pending/confirmed appointments are returned; `exclude` removes
    /// one appointment by id (used when re-checking during an update).
    fn appointments_overlapping(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&str>,
    ) -> Result<Vec<Appointment>, StoreError>;
}

/// Owned, injected keyed store over plain vectors.
///
/// Serves as the reference implementation of the [`SchedulingStore`]
/// contract and as the test fixture backend. Scheduling computations hold a
/// shared reference, so the store can be cloned per request or wrapped in
/// an `Arc` for concurrent handlers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    overrides: Vec<OverrideAvailability>,
    defaults: Vec<DefaultAvailability>,
    holidays: Vec<Holiday>,
    services: Vec<Service>,
    appointments: Vec<Appointment>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_default(mut self, default: DefaultAvailability) -> Self {
        self.defaults.push(default);
        self
    }

    pub fn with_override(mut self, record: OverrideAvailability) -> Self {
        self.overrides.push(record);
        self
    }

    pub fn with_holiday(mut self, holiday: Holiday) -> Self {
        self.holidays.push(holiday);
        self
    }

    pub fn with_appointment(mut self, appointment: Appointment) -> Self {
        self.appointments.push(appointment);
        self
    }
}

impl SchedulingStore for InMemoryStore {
    fn override_for(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> Result<Option<OverrideAvailability>, StoreError> {
        Ok(self
            .overrides
            .iter()
            .find(|o| o.resource_id == resource_id && o.date == date)
            .cloned())
    }

    fn default_for(
        &self,
        resource_id: &str,
        weekday: Weekday,
    ) -> Result<Option<DefaultAvailability>, StoreError> {
        Ok(self
            .defaults
            .iter()
            .find(|d| d.resource_id == resource_id && d.weekday == weekday)
            .cloned())
    }

    fn holiday_on(&self, date: NaiveDate) -> Result<Option<Holiday>, StoreError> {
        Ok(self.holidays.iter().find(|h| h.date == date).cloned())
    }

    fn service(&self, service_id: &str) -> Result<Option<Service>, StoreError> {
        Ok(self.services.iter().find(|s| s.id == service_id).cloned())
    }

    fn appointments_overlapping(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&str>,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .appointments
            .iter()
            .filter(|a| a.resource_id == resource_id)
            .filter(|a| a.status.blocks_time())
            .filter(|a| exclude != Some(a.id.as_str()))
            .filter(|a| crate::conflict::intervals_overlap(a.start, a.end, start, end))
            .cloned()
            .collect())
    }
}
