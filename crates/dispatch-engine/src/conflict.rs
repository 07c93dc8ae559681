//! Buffer-aware conflict detection against committed appointments.
//!
//! A proposed service window is expanded symmetrically by the service's
//! buffer into the *occupied interval*, then tested against the raw stored
//! intervals of pending/confirmed appointments under the half-open overlap
//! rule. Buffers are one-directional: only the incoming request's buffer
//! widens the probe; the found appointments match on their raw stored
//! intervals.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, ScheduleError};
use crate::model::{Appointment, Service};
use crate::store::SchedulingStore;

/// Half-open overlap test for absolute intervals: `[a_start, a_end)` vs
/// `[b_start, b_end)`. Intervals that merely touch do not overlap.
#[inline]
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Find committed appointments that collide with a proposed service window.
///
/// The window `[start, end)` is expanded by the service's buffer on both
/// sides before querying. An empty result means the window is bookable.
/// `exclude` removes one appointment from consideration, for re-checks
/// while updating an existing booking.
///
/// # Errors
///
/// - [`ScheduleError::InvalidSchedulingRequest`] when `start >= end`, the
///   service is unknown, or its metadata is unusable. Checked before any
///   persistence query.
/// - [`ScheduleError::AvailabilityLookupFailed`] when the appointment read
///   fails.
pub fn check_conflicts(
    store: &impl SchedulingStore,
    service_id: &str,
    resource_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<&str>,
) -> Result<Vec<Appointment>> {
    if start >= end {
        return Err(ScheduleError::InvalidSchedulingRequest(format!(
            "interval start {start} is not before end {end}"
        )));
    }

    let service = fetch_service(store, service_id)?;

    let buffer = Duration::minutes(service.buffer_minutes);
    let occupied_start = start - buffer;
    let occupied_end = end + buffer;

    Ok(store.appointments_overlapping(resource_id, occupied_start, occupied_end, exclude)?)
}

/// Load service metadata, failing fast when it is missing or unusable.
pub(crate) fn fetch_service(store: &impl SchedulingStore, service_id: &str) -> Result<Service> {
    let service = store.service(service_id)?.ok_or_else(|| {
        ScheduleError::InvalidSchedulingRequest(format!("unknown service '{service_id}'"))
    })?;
    if service.duration_minutes <= 0 {
        return Err(ScheduleError::InvalidSchedulingRequest(format!(
            "service '{service_id}' has non-positive duration {}",
            service.duration_minutes
        )));
    }
    if service.buffer_minutes < 0 {
        return Err(ScheduleError::InvalidSchedulingRequest(format!(
            "service '{service_id}' has negative buffer {}",
            service.buffer_minutes
        )));
    }
    Ok(service)
}
