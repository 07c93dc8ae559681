//! Domain records shared across the scheduling core.
//!
//! Appointments, services, and the availability tiers are read-only inputs
//! owned by the surrounding booking system; this core never mutates them.
//! Waypoints and slots are ephemeral inputs/outputs of single computations.
//!
//! # Time Model
//!
//! Appointments and slots carry absolute instants (`DateTime<Utc>`).
//! Availability windows are wall-clock times in the resource's business
//! timezone, stored as `"HH:MM"` strings and resolved to minutes since
//! local midnight by the [`crate::temporal`] layer. A resolved window is a
//! half-open minute interval; overnight shifts extend past 1440.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booked appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    /// Whether an appointment in this state occupies its resource's time.
    ///
    /// Only pending and confirmed appointments participate in conflict
    /// checks; cancelled and finished ones free their window.
    #[inline]
    pub fn blocks_time(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }
}

/// A committed booking for one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub resource_id: String,
    /// Service window start (absolute instant).
    pub start: DateTime<Utc>,
    /// Service window end (absolute instant, exclusive).
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub service_id: String,
}

/// A bookable service type.
///
/// Immutable for the duration of a scheduling computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    /// Nominal service duration.
    pub duration_minutes: i64,
    /// Setup/teardown margin applied symmetrically before and after the
    /// service window when checking conflicts.
    pub buffer_minutes: i64,
}

/// Recurring weekly availability pattern for one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultAvailability {
    pub resource_id: String,
    pub weekday: Weekday,
    pub is_working_day: bool,
    /// Working window bounds as local `"HH:MM"`; both must be present for
    /// the day to resolve open.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
}

/// Date-specific availability record taking precedence over the weekly
/// default for that date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideAvailability {
    pub resource_id: String,
    pub date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
}

/// A calendar holiday. Global holidays close every resource's day unless an
/// override explicitly marks the resource available on that date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub is_global: bool,
    pub name: Option<String>,
}

/// A geographic stop to be visited during a field route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

impl Waypoint {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            name: None,
        }
    }

    /// Coordinates as a `(lat, lng)` pair.
    #[inline]
    pub fn coords(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// A candidate bookable start/end produced by the slot generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub resource_id: String,
    pub service_id: String,
    /// Business-local calendar date the slot belongs to.
    pub date: NaiveDate,
}

/// A time interval in local minutes since midnight, `[start, end)`.
///
/// Half-open: includes start, excludes end. `end` may exceed 1440 when the
/// window spans midnight (overnight shift); all interval math for that date
/// then operates in the extended minute space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteWindow {
    /// Interval start (minutes, inclusive).
    pub start: i32,
    /// Interval end (minutes, exclusive).
    pub end: i32,
}

impl MinuteWindow {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Length of this window in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i32 {
        self.end - self.start
    }

    /// Whether a minute offset falls within this window.
    #[inline]
    pub fn contains(&self, minute: i32) -> bool {
        minute >= self.start && minute < self.end
    }

    /// Whether two windows overlap. Touching windows do not.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}
