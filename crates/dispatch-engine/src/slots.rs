//! Bookable slot enumeration across a date range.
//!
//! For each date: resolve the day's schedule, project committed
//! appointments and breaks into the date's local minute space, then step
//! candidate start times across the working window at the query's
//! granularity. A candidate survives when its buffer-expanded occupied
//! range stays inside the working window, collides with nothing, and does
//! not start before the query's `now` anchor.
//!
//! Lookup failures are contained per date: the date is logged and skipped
//! so one bad day cannot abort a whole range query.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::availability::{resolve_day, DayAvailability};
use crate::conflict::fetch_service;
use crate::error::{Result, ScheduleError};
use crate::model::{MinuteWindow, Service, Slot};
use crate::store::SchedulingStore;
use crate::temporal;

/// Slot step used when a query does not specify one.
pub const DEFAULT_GRANULARITY_MINUTES: i32 = 15;

/// A slot-generation request.
///
/// `now` is caller-supplied: the engine never reads the system clock, which
/// keeps generation reproducible and testable. `timezone` is the resource's
/// business timezone (IANA name), the frame in which availability windows
/// are expressed.
#[derive(Debug, Clone)]
pub struct SlotQuery {
    pub service_id: String,
    pub resource_id: String,
    /// First date of the range (inclusive, business-local).
    pub from: NaiveDate,
    /// Last date of the range (inclusive, business-local).
    pub to: NaiveDate,
    pub granularity_minutes: i32,
    pub timezone: Tz,
    pub now: DateTime<Utc>,
}

impl SlotQuery {
    pub fn new(
        service_id: impl Into<String>,
        resource_id: impl Into<String>,
        from: NaiveDate,
        to: NaiveDate,
        timezone: Tz,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            resource_id: resource_id.into(),
            from,
            to,
            granularity_minutes: DEFAULT_GRANULARITY_MINUTES,
            timezone,
            now,
        }
    }

    pub fn with_granularity(mut self, minutes: i32) -> Self {
        self.granularity_minutes = minutes;
        self
    }
}

/// Enumerate bookable slots for the query's service/resource/date range.
///
/// Slots are emitted per date in ascending start order, dates ascending.
/// Dates whose availability lookup fails are skipped (fail-closed); the
/// caller only observes fewer returned slots.
///
/// # Errors
///
/// [`ScheduleError::InvalidSchedulingRequest`] for an inverted date range,
/// non-positive granularity, or an unknown/unusable service. All of these
/// are checked before any per-date work.
pub fn resolve_available_slots(
    store: &impl SchedulingStore,
    query: &SlotQuery,
) -> Result<Vec<Slot>> {
    if query.from > query.to {
        return Err(ScheduleError::InvalidSchedulingRequest(format!(
            "date range start {} is after end {}",
            query.from, query.to
        )));
    }
    if query.granularity_minutes <= 0 {
        return Err(ScheduleError::InvalidSchedulingRequest(format!(
            "granularity must be positive, got {}",
            query.granularity_minutes
        )));
    }
    let service = fetch_service(store, &query.service_id)?;

    let mut slots = Vec::new();
    let mut date = query.from;
    loop {
        match day_slots(store, query, &service, date) {
            Ok(mut day) => slots.append(&mut day),
            Err(ScheduleError::AvailabilityLookupFailed(err)) => {
                warn!(
                    date = %date,
                    resource = %query.resource_id,
                    error = %err,
                    "skipping date after failed availability lookup"
                );
            }
            Err(other) => return Err(other),
        }

        if date == query.to {
            break;
        }
        date = date.succ_opt().ok_or_else(|| {
            ScheduleError::InvalidSchedulingRequest(format!(
                "date range end {} overflows the calendar",
                query.to
            ))
        })?;
    }
    Ok(slots)
}

/// Candidate enumeration for a single resolved date.
fn day_slots(
    store: &impl SchedulingStore,
    query: &SlotQuery,
    service: &Service,
    date: NaiveDate,
) -> Result<Vec<Slot>> {
    let DayAvailability::Open { window, breaks } = resolve_day(store, &query.resource_id, date)?
    else {
        return Ok(Vec::new());
    };

    let tz = query.timezone;
    let day_start = temporal::minutes_to_instant(date, window.start, tz)?;
    let day_end = temporal::minutes_to_instant(date, window.end, tz)?;

    // Project everything that occupies time on this date into its local
    // minute space: appointments intersecting the working day, clipped to
    // the (possibly overnight-extended) window, then the break windows.
    let mut occupied: Vec<MinuteWindow> = Vec::new();
    for appointment in
        store.appointments_overlapping(&query.resource_id, day_start, day_end, None)?
    {
        let start = temporal::minutes_on(date, appointment.start, tz).max(i64::from(window.start));
        let end = temporal::minutes_on(date, appointment.end, tz).min(i64::from(window.end));
        if end > start {
            occupied.push(MinuteWindow::new(start as i32, end as i32));
        }
    }
    occupied.extend(breaks.iter().copied());

    let duration = service.duration_minutes as i32;
    let buffer = service.buffer_minutes as i32;

    let mut slots = Vec::new();
    let mut candidate = window.start;
    while candidate + duration <= window.end {
        let occupied_range =
            MinuteWindow::new(candidate - buffer, candidate + duration + buffer);
        let contained =
            occupied_range.start >= window.start && occupied_range.end <= window.end;

        if contained && !occupied.iter().any(|period| period.overlaps(&occupied_range)) {
            let start = temporal::minutes_to_instant(date, candidate, tz)?;
            if start >= query.now {
                let end = temporal::minutes_to_instant(date, candidate + duration, tz)?;
                slots.push(Slot {
                    start,
                    end,
                    resource_id: query.resource_id.clone(),
                    service_id: query.service_id.clone(),
                    date,
                });
            }
        }
        candidate += query.granularity_minutes;
    }

    // Wall-clock steps inside a spring-forward gap collapse onto the same
    // instant; keep the first.
    slots.dedup_by(|a, b| a.start == b.start);
    Ok(slots)
}
