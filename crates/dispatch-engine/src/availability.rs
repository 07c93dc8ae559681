//! Per-day availability resolution for one resource.
//!
//! Merges three tiered sources into a single authoritative schedule for a
//! resource on a calendar date:
//!
//! 1. A date-specific [`OverrideAvailability`] — wins outright.
//! 2. A global [`Holiday`] — closes the day unless an override marked the
//!    resource available on that date.
//! 3. The recurring weekly [`DefaultAvailability`] for the date's weekday.
//!
//! Resolution is fail-closed: a failed lookup surfaces as
//! [`ScheduleError::AvailabilityLookupFailed`] and the caller skips the
//! date; an unresolvable day is never treated as open.
//!
//! [`OverrideAvailability`]: crate::model::OverrideAvailability
//! [`Holiday`]: crate::model::Holiday
//! [`DefaultAvailability`]: crate::model::DefaultAvailability
//! [`ScheduleError::AvailabilityLookupFailed`]: crate::error::ScheduleError::AvailabilityLookupFailed

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::model::MinuteWindow;
use crate::store::SchedulingStore;
use crate::temporal::{parse_local_time, MINUTES_PER_DAY};

/// The resolved schedule for a single resource-day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DayAvailability {
    /// The resource does not work this date.
    Closed,
    /// The resource works `window`, minus the listed break windows.
    ///
    /// All windows are local minutes since the date's midnight; an
    /// overnight shift has `window.end > 1440` and interval math for the
    /// date operates in that extended space.
    Open {
        window: MinuteWindow,
        breaks: Vec<MinuteWindow>,
    },
}

impl DayAvailability {
    pub fn is_open(&self) -> bool {
        matches!(self, DayAvailability::Open { .. })
    }
}

/// Resolve the authoritative working schedule for `resource_id` on `date`.
///
/// Each tier short-circuits: an override marked unavailable closes the day
/// immediately; an override with both window bounds opens it immediately. An
/// override marked available *without* bounds defeats a global holiday but
/// leaves the window to the weekly default.
///
/// # Errors
///
/// [`ScheduleError::AvailabilityLookupFailed`] when any tier's read fails;
/// [`ScheduleError::InvalidTimeFormat`] when a stored window bound is
/// malformed.
///
/// [`ScheduleError::AvailabilityLookupFailed`]: crate::error::ScheduleError::AvailabilityLookupFailed
/// [`ScheduleError::InvalidTimeFormat`]: crate::error::ScheduleError::InvalidTimeFormat
pub fn resolve_day(
    store: &impl SchedulingStore,
    resource_id: &str,
    date: NaiveDate,
) -> Result<DayAvailability> {
    // Tier 1: date-specific override.
    let mut override_marked_available = false;
    if let Some(record) = store.override_for(resource_id, date)? {
        if !record.is_available {
            return Ok(DayAvailability::Closed);
        }
        override_marked_available = true;
        if let (Some(start), Some(end)) = (&record.start_time, &record.end_time) {
            let window = working_window(start, end)?;
            let breaks = break_windows(&record.break_start, &record.break_end, &window)?;
            return Ok(DayAvailability::Open { window, breaks });
        }
        // Available but unbounded: holiday is defeated, window comes from
        // the weekly default below.
    }

    // Tier 2: global holiday.
    if !override_marked_available {
        if let Some(holiday) = store.holiday_on(date)? {
            if holiday.is_global {
                return Ok(DayAvailability::Closed);
            }
        }
    }

    // Tier 3: recurring weekly default.
    let Some(default) = store.default_for(resource_id, date.weekday())? else {
        return Ok(DayAvailability::Closed);
    };
    if !default.is_working_day {
        return Ok(DayAvailability::Closed);
    }
    let (Some(start), Some(end)) = (&default.start_time, &default.end_time) else {
        return Ok(DayAvailability::Closed);
    };

    let window = working_window(start, end)?;
    let breaks = break_windows(&default.break_start, &default.break_end, &window)?;
    Ok(DayAvailability::Open { window, breaks })
}

/// Parse window bounds and normalize overnight shifts into the extended
/// minute space (end < start means the shift spans midnight).
fn working_window(start: &str, end: &str) -> Result<MinuteWindow> {
    let start_minutes = parse_local_time(start)?;
    let mut end_minutes = parse_local_time(end)?;
    if end_minutes < start_minutes {
        end_minutes += MINUTES_PER_DAY;
    }
    Ok(MinuteWindow::new(start_minutes, end_minutes))
}

/// Parse the optional break pair, lifting it into the overnight-extended
/// space when the working window crosses midnight and the break falls on
/// the far side.
fn break_windows(
    break_start: &Option<String>,
    break_end: &Option<String>,
    window: &MinuteWindow,
) -> Result<Vec<MinuteWindow>> {
    let (Some(start), Some(end)) = (break_start, break_end) else {
        return Ok(Vec::new());
    };

    let start_minutes = parse_local_time(start)?;
    let mut end_minutes = parse_local_time(end)?;
    if end_minutes < start_minutes {
        end_minutes += MINUTES_PER_DAY;
    }
    if end_minutes == start_minutes {
        return Ok(Vec::new());
    }

    let mut window_break = MinuteWindow::new(start_minutes, end_minutes);
    if window.end > MINUTES_PER_DAY && window_break.end <= window.start {
        // A 02:00-02:30 break inside a 22:00-06:00 shift belongs to the
        // next calendar morning.
        window_break = MinuteWindow::new(
            window_break.start + MINUTES_PER_DAY,
            window_break.end + MINUTES_PER_DAY,
        );
    }
    Ok(vec![window_break])
}
