//! Wall-clock ↔ instant conversion through IANA timezone rules.
//!
//! Every local/absolute conversion in the engine goes through this module;
//! no other component may assume a fixed UTC offset. Conversions use real
//! timezone rules via [`chrono_tz`], so daylight-saving transitions are
//! handled instead of silently shifting windows by an hour twice a year.
//!
//! Times of day are represented as minutes since local midnight. Overnight
//! working windows extend the minute space past 1440: "22:00"–"06:00"
//! normalizes to `[1320, 1800)`, and [`minutes_to_instant`] rolls the extra
//! minutes into the following calendar date.
//!
//! # DST Policy
//!
//! - Ambiguous local times (fall-back hour occurs twice) resolve to the
//!   *earlier* instant, keeping per-date slot ordering monotone.
//! - Nonexistent local times (spring-forward gap) roll forward to the first
//!   representable wall time.

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

/// Minutes in one (non-transition) day.
pub const MINUTES_PER_DAY: i32 = 1440;

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a wall-clock `"HH:MM"` string into minutes since local midnight.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTimeFormat`] for anything that is not a
/// numeric `HH:MM` within 00:00–23:59.
pub fn parse_local_time(value: &str) -> Result<i32> {
    let (hours_str, minutes_str) = value
        .split_once(':')
        .ok_or_else(|| invalid_time(value))?;

    if hours_str.is_empty() || minutes_str.len() != 2 {
        return Err(invalid_time(value));
    }
    if !hours_str.bytes().all(|b| b.is_ascii_digit())
        || !minutes_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid_time(value));
    }

    let hours: i32 = hours_str.parse().map_err(|_| invalid_time(value))?;
    let minutes: i32 = minutes_str.parse().map_err(|_| invalid_time(value))?;
    if hours > 23 || minutes > 59 {
        return Err(invalid_time(value));
    }

    Ok(hours * 60 + minutes)
}

fn invalid_time(value: &str) -> ScheduleError {
    ScheduleError::InvalidTimeFormat(format!("'{value}': expected HH:MM within 00:00-23:59"))
}

// ── Local → absolute ────────────────────────────────────────────────────────

/// Convert a business-local date and `"HH:MM"` time to an absolute instant.
///
/// # Errors
///
/// [`ScheduleError::InvalidTimeFormat`] if the time string is malformed.
pub fn local_to_instant(date: NaiveDate, time: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let minutes = parse_local_time(time)?;
    minutes_to_instant(date, minutes, tz)
}

/// Convert minutes-since-midnight of `date` to an absolute instant.
///
/// Accepts the overnight-extended minute space: minutes ≥ 1440 roll the
/// date forward, negative minutes roll it back. Used for both window bounds
/// and buffer-expanded candidate edges.
///
/// # Errors
///
/// [`ScheduleError::InvalidSchedulingRequest`] if the rolled date leaves
/// the representable calendar range.
pub fn minutes_to_instant(date: NaiveDate, minutes: i32, tz: Tz) -> Result<DateTime<Utc>> {
    let days = minutes.div_euclid(MINUTES_PER_DAY);
    let minute_of_day = minutes.rem_euclid(MINUTES_PER_DAY);

    let target_date = date
        .checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| {
            ScheduleError::InvalidSchedulingRequest(format!(
                "minute offset {minutes} from {date} overflows the calendar"
            ))
        })?;

    let time = NaiveTime::from_hms_opt(minute_of_day as u32 / 60, minute_of_day as u32 % 60, 0)
        .ok_or_else(|| {
            ScheduleError::InvalidSchedulingRequest(format!(
                "minute-of-day {minute_of_day} is not a valid wall time"
            ))
        })?;

    Ok(resolve_local(tz, target_date.and_time(time)).with_timezone(&Utc))
}

/// Resolve a naive local datetime against timezone rules.
///
/// Total over the DST policy above: ambiguous → earlier instant, gap →
/// first representable wall time after the gap.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        LocalResult::None => {
            // Transition gaps are at most a few hours; probe forward in
            // 15-minute steps until the wall clock exists again.
            let mut probe = naive;
            for _ in 0..(MINUTES_PER_DAY / 15) {
                probe += Duration::minutes(15);
                match tz.from_local_datetime(&probe) {
                    LocalResult::Single(dt) => return dt,
                    LocalResult::Ambiguous(earlier, _) => return earlier,
                    LocalResult::None => continue,
                }
            }
            // Unreachable for real tzdata; interpret as UTC rather than panic.
            tz.from_utc_datetime(&naive)
        }
    }
}

// ── Absolute → local ────────────────────────────────────────────────────────

/// Wall-clock minutes since local midnight of the instant's own local date.
pub fn instant_to_local_minutes(instant: DateTime<Utc>, tz: Tz) -> i32 {
    let local = instant.with_timezone(&tz);
    (local.hour() * 60 + local.minute()) as i32
}

/// Wall-clock minutes of `instant` relative to `date`'s local midnight.
///
/// May be negative (instant before the date) or beyond 1440 (after it);
/// this is the projection primitive that maps appointments into a date's
/// overnight-extended minute space.
pub fn minutes_on(date: NaiveDate, instant: DateTime<Utc>, tz: Tz) -> i64 {
    let local = instant.with_timezone(&tz);
    let day_delta = (local.date_naive() - date).num_days();
    day_delta * i64::from(MINUTES_PER_DAY)
        + i64::from(local.hour()) * 60
        + i64::from(local.minute())
}

// ── Tests ───────────────────────────────────────────────────────────────────
