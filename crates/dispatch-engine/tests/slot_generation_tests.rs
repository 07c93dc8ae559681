//! Tests for slot enumeration across date ranges.

use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

use dispatch_engine::store::StoreError;
use dispatch_engine::{
    resolve_available_slots, temporal, Appointment, AppointmentStatus, DefaultAvailability,
    Holiday, InMemoryStore, OverrideAvailability, ScheduleError, SchedulingStore, Service, Slot,
    SlotQuery,
};

const TZ: Tz = New_York;
const RESOURCE: &str = "crew-1";
const SERVICE: &str = "install";

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2026-03-16, a Monday.
fn monday() -> NaiveDate {
    date(2026, 3, 16)
}

fn long_ago() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn weekday_hours(
    weekday: Weekday,
    start: &str,
    end: &str,
    lunch: Option<(&str, &str)>,
) -> DefaultAvailability {
    DefaultAvailability {
        resource_id: RESOURCE.to_string(),
        weekday,
        is_working_day: true,
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        break_start: lunch.map(|(s, _)| s.to_string()),
        break_end: lunch.map(|(_, e)| e.to_string()),
    }
}

fn service(duration_minutes: i64, buffer_minutes: i64) -> Service {
    Service {
        id: SERVICE.to_string(),
        duration_minutes,
        buffer_minutes,
    }
}

fn local_appointment(id: &str, day: NaiveDate, start: &str, end: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        resource_id: RESOURCE.to_string(),
        start: temporal::local_to_instant(day, start, TZ).unwrap(),
        end: temporal::local_to_instant(day, end, TZ).unwrap(),
        status: AppointmentStatus::Confirmed,
        service_id: SERVICE.to_string(),
    }
}

fn query(from: NaiveDate, to: NaiveDate) -> SlotQuery {
    SlotQuery::new(SERVICE, RESOURCE, from, to, TZ, long_ago())
}

fn local_starts(slots: &[Slot]) -> Vec<i32> {
    slots
        .iter()
        .map(|s| temporal::instant_to_local_minutes(s.start, TZ))
        .collect()
}

// ── The Monday scenario ─────────────────────────────────────────────────────
//
// Monday 09:00–17:00 with a 12:00–13:00 break, a confirmed 10:00–11:00
// appointment, service duration 60 with buffer 15. The buffer must clear
// the window bounds and every occupied period, which pins the first valid
// start to 13:15.

fn monday_scenario_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_service(service(60, 15))
        .with_default(weekday_hours(
            Weekday::Mon,
            "09:00",
            "17:00",
            Some(("12:00", "13:00")),
        ))
        .with_appointment(local_appointment("existing", monday(), "10:00", "11:00"))
}

#[test]
fn monday_scenario_yields_afternoon_slots_only() {
    let slots = resolve_available_slots(&monday_scenario_store(), &query(monday(), monday()))
        .unwrap();

    // 13:15 through 15:45 inclusive at 15-minute steps.
    let expected: Vec<i32> = (0..=10).map(|k| 795 + 15 * k).collect();
    assert_eq!(local_starts(&slots), expected);
}

#[test]
fn monday_scenario_excludes_appointment_neighborhood() {
    let slots = resolve_available_slots(&monday_scenario_store(), &query(monday(), monday()))
        .unwrap();
    let starts = local_starts(&slots);

    // Anything whose buffered range would touch the 10:00–11:00 appointment
    // (expanded probe [09:45, 11:15]) is out, as is the break neighborhood.
    for excluded in [540, 555, 600, 645, 660, 675, 705, 720, 765, 780] {
        assert!(!starts.contains(&excluded), "start {excluded} should be excluded");
    }
}

#[test]
fn monday_scenario_slot_instants_are_correct() {
    let slots = resolve_available_slots(&monday_scenario_store(), &query(monday(), monday()))
        .unwrap();
    let first = &slots[0];

    // 13:15 EDT = 17:15 UTC on 2026-03-16.
    assert_eq!(first.start, Utc.with_ymd_and_hms(2026, 3, 16, 17, 15, 0).unwrap());
    assert_eq!(first.end, Utc.with_ymd_and_hms(2026, 3, 16, 18, 15, 0).unwrap());
    assert_eq!(first.date, monday());
    assert_eq!(first.resource_id, RESOURCE);
    assert_eq!(first.service_id, SERVICE);
}

#[test]
fn every_slot_occupied_range_is_contained_and_clear() {
    let store = monday_scenario_store();
    let slots = resolve_available_slots(&store, &query(monday(), monday())).unwrap();
    assert!(!slots.is_empty());

    for slot in &slots {
        let start = temporal::instant_to_local_minutes(slot.start, TZ);
        let end = temporal::instant_to_local_minutes(slot.end, TZ);
        let (buffered_start, buffered_end) = (start - 15, end + 15);

        assert!(buffered_start >= 540 && buffered_end <= 1020, "outside window");
        // Appointment 600–660 and break 720–780, half-open.
        assert!(buffered_end <= 600 || buffered_start >= 660, "hits appointment");
        assert!(buffered_end <= 720 || buffered_start >= 780, "hits break");
    }
}

#[test]
fn coarser_granularity_steps_from_window_start() {
    let slots = resolve_available_slots(
        &monday_scenario_store(),
        &query(monday(), monday()).with_granularity(30),
    )
    .unwrap();

    // 30-minute candidates aligned to 09:00; the first clear one is 13:30.
    assert_eq!(local_starts(&slots), vec![810, 840, 870, 900, 930]);
}

// ── Now-clamping ────────────────────────────────────────────────────────────

#[test]
fn slots_before_now_are_suppressed() {
    let mut query = query(monday(), monday());
    query.now = temporal::local_to_instant(monday(), "14:00", TZ).unwrap();

    let slots = resolve_available_slots(&monday_scenario_store(), &query).unwrap();
    let starts = local_starts(&slots);

    assert_eq!(starts.first(), Some(&840)); // 14:00 itself is still bookable
    assert!(starts.iter().all(|&s| s >= 840));
}

// ── Multi-date ranges ───────────────────────────────────────────────────────

#[test]
fn dates_emit_in_ascending_order() {
    let store = InMemoryStore::new()
        .with_service(service(60, 0))
        .with_default(weekday_hours(Weekday::Mon, "09:00", "11:00", None))
        .with_default(weekday_hours(Weekday::Tue, "09:00", "11:00", None));

    // Monday through Wednesday; Wednesday has no default and stays closed.
    let slots = resolve_available_slots(&store, &query(monday(), date(2026, 3, 18))).unwrap();

    let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
    assert_eq!(
        dates,
        vec![
            monday(),
            monday(),
            monday(),
            monday(),
            monday(),
            date(2026, 3, 17),
            date(2026, 3, 17),
            date(2026, 3, 17),
            date(2026, 3, 17),
            date(2026, 3, 17),
        ]
    );
    for pair in slots.windows(2) {
        assert!(pair[0].start < pair[1].start);
    }
}

#[test]
fn holiday_closes_the_whole_day() {
    let store = monday_scenario_store().with_holiday(Holiday {
        date: monday(),
        is_global: true,
        name: None,
    });
    let slots = resolve_available_slots(&store, &query(monday(), monday())).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn override_reopens_a_holiday_date() {
    let store = monday_scenario_store()
        .with_holiday(Holiday {
            date: monday(),
            is_global: true,
            name: None,
        })
        .with_override(OverrideAvailability {
            resource_id: RESOURCE.to_string(),
            date: monday(),
            is_available: true,
            start_time: Some("13:00".to_string()),
            end_time: Some("17:00".to_string()),
            break_start: None,
            break_end: None,
        });

    let slots = resolve_available_slots(&store, &query(monday(), monday())).unwrap();
    // Override window 13:00–17:00, buffer 15 on each side: 13:15–15:45.
    assert_eq!(local_starts(&slots).first(), Some(&795));
}

// ── DST transition date ─────────────────────────────────────────────────────

#[test]
fn spring_forward_date_keeps_wall_clock_bounds() {
    // 2026-03-08 is the US spring-forward Sunday.
    let store = InMemoryStore::new()
        .with_service(service(60, 0))
        .with_default(weekday_hours(Weekday::Sun, "09:00", "17:00", None));

    let slots =
        resolve_available_slots(&store, &query(date(2026, 3, 8), date(2026, 3, 8))).unwrap();

    assert_eq!(temporal::instant_to_local_minutes(slots[0].start, TZ), 540);
    let last = slots.last().unwrap();
    assert_eq!(temporal::instant_to_local_minutes(last.end, TZ), 1020);
    // 09:00 EDT = 13:00 UTC (the offset already moved at 02:00).
    assert_eq!(slots[0].start, Utc.with_ymd_and_hms(2026, 3, 8, 13, 0, 0).unwrap());
}

// ── Failure containment ─────────────────────────────────────────────────────

/// Delegates to an inner store but fails the holiday read on one date.
struct FlakyHolidayStore {
    inner: InMemoryStore,
    fail_on: NaiveDate,
}

impl SchedulingStore for FlakyHolidayStore {
    fn override_for(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> Result<Option<OverrideAvailability>, StoreError> {
        self.inner.override_for(resource_id, date)
    }

    fn default_for(
        &self,
        resource_id: &str,
        weekday: Weekday,
    ) -> Result<Option<DefaultAvailability>, StoreError> {
        self.inner.default_for(resource_id, weekday)
    }

    fn holiday_on(&self, date: NaiveDate) -> Result<Option<Holiday>, StoreError> {
        if date == self.fail_on {
            return Err(StoreError("replica timed out".to_string()));
        }
        self.inner.holiday_on(date)
    }

    fn service(&self, service_id: &str) -> Result<Option<Service>, StoreError> {
        self.inner.service(service_id)
    }

    fn appointments_overlapping(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&str>,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.inner
            .appointments_overlapping(resource_id, start, end, exclude)
    }
}

#[test]
fn failing_date_is_skipped_not_fatal() {
    let inner = InMemoryStore::new()
        .with_service(service(60, 0))
        .with_default(weekday_hours(Weekday::Mon, "09:00", "11:00", None))
        .with_default(weekday_hours(Weekday::Tue, "09:00", "11:00", None));
    let store = FlakyHolidayStore {
        inner,
        fail_on: monday(),
    };

    let slots = resolve_available_slots(&store, &query(monday(), date(2026, 3, 17))).unwrap();

    // Monday's lookup failed and was skipped; Tuesday still resolves.
    assert!(slots.iter().all(|s| s.date == date(2026, 3, 17)));
    assert_eq!(slots.len(), 5);
}

// ── Request validation ──────────────────────────────────────────────────────

#[test]
fn unknown_service_fails_before_any_date_work() {
    let store = InMemoryStore::new();
    let err = resolve_available_slots(&store, &query(monday(), monday())).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidSchedulingRequest(_)));
}

#[test]
fn inverted_date_range_fails_fast() {
    let err = resolve_available_slots(
        &monday_scenario_store(),
        &query(date(2026, 3, 17), monday()),
    )
    .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidSchedulingRequest(_)));
}

#[test]
fn zero_granularity_fails_fast() {
    let err = resolve_available_slots(
        &monday_scenario_store(),
        &query(monday(), monday()).with_granularity(0),
    )
    .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidSchedulingRequest(_)));
}
