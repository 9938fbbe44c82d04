//! Calendar-day normalization and day arithmetic.
//!
//! # Responsibility
//! - Collapse timestamps into the calendar day they fall on.
//! - Provide overflow-safe day shifting for week and rollover logic.
//! - Convert days to and from the persisted epoch-millisecond form.
//!
//! # Invariants
//! - Two instants on the same calendar day of their own timezone map to the
//!   same `NaiveDate`.
//! - Day arithmetic never panics; out-of-range results are `None`.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Anything that can be reduced to a calendar day.
///
/// Store and roller APIs accept `impl CalendarDay`, so callers may pass a
/// bare date or a full timestamp; the time-of-day is discarded.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl<T: CalendarDay + ?Sized> CalendarDay for &T {
    fn calendar_day(&self) -> NaiveDate {
        (**self).calendar_day()
    }
}

/// Returns the current local calendar day.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Returns the current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Shifts `day` by `offset` days in either direction.
pub fn shift_day(day: NaiveDate, offset: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(offset.unsigned_abs());
    if offset >= 0 {
        day.checked_add_days(magnitude)
    } else {
        day.checked_sub_days(magnitude)
    }
}

/// Returns the Monday on or before `day`.
pub fn monday_on_or_before(day: NaiveDate) -> Option<NaiveDate> {
    let back = i64::from(day.weekday().num_days_from_monday());
    shift_day(day, -back)
}

/// Absolute number of calendar days between two days.
pub fn day_distance(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days().abs()
}

/// Epoch milliseconds of the UTC midnight that starts `day`.
pub fn day_to_epoch_ms(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::default()).and_utc().timestamp_millis()
}

/// Floors an epoch-millisecond timestamp to its UTC calendar day.
pub fn epoch_ms_to_day(epoch_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(epoch_ms).map(|instant| instant.date_naive())
}
