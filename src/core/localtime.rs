//! Local calendar windows over UTC timestamps.
//!
//! Event times are stored in UTC, but "today" and "this week" mean the
//! deployment's local calendar. These helpers turn a local calendar range into
//! the pair of UTC instants that bound it.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

/// A closed interval of UTC instants covering whole local days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalWindow {
    /// Local 00:00:00 of the first day, in UTC
    pub start: DateTime<Utc>,
    /// Local 23:59:59 of the last day, in UTC
    pub end: DateTime<Utc>,
}

impl LocalWindow {
    /// Whether an interval `[start, end]` overlaps this window.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.end && end >= self.start
    }
}

/// The local calendar date at `now`.
#[must_use]
pub fn local_today<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// Converts a local wall-clock time to UTC.
///
/// Ambiguous times (clocks going back) resolve to the earlier instant. Times
/// that do not exist (clocks going forward) move forward by an hour.
fn local_to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(local + TimeDelta::hours(1)))
                .earliest()
        })
        .map_or_else(
            || Utc.from_utc_datetime(&local),
            |resolved| resolved.with_timezone(&Utc),
        )
}

/// Window covering the local days `first..=last`.
#[must_use]
pub fn days_window<Tz: TimeZone>(first: NaiveDate, last: NaiveDate, tz: &Tz) -> LocalWindow {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    LocalWindow {
        start: local_to_utc(tz, first.and_time(NaiveTime::MIN)),
        end: local_to_utc(tz, last.and_time(end_of_day)),
    }
}

/// Window covering the local day containing `now`.
#[must_use]
pub fn today_window<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> LocalWindow {
    let today = local_today(now, tz);
    days_window(today, today, tz)
}

/// Window from local midnight tomorrow to the end of the seventh day from today.
#[must_use]
pub fn this_week_window<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> LocalWindow {
    let today = local_today(now, tz);
    days_window(today + TimeDelta::days(1), today + TimeDelta::days(7), tz)
}

/// English weekday name of a date, as used in subject lines.
#[must_use]
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}
