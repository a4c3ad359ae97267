//! Calendar dates, departure times and the month grid cursor
//!
//! The API speaks two textual formats: calendar days are `dd/mm/yyyy` (used to query trips for a
//! day) and departures are `dd/mm - HH:MM`. The departure format carries no year, so anything
//! comparing departures has to assume one.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Invalid date {0}, expected dd/mm/yyyy")]
    InvalidDate(String),
    #[error("Invalid departure {0}, expected dd/mm - HH:MM")]
    InvalidDeparture(String),
    #[error("Invalid month {0}, expected yyyy-mm")]
    InvalidMonth(String),
}

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";

/// Single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl std::str::FromStr for CalendarDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidDate(s.to_owned()))
    }
}

/// Trip departure as transmitted by the API: day, month and time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Departure {
    day: u32,
    month: u32,
    time: NaiveTime,
}

impl Departure {
    /// Builds the departure of a full datetime. Seconds are dropped.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let time = datetime.time();
        Self {
            day: datetime.day(),
            month: datetime.month(),
            time: time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time),
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// `HH:MM` part only
    pub fn time_label(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }

    /// Resolves the departure in a given year
    ///
    /// Returns `None` when the day doesn't exist in that year (29/02 in a common year).
    pub fn assume_year(&self, year: i32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).map(|date| date.and_time(self.time))
    }
}

impl std::fmt::Display for Departure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}/{:02} - {}",
            self.day,
            self.month,
            self.time.format(TIME_FORMAT)
        )
    }
}

impl std::str::FromStr for Departure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDeparture(s.to_owned());

        let (date, time) = s.trim().split_once(" - ").ok_or_else(invalid)?;
        let (day, month) = date.split_once('/').ok_or_else(invalid)?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        // Leap year, so 29/02 is accepted
        NaiveDate::from_ymd_opt(2000, month, day).ok_or_else(invalid)?;
        let time = NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| invalid())?;

        Ok(Self { day, month, time })
    }
}

impl TryFrom<String> for Departure {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Departure> for String {
    fn from(departure: Departure) -> Self {
        departure.to_string()
    }
}

/// Sorts items by departure, latest first
///
/// Departures are resolved in `year` as the wire format omits it. Sorting is stable, and
/// departures that cannot be resolved in that year are placed last.
pub fn sort_latest_first<T>(items: &mut [T], year: i32, departure: impl Fn(&T) -> &Departure) {
    items.sort_by(|a, b| {
        departure(b)
            .assume_year(year)
            .cmp(&departure(a).assume_year(year))
    });
}

/// Month shown by a calendar grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    /// Always the first day of the month
    first: NaiveDate,
}

impl MonthCursor {
    /// Cursor on the month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Month number, 1-based
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Moves the cursor by `delta` months, wrapping years
    ///
    /// Cursor stays in place if the result would be out of the supported date range.
    pub fn shift(self, delta: i32) -> Self {
        let months = Months::new(delta.unsigned_abs());
        let first = if delta >= 0 {
            self.first.checked_add_months(months)
        } else {
            self.first.checked_sub_months(months)
        };

        first.map(|first| Self { first }).unwrap_or(self)
    }

    /// Days of the month in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let month = self.first.month();
        self.first
            .iter_days()
            .take_while(move |day| day.month() == month)
    }

    pub fn days_in_month(&self) -> usize {
        self.days().count()
    }

    /// Number of empty grid cells before the first day in a Sunday-first week
    pub fn leading_blanks(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl std::fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first.format("%B %Y"))
    }
}

impl std::str::FromStr for MonthCursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(|first| Self { first })
            .map_err(|_| Error::InvalidMonth(s.to_owned()))
    }
}
