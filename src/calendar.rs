//! Calendar-day values and the clock abstraction used for invoice numbering.
//!
//! Day rollover compares whole `CalendarDay` values instead of formatted
//! strings, and the current day always comes from an injected [`Clock`] so
//! tests can step across midnight without waiting for real time to pass.

use std::cell::Cell;
use std::fmt;

use chrono::{Local, NaiveDate};

/// `strftime` pattern of the 8-digit storage key (`20240501`).
const KEY_FORMAT: &str = "%Y%m%d";

/// A single day on the calendar, independent of time of day and timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Build a day from its components, `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Render the day as its 8-digit key without separators.
    pub fn key(&self) -> String {
        self.0.format(KEY_FORMAT).to_string()
    }

    /// Parse an 8-digit key back into a day. Anything else (separators,
    /// wrong length, impossible dates) yields `None`.
    pub fn parse_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(raw, KEY_FORMAT).ok().map(Self)
    }

    /// The following calendar day.
    pub fn succ(&self) -> Self {
        self.0.succ_opt().map(Self).unwrap_or(*self)
    }

    /// The preceding calendar day.
    pub fn pred(&self) -> Self {
        self.0.pred_opt().map(Self).unwrap_or(*self)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Source of "today".
pub trait Clock {
    fn today(&self) -> CalendarDay;
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDay {
        CalendarDay(Local::now().date_naive())
    }
}

/// A clock that reports whatever day it was last set to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    day: Cell<CalendarDay>,
}

impl FixedClock {
    pub fn new(day: CalendarDay) -> Self {
        Self {
            day: Cell::new(day),
        }
    }

    /// Move the clock forward by one day.
    pub fn advance_day(&self) {
        self.day.set(self.day.get().succ());
    }
}

impl Clock for FixedClock {
    fn today(&self) -> CalendarDay {
        self.day.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> CalendarDay {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_no_separators() {
        let day = CalendarDay::from_ymd(2024, 5, 1).unwrap();
        assert_eq!(day.key(), "20240501");
        assert_eq!(day.to_string(), "2024-05-01");
    }

    #[test]
    fn parse_key_round_trips() {
        let day = CalendarDay::from_ymd(1999, 12, 31).unwrap();
        assert_eq!(CalendarDay::parse_key(&day.key()), Some(day));
    }

    #[test]
    fn parse_key_rejects_garbage() {
        assert_eq!(CalendarDay::parse_key(""), None);
        assert_eq!(CalendarDay::parse_key("2024-05-01"), None);
        assert_eq!(CalendarDay::parse_key("20241301"), None);
        assert_eq!(CalendarDay::parse_key("2024050"), None);
        assert_eq!(CalendarDay::parse_key("+2024051"), None);
    }

    #[test]
    fn fixed_clock_crosses_month_boundary() {
        let clock = FixedClock::new(CalendarDay::from_ymd(2024, 4, 30).unwrap());
        clock.advance_day();
        assert_eq!(clock.today().key(), "20240501");
        assert_eq!(clock.today().pred().key(), "20240430");
    }
}
