//! Wall Clock - Local time source and calendar names
//!
//! The ticker reads time through [`WallClock`] so tests can pin it.
//! Day and month names come from fixed English tables; no locale is
//! consulted.

use std::cell::Cell;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;

// =============================================================================
// CALENDAR TABLES
// =============================================================================

/// Day names indexed by days since Sunday.
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Month names indexed by month0 (January = 0).
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Zero-pad a clock field to two digits.
pub fn pad2(value: u8) -> String {
    format!("{value:02}")
}

// =============================================================================
// CLOCK READING
// =============================================================================

/// One snapshot of local wall-clock time.
///
/// All display fields derive from the same instant, so time and date never
/// disagree across a midnight boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockReading {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// Days since Sunday (0..=6).
    pub weekday: u8,
    /// Month of year, January = 0 (0..=11).
    pub month0: u8,
    /// Day of month (1..=31).
    pub day: u8,
}

impl ClockReading {
    pub fn from_datetime(at: &NaiveDateTime) -> Self {
        Self {
            hours: at.hour() as u8,
            minutes: at.minute() as u8,
            seconds: at.second() as u8,
            weekday: at.weekday().num_days_from_sunday() as u8,
            month0: at.month0() as u8,
            day: at.day() as u8,
        }
    }

    /// `hh:mm:ss`, zero-padded.
    pub fn hh_mm_ss(&self) -> String {
        format!("{}:{}:{}", pad2(self.hours), pad2(self.minutes), pad2(self.seconds))
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[self.weekday as usize % DAY_NAMES.len()]
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month0 as usize % MONTH_NAMES.len()]
    }

    /// e.g. `October 19`
    pub fn month_day(&self) -> String {
        format!("{} {}", self.month_name(), self.day)
    }

    /// e.g. `Monday, October 19`
    pub fn date_line(&self) -> String {
        format!("{}, {}", self.day_name(), self.month_day())
    }
}

// =============================================================================
// CLOCK SOURCES
// =============================================================================

/// Source of local wall-clock time.
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;

    fn reading(&self) -> ClockReading {
        ClockReading::from_datetime(&self.now())
    }
}

/// The machine's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { now: Cell::new(at) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::milliseconds(by.as_millis() as i64);
        self.now.set(self.now.get() + delta);
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_reading_fields() {
        let reading = ClockReading::from_datetime(&at(2026, 10, 19, 9, 5, 3));

        assert_eq!(reading.hours, 9);
        assert_eq!(reading.minutes, 5);
        assert_eq!(reading.seconds, 3);
        assert_eq!(reading.hh_mm_ss(), "09:05:03");
    }

    #[test]
    fn test_calendar_names() {
        // 2026-10-19 is a Monday
        let reading = ClockReading::from_datetime(&at(2026, 10, 19, 23, 59, 59));

        assert_eq!(reading.day_name(), "Monday");
        assert_eq!(reading.month_name(), "October");
        assert_eq!(reading.month_day(), "October 19");
        assert_eq!(reading.date_line(), "Monday, October 19");
    }

    #[test]
    fn test_sunday_is_index_zero() {
        let reading = ClockReading::from_datetime(&at(2026, 1, 4, 0, 0, 0));
        assert_eq!(reading.weekday, 0);
        assert_eq!(reading.day_name(), "Sunday");
        assert_eq!(reading.month_name(), "January");
    }

    #[test]
    fn test_manual_clock_rolls_over_midnight() {
        let clock = ManualClock::new(at(2026, 12, 31, 23, 59, 59));
        clock.advance(Duration::from_secs(1));

        let reading = clock.reading();
        assert_eq!(reading.hh_mm_ss(), "00:00:00");
        assert_eq!(reading.date_line(), "Friday, January 1");
    }

    #[test]
    fn test_pad2() {
        assert_eq!(pad2(0), "00");
        assert_eq!(pad2(7), "07");
        assert_eq!(pad2(42), "42");
    }

    #[test]
    fn test_system_clock_is_sane() {
        let reading = SystemClock.reading();
        assert!(reading.hours < 24);
        assert!(reading.minutes < 60);
        assert!(reading.seconds < 61);
    }
}
