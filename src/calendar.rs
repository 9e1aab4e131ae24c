//! Normalized calendar time exchanged with the host clock.
//!
//! [`CalendarTime`] is the value the register codec produces and consumes. It
//! is built fresh on every read or write cycle and converted to an epoch
//! timestamp (UTC, no DST) when handed to the host clock.

use core::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

/// First year the chip can represent.
pub const FIRST_YEAR: u16 = 2000;
/// Last year the chip can represent (two-digit year window).
pub const LAST_YEAR: u16 = 2099;

/// Calendar date and time as seen by the driver.
///
/// `day_of_week` runs from 1 (Sunday) to 7 (Saturday).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    /// Full year, e.g. 2025
    pub year: u16,
    /// Month (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day_of_month: u8,
    /// Day of week (1=Sunday..7=Saturday)
    pub day_of_week: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
}

impl CalendarTime {
    /// Seconds since the Unix epoch, interpreting the fields as UTC.
    ///
    /// Returns `None` when the fields do not name a real date and time.
    pub fn timestamp(&self) -> Option<i64> {
        self.to_naive_datetime()
            .map(|ndt| ndt.and_utc().timestamp())
    }

    /// Builds a calendar time from seconds since the Unix epoch (UTC).
    pub fn from_timestamp(timestamp: i64) -> Option<Self> {
        DateTime::from_timestamp(timestamp, 0).map(|dt| Self::from(&dt.naive_utc()))
    }

    /// Converts to chrono's `NaiveDateTime`, ignoring `day_of_week`.
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day_of_month),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
    }

    /// Checks every field against its calendar range and the chip's year window.
    pub fn validate(&self) -> Result<(), RX8025TDateTimeError> {
        if self.year < FIRST_YEAR {
            return Err(RX8025TDateTimeError::YearNotAfter1999);
        }
        if self.year > LAST_YEAR {
            return Err(RX8025TDateTimeError::YearNotBefore2100);
        }
        if !(1..=7).contains(&self.day_of_week) {
            return Err(RX8025TDateTimeError::InvalidDateTime);
        }
        // chrono rejects month 0/13, day 0, Feb 30, hour 24, second 60 ...
        self.to_naive_datetime()
            .map(|_| ())
            .ok_or(RX8025TDateTimeError::InvalidDateTime)
    }

    /// Boolean form of [`CalendarTime::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl From<&NaiveDateTime> for CalendarTime {
    fn from(datetime: &NaiveDateTime) -> Self {
        // chrono years can be negative or beyond u16; those saturate and fail validation
        let year = u16::try_from(datetime.year().max(0)).unwrap_or(u16::MAX);
        CalendarTime {
            year,
            month: datetime.month() as u8,
            day_of_month: datetime.day() as u8,
            day_of_week: datetime.weekday().number_from_sunday() as u8,
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
        }
    }
}

impl fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day_of_month, self.hour, self.minute, self.second
        )
    }
}

/// Errors that can occur while validating an RX8025T date/time.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RX8025TDateTimeError {
    /// A field is out of range or the date does not exist
    InvalidDateTime,
    /// The year is before 2000 (the chip stores an offset from 2000)
    YearNotAfter1999,
    /// The year is after 2099 (the chip stores two digits)
    YearNotBefore2100,
    /// The time is well formed but older than the configured plausibility floor
    Implausible,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> CalendarTime {
        let ndt = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .unwrap()
            .and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
            .unwrap();
        CalendarTime::from(&ndt)
    }

    #[test]
    fn test_from_naive_datetime_weekday() {
        // 2024-12-31 was a Tuesday
        let t = time(2024, 12, 31, 23, 59, 59);
        assert_eq!(t.day_of_week, 3);
        // 2024-03-10 was a Sunday
        assert_eq!(time(2024, 3, 10, 0, 0, 0).day_of_week, 1);
        // 2024-03-16 was a Saturday
        assert_eq!(time(2024, 3, 16, 0, 0, 0).day_of_week, 7);
    }

    #[test]
    fn test_timestamp_utc() {
        assert_eq!(time(2000, 1, 1, 0, 0, 0).timestamp(), Some(946_684_800));
        assert_eq!(time(2024, 12, 31, 23, 59, 59).timestamp(), Some(1_735_689_599));
    }

    #[test]
    fn test_from_timestamp() {
        let t = CalendarTime::from_timestamp(1_735_689_599).unwrap();
        assert_eq!(t, time(2024, 12, 31, 23, 59, 59));
        assert_eq!(t.timestamp(), Some(1_735_689_599));
    }

    #[test]
    fn test_timestamp_of_impossible_date() {
        let mut t = time(2023, 2, 28, 12, 0, 0);
        t.day_of_month = 29;
        assert_eq!(t.timestamp(), None);
        assert!(matches!(
            t.validate(),
            Err(RX8025TDateTimeError::InvalidDateTime)
        ));
    }

    #[test]
    fn test_validate_ranges() {
        assert!(time(2024, 2, 29, 12, 0, 0).is_valid());
        assert!(time(2000, 1, 1, 0, 0, 0).is_valid());
        assert!(time(2099, 12, 31, 23, 59, 59).is_valid());

        let base = time(2024, 6, 15, 10, 25, 45);
        for broken in [
            CalendarTime { second: 60, ..base },
            CalendarTime { minute: 60, ..base },
            CalendarTime { hour: 24, ..base },
            CalendarTime { month: 0, ..base },
            CalendarTime { month: 13, ..base },
            CalendarTime { day_of_month: 0, ..base },
            CalendarTime { day_of_month: 31, month: 4, ..base },
            CalendarTime { day_of_week: 0, ..base },
            CalendarTime { day_of_week: 8, ..base },
        ] {
            assert_eq!(
                broken.validate(),
                Err(RX8025TDateTimeError::InvalidDateTime),
                "{:?} should be rejected",
                broken
            );
        }
    }

    #[test]
    fn test_validate_year_window() {
        let base = time(2024, 6, 15, 10, 25, 45);
        assert_eq!(
            CalendarTime { year: 1999, ..base }.validate(),
            Err(RX8025TDateTimeError::YearNotAfter1999)
        );
        assert_eq!(
            CalendarTime { year: 2100, ..base }.validate(),
            Err(RX8025TDateTimeError::YearNotBefore2100)
        );
    }

    #[test]
    fn test_display() {
        extern crate alloc;

        let t = time(2024, 3, 4, 5, 6, 7);
        assert_eq!(alloc::format!("{}", t), "2024-03-04 05:06:07");
    }
}
