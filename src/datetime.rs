//! Register codec for the RX8025T date and time registers.
//!
//! This module converts between the chip's 7-byte packed BCD register image
//! and [`CalendarTime`]. It performs no I/O.
//!
//! # Register Model
//!
//! The RX8025T stores date and time in 7 consecutive registers:
//! - Seconds, Minutes, Hours, Week, Day, Month, Year
//!
//! # Decode policy
//!
//! Decoding never fails. Corrupted weekday data falls back to Sunday and
//! out-of-range digits are passed through, so the result must be checked with
//! [`CalendarTime::validate`] before it is trusted.

use crate::calendar::{CalendarTime, FIRST_YEAR};
use crate::{Date, Hours, Minutes, Month, Seconds, Week, Year};

/// How a chip revision stores the day of week in the Week register.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WeekdayEncoding {
    /// One bit per day, Sunday = 0x01 .. Saturday = 0x40
    #[default]
    OneHot,
    /// Day number 1 (Sunday) .. 7 (Saturday) stored directly in bits 2..0
    Index,
}

impl WeekdayEncoding {
    /// Encodes a day of week (1=Sunday..7=Saturday).
    ///
    /// Day 0 maps to Saturday and anything above 7 is clamped to Saturday.
    pub fn encode(self, day_of_week: u8) -> Week {
        let day = match day_of_week {
            0 => 7,
            d => d.min(7),
        };
        let mut value = Week::default();
        match self {
            WeekdayEncoding::OneHot => value.set_mask(1 << (day - 1)),
            WeekdayEncoding::Index => value.set_index(day),
        }
        value
    }

    /// Decodes the Week register into a day of week (1=Sunday..7=Saturday).
    ///
    /// Anything that is not a legal value for the encoding decodes as Sunday.
    pub fn decode(self, week: Week) -> u8 {
        match self {
            WeekdayEncoding::OneHot => match week.mask() {
                0x01 => 1,
                0x02 => 2,
                0x04 => 3,
                0x08 => 4,
                0x10 => 5,
                0x20 => 6,
                0x40 => 7,
                _ => 1,
            },
            WeekdayEncoding::Index => match week.index() {
                d @ 1..=7 => d,
                _ => 1,
            },
        }
    }
}

/// Register image of the RX8025T date and time registers (0x00-0x06).
///
/// This struct models the 7 date/time registers using strongly-typed bitfield
/// wrappers for each field. It is used for register-level I/O and for
/// conversion to/from [`CalendarTime`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RX8025TDateTime {
    pub(crate) seconds: Seconds,
    pub(crate) minutes: Minutes,
    pub(crate) hours: Hours,
    pub(crate) week: Week,
    pub(crate) date: Date,
    pub(crate) month: Month,
    pub(crate) year: Year,
}

impl RX8025TDateTime {
    /// Splits a value into its (ones, tens) BCD digits.
    pub(crate) fn make_bcd(value: u8) -> (u8, u8) {
        (value % 10, value / 10)
    }

    fn from_bcd(ones: u8, tens: u8) -> u8 {
        10 * tens + ones
    }

    /// Encodes a calendar time into a register image.
    ///
    /// The year is stored as `(year - 2000) mod 100`. Callers are expected to
    /// validate `time` first; fields are not range-checked here.
    pub fn encode(time: &CalendarTime, encoding: WeekdayEncoding) -> Self {
        let seconds = {
            let (ones, tens) = Self::make_bcd(time.second);
            let mut value = Seconds::default();
            value.set_seconds(ones);
            value.set_ten_seconds(tens);
            value
        };
        let minutes = {
            let (ones, tens) = Self::make_bcd(time.minute);
            let mut value = Minutes::default();
            value.set_minutes(ones);
            value.set_ten_minutes(tens);
            value
        };
        let hours = {
            let (ones, tens) = Self::make_bcd(time.hour);
            let mut value = Hours::default();
            value.set_hours(ones);
            value.set_ten_hours(tens);
            value
        };
        let date = {
            let (ones, tens) = Self::make_bcd(time.day_of_month);
            let mut value = Date::default();
            value.set_date(ones);
            value.set_ten_date(tens);
            value
        };
        let month = {
            let (ones, tens) = Self::make_bcd(time.month);
            let mut value = Month::default();
            value.set_month(ones);
            value.set_ten_month(tens);
            value
        };
        let year = {
            let offset = (i32::from(time.year) - i32::from(FIRST_YEAR)).rem_euclid(100) as u8;
            let (ones, tens) = Self::make_bcd(offset);
            let mut value = Year::default();
            value.set_year(ones);
            value.set_ten_year(tens);
            value
        };

        RX8025TDateTime {
            seconds,
            minutes,
            hours,
            week: encoding.encode(time.day_of_week),
            date,
            month,
            year,
        }
    }

    /// Decodes the register image into a calendar time.
    pub fn decode(&self, encoding: WeekdayEncoding) -> CalendarTime {
        CalendarTime {
            year: FIRST_YEAR
                + u16::from(Self::from_bcd(self.year.year(), self.year.ten_year())),
            month: Self::from_bcd(self.month.month(), self.month.ten_month()),
            day_of_month: Self::from_bcd(self.date.date(), self.date.ten_date()),
            day_of_week: encoding.decode(self.week),
            hour: Self::from_bcd(self.hours.hours(), self.hours.ten_hours()),
            minute: Self::from_bcd(self.minutes.minutes(), self.minutes.ten_minutes()),
            second: Self::from_bcd(self.seconds.seconds(), self.seconds.ten_seconds()),
        }
    }

    /// Raw Week register, for diagnostics.
    pub fn week(&self) -> Week {
        self.week
    }
}

impl From<[u8; 7]> for RX8025TDateTime {
    fn from(data: [u8; 7]) -> Self {
        RX8025TDateTime {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            week: Week(data[3]),
            date: Date(data[4]),
            month: Month(data[5]),
            year: Year(data[6]),
        }
    }
}

impl From<&RX8025TDateTime> for [u8; 7] {
    fn from(dt: &RX8025TDateTime) -> [u8; 7] {
        [
            dt.seconds.0,
            dt.minutes.0,
            dt.hours.0,
            dt.week.0,
            dt.date.0,
            dt.month.0,
            dt.year.0,
        ]
    }
}
