//! Register definitions and bitfield structures for the RX8025T RTC.
//!
//! This module contains the register addresses and bitfield definitions the
//! driver uses to talk to the RX8025T. Each wrapper makes the byte-to-field
//! mapping explicit instead of relying on an in-memory struct layout.

use bitfield::bitfield;

/// Register addresses for the RX8025T RTC.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (0-23)
    Hours = 0x02,
    /// Week register (day of week, encoding depends on chip revision)
    Week = 0x03,
    /// Day of month register (1-31)
    Day = 0x04,
    /// Month register (1-12)
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Flag register (VLF, VDET, alarm and timer flags)
    Flag = 0x0E,
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

bitfield! {
    /// Hours register (0-23, 24-hour only) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Tens place of hours (0-2)
    pub ten_hours, set_ten_hours: 5, 4;
    /// Ones place of hours (0-9)
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Week register.
    ///
    /// Mask-based revisions keep a one-hot mask in bits 6..0 (Sunday = bit 0).
    /// Index-based revisions keep the day number 1-7 in bits 2..0.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Week(u8);
    impl Debug;
    /// One-hot day mask
    pub mask, set_mask: 6, 0;
    /// Day number
    pub index, set_index: 2, 0;
}
from_register_u8!(Week);

bitfield! {
    /// Day of month register (1-31) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Date(u8);
    impl Debug;
    /// Tens place of the day (0-3)
    pub ten_date, set_ten_date: 5, 4;
    /// Ones place of the day (0-9)
    pub date, set_date: 3, 0;
}
from_register_u8!(Date);

bitfield! {
    /// Month register (1-12) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Tens place of the month (0-1)
    pub ten_month, set_ten_month: 4, 4;
    /// Ones place of the month (0-9)
    pub month, set_month: 3, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Year register (0-99, offset from 2000) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Year(u8);
    impl Debug;
    /// Tens place of the year (0-9)
    pub ten_year, set_ten_year: 7, 4;
    /// Ones place of the year (0-9)
    pub year, set_year: 3, 0;
}
from_register_u8!(Year);

bitfield! {
    /// Flag register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Flags(u8);
    impl Debug;
    /// Update interrupt occurred
    pub update_flag, set_update_flag: 5;
    /// Fixed-cycle timer interrupt occurred
    pub timer_flag, set_timer_flag: 4;
    /// Alarm interrupt occurred
    pub alarm_flag, set_alarm_flag: 3;
    /// Voltage low: time data may be invalid
    pub voltage_low_flag, set_voltage_low_flag: 1;
    /// Voltage drop detected (temperature compensation stopped)
    pub voltage_detect_flag, set_voltage_detect_flag: 0;
}
from_register_u8!(Flags);

#[cfg(feature = "defmt")]
impl defmt::Format for Flags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Flags(vlf={}, vdet={}, af={}, tf={}, uf={})",
            self.voltage_low_flag(),
            self.voltage_detect_flag(),
            self.alarm_flag(),
            self.timer_flag(),
            self.update_flag()
        );
    }
}
