//! A platform-agnostic driver for the Epson RX8025T real-time clock.
//!
//! The driver keeps a host system clock and the RTC in step:
//! - [`RX8025T::read_time`] reads the 7 time registers, decodes them and pushes
//!   the resulting epoch timestamp to the host's [`TimeAuthority`]
//! - [`RX8025T::write_time`] takes the host's current UTC time, writes it to
//!   the chip and clears the Voltage Low Flag (VLF)
//!
//! Register access goes through `embedded-hal` 1.0 I2C. Enable the `async`
//! feature for an `embedded-hal-async` variant in [`asynch`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rx8025t::{Config, PollingComponent, RX8025T};
//!
//! let mut rtc = RX8025T::new(i2c, system_clock, Config::default());
//! if rtc.initialize() {
//!     // on every scheduler tick
//!     rtc.poll();
//! }
//! // after the host clock was set from the network
//! rtc.write_time()?;
//! ```
//!
//! # Features
//!
//! - `async`: async driver in [`asynch`]
//! - `log`: logging through the `log` crate
//! - `defmt`: logging through `defmt`, plus `defmt::Format` for public types
#![no_std]

use core::fmt;

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "log", feature = "defmt"))] {
        compile_error!("features `log` and `defmt` are mutually exclusive");
    }
}

// Logging macros forward to `log` or `defmt` depending on the enabled feature
// and compile to nothing otherwise.
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::debug!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::warn!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::error!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::error!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt")))]
            let _ = ($( & $x ),*);
        }
    };
}

pub mod action;
#[cfg(feature = "async")]
pub mod asynch;
pub mod calendar;
pub mod component;
pub mod datetime;
pub mod registers;

pub use action::{ReadAction, TimeSync, WriteAction};
pub use calendar::{CalendarTime, RX8025TDateTimeError};
pub use component::{setup_priority, PollingComponent, SessionState, TimeAuthority};
pub use datetime::{RX8025TDateTime, WeekdayEncoding};
pub use registers::*;

/// Factory I2C address of the RX8025T.
pub const DEFAULT_ADDRESS: u8 = 0x32;

/// Configuration for the RX8025T driver.
///
/// All values come from the host configuration and are only read by the driver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// 7-bit I2C address of the chip
    pub address: u8,
    /// How this chip revision stores the day of week
    pub weekday_encoding: WeekdayEncoding,
    /// Times before this year are treated as "clock never set" and not synced
    pub min_valid_year: u16,
    /// Interval at which the host calls [`PollingComponent::poll`]
    pub update_interval_ms: u32,
    /// Timezone string of the host clock, shown in [`PollingComponent::describe`]
    pub timezone: Option<&'static str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            weekday_encoding: WeekdayEncoding::OneHot,
            min_valid_year: 2019,
            update_interval_ms: 60_000,
            timezone: None,
        }
    }
}

/// Errors returned by the RX8025T driver.
#[derive(Debug)]
pub enum RX8025TError<I2CE> {
    /// I2C bus error
    I2c(I2CE),
    /// The decoded or host supplied time failed validation
    DateTime(RX8025TDateTimeError),
    /// The host clock has not been set
    ClockNotSet,
}

impl<I2CE> From<I2CE> for RX8025TError<I2CE> {
    fn from(e: I2CE) -> Self {
        RX8025TError::I2c(e)
    }
}

/// RX8025T Real-Time Clock driver.
///
/// Owns the bus handle, the host clock handle and the last register image.
/// The host is expected to serialize calls; nothing here locks.
pub struct RX8025T<I2C: I2c, C: TimeAuthority> {
    i2c: I2C,
    clock: C,
    config: Config,
    registers: RX8025TDateTime,
    state: SessionState,
}

impl<I2C: I2c, C: TimeAuthority> RX8025T<I2C, C> {
    /// Creates a new driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `clock` - The host system clock
    /// * `config` - Driver configuration
    pub fn new(i2c: I2C, clock: C, config: Config) -> Self {
        Self {
            i2c,
            clock,
            config,
            registers: RX8025TDateTime::default(),
            state: SessionState::Uninitialized,
        }
    }

    /// Probes the chip by reading the time registers once.
    ///
    /// On failure the session is marked [`SessionState::Failed`] until `setup`
    /// is run again.
    pub fn setup(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        match self.read_raw_datetime() {
            Ok(()) => {
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Reads registers 0x00-0x06 into the register image in one transaction.
    ///
    /// Also reads the flag register and warns when VLF is set.
    fn read_raw_datetime(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.config.address, &[RegAddr::Seconds as u8], &mut data)
            .map_err(|e| {
                error!("RX8025T: can't read I2C data");
                RX8025TError::I2c(e)
            })?;
        self.registers = data.into();
        debug!(
            "RX8025T: read {:?} (week register {})",
            data,
            u8::from(self.registers.week())
        );

        match self.flags() {
            Ok(flags) if flags.voltage_low_flag() => {
                warn!("RX8025T: voltage low flag (VLF) is set, time data may be invalid");
            }
            Ok(_) => {}
            Err(_) => debug!("RX8025T: can't read flag register"),
        }
        Ok(())
    }

    /// Writes the register image to registers 0x00-0x06 in one transaction.
    fn write_raw_datetime(
        &mut self,
        datetime: &RX8025TDateTime,
    ) -> Result<(), RX8025TError<I2C::Error>> {
        let data: [u8; 7] = datetime.into();
        self.i2c
            .write(
                self.config.address,
                &[
                    RegAddr::Seconds as u8,
                    data[0],
                    data[1],
                    data[2],
                    data[3],
                    data[4],
                    data[5],
                    data[6],
                ],
            )
            .map_err(|e| {
                error!("RX8025T: can't write I2C data");
                RX8025TError::I2c(e)
            })?;
        debug!("RX8025T: wrote {:?}", data);
        Ok(())
    }

    /// Reads the flag register.
    pub fn flags(&mut self) -> Result<Flags, RX8025TError<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.config.address, &[RegAddr::Flag as u8], &mut data)?;
        Ok(Flags(data[0]))
    }

    /// Returns `true` when the chip reports a power interruption (VLF set).
    pub fn voltage_low(&mut self) -> Result<bool, RX8025TError<I2C::Error>> {
        Ok(self.flags()?.voltage_low_flag())
    }

    /// Clears VLF with a read-modify-write of the flag register.
    ///
    /// Only bit 1 is cleared; every other bit is written back unchanged. Nothing
    /// is written when VLF is already clear. Returns whether VLF was set.
    pub fn clear_voltage_low_flag(&mut self) -> Result<bool, RX8025TError<I2C::Error>> {
        let mut flags = self.flags()?;
        if !flags.voltage_low_flag() {
            return Ok(false);
        }
        debug!("RX8025T: clearing VLF flag");
        flags.set_voltage_low_flag(false);
        self.i2c
            .write(self.config.address, &[RegAddr::Flag as u8, flags.into()])?;
        Ok(true)
    }

    /// Reads and decodes the time registers without validating the result.
    pub fn calendar_time(&mut self) -> Result<CalendarTime, RX8025TError<I2C::Error>> {
        self.read_raw_datetime()?;
        Ok(self.registers.decode(self.config.weekday_encoding))
    }

    /// Gets the current date and time from the device.
    ///
    /// Fails with [`RX8025TError::DateTime`] when the registers hold an
    /// invalid date.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, RX8025TError<I2C::Error>> {
        let time = self.calendar_time()?;
        time.validate().map_err(RX8025TError::DateTime)?;
        time.to_naive_datetime()
            .ok_or(RX8025TError::DateTime(RX8025TDateTimeError::InvalidDateTime))
    }

    /// Sets the date and time on the device and clears VLF.
    ///
    /// The year must lie in 2000..=2099.
    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), RX8025TError<I2C::Error>> {
        let time = CalendarTime::from(datetime);
        time.validate().map_err(RX8025TError::DateTime)?;
        self.write_calendar_time(&time)
    }

    /// Reads the RTC and pushes its time to the host clock.
    ///
    /// The host clock is left untouched when the bus read fails or the chip
    /// holds an invalid or implausible time.
    pub fn read_time(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        let time = self.calendar_time()?;
        if let Err(e) = self.check_plausible(&time) {
            error!("RX8025T: invalid RTC time {}, not syncing to system clock", time);
            return Err(RX8025TError::DateTime(e));
        }
        let timestamp = time
            .timestamp()
            .ok_or(RX8025TError::DateTime(RX8025TDateTimeError::InvalidDateTime))?;
        debug!("RX8025T: synchronizing system clock to {}", time);
        self.clock.synchronize_epoch(timestamp);
        Ok(())
    }

    /// Writes the host clock's current UTC time to the RTC.
    ///
    /// Nothing is sent on the bus when the host clock is unset or invalid.
    pub fn write_time(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        let Some(now) = self.clock.utc_now() else {
            error!("RX8025T: system time is not set, not syncing to RTC");
            return Err(RX8025TError::ClockNotSet);
        };
        if let Err(e) = self.check_plausible(&now) {
            error!("RX8025T: invalid system time {}, not syncing to RTC", now);
            return Err(RX8025TError::DateTime(e));
        }
        self.write_calendar_time(&now)
    }

    fn write_calendar_time(&mut self, time: &CalendarTime) -> Result<(), RX8025TError<I2C::Error>> {
        let raw = RX8025TDateTime::encode(time, self.config.weekday_encoding);
        self.write_raw_datetime(&raw)?;
        self.registers = raw;

        // A failure here leaves VLF set; the next successful write retries.
        if self.clear_voltage_low_flag().is_err() {
            warn!("RX8025T: can't clear VLF flag");
        }
        Ok(())
    }

    fn check_plausible(&self, time: &CalendarTime) -> Result<(), RX8025TDateTimeError> {
        time.validate()?;
        if time.year < self.config.min_valid_year {
            return Err(RX8025TDateTimeError::Implausible);
        }
        Ok(())
    }

    /// Last register image read from or written to the chip.
    pub fn registers(&self) -> &RX8025TDateTime {
        &self.registers
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `true` once setup has failed.
    pub fn is_failed(&self) -> bool {
        self.state == SessionState::Failed
    }

    /// Driver configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The host clock handle.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the host clock handle.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Consumes the driver and returns the bus and clock.
    pub fn release(self) -> (I2C, C) {
        (self.i2c, self.clock)
    }
}

impl<I2C: I2c, C: TimeAuthority> PollingComponent for RX8025T<I2C, C> {
    fn initialize(&mut self) -> bool {
        self.setup().is_ok()
    }

    fn poll(&mut self) {
        if self.state != SessionState::Ready {
            return;
        }
        // failures are logged and the next tick tries again
        let _ = self.read_time();
    }

    fn describe(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "RX8025T:")?;
        writeln!(out, "  Address: 0x{:02X}", self.config.address)?;
        writeln!(out, "  Weekday encoding: {:?}", self.config.weekday_encoding)?;
        writeln!(out, "  Update interval: {}ms", self.config.update_interval_ms)?;
        if self.is_failed() {
            writeln!(out, "  Communication with RX8025T failed!")?;
        }
        if let Some(timezone) = self.config.timezone {
            writeln!(out, "  Timezone: '{}'", timezone)?;
        }
        Ok(())
    }
}

impl<I2C: I2c, C: TimeAuthority> TimeSync for RX8025T<I2C, C> {
    type Error = RX8025TError<I2C::Error>;

    fn read_time(&mut self) -> Result<(), Self::Error> {
        RX8025T::read_time(self)
    }

    fn write_time(&mut self) -> Result<(), Self::Error> {
        RX8025T::write_time(self)
    }
}
