//! Async implementation of the RX8025T driver.
//!
//! This module provides an async interface to the RX8025T RTC using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled. Behaviour matches the blocking [`crate::RX8025T`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rx8025t::asynch::RX8025T;
//!
//! let mut rtc = RX8025T::new(i2c, system_clock, Config::default());
//! rtc.setup().await?;
//!
//! // Push the RTC time to the system clock
//! rtc.read_time().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;

use crate::{
    CalendarTime, Config, Flags, RX8025TDateTime, RX8025TDateTimeError, RX8025TError, RegAddr,
    SessionState, TimeAuthority,
};

/// RX8025T Real-Time Clock async driver.
///
/// This struct provides the async interface to the RX8025T RTC device.
pub struct RX8025T<I2C: I2c, C: TimeAuthority> {
    i2c: I2C,
    clock: C,
    config: Config,
    registers: RX8025TDateTime,
    state: SessionState,
}

impl<I2C: I2c, C: TimeAuthority> RX8025T<I2C, C> {
    /// Creates a new RX8025T async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
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
    /// # Returns
    /// * `Ok(())` and [`SessionState::Ready`] on success
    /// * `Err(RX8025TError)` and [`SessionState::Failed`] on error
    pub async fn setup(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        match self.read_raw_datetime().await {
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

    /// Reads the raw datetime registers from the device.
    async fn read_raw_datetime(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        let mut data = [0; 7];
        if let Err(e) = self
            .i2c
            .write_read(self.config.address, &[RegAddr::Seconds as u8], &mut data)
            .await
        {
            error!("RX8025T: can't read I2C data");
            return Err(RX8025TError::I2c(e));
        }
        self.registers = data.into();
        debug!("RX8025T: read {:?}", data);

        match self.flags().await {
            Ok(flags) if flags.voltage_low_flag() => {
                warn!("RX8025T: voltage low flag (VLF) is set, time data may be invalid");
            }
            Ok(_) => {}
            Err(_) => debug!("RX8025T: can't read flag register"),
        }
        Ok(())
    }

    /// Writes raw datetime values to the device registers.
    async fn write_raw_datetime(
        &mut self,
        datetime: &RX8025TDateTime,
    ) -> Result<(), RX8025TError<I2C::Error>> {
        let data: [u8; 7] = datetime.into();
        if let Err(e) = self
            .i2c
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
            .await
        {
            error!("RX8025T: can't write I2C data");
            return Err(RX8025TError::I2c(e));
        }
        debug!("RX8025T: wrote {:?}", data);
        Ok(())
    }

    /// Reads the flag register.
    pub async fn flags(&mut self) -> Result<Flags, RX8025TError<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.config.address, &[RegAddr::Flag as u8], &mut data)
            .await?;
        Ok(Flags(data[0]))
    }

    /// Clears VLF with a read-modify-write of the flag register.
    ///
    /// # Returns
    /// * `Ok(true)` if VLF was set and has been cleared
    /// * `Ok(false)` if VLF was already clear (nothing written)
    /// * `Err(RX8025TError)` on error
    pub async fn clear_voltage_low_flag(&mut self) -> Result<bool, RX8025TError<I2C::Error>> {
        let mut flags = self.flags().await?;
        if !flags.voltage_low_flag() {
            return Ok(false);
        }
        debug!("RX8025T: clearing VLF flag");
        flags.set_voltage_low_flag(false);
        self.i2c
            .write(self.config.address, &[RegAddr::Flag as u8, flags.into()])
            .await?;
        Ok(true)
    }

    /// Reads and decodes the time registers without validating the result.
    pub async fn calendar_time(&mut self) -> Result<CalendarTime, RX8025TError<I2C::Error>> {
        self.read_raw_datetime().await?;
        Ok(self.registers.decode(self.config.weekday_encoding))
    }

    /// Gets the current date and time from the device.
    pub async fn datetime(&mut self) -> Result<NaiveDateTime, RX8025TError<I2C::Error>> {
        let time = self.calendar_time().await?;
        time.validate().map_err(RX8025TError::DateTime)?;
        time.to_naive_datetime()
            .ok_or(RX8025TError::DateTime(RX8025TDateTimeError::InvalidDateTime))
    }

    /// Sets the date and time on the device and clears VLF.
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), RX8025TError<I2C::Error>> {
        let time = CalendarTime::from(datetime);
        time.validate().map_err(RX8025TError::DateTime)?;
        self.write_calendar_time(&time).await
    }

    /// Reads the RTC and pushes its time to the host clock.
    pub async fn read_time(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        let time = self.calendar_time().await?;
        if let Err(e) = self.check_plausible(&time) {
            error!("RX8025T: invalid RTC time {}, not syncing to system clock", time);
            return Err(RX8025TError::DateTime(e));
        }
        let timestamp = time
            .timestamp()
            .ok_or(RX8025TError::DateTime(RX8025TDateTimeError::InvalidDateTime))?;
        self.clock.synchronize_epoch(timestamp);
        Ok(())
    }

    /// Writes the host clock's current UTC time to the RTC.
    pub async fn write_time(&mut self) -> Result<(), RX8025TError<I2C::Error>> {
        let Some(now) = self.clock.utc_now() else {
            error!("RX8025T: system time is not set, not syncing to RTC");
            return Err(RX8025TError::ClockNotSet);
        };
        if let Err(e) = self.check_plausible(&now) {
            error!("RX8025T: invalid system time {}, not syncing to RTC", now);
            return Err(RX8025TError::DateTime(e));
        }
        self.write_calendar_time(&now).await
    }

    async fn write_calendar_time(
        &mut self,
        time: &CalendarTime,
    ) -> Result<(), RX8025TError<I2C::Error>> {
        let raw = RX8025TDateTime::encode(time, self.config.weekday_encoding);
        self.write_raw_datetime(&raw).await?;
        self.registers = raw;

        // A failure here leaves VLF set; the next successful write retries.
        if self.clear_voltage_low_flag().await.is_err() {
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

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The host clock handle.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consumes the driver and returns the bus and clock.
    pub fn release(self) -> (I2C, C) {
        (self.i2c, self.clock)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use chrono::{Datelike, NaiveDate, Timelike};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = crate::DEFAULT_ADDRESS;

    #[derive(Default)]
    struct MockClock {
        now: Option<CalendarTime>,
        synced: Vec<i64>,
    }

    impl TimeAuthority for MockClock {
        fn utc_now(&self) -> Option<CalendarTime> {
            self.now
        }

        fn synchronize_epoch(&mut self, timestamp: i64) {
            self.synced.push(timestamp);
        }
    }

    async fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    #[tokio::test]
    async fn test_async_setup_failure() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0; 7],
        )
        .with_error(ErrorKind::Other)])
        .await;
        let mut dev = RX8025T::new(mock, MockClock::default(), Config::default());

        assert!(dev.setup().await.is_err());
        assert_eq!(dev.state(), SessionState::Failed);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_read_time() {
        // 2024-03-14 15:30:00, Thursday
        let datetime_registers = [0x00, 0x30, 0x15, 0x10, 0x14, 0x03, 0x24];

        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                datetime_registers.to_vec(),
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Flag as u8], vec![0x02]),
        ])
        .await;
        let mut dev = RX8025T::new(mock, MockClock::default(), Config::default());

        dev.read_time().await.unwrap();
        assert_eq!(dev.clock().synced, vec![1_710_430_200]);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_read_datetime() {
        let datetime_registers = [0x00, 0x30, 0x15, 0x10, 0x14, 0x03, 0x24];

        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                datetime_registers.to_vec(),
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Flag as u8], vec![0x00]),
        ])
        .await;
        let mut dev = RX8025T::new(mock, MockClock::default(), Config::default());

        let dt = dev.datetime().await.unwrap();
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.year(), 2024);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_write_time_clears_vlf() {
        let ndt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let clock = MockClock {
            now: Some(CalendarTime::from(&ndt)),
            synced: Vec::new(),
        };

        let mock = setup_mock(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![
                    RegAddr::Seconds as u8,
                    0x00, // seconds
                    0x30, // minutes
                    0x15, // hours
                    0x10, // week (Thursday)
                    0x14, // day
                    0x03, // month
                    0x24, // year
                ],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Flag as u8], vec![0x12]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Flag as u8, 0x10]),
        ])
        .await;
        let mut dev = RX8025T::new(mock, clock, Config::default());

        dev.write_time().await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_write_time_without_clock() {
        let mock = setup_mock(&[]).await;
        let mut dev = RX8025T::new(mock, MockClock::default(), Config::default());

        assert!(matches!(
            dev.write_time().await,
            Err(RX8025TError::ClockNotSet)
        ));
        dev.i2c.done();
    }
}
