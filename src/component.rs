//! Seams between the driver and the host framework that schedules it.
//!
//! The host owns the system clock and the scheduler. It hands the driver a
//! [`TimeAuthority`] and calls the [`PollingComponent`] hooks: once at setup,
//! periodically afterwards, and on demand for diagnostics.

use core::fmt;

use crate::calendar::CalendarTime;

/// Setup priorities understood by the host scheduler. Higher runs earlier.
pub mod setup_priority {
    /// Components that only need the bus to be up.
    pub const DATA: f32 = 600.0;
}

/// The host's system clock.
pub trait TimeAuthority {
    /// Current UTC time, or `None` when the clock has not been set yet.
    fn utc_now(&self) -> Option<CalendarTime>;

    /// Sets the system clock from seconds since the Unix epoch (UTC).
    fn synchronize_epoch(&mut self, timestamp: i64);
}

/// Lifecycle of a device session.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// `initialize` has not run yet
    #[default]
    Uninitialized,
    /// The chip answered during setup
    Ready,
    /// Setup failed; only a new `initialize` can recover
    Failed,
}

/// Hooks the host framework calls on a component.
pub trait PollingComponent {
    /// Runs once at startup. Returns `false` and marks the component failed
    /// when the device does not respond.
    fn initialize(&mut self) -> bool;

    /// Runs on every scheduler tick.
    fn poll(&mut self);

    /// Writes a human readable configuration summary.
    fn describe(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Where this component sits in the host's setup order.
    fn setup_priority(&self) -> f32 {
        setup_priority::DATA
    }
}
