//! Automation commands that trigger a time transfer outside the schedule.

/// Something that can move time between the RTC and the host clock.
pub trait TimeSync {
    /// Error reported by a failed transfer.
    type Error;

    /// Copies the RTC time into the host clock.
    fn read_time(&mut self) -> Result<(), Self::Error>;

    /// Copies the host clock into the RTC.
    fn write_time(&mut self) -> Result<(), Self::Error>;
}

/// Reads the RTC and updates the host clock.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ReadAction;

impl ReadAction {
    /// Runs the action against `session`.
    pub fn execute<S: TimeSync>(&self, session: &mut S) -> Result<(), S::Error> {
        session.read_time()
    }
}

/// Writes the host clock into the RTC.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct WriteAction;

impl WriteAction {
    /// Runs the action against `session`.
    pub fn execute<S: TimeSync>(&self, session: &mut S) -> Result<(), S::Error> {
        session.write_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        reads: u32,
        writes: u32,
        fail: bool,
    }

    impl TimeSync for Recorder {
        type Error = ();

        fn read_time(&mut self) -> Result<(), ()> {
            self.reads += 1;
            if self.fail {
                Err(())
            } else {
                Ok(())
            }
        }

        fn write_time(&mut self) -> Result<(), ()> {
            self.writes += 1;
            if self.fail {
                Err(())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_actions_dispatch() {
        let mut recorder = Recorder::default();
        ReadAction.execute(&mut recorder).unwrap();
        ReadAction.execute(&mut recorder).unwrap();
        WriteAction.execute(&mut recorder).unwrap();
        assert_eq!(recorder.reads, 2);
        assert_eq!(recorder.writes, 1);
    }

    #[test]
    fn test_actions_forward_errors() {
        let mut recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        assert_eq!(ReadAction.execute(&mut recorder), Err(()));
        assert_eq!(WriteAction.execute(&mut recorder), Err(()));
    }
}
