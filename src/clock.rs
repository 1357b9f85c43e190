//! Time sources used to stamp inodes.
//!
//! The filesystem never reads the wall clock directly. Every access or mutation asks the
//! [`Clock`] it was built with for "now", so tests can swap in a [`ManualClock`] and assert exact
//! timestamps.
//!
//! [`Clock`]: trait.Clock.html
//! [`ManualClock`]: struct.ManualClock.html

use std::fmt::Debug;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

/// A source of timestamps.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> SystemTime;
}

/// The system wall clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// # Example
///
/// ```
/// use std::time::{Duration, SystemTime};
/// use treefs::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(SystemTime::UNIX_EPOCH);
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now(), SystemTime::UNIX_EPOCH + Duration::from_secs(5));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    /// Creates a clock stopped at `start`.
    pub fn new(start: SystemTime) -> ManualClock {
        ManualClock { now: Mutex::new(start) }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Moves the clock to `to`, which may be earlier than the current time.
    pub fn set(&self, to: SystemTime) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}
