//! SimClock - Simulated Time
//!
//! TigerStyle: Deterministic tick counter. No reliance on system time.

use crate::constants::{TICK_SECS, TIME_SECS_PER_HOUR, TIME_SECS_PER_MINUTE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in simulated time, in whole seconds since the run started.
///
/// Displays as `HH:MM:SS`. Hours are not wrapped at 24 and widen past 99.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Seconds since the start of the run.
    #[must_use]
    pub fn secs(self) -> u64 {
        self.0
    }

    /// Whole hours.
    #[must_use]
    pub fn hours(self) -> u64 {
        self.0 / TIME_SECS_PER_HOUR
    }

    /// Minutes within the hour.
    #[must_use]
    pub fn minutes(self) -> u64 {
        (self.0 % TIME_SECS_PER_HOUR) / TIME_SECS_PER_MINUTE
    }

    /// Seconds within the minute.
    #[must_use]
    pub fn seconds(self) -> u64 {
        self.0 % TIME_SECS_PER_MINUTE
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// A simulated clock that only moves forward, one tick at a time.
///
/// TigerStyle:
/// - Time only moves forward
/// - All time operations are explicit
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Current time in seconds since the run started
    current_secs: u64,
}

impl SimClock {
    /// Create a new clock starting at time zero.
    ///
    /// # Example
    /// ```
    /// use queuesim::SimClock;
    /// let clock = SimClock::new();
    /// assert_eq!(clock.now_secs(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self { current_secs: 0 }
    }

    /// Current time in seconds.
    #[must_use]
    pub fn now_secs(&self) -> u64 {
        self.current_secs
    }

    /// Current time as a [`Timestamp`] for events.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        Timestamp(self.current_secs)
    }

    /// Advance by one tick.
    ///
    /// # Panics
    /// Panics if the counter would overflow.
    ///
    /// # Returns
    /// The new current time.
    pub fn tick(&mut self) -> u64 {
        let old_secs = self.current_secs;
        self.current_secs = self
            .current_secs
            .checked_add(TICK_SECS)
            .expect("simulated time overflowed u64");

        // Postcondition
        assert!(self.current_secs > old_secs, "time must not go backwards");

        self.current_secs
    }
}
