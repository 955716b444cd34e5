//! Countdown timers driven by explicit ticks.
//!
//! Scheduling the ticks is the host's job; a countdown only tracks what is
//! left and reports the moment it runs out.

use serde::{Deserialize, Serialize};

/// Remaining whole seconds of a quiz or question timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Countdown {
    remaining: u64,
}

impl Countdown {
    pub fn new(seconds: u64) -> Self {
        Self { remaining: seconds }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Override the remaining time. Never reports expiry.
    pub fn set(&mut self, seconds: u64) {
        self.remaining = seconds;
    }

    /// Count down by `elapsed` seconds.
    ///
    /// Returns `true` only on the tick that takes the countdown from
    /// non-zero to zero; an already expired countdown never fires again.
    pub fn tick(&mut self, elapsed: u64) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.remaining == 0
    }
}
