//! Restartable deep-sleep countdown.
//!
//! ```text
//!   Running(remaining) ──reset()──────────────▶ Running(full)
//!   Running(remaining) ──advance(≥ remaining)─▶ Expired   (reported once)
//!   Expired            ──reset()/advance()────▶ Expired
//! ```
//!
//! This is the tick-driven form used by the simulation adapter and the
//! tests.  On hardware the same contract is provided by a one-shot
//! `esp_timer` (see [`crate::drivers::countdown_timer`]).

use core::time::Duration;

use log::debug;

use crate::app::ports::CountdownPort;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownState {
    Running { remaining: Duration },
    Expired,
}

/// Returned by [`Countdown::advance`] on the tick that crosses zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired;

#[derive(Debug, Clone)]
pub struct Countdown {
    full: Duration,
    state: CountdownState,
}

impl Countdown {
    /// Start running with the full duration.
    pub fn new(full: Duration) -> Self {
        Self {
            full,
            state: CountdownState::Running { remaining: full },
        }
    }

    pub fn is_expired(&self) -> bool {
        self.state == CountdownState::Expired
    }

    /// Time left, `None` once expired.
    pub fn remaining(&self) -> Option<Duration> {
        match self.state {
            CountdownState::Running { remaining } => Some(remaining),
            CountdownState::Expired => None,
        }
    }

    /// Restore the full duration.  Returns `false` if already expired.
    pub fn reset(&mut self) -> bool {
        match self.state {
            CountdownState::Running { .. } => {
                self.state = CountdownState::Running { remaining: self.full };
                true
            }
            CountdownState::Expired => false,
        }
    }

    /// Let `elapsed` pass.  Yields [`Expired`] exactly once per countdown.
    pub fn advance(&mut self, elapsed: Duration) -> Option<Expired> {
        let CountdownState::Running { remaining } = self.state else {
            return None;
        };
        match remaining.checked_sub(elapsed) {
            Some(left) if !left.is_zero() => {
                self.state = CountdownState::Running { remaining: left };
                None
            }
            _ => {
                self.state = CountdownState::Expired;
                Some(Expired)
            }
        }
    }
}

impl CountdownPort for Countdown {
    fn restart(&mut self) -> Result<()> {
        if !self.reset() {
            debug!("countdown: restart ignored, already expired");
        }
        Ok(())
    }
}
