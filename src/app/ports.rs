//! Port traits: the hexagonal boundary between domain logic and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SleepService (domain)
//! ```
//!
//! The ESP-IDF adapter implements these with raw `esp_idf_svc::sys`
//! calls; the simulation adapter and the test mocks implement them on
//! the host.  The domain never touches registers directly.
//!
//! ## Execution contexts
//!
//! - [`DeferredPort::pend_from_isr`] is the only method callable from
//!   interrupt context.  It must not block, allocate, or log.
//! - Everything else runs in task context (main task, deferred worker,
//!   or the timer task).

use core::time::Duration;

use crate::error::Result;
use crate::power::PowerPolicy;
use crate::wake::{WakeCause, WakeLevel};

// ───────────────────────────────────────────────────────────────
// Power management (DFS + automatic light sleep)
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    /// Apply frequency bounds and the idle light-sleep switch.
    fn configure(&mut self, policy: &PowerPolicy) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Wake sources + sleep entry
// ───────────────────────────────────────────────────────────────

pub trait WakeSourcePort {
    /// Level-triggered GPIO wakeup (light sleep only).
    fn enable_gpio_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()>;

    /// Drop every registered wake source.
    fn disable_all(&mut self) -> Result<()>;

    /// Single RTC pin wakeup (deep sleep).
    fn enable_ext0_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()>;

    /// Wake after `after` has elapsed.
    fn enable_timer_wakeup(&mut self, after: Duration) -> Result<()>;

    /// Enter deep sleep.  Does not return on hardware; execution
    /// restarts from boot on the next wake.
    fn enter_deep_sleep(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Read-only platform status
// ───────────────────────────────────────────────────────────────

pub trait StatusPort {
    /// Cause of the most recent wake from sleep.
    fn wake_cause(&self) -> WakeCause;

    /// Raw input level of `pin` (`true` = high).
    fn pin_level(&self, pin: i32) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Deferred calls (ISR → task handoff)
// ───────────────────────────────────────────────────────────────

/// Work an interrupt (or the boot sequence) hands to the deferred worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DeferredCall {
    /// Falling edge on the push button.
    ButtonPressed = 1,
    /// Boot-time check that the deferred path is alive.
    SelfCheck = 2,
}

impl DeferredCall {
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::ButtonPressed),
            2 => Some(Self::SelfCheck),
            _ => None,
        }
    }

    /// A second identical call while one is still pending adds nothing;
    /// the pending one stands in for both.
    pub const fn coalesces(self) -> bool {
        matches!(self, Self::ButtonPressed)
    }
}

/// How a pend request was absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pended {
    Queued,
    /// An identical call was already pending.
    Coalesced,
}

pub trait DeferredPort {
    /// Schedule `call` from interrupt context.  Never blocks.
    /// `Err(ResourceExhausted)` means the queue is full.
    fn pend_from_isr(&self, call: DeferredCall) -> Result<Pended>;

    /// Schedule `call` from task context.  May block until a slot frees.
    fn pend(&self, call: DeferredCall) -> Result<Pended>;
}

// ───────────────────────────────────────────────────────────────
// Countdown timer handle
// ───────────────────────────────────────────────────────────────

pub trait CountdownPort {
    /// Restore the full duration.  No-op once the countdown has expired.
    /// Task context only.
    fn restart(&mut self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Retained memory (survives deep sleep, not power loss)
// ───────────────────────────────────────────────────────────────

/// Capability over the retained-memory region.  Distinct from ordinary
/// RAM: contents survive deep sleep but are zeroed by a cold boot.
pub trait PersistentState {
    fn boot_count(&self) -> u32;
    fn set_boot_count(&mut self, count: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → console)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
