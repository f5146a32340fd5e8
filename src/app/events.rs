//! Outbound application events.
//!
//! The [`SleepService`](super::service::SleepService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  `Display` renders the
//! console line for each one.

use core::fmt;
use core::time::Duration;

use crate::power::PowerPolicy;
use crate::wake::WakeCause;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot recorded in retained memory.
    Booted { boot_count: u32, cause: WakeCause },

    /// Power policy accepted by the platform.
    PolicyApplied(PowerPolicy),

    /// Deferred handler ran for a button press.
    ButtonPressed { cause: WakeCause },

    /// Periodic main-loop status.
    Status { interval: Duration, level: bool, cause: WakeCause },

    /// Boot-time deferred-path check is about to be pended.
    SelfCheckPending,

    /// Boot-time check was accepted by the deferred service.
    SelfCheckPended,

    /// Boot-time check ran on the deferred worker.
    SelfCheckRan { cause: WakeCause },

    /// Deep-sleep countdown armed.
    CountdownStarted { duration: Duration },

    /// Deep-sleep countdown reached zero.
    CountdownExpired,
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booted { boot_count, cause } => {
                write!(f, "Boot count: {boot_count}, wakeup cause: {cause}")
            }
            Self::PolicyApplied(p) => write!(
                f,
                "Power policy: {}-{} MHz, light sleep {}",
                p.min_freq_mhz,
                p.max_freq_mhz,
                if p.light_sleep_enable { "enabled" } else { "disabled" }
            ),
            Self::ButtonPressed { cause } => {
                write!(f, "push button pressed - wakeup cause: {cause}")
            }
            Self::Status { interval, level, cause } => write!(
                f,
                "Another {} expired - level = {}, wakeup cause: {}",
                Span(*interval),
                u8::from(*level),
                cause
            ),
            Self::SelfCheckPending => f.write_str("about to pend function call"),
            Self::SelfCheckPended => f.write_str("done pend function call"),
            Self::SelfCheckRan { cause } => {
                write!(f, "deferred call path alive - wakeup cause: {cause}")
            }
            Self::CountdownStarted { duration } => {
                write!(f, "Deep sleep timer started - {}", Span(*duration))
            }
            Self::CountdownExpired => {
                f.write_str("Deep sleep timer expired - requesting deep sleep")
            }
        }
    }
}

/// Whole seconds as `5s`, anything finer as `500ms`.
struct Span(Duration);

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.subsec_millis() == 0 {
            write!(f, "{}s", self.0.as_secs())
        } else {
            write!(f, "{}ms", self.0.as_millis())
        }
    }
}
