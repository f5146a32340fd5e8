//! Application service: the hexagonal core.
//!
//! [`SleepService`] owns the configuration and sequences boot-time setup.
//! The handlers that run in other execution contexts (deferred worker,
//! countdown expiry) are associated functions that take every port they
//! need, so the ESP-IDF trampolines can call them without a service
//! instance.
//!
//! ```text
//!  StatusPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │       SleepService        │
//!  PowerPort   ◀──│ boot · policy · handlers  │──▶ DeferredPort
//!  WakeSource  ◀──└──────────────────────────┘──▶ CountdownPort
//! ```

use core::time::Duration;

use log::{info, warn};

use crate::boot;
use crate::config::{Image, SystemConfig};
use crate::error::{Error, Result};
use crate::power::{self, DeepSleepPlan};

use super::events::AppEvent;
use super::ports::{
    CountdownPort, DeferredCall, DeferredPort, EventSink, Pended, PersistentState, PowerPort,
    StatusPort, WakeSourcePort,
};

// ───────────────────────────────────────────────────────────────
// SleepService
// ───────────────────────────────────────────────────────────────

pub struct SleepService {
    config: SystemConfig,
}

impl SleepService {
    /// Construct the service from a validated configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn image(&self) -> Image {
        self.config.image
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.config.status_interval_ms))
    }

    /// Full countdown duration, `None` for images that never deep-sleep.
    pub fn countdown_duration(&self) -> Option<Duration> {
        self.config
            .countdown_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
    }

    pub fn deep_sleep_plan(&self) -> DeepSleepPlan {
        DeepSleepPlan {
            pin: self.config.button_gpio,
            level: self.config.wakeup_level,
            timer_wakeup: Duration::from_millis(u64::from(self.config.timer_wakeup_ms)),
        }
    }

    // ── Boot sequence ─────────────────────────────────────────

    /// Count this boot and report it with the wake cause.
    pub fn record_boot<P, S, E>(&self, retained: &mut P, status: &S, sink: &mut E) -> u32
    where
        P: PersistentState,
        S: StatusPort,
        E: EventSink,
    {
        let boot_count = boot::record_boot(retained);
        sink.emit(&AppEvent::Booted {
            boot_count,
            cause: status.wake_cause(),
        });
        boot_count
    }

    /// Apply the power policy and, for the light-sleep image, the GPIO
    /// wake source.  Any error is fatal to the caller.
    pub fn configure<P, E>(&self, port: &mut P, sink: &mut E) -> Result<()>
    where
        P: PowerPort + WakeSourcePort,
        E: EventSink,
    {
        let policy = self.config.power_policy();
        power::configure_power_policy(port, &policy)?;
        sink.emit(&AppEvent::PolicyApplied(policy));

        if self.config.image == Image::LightSleep {
            power::enable_light_sleep_wakeup(
                port,
                self.config.button_gpio,
                self.config.wakeup_level,
            )?;
        }
        Ok(())
    }

    /// Push a self-check through the deferred path from task context.
    pub fn self_check<D, E>(deferred: &D, sink: &mut E) -> Result<()>
    where
        D: DeferredPort,
        E: EventSink,
    {
        sink.emit(&AppEvent::SelfCheckPending);
        log_pended(DeferredCall::SelfCheck, deferred.pend(DeferredCall::SelfCheck))?;
        sink.emit(&AppEvent::SelfCheckPended);
        Ok(())
    }

    // ── Deferred worker context ───────────────────────────────

    /// Route a deferred call to its handler.
    pub fn dispatch<C, S, E>(
        call: DeferredCall,
        countdown: Option<&mut C>,
        status: &S,
        sink: &mut E,
    ) -> Result<()>
    where
        C: CountdownPort,
        S: StatusPort,
        E: EventSink,
    {
        match call {
            DeferredCall::ButtonPressed => Self::on_button_pressed(countdown, status, sink),
            DeferredCall::SelfCheck => {
                sink.emit(&AppEvent::SelfCheckRan {
                    cause: status.wake_cause(),
                });
                Ok(())
            }
        }
    }

    /// Button press, task side: restart the countdown, then report.
    pub fn on_button_pressed<C, S, E>(
        countdown: Option<&mut C>,
        status: &S,
        sink: &mut E,
    ) -> Result<()>
    where
        C: CountdownPort,
        S: StatusPort,
        E: EventSink,
    {
        if let Some(countdown) = countdown {
            countdown.restart()?;
        }
        sink.emit(&AppEvent::ButtonPressed {
            cause: status.wake_cause(),
        });
        Ok(())
    }

    // ── Countdown expiry (timer task context) ─────────────────

    /// Countdown reached zero: arm wake sources and enter deep sleep.
    pub fn on_countdown_expired<W, E>(
        plan: &DeepSleepPlan,
        port: &mut W,
        sink: &mut E,
    ) -> Result<()>
    where
        W: WakeSourcePort,
        E: EventSink,
    {
        sink.emit(&AppEvent::CountdownExpired);
        power::enable_deep_sleep_wakeup(port, plan.pin, plan.level, plan.timer_wakeup)
    }

    // ── Main loop ─────────────────────────────────────────────

    /// One status line: raw button level and the current wake cause.
    pub fn report_status<S, E>(&self, status: &S, sink: &mut E)
    where
        S: StatusPort,
        E: EventSink,
    {
        sink.emit(&AppEvent::Status {
            interval: self.status_interval(),
            level: status.pin_level(self.config.button_gpio),
            cause: status.wake_cause(),
        });
    }
}

/// Log how a pend request was absorbed.  Task context only.
pub fn log_pended(call: DeferredCall, result: Result<Pended>) -> Result<Pended> {
    match result {
        Ok(Pended::Coalesced) => info!("deferred: {:?} coalesced with pending call", call),
        Ok(Pended::Queued) => {}
        Err(Error::ResourceExhausted) => warn!("deferred: queue full, {:?} dropped", call),
        Err(e) => warn!("deferred: {:?} failed: {}", call, e),
    }
    result
}
