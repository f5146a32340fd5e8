//! Recording port mocks for integration tests.
//!
//! Every wake-source request lands in one shared call list so tests can
//! assert on ordering without touching real sleep registers.

use std::time::Duration;

use sleepwake::app::events::AppEvent;
use sleepwake::app::ports::{EventSink, StatusPort, WakeSourcePort};
use sleepwake::error::{Error, Result};
use sleepwake::wake::{WakeCause, WakeLevel};

// ── Wake-source call record ───────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum WakeCall {
    Gpio(i32, WakeLevel),
    DisableAll,
    Ext0(i32, WakeLevel),
    Timer(Duration),
    DeepSleep,
}

// ── MockWakeSources ───────────────────────────────────────────

#[derive(Default)]
pub struct MockWakeSources {
    pub calls: Vec<WakeCall>,
    /// Fail the call at this index (0-based, counting only fallible calls).
    pub fail_at: Option<usize>,
    fallible_seen: usize,
}

#[allow(dead_code)]
impl MockWakeSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub fn slept(&self) -> bool {
        self.calls.contains(&WakeCall::DeepSleep)
    }

    fn record(&mut self, call: WakeCall) -> Result<()> {
        let index = self.fallible_seen;
        self.fallible_seen += 1;
        if self.fail_at == Some(index) {
            return Err(Error::platform("mock", -1));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl WakeSourcePort for MockWakeSources {
    fn enable_gpio_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()> {
        self.record(WakeCall::Gpio(pin, level))
    }

    fn disable_all(&mut self) -> Result<()> {
        self.record(WakeCall::DisableAll)
    }

    fn enable_ext0_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()> {
        self.record(WakeCall::Ext0(pin, level))
    }

    fn enable_timer_wakeup(&mut self, after: Duration) -> Result<()> {
        self.record(WakeCall::Timer(after))
    }

    fn enter_deep_sleep(&mut self) {
        self.calls.push(WakeCall::DeepSleep);
    }
}

// ── FixedStatus ───────────────────────────────────────────────

pub struct FixedStatus {
    pub cause: WakeCause,
    pub level: bool,
}

impl StatusPort for FixedStatus {
    fn wake_cause(&self) -> WakeCause {
        self.cause
    }

    fn pin_level(&self, _pin: i32) -> bool {
        self.level
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
