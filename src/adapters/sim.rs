//! Host-side simulation of the whole device.
//!
//! [`SimPlatform`] stands in for the ESP-IDF power, sleep and GPIO
//! services and records every call.  [`SimDevice`] wires it to the same
//! [`SleepService`] the firmware runs, with a [`DeferredQueue`] as the
//! deferred worker and a tick-driven [`Countdown`], so a boot, a button
//! press or a deep-sleep cycle can be replayed without hardware.

use core::time::Duration;

use log::{debug, info};

use crate::adapters::log_sink::LogEventSink;
use crate::adapters::retained::MemoryRetained;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PowerPort, StatusPort, WakeSourcePort};
use crate::app::service::SleepService;
use crate::config::{Image, SystemConfig};
use crate::countdown::Countdown;
use crate::deferred::DeferredQueue;
use crate::drivers::button::on_button_edge;
use crate::error::{Error, Result};
use crate::power::PowerPolicy;
use crate::wake::{WakeCause, WakeLevel};

/// Generic failure code returned by injected faults (`ESP_FAIL`).
pub const SIM_FAIL: i32 = -1;

// ───────────────────────────────────────────────────────────────
// SimPlatform
// ───────────────────────────────────────────────────────────────

/// One recorded platform request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Configure(PowerPolicy),
    GpioWakeup { pin: i32, level: WakeLevel },
    DisableAll,
    Ext0 { pin: i32, level: WakeLevel },
    Timer(Duration),
    DeepSleep,
}

#[derive(Debug, Clone)]
pub struct SimPlatform {
    calls: Vec<PlatformCall>,
    wake_cause: WakeCause,
    /// Bit `n` set = GPIO`n` reads high.  All pins idle high (pull-ups).
    levels: u64,
    fail_op: Option<&'static str>,
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new(WakeCause::Undefined)
    }
}

impl SimPlatform {
    pub fn new(wake_cause: WakeCause) -> Self {
        Self {
            calls: Vec::new(),
            wake_cause,
            levels: u64::MAX,
            fail_op: None,
        }
    }

    pub fn calls(&self) -> &[PlatformCall] {
        &self.calls
    }

    pub fn set_wake_cause(&mut self, cause: WakeCause) {
        self.wake_cause = cause;
    }

    pub fn set_pin_level(&mut self, pin: i32, high: bool) {
        if !(0..64).contains(&pin) {
            return;
        }
        let bit = 1u64 << pin;
        if high {
            self.levels |= bit;
        } else {
            self.levels &= !bit;
        }
    }

    /// Make the named platform call fail with [`SIM_FAIL`] from now on.
    pub fn fail_on(&mut self, op: &'static str) {
        self.fail_op = Some(op);
    }

    pub fn deep_sleep_entered(&self) -> bool {
        self.calls.contains(&PlatformCall::DeepSleep)
    }

    fn call(&mut self, op: &'static str, call: PlatformCall) -> Result<()> {
        if self.fail_op == Some(op) {
            return Err(Error::platform(op, SIM_FAIL));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl PowerPort for SimPlatform {
    fn configure(&mut self, policy: &PowerPolicy) -> Result<()> {
        self.call("esp_pm_configure", PlatformCall::Configure(*policy))
    }
}

impl WakeSourcePort for SimPlatform {
    fn enable_gpio_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()> {
        self.call("gpio_wakeup_enable", PlatformCall::GpioWakeup { pin, level })
    }

    fn disable_all(&mut self) -> Result<()> {
        self.call("esp_sleep_disable_wakeup_source", PlatformCall::DisableAll)
    }

    fn enable_ext0_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()> {
        self.call("esp_sleep_enable_ext0_wakeup", PlatformCall::Ext0 { pin, level })
    }

    fn enable_timer_wakeup(&mut self, after: Duration) -> Result<()> {
        self.call("esp_sleep_enable_timer_wakeup", PlatformCall::Timer(after))
    }

    fn enter_deep_sleep(&mut self) {
        info!("Entering deep sleep...");
        self.calls.push(PlatformCall::DeepSleep);
    }
}

impl StatusPort for SimPlatform {
    fn wake_cause(&self) -> WakeCause {
        self.wake_cause
    }

    fn pin_level(&self, pin: i32) -> bool {
        (0..64).contains(&pin) && self.levels & (1u64 << pin) != 0
    }
}

// ───────────────────────────────────────────────────────────────
// Event recording
// ───────────────────────────────────────────────────────────────

/// Logs every event like the firmware does and keeps a copy.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<AppEvent>,
}

impl EventLog {
    pub fn events(&self) -> &[AppEvent] {
        &self.events
    }

    /// Console lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        LogEventSink.emit(event);
        self.events.push(event.clone());
    }
}

// ───────────────────────────────────────────────────────────────
// SimDevice
// ───────────────────────────────────────────────────────────────

/// One booted instance of an image.  A deep-sleep wake produces a new
/// instance that inherits only the retained memory.
pub struct SimDevice {
    svc: SleepService,
    platform: SimPlatform,
    retained: MemoryRetained,
    deferred: DeferredQueue,
    countdown: Option<Countdown>,
    log: EventLog,
    boot_count: u32,
    since_status: Duration,
}

impl SimDevice {
    /// Cold boot: retained memory starts zeroed.
    pub fn power_on(image: Image) -> Result<Self> {
        Self::boot(SystemConfig::for_image(image), MemoryRetained::new(), WakeCause::Undefined)
    }

    /// Run the boot sequence with the given retained memory and wake cause.
    pub fn boot(config: SystemConfig, retained: MemoryRetained, cause: WakeCause) -> Result<Self> {
        Self::boot_on(config, retained, SimPlatform::new(cause))
    }

    /// Boot on a prepared platform (e.g. one with an injected fault).
    pub fn boot_on(
        config: SystemConfig,
        mut retained: MemoryRetained,
        mut platform: SimPlatform,
    ) -> Result<Self> {
        config.validate()?;
        let svc = SleepService::new(config);
        let mut log = EventLog::default();

        let boot_count = svc.record_boot(&mut retained, &platform, &mut log);
        svc.configure(&mut platform, &mut log)?;

        let deferred = DeferredQueue::new();
        SleepService::self_check(&deferred, &mut log)?;

        let countdown = svc.countdown_duration().map(|duration| {
            log.emit(&AppEvent::CountdownStarted { duration });
            Countdown::new(duration)
        });

        let mut device = Self {
            svc,
            platform,
            retained,
            deferred,
            countdown,
            log,
            boot_count,
            since_status: Duration::ZERO,
        };
        device.run_deferred()?;
        Ok(device)
    }

    pub fn platform(&self) -> &SimPlatform {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut SimPlatform {
        &mut self.platform
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn boot_count(&self) -> u32 {
        self.boot_count
    }

    pub fn retained(&self) -> MemoryRetained {
        self.retained
    }

    pub fn countdown_remaining(&self) -> Option<Duration> {
        self.countdown.as_ref().and_then(Countdown::remaining)
    }

    pub fn in_deep_sleep(&self) -> bool {
        self.platform.deep_sleep_entered()
    }

    /// Falling edge on the button: the ISR path only pends.
    pub fn press_button(&self) {
        on_button_edge(&self.deferred);
    }

    /// The idle task came back from automatic light sleep.  RAM and the
    /// running countdown are untouched; only the wake cause changes.
    pub fn light_sleep_wake(&mut self, cause: WakeCause) {
        debug!("sim: light sleep wake ({})", cause);
        self.platform.set_wake_cause(cause);
    }

    /// Advance simulated time by `elapsed`.  Order per tick: deferred
    /// calls, countdown, status line.  Nothing runs once asleep.
    pub fn step(&mut self, elapsed: Duration) -> Result<()> {
        if self.in_deep_sleep() {
            return Ok(());
        }
        self.run_deferred()?;

        let expired = self
            .countdown
            .as_mut()
            .is_some_and(|countdown| countdown.advance(elapsed).is_some());
        if expired {
            let plan = self.svc.deep_sleep_plan();
            SleepService::on_countdown_expired(&plan, &mut self.platform, &mut self.log)?;
            if self.in_deep_sleep() {
                return Ok(());
            }
        }

        self.since_status += elapsed;
        let interval = self.svc.status_interval();
        while self.since_status >= interval {
            self.since_status -= interval;
            self.svc.report_status(&self.platform, &mut self.log);
        }
        Ok(())
    }

    /// Step in `tick` increments until `total` has passed or the device
    /// is in deep sleep.
    pub fn run_for(&mut self, total: Duration, tick: Duration) -> Result<()> {
        let mut left = total;
        while !left.is_zero() && !self.in_deep_sleep() {
            let dt = tick.min(left);
            self.step(dt)?;
            left -= dt;
        }
        Ok(())
    }

    /// Wake from deep sleep: execution restarts from boot with only the
    /// retained memory carried over.
    pub fn wake_from_deep_sleep(self, cause: WakeCause) -> Result<Self> {
        Self::boot(self.svc.config().clone(), self.retained, cause)
    }

    /// Power loss and cold boot.
    pub fn power_cycle(self) -> Result<Self> {
        let mut retained = self.retained;
        retained.power_cycle();
        Self::boot(self.svc.config().clone(), retained, WakeCause::Undefined)
    }

    fn run_deferred(&mut self) -> Result<()> {
        while let Some(call) = self.deferred.pop() {
            SleepService::dispatch(call, self.countdown.as_mut(), &self.platform, &mut self.log)?;
        }
        Ok(())
    }
}
