//! Push-button interrupt pipeline.
//!
//! ## Hardware
//!
//! Active-low momentary switch on [`BUTTON_GPIO`](crate::pins::BUTTON_GPIO)
//! with the internal pull-up enabled.  The interrupt trigger follows
//! [`ButtonTrigger`]:
//!
//! - **Falling edge**: one interrupt per press.
//! - **Level**: the pad is armed for the press level, then for the
//!   release level, alternating on every interrupt.  A held button raises
//!   one interrupt, and the pad keeps a level trigger that GPIO
//!   light-sleep wakeup can share.
//!
//! ## Contexts
//!
//! | Context         | Work                                             |
//! |-----------------|--------------------------------------------------|
//! | GPIO ISR        | pend `DeferredCall::ButtonPressed`, nothing else |
//! | Deferred worker | restart countdown, log the wake cause            |
//!
//! The ISR only *requests* the countdown restart; the worker performs it.
//! On ESP-IDF the worker is the FreeRTOS timer daemon, fed through
//! `xTimerPendFunctionCallFromISR`.

use crate::app::ports::{DeferredCall, DeferredPort};
use crate::config::ButtonTrigger;
use crate::error::Error;
use crate::wake::WakeLevel;

/// ISR trampoline body.  A full deferred-call queue is a fatal assertion:
/// a lost press is worse than a restart, and interrupt context can
/// neither retry nor apply backpressure.
#[inline]
pub fn on_button_edge<D: DeferredPort>(deferred: &D) {
    if let Err(e) = deferred.pend_from_isr(DeferredCall::ButtonPressed) {
        isr_assert_failed(e);
    }
}

/// Interrupt context: no formatting, no logger, no panic hook.
#[cfg(target_os = "espidf")]
fn isr_assert_failed(_err: Error) -> ! {
    // SAFETY: static NUL-terminated message; esp_system_abort never returns.
    unsafe { esp_idf_svc::sys::esp_system_abort(c"button ISR: deferred-call queue full".as_ptr()) }
}

#[cfg(not(target_os = "espidf"))]
fn isr_assert_failed(err: Error) -> ! {
    panic!("button ISR: {err}");
}

/// Press/release tracking for a level-triggered button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTracker {
    pub press: WakeLevel,
    pub armed: WakeLevel,
}

impl LevelTracker {
    /// Armed for the press level.
    pub const fn new(press: WakeLevel) -> Self {
        Self { press, armed: press }
    }

    /// The armed level fired.  Re-arms for the opposite level and returns
    /// `true` if this was a press (not a release).
    pub fn fire(&mut self) -> bool {
        let pressed = self.armed == self.press;
        self.armed = self.armed.inverted();
        pressed
    }
}

/// Level the pad is armed for right after setup, `None` for edge mode.
pub const fn initial_level(trigger: ButtonTrigger) -> Option<WakeLevel> {
    match trigger {
        ButtonTrigger::FallingEdge => None,
        ButtonTrigger::Level(press) => Some(press),
    }
}

#[cfg(target_os = "espidf")]
pub use esp::{ButtonContext, EspDeferred, setup};

#[cfg(target_os = "espidf")]
mod esp {
    use core::ffi::c_void;
    use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

    use esp_idf_hal::delay::BLOCK;
    use esp_idf_hal::task;
    use esp_idf_svc::sys::*;
    use log::{info, warn};

    use super::{LevelTracker, initial_level, on_button_edge};
    use crate::adapters::log_sink::LogEventSink;
    use crate::adapters::platform::{EspPlatform, check, level_intr_type};
    use crate::app::ports::{DeferredCall, DeferredPort, Pended};
    use crate::app::service::SleepService;
    use crate::config::ButtonTrigger;
    use crate::diagnostics::fatal;
    use crate::drivers::countdown_timer::EspCountdown;
    use crate::error::{Error, Result};
    use crate::wake::WakeLevel;

    /// Set by the ISR when a `ButtonPressed` call is queued, cleared by the
    /// worker before it handles one.  Presses in between coalesce.
    static BUTTON_PENDING: AtomicBool = AtomicBool::new(false);

    // Level mode only.  Written once by `setup` before the ISR is bound;
    // afterwards only the ISR touches `ARMED_HIGH`.
    static BUTTON_PIN: AtomicI32 = AtomicI32::new(0);
    static PRESS_HIGH: AtomicBool = AtomicBool::new(false);
    static ARMED_HIGH: AtomicBool = AtomicBool::new(false);

    fn level(high: bool) -> WakeLevel {
        if high { WakeLevel::High } else { WakeLevel::Low }
    }

    /// State reachable from the deferred worker.  Leaked at boot; after
    /// `setup` only the worker dereferences it.
    pub struct ButtonContext {
        pub countdown: Option<EspCountdown>,
    }

    /// Handle to the FreeRTOS pended-function service.  `ctx` is passed
    /// through to the worker unchanged.
    #[derive(Clone, Copy)]
    pub struct EspDeferred {
        ctx: *mut c_void,
    }

    impl EspDeferred {
        /// Deferred calls that carry no button context.
        pub fn detached() -> Self {
            Self { ctx: core::ptr::null_mut() }
        }
    }

    impl DeferredPort for EspDeferred {
        fn pend_from_isr(&self, call: DeferredCall) -> Result<Pended> {
            if call.coalesces() && BUTTON_PENDING.swap(true, Ordering::AcqRel) {
                return Ok(Pended::Coalesced);
            }
            let mut woken: BaseType_t = 0;
            // SAFETY: ISR-safe FreeRTOS API; `deferred_dispatch` is a static fn.
            let ret = unsafe {
                xTimerPendFunctionCallFromISR(
                    Some(deferred_dispatch),
                    self.ctx,
                    call.as_raw(),
                    &mut woken,
                )
            };
            if ret != 1 {
                if call.coalesces() {
                    BUTTON_PENDING.store(false, Ordering::Release);
                }
                return Err(Error::ResourceExhausted);
            }
            if woken != 0 {
                task::do_yield();
            }
            Ok(Pended::Queued)
        }

        fn pend(&self, call: DeferredCall) -> Result<Pended> {
            // SAFETY: task-context FreeRTOS API; blocks until queued.
            let ret = unsafe {
                xTimerPendFunctionCall(Some(deferred_dispatch), self.ctx, call.as_raw(), BLOCK)
            };
            if ret != 1 {
                return Err(Error::ResourceExhausted);
            }
            Ok(Pended::Queued)
        }
    }

    /// Deferred worker entry (timer daemon task).
    unsafe extern "C" fn deferred_dispatch(ctx: *mut c_void, raw: u32) {
        let Some(call) = DeferredCall::from_raw(raw) else {
            warn!("deferred: unknown call {}", raw);
            return;
        };
        if call.coalesces() {
            BUTTON_PENDING.store(false, Ordering::Release);
        }
        // SAFETY: ctx is null or the leaked ButtonContext; the timer daemon
        // is the only context that dereferences it after setup.
        let context = unsafe { ctx.cast::<ButtonContext>().as_mut() };
        let countdown = context.and_then(|c| c.countdown.as_mut());
        if let Err(e) = SleepService::dispatch(call, countdown, &EspPlatform, &mut LogEventSink) {
            fatal(e);
        }
    }

    /// GPIO ISR, edge mode.  No logging, no locks, no allocation.
    unsafe extern "C" fn button_gpio_isr(arg: *mut c_void) {
        on_button_edge(&EspDeferred { ctx: arg });
    }

    /// GPIO ISR, level mode.  Flips the armed level before pending so a
    /// held button does not re-trigger.
    unsafe extern "C" fn button_level_isr(arg: *mut c_void) {
        let mut tracker = LevelTracker {
            press: level(PRESS_HIGH.load(Ordering::Relaxed)),
            armed: level(ARMED_HIGH.load(Ordering::Relaxed)),
        };
        let pressed = tracker.fire();
        ARMED_HIGH.store(tracker.armed == WakeLevel::High, Ordering::Relaxed);
        // SAFETY: pin validated by `setup`; only the interrupt type changes,
        // the wakeup-enable bit set by `gpio_wakeup_enable` is kept.
        // Cannot fail for a valid pin.
        let _ = unsafe {
            gpio_set_intr_type(BUTTON_PIN.load(Ordering::Relaxed), level_intr_type(tracker.armed))
        };
        if pressed {
            on_button_edge(&EspDeferred { ctx: arg });
        }
    }

    /// Install the shared ISR service, configure the pin and bind the
    /// handler.  One-shot: call once from the main task.
    pub fn setup(
        pin: i32,
        trigger: ButtonTrigger,
        context: &'static mut ButtonContext,
    ) -> Result<()> {
        let arg = core::ptr::from_mut(context).cast::<c_void>();

        let (intr_type, isr): (gpio_int_type_t, unsafe extern "C" fn(*mut c_void)) =
            match initial_level(trigger) {
                None => (gpio_int_type_t_GPIO_INTR_NEGEDGE, button_gpio_isr),
                Some(press) => {
                    BUTTON_PIN.store(pin, Ordering::Relaxed);
                    PRESS_HIGH.store(press == WakeLevel::High, Ordering::Relaxed);
                    ARMED_HIGH.store(press == WakeLevel::High, Ordering::Relaxed);
                    (level_intr_type(press), button_level_isr)
                }
            };
        // Idle at the non-pressed level.
        let (pull_up_en, pull_down_en) = match trigger {
            ButtonTrigger::Level(WakeLevel::High) => (
                gpio_pullup_t_GPIO_PULLUP_DISABLE,
                gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            ),
            _ => (gpio_pullup_t_GPIO_PULLUP_ENABLE, gpio_pulldown_t_GPIO_PULLDOWN_DISABLE),
        };

        // SAFETY: called once from main() before the status loop; the ISR
        // registered below only pends a deferred call.
        unsafe {
            let ret = gpio_install_isr_service(0);
            if ret != ESP_ERR_INVALID_STATE as esp_err_t {
                check("gpio_install_isr_service", ret)?;
            }

            // For the light-sleep image this re-applies the level that
            // `gpio_wakeup_enable` already set on the pad.
            let btn_cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pin,
                mode: gpio_mode_t_GPIO_MODE_INPUT,
                pull_up_en,
                pull_down_en,
                intr_type,
            };
            check("gpio_config", gpio_config(&btn_cfg))?;
            check("gpio_isr_handler_add", gpio_isr_handler_add(pin, Some(isr), arg))?;
        }

        info!("button: GPIO{} {:?} -> deferred handler", pin, trigger);
        Ok(())
    }
}
