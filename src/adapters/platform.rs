//! ESP-IDF platform adapter.
//!
//! Implements [`PowerPort`], [`WakeSourcePort`] and [`StatusPort`] with raw
//! `esp_idf_svc::sys` calls.  Zero-sized: every call goes straight to the
//! IDF services, so a fresh `EspPlatform` can be conjured in any task
//! context (deferred worker, timer task) without sharing state.

use core::time::Duration;

use esp_idf_svc::sys::*;
use log::info;

use crate::app::ports::{PowerPort, StatusPort, WakeSourcePort};
use crate::error::{Error, Result};
use crate::power::PowerPolicy;
use crate::wake::{WakeCause, WakeLevel};

/// Map an `esp_err_t` onto the firmware error type.
pub(crate) fn check(op: &'static str, ret: esp_err_t) -> Result<()> {
    EspError::convert(ret).map_err(|e| Error::platform(op, e.code()))
}

/// Level interrupt type matching `level`.  Used for GPIO wakeup and for
/// the level-triggered button.
pub(crate) fn level_intr_type(level: WakeLevel) -> gpio_int_type_t {
    match level {
        WakeLevel::Low => gpio_int_type_t_GPIO_INTR_LOW_LEVEL,
        WakeLevel::High => gpio_int_type_t_GPIO_INTR_HIGH_LEVEL,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EspPlatform;

impl EspPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl PowerPort for EspPlatform {
    fn configure(&mut self, policy: &PowerPolicy) -> Result<()> {
        let cfg = esp_pm_config_t {
            max_freq_mhz: i32::from(policy.max_freq_mhz),
            min_freq_mhz: i32::from(policy.min_freq_mhz),
            light_sleep_enable: policy.light_sleep_enable,
        };
        // SAFETY: esp_pm_configure copies the config before returning.
        check("esp_pm_configure", unsafe {
            esp_pm_configure(core::ptr::from_ref(&cfg).cast())
        })
    }
}

impl WakeSourcePort for EspPlatform {
    fn enable_gpio_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()> {
        // SAFETY: plain register configuration on a validated pin number.
        unsafe {
            check("gpio_wakeup_enable", gpio_wakeup_enable(pin, level_intr_type(level)))?;
            check("esp_sleep_enable_gpio_wakeup", esp_sleep_enable_gpio_wakeup())
        }
    }

    fn disable_all(&mut self) -> Result<()> {
        // SAFETY: no preconditions.
        check("esp_sleep_disable_wakeup_source", unsafe {
            esp_sleep_disable_wakeup_source(esp_sleep_source_t_ESP_SLEEP_WAKEUP_ALL)
        })
    }

    fn enable_ext0_wakeup(&mut self, pin: i32, level: WakeLevel) -> Result<()> {
        // SAFETY: pin is an RTC-capable GPIO (checked by the IDF call).
        unsafe {
            check(
                "esp_sleep_enable_ext0_wakeup",
                esp_sleep_enable_ext0_wakeup(pin, level.as_raw()),
            )?;
            // The RTC domain owns the pad during deep sleep; keep the
            // button's idle level so it does not wake us immediately.
            match level {
                WakeLevel::Low => {
                    check("rtc_gpio_pullup_en", rtc_gpio_pullup_en(pin))?;
                    check("rtc_gpio_pulldown_dis", rtc_gpio_pulldown_dis(pin))
                }
                WakeLevel::High => {
                    check("rtc_gpio_pulldown_en", rtc_gpio_pulldown_en(pin))?;
                    check("rtc_gpio_pullup_dis", rtc_gpio_pullup_dis(pin))
                }
            }
        }
    }

    fn enable_timer_wakeup(&mut self, after: Duration) -> Result<()> {
        // SAFETY: no preconditions.
        check("esp_sleep_enable_timer_wakeup", unsafe {
            esp_sleep_enable_timer_wakeup(after.as_micros() as u64)
        })
    }

    fn enter_deep_sleep(&mut self) {
        info!("Entering deep sleep...");
        // SAFETY: wake sources were armed by the caller; never returns.
        unsafe { esp_deep_sleep_start() }
    }
}

impl StatusPort for EspPlatform {
    fn wake_cause(&self) -> WakeCause {
        // SAFETY: read-only query of the sleep module state.
        WakeCause::from_raw(unsafe { esp_sleep_get_wakeup_cause() } as u32)
    }

    fn pin_level(&self, pin: i32) -> bool {
        // SAFETY: gpio_get_level is a read-only register access.
        (unsafe { gpio_get_level(pin) }) != 0
    }
}
