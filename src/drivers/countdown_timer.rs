//! Deep-sleep countdown on ESP-IDF's `esp_timer`.
//!
//! A one-shot timer dispatched in the ESP timer task (not ISR), so the
//! expiry callback may log and reconfigure sleep.  `restart()` maps to
//! `esp_timer_restart`, which re-arms with the full period no matter how
//! much of it had elapsed.

use core::ffi::c_void;
use core::time::Duration;

use esp_idf_svc::sys::*;
use log::{debug, info};

use crate::adapters::log_sink::LogEventSink;
use crate::adapters::platform::{EspPlatform, check};
use crate::app::ports::CountdownPort;
use crate::app::service::SleepService;
use crate::diagnostics::fatal;
use crate::error::{Error, Result};
use crate::power::DeepSleepPlan;

pub struct EspCountdown {
    handle: esp_timer_handle_t,
    full_us: u64,
}

impl EspCountdown {
    /// Create and arm the countdown.  `plan` is handed to the expiry
    /// callback and must outlive the timer.
    pub fn start(full: Duration, plan: &'static DeepSleepPlan) -> Result<Self> {
        let args = esp_timer_create_args_t {
            callback: Some(countdown_expired_cb),
            arg: core::ptr::from_ref(plan).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"deep-sleep".as_ptr(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        let full_us = full.as_micros() as u64;

        // SAFETY: args outlives the create call; handle is written once here
        // and only used from task context afterwards.
        unsafe {
            check("esp_timer_create", esp_timer_create(&args, &mut handle))?;
            check("esp_timer_start_once", esp_timer_start_once(handle, full_us))?;
        }

        info!("countdown: deep sleep in {} ms unless the button is pressed", full.as_millis());
        Ok(Self { handle, full_us })
    }
}

impl CountdownPort for EspCountdown {
    fn restart(&mut self) -> Result<()> {
        // SAFETY: handle came from esp_timer_create and is never deleted.
        let ret = unsafe { esp_timer_restart(self.handle, self.full_us) };
        if ret == ESP_ERR_INVALID_STATE as esp_err_t {
            // One-shot already fired; the expiry callback owns the device now.
            debug!("countdown: restart ignored, already expired");
            return Ok(());
        }
        check("esp_timer_restart", ret)
    }
}

/// Expiry, ESP timer task context.
unsafe extern "C" fn countdown_expired_cb(arg: *mut c_void) {
    // SAFETY: arg is the &'static DeepSleepPlan passed to `start`.
    let Some(plan) = (unsafe { arg.cast::<DeepSleepPlan>().as_ref() }) else {
        fatal(Error::platform("countdown_expired_cb", ESP_ERR_INVALID_ARG as esp_err_t));
    };
    if let Err(e) = SleepService::on_countdown_expired(plan, &mut EspPlatform, &mut LogEventSink) {
        fatal(e);
    }
}
