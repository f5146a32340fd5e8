//! Fatal-error policy and panic reporting.
//!
//! Every setup call is must-succeed: a half-configured power or wake
//! policy can boot-loop the device, so there is no degraded mode.  A
//! failure logs one diagnostic line and restarts the chip.

use log::error;

use crate::error::Error;

/// Log `err` and restart the chip.
#[cfg(target_os = "espidf")]
pub fn fatal(err: Error) -> ! {
    error!("FATAL: {} - restarting", err);
    // SAFETY: esp_restart has no preconditions and never returns.
    unsafe { esp_idf_svc::sys::esp_restart() }
}

/// Log `err` and abort the simulation.
#[cfg(not(target_os = "espidf"))]
pub fn fatal(err: Error) -> ! {
    error!("FATAL: {} - restarting", err);
    panic!("fatal: {err}");
}

/// Install a panic hook that reports the reason on the console before the
/// platform panic handler resets the chip.
///
/// Must be called once during init, after the logger is up.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        match info.location() {
            Some(loc) => error!("PANIC: {} at {}:{}", reason, loc.file(), loc.line()),
            None => error!("PANIC: {}", reason),
        }
    }));
}
