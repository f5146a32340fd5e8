//! Power policy and wake-source configuration.
//!
//! ```text
//!   boot ──▶ configure_power_policy ──▶ DFS + auto light sleep
//!        ──▶ enable_light_sleep_wakeup ──▶ GPIO level wake (light sleep)
//!
//!   countdown expiry ──▶ enable_deep_sleep_wakeup
//!                          1. disable_all      (stale sources reboot-loop us)
//!                          2. ext0 pin wake
//!                          3. timer wake
//!                          4. enter deep sleep (does not return on hardware)
//! ```

use core::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::{PowerPort, WakeSourcePort};
use crate::error::{ConfigError, Result};
use crate::wake::WakeLevel;

/// CPU frequency steps the clock tree can produce (MHz).
pub const SUPPORTED_FREQS_MHZ: [u16; 6] = [10, 20, 40, 80, 160, 240];

/// Dynamic frequency scaling bounds plus the idle light-sleep switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerPolicy {
    pub min_freq_mhz: u16,
    pub max_freq_mhz: u16,
    pub light_sleep_enable: bool,
}

impl PowerPolicy {
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        for mhz in [self.min_freq_mhz, self.max_freq_mhz] {
            if !SUPPORTED_FREQS_MHZ.contains(&mhz) {
                return Err(ConfigError::UnsupportedFrequency(mhz));
            }
        }
        if self.min_freq_mhz > self.max_freq_mhz {
            return Err(ConfigError::MinAboveMax {
                min_mhz: self.min_freq_mhz,
                max_mhz: self.max_freq_mhz,
            });
        }
        Ok(())
    }
}

/// Everything the countdown expiry needs to put the device to sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepSleepPlan {
    pub pin: i32,
    pub level: WakeLevel,
    pub timer_wakeup: Duration,
}

/// Validate and apply the power policy.  Process-wide for the rest of
/// the boot; the caller treats any error as fatal.
pub fn configure_power_policy<P: PowerPort>(port: &mut P, policy: &PowerPolicy) -> Result<()> {
    policy.validate()?;
    port.configure(policy)?;
    info!(
        "power: DFS {}-{} MHz, auto light sleep {}",
        policy.min_freq_mhz,
        policy.max_freq_mhz,
        if policy.light_sleep_enable { "on" } else { "off" }
    );
    Ok(())
}

/// Register a level-triggered GPIO wake source for light sleep.
pub fn enable_light_sleep_wakeup<W: WakeSourcePort>(
    port: &mut W,
    pin: i32,
    level: WakeLevel,
) -> Result<()> {
    port.enable_gpio_wakeup(pin, level)?;
    info!("wakeup: light sleep on GPIO{} {:?}", pin, level);
    Ok(())
}

/// Clear every wake source, arm the pin and timer, then enter deep sleep.
///
/// On hardware the final step restarts the chip from boot and this
/// function never returns.  It only returns `Ok` on targets whose port
/// records the request instead of sleeping.
pub fn enable_deep_sleep_wakeup<W: WakeSourcePort>(
    port: &mut W,
    pin: i32,
    level: WakeLevel,
    timeout: Duration,
) -> Result<()> {
    port.disable_all()?;
    debug!("wakeup: all sources cleared");
    port.enable_ext0_wakeup(pin, level)?;
    port.enable_timer_wakeup(timeout)?;
    info!(
        "wakeup: deep sleep on GPIO{} {:?} or after {} ms",
        pin,
        level,
        timeout.as_millis()
    );
    port.enter_deep_sleep();
    Ok(())
}
