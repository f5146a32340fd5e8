//! System configuration parameters
//!
//! All tunable parameters for the three firmware images.  Values are
//! compiled in; each image starts from [`SystemConfig::for_image`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins;
use crate::power::PowerPolicy;
use crate::wake::WakeLevel;

/// Which firmware image is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Image {
    /// Automatic light sleep only; the button interrupts but does not wake.
    AutoLightSleep,
    /// Automatic light sleep with the button as a GPIO wake source.
    LightSleep,
    /// Countdown to deep sleep; button restarts the countdown.
    DeepSleep,
}

/// How the button pad raises its interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTrigger {
    /// Falling edge.  Edge triggers cannot wake the chip from light sleep.
    FallingEdge,
    /// Level triggered, armed for the press level first.  Shares the pad
    /// with a GPIO light-sleep wake source of the same level.
    Level(WakeLevel),
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub image: Image,

    // --- Button ---
    /// Push-button GPIO (active low, internal pull-up).
    pub button_gpio: i32,
    /// Level that wakes the device from sleep.
    pub wakeup_level: WakeLevel,

    // --- Power management ---
    /// Dynamic frequency scaling floor (MHz)
    pub min_freq_mhz: u16,
    /// Dynamic frequency scaling ceiling (MHz)
    pub max_freq_mhz: u16,
    /// Let the idle task enter light sleep automatically
    pub light_sleep_enable: bool,

    // --- Timing ---
    /// Status log interval (milliseconds)
    pub status_interval_ms: u32,
    /// Deep-sleep countdown (milliseconds), `None` for images without one
    pub countdown_ms: Option<u32>,
    /// Timer wakeup after entering deep sleep (milliseconds)
    pub timer_wakeup_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            image: Image::AutoLightSleep,

            // Button
            button_gpio: pins::BUTTON_GPIO,
            wakeup_level: WakeLevel::Low,

            // Power management
            min_freq_mhz: 80,
            max_freq_mhz: 240,
            light_sleep_enable: true,

            // Timing
            status_interval_ms: 5_000, // 0.2 Hz
            countdown_ms: None,
            timer_wakeup_ms: 60_000,
        }
    }
}

impl SystemConfig {
    /// Defaults for a given image.
    pub fn for_image(image: Image) -> Self {
        let countdown_ms = match image {
            Image::DeepSleep => Some(20_000),
            Image::AutoLightSleep | Image::LightSleep => None,
        };
        Self {
            image,
            countdown_ms,
            ..Self::default()
        }
    }

    /// The light-sleep image wakes on the button pad, and GPIO wakeup on
    /// this chip only works with level triggers, so its interrupt must be
    /// level triggered too.
    pub fn button_trigger(&self) -> ButtonTrigger {
        match self.image {
            Image::LightSleep => ButtonTrigger::Level(self.wakeup_level),
            Image::AutoLightSleep | Image::DeepSleep => ButtonTrigger::FallingEdge,
        }
    }

    /// Power policy derived from this configuration.
    pub fn power_policy(&self) -> PowerPolicy {
        PowerPolicy {
            min_freq_mhz: self.min_freq_mhz,
            max_freq_mhz: self.max_freq_mhz,
            light_sleep_enable: self.light_sleep_enable,
        }
    }

    /// Range-check every field.  Called once at boot; failure is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..pins::GPIO_COUNT).contains(&self.button_gpio) {
            return Err(ConfigError::InvalidPin(self.button_gpio));
        }
        self.power_policy().validate()?;
        if self.status_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming("status_interval_ms"));
        }
        if self.countdown_ms == Some(0) {
            return Err(ConfigError::InvalidTiming("countdown_ms"));
        }
        if self.image == Image::DeepSleep && self.countdown_ms.is_none() {
            return Err(ConfigError::InvalidTiming("countdown_ms"));
        }
        if self.timer_wakeup_ms == 0 {
            return Err(ConfigError::InvalidTiming("timer_wakeup_ms"));
        }
        Ok(())
    }
}
