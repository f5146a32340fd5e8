//! Wake-cause decoding and labels.
//!
//! The numbering follows ESP-IDF's `esp_sleep_source_t`, so the raw value
//! returned by `esp_sleep_get_wakeup_cause()` decodes directly.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Signal that most recently ended a sleep state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    /// Not a wake from sleep (cold boot, reset, or still awake).
    Undefined,
    /// Aggregate marker, never a real cause.
    All,
    /// Single RTC pin (EXT0).
    ExternalPin0,
    /// RTC pin bitmask (EXT1).
    ExternalPinBitmask,
    Timer,
    Touchpad,
    UltraLowPowerCoprocessor,
    /// Level-triggered GPIO (light sleep only).
    GpioGeneric,
    Uart,
    /// Any source this firmware does not configure (Wi-Fi, BT, coprocessor trap).
    Other(u32),
}

impl WakeCause {
    /// Decode the raw `esp_sleep_source_t` value.
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Undefined,
            1 => Self::All,
            2 => Self::ExternalPin0,
            3 => Self::ExternalPinBitmask,
            4 => Self::Timer,
            5 => Self::Touchpad,
            6 => Self::UltraLowPowerCoprocessor,
            7 => Self::GpioGeneric,
            8 => Self::Uart,
            other => Self::Other(other),
        }
    }

    /// Console label for this cause.  Total: aggregate and unknown
    /// values report `"invalid"`.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::ExternalPin0 => "ext0",
            Self::ExternalPinBitmask => "ext1",
            Self::Timer => "timer",
            Self::Touchpad => "touchpad",
            Self::UltraLowPowerCoprocessor => "ulp",
            Self::GpioGeneric => "gpio",
            Self::Uart => "uart",
            Self::All | Self::Other(_) => "invalid",
        }
    }
}

/// Free-function form used by the log formatters.
pub const fn describe(cause: WakeCause) -> &'static str {
    cause.describe()
}

impl fmt::Display for WakeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Active level of a wake-capable pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeLevel {
    Low,
    High,
}

impl WakeLevel {
    /// Numeric level as the GPIO/RTC drivers expect it.
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    /// The other level (a button's release level, given its press level).
    pub const fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}
