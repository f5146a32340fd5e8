//! Unified error types for the SleepWake firmware.
//!
//! Three categories cover every failure the firmware can see: bad
//! power/wake parameters, an exhausted deferred-call queue, and anything
//! the underlying platform service reports.  All variants are `Copy` so
//! they can be handed across the ISR/task boundary without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Power-policy or wake-source parameters are invalid.
    Config(ConfigError),
    /// The deferred-call queue had no free slot.
    ResourceExhausted,
    /// A platform service returned an error code.
    Platform {
        /// Name of the platform call that failed.
        op: &'static str,
        /// Raw `esp_err_t` (or simulated) code.
        code: i32,
    },
}

impl Error {
    /// Shorthand for a failed platform call.
    pub const fn platform(op: &'static str, code: i32) -> Self {
        Self::Platform { op, code }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::ResourceExhausted => write!(f, "deferred-call queue full"),
            Self::Platform { op, code } => write!(f, "{op} failed (rc={code})"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Frequency is not one of the steps the clock tree supports.
    UnsupportedFrequency(u16),
    /// Minimum frequency is above the maximum.
    MinAboveMax { min_mhz: u16, max_mhz: u16 },
    /// A timing field is zero or otherwise out of range.
    InvalidTiming(&'static str),
    /// Pin number is outside the GPIO matrix.
    InvalidPin(i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFrequency(mhz) => write!(f, "unsupported frequency {mhz} MHz"),
            Self::MinAboveMax { min_mhz, max_mhz } => {
                write!(f, "min frequency {min_mhz} MHz above max {max_mhz} MHz")
            }
            Self::InvalidTiming(field) => write!(f, "invalid timing: {field}"),
            Self::InvalidPin(pin) => write!(f, "invalid GPIO {pin}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
