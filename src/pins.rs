//! GPIO pin assignments for the ESP32 DevKitC.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// User button (BOOT button, active-low)
// ---------------------------------------------------------------------------

/// Momentary push-button.  GPIO0 is also RTC_GPIO11, so it can drive
/// EXT0 wakeup from deep sleep.
pub const BUTTON_GPIO: i32 = 0;

/// Pads in the GPIO matrix (GPIO0..=GPIO39).
pub const GPIO_COUNT: i32 = 40;
