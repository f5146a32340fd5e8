//! Interrupt and timer drivers.

pub mod button;
#[cfg(target_os = "espidf")]
pub mod countdown_timer;
