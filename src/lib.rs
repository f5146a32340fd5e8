//! SleepWake firmware library.
//!
//! Active, light-sleep and deep-sleep transitions on an ESP32, driven by
//! one push button.  The pure-logic modules build on any target so the
//! whole boot/button/countdown flow can be exercised on the host; all
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`.

#![deny(unused_must_use)]

pub mod app;
pub mod boot;
pub mod config;
pub mod countdown;
#[cfg(not(target_os = "espidf"))]
pub mod deferred;
pub mod diagnostics;
pub mod error;
pub mod pins;
pub mod power;
pub mod wake;

pub mod adapters;
pub mod drivers;

#[cfg(target_os = "espidf")]
pub mod firmware;
