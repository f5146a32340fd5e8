//! Firmware entry point shared by the three images.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  boot: logger · panic hook · boot count · wake cause         │
//! │  setup: power policy · wake source · self-check · countdown  │
//! │  button: GPIO ISR ──pend──▶ timer daemon ──▶ SleepService    │
//! │  loop: status line every interval                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every setup step is must-succeed; a failure goes through
//! [`fatal`](crate::diagnostics::fatal) and restarts the chip.

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::info;

use crate::adapters::log_sink::LogEventSink;
use crate::adapters::platform::EspPlatform;
use crate::adapters::retained::RtcRetained;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::service::SleepService;
use crate::config::{Image, SystemConfig};
use crate::diagnostics::{self, fatal};
use crate::drivers::button::{self, ButtonContext, EspDeferred};
use crate::drivers::countdown_timer::EspCountdown;

/// Boot `image` and run its status loop.  Returns only if the logger
/// cannot be installed.
pub fn run(image: Image) -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    diagnostics::install_panic_handler();

    info!("sleepwake v{} ({:?})", env!("CARGO_PKG_VERSION"), image);

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::for_image(image);
    if let Err(e) = config.validate() {
        fatal(e.into());
    }
    match serde_json::to_string(&config) {
        Ok(json) => info!("config: {}", json),
        Err(e) => log::warn!("config: not serialisable ({})", e),
    }

    let svc = SleepService::new(config);
    let mut platform = EspPlatform::new();
    let mut sink = LogEventSink;

    // ── 3. Boot count + wake cause ────────────────────────────
    svc.record_boot(&mut RtcRetained, &platform, &mut sink);

    // ── 4. Power policy + wake sources ────────────────────────
    if let Err(e) = svc.configure(&mut platform, &mut sink) {
        fatal(e);
    }

    // ── 5. Deferred-path self-check ───────────────────────────
    if let Err(e) = SleepService::self_check(&EspDeferred::detached(), &mut sink) {
        fatal(e);
    }

    // ── 6. Deep-sleep countdown ───────────────────────────────
    let countdown = match svc.countdown_duration() {
        Some(duration) => {
            let plan = Box::leak(Box::new(svc.deep_sleep_plan()));
            let timer = EspCountdown::start(duration, plan).unwrap_or_else(|e| fatal(e));
            sink.emit(&AppEvent::CountdownStarted { duration });
            Some(timer)
        }
        None => None,
    };

    // ── 7. Button ─────────────────────────────────────────────
    let context = Box::leak(Box::new(ButtonContext { countdown }));
    let config = svc.config();
    if let Err(e) = button::setup(config.button_gpio, config.button_trigger(), context) {
        fatal(e);
    }

    // ── 8. Status loop ────────────────────────────────────────
    let interval_ms = config.status_interval_ms;
    loop {
        FreeRtos::delay_ms(interval_ms);
        svc.report_status(&platform, &mut sink);
    }
}
