//! Boot, button and status-loop flows through the simulated device.

use std::time::Duration;

use sleepwake::adapters::retained::MemoryRetained;
use sleepwake::adapters::sim::{PlatformCall, SIM_FAIL, SimDevice, SimPlatform};
use sleepwake::app::events::AppEvent;
use sleepwake::app::ports::PersistentState;
use sleepwake::config::{ButtonTrigger, Image, SystemConfig};
use sleepwake::drivers::button::initial_level;
use sleepwake::error::Error;
use sleepwake::wake::{WakeCause, WakeLevel};

const TICK: Duration = Duration::from_millis(100);

// ── Fresh boot ────────────────────────────────────────────────

#[test]
fn fresh_boot_reports_undefined_and_count_one() {
    let dev = SimDevice::power_on(Image::AutoLightSleep).unwrap();

    assert_eq!(dev.boot_count(), 1);
    assert_eq!(
        dev.log().events()[0],
        AppEvent::Booted { boot_count: 1, cause: WakeCause::Undefined }
    );
    assert_eq!(dev.log().lines()[0], "Boot count: 1, wakeup cause: undefined");
}

#[test]
fn boot_sequence_order() {
    let dev = SimDevice::power_on(Image::DeepSleep).unwrap();
    let lines = dev.log().lines();

    let pos = |needle: &str| {
        lines
            .iter()
            .position(|l| l.starts_with(needle))
            .unwrap_or_else(|| panic!("missing {needle:?} in {lines:#?}"))
    };
    assert!(pos("Boot count") < pos("Power policy"));
    assert!(pos("Power policy") < pos("about to pend"));
    assert!(pos("about to pend") < pos("done pend"));
    assert!(pos("done pend") < pos("deferred call path alive"));
    assert!(pos("about to pend") < pos("Deep sleep timer started"));
}

#[test]
fn power_policy_is_80_to_240_with_light_sleep() {
    let dev = SimDevice::power_on(Image::AutoLightSleep).unwrap();
    let PlatformCall::Configure(policy) = dev.platform().calls()[0] else {
        panic!("first platform call must be the power policy");
    };
    assert_eq!(policy.min_freq_mhz, 80);
    assert_eq!(policy.max_freq_mhz, 240);
    assert!(policy.light_sleep_enable);
}

#[test]
fn only_light_sleep_image_registers_gpio_wake() {
    let light = SimDevice::power_on(Image::LightSleep).unwrap();
    assert!(
        light
            .platform()
            .calls()
            .contains(&PlatformCall::GpioWakeup { pin: 0, level: WakeLevel::Low })
    );

    let auto = SimDevice::power_on(Image::AutoLightSleep).unwrap();
    assert!(
        !auto
            .platform()
            .calls()
            .iter()
            .any(|c| matches!(c, PlatformCall::GpioWakeup { .. }))
    );
}

#[test]
fn light_sleep_button_interrupt_keeps_wake_trigger() {
    let dev = SimDevice::power_on(Image::LightSleep).unwrap();
    let registered = dev.platform().calls().iter().find_map(|c| match c {
        PlatformCall::GpioWakeup { level, .. } => Some(*level),
        _ => None,
    });
    let trigger = SystemConfig::for_image(Image::LightSleep).button_trigger();
    assert_eq!(registered.map(ButtonTrigger::Level), Some(trigger));
    assert_eq!(initial_level(trigger), registered);
}

#[test]
fn failed_power_policy_aborts_boot() {
    let mut platform = SimPlatform::new(WakeCause::Undefined);
    platform.fail_on("esp_pm_configure");
    let err = SimDevice::boot_on(
        SystemConfig::for_image(Image::AutoLightSleep),
        MemoryRetained::new(),
        platform,
    )
    .err();
    assert_eq!(err, Some(Error::platform("esp_pm_configure", SIM_FAIL)));
}

#[test]
fn invalid_frequency_rejected_before_touching_platform() {
    let config = SystemConfig {
        max_freq_mhz: 200,
        ..SystemConfig::for_image(Image::AutoLightSleep)
    };
    assert!(matches!(
        SimDevice::boot(config, MemoryRetained::new(), WakeCause::Undefined),
        Err(Error::Config(_))
    ));
}

// ── Status loop ───────────────────────────────────────────────

#[test]
fn status_line_every_five_seconds() {
    let mut dev = SimDevice::power_on(Image::AutoLightSleep).unwrap();
    dev.run_for(Duration::from_secs(16), TICK).unwrap();

    let status = dev.log().count(|e| matches!(e, AppEvent::Status { .. }));
    assert_eq!(status, 3);
    assert!(
        dev.log()
            .lines()
            .contains(&"Another 5s expired - level = 1, wakeup cause: undefined".to_string())
    );
}

#[test]
fn status_line_reports_pin_level() {
    let mut dev = SimDevice::power_on(Image::AutoLightSleep).unwrap();
    dev.platform_mut().set_pin_level(0, false);
    dev.run_for(Duration::from_secs(5), TICK).unwrap();
    assert_eq!(
        dev.log().lines().last().map(String::as_str),
        Some("Another 5s expired - level = 0, wakeup cause: undefined")
    );
}

#[test]
fn half_second_status_interval_is_not_reported_as_zero() {
    let config = SystemConfig {
        status_interval_ms: 500,
        ..SystemConfig::for_image(Image::AutoLightSleep)
    };
    let mut dev = SimDevice::boot(config, MemoryRetained::new(), WakeCause::Undefined).unwrap();
    dev.run_for(Duration::from_millis(500), TICK).unwrap();
    assert_eq!(
        dev.log().lines().last().map(String::as_str),
        Some("Another 500ms expired - level = 1, wakeup cause: undefined")
    );
}

// ── Button ────────────────────────────────────────────────────

#[test]
fn button_press_logged_from_worker_not_isr() {
    let mut dev = SimDevice::power_on(Image::AutoLightSleep).unwrap();
    let before = dev.log().events().len();

    dev.press_button();
    // The ISR only pends; nothing is logged until the worker runs.
    assert_eq!(dev.log().events().len(), before);

    dev.step(TICK).unwrap();
    assert_eq!(
        dev.log().events()[before],
        AppEvent::ButtonPressed { cause: WakeCause::Undefined }
    );
}

#[test]
fn rapid_presses_coalesce_into_one_handler_run() {
    let mut dev = SimDevice::power_on(Image::AutoLightSleep).unwrap();
    dev.press_button();
    dev.press_button();
    dev.press_button();
    dev.step(TICK).unwrap();
    assert_eq!(dev.log().count(|e| matches!(e, AppEvent::ButtonPressed { .. })), 1);
}

#[test]
fn light_sleep_wake_keeps_boot_count_and_reports_gpio() {
    let mut dev = SimDevice::power_on(Image::LightSleep).unwrap();
    dev.light_sleep_wake(WakeCause::GpioGeneric);
    dev.press_button();
    dev.step(TICK).unwrap();

    assert_eq!(dev.boot_count(), 1);
    assert_eq!(dev.retained().boot_count(), 1);
    assert_eq!(
        dev.log().lines().last().map(String::as_str),
        Some("push button pressed - wakeup cause: gpio")
    );
}
