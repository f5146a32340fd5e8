//! Deep-sleep countdown, sleep entry and wake-up cycles.

use std::time::Duration;

use sleepwake::adapters::sim::{PlatformCall, SimDevice};
use sleepwake::app::events::AppEvent;
use sleepwake::config::Image;
use sleepwake::wake::{WakeCause, WakeLevel};

const TICK: Duration = Duration::from_millis(100);
const FULL: Duration = Duration::from_secs(20);

fn deep_sleep_device() -> SimDevice {
    SimDevice::power_on(Image::DeepSleep).unwrap()
}

// ── Countdown ─────────────────────────────────────────────────

#[test]
fn countdown_starts_at_twenty_seconds() {
    let dev = deep_sleep_device();
    assert_eq!(dev.countdown_remaining(), Some(FULL));
    assert!(dev.log().events().contains(&AppEvent::CountdownStarted { duration: FULL }));
}

#[test]
fn button_with_five_seconds_left_restores_full_duration() {
    let mut dev = deep_sleep_device();
    dev.run_for(Duration::from_secs(15), TICK).unwrap();
    assert_eq!(dev.countdown_remaining(), Some(Duration::from_secs(5)));

    dev.press_button();
    dev.step(Duration::ZERO).unwrap();
    assert_eq!(dev.countdown_remaining(), Some(FULL));
    assert_eq!(
        dev.log().lines().last().map(String::as_str),
        Some("push button pressed - wakeup cause: undefined")
    );

    // The old deadline passes without sleeping.
    dev.run_for(Duration::from_secs(10), TICK).unwrap();
    assert!(!dev.in_deep_sleep());
}

#[test]
fn no_sleep_before_countdown_reaches_zero() {
    let mut dev = deep_sleep_device();
    dev.run_for(FULL - TICK, TICK).unwrap();
    assert!(!dev.in_deep_sleep());
    dev.step(TICK).unwrap();
    assert!(dev.in_deep_sleep());
}

#[test]
fn expiry_fires_once() {
    let mut dev = deep_sleep_device();
    dev.run_for(Duration::from_secs(60), TICK).unwrap();
    dev.step(TICK).unwrap();
    assert_eq!(dev.log().count(|e| *e == AppEvent::CountdownExpired), 1);
}

// ── Sleep entry ───────────────────────────────────────────────

#[test]
fn expiry_clears_then_arms_then_sleeps() {
    let mut dev = deep_sleep_device();
    dev.run_for(FULL, TICK).unwrap();

    let calls = dev.platform().calls();
    let tail = &calls[calls.len() - 4..];
    assert_eq!(
        tail,
        &[
            PlatformCall::DisableAll,
            PlatformCall::Ext0 { pin: 0, level: WakeLevel::Low },
            PlatformCall::Timer(Duration::from_secs(60)),
            PlatformCall::DeepSleep,
        ]
    );
    assert_eq!(
        dev.log().lines().last().map(String::as_str),
        Some("Deep sleep timer expired - requesting deep sleep")
    );
}

#[test]
fn failed_clear_never_reaches_sleep() {
    let mut dev = deep_sleep_device();
    dev.platform_mut().fail_on("esp_sleep_disable_wakeup_source");
    assert!(dev.run_for(FULL, TICK).is_err());
    assert!(!dev.in_deep_sleep());
    assert!(
        !dev
            .platform()
            .calls()
            .iter()
            .any(|c| matches!(c, PlatformCall::Ext0 { .. } | PlatformCall::Timer(_)))
    );
}

#[test]
fn nothing_runs_while_asleep() {
    let mut dev = deep_sleep_device();
    dev.run_for(FULL, TICK).unwrap();
    let events = dev.log().events().len();
    dev.press_button();
    dev.step(Duration::from_secs(30)).unwrap();
    assert_eq!(dev.log().events().len(), events);
}

// ── Wake-up cycles ────────────────────────────────────────────

#[test]
fn timer_wake_increments_boot_count() {
    let mut dev = deep_sleep_device();
    dev.run_for(FULL, TICK).unwrap();

    let dev = dev.wake_from_deep_sleep(WakeCause::Timer).unwrap();
    assert_eq!(dev.boot_count(), 2);
    assert_eq!(dev.log().lines()[0], "Boot count: 2, wakeup cause: timer");
    assert_eq!(dev.countdown_remaining(), Some(FULL));
}

#[test]
fn button_wake_reports_ext0() {
    let mut dev = deep_sleep_device();
    dev.run_for(FULL, TICK).unwrap();

    let mut dev = dev.wake_from_deep_sleep(WakeCause::ExternalPin0).unwrap();
    dev.press_button();
    dev.step(TICK).unwrap();
    assert_eq!(dev.log().lines()[0], "Boot count: 2, wakeup cause: ext0");
    assert!(
        dev.log()
            .lines()
            .contains(&"push button pressed - wakeup cause: ext0".to_string())
    );
}

#[test]
fn boot_count_tracks_every_deep_sleep_cycle() {
    let mut dev = deep_sleep_device();
    for expected in 1..=5 {
        assert_eq!(dev.boot_count(), expected);
        dev.run_for(FULL, TICK).unwrap();
        assert!(dev.in_deep_sleep());
        dev = dev.wake_from_deep_sleep(WakeCause::Timer).unwrap();
    }
    assert_eq!(dev.boot_count(), 6);
}

#[test]
fn power_loss_resets_boot_count() {
    let mut dev = deep_sleep_device();
    dev.run_for(FULL, TICK).unwrap();
    let dev = dev.wake_from_deep_sleep(WakeCause::Timer).unwrap();
    assert_eq!(dev.boot_count(), 2);

    let dev = dev.power_cycle().unwrap();
    assert_eq!(dev.boot_count(), 1);
}
