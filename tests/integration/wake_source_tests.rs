//! Wake-source sequencing and handler wiring against the recording mocks.

use std::time::Duration;

use sleepwake::app::events::AppEvent;
use sleepwake::app::ports::{CountdownPort, DeferredCall};
use sleepwake::app::service::SleepService;
use sleepwake::config::{Image, SystemConfig};
use sleepwake::countdown::Countdown;
use sleepwake::power;
use sleepwake::wake::{WakeCause, WakeLevel};

use crate::mock_ports::{FixedStatus, MockWakeSources, RecordingSink, WakeCall};

#[test]
fn deep_sleep_plan_from_config_drives_expiry() {
    let svc = SleepService::new(SystemConfig::for_image(Image::DeepSleep));
    let mut port = MockWakeSources::new();
    let mut sink = RecordingSink::default();

    SleepService::on_countdown_expired(&svc.deep_sleep_plan(), &mut port, &mut sink).unwrap();

    assert_eq!(
        port.calls,
        vec![
            WakeCall::DisableAll,
            WakeCall::Ext0(0, WakeLevel::Low),
            WakeCall::Timer(Duration::from_secs(60)),
            WakeCall::DeepSleep,
        ]
    );
    assert_eq!(sink.events, vec![AppEvent::CountdownExpired]);
}

#[test]
fn any_arming_failure_stops_before_sleep() {
    // 0: disable_all, 1: ext0, 2: timer
    for fail_at in 0..3 {
        let mut port = MockWakeSources::failing_at(fail_at);
        let result =
            power::enable_deep_sleep_wakeup(&mut port, 0, WakeLevel::Low, Duration::from_secs(60));
        assert!(result.is_err(), "fail_at={fail_at}");
        assert!(!port.slept(), "fail_at={fail_at}");
        assert_eq!(port.calls.len(), fail_at);
    }
}

#[test]
fn light_sleep_wake_source_is_level_triggered_gpio() {
    let mut port = MockWakeSources::new();
    power::enable_light_sleep_wakeup(&mut port, 0, WakeLevel::Low).unwrap();
    assert_eq!(port.calls, vec![WakeCall::Gpio(0, WakeLevel::Low)]);
}

#[test]
fn dispatched_press_restarts_countdown() {
    let mut countdown = Countdown::new(Duration::from_secs(20));
    countdown.advance(Duration::from_secs(15));
    let status = FixedStatus { cause: WakeCause::ExternalPin0, level: false };
    let mut sink = RecordingSink::default();

    SleepService::dispatch(DeferredCall::ButtonPressed, Some(&mut countdown), &status, &mut sink)
        .unwrap();

    assert_eq!(countdown.remaining(), Some(Duration::from_secs(20)));
    assert_eq!(
        sink.events[0].to_string(),
        "push button pressed - wakeup cause: ext0"
    );
}

#[test]
fn press_after_expiry_does_not_revive_countdown() {
    let mut countdown = Countdown::new(Duration::from_secs(20));
    countdown.advance(Duration::from_secs(20));
    countdown.restart().unwrap();
    assert!(countdown.is_expired());
}

#[test]
fn status_report_uses_configured_interval() {
    let svc = SleepService::new(SystemConfig::for_image(Image::LightSleep));
    let mut sink = RecordingSink::default();
    svc.report_status(&FixedStatus { cause: WakeCause::GpioGeneric, level: true }, &mut sink);
    assert_eq!(
        sink.events[0].to_string(),
        "Another 5s expired - level = 1, wakeup cause: gpio"
    );
}
