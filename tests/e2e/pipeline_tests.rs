//! E2E tests for settle + acquisition on a located port.

use crate::common::{acm_locator, acm_port, CollectingSink, RecordingRadio};
use sensor_relay::acquisition::{AcquisitionLoop, LinkState, LoopOptions, SettleFilter, StepOutcome};
use sensor_relay::sink::{Delivery, RadioForwarder};
use std::time::{Duration, Instant};

#[test]
fn test_settle_window_holds_for_full_duration_under_continuous_output() {
    let mut port = acm_port(0);
    port.repeat_read(b"noise noise\n\r");
    let (mut locator, _) = acm_locator(vec![port]);
    let mut conn = locator.connect();

    let window = Duration::from_millis(60);
    let started = Instant::now();
    let discarded = SettleFilter::new(window).drain(&mut conn).unwrap();

    assert!(started.elapsed() >= window);
    assert!(discarded > 0);
}

#[test]
fn test_settle_window_holds_on_silent_device() {
    let (mut locator, _) = acm_locator(vec![acm_port(0)]);
    let mut conn = locator.connect();

    let window = Duration::from_millis(40);
    let started = Instant::now();
    let discarded = SettleFilter::new(window).drain(&mut conn).unwrap();

    assert!(started.elapsed() >= window);
    assert_eq!(discarded, 0);
}

#[test]
fn test_timeout_between_readings_reopens_once_and_forwards_the_rest() {
    let mut port = acm_port(0);
    port.enqueue_read(b"12.3 45.6\n\r");
    port.enqueue_read(b"12.4 45.7\n\r");
    port.enqueue_timeout();
    port.enqueue_read(b"12.5 45.8\n\r");

    let (mut locator, _) = acm_locator(vec![port.clone()]);
    let conn = locator.connect();
    let radio = RecordingRadio::default();
    let forwarder = RadioForwarder::connect(radio.clone(), "Main", 2).unwrap();
    let mut acquisition = AcquisitionLoop::new(conn, Box::new(forwarder), LoopOptions::default());

    let outcomes: Vec<StepOutcome> = (0..4).map(|_| acquisition.step().unwrap()).collect();

    assert_eq!(
        outcomes,
        vec![
            StepOutcome::Delivered(Delivery::Sent { bytes: 4 }),
            StepOutcome::Delivered(Delivery::Sent { bytes: 4 }),
            StepOutcome::Recovered,
            StepOutcome::Delivered(Delivery::Sent { bytes: 4 }),
        ]
    );
    assert_eq!(port.reopen_count(), 1);
    assert_eq!(radio.payloads(), vec!["45.6", "45.7", "45.8"]);
    assert_eq!(*radio.discovered.lock(), vec!["Main"]);
    assert_eq!(acquisition.state(), LinkState::Connected);
    assert_eq!(acquisition.connection().path(), "/dev/ttyACM0");
}

#[test]
fn test_short_record_is_not_forwarded() {
    let mut port = acm_port(0);
    port.enqueue_read(b"12.3\n\r");
    let (mut locator, _) = acm_locator(vec![port.clone()]);
    let radio = RecordingRadio::default();
    let forwarder = RadioForwarder::connect(radio.clone(), "Main", 2).unwrap();
    let mut acquisition =
        AcquisitionLoop::new(locator.connect(), Box::new(forwarder), LoopOptions::default());

    let outcome = acquisition.step().unwrap();

    assert!(matches!(
        outcome,
        StepOutcome::Delivered(Delivery::Skipped { .. })
    ));
    assert!(radio.payloads().is_empty());
    assert_eq!(port.reopen_count(), 0);
    assert_eq!(acquisition.stats().skipped, 1);
}

#[test]
fn test_records_carry_truncated_timestamps() {
    let mut port = acm_port(0);
    port.enqueue_lines(["1.5 ERR1 7", "2.5 3.5"]);
    let (mut locator, _) = acm_locator(vec![port]);
    let sink = CollectingSink::default();
    let mut acquisition =
        AcquisitionLoop::new(locator.connect(), Box::new(sink.clone()), LoopOptions::default());

    acquisition.step().unwrap();
    acquisition.step().unwrap();

    let records = sink.records.lock();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].data(), ["1.5", "ERR1", "7"]);
    assert_eq!(records[1].data(), ["2.5", "3.5"]);
    for record in records.iter() {
        let (whole, frac) = record.timestamp().split_once('.').unwrap();
        assert!(whole.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(frac.len(), 2);
    }
    assert_eq!(acquisition.stats().fault_tokens, 1);
}
