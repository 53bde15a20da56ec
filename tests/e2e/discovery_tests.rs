//! E2E tests for locating the sensor board.

use crate::common::{acm_locator, acm_port, scripted_opener, TEST_TIMEOUT};
use sensor_relay::discovery::{FixedPath, PortLocator};
use sensor_relay::port::PortConfiguration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_first_openable_candidate_wins() {
    let (mut locator, attempts) = acm_locator(vec![acm_port(4)]);

    let conn = locator.connect();

    assert_eq!(conn.path(), "/dev/ttyACM4");
    assert_eq!(conn.candidate().index, Some(4));
    assert_eq!(conn.failed_attempts(), 4);
    assert_eq!(
        *attempts.lock(),
        vec![
            "/dev/ttyACM0",
            "/dev/ttyACM1",
            "/dev/ttyACM2",
            "/dev/ttyACM3",
            "/dev/ttyACM4",
        ]
    );
}

#[test]
fn test_lowest_index_preferred_when_several_exist() {
    let (mut locator, attempts) = acm_locator(vec![acm_port(7), acm_port(2)]);

    let conn = locator.connect();

    assert_eq!(conn.path(), "/dev/ttyACM2");
    assert_eq!(attempts.lock().len(), 3);
}

#[test]
fn test_every_connect_starts_from_index_zero() {
    let (mut locator, attempts) = acm_locator(vec![acm_port(1)]);

    locator.connect();
    locator.connect();

    assert_eq!(
        *attempts.lock(),
        vec!["/dev/ttyACM0", "/dev/ttyACM1", "/dev/ttyACM0", "/dev/ttyACM1"]
    );
}

#[test]
fn test_fixed_path_retries_same_device() {
    let (opener, attempts) = scripted_opener(vec![]);
    let mut locator = PortLocator::new(
        Box::new(FixedPath::new("/dev/serial/by-id/usb-sensor")),
        opener,
        PortConfiguration::new(9600, TEST_TIMEOUT),
    );
    let shutdown = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&shutdown);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        flag.store(true, Ordering::Relaxed);
    });
    let result = locator.connect_until(&shutdown);
    stopper.join().unwrap();

    assert!(result.is_none());
    let attempts = attempts.lock();
    assert!(!attempts.is_empty());
    assert!(attempts.iter().all(|p| p == "/dev/serial/by-id/usb-sensor"));
}

#[test]
fn test_connect_until_returns_none_when_already_stopped() {
    let (mut locator, attempts) = acm_locator(vec![acm_port(0)]);
    let shutdown = AtomicBool::new(true);

    assert!(locator.connect_until(&shutdown).is_none());
    assert!(attempts.lock().is_empty());
}
