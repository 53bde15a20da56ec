//! E2E tests for supervised restarts and shutdown.

use crate::common::{acm_locator, acm_port, CollectingSink, RecordingRadio};
use sensor_relay::acquisition::{AcquisitionError, LoopOptions, SettleFilter};
use sensor_relay::radio::RadioError;
use sensor_relay::sink::{RadioForwarder, RecordSink, SinkError};
use sensor_relay::supervisor::{Outcome, SinkFactory, Supervisor};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn collecting_factory(sink: &CollectingSink) -> SinkFactory {
    let sink = sink.clone();
    Box::new(move || -> Result<Box<dyn RecordSink>, SinkError> { Ok(Box::new(sink.clone())) })
}

fn quick(supervisor: Supervisor) -> Supervisor {
    supervisor
        .with_settle(SettleFilter::new(Duration::ZERO))
        .with_restart_delay(Duration::ZERO)
}

#[test]
fn test_transport_fault_restarts_from_discovery() {
    let mut port = acm_port(0);
    port.enqueue_read(b"12.3 45.6\n\r");
    port.enqueue_fault(ErrorKind::BrokenPipe);
    let (locator, attempts) = acm_locator(vec![port.clone()]);
    let sink = CollectingSink::default();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut supervisor = quick(Supervisor::new(
        locator,
        collecting_factory(&sink),
        Arc::clone(&shutdown),
    ));

    let outcome = supervisor.next_outcome();
    assert!(matches!(
        outcome,
        Outcome::FatalRestart(AcquisitionError::Transport(_))
    ));
    assert!(!supervisor.is_running());
    assert_eq!(sink.len(), 1);

    // Rebuilt pipeline finds the board again and the idle port times out.
    let outcome = supervisor.next_outcome();
    assert!(matches!(outcome, Outcome::Recovered));
    assert!(supervisor.is_running());
    assert_eq!(port.reopen_count(), 1);
    assert_eq!(attempts.lock().len(), 2);

    shutdown.store(true, Ordering::Relaxed);
    assert!(matches!(supervisor.next_outcome(), Outcome::Terminated));
    assert!(!supervisor.is_running());

    let report = supervisor.report();
    assert_eq!(report.pipelines_started, 2);
    assert_eq!(report.restarts, 1);
    assert_eq!(report.recoveries, 1);
    assert_eq!(report.delivered, 1);
}

#[test]
fn test_sink_build_failure_is_fatal_restart() {
    let (locator, _) = acm_locator(vec![acm_port(0)]);
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    let radio = RecordingRadio::default();
    let factory: SinkFactory = Box::new(move || -> Result<Box<dyn RecordSink>, SinkError> {
        let mut link = radio.clone();
        link.fail_discovery = counter.fetch_add(1, Ordering::SeqCst) == 0;
        Ok(Box::new(RadioForwarder::connect(link, "Main", 2)?))
    });
    let mut supervisor = quick(Supervisor::new(
        locator,
        factory,
        Arc::new(AtomicBool::new(false)),
    ));

    assert!(matches!(
        supervisor.next_outcome(),
        Outcome::FatalRestart(AcquisitionError::Sink(SinkError::Radio(
            RadioError::DiscoveryTimeout { .. }
        )))
    ));
    assert!(matches!(supervisor.next_outcome(), Outcome::Recovered));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn test_timeout_streak_escalates_when_enabled() {
    let port = acm_port(0);
    let (locator, _) = acm_locator(vec![port.clone()]);
    let sink = CollectingSink::default();
    let mut supervisor = quick(Supervisor::new(
        locator,
        collecting_factory(&sink),
        Arc::new(AtomicBool::new(false)),
    ))
    .with_loop_options(LoopOptions {
        escalate_after: Some(2),
    });

    assert!(matches!(supervisor.next_outcome(), Outcome::Recovered));
    assert!(matches!(
        supervisor.next_outcome(),
        Outcome::FatalRestart(AcquisitionError::TimeoutStreak(2))
    ));
    assert_eq!(port.reopen_count(), 1);
}

#[test]
fn test_run_returns_only_on_shutdown() {
    let (locator, _) = acm_locator(vec![acm_port(3)]);
    let sink = CollectingSink::default();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut supervisor = quick(Supervisor::new(
        locator,
        collecting_factory(&sink),
        Arc::clone(&shutdown),
    ));

    let flag = supervisor.shutdown_handle();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        flag.store(true, Ordering::Relaxed);
    });
    let report = supervisor.run();
    stopper.join().unwrap();

    assert!(shutdown.load(Ordering::Relaxed));
    assert_eq!(report.pipelines_started, 1);
    assert_eq!(report.restarts, 0);
    assert!(report.recoveries > 0);
}

#[test]
fn test_shutdown_while_no_board_is_present() {
    let (locator, attempts) = acm_locator(vec![]);
    let sink = CollectingSink::default();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut supervisor = quick(Supervisor::new(
        locator,
        collecting_factory(&sink),
        Arc::clone(&shutdown),
    ));

    let flag = Arc::clone(&shutdown);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        flag.store(true, Ordering::Relaxed);
    });
    let outcome = supervisor.next_outcome();
    stopper.join().unwrap();

    assert!(matches!(outcome, Outcome::Terminated));
    assert!(attempts.lock().len() >= 10);
    assert_eq!(supervisor.report().pipelines_started, 0);
}
