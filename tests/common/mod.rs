//! Shared test utilities for sensor-relay tests.
//!
//! - scripted port openers backed by `MockSerialPort`
//! - a radio link that records what it was asked to send
//! - a sink that keeps every record it receives

#![allow(dead_code)]

use parking_lot::Mutex;
use sensor_relay::discovery::{EnumeratedPaths, PortLocator, PortOpener};
use sensor_relay::port::{MockSerialPort, PortConfiguration, PortError, SerialPortAdapter};
use sensor_relay::radio::{Endpoint, RadioError, RadioLink};
use sensor_relay::record::ClassifiedRecord;
use sensor_relay::sink::{Delivery, RecordSink, SinkError};
use sensor_relay::Record;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Short timeout used by every mock so nothing in the suite blocks.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(10);

/// Paths the opener was asked for, in order.
pub type AttemptLog = Arc<Mutex<Vec<String>>>;

/// Opener that only succeeds for paths present in `ports`.
///
/// Every request is logged; a path can be opened more than once and always
/// hands out a clone sharing the same script.
pub fn scripted_opener(ports: Vec<MockSerialPort>) -> (Box<dyn PortOpener>, AttemptLog) {
    let attempts: AttemptLog = Arc::default();
    let log = Arc::clone(&attempts);
    let ports: HashMap<String, MockSerialPort> = ports
        .into_iter()
        .map(|port| (port.name().to_string(), port))
        .collect();

    let opener = move |path: &str,
                       _config: &PortConfiguration|
          -> Result<Box<dyn SerialPortAdapter>, PortError> {
        log.lock().push(path.to_string());
        match ports.get(path) {
            Some(port) => Ok(Box::new(port.clone())),
            None => Err(PortError::not_found(path)),
        }
    };
    let opener: Box<dyn PortOpener> = Box::new(opener);
    (opener, attempts)
}

/// Locator over `/dev/ttyACM0..9` that can only open `ports`.
pub fn acm_locator(ports: Vec<MockSerialPort>) -> (PortLocator, AttemptLog) {
    let (opener, attempts) = scripted_opener(ports);
    let locator = PortLocator::new(
        Box::new(EnumeratedPaths::default()),
        opener,
        PortConfiguration::new(9600, TEST_TIMEOUT),
    );
    (locator, attempts)
}

/// Mock for `/dev/ttyACM{index}`.
pub fn acm_port(index: usize) -> MockSerialPort {
    MockSerialPort::new(format!("/dev/ttyACM{}", index))
}

/// Radio link that resolves every node and records payloads.
#[derive(Debug, Clone, Default)]
pub struct RecordingRadio {
    pub sent: Arc<Mutex<Vec<(Endpoint, Vec<u8>)>>>,
    pub discovered: Arc<Mutex<Vec<String>>>,
    pub fail_discovery: bool,
}

impl RecordingRadio {
    pub fn payloads(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
            .collect()
    }
}

impl RadioLink for RecordingRadio {
    fn discover(&mut self, node_id: &str) -> Result<Endpoint, RadioError> {
        self.discovered.lock().push(node_id.to_string());
        if self.fail_discovery {
            return Err(RadioError::DiscoveryTimeout {
                node_id: node_id.to_string(),
                timeout: TEST_TIMEOUT,
            });
        }
        Ok(Endpoint {
            node_id: node_id.to_string(),
            address64: 0x0013_A200_4000_0001,
            address16: 0xFFFE,
        })
    }

    fn send(&mut self, endpoint: &Endpoint, data: &[u8]) -> Result<(), RadioError> {
        self.sent.lock().push((endpoint.clone(), data.to_vec()));
        Ok(())
    }
}

/// Sink that keeps every record it is handed.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub records: Arc<Mutex<Vec<Record>>>,
}

impl CollectingSink {
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }
}

impl RecordSink for CollectingSink {
    fn name(&self) -> &str {
        "collect"
    }

    fn deliver(&mut self, record: &ClassifiedRecord) -> Result<Delivery, SinkError> {
        self.records.lock().push(record.record().clone());
        Ok(Delivery::Printed)
    }
}
