//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that plays back a script of reads without any
//! hardware. Scripts mix data chunks with timeouts and transport faults, so the
//! acquisition loop's recovery paths can be driven deterministically.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One scripted event returned by a read.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MockRead {
    Data(Vec<u8>),
    Timeout,
    Fault(std::io::ErrorKind),
}

/// Inner state of the mock port, shared between clones.
#[derive(Debug, Default)]
struct MockPortState {
    script: VecDeque<MockRead>,
    /// Replayed forever once the script runs dry.
    repeat: Option<Vec<u8>>,
    write_log: Vec<Vec<u8>>,
    timeout: Duration,
    open: bool,
    reopen_count: usize,
    fail_next_reopen: bool,
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test can hand one clone to the code under test and
/// inspect the other afterwards.
///
/// # Example
/// ```
/// use sensor_relay::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"12.3 45.6\n\r");
/// port.enqueue_timeout();
///
/// let mut buffer = [0u8; 32];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"12.3 45.6\n\r");
/// assert!(port.read_bytes(&mut buffer).is_err());
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new, open mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_secs(2),
                open: true,
                ..Default::default()
            })),
        }
    }

    /// Queue a chunk of bytes to be returned by subsequent reads.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().script.push_back(MockRead::Data(data.to_vec()));
    }

    /// Queue one line per entry, each terminated with `\n\r` the way the
    /// sensor board sends them.
    pub fn enqueue_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        for line in lines {
            let mut data = line.as_ref().to_vec();
            data.extend_from_slice(b"\n\r");
            self.state.lock().script.push_back(MockRead::Data(data));
        }
    }

    /// Queue a read that times out.
    pub fn enqueue_timeout(&mut self) {
        self.state.lock().script.push_back(MockRead::Timeout);
    }

    /// Queue a read that fails with a transport-level I/O error.
    pub fn enqueue_fault(&mut self, kind: std::io::ErrorKind) {
        self.state.lock().script.push_back(MockRead::Fault(kind));
    }

    /// Once the script is exhausted, return `data` on every read.
    pub fn repeat_read(&mut self, data: &[u8]) {
        self.state.lock().repeat = Some(data.to_vec());
    }

    /// Make the next `reopen` fail as if the device vanished.
    pub fn fail_next_reopen(&mut self) {
        self.state.lock().fail_next_reopen = true;
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// How many times the port has been closed and reopened.
    pub fn reopen_count(&self) -> usize {
        self.state.lock().reopen_count
    }

    /// Whether the port is currently open.
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Number of scripted reads not yet consumed.
    pub fn pending_reads(&self) -> usize {
        self.state.lock().script.len()
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(PortError::NotOpen);
        }
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(PortError::NotOpen);
        }

        let next = match state.script.pop_front() {
            Some(event) => event,
            None => match &state.repeat {
                Some(data) => MockRead::Data(data.clone()),
                // An idle real port times out, so an idle mock does too.
                None => MockRead::Timeout,
            },
        };

        match next {
            MockRead::Data(mut data) => {
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    state.script.push_front(MockRead::Data(rest));
                }
                Ok(n)
            }
            MockRead::Timeout => Err(PortError::timeout(state.timeout)),
            MockRead::Fault(kind) => Err(PortError::Io(std::io::Error::new(
                kind,
                "scripted transport fault",
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.state.lock().timeout
    }

    fn reopen(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        state.open = false;
        if state.fail_next_reopen {
            state.fail_next_reopen = false;
            return Err(PortError::not_found(self.name.clone()));
        }
        state.open = true;
        state.reopen_count += 1;
        Ok(())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("pending_reads", &self.pending_reads())
            .finish()
    }
}
