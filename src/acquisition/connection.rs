//! The open sensor link.

use crate::discovery::CandidatePath;
use crate::port::{PortError, SerialPortAdapter};
use std::time::Duration;

/// Longest line kept before it is handed out without a terminator.
const MAX_LINE_LENGTH: usize = 4096;

const READ_CHUNK: usize = 256;

/// Owns the open transport to the sensor board plus any bytes read past the
/// last line terminator.
#[derive(Debug)]
pub struct ConnectionHandle {
    port: Box<dyn SerialPortAdapter>,
    candidate: CandidatePath,
    failed_attempts: usize,
    pending: Vec<u8>,
    reopen_count: u64,
}

impl ConnectionHandle {
    pub fn new(
        port: Box<dyn SerialPortAdapter>,
        candidate: CandidatePath,
        failed_attempts: usize,
    ) -> Self {
        Self {
            port,
            candidate,
            failed_attempts,
            pending: Vec::new(),
            reopen_count: 0,
        }
    }

    pub fn path(&self) -> &str {
        &self.candidate.path
    }

    pub fn candidate(&self) -> &CandidatePath {
        &self.candidate
    }

    /// Open attempts that failed before this connection succeeded.
    pub fn failed_attempts(&self) -> usize {
        self.failed_attempts
    }

    pub fn reopen_count(&self) -> u64 {
        self.reopen_count
    }

    pub fn read_timeout(&self) -> Duration {
        self.port.timeout()
    }

    /// Read up to and including the next `\n`.
    ///
    /// Fails with [`PortError::Timeout`] when the device goes quiet. Partial
    /// bytes stay buffered until the line completes or the port is reopened.
    pub fn read_line(&mut self) -> Result<Vec<u8>, PortError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(end) = memchr::memchr(b'\n', &self.pending) {
                let rest = self.pending.split_off(end + 1);
                return Ok(std::mem::replace(&mut self.pending, rest));
            }
            if self.pending.len() >= MAX_LINE_LENGTH {
                return Ok(std::mem::take(&mut self.pending));
            }

            match self.port.read_bytes(&mut chunk)? {
                0 => return Err(PortError::timeout(self.port.timeout())),
                n => self.pending.extend_from_slice(&chunk[..n]),
            }
        }
    }

    /// Close the port and open the same path again.
    pub fn reopen(&mut self) -> Result<(), PortError> {
        self.pending.clear();
        self.port.reopen()?;
        self.reopen_count += 1;
        Ok(())
    }
}
