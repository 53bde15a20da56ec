//! Core traits for serial port abstraction.
//!
//! Defines the `SerialPortAdapter` trait that lets the acquisition loop, the
//! locator and the radio link run against real hardware or a mock.

use super::error::PortError;
use std::time::Duration;

/// Baud rate the sensor microcontroller talks at.
pub const SENSOR_BAUD_RATE: u32 = 9600;

/// Per-read timeout on the sensor link.
pub const SENSOR_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Settings for opening a serial port. Framing is always 8N1 with no flow
/// control; both the sensor board and the XBee module use it.
#[derive(Debug, Clone, PartialEq)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read timeout. A read that sees no data for this long fails with
    /// [`PortError::Timeout`].
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self::new(SENSOR_BAUD_RATE, SENSOR_READ_TIMEOUT)
    }
}

impl PortConfiguration {
    pub fn new(baud_rate: u32, timeout: Duration) -> Self {
        Self { baud_rate, timeout }
    }
}

/// Trait for serial port I/O operations.
///
/// Real ports and [`MockSerialPort`](super::MockSerialPort) both implement
/// this, so everything above the transport can be exercised without a device.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. A read that sees no data
    /// within the configured timeout fails with [`PortError::Timeout`].
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// The read timeout currently in effect.
    fn timeout(&self) -> Duration;

    /// Close the port and open the same path again with the same settings.
    fn reopen(&mut self) -> Result<(), PortError>;
}

impl<T: SerialPortAdapter + ?Sized> SerialPortAdapter for Box<T> {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        (**self).write_bytes(data)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        (**self).read_bytes(buffer)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }

    fn reopen(&mut self) -> Result<(), PortError> {
        (**self).reopen()
    }
}
