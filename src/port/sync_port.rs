//! Synchronous serial port implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own
//! `SerialPortAdapter` trait. The port remembers its path and settings so the
//! acquisition loop can close and reopen it in place.

use super::error::PortError;
use super::traits::{PortConfiguration, SerialPortAdapter};
use std::io::{Read, Write};
use std::time::Duration;

/// Synchronous serial port implementation wrapping `serialport::SerialPort`.
pub struct SyncSerialPort {
    /// The underlying serial port, `None` between close and reopen.
    port: Option<Box<dyn serialport::SerialPort>>,
    /// The port name/path for identification and reopening.
    name: String,
    /// Settings used for every (re)open.
    config: PortConfiguration,
}

impl SyncSerialPort {
    /// Open a serial port with the given configuration.
    ///
    /// # Example
    /// ```no_run
    /// use sensor_relay::port::{PortConfiguration, SyncSerialPort};
    ///
    /// let port = SyncSerialPort::open("/dev/ttyACM0", PortConfiguration::default())?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port_name: &str, config: PortConfiguration) -> Result<Self, PortError> {
        let port = open_raw(port_name, &config)?;
        Ok(Self {
            port: Some(port),
            name: port_name.to_string(),
            config,
        })
    }

    /// The settings this port was opened with.
    pub fn configuration(&self) -> &PortConfiguration {
        &self.config
    }

    fn raw_mut(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>, PortError> {
        self.port.as_mut().ok_or(PortError::NotOpen)
    }
}

fn open_raw(
    port_name: &str,
    config: &PortConfiguration,
) -> Result<Box<dyn serialport::SerialPort>, PortError> {
    serialport::new(port_name, config.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .flow_control(serialport::FlowControl::None)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(config.timeout)
        .open()
        .map_err(|e| match e.kind() {
            serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
            serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
            serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
                PortError::not_found(port_name)
            }
            _ => PortError::Serial(e),
        })
}

impl SerialPortAdapter for SyncSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.raw_mut()?.write(data).map_err(PortError::Io)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let timeout = self.config.timeout;
        match self.raw_mut()?.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Err(PortError::timeout(timeout))
            }
            Err(e) => Err(PortError::Io(e)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    fn reopen(&mut self) -> Result<(), PortError> {
        // Dropping the handle closes the file descriptor before the new open.
        self.port = None;
        self.port = Some(open_raw(&self.name, &self.config)?);
        Ok(())
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.config.baud_rate)
            .field("open", &self.port.is_some())
            .finish()
    }
}
