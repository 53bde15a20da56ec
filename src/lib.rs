//! Sensor relay library
//!
//! Reads whitespace-separated readings from a microcontroller on a serial
//! port, stamps each line with the capture time, and relays one field over
//! an XBee mesh radio. The link heals itself: timeouts reopen the port in
//! place, and anything worse makes the supervisor rebuild the pipeline from
//! port discovery.
//!
//! # Modules
//!
//! - `config`: TOML configuration with environment overrides
//! - `error`: top-level error type
//! - `port`: serial port abstraction plus a scripted mock
//! - `discovery`: candidate path providers and the port locator
//! - `record`: line parsing, timestamps and device fault tokens
//! - `acquisition`: settle window and the read/reopen loop
//! - `radio`: XBee API frames and node discovery
//! - `sink`: where records go (radio or console)
//! - `supervisor`: outer restart policy

pub mod acquisition;
pub mod config;
pub mod discovery;
pub mod error;
pub mod port;
pub mod radio;
pub mod record;
pub mod sink;
pub mod supervisor;

pub use acquisition::{AcquisitionError, AcquisitionLoop, ConnectionHandle, SettleFilter};
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use discovery::{CandidatePath, PathProvider, PortLocator, PortOpener};
pub use error::{AppError, AppResult};
pub use port::{MockSerialPort, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
pub use record::{ClassifiedRecord, FaultCode, Record};
pub use sink::{Delivery, RecordSink, SinkError};
pub use supervisor::{Outcome, Supervisor, SupervisorReport};
