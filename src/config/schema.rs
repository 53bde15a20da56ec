//! Configuration schema definitions.
//!
//! Every section defaults to the values the relay has always run with, so an
//! absent or empty file reproduces the stock behaviour.

use super::error::{ConfigError, ConfigResult};
use crate::acquisition::LoopOptions;
use crate::discovery::providers::{DEFAULT_CANDIDATE_COUNT, DEFAULT_PATH_PREFIX};
use crate::discovery::{EnumeratedPaths, FixedPath, HotPlug, PathProvider};
use crate::port::{PortConfiguration, SENSOR_BAUD_RATE};
use crate::radio::xbee::DEFAULT_RADIO_BAUD_RATE;
use crate::sink::{DEFAULT_FORWARD_FIELD, DEFAULT_REMOTE_NODE_ID};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sensor board discovery and link settings
    pub device: DeviceConfig,
    /// Acquisition loop settings
    pub acquisition: AcquisitionConfig,
    /// Where records go
    pub output: OutputConfig,
    /// XBee radio settings
    pub radio: RadioConfig,
    /// Pipeline restart settings
    pub supervisor: SupervisorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the relay cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.device.baud_rate == 0 {
            return Err(ConfigError::validation("device.baud_rate", "must be non-zero"));
        }
        if self.device.read_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "device.read_timeout_ms",
                "must be non-zero",
            ));
        }
        if self.device.candidate_count == 0 {
            return Err(ConfigError::validation(
                "device.candidate_count",
                "must be at least 1",
            ));
        }
        if self.device.discovery == DiscoveryMode::Fixed && self.device.fixed_path.is_none() {
            return Err(ConfigError::validation(
                "device.fixed_path",
                "required when discovery = \"fixed\"",
            ));
        }
        if self.acquisition.escalate_after == Some(0) {
            return Err(ConfigError::validation(
                "acquisition.escalate_after",
                "must be at least 1 when set",
            ));
        }
        if self.output.sink == SinkKind::Radio {
            if self.radio.baud_rate == 0 {
                return Err(ConfigError::validation("radio.baud_rate", "must be non-zero"));
            }
            if self.radio.remote_node_id.trim().is_empty() {
                return Err(ConfigError::validation(
                    "radio.remote_node_id",
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// How candidate device paths are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// `<path_prefix>0` .. `<path_prefix>{candidate_count-1}`
    #[default]
    Enumerated,
    /// Only `fixed_path`
    Fixed,
    /// Whatever the OS reports, optionally filtered
    Hotplug,
}

/// Sensor board section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub discovery: DiscoveryMode,
    pub path_prefix: String,
    pub candidate_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotplug_filter: Option<String>,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Pause after a full sweep found nothing
    pub sweep_delay_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryMode::Enumerated,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            fixed_path: None,
            hotplug_filter: None,
            baud_rate: SENSOR_BAUD_RATE,
            read_timeout_ms: 2000,
            sweep_delay_ms: 250,
        }
    }
}

impl DeviceConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn sweep_delay(&self) -> Duration {
        Duration::from_millis(self.sweep_delay_ms)
    }

    pub fn port_configuration(&self) -> PortConfiguration {
        PortConfiguration::new(self.baud_rate, self.read_timeout())
    }

    pub fn path_provider(&self) -> Box<dyn PathProvider> {
        match self.discovery {
            DiscoveryMode::Enumerated => {
                Box::new(EnumeratedPaths::new(&self.path_prefix, self.candidate_count))
            }
            DiscoveryMode::Fixed => Box::new(FixedPath::new(
                self.fixed_path
                    .clone()
                    .unwrap_or_else(|| format!("{}0", self.path_prefix)),
            )),
            DiscoveryMode::Hotplug => Box::new(HotPlug::new(self.hotplug_filter.clone())),
        }
    }
}

/// Acquisition loop section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Data discarded for this long after every connect
    pub settle_ms: u64,
    /// Restart the pipeline after this many timeouts in a row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalate_after: Option<u32>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            settle_ms: 2000,
            escalate_after: None,
        }
    }
}

impl AcquisitionConfig {
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn loop_options(&self) -> LoopOptions {
        LoopOptions {
            escalate_after: self.escalate_after,
        }
    }
}

/// Record destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Forward one field over the XBee radio
    #[default]
    Radio,
    /// Print whole records to stdout
    Console,
}

/// Output section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sink: SinkKind,
}

/// XBee radio section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Serial port the XBee module is attached to
    pub port: String,
    pub baud_rate: u32,
    /// Node identifier (NI) of the collecting station
    pub remote_node_id: String,
    /// Record position forwarded; 0 is the timestamp
    pub forward_field: usize,
    pub discovery_timeout_ms: u64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_RADIO_BAUD_RATE,
            remote_node_id: DEFAULT_REMOTE_NODE_ID.to_string(),
            forward_field: DEFAULT_FORWARD_FIELD,
            discovery_timeout_ms: 10_000,
        }
    }
}

impl RadioConfig {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}

/// Supervisor section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Pause before rebuilding a failed pipeline
    pub restart_delay_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: 500,
        }
    }
}

impl SupervisorConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive: "trace", "debug", "info", "warn", "error" or a full
    /// `EnvFilter` string. `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}
