//! Configuration for sensor-relay.
//!
//! TOML-based configuration with environment variable overrides. Every key
//! is optional; without a file the relay runs with the stock settings
//! (`/dev/ttyACM0`..`9` at 9600 baud, 2 s settle, forward field 2 to node
//! `Main`).
//!
//! # Configuration Resolution
//!
//! 1. `--config <path>` on the command line
//! 2. `SENSOR_RELAY_CONFIG` environment variable
//! 3. `./sensor-relay.toml`
//! 4. `config.toml` in the per-user config directory
//! 5. Built-in defaults
//!
//! # Environment Overrides
//!
//! The pattern is `SENSOR_RELAY_<SECTION>_<KEY>`:
//! - `SENSOR_RELAY_DEVICE_FIXED_PATH=/dev/ttyUSB1`
//! - `SENSOR_RELAY_OUTPUT_SINK=console`
//! - `SENSOR_RELAY_RADIO_REMOTE_NODE_ID=Base`
//!
//! # Example
//!
//! ```rust,no_run
//! use sensor_relay::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! println!("forwarding field {}", loader.config().radio.forward_field);
//! # Ok::<(), sensor_relay::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, CliOverrides,
    ConfigLoader,
};
pub use schema::{
    AcquisitionConfig, Config, DeviceConfig, DiscoveryMode, LogFormat, LoggingConfig,
    OutputConfig, RadioConfig, SinkKind, SupervisorConfig,
};
