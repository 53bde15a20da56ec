//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::{Config, DiscoveryMode, LogFormat, SinkKind};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SENSOR_RELAY";

/// File name looked up in the working directory
const LOCAL_CONFIG_FILE_NAME: &str = "sensor-relay.toml";

/// File name inside the per-user config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SENSOR_RELAY_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

/// Settings given on the command line. They sit above the file and the
/// environment, and validation runs only after they are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub console: bool,
    pub log_level: Option<String>,
}

impl CliOverrides {
    fn apply(&self, config: &mut Config) {
        if self.console {
            config.output.sink = SinkKind::Console;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// 1. `SENSOR_RELAY_CONFIG` environment variable
    /// 2. `./sensor-relay.toml`
    /// 3. the per-user config directory (`~/.config/sensor-relay/config.toml`
    ///    on Linux)
    /// 4. built-in defaults
    ///
    /// Environment variables override file values, and the result is
    /// validated.
    pub fn load() -> ConfigResult<Self> {
        Self::resolve(None, &CliOverrides::default())
    }

    /// Load configuration from a specific file path. The file must exist.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::resolve(Some(path.as_ref()), &CliOverrides::default())
    }

    /// Full resolution for the binary: an explicit file (or the standard
    /// lookup), then environment overrides, then command-line overrides,
    /// then validation.
    pub fn resolve(path: Option<&Path>, cli: &CliOverrides) -> ConfigResult<Self> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => resolve_config_path(),
        };

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };
        apply_env_overrides(&mut config)?;
        cli.apply(&mut config);
        config.validate()?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> ConfigResult<Self> {
        let mut config = Config::default();
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: None,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Save the current configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_to_file(&self.config, path.as_ref())
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Per-user directory the relay reads `config.toml` from.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sensor-relay").map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

fn save_to_file(config: &Config, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn env_var(key: &str) -> Option<(String, String)> {
    let name = format!("{}_{}", ENV_PREFIX, key);
    std::env::var(&name).ok().map(|value| (name, value))
}

fn parse_env<T: FromStr>(name: &str, value: &str, what: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse(name, format!("Invalid {}: {:?}", what, value)))
}

/// Apply `SENSOR_RELAY_<SECTION>_<KEY>` overrides, e.g.
/// `SENSOR_RELAY_DEVICE_BAUD_RATE=19200` or `SENSOR_RELAY_OUTPUT_SINK=console`.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Some((name, val)) = env_var("DEVICE_DISCOVERY") {
        config.device.discovery = match val.trim().to_lowercase().as_str() {
            "enumerated" => DiscoveryMode::Enumerated,
            "fixed" => DiscoveryMode::Fixed,
            "hotplug" => DiscoveryMode::Hotplug,
            _ => {
                return Err(ConfigError::env_parse(
                    name,
                    "Expected enumerated, fixed or hotplug",
                ));
            }
        };
    }
    if let Some((_, val)) = env_var("DEVICE_PATH_PREFIX") {
        config.device.path_prefix = val;
    }
    if let Some((_, val)) = env_var("DEVICE_FIXED_PATH") {
        config.device.fixed_path = Some(val);
    }
    if let Some((_, val)) = env_var("DEVICE_HOTPLUG_FILTER") {
        config.device.hotplug_filter = Some(val);
    }
    if let Some((name, val)) = env_var("DEVICE_CANDIDATE_COUNT") {
        config.device.candidate_count = parse_env(&name, &val, "count")?;
    }
    if let Some((name, val)) = env_var("DEVICE_BAUD_RATE") {
        config.device.baud_rate = parse_env(&name, &val, "baud rate")?;
    }
    if let Some((name, val)) = env_var("DEVICE_READ_TIMEOUT_MS") {
        config.device.read_timeout_ms = parse_env(&name, &val, "timeout")?;
    }

    if let Some((name, val)) = env_var("ACQUISITION_SETTLE_MS") {
        config.acquisition.settle_ms = parse_env(&name, &val, "duration")?;
    }
    if let Some((name, val)) = env_var("ACQUISITION_ESCALATE_AFTER") {
        config.acquisition.escalate_after = Some(parse_env(&name, &val, "count")?);
    }

    if let Some((name, val)) = env_var("OUTPUT_SINK") {
        config.output.sink = match val.trim().to_lowercase().as_str() {
            "radio" => SinkKind::Radio,
            "console" => SinkKind::Console,
            _ => return Err(ConfigError::env_parse(name, "Expected radio or console")),
        };
    }

    if let Some((_, val)) = env_var("RADIO_PORT") {
        config.radio.port = val;
    }
    if let Some((name, val)) = env_var("RADIO_BAUD_RATE") {
        config.radio.baud_rate = parse_env(&name, &val, "baud rate")?;
    }
    if let Some((_, val)) = env_var("RADIO_REMOTE_NODE_ID") {
        config.radio.remote_node_id = val;
    }
    if let Some((name, val)) = env_var("RADIO_FORWARD_FIELD") {
        config.radio.forward_field = parse_env(&name, &val, "field index")?;
    }

    if let Some((name, val)) = env_var("SUPERVISOR_RESTART_DELAY_MS") {
        config.supervisor.restart_delay_ms = parse_env(&name, &val, "duration")?;
    }

    if let Some((_, val)) = env_var("LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some((name, val)) = env_var("LOG_FORMAT") {
        config.logging.format = match val.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => return Err(ConfigError::env_parse(name, "Expected json, pretty or compact")),
        };
    }

    Ok(())
}
