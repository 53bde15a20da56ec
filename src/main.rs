use clap::Parser;
use sensor_relay::config::{CliOverrides, Config, ConfigLoader, LogFormat};
use sensor_relay::{AppError, AppResult, Supervisor};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Relays microcontroller sensor readings from a serial port over an XBee radio.",
    long_about = "Finds the sensor board on /dev/ttyACM0-9 (or as configured), discards the \
                  first two seconds of output, then timestamps every line and forwards one \
                  field to the radio node \"Main\". Read timeouts reopen the port; other \
                  faults restart the pipeline from port discovery."
)]
struct Args {
    /// Configuration file. Overrides SENSOR_RELAY_CONFIG and the default locations.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print records to stdout instead of forwarding them over the radio.
    #[arg(long)]
    console: bool,

    /// Log filter, e.g. "debug" or "sensor_relay=trace". RUST_LOG still wins.
    #[arg(short, long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn main() -> AppResult<()> {
    let args = Args::parse();

    let cli = CliOverrides {
        console: args.console,
        log_level: args.log_level,
    };
    let config = ConfigLoader::resolve(args.config.as_deref(), &cli)?.into_config();

    setup_logging(&config)?;
    info!(
        "sensor-relay {} starting ({:?} discovery, {:?} sink)",
        env!("CARGO_PKG_VERSION"),
        config.device.discovery,
        config.output.sink
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let mut supervisor = Supervisor::from_config(&config, shutdown);
    let report = supervisor.run();
    info!("Exiting: {:?}", report);
    Ok(())
}

/// Logs go to stderr so console output on stdout stays clean.
fn setup_logging(config: &Config) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| AppError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match config.logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| AppError::Logging(e.to_string()))
}
