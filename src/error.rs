use crate::config::ConfigError;
use thiserror::Error;

/// Errors that reach the binary's entry point.
///
/// Pipeline faults are normally absorbed by the supervisor; what surfaces
/// here is setup that cannot proceed at all.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type AppResult<T> = Result<T, AppError>;
