//! Errors that end an acquisition pipeline.

use crate::port::PortError;
use crate::sink::SinkError;
use thiserror::Error;

/// Faults the acquisition loop does not recover from itself.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The sensor transport failed outside a plain read timeout, or the port
    /// could not be reopened.
    #[error("Sensor transport fault: {0}")]
    Transport(#[from] PortError),

    /// The record sink could not be built or refused a record.
    #[error("Sink fault: {0}")]
    Sink(#[from] SinkError),

    /// Too many timeouts in a row with escalation enabled.
    #[error("{0} consecutive read timeouts")]
    TimeoutStreak(u32),
}
