//! Radio link error types.

use crate::port::PortError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the radio link or its frame codec.
#[derive(Debug, Error)]
pub enum RadioError {
    /// The serial port behind the radio failed.
    #[error("Radio port error: {0}")]
    Port(#[from] PortError),

    /// A frame's checksum did not match its contents.
    #[error("Frame checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Payload does not fit in a single API frame.
    #[error("Frame payload of {0} bytes exceeds the API frame limit")]
    FrameTooLong(usize),

    /// A frame was structurally invalid for its type.
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// The radio answered but does not know the node.
    #[error("Node '{node_id}' not found (AT status {status})")]
    NodeNotFound { node_id: String, status: u8 },

    /// No answer to the discovery request in time.
    #[error("Discovery of node '{node_id}' timed out after {timeout:?}")]
    DiscoveryTimeout { node_id: String, timeout: Duration },
}

impl RadioError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
