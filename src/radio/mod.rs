//! Wireless mesh radio endpoint.
//!
//! The acquisition core only needs two things from the radio: resolve a node
//! identifier to an endpoint, and push bytes at that endpoint. [`RadioLink`]
//! captures exactly that; [`XBeeRadio`] implements it over an XBee module in
//! API mode.

pub mod error;
pub mod frame;
pub mod xbee;

pub use error::RadioError;
pub use frame::{ApiFrame, FrameDecoder};
pub use xbee::XBeeRadio;

use std::fmt;

/// Address of a remote radio node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Node identifier the endpoint was discovered by.
    pub node_id: String,
    /// 64-bit hardware address.
    pub address64: u64,
    /// 16-bit network address, `0xFFFE` when unknown.
    pub address16: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:016X}/{:04X})",
            self.node_id, self.address64, self.address16
        )
    }
}

/// Outbound side of the mesh radio.
#[cfg_attr(test, mockall::automock)]
pub trait RadioLink: Send {
    /// Resolve `node_id` to an endpoint on the mesh.
    fn discover(&mut self, node_id: &str) -> Result<Endpoint, RadioError>;

    /// Send `data` to `endpoint`. No acknowledgment is awaited.
    fn send(&mut self, endpoint: &Endpoint, data: &[u8]) -> Result<(), RadioError>;
}
