//! XBee module in API mode behind a serial port.

use super::frame::{ApiFrame, FrameDecoder, ADDRESS16_UNKNOWN};
use super::{Endpoint, RadioError, RadioLink};
use crate::port::{PortConfiguration, SerialPortAdapter, SyncSerialPort};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Baud rate XBee modules ship configured for in this deployment.
pub const DEFAULT_RADIO_BAUD_RATE: u32 = 115200;

/// Read timeout on the radio port while waiting for responses.
const RADIO_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// "Destination Node": resolves a node identifier to its addresses.
const AT_DESTINATION_NODE: [u8; 2] = *b"DN";

/// XBee radio speaking API frames over `P`.
#[derive(Debug)]
pub struct XBeeRadio<P: SerialPortAdapter> {
    port: P,
    decoder: FrameDecoder,
    next_frame_id: u8,
    discovery_timeout: Duration,
}

impl XBeeRadio<SyncSerialPort> {
    /// Open the radio's serial port.
    pub fn open(
        path: &str,
        baud_rate: u32,
        discovery_timeout: Duration,
    ) -> Result<Self, RadioError> {
        let config = PortConfiguration::new(baud_rate, RADIO_READ_TIMEOUT);
        let port = SyncSerialPort::open(path, config)?;
        info!("Opened XBee radio on {} at {} baud", path, baud_rate);
        Ok(Self::new(port, discovery_timeout))
    }
}

impl<P: SerialPortAdapter> XBeeRadio<P> {
    pub fn new(port: P, discovery_timeout: Duration) -> Self {
        Self {
            port,
            decoder: FrameDecoder::new(),
            next_frame_id: 1,
            discovery_timeout,
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Frame ids 1..=255; 0 would suppress the response.
    fn allocate_frame_id(&mut self) -> u8 {
        let id = self.next_frame_id;
        self.next_frame_id = self.next_frame_id.checked_add(1).unwrap_or(1);
        id
    }

    fn write_frame(&mut self, frame: &ApiFrame) -> Result<(), RadioError> {
        let bytes = frame.encode()?;
        let mut written = 0;
        while written < bytes.len() {
            written += self.port.write_bytes(&bytes[written..])?;
        }
        Ok(())
    }

    /// Wait for the AT response carrying `frame_id`, up to `deadline`.
    fn await_at_response(
        &mut self,
        frame_id: u8,
        deadline: Instant,
    ) -> Result<Option<(u8, Vec<u8>)>, RadioError> {
        let mut chunk = [0u8; 64];
        loop {
            loop {
                match self.decoder.next_frame() {
                    Ok(Some(ApiFrame::AtResponse {
                        frame_id: id,
                        status,
                        data,
                        ..
                    })) if id == frame_id => return Ok(Some((status, data))),
                    Ok(Some(other)) => {
                        debug!("Ignoring radio frame type 0x{:02X}", other.frame_type())
                    }
                    Ok(None) => break,
                    Err(e) => warn!("Dropping radio frame: {}", e),
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
            match self.port.read_bytes(&mut chunk) {
                Ok(n) => self.decoder.push(&chunk[..n]),
                Err(e) if e.is_timeout() => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<P: SerialPortAdapter> RadioLink for XBeeRadio<P> {
    fn discover(&mut self, node_id: &str) -> Result<Endpoint, RadioError> {
        let frame_id = self.allocate_frame_id();
        self.write_frame(&ApiFrame::AtCommand {
            frame_id,
            command: AT_DESTINATION_NODE,
            parameter: node_id.as_bytes().to_vec(),
        })?;

        let deadline = Instant::now() + self.discovery_timeout;
        let Some((status, data)) = self.await_at_response(frame_id, deadline)? else {
            return Err(RadioError::DiscoveryTimeout {
                node_id: node_id.to_string(),
                timeout: self.discovery_timeout,
            });
        };

        if status != 0 {
            return Err(RadioError::NodeNotFound {
                node_id: node_id.to_string(),
                status,
            });
        }
        if data.len() < 10 {
            return Err(RadioError::malformed(format!(
                "DN response carries {} address bytes, expected 10",
                data.len()
            )));
        }

        let mut address64 = [0u8; 8];
        address64.copy_from_slice(&data[2..10]);
        let endpoint = Endpoint {
            node_id: node_id.to_string(),
            address16: u16::from_be_bytes([data[0], data[1]]),
            address64: u64::from_be_bytes(address64),
        };
        info!("Discovered radio node {}", endpoint);
        Ok(endpoint)
    }

    fn send(&mut self, endpoint: &Endpoint, data: &[u8]) -> Result<(), RadioError> {
        // Frame id 0: the module sends no transmit status back.
        self.write_frame(&ApiFrame::TransmitRequest {
            frame_id: 0,
            address64: endpoint.address64,
            address16: if endpoint.address16 == 0 {
                ADDRESS16_UNKNOWN
            } else {
                endpoint.address16
            },
            radius: 0,
            options: 0,
            payload: data.to_vec(),
        })
    }
}
