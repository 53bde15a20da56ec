//! XBee API frame codec (API mode 1, no escaping).
//!
//! ```text
//! 0x7E | length (u16 BE) | frame data (type + body) | checksum
//! ```
//!
//! The checksum is `0xFF` minus the low byte of the sum of the frame data.

use super::error::RadioError;

pub const START_DELIMITER: u8 = 0x7E;

pub const FRAME_AT_COMMAND: u8 = 0x08;
pub const FRAME_TRANSMIT_REQUEST: u8 = 0x10;
pub const FRAME_AT_RESPONSE: u8 = 0x88;

/// 16-bit address meaning "unknown, resolve by 64-bit address".
pub const ADDRESS16_UNKNOWN: u16 = 0xFFFE;

/// Largest frame data length the length field can describe.
const MAX_FRAME_DATA: usize = u16::MAX as usize;

/// Decoded API frames this crate produces or consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFrame {
    AtCommand {
        frame_id: u8,
        command: [u8; 2],
        parameter: Vec<u8>,
    },
    AtResponse {
        frame_id: u8,
        command: [u8; 2],
        status: u8,
        data: Vec<u8>,
    },
    TransmitRequest {
        frame_id: u8,
        address64: u64,
        address16: u16,
        radius: u8,
        options: u8,
        payload: Vec<u8>,
    },
    /// Any frame type not listed above, kept raw.
    Other { frame_type: u8, body: Vec<u8> },
}

impl ApiFrame {
    pub fn frame_type(&self) -> u8 {
        match self {
            Self::AtCommand { .. } => FRAME_AT_COMMAND,
            Self::AtResponse { .. } => FRAME_AT_RESPONSE,
            Self::TransmitRequest { .. } => FRAME_TRANSMIT_REQUEST,
            Self::Other { frame_type, .. } => *frame_type,
        }
    }

    fn frame_data(&self) -> Vec<u8> {
        let mut data = vec![self.frame_type()];
        match self {
            Self::AtCommand {
                frame_id,
                command,
                parameter,
            } => {
                data.push(*frame_id);
                data.extend_from_slice(command);
                data.extend_from_slice(parameter);
            }
            Self::AtResponse {
                frame_id,
                command,
                status,
                data: body,
            } => {
                data.push(*frame_id);
                data.extend_from_slice(command);
                data.push(*status);
                data.extend_from_slice(body);
            }
            Self::TransmitRequest {
                frame_id,
                address64,
                address16,
                radius,
                options,
                payload,
            } => {
                data.push(*frame_id);
                data.extend_from_slice(&address64.to_be_bytes());
                data.extend_from_slice(&address16.to_be_bytes());
                data.push(*radius);
                data.push(*options);
                data.extend_from_slice(payload);
            }
            Self::Other { body, .. } => data.extend_from_slice(body),
        }
        data
    }

    /// Serialize into a complete frame including delimiter and checksum.
    pub fn encode(&self) -> Result<Vec<u8>, RadioError> {
        let data = self.frame_data();
        if data.len() > MAX_FRAME_DATA {
            return Err(RadioError::FrameTooLong(data.len()));
        }
        let mut frame = Vec::with_capacity(data.len() + 4);
        frame.push(START_DELIMITER);
        frame.extend_from_slice(&(data.len() as u16).to_be_bytes());
        frame.extend_from_slice(&data);
        frame.push(checksum(&data));
        Ok(frame)
    }

    fn from_frame_data(data: &[u8]) -> Result<Self, RadioError> {
        let (&frame_type, body) = data
            .split_first()
            .ok_or_else(|| RadioError::malformed("empty frame data"))?;

        match frame_type {
            FRAME_AT_RESPONSE => {
                if body.len() < 4 {
                    return Err(RadioError::malformed(format!(
                        "AT response needs 4 header bytes, got {}",
                        body.len()
                    )));
                }
                Ok(Self::AtResponse {
                    frame_id: body[0],
                    command: [body[1], body[2]],
                    status: body[3],
                    data: body[4..].to_vec(),
                })
            }
            FRAME_AT_COMMAND => {
                if body.len() < 3 {
                    return Err(RadioError::malformed("AT command needs 3 header bytes"));
                }
                Ok(Self::AtCommand {
                    frame_id: body[0],
                    command: [body[1], body[2]],
                    parameter: body[3..].to_vec(),
                })
            }
            FRAME_TRANSMIT_REQUEST => {
                if body.len() < 13 {
                    return Err(RadioError::malformed("transmit request needs 13 header bytes"));
                }
                let mut address64 = [0u8; 8];
                address64.copy_from_slice(&body[1..9]);
                Ok(Self::TransmitRequest {
                    frame_id: body[0],
                    address64: u64::from_be_bytes(address64),
                    address16: u16::from_be_bytes([body[9], body[10]]),
                    radius: body[11],
                    options: body[12],
                    payload: body[13..].to_vec(),
                })
            }
            other => Ok(Self::Other {
                frame_type: other,
                body: body.to_vec(),
            }),
        }
    }
}

/// `0xFF - (sum(data) & 0xFF)`.
pub fn checksum(data: &[u8]) -> u8 {
    0xFF - data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Incremental decoder over a byte stream from the radio.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes held waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Pull the next complete frame out of the buffer.
    ///
    /// Bytes before a start delimiter are dropped. On a bad checksum only the
    /// delimiter is discarded and the error is returned; the next call
    /// resumes the search from the following byte.
    pub fn next_frame(&mut self) -> Result<Option<ApiFrame>, RadioError> {
        match memchr::memchr(START_DELIMITER, &self.buffer) {
            Some(0) => {}
            Some(start) => {
                self.buffer.drain(..start);
            }
            None => {
                self.buffer.clear();
                return Ok(None);
            }
        }

        if self.buffer.len() < 3 {
            return Ok(None);
        }
        let length = u16::from_be_bytes([self.buffer[1], self.buffer[2]]) as usize;
        let total = length + 4;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let expected = checksum(&self.buffer[3..3 + length]);
        let actual = self.buffer[total - 1];
        if expected != actual {
            // Not a real frame start. Drop only the delimiter so a frame
            // beginning inside the claimed span is still found.
            self.buffer.drain(..1);
            return Err(RadioError::ChecksumMismatch { expected, actual });
        }

        let frame: Vec<u8> = self.buffer.drain(..total).collect();
        ApiFrame::from_frame_data(&frame[3..3 + length]).map(Some)
    }
}
