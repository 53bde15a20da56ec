//! Destinations for valid records.
//!
//! The acquisition loop hands every record that carries data to a
//! [`RecordSink`]. Sinks do not buffer or retry; an error here ends the
//! pipeline and the supervisor rebuilds it.

pub mod console;
pub mod radio;

pub use console::ConsolePrinter;
pub use radio::{RadioForwarder, DEFAULT_FORWARD_FIELD, DEFAULT_REMOTE_NODE_ID};

use crate::radio::RadioError;
use crate::record::ClassifiedRecord;
use thiserror::Error;

/// Errors raised while building or feeding a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Radio sink failed: {0}")]
    Radio(#[from] RadioError),

    #[error("Console sink failed: {0}")]
    Io(#[from] std::io::Error),
}

/// What a sink did with a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Bytes handed to the radio.
    Sent { bytes: usize },
    /// Line written to the console.
    Printed,
    /// Nothing was sent; the record lacked what the sink needs.
    Skipped { reason: String },
}

/// Consumer of parsed records.
pub trait RecordSink: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn deliver(&mut self, record: &ClassifiedRecord) -> Result<Delivery, SinkError>;
}

impl<T: RecordSink + ?Sized> RecordSink for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deliver(&mut self, record: &ClassifiedRecord) -> Result<Delivery, SinkError> {
        (**self).deliver(record)
    }
}
