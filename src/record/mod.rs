//! Timestamped sensor records.
//!
//! A [`Record`] is the positional form `[timestamp, D1, .., Dn]` produced for
//! every line read from the device. The classifier layers a typed view on top
//! ([`ClassifiedRecord`]) without changing field positions.

pub mod classify;
pub mod parser;

pub use classify::{classify, ClassifiedRecord, FaultCode, Token};
pub use parser::{capture_time, format_timestamp, parse_line};

use std::fmt;

/// One parsed line of device output.
///
/// Always holds at least the timestamp. A record with nothing else in it means
/// no sensor data arrived (decode failure, timeout or an empty line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// A record carrying data tokens after the timestamp.
    pub fn new<I, S>(timestamp: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = vec![timestamp.into()];
        fields.extend(tokens.into_iter().map(Into::into));
        Self { fields }
    }

    /// The degenerate record: timestamp only.
    pub fn timestamp_only(timestamp: impl Into<String>) -> Self {
        Self {
            fields: vec![timestamp.into()],
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.fields[0]
    }

    /// Data tokens after the timestamp.
    pub fn data(&self) -> &[String] {
        &self.fields[1..]
    }

    /// Field by position, where position 0 is the timestamp.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields including the timestamp; never zero.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; a record carries at least its timestamp.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True when the record holds sensor data and not only the timestamp.
    pub fn has_data(&self) -> bool {
        self.fields.len() > 1
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(" "))
    }
}
