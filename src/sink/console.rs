//! Prints records as space-separated lines.

use super::{Delivery, RecordSink, SinkError};
use crate::record::ClassifiedRecord;
use std::io::Write;

#[derive(Debug)]
pub struct ConsolePrinter<W: Write + Send> {
    out: W,
}

impl ConsolePrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RecordSink for ConsolePrinter<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn deliver(&mut self, record: &ClassifiedRecord) -> Result<Delivery, SinkError> {
        writeln!(self.out, "{}", record.record())?;
        self.out.flush()?;
        Ok(Delivery::Printed)
    }
}
