//! The acquisition loop.
//!
//! Reads one line at a time from the sensor board, turns it into a record and
//! hands records with data to the sink. A read that produces no data (timeout,
//! undecodable bytes, blank line) makes the loop close and reopen the port in
//! place, which is the only recovery it performs on its own.
//!
//! ```text
//!            record has data
//!          ┌─────────────────┐
//!          ▼                 │
//!     ┌──────────┐   timestamp only   ┌────────────┐
//!     │Connected │ ─────────────────▶ │ Recovering │
//!     └──────────┘ ◀───────────────── └────────────┘
//!                    port reopened
//! ```

pub mod connection;
pub mod error;
pub mod settle;

pub use connection::ConnectionHandle;
pub use error::AcquisitionError;
pub use settle::{SettleFilter, DEFAULT_SETTLE_WINDOW};

use crate::port::PortError;
use crate::record::{capture_time, classify, format_timestamp, parse_line, Record};
use crate::sink::{Delivery, RecordSink};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Where the loop is in its recovery cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Recovering,
}

/// Tuning for the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopOptions {
    /// Fail the step after this many consecutive data-less reads instead of
    /// reopening again. `None` reopens forever.
    pub escalate_after: Option<u32>,
}

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub delivered: u64,
    pub skipped: u64,
    pub recoveries: u64,
    /// Data-less reads since the last record with data.
    pub timeout_streak: u32,
    pub fault_tokens: u64,
}

/// Result of one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A record with data went to the sink.
    Delivered(Delivery),
    /// No data was read; the port was reopened.
    Recovered,
}

pub struct AcquisitionLoop {
    conn: ConnectionHandle,
    sink: Box<dyn RecordSink>,
    state: LinkState,
    options: LoopOptions,
    stats: LoopStats,
}

impl AcquisitionLoop {
    /// Start in `Connected`; the connection should already have been settled.
    pub fn new(conn: ConnectionHandle, sink: Box<dyn RecordSink>, options: LoopOptions) -> Self {
        Self {
            conn,
            sink,
            state: LinkState::Connected,
            options,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.conn
    }

    /// Read one line and parse it, stamping it with the time the read began.
    ///
    /// Timeouts become the timestamp-only record; other transport errors are
    /// returned.
    pub fn read_record(&mut self) -> Result<Record, PortError> {
        let captured = capture_time();
        match self.conn.read_line() {
            Ok(line) => Ok(parse_line(&line, captured)),
            Err(e) if e.is_timeout() => Ok(Record::timestamp_only(format_timestamp(captured))),
            Err(e) => Err(e),
        }
    }

    /// Run exactly one iteration.
    pub fn step(&mut self) -> Result<StepOutcome, AcquisitionError> {
        let record = self.read_record()?;

        if record.has_data() {
            self.stats.timeout_streak = 0;
            let classified = classify(record);
            for (position, code) in classified.faults() {
                self.stats.fault_tokens += 1;
                warn!(
                    "Device reported {} ({}) in field {}",
                    code,
                    code.description(),
                    position
                );
            }

            let delivery = self.sink.deliver(&classified)?;
            match delivery {
                Delivery::Skipped { .. } => self.stats.skipped += 1,
                _ => self.stats.delivered += 1,
            }
            return Ok(StepOutcome::Delivered(delivery));
        }

        self.stats.timeout_streak += 1;
        warn!("TIMEOUT: no sensor data from {}", self.conn.path());
        if let Some(limit) = self.options.escalate_after {
            if self.stats.timeout_streak >= limit {
                return Err(AcquisitionError::TimeoutStreak(self.stats.timeout_streak));
            }
        }

        self.recover()?;
        Ok(StepOutcome::Recovered)
    }

    fn recover(&mut self) -> Result<(), PortError> {
        self.state = LinkState::Recovering;
        self.conn.reopen()?;
        self.state = LinkState::Connected;
        self.stats.recoveries += 1;
        debug!("Reopened {}", self.conn.path());
        Ok(())
    }

    /// Step until a fault escapes or `shutdown` is set.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), AcquisitionError> {
        while !shutdown.load(Ordering::Relaxed) {
            self.step()?;
        }
        Ok(())
    }

    pub fn into_connection(self) -> ConnectionHandle {
        self.conn
    }
}

impl std::fmt::Debug for AcquisitionLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionLoop")
            .field("conn", &self.conn)
            .field("sink", &self.sink.name())
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}
