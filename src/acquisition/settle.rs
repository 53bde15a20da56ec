//! Settle window after (re)connecting.
//!
//! The board emits garbage for a moment after the host opens the port. Every
//! read inside the window is thrown away; there is no handshake.

use super::ConnectionHandle;
use crate::port::PortError;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_SETTLE_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct SettleFilter {
    window: Duration,
}

impl Default for SettleFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_WINDOW)
    }
}

impl SettleFilter {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Read and discard until the elapsed time exceeds the window. Returns
    /// the number of lines discarded. A zero window disables settling.
    ///
    /// Timeouts inside the window are expected and ignored; any other
    /// transport error is returned.
    pub fn drain(&self, conn: &mut ConnectionHandle) -> Result<usize, PortError> {
        if self.window.is_zero() {
            return Ok(0);
        }

        let started = Instant::now();
        let mut discarded = 0;

        while started.elapsed() <= self.window {
            match conn.read_line() {
                Ok(_) => discarded += 1,
                Err(e) if e.is_timeout() => {}
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Settle window of {:?} on {} discarded {} line(s)",
            self.window,
            conn.path(),
            discarded
        );
        Ok(discarded)
    }
}
