//! Port locator: probe candidates until one opens.

use super::PathProvider;
use crate::acquisition::ConnectionHandle;
use crate::port::{PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Opens a device path into a port.
pub trait PortOpener: Send {
    fn open(
        &mut self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}

/// Opens real serial ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl PortOpener for SystemOpener {
    fn open(
        &mut self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(SyncSerialPort::open(path, config.clone())?))
    }
}

impl<F> PortOpener for F
where
    F: FnMut(&str, &PortConfiguration) -> Result<Box<dyn SerialPortAdapter>, PortError> + Send,
{
    fn open(
        &mut self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        self(path, config)
    }
}

/// Finds the sensor board by trying candidate paths in order.
///
/// There is no "no device" outcome: every open failure just moves on to the
/// next candidate, and the locator keeps sweeping until something opens.
pub struct PortLocator {
    provider: Box<dyn PathProvider>,
    opener: Box<dyn PortOpener>,
    config: PortConfiguration,
    sweep_delay: Duration,
}

impl PortLocator {
    pub fn new(
        provider: Box<dyn PathProvider>,
        opener: Box<dyn PortOpener>,
        config: PortConfiguration,
    ) -> Self {
        Self {
            provider,
            opener,
            config,
            sweep_delay: Duration::ZERO,
        }
    }

    /// Pause between full sweeps that found nothing.
    pub fn with_sweep_delay(mut self, delay: Duration) -> Self {
        self.sweep_delay = delay;
        self
    }

    pub fn configuration(&self) -> &PortConfiguration {
        &self.config
    }

    /// Block until a candidate opens.
    pub fn connect(&mut self) -> ConnectionHandle {
        let never = AtomicBool::new(false);
        loop {
            if let Some(handle) = self.connect_until(&never) {
                return handle;
            }
        }
    }

    /// Like [`connect`](Self::connect), but gives up with `None` once
    /// `shutdown` is set.
    pub fn connect_until(&mut self, shutdown: &AtomicBool) -> Option<ConnectionHandle> {
        self.provider.reset();
        let mut failed_attempts = 0usize;

        debug!("Locating sensor port via {} provider", self.provider.name());
        while !shutdown.load(Ordering::Relaxed) {
            let Some(candidate) = self.provider.next_candidate() else {
                if !self.sweep_delay.is_zero() {
                    std::thread::sleep(self.sweep_delay);
                }
                continue;
            };

            match self.opener.open(&candidate.path, &self.config) {
                Ok(port) => {
                    info!(
                        "Connected to {} after {} failed attempt(s)",
                        candidate, failed_attempts
                    );
                    return Some(ConnectionHandle::new(port, candidate, failed_attempts));
                }
                Err(e) => {
                    debug!("Could not open {}: {}", candidate, e);
                    failed_attempts += 1;
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for PortLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortLocator")
            .field("provider", &self.provider)
            .field("config", &self.config)
            .field("sweep_delay", &self.sweep_delay)
            .finish()
    }
}
