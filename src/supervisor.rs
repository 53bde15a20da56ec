//! Supervision of the whole acquisition pipeline.
//!
//! The supervisor owns the pipeline (locate → settle → build sink → loop) and
//! reduces everything that happens to it into an [`Outcome`]:
//!
//! - `Recovered`: the loop reopened the port in place and keeps running;
//! - `FatalRestart`: a fault escaped the loop, the pipeline is dropped and the
//!   next call rebuilds it starting from port discovery;
//! - `Terminated`: shutdown was requested.
//!
//! [`Supervisor::run`] keeps going until `Terminated`, so the process only
//! stops on request.

use crate::acquisition::{AcquisitionError, AcquisitionLoop, LoopOptions, SettleFilter, StepOutcome};
use crate::config::{Config, SinkKind};
use crate::discovery::{PortLocator, SystemOpener};
use crate::radio::XBeeRadio;
use crate::sink::{ConsolePrinter, RadioForwarder, RecordSink, SinkError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_millis(500);

/// Builds a fresh sink for every pipeline.
pub type SinkFactory = Box<dyn FnMut() -> Result<Box<dyn RecordSink>, SinkError> + Send>;

/// What the supervisor observed.
#[derive(Debug)]
pub enum Outcome {
    Recovered,
    FatalRestart(AcquisitionError),
    Terminated,
}

/// Totals across every pipeline the supervisor ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    pub pipelines_started: u64,
    pub restarts: u64,
    pub recoveries: u64,
    pub delivered: u64,
}

pub struct Supervisor {
    locator: PortLocator,
    settle: SettleFilter,
    sink_factory: SinkFactory,
    options: LoopOptions,
    restart_delay: Duration,
    shutdown: Arc<AtomicBool>,
    active: Option<AcquisitionLoop>,
    restart_pending: bool,
    report: SupervisorReport,
}

impl Supervisor {
    pub fn new(locator: PortLocator, sink_factory: SinkFactory, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            locator,
            settle: SettleFilter::default(),
            sink_factory,
            options: LoopOptions::default(),
            restart_delay: DEFAULT_RESTART_DELAY,
            shutdown,
            active: None,
            restart_pending: false,
            report: SupervisorReport::default(),
        }
    }

    /// Wire a supervisor for real hardware from configuration.
    pub fn from_config(config: &Config, shutdown: Arc<AtomicBool>) -> Self {
        let locator = PortLocator::new(
            config.device.path_provider(),
            Box::new(SystemOpener),
            config.device.port_configuration(),
        )
        .with_sweep_delay(config.device.sweep_delay());

        let sink_factory: SinkFactory = match config.output.sink {
            SinkKind::Console => Box::new(|| -> Result<Box<dyn RecordSink>, SinkError> {
                Ok(Box::new(ConsolePrinter::stdout()))
            }),
            SinkKind::Radio => {
                let radio = config.radio.clone();
                Box::new(move || -> Result<Box<dyn RecordSink>, SinkError> {
                    let link =
                        XBeeRadio::open(&radio.port, radio.baud_rate, radio.discovery_timeout())?;
                    let forwarder =
                        RadioForwarder::connect(link, &radio.remote_node_id, radio.forward_field)?;
                    Ok(Box::new(forwarder))
                })
            }
        };

        Self::new(locator, sink_factory, shutdown)
            .with_settle(SettleFilter::new(config.acquisition.settle_window()))
            .with_loop_options(config.acquisition.loop_options())
            .with_restart_delay(config.supervisor.restart_delay())
    }

    pub fn with_settle(mut self, settle: SettleFilter) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_loop_options(mut self, options: LoopOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn report(&self) -> SupervisorReport {
        self.report
    }

    /// Whether a pipeline is currently built.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Drive the pipeline until something worth reporting happens.
    pub fn next_outcome(&mut self) -> Outcome {
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                self.active = None;
                return Outcome::Terminated;
            }

            if self.active.is_none() {
                match self.start_pipeline() {
                    Ok(Some(acquisition)) => self.active = Some(acquisition),
                    Ok(None) => continue,
                    Err(e) => return self.tear_down(e),
                }
            }

            let Some(acquisition) = self.active.as_mut() else {
                continue;
            };
            match acquisition.step() {
                Ok(StepOutcome::Recovered) => {
                    self.report.recoveries += 1;
                    return Outcome::Recovered;
                }
                Ok(StepOutcome::Delivered(_)) => self.report.delivered += 1,
                Err(e) => return self.tear_down(e),
            }
        }
    }

    /// Supervise until shutdown is requested.
    pub fn run(&mut self) -> SupervisorReport {
        loop {
            match self.next_outcome() {
                Outcome::Recovered | Outcome::FatalRestart(_) => {}
                Outcome::Terminated => {
                    info!(
                        "Supervisor stopping after {} restart(s), {} recoveries, {} record(s)",
                        self.report.restarts, self.report.recoveries, self.report.delivered
                    );
                    return self.report;
                }
            }
        }
    }

    fn start_pipeline(&mut self) -> Result<Option<AcquisitionLoop>, AcquisitionError> {
        if self.restart_pending && !self.restart_delay.is_zero() {
            std::thread::sleep(self.restart_delay);
        }
        self.restart_pending = false;

        let Some(mut conn) = self.locator.connect_until(&self.shutdown) else {
            return Ok(None);
        };
        self.settle.drain(&mut conn)?;
        let sink = (self.sink_factory)()?;

        self.report.pipelines_started += 1;
        info!("Acquiring from {} into {} sink", conn.path(), sink.name());
        Ok(Some(AcquisitionLoop::new(conn, sink, self.options)))
    }

    fn tear_down(&mut self, cause: AcquisitionError) -> Outcome {
        if let Some(acquisition) = self.active.take() {
            warn!(
                "Dropping pipeline on {}: {:?}",
                acquisition.connection().path(),
                acquisition.stats()
            );
        }
        self.report.restarts += 1;
        self.restart_pending = true;
        error!("Pipeline fault, restarting from port discovery: {}", cause);
        Outcome::FatalRestart(cause)
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("locator", &self.locator)
            .field("settle", &self.settle)
            .field("options", &self.options)
            .field("restart_delay", &self.restart_delay)
            .field("active", &self.active)
            .field("report", &self.report)
            .finish()
    }
}
