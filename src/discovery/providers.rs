//! Candidate path providers.

use super::{CandidatePath, PathProvider};
use tracing::debug;

/// Default namespace for CDC-ACM microcontroller boards on Linux.
pub const DEFAULT_PATH_PREFIX: &str = "/dev/ttyACM";

/// Size of the enumerated candidate space.
pub const DEFAULT_CANDIDATE_COUNT: usize = 10;

/// Always offers the same path.
#[derive(Debug, Clone)]
pub struct FixedPath {
    path: String,
    offered: bool,
}

impl FixedPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            offered: false,
        }
    }
}

impl PathProvider for FixedPath {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn next_candidate(&mut self) -> Option<CandidatePath> {
        // Every sweep is the single path.
        self.offered = !self.offered;
        self.offered.then(|| CandidatePath::new(self.path.clone()))
    }

    fn reset(&mut self) {
        self.offered = false;
    }
}

/// Offers `<prefix>0` .. `<prefix>{count-1}` and wraps around.
#[derive(Debug, Clone)]
pub struct EnumeratedPaths {
    prefix: String,
    count: usize,
    next: usize,
}

impl EnumeratedPaths {
    pub fn new(prefix: impl Into<String>, count: usize) -> Self {
        Self {
            prefix: prefix.into(),
            count: count.max(1),
            next: 0,
        }
    }

    pub fn path_for(&self, index: usize) -> String {
        format!("{}{}", self.prefix, index)
    }
}

impl Default for EnumeratedPaths {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_PREFIX, DEFAULT_CANDIDATE_COUNT)
    }
}

impl PathProvider for EnumeratedPaths {
    fn name(&self) -> &'static str {
        "enumerated"
    }

    fn next_candidate(&mut self) -> Option<CandidatePath> {
        if self.next == self.count {
            self.next = 0;
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(CandidatePath::indexed(index, self.path_for(index)))
    }

    fn reset(&mut self) {
        self.next = 0;
    }
}

/// Offers whatever serial ports the OS currently reports.
///
/// The port list is re-read at the start of every sweep, so a board plugged in
/// while the locator is waiting is picked up on the next pass.
#[derive(Debug, Clone, Default)]
pub struct HotPlug {
    filter: Option<String>,
    sweep: Vec<String>,
    position: usize,
    in_sweep: bool,
}

impl HotPlug {
    /// Only offer ports whose name contains `filter`, if given.
    pub fn new(filter: Option<String>) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    fn refresh(&mut self) {
        self.position = 0;
        self.sweep = match serialport::available_ports() {
            Ok(ports) => ports
                .into_iter()
                .map(|p| p.port_name)
                .filter(|name| self.filter.as_deref().map_or(true, |f| name.contains(f)))
                .collect(),
            Err(e) => {
                debug!("Port enumeration failed: {}", e);
                Vec::new()
            }
        };
    }
}

impl PathProvider for HotPlug {
    fn name(&self) -> &'static str {
        "hotplug"
    }

    fn next_candidate(&mut self) -> Option<CandidatePath> {
        if !self.in_sweep {
            self.refresh();
            self.in_sweep = true;
        }
        match self.sweep.get(self.position) {
            Some(path) => {
                let candidate = CandidatePath::indexed(self.position, path.clone());
                self.position += 1;
                Some(candidate)
            }
            None => {
                self.in_sweep = false;
                None
            }
        }
    }

    fn reset(&mut self) {
        self.in_sweep = false;
    }
}
