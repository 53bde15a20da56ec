//! Device discovery for the sensor link.
//!
//! A [`PathProvider`] generates candidate device paths; the [`PortLocator`]
//! walks them through a [`PortOpener`] until one opens. Keeping both seams as
//! traits lets the locator run against scripted openers in tests.

pub mod locator;
pub mod providers;

pub use locator::{PortLocator, PortOpener, SystemOpener};
pub use providers::{EnumeratedPaths, FixedPath, HotPlug};

use std::fmt;

/// One guessed device address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    /// Position in an enumerated space, when the provider has one.
    pub index: Option<usize>,
    /// System path handed to the opener.
    pub path: String,
}

impl CandidatePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            index: None,
            path: path.into(),
        }
    }

    pub fn indexed(index: usize, path: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            path: path.into(),
        }
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{} (candidate {})", self.path, i),
            None => f.write_str(&self.path),
        }
    }
}

/// Source of candidate device paths.
///
/// Providers hand out candidates in sweeps. `next_candidate` returns `None`
/// once at the end of each sweep so the locator can pause before starting
/// over; the following call begins the next sweep.
pub trait PathProvider: Send + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Next candidate, or `None` at the end of a sweep.
    fn next_candidate(&mut self) -> Option<CandidatePath>;

    /// Start the next `connect` from the beginning of the candidate space.
    fn reset(&mut self) {}
}

impl<T: PathProvider + ?Sized> PathProvider for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn next_candidate(&mut self) -> Option<CandidatePath> {
        (**self).next_candidate()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
