//! End-to-end tests for sensor-relay.
//!
//! Each module covers one stage of the pipeline as seen from outside the
//! crate, from locating the board through supervised restarts.

pub mod discovery_tests;
pub mod pipeline_tests;
pub mod supervisor_tests;
