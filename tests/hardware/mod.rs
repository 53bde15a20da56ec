//! Tests against a real sensor board.

pub mod sensor_tests;
