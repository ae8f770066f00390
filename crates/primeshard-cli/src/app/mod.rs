//! Process-level plumbing around the [`primeshard`] library: configuration,
//! logging and the quit signal.

pub mod config;
pub mod signal;
pub mod telemetry;
