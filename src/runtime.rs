//! Runtime glue: configuration loading, duration strings, telemetry, and the
//! signal-driven runner.

pub mod config;
pub mod duration;
pub mod runner;
pub mod telemetry;
