//! Collection strategy assignment for past-due debt portfolios.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
