//! Strata CLI Library
//!
//! This library exposes CLI functionality for programmatic use and testing.

pub mod commands;
pub mod logging;

pub use commands::{CheckArgs, CheckReport, check_document, describe_types, run_check, run_types};
pub use logging::init_tracing;
