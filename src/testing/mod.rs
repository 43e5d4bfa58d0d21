//! Case file runner
//!
//! Reads YAML case files (operation, raw arguments, expected result) and runs
//! each case through a [`Harness`](crate::Harness), printing a line per case.

mod config;
mod runner;

pub use config::*;
pub use runner::{load_cases, run_cases, run_suite, CaseResult, SuiteReport};
