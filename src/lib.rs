//! Solution Harness - invoke named operations with loosely-typed test arguments
//!
//! Test cases name an operation and supply raw arguments: typed values, JSON
//! text, or names of data files. The harness coerces each argument to the
//! operation's parameter shape, calls the operation on a fresh subject, and
//! returns an [`Outcome`] that compares against expected values either
//! strictly or without regard to sequence order.

pub mod canonical;
pub mod common;
pub mod harness;
pub mod materialize;
pub mod outcome;
pub mod registry;
pub mod shape;
pub mod testing;

// Re-export commonly used types
pub use common::{Error, Result};
pub use harness::{Harness, TestCase};
pub use outcome::{Comparison, Outcome};
pub use registry::{Registry, Subject, Target};
pub use shape::{Param, Shape};
