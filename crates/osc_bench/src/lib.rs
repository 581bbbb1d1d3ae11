//! Fetch-and-op latency measurement with atomic data validation.
//!
//! A [`Driver`] brackets one fetch-and-op (or compare-and-swap) per trial with the epoch calls
//! of a [`Protocol`]. Each protocol is a table of [`Step`]s per [`Role`], so the six disciplines
//! share one loop: seed, run the trial's steps, close the epoch, check. [`run_suite`] runs a
//! driver for every allowed (datatype, operator) pair of the [`BenchOptions`] and prints the
//! latency rows followed by each rank's validation summary.
//!
//! The window is anything implementing [`osc_core::RmaWindow`]. Mismatches are reported, not
//! raised; any failing window primitive aborts the suite with a [`BenchError`].

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod driver;
mod error;
mod options;
mod protocol;
mod suite;

pub use driver::Driver;
pub use error::BenchError;
pub use options::{BenchOptions, OptionsError};
pub use protocol::{Protocol, Role, Schedule, Step, ValidationFrequency, Verification};
pub use suite::{run_suite, LatencyRow, SuiteOutcome};
