//! Data validation for one-sided atomic operations between two ranks.
//!
//! A [`Validator`] seeds buffers with deterministic per-rank values, predicts with
//! [`atomic_model`] what a correct exchange must leave behind in both directions, stages the
//! real outcome back through a [`BufferBridge`], and accumulates the verdicts in a [`Ledger`]
//! that drains into a [`Summary`].
//!
//! # Features
//!
//! - `serde`: Implement `Serialize` and `Deserialize` where applicable.

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod bridge;
mod exchange;
mod ledger;
mod report;
mod validator;

pub use bridge::{bridge_for, Accelerator, BridgeError, BufferBridge, HostBridge, UnavailableBridge};
pub use exchange::{Buffer, Direction, Disturbance, Exchange};
pub use ledger::{Ledger, LedgerEntry};
pub use report::{Status, Summary, SummaryLine};
pub use validator::{ValidationError, Validator, Verdict};
