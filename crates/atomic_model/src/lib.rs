//! A software model of remote read-modify-write semantics.
//!
//! Given the deterministic values two ranks start with, [`apply`] and [`apply_cas`] predict what
//! a correct one-sided fetch-and-op or compare-and-swap must leave in the target location and
//! what the initiator must fetch. The prediction is independent of any RMA substrate, so it can
//! be compared against what the substrate actually produced.
//!
//! Every `(Datatype, Operator)` pair either has semantics or yields
//! [`ModelError::Unsupported`]; nothing silently computes a default.
//!
//! # Features
//!
//! - `serde`: Implement `Serialize` and `Deserialize` where applicable.

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod atom;
mod cell;
mod complex;
mod error;
mod model;
mod value;

pub use atom::Atom;
pub use cell::{AtomicCell, AtomicOp, ReferenceObject};
pub use complex::Complex;
pub use error::ModelError;
pub use model::{apply, apply_cas, seed_value, Prediction};
pub use value::Value;
