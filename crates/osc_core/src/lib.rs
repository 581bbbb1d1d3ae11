//! Core vocabulary for validating one-sided atomic operations: the datatype and operator
//! registry, the legality table, ranks, and the [`RmaWindow`] substrate interface.
//!
//! # Features
//!
//! - `serde`: Implement `Serialize` and `Deserialize` where applicable.

#![cfg_attr(all(doc, CHANNEL_NIGHTLY), feature(doc_auto_cfg))]
#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod datatype;
mod operator;
mod rank;
mod registry;
mod window;

pub use datatype::{DataClass, Datatype};
pub use operator::Operator;
pub use rank::Rank;
pub use registry::{
    datatype_id, datatype_name, is_cas_allowed, is_operator_allowed, operator_id, operator_name,
    DatatypeId, OperatorId,
};
pub use window::{Call, LockKind, RmaError, RmaWindow};
