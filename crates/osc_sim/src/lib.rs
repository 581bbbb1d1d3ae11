//! An in-process RMA substrate for two ranks.
//!
//! [`SimWorld`] runs the same behavior on rank `:0` and rank `:1`, each on its own fiber. Every
//! window primitive suspends the calling fiber with a [`Command`]; a scheduler on the calling
//! thread resolves the command when the epoch and lock rules allow it and resumes the fiber with
//! an [`Event`]. Runs are deterministic, so a failing validation can be replayed exactly from its
//! [`TraceRecord`]s.
//!
//! The scheduler rejects what a real window would make erroneous: operations outside an access
//! epoch, conflicting locks held at once, and local window accesses that race with a remote
//! update. Ranks that can never be resumed are reported as [`SimError::Deadlock`].
//!
//! [`Fault`]s corrupt selected operations so that validation failures can be provoked on demand.

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod clock;
mod command;
mod trace_record;
mod window;
mod world;

pub use clock::CausalClock;
pub use command::{Command, Event};
pub use trace_record::TraceRecord;
pub use window::SimWindow;
pub use world::{Fault, SimError, SimOutcome, SimWorld};
