use crate::{Datatype, Operator, Rank};
use core::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum LockKind {
    Exclusive,
    Shared,
}

/// Names an RMA primitive, for errors and traces.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[non_exhaustive]
pub enum Call {
    FetchAndOp,
    CompareAndSwap,
    Lock,
    Unlock,
    LockAll,
    UnlockAll,
    Fence,
    Flush,
    FlushLocal,
    Post,
    Start,
    Complete,
    Wait,
    Barrier,
    WindowAccess,
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Call::FetchAndOp => "fetch_and_op",
            Call::CompareAndSwap => "compare_and_swap",
            Call::Lock => "lock",
            Call::Unlock => "unlock",
            Call::LockAll => "lock_all",
            Call::UnlockAll => "unlock_all",
            Call::Fence => "fence",
            Call::Flush => "flush",
            Call::FlushLocal => "flush_local",
            Call::Post => "post",
            Call::Start => "start",
            Call::Complete => "complete",
            Call::Wait => "wait",
            Call::Barrier => "barrier",
            Call::WindowAccess => "window access",
        })
    }
}

/// Failure of a substrate primitive. Epoch state cannot be recovered after one of these.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum RmaError {
    #[error("{call} targeting {target} outside of any access epoch")]
    NoEpoch { call: Call, target: Rank },
    #[error("{call} is invalid here: {reason}")]
    InvalidState { call: Call, reason: String },
    #[error("{call} at displacement {disp} of {len} bytes exceeds the {size}-byte window")]
    OutOfBounds {
        call: Call,
        disp: usize,
        len: usize,
        size: usize,
    },
    #[error("{call} failed: {reason}")]
    Failed { call: Call, reason: String },
}

/// One rank's handle on a two-party RMA window.
///
/// Buffers are raw native-endian atoms of `datatype`. Displacements are in bytes. Every
/// primitive either succeeds or reports an [`RmaError`]; nothing is retried.
pub trait RmaWindow {
    fn rank(&self) -> Rank;

    /// Atomically combines `origin` into `target`'s window at `disp` and writes the previous
    /// target value into `result`.
    fn fetch_and_op(
        &mut self,
        origin: &[u8],
        result: &mut [u8],
        datatype: Datatype,
        target: Rank,
        disp: usize,
        operator: Operator,
    ) -> Result<(), RmaError>;

    /// Atomically replaces `target`'s value with `origin` if it equals `compare`, writing the
    /// previous value into `result` either way.
    fn compare_and_swap(
        &mut self,
        origin: &[u8],
        compare: &[u8],
        result: &mut [u8],
        datatype: Datatype,
        target: Rank,
        disp: usize,
    ) -> Result<(), RmaError>;

    fn lock(&mut self, kind: LockKind, target: Rank) -> Result<(), RmaError>;
    fn unlock(&mut self, target: Rank) -> Result<(), RmaError>;
    fn lock_all(&mut self) -> Result<(), RmaError>;
    fn unlock_all(&mut self) -> Result<(), RmaError>;

    /// Collective: closes the current fence epoch and opens the next one.
    fn fence(&mut self) -> Result<(), RmaError>;
    fn flush(&mut self, target: Rank) -> Result<(), RmaError>;
    fn flush_local(&mut self, target: Rank) -> Result<(), RmaError>;

    /// Opens an exposure epoch for `group`.
    fn post(&mut self, group: &[Rank]) -> Result<(), RmaError>;
    /// Opens an access epoch on `group`, waiting for their matching posts.
    fn start(&mut self, group: &[Rank]) -> Result<(), RmaError>;
    fn complete(&mut self) -> Result<(), RmaError>;
    fn wait(&mut self) -> Result<(), RmaError>;

    fn barrier(&mut self) -> Result<(), RmaError>;

    /// Runs `f` over this rank's exposed window memory.
    fn with_window<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, RmaError>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn errors_name_the_primitive() {
        let err = RmaError::NoEpoch {
            call: Call::FetchAndOp,
            target: Rank::ONE,
        };
        assert_eq!(
            err.to_string(),
            "fetch_and_op targeting :1 outside of any access epoch"
        );
        let err = RmaError::OutOfBounds {
            call: Call::CompareAndSwap,
            disp: 60,
            len: 8,
            size: 64,
        };
        assert_eq!(
            err.to_string(),
            "compare_and_swap at displacement 60 of 8 bytes exceeds the 64-byte window"
        );
    }
}
