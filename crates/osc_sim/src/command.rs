use {
    atomic_model::Value,
    osc_core::{Call, LockKind, Operator, Rank, RmaError},
};

/// What a simulated rank asks of the substrate when it suspends.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Command {
    FetchAndOp {
        target: Rank,
        disp: usize,
        operator: Operator,
        operand: Value,
    },
    CompareAndSwap {
        target: Rank,
        disp: usize,
        operand: Value,
        compare: Value,
    },
    Lock(LockKind, Rank),
    Unlock(Rank),
    LockAll,
    UnlockAll,
    Fence,
    Flush(Rank),
    FlushLocal(Rank),
    Post(Vec<Rank>),
    Start(Vec<Rank>),
    Complete,
    Wait,
    Barrier,
    /// Local load/store access to the rank's own window.
    Access,
}

impl Command {
    pub fn call(&self) -> Call {
        match self {
            Command::FetchAndOp { .. } => Call::FetchAndOp,
            Command::CompareAndSwap { .. } => Call::CompareAndSwap,
            Command::Lock(..) => Call::Lock,
            Command::Unlock(_) => Call::Unlock,
            Command::LockAll => Call::LockAll,
            Command::UnlockAll => Call::UnlockAll,
            Command::Fence => Call::Fence,
            Command::Flush(_) => Call::Flush,
            Command::FlushLocal(_) => Call::FlushLocal,
            Command::Post(_) => Call::Post,
            Command::Start(_) => Call::Start,
            Command::Complete => Call::Complete,
            Command::Wait => Call::Wait,
            Command::Barrier => Call::Barrier,
            Command::Access => Call::WindowAccess,
        }
    }

    pub(crate) fn is_collective(&self) -> bool {
        matches!(self, Command::Barrier | Command::Fence)
    }
}

/// What the substrate hands back when it resumes a rank.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    Spawned(Rank),
    Done,
    Fetched(Value),
    Failed(RmaError),
}
