use {
    osc_core::{LockKind, Rank},
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display, Formatter},
};

/// The synchronization discipline bracketing each fetch-and-op.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Lock,
    LockAll,
    Fence,
    #[default]
    Flush,
    FlushLocal,
    Pscw,
}

impl Protocol {
    pub const ALL: [Protocol; 6] = [
        Protocol::Lock,
        Protocol::LockAll,
        Protocol::Fence,
        Protocol::Flush,
        Protocol::FlushLocal,
        Protocol::Pscw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Protocol::Lock => "MPI_Win_lock/unlock",
            Protocol::LockAll => "MPI_Win_lock_all/unlock_all",
            Protocol::Fence => "MPI_Win_fence",
            Protocol::Flush => "MPI_Win_flush",
            Protocol::FlushLocal => "MPI_Win_flush_local",
            Protocol::Pscw => "MPI_Win_post/start/complete/wait",
        }
    }

    /// Passive-target protocols need no participation from the target while the origin operates.
    pub fn is_passive(self) -> bool {
        !matches!(self, Protocol::Fence | Protocol::Pscw)
    }

    /// Synchronization round trips per measured trial.
    pub fn divisor(self) -> f64 {
        if self.is_passive() {
            1.0
        } else {
            2.0
        }
    }

    /// Both ranks operate on each other under PSCW, so every trial is seeded and checked.
    pub fn default_frequency(self) -> ValidationFrequency {
        match self {
            Protocol::Pscw => ValidationFrequency::EveryTrial,
            _ => ValidationFrequency::FirstTrial,
        }
    }

    pub fn schedule(self, role: Role) -> Schedule {
        use {Role::*, Step::*};
        const NONE: &[Step] = &[];
        match (self, role) {
            (Protocol::Lock, Origin) => Schedule::trial(&[Lock(LockKind::Exclusive), FetchAndOp, Unlock]),
            (Protocol::LockAll, Origin) => Schedule::trial(&[LockAll, FetchAndOp, UnlockAll]),
            (Protocol::Fence, Origin) => Schedule::trial(&[Fence, FetchAndOp, Fence, Fence]),
            (Protocol::Fence, Target) => Schedule::trial(&[Fence, Fence, FetchAndOp, Fence]),
            (Protocol::Flush, Origin) => Schedule {
                prologue: &[Lock(LockKind::Shared)],
                trial: &[FetchAndOp, Flush],
                epilogue: &[Unlock],
            },
            (Protocol::FlushLocal, Origin) => Schedule {
                prologue: &[Lock(LockKind::Shared)],
                trial: &[FetchAndOp, FlushLocal],
                epilogue: &[Unlock],
            },
            (Protocol::Pscw, Origin) => Schedule::trial(&[Start, FetchAndOp, Complete, Post, Wait]),
            (Protocol::Pscw, Target) => Schedule::trial(&[Post, Wait, Start, FetchAndOp, Complete]),
            (_, Target) => Schedule::trial(NONE),
        }
    }

    /// Which of this rank's buffers hold a predictable outcome once a trial's epoch closes.
    pub fn verification(self, role: Role) -> Verification {
        match (self, role) {
            (Protocol::Fence | Protocol::Pscw, _) => Verification {
                remote_effect: true,
                local_result: true,
            },
            (_, Role::Origin) => Verification {
                remote_effect: false,
                local_result: true,
            },
            // Flush-local only completes the origin's buffers; the target's window may lag.
            (Protocol::FlushLocal, Role::Target) => Verification {
                remote_effect: false,
                local_result: false,
            },
            (_, Role::Target) => Verification {
                remote_effect: true,
                local_result: false,
            },
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rank `:0` issues the measured operations, rank `:1` is its peer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Role {
    Origin,
    Target,
}

impl Role {
    pub fn of(rank: Rank) -> Role {
        if rank == Rank::ZERO {
            Role::Origin
        } else {
            Role::Target
        }
    }
}

/// One window primitive in a protocol table. Peer-directed steps address `rank.peer()`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    Lock(LockKind),
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
    FetchAndOp,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Schedule {
    pub prologue: &'static [Step],
    pub trial: &'static [Step],
    pub epilogue: &'static [Step],
}

impl Schedule {
    const fn trial(trial: &'static [Step]) -> Self {
        Schedule {
            prologue: &[],
            trial,
            epilogue: &[],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Verification {
    pub remote_effect: bool,
    pub local_result: bool,
}

impl Verification {
    pub fn any(self) -> bool {
        self.remote_effect || self.local_result
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFrequency {
    /// Seed once before the prologue and check the first trial only.
    FirstTrial,
    /// Seed before and check after every trial, warmup included.
    EveryTrial,
}
