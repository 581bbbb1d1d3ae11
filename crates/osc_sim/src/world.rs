use {
    crate::{CausalClock, Command, Event, SimWindow, TraceRecord},
    atomic_model::{AtomicCell, AtomicOp, ReferenceObject, Value},
    corosensei::{stack::DefaultStack, CoroutineResult, ScopedCoroutine},
    osc_core::{Call, LockKind, Rank, RmaError},
    std::{
        cell::RefCell,
        collections::{BTreeMap, BTreeSet},
        rc::Rc,
    },
    thiserror::Error,
    tracing::{debug, info},
};

const RANKS: usize = 2;

/// Deliberate misbehavior, used to prove that validation notices a broken substrate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Fault {
    /// The `nth` (1-based) atomic operation issued by `rank` returns a corrupted fetched value.
    CorruptFetch { rank: Rank, nth: usize },
    /// The `nth` (1-based) atomic operation issued by `rank` stores a corrupted value.
    CorruptTarget { rank: Rank, nth: usize },
}

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum SimError {
    #[error("deadlock: {} blocked with no rank able to make progress", describe(.blocked))]
    Deadlock {
        blocked: Vec<(Rank, Command)>,
        trace: Vec<TraceRecord>,
    },
}

fn describe(blocked: &[(Rank, Command)]) -> String {
    blocked
        .iter()
        .map(|(rank, command)| format!("{rank} in {}", command.call()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug)]
pub struct SimOutcome<R> {
    /// Per-rank return values, indexed by rank.
    pub outputs: Vec<R>,
    pub trace: Vec<TraceRecord>,
}

/// A deterministic two-rank RMA substrate. Both ranks run the same behavior as fibers on the
/// calling thread; the scheduler resolves their primitives in rank order and enforces epoch
/// rules, lock compatibility, collective matching and race freedom of window accesses.
///
/// ```
/// use osc_core::RmaWindow;
/// use osc_sim::SimWorld;
///
/// let outcome = SimWorld::new(8)
///     .run(|win| {
///         win.barrier()?;
///         Ok::<_, osc_core::RmaError>(win.rank())
///     })
///     .unwrap();
/// assert_eq!(outcome.outputs.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct SimWorld {
    window_bytes: usize,
    faults: Vec<Fault>,
}

impl SimWorld {
    pub fn new(window_bytes: usize) -> Self {
        SimWorld {
            window_bytes,
            faults: Vec::new(),
        }
    }

    pub fn fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn run<R>(
        &self,
        behavior: impl Fn(&mut SimWindow<'_>) -> R,
    ) -> Result<SimOutcome<R>, SimError> {
        let memory = Rc::new(RefCell::new(vec![vec![0u8; self.window_bytes]; RANKS]));
        let mut scheduler = Scheduler::new(Rc::clone(&memory), self.faults.clone());
        let behavior = &behavior;
        let mut fibers: Vec<ScopedCoroutine<'_, Event, Command, R, DefaultStack>> = (0..RANKS)
            .map(|i| {
                let rank = Rank::from(i);
                let memory = Rc::clone(&memory);
                ScopedCoroutine::new(move |yielder, _spawned: Event| {
                    let mut window = SimWindow {
                        yielder,
                        rank,
                        memory,
                    };
                    behavior(&mut window)
                })
            })
            .collect();

        info!(ranks = RANKS, window_bytes = self.window_bytes, "simulation started");
        let mut pending: Vec<Option<Event>> =
            (0..RANKS).map(|i| Some(Event::Spawned(i.into()))).collect();
        let mut outputs: Vec<Option<R>> = (0..RANKS).map(|_| None).collect();
        loop {
            let mut progressed = false;
            for (i, fiber) in fibers.iter_mut().enumerate() {
                let rank = Rank::from(i);
                while let Some(event) = pending[rank].take() {
                    progressed = true;
                    match fiber.resume(event) {
                        CoroutineResult::Yield(command) => {
                            debug!("{command:?} → {rank}");
                            pending[rank] = scheduler.dispatch(rank, command);
                        }
                        CoroutineResult::Return(output) => outputs[rank] = Some(output),
                    }
                }
            }
            progressed |= scheduler.release(&mut pending);

            if outputs.iter().all(Option::is_some) {
                info!(steps = scheduler.trace.len(), "simulation finished");
                return Ok(SimOutcome {
                    outputs: outputs.into_iter().flatten().collect(),
                    trace: scheduler.trace,
                });
            }
            if !progressed {
                let blocked: Vec<_> = scheduler
                    .blocked
                    .iter()
                    .enumerate()
                    .filter_map(|(i, command)| command.clone().map(|c| (Rank::from(i), c)))
                    .collect();
                return Err(SimError::Deadlock {
                    blocked,
                    trace: scheduler.trace,
                });
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
struct LockTable {
    exclusive: Option<Rank>,
    shared: BTreeSet<Rank>,
    released: CausalClock,
}

#[derive(Clone, Debug)]
struct Exposure {
    group: Vec<Rank>,
    posted: CausalClock,
    completed: BTreeMap<Rank, CausalClock>,
}

#[derive(Clone, Debug, Default)]
struct WindowHistory {
    last_remote_write: Option<(Rank, CausalClock)>,
    last_local_access: Option<CausalClock>,
}

struct Scheduler {
    memory: Rc<RefCell<Vec<Vec<u8>>>>,
    faults: Vec<Fault>,
    clocks: Vec<CausalClock>,
    blocked: Vec<Option<Command>>,
    locks: Vec<LockTable>,
    held: Vec<BTreeMap<Rank, LockKind>>,
    lock_all: Vec<bool>,
    fence_epoch: Vec<bool>,
    exposure: Vec<Option<Exposure>>,
    access: Vec<Option<Vec<Rank>>>,
    issued: Vec<usize>,
    history: Vec<WindowHistory>,
    trace: Vec<TraceRecord>,
}

impl Scheduler {
    fn new(memory: Rc<RefCell<Vec<Vec<u8>>>>, faults: Vec<Fault>) -> Self {
        Scheduler {
            memory,
            faults,
            clocks: vec![CausalClock::new(RANKS); RANKS],
            blocked: vec![None; RANKS],
            locks: vec![LockTable::default(); RANKS],
            held: vec![BTreeMap::new(); RANKS],
            lock_all: vec![false; RANKS],
            fence_epoch: vec![false; RANKS],
            exposure: vec![None; RANKS],
            access: vec![None; RANKS],
            issued: vec![0; RANKS],
            history: vec![WindowHistory::default(); RANKS],
            trace: Vec::new(),
        }
    }

    /// Resolves `command` now, or parks it and returns `None`.
    fn dispatch(&mut self, rank: Rank, command: Command) -> Option<Event> {
        self.clocks[rank].tick(rank);
        if command.is_collective() {
            self.blocked[rank] = Some(command);
            return None;
        }
        match self.try_grant(rank, &command) {
            Some(result) => {
                let event = result.unwrap_or_else(Event::Failed);
                self.record(rank, command, event.clone());
                Some(event)
            }
            None => {
                self.blocked[rank] = Some(command);
                None
            }
        }
    }

    /// Resumes every parked rank whose command can now be resolved.
    fn release(&mut self, pending: &mut [Option<Event>]) -> bool {
        let collective = |kind: &Command| self.blocked.iter().all(|c| c.as_ref() == Some(kind));
        let matched = [Command::Barrier, Command::Fence]
            .into_iter()
            .find(|kind| collective(kind));
        if let Some(kind) = matched {
            let mut merged = CausalClock::new(RANKS);
            for clock in &self.clocks {
                merged.merge_in(clock);
            }
            for i in 0..RANKS {
                let rank = Rank::from(i);
                self.clocks[rank].merge_in(&merged);
                if kind == Command::Fence {
                    self.fence_epoch[rank] = true;
                }
                if let Some(command) = self.blocked[rank].take() {
                    self.record(rank, command, Event::Done);
                }
                pending[rank] = Some(Event::Done);
            }
            return true;
        }

        let mut progressed = false;
        for i in 0..RANKS {
            let rank = Rank::from(i);
            let command = match &self.blocked[rank] {
                Some(command) if !command.is_collective() => command.clone(),
                _ => continue,
            };
            if let Some(result) = self.try_grant(rank, &command) {
                let event = result.unwrap_or_else(Event::Failed);
                self.blocked[rank] = None;
                self.record(rank, command, event.clone());
                pending[rank] = Some(event);
                progressed = true;
            }
        }
        progressed
    }

    fn record(&mut self, rank: Rank, command: Command, event: Event) {
        self.trace.push(TraceRecord {
            rank,
            command,
            event,
            clock: self.clocks[rank].clone(),
        });
    }

    /// `None` while the command must keep waiting.
    fn try_grant(&mut self, rank: Rank, command: &Command) -> Option<Result<Event, RmaError>> {
        let call = command.call();
        match command {
            Command::FetchAndOp {
                target,
                disp,
                operator,
                operand,
            } => Some(self.atomic(
                rank,
                call,
                *target,
                *disp,
                AtomicOp::FetchAndOp {
                    operator: *operator,
                    operand: *operand,
                },
            )),
            Command::CompareAndSwap {
                target,
                disp,
                operand,
                compare,
            } => Some(self.atomic(
                rank,
                call,
                *target,
                *disp,
                AtomicOp::CompareAndSwap {
                    operand: *operand,
                    compare: *compare,
                },
            )),
            Command::Lock(kind, target) => self.lock(rank, *kind, *target).transpose(),
            Command::Unlock(target) => Some(self.unlock(rank, *target)),
            Command::LockAll => self.lock_all(rank).transpose(),
            Command::UnlockAll => Some(self.unlock_all(rank)),
            Command::Flush(target) | Command::FlushLocal(target) => {
                Some(self.flush(rank, call, *target))
            }
            Command::Post(group) => Some(self.post(rank, group)),
            Command::Start(group) => self.start(rank, group).transpose(),
            Command::Complete => Some(self.complete(rank)),
            Command::Wait => self.wait(rank).transpose(),
            Command::Access => Some(self.window_access(rank)),
            Command::Barrier | Command::Fence => None,
        }
    }

    fn atomic(
        &mut self,
        rank: Rank,
        call: Call,
        target: Rank,
        disp: usize,
        op: AtomicOp,
    ) -> Result<Event, RmaError> {
        valid_target(call, target)?;
        let in_epoch = self.fence_epoch[rank]
            || self.lock_all[rank]
            || self.held[rank].contains_key(&target)
            || self.access[rank]
                .as_ref()
                .map_or(false, |group| group.contains(&target));
        if !in_epoch {
            return Err(RmaError::NoEpoch { call, target });
        }
        if let Some(accessed) = &self.history[target].last_local_access {
            if target != rank && !accessed.precedes(&self.clocks[rank]) {
                return Err(RmaError::Failed {
                    call,
                    reason: format!("races with an unsynchronized window access by {target}"),
                });
            }
        }

        let operand = match op {
            AtomicOp::FetchAndOp { operand, .. } | AtomicOp::CompareAndSwap { operand, .. } => {
                operand
            }
        };
        let datatype = operand.datatype();
        let memory = Rc::clone(&self.memory);
        let mut memory = memory.try_borrow_mut().map_err(|_| RmaError::Failed {
            call,
            reason: "window memory is borrowed by a rank".to_string(),
        })?;
        let window = &mut memory[target];
        if disp + datatype.size() > window.len() {
            return Err(RmaError::OutOfBounds {
                call,
                disp,
                len: datatype.size(),
                size: window.len(),
            });
        }
        let model_failure = |err: atomic_model::ModelError| RmaError::Failed {
            call,
            reason: err.to_string(),
        };
        let mut cell = AtomicCell::new(Value::read(datatype, &window[disp..]).map_err(model_failure)?);
        let mut fetched = cell.invoke(&op).map_err(model_failure)?;
        let mut stored = cell.value();

        self.issued[rank] += 1;
        let nth = self.issued[rank];
        for fault in &self.faults {
            match *fault {
                Fault::CorruptFetch { rank: r, nth: n } if r == rank && n == nth => {
                    debug!(%rank, nth, "corrupting fetched value");
                    fetched = corrupt(fetched);
                }
                Fault::CorruptTarget { rank: r, nth: n } if r == rank && n == nth => {
                    debug!(%rank, nth, "corrupting stored value");
                    stored = corrupt(stored);
                }
                _ => {}
            }
        }
        stored.write(&mut window[disp..]).map_err(model_failure)?;
        self.history[target].last_remote_write = Some((rank, self.clocks[rank].clone()));
        Ok(Event::Fetched(fetched))
    }

    fn lock(&mut self, rank: Rank, kind: LockKind, target: Rank) -> Result<Option<Event>, RmaError> {
        valid_target(Call::Lock, target)?;
        if self.lock_all[rank] || self.held[rank].contains_key(&target) {
            return Err(RmaError::InvalidState {
                call: Call::Lock,
                reason: format!("{rank} already holds a lock on {target}"),
            });
        }
        let table = &mut self.locks[target];
        let available = match kind {
            LockKind::Exclusive => table.exclusive.is_none() && table.shared.is_empty(),
            LockKind::Shared => table.exclusive.is_none(),
        };
        if !available {
            return Ok(None);
        }
        match kind {
            LockKind::Exclusive => table.exclusive = Some(rank),
            LockKind::Shared => {
                table.shared.insert(rank);
            }
        }
        self.clocks[rank].merge_in(&table.released);
        self.held[rank].insert(target, kind);
        Ok(Some(Event::Done))
    }

    fn unlock(&mut self, rank: Rank, target: Rank) -> Result<Event, RmaError> {
        valid_target(Call::Unlock, target)?;
        let kind = self.held[rank]
            .remove(&target)
            .ok_or_else(|| RmaError::InvalidState {
                call: Call::Unlock,
                reason: format!("{rank} holds no lock on {target}"),
            })?;
        let table = &mut self.locks[target];
        match kind {
            LockKind::Exclusive => table.exclusive = None,
            LockKind::Shared => {
                table.shared.remove(&rank);
            }
        }
        table.released.merge_in(&self.clocks[rank]);
        Ok(Event::Done)
    }

    fn lock_all(&mut self, rank: Rank) -> Result<Option<Event>, RmaError> {
        if self.lock_all[rank] || !self.held[rank].is_empty() {
            return Err(RmaError::InvalidState {
                call: Call::LockAll,
                reason: format!("{rank} already holds locks"),
            });
        }
        if self.locks.iter().any(|table| table.exclusive.is_some()) {
            return Ok(None);
        }
        for table in &mut self.locks {
            table.shared.insert(rank);
            self.clocks[rank].merge_in(&table.released);
        }
        self.lock_all[rank] = true;
        Ok(Some(Event::Done))
    }

    fn unlock_all(&mut self, rank: Rank) -> Result<Event, RmaError> {
        if !self.lock_all[rank] {
            return Err(RmaError::InvalidState {
                call: Call::UnlockAll,
                reason: format!("{rank} did not call lock_all"),
            });
        }
        for table in &mut self.locks {
            table.shared.remove(&rank);
            table.released.merge_in(&self.clocks[rank]);
        }
        self.lock_all[rank] = false;
        Ok(Event::Done)
    }

    fn flush(&mut self, rank: Rank, call: Call, target: Rank) -> Result<Event, RmaError> {
        valid_target(call, target)?;
        if self.lock_all[rank] || self.held[rank].contains_key(&target) {
            Ok(Event::Done)
        } else {
            Err(RmaError::NoEpoch { call, target })
        }
    }

    fn post(&mut self, rank: Rank, group: &[Rank]) -> Result<Event, RmaError> {
        for &member in group {
            valid_target(Call::Post, member)?;
        }
        if self.exposure[rank].is_some() {
            return Err(RmaError::InvalidState {
                call: Call::Post,
                reason: format!("{rank} already exposes its window"),
            });
        }
        self.exposure[rank] = Some(Exposure {
            group: group.to_vec(),
            posted: self.clocks[rank].clone(),
            completed: BTreeMap::new(),
        });
        Ok(Event::Done)
    }

    fn start(&mut self, rank: Rank, group: &[Rank]) -> Result<Option<Event>, RmaError> {
        for &member in group {
            valid_target(Call::Start, member)?;
        }
        if self.access[rank].is_some() {
            return Err(RmaError::InvalidState {
                call: Call::Start,
                reason: format!("{rank} already has an access epoch"),
            });
        }
        let mut posted = Vec::new();
        for &member in group {
            match &self.exposure[member] {
                Some(e) if e.group.contains(&rank) && !e.completed.contains_key(&rank) => {
                    posted.push(e.posted.clone())
                }
                _ => return Ok(None),
            }
        }
        for clock in &posted {
            self.clocks[rank].merge_in(clock);
        }
        self.access[rank] = Some(group.to_vec());
        Ok(Some(Event::Done))
    }

    fn complete(&mut self, rank: Rank) -> Result<Event, RmaError> {
        let group = self.access[rank].take().ok_or_else(|| RmaError::InvalidState {
            call: Call::Complete,
            reason: format!("{rank} has no access epoch"),
        })?;
        for member in group {
            if let Some(exposure) = &mut self.exposure[member] {
                exposure.completed.insert(rank, self.clocks[rank].clone());
            }
        }
        Ok(Event::Done)
    }

    fn wait(&mut self, rank: Rank) -> Result<Option<Event>, RmaError> {
        let exposure = self.exposure[rank]
            .as_ref()
            .ok_or_else(|| RmaError::InvalidState {
                call: Call::Wait,
                reason: format!("{rank} has no exposure epoch"),
            })?;
        if !exposure
            .group
            .iter()
            .all(|member| exposure.completed.contains_key(member))
        {
            return Ok(None);
        }
        if let Some(exposure) = self.exposure[rank].take() {
            for clock in exposure.completed.values() {
                self.clocks[rank].merge_in(clock);
            }
        }
        Ok(Some(Event::Done))
    }

    fn window_access(&mut self, rank: Rank) -> Result<Event, RmaError> {
        if let Some((origin, written)) = &self.history[rank].last_remote_write {
            if *origin != rank && !written.precedes(&self.clocks[rank]) {
                return Err(RmaError::Failed {
                    call: Call::WindowAccess,
                    reason: format!("races with an unsynchronized operation by {origin}"),
                });
            }
        }
        self.history[rank].last_local_access = Some(self.clocks[rank].clone());
        Ok(Event::Done)
    }
}

fn valid_target(call: Call, target: Rank) -> Result<(), RmaError> {
    if target.index() < RANKS {
        Ok(())
    } else {
        Err(RmaError::Failed {
            call,
            reason: format!("no rank {target} in a {RANKS}-rank window"),
        })
    }
}

/// Flips the lowest bit of the first byte.
fn corrupt(value: Value) -> Value {
    let mut bytes = [0u8; 16];
    let size = value.datatype().size();
    match value.write(&mut bytes) {
        Ok(()) => {
            bytes[0] ^= 1;
            Value::read(value.datatype(), &bytes[..size]).unwrap_or(value)
        }
        Err(_) => value,
    }
}
