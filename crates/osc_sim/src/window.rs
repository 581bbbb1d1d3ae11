use {
    crate::{Command, Event},
    atomic_model::Value,
    corosensei::Yielder,
    osc_core::{Call, Datatype, LockKind, Operator, Rank, RmaError, RmaWindow},
    std::{cell::RefCell, rc::Rc},
};

/// One rank's view of a [`SimWorld`](crate::SimWorld). Every primitive suspends the rank's fiber
/// until the scheduler resolves it.
pub struct SimWindow<'a> {
    pub(crate) yielder: &'a Yielder<Event, Command>,
    pub(crate) rank: Rank,
    pub(crate) memory: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl SimWindow<'_> {
    fn issue(&self, command: Command) -> Result<Event, RmaError> {
        match self.yielder.suspend(command) {
            Event::Failed(err) => Err(err),
            event => Ok(event),
        }
    }

    fn sync(&self, command: Command) -> Result<(), RmaError> {
        let call = command.call();
        match self.issue(command)? {
            Event::Done => Ok(()),
            other => Err(unexpected(call, &other)),
        }
    }

    fn fetch(&self, command: Command, result: &mut [u8]) -> Result<(), RmaError> {
        let call = command.call();
        match self.issue(command)? {
            Event::Fetched(value) => value.write(result).map_err(|err| RmaError::Failed {
                call,
                reason: err.to_string(),
            }),
            other => Err(unexpected(call, &other)),
        }
    }
}

fn unexpected(call: Call, event: &Event) -> RmaError {
    RmaError::Failed {
        call,
        reason: format!("unexpected {event:?}"),
    }
}

fn decode(call: Call, datatype: Datatype, bytes: &[u8]) -> Result<Value, RmaError> {
    Value::read(datatype, bytes).map_err(|err| RmaError::Failed {
        call,
        reason: err.to_string(),
    })
}

impl RmaWindow for SimWindow<'_> {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn fetch_and_op(
        &mut self,
        origin: &[u8],
        result: &mut [u8],
        datatype: Datatype,
        target: Rank,
        disp: usize,
        operator: Operator,
    ) -> Result<(), RmaError> {
        let operand = decode(Call::FetchAndOp, datatype, origin)?;
        self.fetch(
            Command::FetchAndOp {
                target,
                disp,
                operator,
                operand,
            },
            result,
        )
    }

    fn compare_and_swap(
        &mut self,
        origin: &[u8],
        compare: &[u8],
        result: &mut [u8],
        datatype: Datatype,
        target: Rank,
        disp: usize,
    ) -> Result<(), RmaError> {
        let operand = decode(Call::CompareAndSwap, datatype, origin)?;
        let compare = decode(Call::CompareAndSwap, datatype, compare)?;
        self.fetch(
            Command::CompareAndSwap {
                target,
                disp,
                operand,
                compare,
            },
            result,
        )
    }

    fn lock(&mut self, kind: LockKind, target: Rank) -> Result<(), RmaError> {
        self.sync(Command::Lock(kind, target))
    }

    fn unlock(&mut self, target: Rank) -> Result<(), RmaError> {
        self.sync(Command::Unlock(target))
    }

    fn lock_all(&mut self) -> Result<(), RmaError> {
        self.sync(Command::LockAll)
    }

    fn unlock_all(&mut self) -> Result<(), RmaError> {
        self.sync(Command::UnlockAll)
    }

    fn fence(&mut self) -> Result<(), RmaError> {
        self.sync(Command::Fence)
    }

    fn flush(&mut self, target: Rank) -> Result<(), RmaError> {
        self.sync(Command::Flush(target))
    }

    fn flush_local(&mut self, target: Rank) -> Result<(), RmaError> {
        self.sync(Command::FlushLocal(target))
    }

    fn post(&mut self, group: &[Rank]) -> Result<(), RmaError> {
        self.sync(Command::Post(group.to_vec()))
    }

    fn start(&mut self, group: &[Rank]) -> Result<(), RmaError> {
        self.sync(Command::Start(group.to_vec()))
    }

    fn complete(&mut self) -> Result<(), RmaError> {
        self.sync(Command::Complete)
    }

    fn wait(&mut self) -> Result<(), RmaError> {
        self.sync(Command::Wait)
    }

    fn barrier(&mut self) -> Result<(), RmaError> {
        self.sync(Command::Barrier)
    }

    fn with_window<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, RmaError> {
        self.sync(Command::Access)?;
        let mut memory = self
            .memory
            .try_borrow_mut()
            .map_err(|_| RmaError::Failed {
                call: Call::WindowAccess,
                reason: "window memory is already borrowed".to_string(),
            })?;
        Ok(f(&mut memory[self.rank]))
    }
}
