use {
    crate::{BenchError, BenchOptions, OptionsError, Protocol, Role, Step, ValidationFrequency},
    osc_core::{Datatype, Operator, RmaWindow},
    osc_verifier::Validator,
    std::time::Instant,
    tracing::{debug, info},
};

/// Runs one (datatype, operator) pair under one protocol. Both ranks run the same driver; the
/// rank decides the role and therefore the schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Driver {
    protocol: Protocol,
    datatype: Datatype,
    operator: Operator,
    iterations: usize,
    warmup: usize,
    frequency: ValidationFrequency,
    buffer_bytes: usize,
}

impl Driver {
    /// A single measured trial without warmup, with buffers of one atom.
    pub fn new(protocol: Protocol, datatype: Datatype, operator: Operator) -> Self {
        Driver {
            protocol,
            datatype,
            operator,
            iterations: 1,
            warmup: 0,
            frequency: protocol.default_frequency(),
            buffer_bytes: datatype.size(),
        }
    }

    pub fn from_options(options: &BenchOptions, datatype: Datatype, operator: Operator) -> Self {
        Driver::new(options.protocol, datatype, operator)
            .iterations(options.iterations)
            .warmup(options.warmup)
            .frequency(options.frequency())
            .buffer_bytes(options.max_message_size)
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn frequency(mut self, frequency: ValidationFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Size of the operand, compare and result buffers. The window must be at least this large.
    pub fn buffer_bytes(mut self, buffer_bytes: usize) -> Self {
        self.buffer_bytes = buffer_bytes;
        self
    }

    /// Runs `warmup + iterations` trials, checking outcomes with `validator` when one is given.
    /// Returns the mean latency in microseconds on the origin and `None` on the target.
    ///
    /// Zero measured iterations is rejected before any primitive is issued.
    pub fn run<W: RmaWindow>(
        &self,
        win: &mut W,
        mut validator: Option<&mut Validator>,
    ) -> Result<Option<f64>, BenchError> {
        if self.iterations == 0 {
            return Err(OptionsError::ZeroIterations.into());
        }
        let rank = win.rank();
        let role = Role::of(rank);
        let schedule = self.protocol.schedule(role);
        let verification = self.protocol.verification(role);
        let mut buffers = Buffers::new(self.buffer_bytes);
        info!(
            protocol = %self.protocol,
            datatype = %self.datatype,
            operator = %self.operator,
            %rank,
            "protocol started"
        );

        if let Some(validator) = validator.as_deref_mut() {
            if self.frequency == ValidationFrequency::FirstTrial {
                self.seed(win, validator, &mut buffers)?;
            }
        }
        for &step in schedule.prologue {
            self.step(win, step, &mut buffers)?;
        }

        let mut started = Instant::now();
        for trial in 0..self.warmup + self.iterations {
            if trial == self.warmup {
                started = Instant::now();
            }
            let checked = match validator.as_deref_mut() {
                Some(validator) => {
                    if self.frequency == ValidationFrequency::EveryTrial {
                        self.seed(win, validator, &mut buffers)?;
                    }
                    self.frequency == ValidationFrequency::EveryTrial || trial == 0
                }
                None => false,
            };

            for &step in schedule.trial {
                self.step(win, step, &mut buffers)?;
            }

            if checked {
                // The origin's operation must complete before the target reads its window, and
                // the read must finish before the next operation lands.
                if self.protocol.is_passive() {
                    win.barrier()?;
                }
                if let (Some(validator), true) = (validator.as_deref_mut(), verification.any()) {
                    let (datatype, operator) = (self.datatype, self.operator);
                    win.with_window(|window| {
                        validator.check(
                            datatype,
                            operator,
                            rank,
                            window,
                            &buffers.result,
                            verification.remote_effect,
                            verification.local_result,
                        )
                    })??;
                }
                if self.protocol.is_passive() {
                    win.barrier()?;
                }
            }
        }
        let elapsed = started.elapsed();

        for &step in schedule.epilogue {
            self.step(win, step, &mut buffers)?;
        }
        win.barrier()?;
        info!(protocol = %self.protocol, %rank, "protocol finished");

        Ok((role == Role::Origin).then(|| {
            elapsed.as_secs_f64() * 1e6 / self.iterations as f64 / self.protocol.divisor()
        }))
    }

    fn seed<W: RmaWindow>(
        &self,
        win: &mut W,
        validator: &Validator,
        buffers: &mut Buffers,
    ) -> Result<(), BenchError> {
        let rank = win.rank();
        win.with_window(|window| validator.seed(self.datatype, rank, window))??;
        validator.seed(self.datatype, rank, &mut buffers.origin)?;
        // A compare-and-swap compares against what the target was seeded with.
        validator.seed(self.datatype, rank.peer(), &mut buffers.compare)?;
        validator.seed(self.datatype, rank, &mut buffers.result)?;
        win.barrier()?;
        Ok(())
    }

    fn step<W: RmaWindow>(&self, win: &mut W, step: Step, buffers: &mut Buffers) -> Result<(), BenchError> {
        let peer = win.rank().peer();
        debug!(?step, rank = %win.rank(), "epoch step");
        match step {
            Step::Lock(kind) => win.lock(kind, peer)?,
            Step::Unlock => win.unlock(peer)?,
            Step::LockAll => win.lock_all()?,
            Step::UnlockAll => win.unlock_all()?,
            Step::Fence => win.fence()?,
            Step::Flush => win.flush(peer)?,
            Step::FlushLocal => win.flush_local(peer)?,
            Step::Post => win.post(&[peer])?,
            Step::Start => win.start(&[peer])?,
            Step::Complete => win.complete()?,
            Step::Wait => win.wait()?,
            Step::FetchAndOp if self.operator == Operator::CompareAndSwap => win.compare_and_swap(
                &buffers.origin,
                &buffers.compare,
                &mut buffers.result,
                self.datatype,
                peer,
                0,
            )?,
            Step::FetchAndOp => win.fetch_and_op(
                &buffers.origin,
                &mut buffers.result,
                self.datatype,
                peer,
                0,
                self.operator,
            )?,
        }
        Ok(())
    }
}

struct Buffers {
    origin: Vec<u8>,
    compare: Vec<u8>,
    result: Vec<u8>,
}

impl Buffers {
    fn new(bytes: usize) -> Self {
        Buffers {
            origin: vec![0; bytes],
            compare: vec![0; bytes],
            result: vec![0; bytes],
        }
    }
}
