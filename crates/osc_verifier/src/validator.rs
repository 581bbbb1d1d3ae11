use {
    crate::{
        exchange::{Buffer, Direction, Disturbance},
        BridgeError, BufferBridge, Exchange, Ledger, Summary,
    },
    atomic_model::{apply, apply_cas, seed_value, ModelError, Prediction, Value},
    osc_core::{Datatype, Operator, Rank},
    thiserror::Error,
    tracing::{debug, error},
};

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Outcome of one [`Validator::check`].
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Match,
    Mismatch(Box<Exchange>),
    /// No reference semantics for the pair. The trial was recorded as skipped.
    Unsupported,
}

/// Predicts and checks the outcome of two-rank atomic exchanges, accumulating a [`Ledger`].
///
/// Each rank owns one validator. Both ranks start from [`seed_value`] for their rank, so either
/// side can reconstruct what the other started with.
pub struct Validator {
    bridge: Box<dyn BufferBridge>,
    ledger: Ledger,
}

impl Validator {
    pub fn new(bridge: Box<dyn BufferBridge>) -> Self {
        Validator {
            bridge,
            ledger: Ledger::new(),
        }
    }

    /// Fills every whole atom of `buffer` with the seed of `rank`.
    pub fn seed(&self, datatype: Datatype, rank: Rank, buffer: &mut [u8]) -> Result<(), ValidationError> {
        let size = datatype.size();
        let whole = buffer.len() / size * size;
        let mut host = vec![0u8; whole];
        let value = seed_value(datatype, rank);
        for atom in host.chunks_exact_mut(size) {
            value.write(atom)?;
        }
        self.bridge.stage_in(&mut buffer[..whole], &host)?;
        Ok(())
    }

    /// Checks `window` (this rank's exposed memory) and `result` (what this rank fetched from
    /// its peer) after one trial in which each rank may have applied `operator` to the other.
    ///
    /// Only the first atom is operated on. Every later atom of a verified buffer must still hold
    /// this rank's seed. A buffer whose side is not verified is never read. Every call records
    /// exactly one trial in the ledger.
    ///
    /// For [`Operator::CompareAndSwap`] the initiator's compare operand is the target's seed, so
    /// a correct swap always happens: the window ends up holding the peer's seed.
    #[allow(clippy::too_many_arguments)]
    pub fn check(
        &mut self,
        datatype: Datatype,
        operator: Operator,
        rank: Rank,
        window: &[u8],
        result: &[u8],
        verify_remote_effect: bool,
        verify_local_result: bool,
    ) -> Result<Verdict, ValidationError> {
        match self.try_check(
            datatype,
            operator,
            rank,
            window,
            result,
            verify_remote_effect,
            verify_local_result,
        ) {
            Ok(Some(exchange)) => {
                self.ledger.record(datatype, operator, true, exchange.failed());
                if !exchange.failed() {
                    return Ok(Verdict::Match);
                }
                let trial = self
                    .ledger
                    .get(datatype, operator)
                    .map_or(0, |entry| entry.trials);
                let exchange = Exchange { trial, ..exchange };
                error!(%datatype, %operator, %rank, trial, "data validation failed");
                error!("{exchange}");
                Ok(Verdict::Mismatch(Box::new(exchange)))
            }
            Ok(None) => {
                debug!(%datatype, %operator, "no reference semantics; trial skipped");
                self.ledger.record(datatype, operator, false, false);
                Ok(Verdict::Unsupported)
            }
            Err(err) => {
                self.ledger.record(datatype, operator, false, false);
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn try_check(
        &self,
        datatype: Datatype,
        operator: Operator,
        rank: Rank,
        window: &[u8],
        result: &[u8],
        verify_remote_effect: bool,
        verify_local_result: bool,
    ) -> Result<Option<Exchange>, ValidationError> {
        let mine = seed_value(datatype, rank);
        let theirs = seed_value(datatype, rank.peer());

        // The peer acting on this rank's window, then this rank acting on the peer's. A
        // compare-and-swap initiator compares against its target's seed.
        let predict = |target: Value, operand: Value| -> Result<Prediction, ModelError> {
            if operator == Operator::CompareAndSwap {
                apply_cas(datatype, target, operand, target)
            } else {
                apply(datatype, operator, target, operand)
            }
        };
        let (inbound, outbound) = match (predict(mine, theirs), predict(theirs, mine)) {
            (Ok(inbound), Ok(outbound)) => (inbound, outbound),
            (Err(ModelError::Unsupported { .. }), _) | (_, Err(ModelError::Unsupported { .. })) => {
                return Ok(None)
            }
            (Err(err), _) | (_, Err(err)) => return Err(err.into()),
        };

        let mut disturbed = None;
        let mut observed_window = None;
        if verify_remote_effect {
            let host = self.stage_out(window)?;
            observed_window = Some(Value::read(datatype, &host)?);
            disturbed = first_disturbed(datatype, Buffer::Window, &host, mine)?;
        }
        let mut observed_result = None;
        if verify_local_result {
            let host = self.stage_out(result)?;
            observed_result = Some(Value::read(datatype, &host)?);
            if disturbed.is_none() {
                disturbed = first_disturbed(datatype, Buffer::Result, &host, mine)?;
            }
        }

        Ok(Some(Exchange {
            datatype,
            operator,
            rank,
            trial: 0,
            inbound: Direction {
                target: mine,
                operand: theirs,
                compare: mine,
                expected: inbound.result,
                observed: observed_window,
            },
            outbound: Direction {
                target: theirs,
                operand: mine,
                compare: theirs,
                expected: outbound.fetched,
                observed: observed_result,
            },
            disturbed,
        }))
    }

    fn stage_out(&self, bytes: &[u8]) -> Result<Vec<u8>, BridgeError> {
        let mut host = vec![0u8; bytes.len()];
        self.bridge.stage_out(&mut host, bytes)?;
        Ok(host)
    }

    /// Drains the ledger into a report. A second call without new trials reports that no
    /// validations were performed.
    pub fn summary(&mut self) -> Summary {
        Summary::from_entries(self.ledger.drain())
    }

    /// Forgets every recorded trial.
    pub fn reset(&mut self) {
        self.ledger.clear();
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

fn first_disturbed(
    datatype: Datatype,
    buffer: Buffer,
    bytes: &[u8],
    expected: Value,
) -> Result<Option<Disturbance>, ModelError> {
    for (atom, chunk) in bytes.chunks_exact(datatype.size()).enumerate().skip(1) {
        let observed = Value::read(datatype, chunk)?;
        if !observed.exact_eq(&expected) {
            return Ok(Some(Disturbance {
                buffer,
                atom,
                observed,
                expected,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{bridge_for, Accelerator, HostBridge},
    };

    fn host() -> Validator {
        Validator::new(Box::new(HostBridge))
    }

    fn bytes(values: &[Value]) -> Vec<u8> {
        let mut out = Vec::new();
        for v in values {
            let mut atom = vec![0u8; v.datatype().size()];
            v.write(&mut atom).unwrap();
            out.extend(atom);
        }
        out
    }

    #[test]
    fn seed_fills_whole_atoms() {
        let mut buf = [0xffu8; 10];
        host().seed(Datatype::Int, Rank::ONE, &mut buf).unwrap();
        assert_eq!(&buf[..8], &bytes(&[Value::Int(20), Value::Int(20)])[..]);
        assert_eq!(&buf[8..], &[0xff, 0xff]);
    }

    #[test]
    fn seed_fails_without_a_bridge() {
        let validator = Validator::new(bridge_for(Accelerator::Cuda));
        assert_eq!(
            validator.seed(Datatype::Int, Rank::ZERO, &mut [0u8; 8]),
            Err(ValidationError::Bridge(BridgeError::Unimplemented(
                Accelerator::Cuda
            )))
        );
    }

    #[test]
    fn fetch_and_add_scenario() {
        // Rank 0 seeded 10 adds into rank 1 seeded 20 and vice versa.
        let dt = Datatype::LongLong;
        let mut v = host();
        let window = bytes(&[Value::LongLong(30), Value::LongLong(10)]);
        let result = bytes(&[Value::LongLong(20), Value::LongLong(10)]);
        assert_eq!(
            v.check(dt, Operator::Sum, Rank::ZERO, &window, &result, true, true),
            Ok(Verdict::Match)
        );
        let entry = v.ledger().get(dt, Operator::Sum).unwrap();
        assert_eq!((entry.trials, entry.validations_performed), (1, 1));
    }

    #[test]
    fn mismatch_is_reported_and_recorded() {
        let dt = Datatype::LongLong;
        let mut v = host();
        let window = bytes(&[Value::LongLong(31)]);
        let result = bytes(&[Value::LongLong(20)]);
        let verdict = v
            .check(dt, Operator::Sum, Rank::ZERO, &window, &result, true, true)
            .unwrap();
        let Verdict::Mismatch(exchange) = verdict else {
            panic!("expected a mismatch");
        };
        assert!(exchange.inbound.failed());
        assert!(!exchange.outbound.failed());
        assert_eq!(exchange.trial, 1);
        assert_eq!(exchange.inbound.expected, Value::LongLong(30));
        let entry = v.ledger().get(dt, Operator::Sum).unwrap();
        assert_eq!(entry.validation_failures, 1);
        assert_eq!(entry.first_failure, Some(1));
    }

    #[test]
    fn unverified_buffers_are_ignored() {
        let mut v = host();
        let garbage = bytes(&[Value::Int(-1)]);
        let fetched = bytes(&[Value::Int(10)]);
        assert_eq!(
            v.check(Datatype::Int, Operator::Max, Rank::ONE, &garbage, &fetched, false, true),
            Ok(Verdict::Match)
        );
    }

    #[test]
    fn disturbed_tail_atoms_fail() {
        let mut v = host();
        let window = bytes(&[Value::Int(30), Value::Int(10), Value::Int(11)]);
        let result = bytes(&[Value::Int(20)]);
        let Ok(Verdict::Mismatch(exchange)) =
            v.check(Datatype::Int, Operator::Sum, Rank::ZERO, &window, &result, true, true)
        else {
            panic!("expected a mismatch");
        };
        assert_eq!(
            exchange.disturbed,
            Some(Disturbance {
                buffer: Buffer::Window,
                atom: 2,
                observed: Value::Int(11),
                expected: Value::Int(10),
            })
        );
    }

    #[test]
    fn compare_and_swap_expects_a_swap() {
        // Rank 1 compared our window against our seed 10 and swapped in its own 20.
        let mut v = host();
        let window = bytes(&[Value::Int(20)]);
        let result = bytes(&[Value::Int(20)]);
        let cas = |v: &mut Validator, window: &[u8]| {
            v.check(
                Datatype::Int,
                Operator::CompareAndSwap,
                Rank::ZERO,
                window,
                &result,
                true,
                true,
            )
        };
        assert_eq!(cas(&mut v, &window), Ok(Verdict::Match));

        // A swap that never happened leaves our seed behind.
        let untouched = bytes(&[Value::Int(10)]);
        let Ok(Verdict::Mismatch(exchange)) = cas(&mut v, &untouched) else {
            panic!("expected a mismatch");
        };
        assert_eq!(exchange.inbound.compare, Value::Int(10));
        assert_eq!(exchange.inbound.expected, Value::Int(20));
        assert_eq!(exchange.inbound.observed, Some(Value::Int(10)));
        assert_eq!(exchange.outbound.compare, Value::Int(20));
        assert!(!exchange.outbound.failed());
    }

    #[test]
    fn unverified_buffers_are_never_read() {
        let mut v = host();
        let fetched = bytes(&[Value::Int(20)]);
        assert_eq!(
            v.check(Datatype::Int, Operator::Sum, Rank::ZERO, &[], &fetched, false, true),
            Ok(Verdict::Match)
        );
        let window = bytes(&[Value::Int(30)]);
        assert_eq!(
            v.check(Datatype::Int, Operator::Sum, Rank::ZERO, &window, &[], true, false),
            Ok(Verdict::Match)
        );
    }

    #[test]
    fn unsupported_pairs_are_skipped() {
        let mut v = host();
        let buf = vec![0u8; 16];
        assert_eq!(
            v.check(
                Datatype::DoubleComplex,
                Operator::Bxor,
                Rank::ZERO,
                &buf,
                &buf,
                true,
                true
            ),
            Ok(Verdict::Unsupported)
        );
        let entry = v.ledger().get(Datatype::DoubleComplex, Operator::Bxor).unwrap();
        assert_eq!((entry.trials, entry.validations_performed), (1, 0));
        assert!(!v.summary().passed());
    }

    #[test]
    fn short_buffers_record_a_skipped_trial() {
        let mut v = host();
        let err = v
            .check(Datatype::Double, Operator::Sum, Rank::ZERO, &[0; 4], &[0; 8], true, true)
            .unwrap_err();
        assert!(matches!(err, ValidationError::Model(ModelError::ShortBuffer { .. })));
        assert_eq!(v.ledger().get(Datatype::Double, Operator::Sum).unwrap().trials, 1);
    }

    #[test]
    fn summary_drains_the_ledger() {
        let mut v = host();
        let window = bytes(&[Value::Int(30)]);
        let result = bytes(&[Value::Int(20)]);
        v.check(Datatype::Int, Operator::Sum, Rank::ZERO, &window, &result, true, true)
            .unwrap();
        let first = v.summary();
        assert!(first.passed());
        assert_eq!(first.lines().len(), 2);
        let second = v.summary();
        assert_eq!(second.to_string(), "SKIPPED: No validations were performed!\n");
        assert!(v.ledger().is_empty());
    }

    #[test]
    fn reset_forgets_trials() {
        let mut v = host();
        v.check(Datatype::Int, Operator::Sum, Rank::ZERO, &[0; 4], &[0; 4], true, true)
            .unwrap();
        v.reset();
        assert!(v.ledger().is_empty());
    }
}
