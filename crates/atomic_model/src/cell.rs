use crate::{apply, apply_cas, ModelError, Value};
use osc_core::Operator;

/// Sequential semantics of a shared location: what each operation returns and how it changes
/// the state. Observed results from a real window can be replayed against it.
pub trait ReferenceObject: Sized {
    type Op;
    type Ret: PartialEq;

    fn invoke(&mut self, op: &Self::Op) -> Self::Ret;

    /// Applies `op` and reports whether `observed` is what it returns.
    fn admits(&mut self, op: &Self::Op, observed: &Self::Ret) -> bool {
        &self.invoke(op) == observed
    }

    /// Replays a totally ordered history, stopping at the first inadmissible step.
    fn admits_history(&mut self, history: impl IntoIterator<Item = (Self::Op, Self::Ret)>) -> bool {
        history
            .into_iter()
            .all(|(op, observed)| self.admits(&op, &observed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AtomicOp {
    FetchAndOp { operator: Operator, operand: Value },
    CompareAndSwap { operand: Value, compare: Value },
}

/// A single window atom. Each operation returns the value it fetched.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AtomicCell(Value);

impl AtomicCell {
    pub fn new(value: Value) -> Self {
        AtomicCell(value)
    }

    pub fn value(&self) -> Value {
        self.0
    }
}

impl ReferenceObject for AtomicCell {
    type Op = AtomicOp;
    type Ret = Result<Value, ModelError>;

    fn invoke(&mut self, op: &Self::Op) -> Self::Ret {
        let datatype = self.0.datatype();
        let prediction = match *op {
            AtomicOp::FetchAndOp { operator, operand } => apply(datatype, operator, self.0, operand)?,
            AtomicOp::CompareAndSwap { operand, compare } => {
                apply_cas(datatype, self.0, operand, compare)?
            }
        };
        self.0 = prediction.result;
        Ok(prediction.fetched)
    }

    fn admits(&mut self, op: &Self::Op, observed: &Self::Ret) -> bool {
        // Exact comparison, so a NaN fetch is admitted when NaN is predicted.
        match (self.invoke(op), observed) {
            (Ok(fetched), Ok(observed)) => fetched.exact_eq(observed),
            (Err(expected), Err(observed)) => &expected == observed,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fetch_and_op_returns_previous_value() {
        let mut cell = AtomicCell::new(Value::Long(20));
        let add = AtomicOp::FetchAndOp {
            operator: Operator::Sum,
            operand: Value::Long(10),
        };
        assert_eq!(cell.invoke(&add), Ok(Value::Long(20)));
        assert_eq!(cell.invoke(&add), Ok(Value::Long(30)));
        assert_eq!(cell.value(), Value::Long(40));
    }

    #[test]
    fn failed_operations_leave_the_cell_untouched() {
        let mut cell = AtomicCell::new(Value::Float(1.0));
        let op = AtomicOp::FetchAndOp {
            operator: Operator::Bor,
            operand: Value::Float(2.0),
        };
        assert!(cell.invoke(&op).is_err());
        assert_eq!(cell.value(), Value::Float(1.0));
    }

    #[test]
    fn validates_histories() {
        let history = vec![
            (
                AtomicOp::CompareAndSwap {
                    operand: Value::Int(99),
                    compare: Value::Int(20),
                },
                Ok(Value::Int(20)),
            ),
            (
                AtomicOp::CompareAndSwap {
                    operand: Value::Int(7),
                    compare: Value::Int(20),
                },
                Ok(Value::Int(99)),
            ),
            (
                AtomicOp::FetchAndOp {
                    operator: Operator::NoOp,
                    operand: Value::Int(0),
                },
                Ok(Value::Int(99)),
            ),
        ];
        assert!(AtomicCell::new(Value::Int(20)).admits_history(history.clone()));
        assert!(!AtomicCell::new(Value::Int(21)).admits_history(history));
    }

    #[test]
    fn nan_histories_validate_bitwise() {
        let mut cell = AtomicCell::new(Value::Double(f64::NAN));
        let read = AtomicOp::FetchAndOp {
            operator: Operator::NoOp,
            operand: Value::Double(0.0),
        };
        assert!(cell.admits(&read, &Ok(Value::Double(f64::NAN))));
    }
}
