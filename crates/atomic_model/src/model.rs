use crate::{
    atom::{Integer, Magnitude, Real},
    ModelError, Value,
};
use osc_core::{Datatype, Operator, Rank};

/// What an atomic operation is expected to produce.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Prediction {
    /// The target location after the operation.
    pub result: Value,
    /// The value the initiator fetches, i.e. the target location before the operation.
    pub fetched: Value,
}

/// Predicts the effect of atomically combining `remote` (the operand an initiator sends) into
/// `local` (the current content of the target location) with `operator`.
///
/// Returns [`ModelError::Unsupported`] when the pair has no reference semantics, including
/// [`Operator::CompareAndSwap`], which goes through [`apply_cas`] instead.
pub fn apply(
    datatype: Datatype,
    operator: Operator,
    local: Value,
    remote: Value,
) -> Result<Prediction, ModelError> {
    expect_datatype(datatype, &local)?;
    expect_datatype(datatype, &remote)?;
    let result =
        Value::combine(operator, local, remote).ok_or(ModelError::Unsupported { datatype, operator })?;
    Ok(Prediction {
        result,
        fetched: local,
    })
}

/// Predicts compare-and-swap: `local` becomes `operand` iff it is exactly equal to `compare`.
pub fn apply_cas(
    datatype: Datatype,
    local: Value,
    operand: Value,
    compare: Value,
) -> Result<Prediction, ModelError> {
    if !osc_core::is_cas_allowed(datatype) {
        return Err(ModelError::Unsupported {
            datatype,
            operator: Operator::CompareAndSwap,
        });
    }
    expect_datatype(datatype, &local)?;
    expect_datatype(datatype, &operand)?;
    expect_datatype(datatype, &compare)?;
    let result = if local.exact_eq(&compare) {
        operand
    } else {
        local
    };
    Ok(Prediction {
        result,
        fetched: local,
    })
}

/// The deterministic initial value a rank writes into its buffers.
///
/// Integers start at `10 * (1 + rank)`, reals at `1.11 * (1 + rank)`, and complex values at
/// `1.11 * (1 + rank) + (1 - 0.5 * rank)i`, so the two ranks are distinguishable and every
/// value is reproducible on either side.
pub fn seed_value(datatype: Datatype, rank: Rank) -> Value {
    Value::seed(datatype, rank.index())
}

fn expect_datatype(datatype: Datatype, value: &Value) -> Result<(), ModelError> {
    if value.datatype() == datatype {
        Ok(())
    } else {
        Err(ModelError::TypeMismatch {
            expected: datatype,
            found: value.datatype(),
        })
    }
}

pub(crate) fn combine_integer<T: Integer>(operator: Operator, a: T, b: T) -> Option<T> {
    let truth = |x: bool| if x { T::ONE } else { T::ZERO };
    Some(match operator {
        Operator::Max => {
            if b > a {
                b
            } else {
                a
            }
        }
        Operator::Min => {
            if a < b {
                a
            } else {
                b
            }
        }
        Operator::Sum => a.add_wrapping(b),
        Operator::Prod => a.mul_wrapping(b),
        Operator::Land => truth(a != T::ZERO && b != T::ZERO),
        Operator::Lor => truth(a != T::ZERO || b != T::ZERO),
        Operator::Lxor => truth((a != T::ZERO) != (b != T::ZERO)),
        Operator::Band => a & b,
        Operator::Bor => a | b,
        Operator::Bxor => a ^ b,
        Operator::Replace => b,
        Operator::NoOp => a,
        Operator::Minloc | Operator::Maxloc | Operator::CompareAndSwap => return None,
    })
}

pub(crate) fn combine_real<T: Real>(operator: Operator, a: T, b: T) -> Option<T> {
    let truth = |x: bool| if x { T::ONE } else { T::ZERO };
    Some(match operator {
        Operator::Max => {
            if b > a {
                b
            } else {
                a
            }
        }
        Operator::Min => {
            if a < b {
                a
            } else {
                b
            }
        }
        Operator::Sum => a + b,
        Operator::Prod => a * b,
        Operator::Land => truth(a != T::ZERO && b != T::ZERO),
        Operator::Lor => truth(a != T::ZERO || b != T::ZERO),
        Operator::Lxor => truth((a != T::ZERO) != (b != T::ZERO)),
        Operator::Replace => b,
        Operator::NoOp => a,
        Operator::Band
        | Operator::Bor
        | Operator::Bxor
        | Operator::Minloc
        | Operator::Maxloc
        | Operator::CompareAndSwap => return None,
    })
}

/// Complex min/max order by magnitude. Max keeps `a` on a tie, min keeps `b`.
pub(crate) fn combine_complex<T: Magnitude>(operator: Operator, a: T, b: T) -> Option<T> {
    Some(match operator {
        Operator::Max => {
            if b.magnitude() > a.magnitude() {
                b
            } else {
                a
            }
        }
        Operator::Min => {
            if a.magnitude() < b.magnitude() {
                a
            } else {
                b
            }
        }
        Operator::Sum => a + b,
        Operator::Prod => a * b,
        Operator::Replace => b,
        Operator::NoOp => a,
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Complex;

    fn int(op: Operator, local: i32, remote: i32) -> Result<Prediction, ModelError> {
        apply(Datatype::Int, op, Value::Int(local), Value::Int(remote))
    }

    #[test]
    fn integer_reductions() {
        assert_eq!(int(Operator::Sum, 3, 4).unwrap().result, Value::Int(7));
        assert_eq!(int(Operator::Min, 3, 4).unwrap().result, Value::Int(3));
        assert_eq!(int(Operator::Max, 3, 4).unwrap().result, Value::Int(4));
        assert_eq!(int(Operator::Prod, 10, 20).unwrap().result, Value::Int(200));
        assert_eq!(int(Operator::Sum, 3, 4).unwrap().fetched, Value::Int(3));
    }

    #[test]
    fn seeded_ranks() {
        let zero = seed_value(Datatype::Int, Rank::ZERO);
        let one = seed_value(Datatype::Int, Rank::ONE);
        assert_eq!((zero, one), (Value::Int(10), Value::Int(20)));
        let p = apply(Datatype::Int, Operator::Min, zero, one).unwrap();
        assert_eq!(p.result, Value::Int(10));
    }

    #[test]
    fn logical_and_bitwise() {
        assert_eq!(int(Operator::Land, 10, 0).unwrap().result, Value::Int(0));
        assert_eq!(int(Operator::Lor, 10, 0).unwrap().result, Value::Int(1));
        assert_eq!(int(Operator::Lxor, 10, 20).unwrap().result, Value::Int(0));
        assert_eq!(int(Operator::Band, 10, 20).unwrap().result, Value::Int(0));
        assert_eq!(int(Operator::Bor, 10, 20).unwrap().result, Value::Int(30));
        assert_eq!(int(Operator::Bxor, 12, 10).unwrap().result, Value::Int(6));
    }

    #[test]
    fn replace_and_no_op() {
        assert_eq!(int(Operator::Replace, 1, 2).unwrap().result, Value::Int(2));
        assert_eq!(int(Operator::NoOp, 1, 2).unwrap().result, Value::Int(1));
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let p = apply(
            Datatype::UnsignedChar,
            Operator::Prod,
            Value::UnsignedChar(20),
            Value::UnsignedChar(20),
        )
        .unwrap();
        assert_eq!(p.result, Value::UnsignedChar(144));
        let p = apply(
            Datatype::SignedChar,
            Operator::Sum,
            Value::SignedChar(127),
            Value::SignedChar(1),
        )
        .unwrap();
        assert_eq!(p.result, Value::SignedChar(-128));
    }

    #[test]
    fn reals() {
        let p = apply(
            Datatype::Double,
            Operator::Sum,
            Value::Double(1.11),
            Value::Double(2.22),
        )
        .unwrap();
        assert_eq!(p.result, Value::Double(1.11 + 2.22));
        assert_eq!(
            apply(
                Datatype::Float,
                Operator::Bxor,
                Value::Float(1.0),
                Value::Float(2.0)
            ),
            Err(ModelError::Unsupported {
                datatype: Datatype::Float,
                operator: Operator::Bxor
            })
        );
    }

    #[test]
    fn complex_min_max_by_magnitude() {
        let a = Value::DoubleComplex(Complex::new(3.0, 4.0));
        let b = Value::DoubleComplex(Complex::new(-4.0, 3.0));
        let c = Value::DoubleComplex(Complex::new(1.0, 1.0));
        let max = |l, r| apply(Datatype::DoubleComplex, Operator::Max, l, r).unwrap().result;
        let min = |l, r| apply(Datatype::DoubleComplex, Operator::Min, l, r).unwrap().result;
        assert_eq!(max(a, c), a);
        assert_eq!(max(c, a), a);
        assert_eq!(min(a, c), c);
        // Equal magnitudes.
        assert_eq!(max(a, b), a);
        assert_eq!(min(a, b), b);
    }

    #[test]
    fn complex_arithmetic() {
        let p = apply(
            Datatype::FloatComplex,
            Operator::Prod,
            Value::FloatComplex(Complex::new(1.0, 2.0)),
            Value::FloatComplex(Complex::new(3.0, -1.0)),
        )
        .unwrap();
        assert_eq!(p.result, Value::FloatComplex(Complex::new(5.0, 5.0)));
        assert!(matches!(
            apply(
                Datatype::FloatComplex,
                Operator::Land,
                Value::FloatComplex(Complex::new(1.0, 2.0)),
                Value::FloatComplex(Complex::new(3.0, -1.0)),
            ),
            Err(ModelError::Unsupported { .. })
        ));
    }

    #[test]
    fn minloc_maxloc_and_cas_are_not_reductions() {
        for op in [Operator::Minloc, Operator::Maxloc, Operator::CompareAndSwap] {
            for datatype in Datatype::ALL {
                let v = seed_value(datatype, Rank::ZERO);
                assert_eq!(
                    apply(datatype, op, v, v),
                    Err(ModelError::Unsupported {
                        datatype,
                        operator: op
                    })
                );
            }
        }
    }

    #[test]
    fn mismatched_operands_are_rejected() {
        assert_eq!(
            apply(Datatype::Int, Operator::Sum, Value::Int(1), Value::Long(2)),
            Err(ModelError::TypeMismatch {
                expected: Datatype::Int,
                found: Datatype::Long
            })
        );
    }

    #[test]
    fn compare_and_swap() {
        let swap = apply_cas(Datatype::Int, Value::Int(20), Value::Int(99), Value::Int(20)).unwrap();
        assert_eq!(swap.result, Value::Int(99));
        assert_eq!(swap.fetched, Value::Int(20));
        let keep = apply_cas(Datatype::Int, Value::Int(20), Value::Int(99), Value::Int(21)).unwrap();
        assert_eq!(keep.result, Value::Int(20));
        assert_eq!(keep.fetched, Value::Int(20));
    }

    #[test]
    fn compare_and_swap_with_seeded_compare() {
        let local = seed_value(Datatype::Int, Rank::ZERO);
        let p = apply_cas(Datatype::Int, local, Value::Int(55), local).unwrap();
        assert_eq!(p.result, Value::Int(55));
        assert_eq!(p.fetched, local);
    }

    #[test]
    fn compare_and_swap_rejects_complex() {
        let v = seed_value(Datatype::DoubleComplex, Rank::ZERO);
        assert_eq!(
            apply_cas(Datatype::DoubleComplex, v, v, v),
            Err(ModelError::Unsupported {
                datatype: Datatype::DoubleComplex,
                operator: Operator::CompareAndSwap
            })
        );
    }
}
