use crate::{Atom, Complex, ModelError};
use core::fmt::{self, Display, Formatter};
use osc_core::{Datatype, Operator};

macro_rules! define_value {
    ($($variant:ident($t:ty)),* $(,)?) => {
        /// A typed atom. There is exactly one variant per [`Datatype`], so every datatype has a
        /// representation and a seed.
        #[derive(Clone, Copy, Debug, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
        pub enum Value {
            $($variant($t)),*
        }

        impl Value {
            pub fn datatype(&self) -> Datatype {
                match self {
                    $(Value::$variant(_) => Datatype::$variant),*
                }
            }

            /// Decodes the first atom of `bytes`.
            pub fn read(datatype: Datatype, bytes: &[u8]) -> Result<Self, ModelError> {
                if bytes.len() < datatype.size() {
                    return Err(ModelError::ShortBuffer {
                        datatype,
                        needed: datatype.size(),
                        len: bytes.len(),
                    });
                }
                Ok(match datatype {
                    $(Datatype::$variant => Value::$variant(<$t as Atom>::read(bytes))),*
                })
            }

            /// Encodes into the first atom of `out`.
            pub fn write(&self, out: &mut [u8]) -> Result<(), ModelError> {
                let datatype = self.datatype();
                if out.len() < datatype.size() {
                    return Err(ModelError::ShortBuffer {
                        datatype,
                        needed: datatype.size(),
                        len: out.len(),
                    });
                }
                match *self {
                    $(Value::$variant(v) => v.write(out)),*
                }
                Ok(())
            }

            /// Type-correct exact equality. Values of different datatypes are never equal.
            pub fn exact_eq(&self, other: &Value) -> bool {
                match (*self, *other) {
                    $((Value::$variant(a), Value::$variant(b)) => a.exact_eq(b),)*
                    _ => false,
                }
            }

            pub(crate) fn combine(
                operator: Operator,
                local: Value,
                remote: Value,
            ) -> Option<Value> {
                match (local, remote) {
                    $((Value::$variant(a), Value::$variant(b)) => {
                        <$t as Atom>::combine(operator, a, b).map(Value::$variant)
                    })*
                    _ => None,
                }
            }

            pub(crate) fn seed(datatype: Datatype, rank: usize) -> Value {
                match datatype {
                    $(Datatype::$variant => Value::$variant(<$t as Atom>::seed(rank))),*
                }
            }
        }

        impl Display for Value {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                match *self {
                    $(Value::$variant(v) => v.fmt_atom(f)),*
                }
            }
        }
    };
}

define_value! {
    SignedChar(i8),
    UnsignedChar(u8),
    Short(i16),
    UnsignedShort(u16),
    Int(i32),
    Unsigned(u32),
    Long(i64),
    UnsignedLong(u64),
    LongLong(i64),
    UnsignedLongLong(u64),
    Float(f32),
    Double(f64),
    LongDouble(f64),
    FloatComplex(Complex<f32>),
    DoubleComplex(Complex<f64>),
    LongDoubleComplex(Complex<f64>),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_datatype_round_trips_through_bytes() {
        for datatype in Datatype::ALL {
            let value = Value::seed(datatype, 1);
            assert_eq!(value.datatype(), datatype);
            let mut buf = vec![0u8; datatype.size()];
            value.write(&mut buf).unwrap();
            let back = Value::read(datatype, &buf).unwrap();
            assert!(back.exact_eq(&value), "{datatype}: {back} != {value}");
        }
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert_eq!(
            Value::read(Datatype::Double, &[0; 4]),
            Err(ModelError::ShortBuffer {
                datatype: Datatype::Double,
                needed: 8,
                len: 4
            })
        );
        assert!(Value::Int(1).write(&mut [0; 2]).is_err());
    }

    #[test]
    fn values_of_different_datatypes_differ() {
        assert!(!Value::Long(10).exact_eq(&Value::LongLong(10)));
        assert!(Value::LongLong(10).exact_eq(&Value::LongLong(10)));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Double(1.5).to_string(), "1.500000");
        assert_eq!(
            Value::FloatComplex(Complex::new(1.0, 0.5)).to_string(),
            "1.000000+0.500000i"
        );
    }
}
