use osc_core::{Datatype, Operator};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ModelError {
    /// The pair has no reference semantics. Callers record a skipped trial.
    #[error("no reference semantics for {operator} on {datatype}")]
    Unsupported {
        datatype: Datatype,
        operator: Operator,
    },
    #[error("expected a {expected} operand, found {found}")]
    TypeMismatch { expected: Datatype, found: Datatype },
    #[error("{datatype} needs {needed} bytes but the buffer holds {len}")]
    ShortBuffer {
        datatype: Datatype,
        needed: usize,
        len: usize,
    },
}
