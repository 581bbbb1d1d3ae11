use crate::{DataClass, Datatype, Operator};
use core::fmt::{self, Display, Formatter};

/// Dense index of a [`Datatype`], usable as a matrix row. Only valid indices can be constructed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DatatypeId(u8);

/// Dense index of an [`Operator`], usable as a matrix column.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct OperatorId(u8);

impl DatatypeId {
    pub const COUNT: usize = Datatype::ALL.len();

    pub fn new(raw: usize) -> Option<Self> {
        if raw < Self::COUNT {
            Some(DatatypeId(raw as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl OperatorId {
    pub const COUNT: usize = Operator::ALL.len();

    pub fn new(raw: usize) -> Option<Self> {
        if raw < Self::COUNT {
            Some(OperatorId(raw as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<Datatype> for DatatypeId {
    fn from(datatype: Datatype) -> Self {
        DatatypeId(datatype as u8)
    }
}

impl From<DatatypeId> for Datatype {
    fn from(id: DatatypeId) -> Self {
        Datatype::ALL[id.index()]
    }
}

impl From<Operator> for OperatorId {
    fn from(operator: Operator) -> Self {
        OperatorId(operator as u8)
    }
}

impl From<OperatorId> for Operator {
    fn from(id: OperatorId) -> Self {
        Operator::ALL[id.index()]
    }
}

impl Display for DatatypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&Datatype::from(*self), f)
    }
}

impl Display for OperatorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&Operator::from(*self), f)
    }
}

fn matches_name(canonical: &str, candidate: &str) -> bool {
    let candidate = candidate.trim();
    if canonical.eq_ignore_ascii_case(candidate) {
        return true;
    }
    match canonical.strip_prefix("MPI_") {
        Some(bare) => bare.eq_ignore_ascii_case(candidate),
        None => false,
    }
}

/// Looks up a datatype by name, e.g. `"MPI_INT"` or `"int"`.
pub fn datatype_id(name: &str) -> Option<DatatypeId> {
    Datatype::ALL
        .iter()
        .find(|dt| matches_name(dt.name(), name))
        .map(|&dt| dt.into())
}

/// Looks up an operator by name, e.g. `"MPI_SUM"`, `"sum"` or `"compare-and-swap"`.
pub fn operator_id(name: &str) -> Option<OperatorId> {
    Operator::ALL
        .iter()
        .find(|op| matches_name(op.name(), name))
        .map(|&op| op.into())
}

pub fn datatype_name(id: DatatypeId) -> &'static str {
    Datatype::from(id).name()
}

pub fn operator_name(id: OperatorId) -> &'static str {
    Operator::from(id).name()
}

/// Whether `operator` may be applied to `datatype` as an accumulate/fetch-and-op operation, or
/// as compare-and-swap when `operator` is [`Operator::CompareAndSwap`].
pub fn is_operator_allowed(datatype: Datatype, operator: Operator) -> bool {
    use Operator::*;
    let class = datatype.class();
    match operator {
        Max | Min => matches!(class, DataClass::Integer | DataClass::FloatingPoint),
        Sum | Prod | Replace | NoOp => true,
        Land | Lor | Lxor | Band | Bor | Bxor => class == DataClass::Integer,
        Minloc | Maxloc => false,
        CompareAndSwap => is_cas_allowed(datatype),
    }
}

pub fn is_cas_allowed(datatype: Datatype) -> bool {
    !datatype.is_complex()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_are_dense_and_injective() {
        for (i, dt) in Datatype::ALL.iter().enumerate() {
            let id = DatatypeId::from(*dt);
            assert_eq!(id.index(), i);
            assert_eq!(Datatype::from(id), *dt);
            assert_eq!(datatype_id(dt.name()), Some(id));
        }
        for (i, op) in Operator::ALL.iter().enumerate() {
            let id = OperatorId::from(*op);
            assert_eq!(id.index(), i);
            assert_eq!(Operator::from(id), *op);
            assert_eq!(operator_id(op.name()), Some(id));
        }
        assert_eq!(DatatypeId::new(DatatypeId::COUNT), None);
        assert_eq!(OperatorId::new(OperatorId::COUNT), None);
    }

    #[test]
    fn lookups_are_forgiving_about_case_and_prefix() {
        assert_eq!(datatype_id("int"), Some(Datatype::Int.into()));
        assert_eq!(datatype_id("MPI_long_double"), Some(Datatype::LongDouble.into()));
        assert_eq!(operator_id("bxor"), Some(Operator::Bxor.into()));
        assert_eq!(
            operator_id("compare-and-swap"),
            Some(Operator::CompareAndSwap.into())
        );
        assert_eq!(datatype_id("MPI_QUATERNION"), None);
        assert_eq!(operator_id(""), None);
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(datatype_name(Datatype::Double.into()), "MPI_DOUBLE");
        assert_eq!(operator_name(Operator::CompareAndSwap.into()), "Compare-And-Swap");
    }

    #[test]
    fn legality_table() {
        assert!(!is_operator_allowed(Datatype::DoubleComplex, Operator::Min));
        assert!(!is_operator_allowed(Datatype::FloatComplex, Operator::Max));
        assert!(is_operator_allowed(Datatype::Int, Operator::Bxor));
        assert!(!is_operator_allowed(Datatype::Float, Operator::Bxor));
        assert!(!is_operator_allowed(Datatype::Double, Operator::Land));
        assert!(is_operator_allowed(Datatype::FloatComplex, Operator::Prod));
        assert!(is_operator_allowed(Datatype::LongDoubleComplex, Operator::Replace));
        assert!(!is_operator_allowed(Datatype::Int, Operator::Minloc));
        assert!(is_operator_allowed(Datatype::UnsignedChar, Operator::CompareAndSwap));
        assert!(!is_operator_allowed(
            Datatype::DoubleComplex,
            Operator::CompareAndSwap
        ));
    }
}
