use core::fmt::{self, Display, Formatter};

/// A fetch-and-op operator, or the compare-and-swap pseudo-operator.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Operator {
    Max,
    Min,
    Sum,
    Prod,
    Land,
    Band,
    Lor,
    Bor,
    Lxor,
    Bxor,
    Minloc,
    Maxloc,
    Replace,
    NoOp,
    CompareAndSwap,
}

impl Operator {
    /// Every operator, in registry order.
    pub const ALL: [Operator; 15] = [
        Operator::Max,
        Operator::Min,
        Operator::Sum,
        Operator::Prod,
        Operator::Land,
        Operator::Band,
        Operator::Lor,
        Operator::Bor,
        Operator::Lxor,
        Operator::Bxor,
        Operator::Minloc,
        Operator::Maxloc,
        Operator::Replace,
        Operator::NoOp,
        Operator::CompareAndSwap,
    ];

    pub fn name(self) -> &'static str {
        use Operator::*;
        match self {
            Max => "MPI_MAX",
            Min => "MPI_MIN",
            Sum => "MPI_SUM",
            Prod => "MPI_PROD",
            Land => "MPI_LAND",
            Band => "MPI_BAND",
            Lor => "MPI_LOR",
            Bor => "MPI_BOR",
            Lxor => "MPI_LXOR",
            Bxor => "MPI_BXOR",
            Minloc => "MPI_MINLOC",
            Maxloc => "MPI_MAXLOC",
            Replace => "MPI_REPLACE",
            NoOp => "MPI_NO_OP",
            CompareAndSwap => "Compare-And-Swap",
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::Land | Operator::Lor | Operator::Lxor)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, Operator::Band | Operator::Bor | Operator::Bxor)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
