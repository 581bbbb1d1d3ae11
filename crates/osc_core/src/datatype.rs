use core::fmt::{self, Display, Formatter};

/// A predefined scalar or complex kind that a window atom can hold.
///
/// [`LongDouble`](Datatype::LongDouble) and [`LongDoubleComplex`](Datatype::LongDoubleComplex)
/// are `f64` stand-ins: their atoms are 8 and 16 bytes wide, not the native 16 and 32. A window
/// written by a real `long double` implementation must not be read through them.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Datatype {
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    Unsigned,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    /// Carried as `f64`.
    LongDouble,
    FloatComplex,
    DoubleComplex,
    /// Carried as two `f64` parts.
    LongDoubleComplex,
}

/// Coarse grouping used by the operator legality table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataClass {
    Integer,
    FloatingPoint,
    Complex,
}

impl Datatype {
    /// Every datatype, in registry order.
    pub const ALL: [Datatype; 16] = [
        Datatype::SignedChar,
        Datatype::UnsignedChar,
        Datatype::Short,
        Datatype::UnsignedShort,
        Datatype::Int,
        Datatype::Unsigned,
        Datatype::Long,
        Datatype::UnsignedLong,
        Datatype::LongLong,
        Datatype::UnsignedLongLong,
        Datatype::Float,
        Datatype::Double,
        Datatype::LongDouble,
        Datatype::FloatComplex,
        Datatype::DoubleComplex,
        Datatype::LongDoubleComplex,
    ];

    pub fn class(self) -> DataClass {
        use Datatype::*;
        match self {
            SignedChar | UnsignedChar | Short | UnsignedShort | Int | Unsigned | Long
            | UnsignedLong | LongLong | UnsignedLongLong => DataClass::Integer,
            Float | Double | LongDouble => DataClass::FloatingPoint,
            FloatComplex | DoubleComplex | LongDoubleComplex => DataClass::Complex,
        }
    }

    pub fn is_complex(self) -> bool {
        self.class() == DataClass::Complex
    }

    pub fn name(self) -> &'static str {
        use Datatype::*;
        match self {
            SignedChar => "MPI_SIGNED_CHAR",
            UnsignedChar => "MPI_UNSIGNED_CHAR",
            Short => "MPI_SHORT",
            UnsignedShort => "MPI_UNSIGNED_SHORT",
            Int => "MPI_INT",
            Unsigned => "MPI_UNSIGNED",
            Long => "MPI_LONG",
            UnsignedLong => "MPI_UNSIGNED_LONG",
            LongLong => "MPI_LONG_LONG",
            UnsignedLongLong => "MPI_UNSIGNED_LONG_LONG",
            Float => "MPI_FLOAT",
            Double => "MPI_DOUBLE",
            LongDouble => "MPI_LONG_DOUBLE",
            FloatComplex => "MPI_C_FLOAT_COMPLEX",
            DoubleComplex => "MPI_C_DOUBLE_COMPLEX",
            LongDoubleComplex => "MPI_C_LONG_DOUBLE_COMPLEX",
        }
    }

    /// Size of one atom in bytes. `long` follows LP64; the long double kinds report their `f64`
    /// stand-in width.
    pub fn size(self) -> usize {
        use Datatype::*;
        match self {
            SignedChar | UnsignedChar => 1,
            Short | UnsignedShort => 2,
            Int | Unsigned | Float => 4,
            Long | UnsignedLong | LongLong | UnsignedLongLong | Double | LongDouble
            | FloatComplex => 8,
            DoubleComplex | LongDoubleComplex => 16,
        }
    }
}

impl Display for Datatype {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
