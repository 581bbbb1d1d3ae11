use crate::{
    model::{combine_complex, combine_integer, combine_real},
    Complex,
};
use core::fmt::{self, Formatter};
use osc_core::Operator;

/// A native Rust representation of one window atom.
///
/// Implementations exist for the primitive integers, `f32`/`f64` and their [`Complex`]
/// counterparts. Byte conversions are native-endian to match what a substrate writes into
/// window memory.
pub trait Atom: Copy {
    const SIZE: usize;

    /// Decodes from the first [`Atom::SIZE`] bytes. The caller checks the length.
    fn read(bytes: &[u8]) -> Self;
    fn write(self, out: &mut [u8]);

    /// Integers compare bit for bit. Reals compare with `==` but also accept identical bit
    /// patterns, so a NaN observed where a NaN was predicted still matches.
    fn exact_eq(self, other: Self) -> bool;

    /// `None` when `operator` has no reference semantics for this kind.
    fn combine(operator: Operator, local: Self, remote: Self) -> Option<Self>;

    /// The deterministic initial value of `rank`.
    fn seed(rank: usize) -> Self;

    fn fmt_atom(self, f: &mut Formatter<'_>) -> fmt::Result;
}

/// Integer capabilities used by the reference model.
pub(crate) trait Integer:
    Atom
    + Ord
    + core::ops::BitAnd<Output = Self>
    + core::ops::BitOr<Output = Self>
    + core::ops::BitXor<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    fn add_wrapping(self, rhs: Self) -> Self;
    fn mul_wrapping(self, rhs: Self) -> Self;
}

/// Real capabilities used by the reference model.
pub(crate) trait Real:
    Atom + PartialOrd + core::ops::Add<Output = Self> + core::ops::Mul<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
}

/// Complex capabilities used by the reference model.
pub(crate) trait Magnitude:
    Atom + core::ops::Add<Output = Self> + core::ops::Mul<Output = Self>
{
    fn magnitude(self) -> f64;
}

macro_rules! integer_atom {
    ($($t:ty),*) => {$(
        impl Atom for $t {
            const SIZE: usize = core::mem::size_of::<$t>();

            fn read(bytes: &[u8]) -> Self {
                let mut raw = [0; core::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                <$t>::from_ne_bytes(raw)
            }

            fn write(self, out: &mut [u8]) {
                out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }

            fn exact_eq(self, other: Self) -> bool {
                self == other
            }

            fn combine(operator: Operator, local: Self, remote: Self) -> Option<Self> {
                combine_integer(operator, local, remote)
            }

            fn seed(rank: usize) -> Self {
                (10 * (1 + rank)) as $t
            }

            fn fmt_atom(self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self)
            }
        }

        impl Integer for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            fn add_wrapping(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn mul_wrapping(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
        }
    )*};
}

integer_atom!(i8, u8, i16, u16, i32, u32, i64, u64);

macro_rules! real_atom {
    ($($t:ty),*) => {$(
        impl Atom for $t {
            const SIZE: usize = core::mem::size_of::<$t>();

            fn read(bytes: &[u8]) -> Self {
                let mut raw = [0; core::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                <$t>::from_ne_bytes(raw)
            }

            fn write(self, out: &mut [u8]) {
                out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }

            fn exact_eq(self, other: Self) -> bool {
                self == other || self.to_bits() == other.to_bits()
            }

            fn combine(operator: Operator, local: Self, remote: Self) -> Option<Self> {
                combine_real(operator, local, remote)
            }

            fn seed(rank: usize) -> Self {
                (1 + rank) as $t * 1.11
            }

            fn fmt_atom(self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{:.6}", self)
            }
        }

        impl Real for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
        }

        impl Atom for Complex<$t> {
            const SIZE: usize = 2 * core::mem::size_of::<$t>();

            fn read(bytes: &[u8]) -> Self {
                let half = <$t as Atom>::SIZE;
                Complex::new(<$t>::read(bytes), <$t>::read(&bytes[half..]))
            }

            fn write(self, out: &mut [u8]) {
                let half = <$t as Atom>::SIZE;
                self.re.write(out);
                self.im.write(&mut out[half..]);
            }

            fn exact_eq(self, other: Self) -> bool {
                self.re.exact_eq(other.re) && self.im.exact_eq(other.im)
            }

            fn combine(operator: Operator, local: Self, remote: Self) -> Option<Self> {
                combine_complex(operator, local, remote)
            }

            fn seed(rank: usize) -> Self {
                Complex::new((1 + rank) as $t * 1.11, 1.0 + rank as $t * -0.5)
            }

            fn fmt_atom(self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{:.6}", self)
            }
        }

        impl Magnitude for Complex<$t> {
            fn magnitude(self) -> f64 {
                self.norm() as f64
            }
        }
    )*};
}

real_atom!(f32, f64);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn native_endian_round_trip() {
        let mut buf = [0u8; 16];
        (-3i16).write(&mut buf);
        assert_eq!(i16::read(&buf), -3);
        Complex::new(1.5f64, -2.0).write(&mut buf);
        assert_eq!(Complex::<f64>::read(&buf), Complex::new(1.5, -2.0));
        assert_eq!(&buf[..8], &1.5f64.to_ne_bytes());
    }

    #[test]
    fn exact_equality_tolerates_identical_nans() {
        assert!(f64::NAN.exact_eq(f64::NAN));
        assert!(!f32::NAN.exact_eq(1.0));
        assert!(0.0f64.exact_eq(-0.0));
        assert!(!1.11f32.exact_eq(1.12));
    }

    #[test]
    fn seeds_follow_rank() {
        assert_eq!(<i32 as Atom>::seed(0), 10);
        assert_eq!(<u8 as Atom>::seed(1), 20);
        assert_eq!(<f32 as Atom>::seed(1), 2.0f32 * 1.11f32);
        assert_eq!(<Complex<f64> as Atom>::seed(1), Complex::new(2.22, 0.5));
        assert_eq!(<Complex<f64> as Atom>::seed(0), Complex::new(1.11, 1.0));
    }
}
