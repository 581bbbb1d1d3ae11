use core::{
    fmt::{self, Display, Formatter},
    ops::{Add, Mul},
};

/// A complex number with IEEE components, laid out as `re` then `im` like C's `_Complex`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Complex { re, im }
    }
}

impl Complex<f32> {
    pub fn norm(self) -> f32 {
        self.re.hypot(self.im)
    }
}

impl Complex<f64> {
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }
}

impl<T: Add<Output = T>> Add for Complex<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl<T> Mul for Complex<T>
where
    T: Copy + Add<Output = T> + Mul<Output = T> + core::ops::Sub<Output = T>,
{
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl<T: Display + PartialOrd + Default + Copy + core::ops::Neg<Output = T>> Display
    for Complex<T>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(6);
        if self.im < T::default() {
            write!(f, "{:.*}-{:.*}i", precision, self.re, precision, -self.im)
        } else {
            write!(f, "{:.*}+{:.*}i", precision, self.re, precision, self.im)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Complex::new(1.0f64, 2.0);
        let b = Complex::new(3.0f64, -1.0);
        assert_eq!(a + b, Complex::new(4.0, 1.0));
        assert_eq!(a * b, Complex::new(5.0, 5.0));
        assert_eq!(Complex::new(3.0f32, 4.0).norm(), 5.0);
    }

    #[test]
    fn display() {
        assert_eq!(Complex::new(1.5f64, -0.5).to_string(), "1.500000-0.500000i");
        assert_eq!(format!("{:.2}", Complex::new(1.0f32, 1.0)), "1.00+1.00i");
    }
}
