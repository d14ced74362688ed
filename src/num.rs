use std::{
    fmt::{Debug, Display},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// Scalar value used for prices, volumes and indicator outputs.
///
/// Thin wrapper over [`f64`]. Undefined results (division by zero, square
/// root of a negative value, logarithm of a non-positive value) produce
/// [`Num::NAN`] instead of infinities or panics. NaN propagates through
/// arithmetic and compares as neither greater, less, nor equal to anything,
/// itself included. Use [`is_nan`](Num::is_nan) to detect it.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Num(f64);

impl Num {
    pub const NAN: Num = Num(f64::NAN);
    pub const ZERO: Num = Num(0.0);
    pub const ONE: Num = Num(1.0);

    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn to_f64(self) -> f64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }

    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    #[inline]
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    #[inline]
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < 0.0
    }

    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[inline]
    #[must_use]
    pub fn pow(self, exponent: i32) -> Self {
        Self(self.0.powi(exponent))
    }

    /// Square root, NaN for negative input.
    #[inline]
    #[must_use]
    pub fn sqrt(self) -> Self {
        if self.0 < 0.0 {
            Self::NAN
        } else {
            Self(self.0.sqrt())
        }
    }

    /// Natural logarithm, NaN for non-positive input.
    #[inline]
    #[must_use]
    pub fn ln(self) -> Self {
        if self.0 <= 0.0 {
            Self::NAN
        } else {
            Self(self.0.ln())
        }
    }

    /// Returns `self` when strictly greater than `other`, `other` otherwise.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if self.0 > other.0 { self } else { other }
    }

    /// Returns `self` when strictly less than `other`, `other` otherwise.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 < other.0 { self } else { other }
    }
}

impl From<f64> for Num {
    #[inline]
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i32> for Num {
    #[inline]
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl From<u32> for Num {
    #[inline]
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl Add for Num {
    type Output = Num;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Num {
    type Output = Num;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for Num {
    type Output = Num;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl Div for Num {
    type Output = Num;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        if rhs.is_zero() {
            Self::NAN
        } else {
            Self(self.0 / rhs.0)
        }
    }
}

impl Neg for Num {
    type Output = Num;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Display for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}
