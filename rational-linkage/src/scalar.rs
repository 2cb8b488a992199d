//! Scalar types of the algebra.
//!
//! Every algebraic structure in this crate is generic over [`Scalar`], which
//! is implemented for [`f64`] (floating path) and [`Rational`] (exact path).
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Neg, Sub},
};

/// Arbitrary-precision rational number.
pub type Rational = num_rational::BigRational;

/// Tolerance used by the floating path to decide that a value is zero.
pub const EPS: f64 = 1e-10;

/// A field that the algebra can be computed over.
pub trait Scalar:
    Clone
    + Debug
    + PartialEq
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// True if the arithmetic is exact.
    const EXACT: bool;

    /// Convert to floating point.
    fn to_f64(&self) -> f64;

    /// Convert from floating point without losing the binary value.
    ///
    /// Non-finite values become zero.
    fn from_f64(v: f64) -> Self;

    /// Convert from floating point, preferring a short representation.
    ///
    /// For exact types the result is the simplest fraction within [`EPS`]
    /// relative distance.
    fn approx_f64(v: f64) -> Self;

    /// Return true if the value is zero, or close enough for inexact types.
    fn is_negligible(&self) -> bool;

    /// Return true if the value is zero, or negligible compared to `scale`
    /// for inexact types.
    fn is_negligible_to(&self, scale: f64) -> bool {
        if Self::EXACT {
            self.is_zero()
        } else {
            self.to_f64().abs() <= EPS * scale
        }
    }

    /// Square root, if it exists in this field.
    fn sqrt(&self) -> Option<Self>;

    /// Absolute value.
    fn abs(&self) -> Self;

    /// Create from an integer.
    fn from_i64(v: i64) -> Self;

    /// Halve the value.
    fn half(&self) -> Self {
        self.clone() / Self::from_i64(2)
    }
}

impl Scalar for f64 {
    const EXACT: bool = false;

    fn to_f64(&self) -> f64 {
        *self
    }

    fn from_f64(v: f64) -> Self {
        if v.is_finite() {
            v
        } else {
            0.
        }
    }

    fn approx_f64(v: f64) -> Self {
        Self::from_f64(v)
    }

    fn is_negligible(&self) -> bool {
        f64::abs(*self) < EPS
    }

    fn sqrt(&self) -> Option<Self> {
        (*self >= 0.).then(|| f64::sqrt(*self))
    }

    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    fn from_i64(v: i64) -> Self {
        v as f64
    }
}

impl Scalar for Rational {
    const EXACT: bool = true;

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn from_f64(v: f64) -> Self {
        Rational::from_float(v).unwrap_or_else(Rational::zero)
    }

    fn approx_f64(v: f64) -> Self {
        continued_fraction(v, EPS)
    }

    fn is_negligible(&self) -> bool {
        self.is_zero()
    }

    fn sqrt(&self) -> Option<Self> {
        if self.is_negative() {
            return None;
        }
        let n = exact_isqrt(self.numer())?;
        let d = exact_isqrt(self.denom())?;
        Some(Rational::new(n, d))
    }

    fn abs(&self) -> Self {
        Signed::abs(self)
    }

    fn from_i64(v: i64) -> Self {
        Rational::from_integer(BigInt::from(v))
    }
}

fn exact_isqrt(n: &BigInt) -> Option<BigInt> {
    let r = n.sqrt();
    (&r * &r == *n).then_some(r)
}

/// The simplest fraction `p/q` with `|p/q - v| <= tol * max(1, |v|)`.
pub fn continued_fraction(v: f64, tol: f64) -> Rational {
    if !v.is_finite() {
        return Rational::zero();
    }
    let tol = tol * v.abs().max(1.);
    // Convergents h/k
    let (mut h0, mut h1) = (BigInt::zero(), BigInt::one());
    let (mut k0, mut k1) = (BigInt::one(), BigInt::zero());
    let mut x = v;
    for _ in 0..64 {
        let a = x.floor();
        let ai = BigInt::from(a as i64);
        let h2 = &ai * &h1 + &h0;
        let k2 = &ai * &k1 + &k0;
        (h0, h1) = (h1, h2);
        (k0, k1) = (k1, k2);
        let approx = Rational::new(h1.clone(), k1.clone());
        if (Scalar::to_f64(&approx) - v).abs() <= tol {
            return approx;
        }
        let frac = x - a;
        if frac.abs() < f64::EPSILON {
            return approx;
        }
        x = frac.recip();
    }
    Rational::from_f64(v)
}

/// Convert a slice of floats into exact values.
pub fn rationalize<const N: usize>(v: [f64; N]) -> [Rational; N] {
    v.map(|x| Rational::approx_f64(x))
}

/// Largest magnitude of the values.
pub(crate) fn magnitude<'a, T: Scalar>(v: impl IntoIterator<Item = &'a T>) -> f64 {
    v.into_iter().fold(0., |m, x| m.max(x.to_f64().abs()))
}

/// Return true if `a = k b` for a nonzero `k`, within a relative tolerance
/// for inexact types.
pub(crate) fn proportional<T: Scalar>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let Some(k) = (0..a.len())
        .max_by(|&i, &j| a[i].to_f64().abs().total_cmp(&a[j].to_f64().abs()))
        .filter(|&k| !a[k].is_zero())
    else {
        return b.iter().all(T::is_negligible);
    };
    if b[k].is_negligible_to(magnitude(b)) {
        return false;
    }
    // a * b[k] == b * a[k]
    let scale = a[k].to_f64().abs() * b[k].to_f64().abs();
    a.iter().zip(b).all(|(ai, bi)| {
        let diff = ai.clone() * b[k].clone() - bi.clone() * a[k].clone();
        if T::EXACT {
            diff.is_zero()
        } else {
            diff.to_f64().abs() <= 1e-8 * scale
        }
    })
}

/// Shorthand to build an integer-valued scalar.
pub fn int<T: Scalar>(v: i64) -> T {
    T::from_i64(v)
}

#[test]
fn rational_sqrt_and_fraction() {
    let r = Rational::new(BigInt::from(9), BigInt::from(16));
    assert_eq!(Scalar::sqrt(&r), Some(Rational::new(BigInt::from(3), BigInt::from(4))));
    assert_eq!(Scalar::sqrt(&Rational::from_i64(2)), None);
    assert_eq!(Scalar::sqrt(&Rational::from_i64(-4)), None);
    let third = continued_fraction(1. / 3., EPS);
    assert_eq!(third, Rational::new(BigInt::from(1), BigInt::from(3)));
    let neg = continued_fraction(-2.75, EPS);
    assert_eq!(neg, Rational::new(BigInt::from(-11), BigInt::from(4)));
}

#[test]
fn proportional_at_any_scale() {
    assert!(proportional(&[1e-9, 2e-9, 0.], &[-3e4, -6e4, 0.]));
    assert!(!proportional(&[1e-9, 2e-9, 0.], &[1e-9, 3e-9, 0.]));
    assert!(!proportional(&[1., 2.], &[0., 0.]));
    assert!(1e-12_f64.is_negligible_to(1.));
    assert!(!1e-12_f64.is_negligible_to(1e-6));
    assert!(!Rational::new(BigInt::from(1), BigInt::from(10).pow(30)).is_negligible_to(1e9));
}
