//! Dense univariate polynomials.
use crate::{
    quat::impl_by_value,
    scalar::{Scalar, EPS},
};
use nalgebra as na;
use std::ops::{Add, Mul, Neg, Sub};

/// Complex number used by the root finder.
pub type Complex = na::Complex<f64>;

/// Univariate polynomial `c[0] + c[1] t + c[2] t^2 + ...`.
///
/// Exact trailing zeros are always removed, so the zero polynomial has no
/// coefficients.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Poly<T> {
    coeffs: Vec<T>,
}

impl<T: Scalar> Default for Poly<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Scalar> Poly<T> {
    /// Create from ascending coefficients.
    pub fn new(mut coeffs: Vec<T>) -> Self {
        while coeffs.last().is_some_and(T::is_zero) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// The zero polynomial.
    pub const fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// Constant polynomial.
    pub fn constant(c: T) -> Self {
        Self::new(vec![c])
    }

    /// The monomial `c t^k`.
    pub fn monomial(c: T, k: usize) -> Self {
        let mut coeffs = vec![T::zero(); k + 1];
        coeffs[k] = c;
        Self::new(coeffs)
    }

    /// The polynomial `t`.
    pub fn t() -> Self {
        Self::monomial(T::one(), 1)
    }

    /// The polynomial `t - r`.
    pub fn linear_root(r: T) -> Self {
        Self::new(vec![-r, T::one()])
    }

    /// Ascending coefficients.
    pub fn coeffs(&self) -> &[T] {
        &self.coeffs
    }

    /// The coefficient of `t^k`, zero beyond the degree.
    pub fn coeff(&self, k: usize) -> T {
        self.coeffs.get(k).cloned().unwrap_or_else(T::zero)
    }

    /// Degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    /// Leading coefficient, zero for the zero polynomial.
    pub fn leading(&self) -> T {
        self.coeffs.last().cloned().unwrap_or_else(T::zero)
    }

    /// Return true if it is exactly the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Return true if every coefficient is negligible.
    pub fn is_negligible(&self) -> bool {
        self.coeffs.iter().all(T::is_negligible)
    }

    /// Evaluate with Horner's scheme.
    pub fn eval(&self, t: &T) -> T {
        self.coeffs.iter().rev().fold(T::zero(), |acc, c| acc * t.clone() + c.clone())
    }

    /// Multiply by a scalar.
    pub fn scale(&self, s: &T) -> Self {
        Self::new(self.coeffs.iter().map(|c| c.clone() * s.clone()).collect())
    }

    /// Derivative.
    pub fn derivative(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| c.clone() * T::from_i64(k as i64))
            .collect();
        Self::new(coeffs)
    }

    /// Divide by a monic-able divisor, returning `(quotient, remainder)`.
    ///
    /// Returns `None` if the divisor is zero.
    pub fn div_rem(&self, rhs: &Self) -> Option<(Self, Self)> {
        let dn = rhs.degree()?;
        let lead = rhs.leading();
        let mut rem = self.coeffs.clone();
        let Some(n) = self.degree().filter(|&n| n >= dn) else {
            return Some((Self::zero(), self.clone()));
        };
        let mut quot = vec![T::zero(); n - dn + 1];
        for k in (0..=n - dn).rev() {
            let q = rem[k + dn].clone() / lead.clone();
            for (j, c) in rhs.coeffs.iter().enumerate() {
                rem[k + j] = rem[k + j].clone() - q.clone() * c.clone();
            }
            quot[k] = q;
        }
        rem.truncate(dn);
        Some((Self::new(quot), Self::new(rem)))
    }

    /// The reversed polynomial `t^n p(1/t)` for a nominal degree `n`.
    ///
    /// The nominal degree must not be less than the actual degree.
    pub fn reversed(&self, n: usize) -> Self {
        let mut coeffs = self.coeffs.clone();
        coeffs.resize(n + 1, T::zero());
        coeffs.reverse();
        Self::new(coeffs)
    }

    /// Substitute `t = a + b u`.
    pub fn compose_affine(&self, a: &T, b: &T) -> Self {
        let lin = Self::new(vec![a.clone(), b.clone()]);
        self.coeffs
            .iter()
            .rev()
            .fold(Self::zero(), |acc, c| &(&acc * &lin) + &Self::constant(c.clone()))
    }

    /// Convert the coefficient type.
    pub fn map<U: Scalar>(&self, f: impl Fn(&T) -> U) -> Poly<U> {
        Poly::new(self.coeffs.iter().map(f).collect())
    }

    /// Convert to floating point.
    pub fn to_f64(&self) -> Poly<f64> {
        self.map(T::to_f64)
    }

    /// Make the polynomial monic. Returns `None` for the zero polynomial.
    pub fn monic(&self) -> Option<Self> {
        let lead = self.leading();
        (!self.is_zero()).then(|| self.scale(&(T::one() / lead)))
    }
}

impl Poly<f64> {
    /// Drop leading coefficients that are negligible relative to the rest.
    pub fn trimmed(&self) -> Self {
        let max = self.coeffs.iter().fold(0f64, |m, c| m.max(c.abs()));
        let mut coeffs = self.coeffs.clone();
        while coeffs.last().is_some_and(|c| c.abs() <= EPS * max.max(1.)) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// All complex roots, by the eigenvalues of the companion matrix and a
    /// Newton polish.
    pub fn complex_roots(&self) -> Vec<Complex> {
        let p = self.trimmed();
        let Some(n) = p.degree().filter(|&n| n > 0) else {
            return Vec::new();
        };
        let lead = p.leading();
        let companion = na::DMatrix::from_fn(n, n, |i, j| {
            if i == 0 {
                -p.coeffs[n - 1 - j] / lead
            } else if i == j + 1 {
                1.
            } else {
                0.
            }
        });
        companion.complex_eigenvalues().iter().map(|z| p.polish(*z)).collect()
    }

    /// Real roots, sorted ascending, with duplicates merged.
    pub fn real_roots(&self) -> Vec<f64> {
        let mut roots = self
            .complex_roots()
            .into_iter()
            .filter(|z| z.im.abs() <= 1e-7 * z.norm().max(1.))
            .map(|z| z.re)
            .collect::<Vec<_>>();
        roots.sort_unstable_by(f64::total_cmp);
        roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * a.abs().max(1.));
        roots
    }

    fn polish(&self, mut z: Complex) -> Complex {
        let dp = self.derivative();
        for _ in 0..8 {
            let f = self.eval_complex(z);
            let df = dp.eval_complex(z);
            if df.norm() < f64::EPSILON {
                break;
            }
            let step = f / df;
            z -= step;
            if step.norm() <= f64::EPSILON * z.norm().max(1.) {
                break;
            }
        }
        z
    }

    /// Evaluate at a complex value.
    pub fn eval_complex(&self, z: Complex) -> Complex {
        self.coeffs.iter().rev().fold(Complex::new(0., 0.), |acc, &c| acc * z + c)
    }
}

impl<T: Scalar> Add for &Poly<T> {
    type Output = Poly<T>;

    fn add(self, rhs: Self) -> Self::Output {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        Poly::new((0..n).map(|k| self.coeff(k) + rhs.coeff(k)).collect())
    }
}

impl<T: Scalar> Sub for &Poly<T> {
    type Output = Poly<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        Poly::new((0..n).map(|k| self.coeff(k) - rhs.coeff(k)).collect())
    }
}

impl<T: Scalar> Mul for &Poly<T> {
    type Output = Poly<T>;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero();
        }
        let mut coeffs = vec![T::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] = coeffs[i + j].clone() + a.clone() * b.clone();
            }
        }
        Poly::new(coeffs)
    }
}

impl<T: Scalar> Neg for &Poly<T> {
    type Output = Poly<T>;

    fn neg(self) -> Self::Output {
        Poly::new(self.coeffs.iter().map(|c| -c.clone()).collect())
    }
}

impl_by_value!(Poly, Add, add; Sub, sub; Mul, mul);

impl<T: Scalar> Neg for Poly<T> {
    type Output = Poly<T>;

    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<T: Scalar> std::iter::Sum for Poly<T> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, p| &acc + &p)
    }
}

/// Common real roots of polynomials, including `t = ∞` if every degree is
/// below `nominal`.
///
/// Candidates are the roots of the first polynomial that is not negligible;
/// the others are tested with a tolerance relative to their coefficients.
/// Returns `None` if every polynomial is negligible.
pub fn common_real_roots(polys: &[Poly<f64>], nominal: usize) -> Option<Vec<f64>> {
    let scale = polys.iter().flat_map(|p| p.coeffs.iter()).fold(0f64, |m, c| m.max(c.abs()));
    let tol = 1e-9 * scale.max(1.);
    let negligible = |p: &Poly<f64>| p.coeffs.iter().all(|c| c.abs() <= tol);
    let vanishes = |p: &Poly<f64>, t: f64| {
        // Relative to the magnitude of the terms
        let mag = p
            .coeffs
            .iter()
            .enumerate()
            .map(|(k, c)| c.abs() * t.abs().powi(k as i32))
            .sum::<f64>();
        negligible(p) || p.eval(&t).abs() <= 1e-7 * mag
    };
    let lead = polys.iter().find(|p| !negligible(p))?;
    let mut roots = lead
        .real_roots()
        .into_iter()
        .filter(|&t| polys.iter().all(|p| vanishes(p, t)))
        .collect::<Vec<_>>();
    let at_infinity = polys.iter().all(|p| p.coeffs.iter().skip(nominal).all(|c| c.abs() <= tol));
    if at_infinity {
        roots.push(f64::INFINITY);
    }
    Some(roots)
}

/// Product of linear factors `(t - r_0)(t - r_1)...`.
pub fn from_roots<T: Scalar>(roots: &[T]) -> Poly<T> {
    roots.iter().fold(Poly::constant(T::one()), |acc, r| &acc * &Poly::linear_root(r.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Rational;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_division() {
        let p = from_roots(&[1, 2, 3].map(Rational::from_i64));
        let d = from_roots(&[2].map(Rational::from_i64));
        let (q, r) = p.div_rem(&d).unwrap();
        assert!(r.is_zero());
        assert_eq!(q, from_roots(&[1, 3].map(Rational::from_i64)));
    }

    #[test]
    fn roots_of_real_polynomial() {
        // (t^2 + 1)(t - 2)(t + 0.5)
        let p = &Poly::new(vec![1., 0., 1.]) * &from_roots(&[2., -0.5]);
        let real = p.real_roots();
        assert_eq!(real.len(), 2);
        assert_abs_diff_eq!(real[0], -0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(real[1], 2., epsilon = 1e-10);
        assert_eq!(p.complex_roots().len(), 4);
    }

    #[test]
    fn common_roots_with_infinity() {
        let a = from_roots(&[1., 2.]);
        let b = from_roots(&[1., -3.]);
        let roots = common_real_roots(&[a.clone(), b], 2).unwrap();
        assert_eq!(roots.len(), 1);
        assert_abs_diff_eq!(roots[0], 1., epsilon = 1e-10);
        let roots = common_real_roots(&[from_roots(&[1.]), Poly::zero()], 2).unwrap();
        assert_eq!(roots.len(), 2);
        assert_abs_diff_eq!(roots[0], 1., epsilon = 1e-10);
        assert!(roots[1].is_infinite());
        assert_eq!(common_real_roots(&[Poly::zero(), Poly::new(vec![0.])], 2), None);
        assert_eq!(common_real_roots(&[a, from_roots(&[5.])], 2), Some(vec![]));
    }

    #[test]
    fn reversal_and_affine() {
        let p = Poly::new(vec![1., 2., 3.]);
        assert_eq!(p.reversed(2).coeffs(), &[3., 2., 1.]);
        assert_eq!(p.reversed(3).coeffs(), &[0., 3., 2., 1.]);
        let q = p.compose_affine(&1., &2.);
        assert_abs_diff_eq!(q.eval(&0.5), p.eval(&2.), epsilon = 1e-12);
    }
}
