//! Rational curves in the Study parameter space.
//!
//! A [`RationalCurve`] is a polynomial dual quaternion `C(t) = Σ c_k t^k`.
//! It describes a rational motion if its norm has a vanishing dual part, and
//! the motion passes through the identity at `t = ∞` if the leading
//! coefficient is real.
use crate::{
    bezier::RationalBezier,
    dq::DualQuaternion,
    poly::Poly,
    quat::Quaternion,
    scalar::{magnitude, proportional, Scalar},
    Error, Result,
};
use nalgebra as na;
use std::{f64::consts::PI, ops::Mul};

/// Eight polynomials of the Study parameters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RationalCurve<T = f64> {
    polys: [Poly<T>; 8],
}

impl<T: Scalar> RationalCurve<T> {
    /// Create from 8 polynomials.
    pub fn from_polys(polys: Vec<Poly<T>>) -> Result<Self> {
        let got = polys.len();
        let polys = <[Poly<T>; 8]>::try_from(polys)
            .map_err(|_| Error::Dimension { expected: 8, got })?;
        Ok(Self { polys })
    }

    /// Create from a coefficient matrix of 8 rows.
    ///
    /// Each row lists the coefficients of one Study parameter from the highest
    /// degree down to the constant term, and all rows have the same length.
    pub fn from_coeffs(rows: &[Vec<T>]) -> Result<Self> {
        if rows.len() != 8 {
            return Err(Error::Dimension { expected: 8, got: rows.len() });
        }
        let len = rows[0].len();
        if len == 0 {
            return Err(Error::InvalidInput("empty coefficient row".to_string()));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != len) {
            return Err(Error::Dimension { expected: len, got: row.len() });
        }
        let polys = rows.iter().map(|row| Poly::new(row.iter().rev().cloned().collect())).collect();
        Self::from_polys(polys)
    }

    /// Create from the coefficient dual quaternions `[c_0, c_1, ..., c_n]`.
    pub fn from_dq_coeffs(coeffs: &[DualQuaternion<T>]) -> Self {
        let arrays = coeffs.iter().map(DualQuaternion::to_array).collect::<Vec<_>>();
        let polys = std::array::from_fn(|i| {
            Poly::new(arrays.iter().map(|a| a[i].clone()).collect())
        });
        Self { polys }
    }

    /// Constant curve.
    pub fn constant(dq: &DualQuaternion<T>) -> Self {
        Self::from_dq_coeffs(std::slice::from_ref(dq))
    }

    /// Product of linear factors `(t - h_1)(t - h_2)...(t - h_n)`.
    pub fn from_factors(axes: &[DualQuaternion<T>]) -> Self {
        axes.iter()
            .fold(Self::constant(&DualQuaternion::identity()), |acc, h| {
                &acc * &Self::linear_factor(h)
            })
    }

    /// The linear factor `t - h`.
    pub fn linear_factor(h: &DualQuaternion<T>) -> Self {
        Self::from_dq_coeffs(&[-h, DualQuaternion::identity()])
    }

    /// The polynomials.
    pub fn polys(&self) -> &[Poly<T>; 8] {
        &self.polys
    }

    /// Coefficient matrix, see [`RationalCurve::from_coeffs()`].
    pub fn coeffs(&self) -> Vec<Vec<T>> {
        let n = self.degree();
        self.polys.iter().map(|p| (0..=n).rev().map(|k| p.coeff(k)).collect()).collect()
    }

    /// Degree, the maximum degree of the polynomials.
    pub fn degree(&self) -> usize {
        self.polys.iter().filter_map(Poly::degree).max().unwrap_or(0)
    }

    /// The coefficient of `t^k` as a dual quaternion.
    pub fn coeff(&self, k: usize) -> DualQuaternion<T> {
        DualQuaternion::from_array(std::array::from_fn(|i| self.polys[i].coeff(k)))
    }

    /// Evaluate at a parameter.
    pub fn evaluate(&self, t: &T) -> DualQuaternion<T> {
        DualQuaternion::from_array(std::array::from_fn(|i| self.polys[i].eval(t)))
    }

    /// The pose at `t = ∞`, i.e. the leading coefficient.
    pub fn evaluate_at_infinity(&self) -> DualQuaternion<T> {
        self.coeff(self.degree())
    }

    /// Substitute `t → 1/t` and clear the denominator, `t^n C(1/t)`.
    pub fn inverse_curve(&self) -> Self {
        let n = self.degree();
        Self { polys: self.polys.clone().map(|p| p.reversed(n)) }
    }

    /// Substitute `t = a + b u`.
    pub fn compose_affine(&self, a: &T, b: &T) -> Self {
        Self { polys: self.polys.clone().map(|p| p.compose_affine(a, b)) }
    }

    /// Conjugate curve `C~(t)`.
    pub fn conjugate(&self) -> Self {
        let mut polys = self.polys.clone();
        for i in [1, 2, 3, 5, 6, 7] {
            polys[i] = -&polys[i];
        }
        Self { polys }
    }

    /// Primal and dual polynomial of the norm `C C~`.
    pub fn norm_polys(&self) -> (Poly<T>, Poly<T>) {
        let [p0, p1, p2, p3, d0, d1, d2, d3] = &self.polys;
        let primal: Poly<T> = [p0, p1, p2, p3].iter().map(|p| *p * *p).sum();
        let dual: Poly<T> = [(p0, d0), (p1, d1), (p2, d2), (p3, d3)]
            .iter()
            .map(|(p, d)| *p * *d)
            .sum();
        (primal, &dual + &dual)
    }

    /// Return true if the curve satisfies the Study condition identically
    /// and is not the zero curve.
    pub fn is_motion(&self) -> bool {
        let (primal, dual) = self.norm_polys();
        let scale = magnitude(primal.coeffs());
        !primal.is_zero() && dual.coeffs().iter().all(|c| c.is_negligible_to(scale))
    }

    /// Return true if the leading coefficient is the identity.
    pub fn is_monic(&self) -> bool {
        let lead = self.evaluate_at_infinity();
        lead == DualQuaternion::identity()
            || (!T::EXACT && (&lead - &DualQuaternion::identity()).is_negligible())
    }

    /// Divide by a scalar so that the leading coefficient becomes the
    /// identity.
    ///
    /// Fails if the leading coefficient is not a nonzero real number.
    pub fn to_monic(&self) -> Result<Self> {
        let lead = self.evaluate_at_infinity();
        if !lead.is_identity() {
            return Err(Error::InvalidInput(format!(
                "leading coefficient {:?} is not real",
                lead.to_f64().to_array()
            )));
        }
        let s = T::one() / lead.p.w;
        Ok(self.scale(&s))
    }

    /// Multiply by a scalar.
    pub fn scale(&self, s: &T) -> Self {
        Self { polys: self.polys.clone().map(|p| p.scale(s)) }
    }

    /// Equality up to a nonzero scale factor.
    pub fn eq_projective(&self, rhs: &Self) -> bool {
        let n = self.degree().max(rhs.degree());
        let flat = |c: &Self| {
            c.polys.iter().flat_map(|p| (0..=n).map(|k| p.coeff(k))).collect::<Vec<_>>()
        };
        proportional(&flat(self), &flat(rhs))
    }

    /// Homogeneous trajectory `[w(t), x(t), y(t), z(t)]` of a point of the
    /// moving body.
    pub fn point_trajectory(&self, x: &[T; 3]) -> [Poly<T>; 4] {
        let q = Quaternion::pure(x.clone());
        let point = DualQuaternion::new(Quaternion::one(), q);
        let eps_conj = Self {
            polys: std::array::from_fn(|i| {
                if i < 4 {
                    self.polys[i].clone()
                } else {
                    -&self.polys[i]
                }
            }),
        };
        let y = &(&eps_conj * &Self::constant(&point)) * &self.conjugate();
        let [w, _, _, _, _, x, y, z] = y.polys;
        [w, x, y, z]
    }

    /// Convert the coefficient type.
    pub fn map<U: Scalar>(&self, f: impl Fn(&T) -> U) -> RationalCurve<U> {
        RationalCurve { polys: std::array::from_fn(|i| self.polys[i].map(&f)) }
    }

    /// Convert to floating point.
    pub fn to_f64(&self) -> RationalCurve<f64> {
        self.map(T::to_f64)
    }
}

impl RationalCurve<f64> {
    /// Evaluate at the homogeneous parameter `t = c / s`, i.e.
    /// `Σ c_k c^k s^(n - k)`. The pose at infinity is `(1, 0)`.
    pub fn evaluate_homogeneous(&self, c: f64, s: f64) -> DualQuaternion {
        let n = self.degree();
        DualQuaternion::from_array(std::array::from_fn(|i| {
            (0..=n)
                .map(|k| self.polys[i].coeff(k) * c.powi(k as i32) * s.powi((n - k) as i32))
                .sum()
        }))
    }

    /// Evaluate, with infinite values mapped to the leading coefficient.
    pub fn pose_at(&self, t: f64) -> DualQuaternion {
        if t.is_infinite() {
            self.evaluate_at_infinity()
        } else {
            self.evaluate(&t)
        }
    }

    /// The 4×4 transformation matrix at a parameter.
    pub fn evaluate_as_matrix(&self, t: f64) -> na::Matrix4<f64> {
        self.pose_at(t).dq2matrix()
    }

    /// Sample the full cycle `t ∈ ℝ ∪ {∞}` with `res` normalized poses,
    /// uniformly in the angle `φ` of `t = cot(φ / 2)`.
    pub fn sample(&self, res: usize) -> Vec<DualQuaternion> {
        (0..res)
            .map(|i| {
                let phi = 2. * PI * i as f64 / res as f64;
                let (s, c) = (phi / 2.).sin_cos();
                self.evaluate_homogeneous(c, s).normalized()
            })
            .collect()
    }

    /// Cartesian trajectory of a point of the moving body over the full
    /// cycle. This is the plot data of the motion.
    pub fn trajectory(&self, x: [f64; 3], res: usize) -> Vec<[f64; 3]> {
        self.sample(res).iter().map(|pose| pose.transform_point(x)).collect()
    }

    /// Length of the closed polyline through `res` sampled poses, with sign
    /// continuity of the normalized Study parameters.
    pub fn path_length(&self, res: usize) -> f64 {
        let poses = self.sample(res.max(2));
        let dist = |a: &DualQuaternion, b: &DualQuaternion| {
            let a = na::SVector::<f64, 8>::from(a.to_array());
            let b = na::SVector::<f64, 8>::from(b.to_array());
            (a - b).norm().min((a + b).norm())
        };
        poses.iter().zip(poses.iter().cycle().skip(1)).map(|(a, b)| dist(a, b)).sum()
    }

    /// Control-point form of the curve.
    ///
    /// With `reparametrize`, the Bezier parameter `u ∈ [0, 1]` maps to
    /// `t = 2u - 1` (the symmetric interval `[-1, 1]`), otherwise to `t = u`.
    pub fn curve2bezier(&self, reparametrize: bool) -> RationalBezier<8> {
        let curve = if reparametrize {
            self.compose_affine(&-1., &2.)
        } else {
            self.clone()
        };
        RationalBezier::from_polys(&curve.polys, self.degree())
    }

    /// Two Bezier pieces covering the full cycle: the curve on `[-1, 1]`
    /// and the inverse curve on `[-1, 1]`.
    pub fn bezier_segments(&self) -> [RationalBezier<8>; 2] {
        [self.curve2bezier(true), self.inverse_curve().curve2bezier(true)]
    }
}

impl<T: Scalar> Mul for &RationalCurve<T> {
    type Output = RationalCurve<T>;

    fn mul(self, rhs: Self) -> Self::Output {
        let [a0, a1, a2, a3, b0, b1, b2, b3] = &self.polys;
        let [c0, c1, c2, c3, e0, e1, e2, e3] = &rhs.polys;
        let qmul = |[a0, a1, a2, a3]: [&Poly<T>; 4], [b0, b1, b2, b3]: [&Poly<T>; 4]| {
            [
                &(&(a0 * b0) - &(a1 * b1)) - &(&(a2 * b2) + &(a3 * b3)),
                &(&(a0 * b1) + &(a1 * b0)) + &(&(a2 * b3) - &(a3 * b2)),
                &(&(a0 * b2) - &(a1 * b3)) + &(&(a2 * b0) + &(a3 * b1)),
                &(&(a0 * b3) + &(a1 * b2)) - &(&(a2 * b1) - &(a3 * b0)),
            ]
        };
        let [p0, p1, p2, p3] = qmul([a0, a1, a2, a3], [c0, c1, c2, c3]);
        let da = qmul([a0, a1, a2, a3], [e0, e1, e2, e3]);
        let db = qmul([b0, b1, b2, b3], [c0, c1, c2, c3]);
        let [d0, d1, d2, d3] = std::array::from_fn(|i| &da[i] + &db[i]);
        RationalCurve { polys: [p0, p1, p2, p3, d0, d1, d2, d3] }
    }
}

impl<T: Scalar> Mul for RationalCurve<T> {
    type Output = RationalCurve<T>;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{int, Rational};

    fn dq(v: [i64; 8]) -> DualQuaternion<Rational> {
        DualQuaternion::from_array(v.map(int))
    }

    #[test]
    fn product_of_factors() {
        let h1 = dq([0, 0, 0, 1, 0, 0, 0, 0]);
        let h2 = dq([0, 0, 0, -2, 0, 0, -2, 0]);
        let c = RationalCurve::from_factors(&[h1.clone(), h2.clone()]);
        assert_eq!(c.degree(), 2);
        assert!(c.is_monic());
        assert!(c.is_motion());
        let rows = [
            [1, 0, 2],
            [0, 0, 0],
            [0, 0, 0],
            [0, 1, 0],
            [0, 0, 0],
            [0, 0, 2],
            [0, 2, 0],
            [0, 0, 0],
        ]
        .map(|r| r.map(int::<Rational>).to_vec());
        assert_eq!(c.coeffs(), rows.to_vec());
        assert_eq!(RationalCurve::from_coeffs(&rows).unwrap(), c);
        // Pointwise product
        let t = int::<Rational>(3);
        let lhs = c.evaluate(&t);
        let rhs = &(&DualQuaternion::real(t.clone()) - &h1) * &(&DualQuaternion::real(t) - &h2);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn invalid_coeffs() {
        let rows = vec![vec![int::<Rational>(1); 3]; 7];
        assert!(matches!(
            RationalCurve::from_coeffs(&rows),
            Err(Error::Dimension { expected: 8, got: 7 })
        ));
        let mut rows = vec![vec![int::<Rational>(1); 3]; 8];
        rows[4].pop();
        assert!(RationalCurve::from_coeffs(&rows).is_err());
    }

    #[test]
    fn inverse_curve_at_zero() {
        let c = RationalCurve::from_factors(&[dq([1, 0, 0, 1, 0, 2, 0, 0])]);
        let inv = c.inverse_curve();
        assert_eq!(inv.evaluate(&int(0)), c.evaluate_at_infinity());
        assert_eq!(inv.inverse_curve(), c);
    }

    #[test]
    fn point_trajectory_matches_action() {
        let c = RationalCurve::from_factors(&[
            dq([0, 0, 0, 1, 0, 0, 0, 0]),
            dq([1, 1, 0, 0, 0, 0, -1, 0]),
        ])
        .to_f64();
        let traj = c.point_trajectory(&[1., 2., 3.]);
        let t = 0.7;
        let w = traj[0].eval(&t);
        let p = [traj[1].eval(&t) / w, traj[2].eval(&t) / w, traj[3].eval(&t) / w];
        let q = c.evaluate(&t).transform_point([1., 2., 3.]);
        for (a, b) in p.iter().zip(q) {
            approx::assert_abs_diff_eq!(*a, b, epsilon = 1e-12);
        }
    }
}
