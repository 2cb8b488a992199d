//! Factorization of motion polynomials into revolute joints.
//!
//! A monic motion polynomial `C(t)` of degree `n` with a generic norm splits
//! into linear factors `C = (t - h_1)(t - h_2)...(t - h_n)`, where each
//! `h_i` is a rotation generator. The order of the quadratic factors of the
//! norm `C C~` decides the factorization, so two orders give two open chains
//! with the same end-effector motion, which close a linkage.
use crate::{
    curve::RationalCurve,
    dq::DualQuaternion,
    geometry::NormalizedLine,
    poly::Poly,
    scalar::{Scalar, EPS},
    Error, Result,
};
use std::f64::consts::TAU;

/// Splits the norm polynomial of a motion into monic quadratic factors.
///
/// The factors must be ordered and their product must equal the norm. Any
/// closure `Fn(&Poly<T>) -> Result<Vec<Poly<T>>>` is an oracle.
pub trait FactorOracle<T> {
    /// Factorize the norm polynomial.
    fn factor(&self, norm: &Poly<T>) -> Result<Vec<Poly<T>>>;
}

impl<T, F> FactorOracle<T> for F
where
    F: Fn(&Poly<T>) -> Result<Vec<Poly<T>>>,
{
    fn factor(&self, norm: &Poly<T>) -> Result<Vec<Poly<T>>> {
        self(norm)
    }
}

/// Oracle by the complex roots of the norm.
///
/// Each conjugate pair `z, z*` forms the factor `t² - 2 Re(z) t + |z|²`, and
/// the factors are sorted by the roots. Exact scalars accept the factors only
/// if the rationalized coefficients reproduce the norm.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumericOracle;

impl<T: Scalar> FactorOracle<T> for NumericOracle {
    fn factor(&self, norm: &Poly<T>) -> Result<Vec<Poly<T>>> {
        let f = norm.to_f64().trimmed();
        let deg = f.degree().unwrap_or(0);
        if deg == 0 || deg % 2 != 0 {
            return Err(Error::Factorization(format!("norm of odd degree {deg}")));
        }
        let mut pairs = f
            .complex_roots()
            .into_iter()
            .filter(|z| z.im > 1e-9 * z.norm().max(1.))
            .collect::<Vec<_>>();
        if pairs.len() * 2 != deg {
            return Err(Error::Factorization("the norm has real roots".to_string()));
        }
        pairs.sort_unstable_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
        let factors = pairs
            .iter()
            .map(|z| {
                Poly::new(vec![T::approx_f64(z.norm_sqr()), T::approx_f64(-2. * z.re), T::one()])
            })
            .collect::<Vec<_>>();
        if T::EXACT {
            let prod = factors.iter().fold(Poly::constant(norm.leading()), |acc, m| &acc * m);
            if &prod != norm {
                return Err(Error::Factorization(
                    "the norm has no rational quadratic factors".to_string(),
                ));
            }
        }
        Ok(factors)
    }
}

/// Factorize a motion into two chains of revolute joints.
///
/// The first chain uses the order of the oracle, and the second one rotates
/// it by one place. The curve is made monic first.
pub fn factorize<T, O>(curve: &RationalCurve<T>, oracle: &O) -> Result<[MotionFactorization<T>; 2]>
where
    T: Scalar,
    O: FactorOracle<T> + ?Sized,
{
    let curve = curve.to_monic().map_err(|e| Error::Factorization(e.to_string()))?;
    if !curve.is_motion() {
        return Err(Error::Factorization("not a motion polynomial".to_string()));
    }
    let n = curve.degree();
    if n == 0 {
        return Err(Error::Factorization("constant curve".to_string()));
    }
    let (norm, _) = curve.norm_polys();
    let factors = oracle.factor(&norm)?;
    if factors.len() != n {
        return Err(Error::Factorization(format!(
            "expected {n} norm factors, got {}",
            factors.len()
        )));
    }
    let mut rotated = factors.clone();
    rotated.rotate_left(1);
    let a = MotionFactorization::new(peel(&curve, &factors)?)?;
    let b = MotionFactorization::new(peel(&curve, &rotated)?)?;
    for f in [&a, &b] {
        if !f.curve.eq_projective(&curve) {
            return Err(Error::Mismatch("the factors do not reproduce the curve".to_string()));
        }
    }
    Ok([a, b])
}

// Split off right factors in the reverse order of the norm factors
fn peel<T: Scalar>(
    curve: &RationalCurve<T>,
    factors: &[Poly<T>],
) -> Result<Vec<DualQuaternion<T>>> {
    let mut c = curve.clone();
    let mut axes = Vec::with_capacity(factors.len());
    for m in factors.iter().rev() {
        let rem = c
            .polys()
            .iter()
            .map(|p| p.div_rem(m).map(|(_, r)| r))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::Factorization("zero norm factor".to_string()))?;
        let r0 = DualQuaternion::from_array(std::array::from_fn(|i| rem[i].coeff(0)));
        let r1 = DualQuaternion::from_array(std::array::from_fn(|i| rem[i].coeff(1)));
        // The unique zero of r1 t + r0
        let h = -(&r1
            .inv()
            .ok_or_else(|| Error::Factorization("non-generic remainder".to_string()))?
            * &r0);
        c = divide_right(&c, &h)?;
        axes.push(h);
    }
    axes.reverse();
    Ok(axes)
}

// Quotient Q of C = Q (t - h)
fn divide_right<T: Scalar>(
    c: &RationalCurve<T>,
    h: &DualQuaternion<T>,
) -> Result<RationalCurve<T>> {
    let n = c.degree();
    let mut q = vec![DualQuaternion::zero(); n];
    q[n - 1] = c.coeff(n);
    for k in (1..n).rev() {
        q[k - 1] = &c.coeff(k) + &(&q[k] * h);
    }
    let rem = &c.coeff(0) + &(&q[0] * h);
    let exact = if T::EXACT {
        rem.is_negligible()
    } else {
        let scale = (0..=n)
            .flat_map(|k| c.coeff(k).to_array())
            .fold(1f64, |m, v| m.max(v.to_f64().abs()));
        rem.to_array().iter().all(|v| v.to_f64().abs() <= 1e-6 * scale)
    };
    if !exact {
        return Err(Error::Factorization("nonzero remainder of a linear factor".to_string()));
    }
    Ok(RationalCurve::from_dq_coeffs(&q))
}

/// An open chain of revolute joints, `C = (t - h_1)...(t - h_n)`.
///
/// The axes are in the home configuration `t = ∞`. Connection points mark
/// where the neighboring links attach to each joint axis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MotionFactorization<T = f64> {
    axes: Vec<DualQuaternion<T>>,
    curve: RationalCurve<T>,
    points: Option<Vec<[[f64; 3]; 2]>>,
}

impl<T: Scalar> MotionFactorization<T> {
    /// Create from the rotation generators, ordered from the base.
    pub fn new(axes: Vec<DualQuaternion<T>>) -> Result<Self> {
        if axes.is_empty() {
            return Err(Error::InvalidInput("no joint axis".to_string()));
        }
        let curve = RationalCurve::from_factors(&axes);
        Ok(Self { axes, curve, points: None })
    }

    /// Set the connection points, a pair for each joint.
    pub fn with_connection_points(self, points: Vec<[[f64; 3]; 2]>) -> Result<Self> {
        if points.len() != self.axes.len() {
            return Err(Error::Dimension { expected: self.axes.len(), got: points.len() });
        }
        Ok(Self { points: Some(points), ..self })
    }

    /// Rotation generators.
    pub fn axes(&self) -> &[DualQuaternion<T>] {
        &self.axes
    }

    /// Product of the linear factors.
    pub fn curve(&self) -> &RationalCurve<T> {
        &self.curve
    }

    /// Number of joints.
    pub fn joint_num(&self) -> usize {
        self.axes.len()
    }

    /// Product of the first `i` linear factors, which moves the `i`-th
    /// joint.
    pub fn partial_curve(&self, i: usize) -> RationalCurve<T> {
        RationalCurve::from_factors(&self.axes[..i.min(self.axes.len())])
    }

    /// Convert to floating point.
    pub fn to_f64(&self) -> MotionFactorization<f64> {
        MotionFactorization {
            axes: self.axes.iter().map(DualQuaternion::to_f64).collect(),
            curve: self.curve.to_f64(),
            points: self.points.clone(),
        }
    }
}

impl MotionFactorization<f64> {
    /// Joint axes as lines.
    pub fn lines(&self) -> Result<Vec<NormalizedLine>> {
        self.axes.iter().map(NormalizedLine::from_dq).collect()
    }

    /// Connection points, defaults to the foot of each axis and the point
    /// one unit along it.
    pub fn connection_points(&self) -> Result<Vec<[[f64; 3]; 2]>> {
        if let Some(points) = &self.points {
            return Ok(points.clone());
        }
        self.lines()?
            .iter()
            .map(|l| {
                let a = l.point();
                Ok([a.into(), (a + l.direction()).into()])
            })
            .collect()
    }

    /// Parameter of the rotation angle of the first joint.
    ///
    /// The angle is measured from the home configuration, so a zero angle
    /// gives `t = ∞`.
    pub fn joint_angle_to_t_param(&self, angle: f64) -> Result<f64> {
        let (w, v) = self.first_axis()?;
        let angle = angle.rem_euclid(TAU);
        if angle < EPS || TAU - angle < EPS {
            return Ok(f64::INFINITY);
        }
        Ok(v / (angle / 2.).tan() + w)
    }

    /// Rotation angle of the first joint in `[0, 2π)` at a parameter.
    pub fn t_param_to_joint_angle(&self, t: f64) -> Result<f64> {
        let (w, v) = self.first_axis()?;
        if t.is_infinite() {
            return Ok(0.);
        }
        Ok((2. * v.atan2(t - w)).rem_euclid(TAU))
    }

    // Real part and length of the vector part of the first generator
    fn first_axis(&self) -> Result<(f64, f64)> {
        let h = &self.axes[0];
        let v = h.p.vector().iter().map(|x| x * x).sum::<f64>().sqrt();
        if v < EPS {
            return Err(Error::InvalidInput("the first joint is not a rotation".to_string()));
        }
        Ok((h.p.w, v))
    }

    /// Poses of the links at a parameter: link `i` is moved by the product of
    /// the first `i + 1` factors.
    pub fn direct_kinematics(&self, t: f64) -> Vec<DualQuaternion> {
        if t.is_infinite() {
            return vec![DualQuaternion::identity(); self.axes.len()];
        }
        let tt = DualQuaternion::real(t);
        self.axes
            .iter()
            .scan(DualQuaternion::identity(), |acc, h| {
                *acc = &*acc * &(&tt - h);
                Some(acc.normalized())
            })
            .collect()
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
    fn exact_factorization_of_a_quadratic() {
        let h1 = dq([0, 0, 0, 1, 0, 0, 0, 0]);
        let h2 = dq([0, 0, 0, -2, 0, 0, -2, 0]);
        let curve = RationalCurve::from_factors(&[h1.clone(), h2.clone()]);
        let [a, b] = factorize(&curve, &NumericOracle).unwrap();
        assert_eq!(a.axes(), &[h1, h2]);
        assert_eq!(b.curve(), &curve);
        assert_eq!(b.joint_num(), 2);
        // The other branch rotates about the norms in the other order
        let (n0, _) = RationalCurve::linear_factor(&b.axes()[0]).norm_polys();
        assert_eq!(n0, Poly::new(vec![int(4), int(0), int(1)]));
    }

    #[test]
    fn stub_oracle() {
        let h1 = dq([0, 0, 0, 1, 0, 0, 0, 0]);
        let h2 = dq([0, 0, 0, -2, 0, 0, -2, 0]);
        let curve = RationalCurve::from_factors(&[h1, h2]);
        let oracle = |_: &Poly<Rational>| -> Result<Vec<Poly<Rational>>> {
            Ok(vec![Poly::new(vec![int(1), int(0), int(1)])])
        };
        assert!(matches!(factorize(&curve, &oracle), Err(Error::Factorization(_))));
        let oracle = |_: &Poly<Rational>| -> Result<Vec<Poly<Rational>>> {
            Ok(vec![
                Poly::new(vec![int(4), int(0), int(1)]),
                Poly::new(vec![int(1), int(0), int(1)]),
            ])
        };
        // The same curve through the other pair of pivots
        let [a, _] = factorize(&curve, &oracle).unwrap();
        assert_eq!(a.axes(), &[dq([0, 0, 0, -2, 0, 0, -6, 0]), dq([0, 0, 0, 1, 0, 0, 4, 0])]);
    }

    #[test]
    fn joint_angle_and_parameter() {
        let f = MotionFactorization::new(vec![DualQuaternion::from_array([
            0.5, 0., 0., 2., 0., 0., 0., 0.,
        ])])
        .unwrap();
        for angle in [0.3, 1.5, 3.5, 6.] {
            let t = f.joint_angle_to_t_param(angle).unwrap();
            let back = f.t_param_to_joint_angle(t).unwrap();
            approx::assert_abs_diff_eq!(back, angle, epsilon = 1e-12);
        }
        assert_eq!(f.joint_angle_to_t_param(TAU).unwrap(), f64::INFINITY);
        assert_eq!(f.t_param_to_joint_angle(f64::INFINITY).unwrap(), 0.);
        assert_eq!(f.connection_points().unwrap(), vec![[[0.; 3], [0., 0., 1.]]]);
    }
}
