//! Dual quaternions (Study parameters) and rigid transformations.
use crate::{
    quat::{impl_by_value, Quaternion},
    scalar::{magnitude, proportional, Scalar, EPS},
    Error, Result,
};
use nalgebra as na;
use std::ops::{Add, Mul, Neg, Sub};

/// Tolerance of the leading coefficient when a rotation matrix is converted
/// to a quaternion.
const BRANCH_TOL: f64 = 1e-6;

/// Dual quaternion `p + ε d`, i.e. the 8 Study parameters
/// `[p0, p1, p2, p3, d0, d1, d2, d3]`.
///
/// A dual quaternion represents a rigid motion if the primal part is not zero
/// and the Study condition `p0 d0 + p1 d1 + p2 d2 + p3 d3 = 0` holds. The
/// translation `t` and the rotation quaternion `p` are related by
/// `d = -t p / 2`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DualQuaternion<T = f64> {
    /// Primal part
    pub p: Quaternion<T>,
    /// Dual part
    pub d: Quaternion<T>,
}

/// Type of a dual quaternion.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum DqType {
    /// Not on the Study quadric
    Affine,
    /// Zero primal part (exceptional generator)
    Paul,
    /// Plane `[0, n, c, 0, 0, 0]`
    Plane,
    /// Point `[w, 0, 0, 0, 0, x, y, z]`
    Point,
    /// Line in Plücker coordinates `[0, u, 0, m]`
    Line,
    /// Rotation around a fixed axis
    Rotation,
    /// General rigid motion
    General,
}

impl<T: Scalar> DualQuaternion<T> {
    /// Create from primal and dual parts.
    pub const fn new(p: Quaternion<T>, d: Quaternion<T>) -> Self {
        Self { p, d }
    }

    /// Create from the 8 Study parameters.
    pub fn from_array([p0, p1, p2, p3, d0, d1, d2, d3]: [T; 8]) -> Self {
        Self::new(Quaternion::new(p0, p1, p2, p3), Quaternion::new(d0, d1, d2, d3))
    }

    /// Create from a slice of 8 Study parameters, or 4 rotation parameters.
    pub fn try_from_slice(v: &[T]) -> Result<Self> {
        match v.len() {
            8 => Ok(Self::from_array(std::array::from_fn(|i| v[i].clone()))),
            4 => {
                let p = Quaternion::from_array(std::array::from_fn(|i| v[i].clone()));
                Ok(Self::new(p, Quaternion::zero()))
            }
            got => Err(Error::Dimension { expected: 8, got }),
        }
    }

    /// The identity transformation.
    pub fn identity() -> Self {
        Self::new(Quaternion::one(), Quaternion::zero())
    }

    /// The zero element.
    pub fn zero() -> Self {
        Self::new(Quaternion::zero(), Quaternion::zero())
    }

    /// Real scalar `s` embedded as `s + ε 0`.
    pub fn real(s: T) -> Self {
        Self::new(Quaternion::real(s), Quaternion::zero())
    }

    /// Dual number `a + ε b`.
    pub fn dual_number(a: T, b: T) -> Self {
        Self::new(Quaternion::real(a), Quaternion::real(b))
    }

    /// Rigid motion from a rotation quaternion and a translation vector.
    ///
    /// The rotation quaternion does not need to be normalized.
    pub fn from_rotation_translation(p: Quaternion<T>, t: [T; 3]) -> Self {
        let d = (&Quaternion::pure(t) * &p).scale(&-T::one().half());
        Self::new(p, d)
    }

    /// Pure translation.
    pub fn translation(t: [T; 3]) -> Self {
        Self::from_rotation_translation(Quaternion::one(), t)
    }

    /// The Study parameters.
    pub fn to_array(&self) -> [T; 8] {
        let [p0, p1, p2, p3] = self.p.to_array();
        let [d0, d1, d2, d3] = self.d.to_array();
        [p0, p1, p2, p3, d0, d1, d2, d3]
    }

    /// Return true if the coordinates are exact rationals.
    pub fn is_rational(&self) -> bool {
        T::EXACT
    }

    /// Quaternion conjugate of both parts.
    pub fn conjugate(&self) -> Self {
        Self::new(self.p.conjugate(), self.d.conjugate())
    }

    /// Negate the dual part.
    pub fn eps_conjugate(&self) -> Self {
        Self::new(self.p.clone(), -&self.d)
    }

    /// Norm `σ σ~`, a dual number `[p p~, 0, 0, 0, p d~ + d p~, 0, 0, 0]`.
    pub fn norm(&self) -> Self {
        let (a, b) = self.norm_parts();
        Self::dual_number(a, b)
    }

    /// Primal and dual parts of the norm.
    pub fn norm_parts(&self) -> (T, T) {
        let b = self.p.dot(&self.d);
        (self.p.norm(), b.clone() + b)
    }

    /// The Study condition value `p · d`; zero for rigid motions.
    pub fn study_value(&self) -> T {
        self.p.dot(&self.d)
    }

    /// Symmetric bilinear form of the Study quadric,
    /// `B(a, b) = a.p · b.d + a.d · b.p`, with `B(a, a) = 2 a.p · a.d`.
    pub fn study_form(&self, rhs: &Self) -> T {
        self.p.dot(&rhs.d) + self.d.dot(&rhs.p)
    }

    /// Return true if the Study condition holds within tolerance.
    pub fn satisfies_study(&self) -> bool {
        let v = self.study_value();
        if T::EXACT {
            v.is_negligible()
        } else {
            let scale = self.p.norm().to_f64().max(self.d.norm().to_f64()).max(1.);
            v.to_f64().abs() <= EPS * scale
        }
    }

    /// Inverse through the norm. Returns `None` if the primal part is zero.
    pub fn inv(&self) -> Option<Self> {
        let (a, b) = self.norm_parts();
        if a.is_negligible() {
            return None;
        }
        // (a + ε b)^-1 = 1/a - ε b/a^2
        let ia = T::one() / a;
        let n_inv = Self::dual_number(ia.clone(), -(b * ia.clone() * ia));
        Some(&self.conjugate() * &n_inv)
    }

    /// Multiply by a scalar.
    pub fn scale(&self, s: &T) -> Self {
        Self::new(self.p.scale(s), self.d.scale(s))
    }

    /// Return true if every parameter is negligible.
    pub fn is_negligible(&self) -> bool {
        self.p.is_negligible() && self.d.is_negligible()
    }

    /// Return true if it equals the identity up to a nonzero scale.
    ///
    /// The other parameters are compared with the scalar part.
    pub fn is_identity(&self) -> bool {
        let w = self.p.w.to_f64().abs();
        let [_, rest @ ..] = self.to_array();
        !self.p.w.is_zero() && rest.iter().all(|v| v.is_negligible_to(w))
    }

    /// Divide by the magnitude of the largest parameter.
    ///
    /// The result is the same motion with parameters in `[-1, 1]`; the zero
    /// element is returned as it is.
    pub fn rescaled(&self) -> Self {
        let m = magnitude(&self.to_array());
        if m == 0. || !m.is_finite() {
            return self.clone();
        }
        let max = self
            .to_array()
            .into_iter()
            .find(|v| v.to_f64().abs() == m)
            .map_or_else(T::one, |v| v.abs());
        self.scale(&(T::one() / max))
    }

    /// Convert the component type.
    pub fn map<U: Scalar>(&self, f: impl Fn(&T) -> U) -> DualQuaternion<U> {
        DualQuaternion::new(self.p.map(&f), self.d.map(&f))
    }

    /// Convert to floating point.
    pub fn to_f64(&self) -> DualQuaternion<f64> {
        self.map(T::to_f64)
    }

    /// Classify the element. See [`DqType`] for the tested conditions.
    ///
    /// A violated Study condition is reported as a warning and classified
    /// as [`DqType::Affine`].
    pub fn dq_type(&self) -> DqType {
        let (p, d) = (&self.p, &self.d);
        if p.is_negligible() {
            return DqType::Paul;
        }
        if p.is_real() && d.is_pure() {
            return DqType::Point;
        }
        if p.is_pure() && d.is_real() {
            return DqType::Plane;
        }
        let pv = Quaternion::pure(p.vector());
        let dv = Quaternion::pure(d.vector());
        if p.is_pure() && d.is_pure() && pv.dot(&dv).is_negligible() {
            return DqType::Line;
        }
        if !self.satisfies_study() {
            log::warn!("Study condition violated: p·d = {}", self.study_value().to_f64());
            return DqType::Affine;
        }
        if d.w.is_negligible() && !p.is_real() {
            DqType::Rotation
        } else {
            DqType::General
        }
    }

    /// Equality up to a nonzero scale factor (including sign).
    pub fn eq_projective(&self, rhs: &Self) -> bool {
        proportional(&self.to_array(), &rhs.to_array())
    }
}

impl DualQuaternion<f64> {
    /// Rotation around the axis through `point` along `dir` by `angle`.
    pub fn rotation(point: [f64; 3], dir: [f64; 3], angle: f64) -> Self {
        let dir = na::Vector3::from(dir).normalize();
        let (s, c) = (angle / 2.).sin_cos();
        let r = Self::new(Quaternion::new(c, s * dir.x, s * dir.y, s * dir.z), Quaternion::zero());
        let t = Self::translation(point);
        let t_inv = Self::translation(point.map(|x| -x));
        &(&t * &r) * &t_inv
    }

    /// Normalize to a unit primal part with non-negative scalar part.
    pub fn normalized(&self) -> Self {
        let n = self.p.norm().sqrt();
        if n < EPS {
            return self.clone();
        }
        let s = if self.p.w < 0. { -n.recip() } else { n.recip() };
        self.scale(&s)
    }

    /// Rotation matrix of the primal part.
    pub fn rotation_matrix(&self) -> na::Matrix3<f64> {
        let Quaternion { w, x, y, z } = self.p;
        let n = self.p.norm();
        na::Matrix3::new(
            w * w + x * x - y * y - z * z,
            2. * (x * y - w * z),
            2. * (x * z + w * y),
            2. * (x * y + w * z),
            w * w - x * x + y * y - z * z,
            2. * (y * z - w * x),
            2. * (x * z - w * y),
            2. * (y * z + w * x),
            w * w - x * x - y * y + z * z,
        ) / n
    }

    /// Translation vector `2 Vec(p d~) / |p|^2`.
    pub fn translation_vector(&self) -> na::Vector3<f64> {
        let pd = &self.p * &self.d.conjugate();
        na::Vector3::new(pd.x, pd.y, pd.z) * (2. / self.p.norm())
    }

    /// Convert to a 4×4 homogeneous transformation matrix.
    pub fn dq2matrix(&self) -> na::Matrix4<f64> {
        let mut m = self.rotation_matrix().to_homogeneous();
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation_vector());
        m
    }

    /// Convert a 4×4 homogeneous transformation matrix to a dual quaternion
    /// with unit primal part.
    ///
    /// Non-rotation matrices are accepted with a warning.
    pub fn matrix2dq(m: &na::Matrix4<f64>) -> Self {
        let r = m.fixed_view::<3, 3>(0, 0).into_owned();
        let t = m.fixed_view::<3, 1>(0, 3).into_owned();
        let orth = (r.transpose() * r - na::Matrix3::identity()).norm();
        if orth > 1e-6 || (r.determinant() - 1.).abs() > 1e-6 {
            log::warn!("not a rotation matrix: |RᵀR - I| = {orth:e}, det = {}", r.determinant());
        }
        let e = |i: usize, j: usize| r[(i, j)];
        let candidates = [
            [
                1. + e(0, 0) + e(1, 1) + e(2, 2),
                e(2, 1) - e(1, 2),
                e(0, 2) - e(2, 0),
                e(1, 0) - e(0, 1),
            ],
            [
                e(2, 1) - e(1, 2),
                1. + e(0, 0) - e(1, 1) - e(2, 2),
                e(0, 1) + e(1, 0),
                e(0, 2) + e(2, 0),
            ],
            [
                e(0, 2) - e(2, 0),
                e(0, 1) + e(1, 0),
                1. - e(0, 0) + e(1, 1) - e(2, 2),
                e(1, 2) + e(2, 1),
            ],
            [
                e(1, 0) - e(0, 1),
                e(0, 2) + e(2, 0),
                e(1, 2) + e(2, 1),
                1. - e(0, 0) - e(1, 1) + e(2, 2),
            ],
        ];
        let p = candidates
            .iter()
            .enumerate()
            .find(|(i, c)| c[*i] > BRANCH_TOL)
            .map(|(_, c)| *c)
            .unwrap_or([1., 0., 0., 0.]);
        let p = Quaternion::from_array(p);
        let p = p.scale(&p.norm().sqrt().recip());
        Self::from_rotation_translation(p, [t.x, t.y, t.z])
    }

    /// Transform a Cartesian point.
    pub fn transform_point(&self, x: [f64; 3]) -> [f64; 3] {
        let v = self.rotation_matrix() * na::Vector3::from(x) + self.translation_vector();
        [v.x, v.y, v.z]
    }
}

impl<T: Scalar> Add for &DualQuaternion<T> {
    type Output = DualQuaternion<T>;

    fn add(self, rhs: Self) -> Self::Output {
        DualQuaternion::new(&self.p + &rhs.p, &self.d + &rhs.d)
    }
}

impl<T: Scalar> Sub for &DualQuaternion<T> {
    type Output = DualQuaternion<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        DualQuaternion::new(&self.p - &rhs.p, &self.d - &rhs.d)
    }
}

impl<T: Scalar> Mul for &DualQuaternion<T> {
    type Output = DualQuaternion<T>;

    // (p1 + ε d1)(p2 + ε d2) = p1 p2 + ε (p1 d2 + d1 p2)
    fn mul(self, rhs: Self) -> Self::Output {
        let p = &self.p * &rhs.p;
        let d = &(&self.p * &rhs.d) + &(&self.d * &rhs.p);
        DualQuaternion::new(p, d)
    }
}

impl<T: Scalar> Neg for &DualQuaternion<T> {
    type Output = DualQuaternion<T>;

    fn neg(self) -> Self::Output {
        DualQuaternion::new(-&self.p, -&self.d)
    }
}

impl_by_value!(DualQuaternion, Add, add; Sub, sub; Mul, mul);

impl<T: Scalar> Neg for DualQuaternion<T> {
    type Output = DualQuaternion<T>;

    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<T: Scalar> TryFrom<Vec<T>> for DualQuaternion<T> {
    type Error = Error;

    fn try_from(v: Vec<T>) -> Result<Self> {
        Self::try_from_slice(&v)
    }
}

impl<T: Scalar> From<[T; 8]> for DualQuaternion<T> {
    fn from(v: [T; 8]) -> Self {
        Self::from_array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_order() {
        #[rustfmt::skip]
        let table = [
            ([0., 0., 0., 0., 1., 2., 3., 4.], DqType::Paul),
            ([2., 0., 0., 0., 0., 1., 2., 3.], DqType::Point),
            ([0., 1., 0., 0., 2., 0., 0., 0.], DqType::Plane),
            ([0., 0., 0., 1., 0., 0., -2., 0.], DqType::Line),
            // Pure parts that are not perpendicular
            ([0., 0., 0., 1., 0., 0., 0., 1.], DqType::Affine),
            ([1., 1., 0., 0., 1., 0., 0., 0.], DqType::Affine),
            ([1., 0., 0., 1., 0., 1., 0., 0.], DqType::Rotation),
            ([1., 0., 0., 1., 1., 0., 0., -1.], DqType::General),
        ];
        for (v, ty) in table {
            assert_eq!(DualQuaternion::from_array(v).dq_type(), ty, "{v:?}");
        }
        let rot = DualQuaternion::rotation([1., 2., 0.], [0., 0., 1.], 0.7);
        assert_eq!(rot.dq_type(), DqType::Rotation);
        let screw = &DualQuaternion::translation([0., 0., 1.]) * &rot;
        assert_eq!(screw.dq_type(), DqType::General);
    }

    #[test]
    fn half_turns() {
        let axes = [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.], [1., 1., 0.], [0., -1., 1.]];
        for dir in axes {
            let pose = &DualQuaternion::translation([0.5, -1., 2.])
                * &DualQuaternion::rotation([1., 2., 3.], dir, std::f64::consts::PI);
            let back = DualQuaternion::matrix2dq(&pose.dq2matrix());
            assert!(back.eq_projective(&pose), "{dir:?}: {back:?} != {pose:?}");
            assert!(back.satisfies_study());
        }
    }

    #[test]
    fn identity_at_any_scale() {
        for s in [1e-12, 1e-6, 1., 1e8] {
            let id = DualQuaternion::identity().scale(&s);
            assert!(id.is_identity(), "{s}");
            assert!((id.rescaled().p.w - 1.).abs() < 1e-15);
        }
        let near = DualQuaternion::from_array([1e-6, 0., 0., 1e-9, 0., 0., 0., 0.]);
        assert!(!near.is_identity());
        assert!(!DualQuaternion::<f64>::zero().is_identity());
        let p = DualQuaternion::from_array([1., -4., 0., 0., 2., 0.5, 0., 0.]).scale(&-1e-7);
        let expect = [-0.25, 1., 0., 0., -0.5, -0.125, 0., 0.];
        for (a, b) in p.rescaled().to_array().into_iter().zip(expect) {
            approx::assert_abs_diff_eq!(a, b, epsilon = 1e-15);
        }
    }
}
