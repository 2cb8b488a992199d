//! Geometric entities acted on by rigid motions.
use crate::{dq::DualQuaternion, quat::Quaternion, Error, Result};
use nalgebra as na;

const TOL: f64 = 1e-9;

/// Point in homogeneous coordinates `[w, x, y, z]`.
///
/// A zero weight `w` means a point at infinity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointHomogeneous(pub [f64; 4]);

impl PointHomogeneous {
    /// Create from a Cartesian point.
    pub const fn from_cartesian([x, y, z]: [f64; 3]) -> Self {
        Self([1., x, y, z])
    }

    /// Return true if the point is at infinity.
    pub fn is_at_infinity(&self) -> bool {
        self.0[0].abs() < TOL
    }

    /// Cartesian coordinates, or `None` at infinity.
    pub fn cartesian(&self) -> Option<[f64; 3]> {
        let [w, x, y, z] = self.0;
        (!self.is_at_infinity()).then(|| [x / w, y / w, z / w])
    }

    /// Embedding `w + ε (x i + y j + z k)`.
    pub fn to_dq(&self) -> DualQuaternion {
        let [w, x, y, z] = self.0;
        DualQuaternion::new(Quaternion::real(w), Quaternion::new(0., x, y, z))
    }
}

/// Line in normalized Plücker coordinates.
///
/// The direction is a unit vector and the moment is `a × dir` for any point
/// `a` on the line.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedLine {
    /// Unit direction
    pub dir: [f64; 3],
    /// Moment
    pub moment: [f64; 3],
}

impl NormalizedLine {
    /// Line through a point with a direction.
    pub fn from_point_dir(point: [f64; 3], dir: [f64; 3]) -> Result<Self> {
        let u = na::Vector3::from(dir);
        let n = u.norm();
        if n < TOL {
            return Err(Error::InvalidInput("zero line direction".to_string()));
        }
        let u = u / n;
        let m = na::Vector3::from(point).cross(&u);
        Ok(Self { dir: u.into(), moment: m.into() })
    }

    /// Line through two distinct points.
    pub fn from_two_points(a: [f64; 3], b: [f64; 3]) -> Result<Self> {
        let dir = (na::Vector3::from(b) - na::Vector3::from(a)).into();
        Self::from_point_dir(a, dir)
    }

    /// Promote the axis of a rotation generator `h = h0 + u - ε m`.
    ///
    /// Fails if the primal vector part vanishes, i.e. the generator is not a
    /// rotation.
    pub fn from_dq(h: &DualQuaternion) -> Result<Self> {
        let u = na::Vector3::from(h.p.vector());
        let n = u.norm();
        if n < TOL {
            return Err(Error::InvalidInput(format!("{h:?} has no rotation axis")));
        }
        let m = -na::Vector3::from(h.d.vector()) / n;
        Ok(Self { dir: (u / n).into(), moment: m.into() })
    }

    /// The pure generator `u - ε m`.
    pub fn to_dq(&self) -> DualQuaternion {
        let [mx, my, mz] = self.moment;
        DualQuaternion::new(Quaternion::pure(self.dir), Quaternion::new(0., -mx, -my, -mz))
    }

    /// Direction vector.
    pub fn direction(&self) -> na::Vector3<f64> {
        na::Vector3::from(self.dir)
    }

    /// The point of the line nearest to the origin.
    pub fn point(&self) -> na::Vector3<f64> {
        self.direction().cross(&na::Vector3::from(self.moment))
    }

    /// Reciprocal product `u1 · m2 + u2 · m1`, zero iff the lines are
    /// coplanar.
    pub fn reciprocal_product(&self, rhs: &Self) -> f64 {
        self.direction().dot(&na::Vector3::from(rhs.moment))
            + rhs.direction().dot(&na::Vector3::from(self.moment))
    }

    /// Orthogonal projection of a point onto the line.
    pub fn project(&self, p: &na::Vector3<f64>) -> na::Vector3<f64> {
        let u = self.direction();
        let a = self.point();
        a + u * (p - a).dot(&u)
    }

    /// Distance to another line.
    pub fn distance(&self, rhs: &Self) -> f64 {
        let n = self.direction().cross(&rhs.direction());
        let nn = n.norm();
        if nn < TOL {
            (rhs.point() - self.project(&rhs.point())).norm()
        } else {
            self.reciprocal_product(rhs).abs() / nn
        }
    }

    /// Feet of the common normal, `None` for parallel lines.
    pub fn common_normal(&self, rhs: &Self) -> Option<(na::Vector3<f64>, na::Vector3<f64>)> {
        let (u1, u2) = (self.direction(), rhs.direction());
        let n = u1.cross(&u2);
        let nn = n.norm_squared();
        if nn < TOL * TOL {
            return None;
        }
        let (a1, a2) = (self.point(), rhs.point());
        let w = a2 - a1;
        let s = w.cross(&u2).dot(&n) / nn;
        let r = w.cross(&u1).dot(&n) / nn;
        Some((a1 + u1 * s, a2 + u2 * r))
    }
}

/// Plane `n · x + c = 0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Normal vector
    pub normal: [f64; 3],
    /// Offset
    pub offset: f64,
}

impl Plane {
    /// Plane through a point with a normal.
    pub fn from_point_normal(point: [f64; 3], normal: [f64; 3]) -> Self {
        let offset = -na::Vector3::from(point).dot(&na::Vector3::from(normal));
        Self { normal, offset }
    }

    /// Signed value `n · x + c`.
    pub fn eval(&self, x: [f64; 3]) -> f64 {
        na::Vector3::from(self.normal).dot(&na::Vector3::from(x)) + self.offset
    }
}

/// Objects that a rigid motion can act on.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum GeometricObject {
    /// Point
    Point(PointHomogeneous),
    /// Line
    Line(NormalizedLine),
    /// Plane
    Plane(Plane),
    /// Rotation generator, acted on as its axis line
    Axis(DualQuaternion),
}

impl DualQuaternion<f64> {
    /// Apply the rigid motion to an object.
    ///
    /// Points map by `σ_ε X σ~`, lines by `σ L σ~`, and planes through the
    /// transformation matrix. An axis is promoted to its line first.
    pub fn act(&self, obj: &GeometricObject) -> Result<GeometricObject> {
        if self.p.norm() < TOL {
            return Err(Error::InvalidInput("motion with zero primal part".to_string()));
        }
        Ok(match obj {
            GeometricObject::Point(x) => GeometricObject::Point(self.map_point(x)),
            GeometricObject::Line(l) => GeometricObject::Line(self.map_line(l)?),
            GeometricObject::Plane(pl) => GeometricObject::Plane(self.map_plane(pl)),
            GeometricObject::Axis(h) => {
                GeometricObject::Line(self.map_line(&NormalizedLine::from_dq(h)?)?)
            }
        })
    }

    /// Apply the rigid motion to a Cartesian point.
    pub fn act_point(&self, x: [f64; 3]) -> Result<[f64; 3]> {
        self.map_point(&PointHomogeneous::from_cartesian(x))
            .cartesian()
            .ok_or_else(|| Error::InvalidInput("point mapped to infinity".to_string()))
    }

    /// Apply the rigid motion to a line.
    pub fn act_line(&self, l: &NormalizedLine) -> Result<NormalizedLine> {
        self.map_line(l)
    }

    fn map_point(&self, x: &PointHomogeneous) -> PointHomogeneous {
        let y = &(&self.eps_conjugate() * &x.to_dq()) * &self.conjugate();
        let [_, dx, dy, dz] = y.d.to_array();
        PointHomogeneous([y.p.w, dx, dy, dz])
    }

    fn map_line(&self, l: &NormalizedLine) -> Result<NormalizedLine> {
        NormalizedLine::from_dq(&(&(self * &l.to_dq()) * &self.conjugate()))
    }

    fn map_plane(&self, pl: &Plane) -> Plane {
        let normal = self.rotation_matrix() * na::Vector3::from(pl.normal);
        let offset = pl.offset - normal.dot(&self.translation_vector());
        Plane { normal: normal.into(), offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn act_on_objects() {
        // Quarter turn about the z-axis through (1, 0, 0)
        let m = DualQuaternion::rotation([1., 0., 0.], [0., 0., 1.], FRAC_PI_2);
        let p = m.act_point([2., 0., 5.]).unwrap();
        assert_abs_diff_eq!(na::Vector3::from(p), na::Vector3::new(1., 1., 5.), epsilon = 1e-12);
        assert_abs_diff_eq!(
            na::Vector3::from(m.transform_point([2., 0., 5.])),
            na::Vector3::from(p),
            epsilon = 1e-12
        );

        let l = NormalizedLine::from_point_dir([2., 0., 0.], [0., 0., 1.]).unwrap();
        let l2 = m.act_line(&l).unwrap();
        let expect = NormalizedLine::from_point_dir([1., 1., 0.], [0., 0., 1.]).unwrap();
        assert_abs_diff_eq!(l2.direction(), expect.direction(), epsilon = 1e-12);
        assert_abs_diff_eq!(l2.point(), expect.point(), epsilon = 1e-12);

        let pl = Plane::from_point_normal([2., 0., 0.], [1., 0., 0.]);
        let GeometricObject::Plane(pl2) = m.act(&GeometricObject::Plane(pl)).unwrap() else {
            panic!("plane expected");
        };
        assert_abs_diff_eq!(pl2.eval([1., 1., 3.]), 0., epsilon = 1e-12);

        // An axis acts as its line
        let GeometricObject::Line(l3) = m.act(&GeometricObject::Axis(l.to_dq())).unwrap() else {
            panic!("line expected");
        };
        assert_abs_diff_eq!(l3.point(), l2.point(), epsilon = 1e-12);
    }

    #[test]
    fn line_distance() {
        let a = NormalizedLine::from_point_dir([0., 0., 0.], [1., 0., 0.]).unwrap();
        let b = NormalizedLine::from_point_dir([0., 0., 2.], [0., 1., 0.]).unwrap();
        assert_abs_diff_eq!(a.distance(&b), 2., epsilon = 1e-12);
        let (pa, pb) = a.common_normal(&b).unwrap();
        assert_abs_diff_eq!(pa, na::Vector3::zeros(), epsilon = 1e-12);
        assert_abs_diff_eq!(pb, na::Vector3::new(0., 0., 2.), epsilon = 1e-12);
        let c = NormalizedLine::from_point_dir([0., 3., 0.], [-1., 0., 0.]).unwrap();
        assert_abs_diff_eq!(a.distance(&c), 3., epsilon = 1e-12);
        assert!(a.common_normal(&c).is_none());
    }
}
