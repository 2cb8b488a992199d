//! Motion synthesis by exact interpolation.
//!
//! Poses are dual quaternions, points are Cartesian coordinates. The first
//! pose (or point) is reached at `t = ∞`, where the resulting curve is the
//! identity, and the others at the parameters listed in
//! [`Interpolant::params`].
//!
//! ```
//! use rational_linkage::{syn, DualQuaternion, Rational};
//!
//! let poses = [
//!     [1, 0, 0, 0, 0, 0, 0, 0],
//!     [0, 0, 0, 1, 1, 0, 1, 0],
//!     [1, 2, 0, 0, -2, 1, 0, 0],
//!     [3, 0, 1, 0, 1, 0, -3, 0],
//! ]
//! .map(|v| DualQuaternion::from_array(v.map(|x| Rational::from_integer(x.into()))));
//! let res = syn::interpolate(&poses).unwrap();
//! assert_eq!(res.curve.degree(), 3);
//! assert!(res.curve.is_motion());
//! ```
pub use self::{
    cubic::interpolate_cubic,
    points::{interpolate_points_cubic, interpolate_points_quadratic},
    quadratic::interpolate_quadratic,
    two_poses::{interpolate_two, TwoPoseCfg},
};
use crate::{
    curve::RationalCurve,
    dq::DualQuaternion,
    poly::Poly,
    scalar::{magnitude, Scalar},
    Error, Result,
};

mod cubic;
mod points;
mod quadratic;
mod two_poses;

/// Result of an interpolation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Interpolant<T = f64> {
    /// The rational motion
    pub curve: RationalCurve<T>,
    /// Parameter of the second, third, ... input; the first input sits at
    /// `t = ∞`
    pub params: Vec<T>,
}

impl<T: Scalar> Interpolant<T> {
    /// Evaluate the curve at the parameter of input `i`.
    pub fn pose(&self, i: usize) -> Option<DualQuaternion<T>> {
        match i {
            0 => Some(self.curve.evaluate_at_infinity()),
            i => self.params.get(i - 1).map(|t| self.curve.evaluate(t)),
        }
    }
}

/// Interpolate 2, 3 or 4 poses with a motion of minimal degree.
///
/// Two poses use the default [`TwoPoseCfg`].
pub fn interpolate<T: Scalar>(poses: &[DualQuaternion<T>]) -> Result<Interpolant<T>> {
    match poses.len() {
        2 => interpolate_two(poses, &TwoPoseCfg::default()),
        3 => interpolate_quadratic(poses),
        4 => interpolate_cubic(poses),
        n => Err(Error::InvalidInput(format!("cannot interpolate {n} poses"))),
    }
}

/// Interpolate 5 or 7 points with a quadratic or cubic motion.
pub fn interpolate_points<T: Scalar>(points: &[[T; 3]]) -> Result<Interpolant<T>> {
    match points.len() {
        5 => interpolate_points_quadratic(points),
        7 => interpolate_points_cubic(points),
        n => Err(Error::InvalidInput(format!("cannot interpolate {n} points"))),
    }
}

fn check_len<U>(v: &[U], expected: usize) -> Result<()> {
    if v.len() == expected {
        Ok(())
    } else {
        Err(Error::Dimension { expected, got: v.len() })
    }
}

// Floating point poses are brought to parameters in `[-1, 1]`, so that the
// zero tests do not depend on their projective scale
fn rescaled<T: Scalar>(poses: &[DualQuaternion<T>]) -> Vec<DualQuaternion<T>> {
    if T::EXACT {
        poses.to_vec()
    } else {
        poses.iter().map(DualQuaternion::rescaled).collect()
    }
}

// Reject curves that leave the Study quadric
fn check_motion<T: Scalar>(curve: RationalCurve<T>, params: Vec<T>) -> Result<Interpolant<T>> {
    if curve.is_motion() {
        Ok(Interpolant { curve, params })
    } else {
        Err(Error::Interpolation("result violates the Study condition".to_string()))
    }
}
