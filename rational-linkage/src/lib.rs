//! Rational linkage synthesis and analysis with dual quaternions.
//!
//! Poses are [`DualQuaternion`]s (Study parameters). A [`RationalCurve`]
//! through two to four poses, or five or seven points, is found by the
//! [`syn`] module, split into revolute axes by [`factorize()`], and
//! assembled into a closed-loop [`RationalMechanism`] for kinematics and
//! collision analysis.
//!
//! The algebra is generic over [`Scalar`], so the synthesis can run on
//! exact [`Rational`] numbers as well as on `f64`.
//!
//! ```
//! use rational_linkage::*;
//!
//! // (t - h1)(t - h2) of two parallel revolute axes
//! let h1 = DualQuaternion::from_array([0., 0., 0., 1., 0., 0., 0., 0.]);
//! let h2 = DualQuaternion::from_array([0., 0., 0., -2., 0., 0., -2., 0.]);
//! let curve = RationalCurve::from_factors(&[h1, h2]);
//! let mech = RationalMechanism::from_curve(&curve, &NumericOracle).unwrap();
//! assert!(mech.is_closed(0.5));
//! ```
#![cfg_attr(doc_cfg, feature(doc_cfg))]
#![warn(missing_docs)]
pub extern crate metaheuristics_nature as mh;
pub extern crate nalgebra as na;

pub use crate::{
    bezier::{BezierSegment, RationalBezier},
    curve::RationalCurve,
    dq::{DqType, DualQuaternion},
    error::{Error, Result},
    factor::{factorize, FactorOracle, MotionFactorization, NumericOracle},
    geometry::{GeometricObject, NormalizedLine, Plane, PointHomogeneous},
    mech::{AngleUnit, RationalMechanism},
    miniball::MiniBall,
    poly::Poly,
    quat::Quaternion,
    scalar::{Rational, Scalar},
    syn::Interpolant,
};

pub mod bezier;
#[cfg(feature = "csv")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "csv")))]
pub mod csv;
pub mod curve;
pub mod dq;
mod error;
pub mod factor;
pub mod geometry;
pub mod linsolve;
pub mod mech;
pub mod miniball;
pub mod poly;
pub mod quat;
pub mod scalar;
pub mod syn;
#[cfg(test)]
mod tests;
