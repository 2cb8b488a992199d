//! Closed-loop rational linkages.
//!
//! A [`RationalMechanism`] is made of two [`MotionFactorization`]s of the
//! same motion, which are two open chains from the base to the tool. Their
//! joints, links, base and tool are physical [`LineSegment`]s for the
//! collision check.
pub use self::{
    collision::{Collision, CollisionCfg},
    dh::{chain_closes, DhParams},
    proximity::{proximity_intervals, ProximityInterval},
    segment::{LineSegment, SegmentKind},
};
use crate::{
    bezier::{BezierSegment, RationalBezier},
    curve::RationalCurve,
    dq::DualQuaternion,
    factor::{factorize, FactorOracle, MotionFactorization, NumericOracle},
    geometry::NormalizedLine,
    miniball::MiniBall,
    poly::{common_real_roots, Poly},
    scalar::{Scalar, EPS},
    Error, Result,
};
use nalgebra as na;
use std::str::FromStr;

mod collision;
mod dh;
mod proximity;
mod segment;

/// Unit of joint angles.
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Hash)]
pub enum AngleUnit {
    /// Radians
    #[default]
    Rad,
    /// Degrees
    Deg,
}

impl AngleUnit {
    /// Convert an angle in this unit to radians.
    pub fn to_rad(self, angle: f64) -> f64 {
        match self {
            Self::Rad => angle,
            Self::Deg => angle.to_radians(),
        }
    }
}

impl FromStr for AngleUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rad" => Ok(Self::Rad),
            "deg" => Ok(Self::Deg),
            _ => Err(Error::InvalidInput(format!("unknown angle unit {s:?}"))),
        }
    }
}

/// A single-loop linkage of two revolute chains sharing a tool.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RationalMechanism {
    factorizations: [MotionFactorization; 2],
    tool: DualQuaternion,
    #[cfg_attr(feature = "serde", serde(skip))]
    curve: RationalCurve,
}

impl RationalMechanism {
    /// Assemble from two factorizations of the same motion, and the tool
    /// frame relative to the last links (the identity by default).
    pub fn new(
        factorizations: [MotionFactorization; 2],
        tool: Option<DualQuaternion>,
    ) -> Result<Self> {
        let [f0, f1] = &factorizations;
        if f0.joint_num() != f1.joint_num() {
            return Err(Error::Mismatch(format!(
                "branches of {} and {} joints",
                f0.joint_num(),
                f1.joint_num()
            )));
        }
        if !f0.curve().eq_projective(f1.curve()) {
            return Err(Error::Mismatch("the branches move differently".to_string()));
        }
        let curve = f0.curve().clone();
        let tool = tool.unwrap_or_else(DualQuaternion::identity);
        Ok(Self { factorizations, tool, curve })
    }

    /// Factorize a motion and assemble the two chains.
    ///
    /// An exact motion that has no factorization over the rationals is
    /// factorized again in floating point by [`NumericOracle`].
    pub fn from_curve<T, O>(curve: &RationalCurve<T>, oracle: &O) -> Result<Self>
    where
        T: Scalar,
        O: FactorOracle<T> + ?Sized,
    {
        let factorizations = match factorize(curve, oracle) {
            Ok(fs) => fs.map(|f| f.to_f64()),
            Err(Error::Factorization(e)) if T::EXACT => {
                log::debug!("no exact factorization ({e}), retry in floating point");
                factorize(&curve.to_f64(), &NumericOracle)?
            }
            Err(e) => return Err(e),
        };
        Self::new(factorizations, None)
    }

    /// The two chains.
    pub fn factorizations(&self) -> &[MotionFactorization; 2] {
        &self.factorizations
    }

    /// Tool frame.
    pub fn tool(&self) -> &DualQuaternion {
        &self.tool
    }

    /// The motion of the last links.
    pub fn curve(&self) -> &RationalCurve {
        &self.curve
    }

    /// Deviation from the identity of `C_0(t) C_1~(t)`, relative to its real
    /// part.
    pub fn closure_residual(&self, t: f64) -> f64 {
        let [f0, f1] = &self.factorizations;
        let x = &f0.curve().pose_at(t) * &f1.curve().pose_at(t).conjugate();
        let [w, rest @ ..] = x.to_array();
        let off = rest.iter().map(|v| v * v).sum::<f64>().sqrt();
        if w.abs() < EPS {
            f64::INFINITY
        } else {
            off / w.abs()
        }
    }

    /// Return true if the loop closes at the parameter.
    pub fn is_closed(&self, t: f64) -> bool {
        self.closure_residual(t) < 1e-8
    }

    /// Curve parameter of the angle of the first joint. See
    /// [`MotionFactorization::joint_angle_to_t_param()`].
    pub fn joint_angle_to_t_param(&self, angle: f64) -> Result<f64> {
        self.factorizations[0].joint_angle_to_t_param(angle)
    }

    /// Angle of the first joint in `[0, 2π)` at a curve parameter.
    pub fn t_param_to_joint_angle(&self, t: f64) -> Result<f64> {
        self.factorizations[0].t_param_to_joint_angle(t)
    }

    /// Pose of the tool at an angle of the first joint in radians.
    pub fn direct_kinematics(&self, angle: f64) -> Result<DualQuaternion> {
        let t = self.joint_angle_to_t_param(angle)?;
        Ok((&self.curve.pose_at(t) * &self.tool).normalized())
    }

    /// Pose of the tool at an angle of the first joint in a unit.
    pub fn direct_kinematics_in(&self, angle: f64, unit: AngleUnit) -> Result<DualQuaternion> {
        self.direct_kinematics(unit.to_rad(angle))
    }

    /// Angles of the first joint in `[0, 2π)` where the tool reaches a pose.
    ///
    /// Returns an empty list if the pose is not on the motion.
    pub fn inverse_kinematics(&self, pose: &DualQuaternion) -> Result<Vec<f64>> {
        let inv = self
            .tool
            .inv()
            .ok_or_else(|| Error::InvalidInput("singular tool frame".to_string()))?;
        let x = (pose * &inv).rescaled().to_array();
        let k = (0..8)
            .max_by(|&i, &j| x[i].abs().total_cmp(&x[j].abs()))
            .filter(|&k| x[k] != 0.)
            .ok_or_else(|| Error::InvalidInput("zero pose".to_string()))?;
        // C(t) ∝ X iff C_i X_k - C_k X_i = 0 for all i
        let polys = self.curve.polys();
        let eqs = (0..8)
            .filter(|&i| i != k)
            .map(|i| &polys[i].scale(&x[k]) - &polys[k].scale(&x[i]))
            .collect::<Vec<_>>();
        let roots = common_real_roots(&eqs, self.curve.degree()).unwrap_or_default();
        let mut angles = roots
            .into_iter()
            .map(|t| self.t_param_to_joint_angle(t))
            .collect::<Result<Vec<_>>>()?;
        angles.sort_unstable_by(f64::total_cmp);
        angles.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        Ok(angles)
    }

    /// Serialize to RON.
    #[cfg(feature = "serde")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "serde")))]
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, Default::default())?)
    }

    /// Deserialize from RON, checking the branches again.
    #[cfg(feature = "serde")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "serde")))]
    pub fn from_ron(s: &str) -> Result<Self> {
        #[derive(serde::Deserialize)]
        struct Saved {
            factorizations: [MotionFactorization; 2],
            tool: DualQuaternion,
        }
        let Saved { factorizations, tool } = ron::from_str(s)?;
        Self::new(factorizations, Some(tool))
    }

    /// Save to a file.
    #[cfg(feature = "serde")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "serde")))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load from a file written by [`RationalMechanism::save()`].
    #[cfg(feature = "serde")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "serde")))]
    pub fn from_saved_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::from_ron(&std::fs::read_to_string(path)?)
    }
}
