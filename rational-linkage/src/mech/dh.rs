use super::*;

const TOL: f64 = 1e-9;

/// Denavit–Hartenberg parameters in the modified (proximal) convention.
///
/// The transformation from a frame to the next one is
/// `Trans_x(a) Rot_x(alpha) Trans_z(d) Rot_z(theta)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DhParams {
    /// Joint angle around the next axis
    pub theta: f64,
    /// Offset along the next axis
    pub d: f64,
    /// Length of the common normal
    pub a: f64,
    /// Twist angle between the axes
    pub alpha: f64,
}

impl DhParams {
    /// The homogeneous transformation.
    pub fn transform(&self) -> na::Matrix4<f64> {
        let (sa, ca) = self.alpha.sin_cos();
        let (st, ct) = self.theta.sin_cos();
        #[rustfmt::skip]
        let m = na::Matrix4::new(
            ct, -st, 0., self.a,
            st * ca, ct * ca, -sa, -sa * self.d,
            st * sa, ct * sa, ca, ca * self.d,
            0., 0., 0., 1.,
        );
        m
    }

    /// Extract the parameters of a transformation of this form.
    pub fn from_transform(m: &na::Matrix4<f64>) -> Self {
        let alpha = f64::atan2(-m[(1, 2)], m[(2, 2)]);
        let theta = f64::atan2(-m[(0, 1)], m[(0, 0)]);
        let (sa, ca) = alpha.sin_cos();
        let d = -sa * m[(1, 3)] + ca * m[(2, 3)];
        Self { theta, d, a: m[(0, 3)], alpha }
    }
}

/// Return true if the chain of transformations returns to the start.
///
/// An open chain is only reported with a warning, since its parameters are
/// still usable for analysis.
pub fn chain_closes(params: &[DhParams]) -> bool {
    let m = params.iter().fold(na::Matrix4::<f64>::identity(), |acc, p| acc * p.transform());
    let err = (m - na::Matrix4::identity()).norm();
    let closed = err < 1e-6;
    if !closed {
        log::warn!("DH chain does not close: |T - I| = {err:e}");
    }
    closed
}

impl RationalMechanism {
    /// Axes of the closed loop in the home configuration: the first branch
    /// from the base to the tool, then the second branch back to the base.
    pub fn loop_lines(&self) -> Result<Vec<NormalizedLine>> {
        let [f0, f1] = &self.factorizations;
        let mut lines = f0.lines()?;
        lines.extend(f1.lines()?.into_iter().rev());
        Ok(lines)
    }

    /// Directions of the joint axes in the home configuration, in the order of
    /// [`RationalMechanism::loop_lines()`].
    pub fn axis_directions(&self) -> Result<Vec<[f64; 3]>> {
        Ok(self.loop_lines()?.iter().map(|l| l.dir).collect())
    }

    /// Frames of the joints in the home configuration.
    ///
    /// The z-axis of a frame is the joint axis, and the x-axis is the common
    /// normal to the next axis of the loop. Intersecting axes use the cross
    /// product of the directions, and parallel axes the normal through the
    /// previous origin.
    pub fn get_frames(&self) -> Result<Vec<na::Matrix4<f64>>> {
        let lines = self.loop_lines()?;
        let m = lines.len();
        let mut frames = Vec::with_capacity(m);
        let mut prev = lines[0].point();
        for (i, l) in lines.iter().enumerate() {
            let next = &lines[(i + 1) % m];
            let z = l.direction();
            let (origin, x) = match l.common_normal(next) {
                Some((fa, fb)) => {
                    let normal = fb - fa;
                    if normal.norm() > TOL {
                        (fa, normal.normalize())
                    } else {
                        (fa, z.cross(&next.direction()).normalize())
                    }
                }
                None => {
                    let origin = l.project(&prev);
                    let normal = next.project(&origin) - origin;
                    if normal.norm() > TOL {
                        (origin, normal.normalize())
                    } else {
                        // Coincident axes
                        (origin, perpendicular(&z))
                    }
                }
            };
            let y = z.cross(&x);
            let mut f = na::Matrix4::identity();
            f.fixed_view_mut::<3, 1>(0, 0).copy_from(&x);
            f.fixed_view_mut::<3, 1>(0, 1).copy_from(&y);
            f.fixed_view_mut::<3, 1>(0, 2).copy_from(&z);
            f.fixed_view_mut::<3, 1>(0, 3).copy_from(&origin);
            frames.push(f);
            // The foot of the normal on the next axis
            prev = next.project(&origin);
        }
        Ok(frames)
    }

    /// DH parameters from each frame to the next one around the loop.
    pub fn get_dh_params(&self) -> Result<Vec<DhParams>> {
        let frames = self.get_frames()?;
        let m = frames.len();
        frames
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let inv = f
                    .try_inverse()
                    .ok_or_else(|| Error::InvalidInput("degenerate frame".to_string()))?;
                Ok(DhParams::from_transform(&(inv * frames[(i + 1) % m])))
            })
            .collect()
    }

    /// Return true if the DH parameters close the loop. See
    /// [`chain_closes()`].
    pub fn dh_chain_closes(&self) -> Result<bool> {
        Ok(chain_closes(&self.get_dh_params()?))
    }
}

fn perpendicular(z: &na::Vector3<f64>) -> na::Vector3<f64> {
    let e = if z.x.abs() < 0.9 { na::Vector3::x() } else { na::Vector3::y() };
    z.cross(&e).normalize()
}

#[test]
fn dh_transform_round_trip() {
    let p = DhParams { theta: 0.4, d: -1.5, a: 2., alpha: -1.1 };
    let q = DhParams::from_transform(&p.transform());
    assert!((p.theta - q.theta).abs() < 1e-12);
    assert!((p.d - q.d).abs() < 1e-12);
    assert!((p.a - q.a).abs() < 1e-12);
    assert!((p.alpha - q.alpha).abs() < 1e-12);
    assert!(!chain_closes(&[p]));
    assert!(chain_closes(&[]));
}
