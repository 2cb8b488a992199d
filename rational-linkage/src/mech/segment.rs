use super::*;

/// Role of a physical segment in the linkage.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum SegmentKind {
    /// The fixed link between the first joints of the two branches
    BaseLink,
    /// A joint axis between its connection points
    Joint,
    /// A link between two consecutive joints of a branch
    Link,
    /// The end-effector link between the last joints of the two branches
    Tool,
}

/// A physical segment of the linkage and its motion.
#[derive(Clone, Debug)]
pub struct LineSegment {
    /// Role of the segment
    pub kind: SegmentKind,
    /// Branch index, zero for the base link and the tool
    pub branch: usize,
    /// Index in the branch
    pub index: usize,
    /// End points in the home configuration
    pub ends: [[f64; 3]; 2],
    /// Motion of the segment
    pub motion: RationalCurve,
    joints: Vec<usize>,
}

impl LineSegment {
    /// Return true if the segments share a joint.
    pub fn is_adjacent(&self, rhs: &Self) -> bool {
        self.joints.iter().any(|j| rhs.joints.contains(j))
    }

    /// Global indices of the joints touching the segment. The joints of the
    /// second branch follow the first one.
    pub fn joints(&self) -> &[usize] {
        &self.joints
    }

    /// The segment line in the home configuration.
    pub fn line(&self) -> Result<NormalizedLine> {
        NormalizedLine::from_two_points(self.ends[0], self.ends[1])
    }

    /// End points at a parameter, `t = ∞` for the home configuration.
    pub fn ends_at(&self, t: f64) -> [[f64; 3]; 2] {
        let pose = self.motion.pose_at(t);
        self.ends.map(|x| pose.transform_point(x))
    }

    /// Polynomials of the moving line `M L M~`: the direction `[1..4]` and
    /// the negated moment `[5..8]`, both scaled by the norm of `M`.
    pub fn moving_line(&self) -> Result<RationalCurve> {
        let l = RationalCurve::constant(&self.line()?.to_dq());
        Ok(&(&self.motion * &l) * &self.motion.conjugate())
    }

    /// Bezier pieces of the end point trajectories over the full cycle,
    /// `[[start, end]; 2]` for the curve on `[-1, 1]` and the inverse curve on
    /// `[-1, 1]`.
    pub fn bezier_segments(&self) -> [[BezierSegment<4>; 2]; 2] {
        let deg = 2 * self.motion.degree();
        let trajs = self.ends.map(|x| self.motion.point_trajectory(&x));
        let piece = |inverse: bool| {
            trajs.each_ref().map(|polys| {
                let polys = polys.each_ref().map(|p| {
                    let p = if inverse { p.reversed(deg) } else { p.clone() };
                    p.compose_affine(&-1., &2.)
                });
                BezierSegment::new(RationalBezier::from_polys(&polys, deg))
            })
        };
        [piece(false), piece(true)]
    }
}

impl RationalMechanism {
    /// Physical segments of the linkage.
    ///
    /// Joint `i` of a branch is moved by the first `i` factors, link `i`
    /// connects joint `i` to joint `i + 1` and is moved by the first `i + 1`
    /// factors, and the tool connects the last joints and follows the whole
    /// motion.
    pub fn segments(&self) -> Result<Vec<LineSegment>> {
        let [f0, f1] = &self.factorizations;
        let n = f0.joint_num();
        let points = [f0.connection_points()?, f1.connection_points()?];
        let mut segs = vec![LineSegment {
            kind: SegmentKind::BaseLink,
            branch: 0,
            index: 0,
            ends: [points[0][0][0], points[1][0][0]],
            motion: RationalCurve::constant(&DualQuaternion::identity()),
            joints: vec![0, n],
        }];
        for (b, (f, pts)) in [f0, f1].into_iter().zip(&points).enumerate() {
            for (i, &ends) in pts.iter().enumerate() {
                segs.push(LineSegment {
                    kind: SegmentKind::Joint,
                    branch: b,
                    index: i,
                    ends,
                    motion: f.partial_curve(i),
                    joints: vec![b * n + i],
                });
            }
            for i in 0..n - 1 {
                segs.push(LineSegment {
                    kind: SegmentKind::Link,
                    branch: b,
                    index: i,
                    ends: [pts[i][1], pts[i + 1][0]],
                    motion: f.partial_curve(i + 1),
                    joints: vec![b * n + i, b * n + i + 1],
                });
            }
        }
        segs.push(LineSegment {
            kind: SegmentKind::Tool,
            branch: 0,
            index: 0,
            ends: [points[0][n - 1][1], points[1][n - 1][1]],
            motion: self.curve.clone(),
            joints: vec![n - 1, 2 * n - 1],
        });
        Ok(segs)
    }

    /// Lengths of the links (including the base link and the tool) in the
    /// home configuration.
    pub fn link_lengths(&self) -> Result<Vec<f64>> {
        Ok(self
            .segments()?
            .iter()
            .filter(|s| s.kind != SegmentKind::Joint)
            .map(|s| (na::Vector3::from(s.ends[1]) - na::Vector3::from(s.ends[0])).norm())
            .collect())
    }

    /// Mass points of the links, at the middle of each link segment.
    pub fn mass_points(&self) -> Result<Vec<[f64; 3]>> {
        Ok(self
            .segments()?
            .iter()
            .filter(|s| s.kind != SegmentKind::Joint)
            .map(|s| ((na::Vector3::from(s.ends[0]) + na::Vector3::from(s.ends[1])) / 2.).into())
            .collect())
    }
}
