use super::{quadratic::quadratic_curve, *};
use crate::quat::Quaternion;
use rand::{Rng as _, SeedableRng as _};

// Penalty of the third poses that do not give a motion
const INFEASIBLE: f64 = 1e10;

/// Options of the two-pose interpolation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct TwoPoseCfg {
    /// Generations of the optimizer
    pub gen: u64,
    /// Population of the optimizer
    pub pop: usize,
    /// Seed of the optimizer and the random fallback
    pub seed: u64,
    /// Random candidates tried when the optimizer fails
    pub retries: usize,
    /// Sample number of the path length
    pub res: usize,
}

impl Default for TwoPoseCfg {
    fn default() -> Self {
        Self { gen: 40, pop: 60, seed: 0, retries: 20, res: 90 }
    }
}

impl TwoPoseCfg {
    /// Set the generations of the optimizer.
    pub fn gen(self, gen: u64) -> Self {
        Self { gen, ..self }
    }

    /// Set the population of the optimizer.
    pub fn pop(self, pop: usize) -> Self {
        Self { pop, ..self }
    }

    /// Set the random seed.
    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// Set the number of random candidates.
    pub fn retries(self, retries: usize) -> Self {
        Self { retries, ..self }
    }

    /// Set the sample number of the path length.
    pub fn res(self, res: usize) -> Self {
        Self { res, ..self }
    }
}

/// Interpolate two poses with a quadratic motion.
///
/// The problem is under-determined, so a third pose is chosen to make the
/// motion short. The optimizer searches a rotation quaternion and a
/// translation near the given poses, minimizing [`RationalCurve::path_length()`].
/// If it finds no feasible pose, random candidates are tried and the shortest
/// motion wins.
///
/// The third pose is reached at `t = 0`, and the second at `t = 1`.
pub fn interpolate_two<T: Scalar>(
    poses: &[DualQuaternion<T>],
    cfg: &TwoPoseCfg,
) -> Result<Interpolant<T>> {
    check_len(poses, 2)?;
    let poses = rescaled(poses);
    if !poses[0].is_identity() {
        log::warn!("the first pose is not the identity");
    }
    let func = ThirdPose::new(&poses[0], &poses[1], cfg.res);
    let s = mh::Solver::build(mh::Rga::default(), func)
        .seed(cfg.seed)
        .task(|ctx| ctx.gen == cfg.gen)
        .pop_num(cfg.pop)
        .solve();
    let best = s.as_best_xs();
    let p2 = s.func().pose::<T>(best);
    let curve = match quadratic_curve(&poses[0], &poses[1], &p2) {
        Ok(curve) if curve.is_motion() => curve,
        _ => random_search(&poses[0], &poses[1], s.func(), cfg)?,
    };
    check_motion(curve, vec![T::one(), T::zero()])
}

fn random_search<T: Scalar>(
    p0: &DualQuaternion<T>,
    p1: &DualQuaternion<T>,
    func: &ThirdPose,
    cfg: &TwoPoseCfg,
) -> Result<RationalCurve<T>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(cfg.seed);
    let mut best: Option<(f64, RationalCurve<T>)> = None;
    for i in 0..cfg.retries {
        let xs = func.bound.iter().map(|&[lb, ub]| rng.gen_range(lb..=ub)).collect::<Vec<_>>();
        let curve = match quadratic_curve(p0, p1, &func.pose::<T>(&xs)) {
            Ok(curve) if curve.is_motion() => curve,
            Ok(_) => {
                log::debug!("candidate {i} leaves the Study quadric");
                continue;
            }
            Err(e) => {
                log::debug!("candidate {i} failed: {e}");
                continue;
            }
        };
        let len = curve.to_f64().path_length(cfg.res);
        if best.as_ref().map_or(true, |(l, _)| len < *l) {
            best = Some((len, curve));
        }
    }
    best.map(|(_, curve)| curve)
        .ok_or_else(|| Error::Interpolation("no third pose gives a motion".to_string()))
}

/// Objective of the third pose: the path length of the quadratic motion.
///
/// Variables are a rotation quaternion `[w, x, y, z]` and a translation.
struct ThirdPose {
    p0: DualQuaternion,
    p1: DualQuaternion,
    bound: [[f64; 2]; 7],
    res: usize,
}

impl ThirdPose {
    fn new<T: Scalar>(p0: &DualQuaternion<T>, p1: &DualQuaternion<T>, res: usize) -> Self {
        let (p0, p1) = (p0.to_f64(), p1.to_f64());
        let t0 = p0.translation_vector();
        let t1 = p1.translation_vector();
        let mut bound = [[-1., 1.]; 7];
        for i in 0..3 {
            let (lo, hi) = (t0[i].min(t1[i]), t0[i].max(t1[i]));
            let margin = (hi - lo).max(1.);
            bound[4 + i] = [lo - margin, hi + margin];
        }
        Self { p0, p1, bound, res }
    }

    // Rebuild the pose exactly from the variables
    fn pose<T: Scalar>(&self, xs: &[f64]) -> DualQuaternion<T> {
        let v = |i: usize| xs.get(i).copied().map_or_else(T::zero, T::approx_f64);
        let p = Quaternion::from_array([v(0), v(1), v(2), v(3)]);
        DualQuaternion::from_rotation_translation(p, [v(4), v(5), v(6)])
    }
}

impl mh::Bounded for ThirdPose {
    fn bound(&self) -> &[[f64; 2]] {
        &self.bound
    }
}

impl mh::ObjFunc for ThirdPose {
    type Ys = f64;

    fn fitness(&self, xs: &[f64]) -> Self::Ys {
        let p2 = self.pose::<f64>(xs);
        if p2.p.is_negligible() {
            return INFEASIBLE;
        }
        match quadratic_curve(&self.p0, &self.p1, &p2) {
            Ok(curve) if curve.is_motion() => curve.path_length(self.res),
            _ => INFEASIBLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_pose_bound_covers_translations() {
        let p0 = DualQuaternion::identity();
        let p1 = DualQuaternion::translation([3., -1., 0.]);
        let func = ThirdPose::new(&p0, &p1, 30);
        assert_eq!(func.bound[4], [-3., 6.]);
        assert_eq!(func.bound[5], [-2., 1.]);
        assert_eq!(func.bound[6], [-1., 1.]);
        let pose = func.pose::<f64>(&[1., 0., 0., 0., 2., 0., 0.]);
        assert!(pose.satisfies_study());
    }

    #[test]
    fn random_search_reaches_both_poses() {
        let p0 = DualQuaternion::identity();
        let p1 = DualQuaternion::from_rotation_translation(
            Quaternion::from_array([0., 0., 0., 1.]),
            [1., 2., 0.],
        );
        let cfg = TwoPoseCfg::default().retries(50).seed(3);
        let func = ThirdPose::new(&p0, &p1, cfg.res);
        let curve = random_search(&p0, &p1, &func, &cfg).unwrap();
        assert_eq!(curve.degree(), 2);
        assert!(curve.is_motion());
        assert!(curve.evaluate_at_infinity().is_identity());
        assert!(curve.evaluate(&1.).eq_projective(&p1));
        let cfg = cfg.retries(0);
        assert!(matches!(random_search(&p0, &p1, &func, &cfg), Err(Error::Interpolation(_))));
    }
}
