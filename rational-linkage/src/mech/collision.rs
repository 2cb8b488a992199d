use super::*;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Options of the collision check.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionCfg {
    /// Stop at the first conflict
    pub first_conflict: bool,
    /// Check the pairs in parallel (with the `rayon` feature)
    pub parallel: bool,
    /// Distance of the segments regarded as contact
    pub tol: f64,
}

impl Default for CollisionCfg {
    fn default() -> Self {
        Self { first_conflict: false, parallel: true, tol: 1e-6 }
    }
}

impl CollisionCfg {
    /// Set the first conflict mode.
    pub fn first_conflict(self, first_conflict: bool) -> Self {
        Self { first_conflict, ..self }
    }

    /// Set the parallel mode.
    pub fn parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }

    /// Set the contact distance.
    pub fn tol(self, tol: f64) -> Self {
        Self { tol, ..self }
    }
}

/// A conflict of two segments.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Collision {
    /// Indices of the segments in [`RationalMechanism::segments()`]
    pub pair: [usize; 2],
    /// Curve parameter, `∞` for the home configuration
    pub t: f64,
    /// Contact point
    pub point: [f64; 3],
}

impl RationalMechanism {
    /// Check every pair of non-adjacent segments for collisions.
    ///
    /// The lines of two segments meet iff their reciprocal product vanishes,
    /// a polynomial in `t`. Each real root (and `t = ∞` if the degree drops)
    /// is a candidate, which is a collision if the contact lies on both
    /// segments. Always parallel lines collide where they coincide.
    ///
    /// The result is sorted by the pair indices and does not depend on the
    /// parallel mode. In the first conflict mode at most one collision is
    /// returned, which is not necessarily the first pair in parallel mode.
    pub fn collision_check(&self, cfg: &CollisionCfg) -> Result<Vec<Collision>> {
        let segs = self.segments()?;
        let lines = segs.iter().map(LineSegment::moving_line).collect::<Result<Vec<_>>>()?;
        let pairs = (0..segs.len())
            .flat_map(|i| (i + 1..segs.len()).map(move |j| [i, j]))
            .filter(|&[i, j]| !segs[i].is_adjacent(&segs[j]))
            .collect::<Vec<_>>();
        let check = |&[i, j]: &[usize; 2]| {
            let hits = pair_collisions(&segs[i], &segs[j], &lines[i], &lines[j], cfg.tol);
            hits.into_iter()
                .map(|(t, point)| Collision { pair: [i, j], t, point })
                .collect::<Vec<_>>()
        };
        let first = |c: &[usize; 2]| check(c).into_iter().next();
        #[cfg(feature = "rayon")]
        {
            if cfg.parallel {
                return Ok(if cfg.first_conflict {
                    pairs.par_iter().find_map_any(&first).into_iter().collect()
                } else {
                    pairs.par_iter().flat_map_iter(&check).collect()
                });
            }
        }
        Ok(if cfg.first_conflict {
            pairs.iter().find_map(&first).into_iter().collect()
        } else {
            pairs.iter().flat_map(&check).collect()
        })
    }
}

fn pair_collisions(
    a: &LineSegment,
    b: &LineSegment,
    la: &RationalCurve,
    lb: &RationalCurve,
    tol: f64,
) -> Vec<(f64, [f64; 3])> {
    let (pa, pb) = (la.polys(), lb.polys());
    let nominal = 2 * (a.motion.degree() + b.motion.degree());
    // u_a · m_b + u_b · m_a, where the moments are the negated dual parts
    let recip = -(1..4).map(|k| &(&pa[k] * &pb[k + 4]) + &(&pb[k] * &pa[k + 4])).sum::<Poly<f64>>();
    let roots = match common_real_roots(&[recip], nominal) {
        Some(roots) => roots,
        None => {
            // Coplanar everywhere, the lines collide where they coincide:
            // u_a ∥ u_b and m_a ∥ m_b with the same ratio
            let polys = (1..4)
                .flat_map(|i| (1..4).map(move |j| (i, j)))
                .map(|(i, j)| &(&pb[i] * &pa[j + 4]) - &(&pa[i] * &pb[j + 4]))
                .collect::<Vec<_>>();
            common_real_roots(&polys, nominal).unwrap_or_default()
        }
    };
    roots
        .into_iter()
        .filter_map(|t| {
            let hit = contact(a.ends_at(t), b.ends_at(t), tol)?;
            log::trace!("contact at t = {t}: {hit:?}");
            Some((t, hit))
        })
        .collect()
}

// Contact point of two segments within the distance tolerance
fn contact(a: [[f64; 3]; 2], b: [[f64; 3]; 2], tol: f64) -> Option<[f64; 3]> {
    let [a0, a1] = a.map(na::Vector3::from);
    let [b0, b1] = b.map(na::Vector3::from);
    let (da, db) = (a1 - a0, b1 - b0);
    let (la, lb) = (da.norm_squared(), db.norm_squared());
    if la < EPS || lb < EPS {
        return None;
    }
    let w = b0 - a0;
    let n = da.cross(&db);
    let in_unit = |s: f64, len2: f64| {
        let margin = tol / len2.sqrt();
        (-margin..=1. + margin).contains(&s)
    };
    if n.norm_squared() < EPS * la * lb {
        // Parallel: coincident lines with overlapping extents
        let s0 = w.dot(&da) / la;
        let s1 = (b1 - a0).dot(&da) / la;
        let dist = (w - da * s0).norm();
        let (lo, hi) = (s0.min(s1).max(0.), s0.max(s1).min(1.));
        return (dist <= tol && lo <= hi + tol / la.sqrt())
            .then(|| (a0 + da * ((lo + hi) / 2.)).into());
    }
    let nn = n.norm_squared();
    let s = w.cross(&db).dot(&n) / nn;
    let r = w.cross(&da).dot(&n) / nn;
    let (pa, pb) = (a0 + da * s, b0 + db * r);
    ((pa - pb).norm() <= tol && in_unit(s, la) && in_unit(r, lb)).then(|| ((pa + pb) / 2.).into())
}

#[test]
fn segment_contact() {
    let a = [[0., 0., 0.], [2., 0., 0.]];
    let hit = contact(a, [[1., -1., 0.], [1., 1., 0.]], 1e-9).unwrap();
    assert!((na::Vector3::from(hit) - na::Vector3::new(1., 0., 0.)).norm() < 1e-12);
    // The lines meet outside of the second segment
    assert!(contact(a, [[1., 1., 0.], [1., 2., 0.]], 1e-9).is_none());
    // Skew
    assert!(contact(a, [[1., -1., 1.], [1., 1., 1.]], 1e-9).is_none());
    // Parallel
    assert!(contact(a, [[0., 1., 0.], [2., 1., 0.]], 1e-9).is_none());
    assert!(contact(a, [[1.5, 0., 0.], [3., 0., 0.]], 1e-9).is_some());
    assert!(contact(a, [[2.5, 0., 0.], [3., 0., 0.]], 1e-9).is_none());
}
