use super::*;
use crate::linsolve::null_space;

// Tried in order to find weights without a zero entry
const LAMBDAS: [i64; 9] = [0, 1, -1, 2, -2, 3, -3, 5, -5];

/// Interpolate four poses with a cubic motion.
///
/// The first pose must be the identity. The curve is found in three steps:
///
/// 1. Nodes `0, 1, -1, x` are assigned to the poses. A Lagrange curve
///    `Σ μ_i p_i Π_(j≠i) (t - t_j)` through them stays on the Study quadric
///    iff the weights `μ` are in the kernel of the skew matrix
///    `B(p_i, p_j) / (t_i - t_j)`. Its Pfaffian is a quadratic in `x`, and
///    either root gives a two-dimensional kernel.
/// 1. The weights are the member `μ(λ) = w + λ v` of the kernel with the
///    smallest `|λ|` (preferring `λ = 0`) that reaches every pose.
/// 1. Substituting `t → 1/t` moves the identity to `t = ∞`, so the curve is
///    monic and the other poses are at `1, -1, 1/x`.
///
/// Exact scalars require a rational root `x`, otherwise the interpolation
/// fails and should be repeated in floating point.
pub fn interpolate_cubic<T: Scalar>(poses: &[DualQuaternion<T>]) -> Result<Interpolant<T>> {
    check_len(poses, 4)?;
    let poses = rescaled(poses);
    if !poses[0].is_identity() {
        return Err(Error::InvalidInput("the first of four poses must be the identity".to_string()));
    }
    let b = |i: usize, j: usize| poses[i].study_form(&poses[j]);
    let candidates = node_candidates(&b)?;
    let mut last_err = None;
    for x in candidates {
        let nodes = [T::zero(), T::one(), -T::one(), x];
        match lagrange_weights(&b, &nodes) {
            Ok(mu) => return build(&poses, &nodes, &mu),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        Error::Interpolation("the poses admit no cubic motion".to_string())
    }))
}

// Roots of the Pfaffian, multiplied by the Vandermonde product of the nodes
fn node_candidates<T: Scalar>(b: &impl Fn(usize, usize) -> T) -> Result<Vec<T>> {
    let c = |v: i64| Poly::constant(T::from_i64(v));
    let x = Poly::t();
    let t = [c(0), c(1), c(-1), x];
    let d = |i: usize, j: usize| &t[i] - &t[j];
    let term = |i: usize, j: usize, k: usize, l: usize, f: [(usize, usize); 4]| {
        let w = b(i, j) * b(k, l);
        f.iter().fold(Poly::constant(w), |acc, &(m, n)| &acc * &d(m, n))
    };
    let e = &(&term(0, 1, 2, 3, [(0, 2), (0, 3), (1, 2), (1, 3)])
        - &term(0, 2, 1, 3, [(0, 1), (0, 3), (1, 2), (2, 3)]))
        + &term(0, 3, 1, 2, [(0, 1), (0, 2), (1, 3), (2, 3)]);
    let [c0, c1, c2] = [0, 1, 2].map(|k| e.coeff(k));
    let scale = magnitude([&c0, &c1, &c2]);
    let mut roots = if !c2.is_negligible_to(scale) {
        let disc = c1.clone() * c1.clone() - T::from_i64(4) * c2.clone() * c0;
        let disc = if disc.is_negligible_to(scale * scale) { T::zero() } else { disc };
        let s = disc.sqrt().ok_or_else(|| {
            Error::Interpolation(if T::EXACT {
                "node parameters are irrational".to_string()
            } else {
                "node parameters are complex".to_string()
            })
        })?;
        let den = c2.clone() + c2;
        vec![(-c1.clone() + s.clone()) / den.clone(), (-c1 - s) / den]
    } else if !c1.is_negligible_to(scale) {
        vec![-c0 / c1]
    } else if c0.is_negligible_to(scale) {
        // Every node works, take the first one that keeps them distinct
        log::debug!("degenerate Pfaffian, choosing x = 2");
        vec![T::from_i64(2)]
    } else {
        Vec::new()
    };
    // Nodes must stay distinct
    roots.retain(|x| [0, 1, -1].iter().all(|&v| !(x.clone() - T::from_i64(v)).is_negligible()));
    if roots.is_empty() {
        return Err(Error::Interpolation("no admissible node parameters".to_string()));
    }
    Ok(roots)
}

fn lagrange_weights<T: Scalar>(b: &impl Fn(usize, usize) -> T, nodes: &[T; 4]) -> Result<Vec<T>> {
    let a = (0..4)
        .map(|i| {
            (0..4)
                .map(|j| {
                    if i == j {
                        T::zero()
                    } else {
                        b(i, j) / (nodes[i].clone() - nodes[j].clone())
                    }
                })
                .collect()
        })
        .collect::<Vec<Vec<T>>>();
    let kernel = null_space(&a, 4);
    let (w, v) = match kernel.as_slice() {
        [] => {
            return Err(Error::Interpolation("weights have no solution".to_string()));
        }
        [w] => (w.clone(), vec![T::zero(); 4]),
        [va, vb, ..] => {
            let w = va.iter().zip(vb).map(|(a, b)| a.clone() + b.clone()).collect();
            (w, vb.clone())
        }
    };
    LAMBDAS
        .iter()
        .map(|&lam| {
            let lam = T::from_i64(lam);
            w.iter().zip(&v).map(|(w, v)| w.clone() + lam.clone() * v.clone()).collect::<Vec<_>>()
        })
        .find(|mu| {
            let scale = magnitude(mu);
            mu.iter().all(|m| !m.is_negligible_to(scale))
        })
        .ok_or_else(|| Error::Interpolation("every weight family drops a pose".to_string()))
}

// The inverted Lagrange curve Σ μ_i p_i Π_(j≠i) (1 - t_j s)
fn build<T: Scalar>(
    poses: &[DualQuaternion<T>],
    nodes: &[T; 4],
    mu: &[T],
) -> Result<Interpolant<T>> {
    let basis = (0..4).map(|i| {
        (0..4)
            .filter(|&j| j != i)
            .map(|j| Poly::new(vec![T::one(), -nodes[j].clone()]))
            .fold(Poly::constant(mu[i].clone()), |acc, f| &acc * &f)
    });
    let arrays = poses.iter().map(DualQuaternion::to_array).collect::<Vec<_>>();
    let mut polys = vec![Poly::zero(); 8];
    for (l, pose) in basis.zip(&arrays) {
        for (acc, c) in polys.iter_mut().zip(pose) {
            *acc = &*acc + &l.scale(c);
        }
    }
    let curve = RationalCurve::from_polys(polys)?.to_monic()?;
    let params = nodes[1..].iter().map(|t| T::one() / t.clone()).collect();
    check_motion(curve, params)
}
