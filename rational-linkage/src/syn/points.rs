use super::*;
use crate::{linsolve::solve, quat::Quaternion};

/// Interpolate five points with a quadratic motion.
///
/// See [`interpolate_points_cubic()`] for the parametrization.
pub fn interpolate_points_quadratic<T: Scalar>(points: &[[T; 3]]) -> Result<Interpolant<T>> {
    check_len(points, 5)?;
    interpolate_points_deg(points, 2)
}

/// Interpolate seven points with a cubic motion.
///
/// The motion carries the first point to each of the others. The first
/// point is reached at `t = ∞` by the identity, and point `i` at
/// `t = i - 1`.
///
/// The curve is monic, so the unknowns are the lower coefficients only. A
/// pose `p + ε d` carries `q0` to `q` iff `2 d + q p - p q0 = 0`, which is
/// linear in the coefficients. The Study condition is then satisfied at
/// every node, and since its degree is less than the number of nodes, it
/// holds identically.
pub fn interpolate_points_cubic<T: Scalar>(points: &[[T; 3]]) -> Result<Interpolant<T>> {
    check_len(points, 7)?;
    interpolate_points_deg(points, 3)
}

fn interpolate_points_deg<T: Scalar>(points: &[[T; 3]], n: usize) -> Result<Interpolant<T>> {
    let q0 = Quaternion::pure(points[0].clone());
    let unknowns = 8 * n;
    let mut a = Vec::with_capacity(unknowns);
    let mut b = Vec::with_capacity(unknowns);
    for (i, q) in points[1..].iter().enumerate() {
        let q = Quaternion::pure(q.clone());
        let tau = T::from_i64(i as i64);
        let pows = (0..=n)
            .scan(T::one(), |acc, _| {
                let v = acc.clone();
                *acc = acc.clone() * tau.clone();
                Some(v)
            })
            .collect::<Vec<_>>();
        // Columns of (L(q) - R(q0)) / 2
        let lr = (0..4)
            .map(|k| {
                let mut e = [T::zero(), T::zero(), T::zero(), T::zero()];
                e[k] = T::one();
                let e = Quaternion::from_array(e);
                (&(&q * &e) - &(&e * &q0)).scale(&T::one().half()).to_array()
            })
            .collect::<Vec<_>>();
        let rhs = (&q0 - &q).scale(&pows[n].half()).to_array();
        for (r, rhs) in rhs.into_iter().enumerate() {
            let mut row = vec![T::zero(); unknowns];
            for (j, pow) in pows[..n].iter().enumerate() {
                for (k, col) in lr.iter().enumerate() {
                    row[8 * j + k] = col[r].clone() * pow.clone();
                }
                row[8 * j + 4 + r] = pow.clone();
            }
            a.push(row);
            b.push(rhs);
        }
    }
    let x = solve(&a, &b).map_err(|e| match e {
        Error::Singular => Error::Interpolation("degenerate point configuration".to_string()),
        e => e,
    })?;
    let mut coeffs = x
        .chunks_exact(8)
        .map(DualQuaternion::try_from_slice)
        .collect::<Result<Vec<_>>>()?;
    coeffs.push(DualQuaternion::identity());
    let curve = RationalCurve::from_dq_coeffs(&coeffs);
    let params = (0..points.len() as i64 - 1).map(T::from_i64).collect();
    check_motion(curve, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_points_are_degenerate() {
        let points = [[0., 0., 0.]; 5];
        let err = interpolate_points_quadratic(&points).unwrap_err();
        assert!(matches!(err, Error::Interpolation(_)));
        assert!(matches!(
            interpolate_points_cubic(&points),
            Err(Error::Dimension { expected: 7, got: 5 })
        ));
    }
}
