use super::*;

/// Interpolate three poses with a quadratic motion.
///
/// The curve is `c(t) = α p2 + (p1 - α p2 - ω p0) t + ω p0 t²` divided by `ω`,
/// which reaches `p1` at `t = 1`, `p2` at `t = 0` and `p0` at `t = ∞`. The
/// weights make the Study condition hold identically:
///
/// + `ω = B(p2, p1) / B(p2, p0)`
/// + `α = B(p1, p0) / B(p2, p0)`
///
/// where `B` is [`DualQuaternion::study_form()`].
///
/// A first pose other than the identity is accepted with a warning, since
/// the curve cannot be factorized into revolute joints then.
pub fn interpolate_quadratic<T: Scalar>(poses: &[DualQuaternion<T>]) -> Result<Interpolant<T>> {
    check_len(poses, 3)?;
    let poses = rescaled(poses);
    if !poses[0].is_identity() {
        log::warn!("the first pose is not the identity");
    }
    let curve = quadratic_curve(&poses[0], &poses[1], &poses[2])?;
    check_motion(curve, vec![T::one(), T::zero()])
}

pub(super) fn quadratic_curve<T: Scalar>(
    p0: &DualQuaternion<T>,
    p1: &DualQuaternion<T>,
    p2: &DualQuaternion<T>,
) -> Result<RationalCurve<T>> {
    let [m0, m1, m2] = [p0, p1, p2].map(|p| magnitude(&p.to_array()));
    let b20 = p2.study_form(p0);
    if b20.is_negligible_to(m2 * m0) {
        return Err(Error::Interpolation(
            "the first and the last pose are incompatible".to_string(),
        ));
    }
    let b21 = p2.study_form(p1);
    let b10 = p1.study_form(p0);
    if b21.is_negligible_to(m2 * m1) || b10.is_negligible_to(m1 * m0) {
        return Err(Error::Interpolation("only trivial weights exist".to_string()));
    }
    let omega = b21 / b20.clone();
    let alpha = b10 / b20;
    let c0 = p2.scale(&alpha);
    let c1 = &(p1 - &c0) - &p0.scale(&omega);
    let c2 = p0.scale(&omega);
    let curve = RationalCurve::from_dq_coeffs(&[c0, c1, c2]).scale(&(T::one() / omega));
    if p0.is_identity() {
        curve.to_monic()
    } else {
        Ok(curve)
    }
}
