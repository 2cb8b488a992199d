//! Rational Bezier curves and their subdivision.
use crate::{miniball::MiniBall, poly::Poly};
use nalgebra as na;
use std::sync::OnceLock;

/// Rational Bezier curve with homogeneous control points in `D` dimensions.
///
/// The first coordinate of every control point is the weight. The enclosing
/// ball of the dehomogenized control points is computed on first use.
#[derive(Clone, Debug)]
pub struct RationalBezier<const D: usize> {
    points: Vec<[f64; D]>,
    ball: OnceLock<Option<MiniBall>>,
}

impl<const D: usize> RationalBezier<D> {
    /// Create from homogeneous control points.
    pub fn new(points: Vec<[f64; D]>) -> Self {
        Self { points, ball: OnceLock::new() }
    }

    /// Convert from the power basis on `u ∈ [0, 1]`.
    ///
    /// The degree must not be less than the degree of every polynomial.
    pub fn from_polys(polys: &[Poly<f64>; D], degree: usize) -> Self {
        let n = degree;
        let points = (0..=n)
            .map(|i| {
                std::array::from_fn(|j| {
                    (0..=i).map(|k| binomial(i, k) / binomial(n, k) * polys[j].coeff(k)).sum()
                })
            })
            .collect();
        Self::new(points)
    }

    /// Control points.
    pub fn points(&self) -> &[[f64; D]] {
        &self.points
    }

    /// Degree.
    pub fn degree(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Evaluate the homogeneous point at `u` with de Casteljau's algorithm.
    pub fn evaluate(&self, u: f64) -> [f64; D] {
        let mut pts = self.points.clone();
        for r in 1..pts.len() {
            for i in 0..pts.len() - r {
                pts[i] = lerp(&pts[i], &pts[i + 1], u);
            }
        }
        pts.first().copied().unwrap_or([0.; D])
    }

    /// Control points divided by their weights, or `None` if the weights do
    /// not share a strict sign (the curve may then leave the hull of the
    /// control points).
    pub fn dehomogenized(&self) -> Option<Vec<na::DVector<f64>>> {
        let pos = self.points.iter().all(|p| p[0] > 0.);
        let neg = self.points.iter().all(|p| p[0] < 0.);
        if !(pos || neg) || self.points.is_empty() {
            return None;
        }
        let pts = self
            .points
            .iter()
            .map(|p| na::DVector::from_iterator(D - 1, p[1..].iter().map(|x| x / p[0])))
            .collect();
        Some(pts)
    }

    /// Euclidean enclosing ball of the curve.
    pub fn ball(&self) -> Option<&MiniBall> {
        self.ball.get_or_init(|| MiniBall::new(&self.dehomogenized()?, None)).as_ref()
    }

    /// Split at `u` into the curves on `[0, u]` and `[u, 1]`.
    pub fn split_de_casteljau(&self, u: f64) -> (Self, Self) {
        let mut pts = self.points.clone();
        let n = pts.len();
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        for r in 0..n {
            left.push(pts[0]);
            right.push(pts[n - 1 - r]);
            for i in 0..n - 1 - r {
                pts[i] = lerp(&pts[i], &pts[i + 1], u);
            }
        }
        right.reverse();
        (Self::new(left), Self::new(right))
    }
}

/// A piece of a rational Bezier curve over a sub-interval of its parent.
#[derive(Clone, Debug)]
pub struct BezierSegment<const D: usize> {
    /// Curve re-parametrized to `[0, 1]`
    pub bezier: RationalBezier<D>,
    /// Interval in the parameter of the root curve
    pub interval: [f64; 2],
}

impl<const D: usize> BezierSegment<D> {
    /// The whole curve as a segment over `[0, 1]`.
    pub fn new(bezier: RationalBezier<D>) -> Self {
        Self { bezier, interval: [0., 1.] }
    }

    /// Split at the local parameter `u` (`0.5` is the midpoint).
    pub fn split_de_casteljau(&self, u: f64) -> [Self; 2] {
        let [a, b] = self.interval;
        let mid = a + u * (b - a);
        let (left, right) = self.bezier.split_de_casteljau(u);
        [Self { bezier: left, interval: [a, mid] }, Self { bezier: right, interval: [mid, b] }]
    }

    /// Map a parameter of the root curve into the local parameter.
    pub fn local(&self, u: f64) -> f64 {
        let [a, b] = self.interval;
        (u - a) / (b - a)
    }

    /// Enclosing ball of the piece.
    pub fn ball(&self) -> Option<&MiniBall> {
        self.bezier.ball()
    }
}

fn lerp<const D: usize>(a: &[f64; D], b: &[f64; D], u: f64) -> [f64; D] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * u)
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1., |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn power_to_bernstein() {
        // w = 1 + t^2, x = 2t, y = 1 - t^2 (circle)
        let polys = [
            Poly::new(vec![1., 0., 1.]),
            Poly::new(vec![0., 2.]),
            Poly::new(vec![1., 0., -1.]),
        ];
        let b = RationalBezier::from_polys(&polys, 2);
        assert_eq!(b.points(), &[[1., 0., 1.], [1., 1., 1.], [2., 2., 0.]]);
        for u in [0., 0.25, 0.6, 1.] {
            let p = b.evaluate(u);
            for (j, poly) in polys.iter().enumerate() {
                assert_abs_diff_eq!(p[j], poly.eval(&u), epsilon = 1e-12);
            }
        }
        let ball = b.ball().unwrap();
        assert!(ball.contains(&na::DVector::from_row_slice(&[0.6, 0.8])));
    }

    #[test]
    fn split_endpoints() {
        let b = RationalBezier::new(vec![[1., 0., 0.], [2., 1., 3.], [1., 4., 0.], [0.5, 1., 1.]]);
        let seg = BezierSegment::new(b.clone());
        let [l, r] = seg.split_de_casteljau(0.3);
        assert_eq!(l.interval, [0., 0.3]);
        assert_eq!(r.interval, [0.3, 1.]);
        let pairs = [(&l, 0., 0.), (&l, 1., 0.3), (&r, 0., 0.3), (&r, 1., 1.), (&l, 0.5, 0.15)];
        for (s, local, global) in pairs {
            let a = s.bezier.evaluate(local);
            let c = b.evaluate(global);
            for i in 0..3 {
                assert_abs_diff_eq!(a[i], c[i], epsilon = 1e-12);
            }
        }
        assert_abs_diff_eq!(r.local(0.65), 0.5, epsilon = 1e-12);
    }
}
