//! Enclosing balls of point sets.
use nalgebra as na;

/// Number of Bădoiu–Clarkson iterations, which bounds the relative radius
/// error by `1 / sqrt(ITER)`.
const ITER: usize = 400;

/// Enclosing ball of a finite point set under a metric `|x|² = xᵀ G x`.
///
/// The center is approximate but the radius is exact for that center, so
/// the ball always contains every input point.
#[derive(Clone, Debug, PartialEq)]
pub struct MiniBall {
    /// Center
    pub center: na::DVector<f64>,
    /// Squared radius
    pub radius2: f64,
    metric: Option<na::DMatrix<f64>>,
}

impl MiniBall {
    /// Compute the ball of the points under a symmetric positive definite
    /// metric, or the Euclidean metric if `None`.
    ///
    /// Returns `None` for an empty set.
    pub fn new(points: &[na::DVector<f64>], metric: Option<&na::DMatrix<f64>>) -> Option<Self> {
        let first = points.first()?;
        let metric = metric.cloned();
        let dist2 = |a: &na::DVector<f64>, b: &na::DVector<f64>| sq_norm(metric.as_ref(), &(a - b));
        let mut center = first.clone();
        for k in 1..ITER {
            let far = points.iter().max_by(|a, b| dist2(a, &center).total_cmp(&dist2(b, &center)))?;
            center += (far - &center) / (k + 1) as f64;
        }
        let radius2 = points.iter().map(|p| dist2(p, &center)).fold(0., f64::max);
        Some(Self { center, radius2, metric })
    }

    /// Radius.
    pub fn radius(&self) -> f64 {
        self.radius2.sqrt()
    }

    /// Return true if the point lies in the ball.
    pub fn contains(&self, p: &na::DVector<f64>) -> bool {
        sq_norm(self.metric.as_ref(), &(p - &self.center)) <= self.radius2 * (1. + 1e-12)
    }

    /// Return true if the two balls intersect. The metric of `self` is used.
    pub fn overlaps(&self, rhs: &Self) -> bool {
        let d = sq_norm(self.metric.as_ref(), &(&rhs.center - &self.center)).sqrt();
        d <= self.radius() + rhs.radius()
    }
}

fn sq_norm(metric: Option<&na::DMatrix<f64>>, v: &na::DVector<f64>) -> f64 {
    match metric {
        Some(g) => v.dot(&(g * v)),
        None => v.norm_squared(),
    }
}

#[test]
fn ball_of_square() {
    let pts = [[0., 0.], [2., 0.], [0., 2.], [2., 2.], [1., 1.]]
        .map(|p| na::DVector::from_row_slice(&p))
        .to_vec();
    let ball = MiniBall::new(&pts, None).unwrap();
    assert!(pts.iter().all(|p| ball.contains(p)));
    assert!((ball.radius() - 2f64.sqrt()).abs() < 0.1);
    // Stretched metric along x
    let g = na::DMatrix::from_diagonal(&na::DVector::from_row_slice(&[4., 1.]));
    let ball2 = MiniBall::new(&pts, Some(&g)).unwrap();
    assert!(pts.iter().all(|p| ball2.contains(p)));
    assert!(ball2.radius() > ball.radius());
    assert!(MiniBall::new(&[], None).is_none());
}
