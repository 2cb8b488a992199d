use super::*;

/// Parameter interval where two segments may be close.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityInterval {
    /// Zero for `t ∈ [-1, 1]`, one for the inverse parameter `1/t ∈ [-1, 1]`
    pub half: usize,
    /// Interval of the Bezier parameter `u`, where `t = 2u - 1` (or
    /// `1/t = 2u - 1`)
    pub interval: [f64; 2],
}

// The swept segment of a parameter interval is inside the hull of the
// control points of both end trajectories.
struct Swept {
    ends: [BezierSegment<4>; 2],
}

impl Swept {
    fn ball(&self) -> Option<MiniBall> {
        let [a, b] = &self.ends;
        let mut pts = a.bezier.dehomogenized()?;
        pts.extend(b.bezier.dehomogenized()?);
        MiniBall::new(&pts, None)
    }

    fn split(&self) -> [Self; 2] {
        let [a, b] = self.ends.each_ref().map(|s| s.split_de_casteljau(0.5));
        let [a0, a1] = a;
        let [b0, b1] = b;
        [Self { ends: [a0, b0] }, Self { ends: [a1, b1] }]
    }
}

/// Intervals of the full cycle where the bounding balls of two moving
/// segments overlap, subdivided `depth` times.
///
/// Intervals whose control points have weights of both signs cannot be
/// bounded and are kept as candidates.
pub fn proximity_intervals(
    a: &LineSegment,
    b: &LineSegment,
    depth: usize,
) -> Vec<ProximityInterval> {
    let mut out = Vec::new();
    for (half, (ea, eb)) in a.bezier_segments().into_iter().zip(b.bezier_segments()).enumerate() {
        refine(half, Swept { ends: ea }, Swept { ends: eb }, depth, &mut out);
    }
    out
}

fn refine(half: usize, a: Swept, b: Swept, depth: usize, out: &mut Vec<ProximityInterval>) {
    let close = match (a.ball(), b.ball()) {
        (Some(ba), Some(bb)) => ba.overlaps(&bb),
        _ => true,
    };
    if !close {
        return;
    }
    if depth == 0 {
        out.push(ProximityInterval { half, interval: a.ends[0].interval });
        return;
    }
    let [a0, a1] = a.split();
    let [b0, b1] = b.split();
    refine(half, a0, b0, depth - 1, out);
    refine(half, a1, b1, depth - 1, out);
}
