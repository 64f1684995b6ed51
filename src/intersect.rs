//! Segment-segment intersection
//!
//! Every combination of `Line`, `Quad` and `Cubic` is handled:
//!  - line/line is solved in closed form
//!  - line/curve maps the line to the x-axis and solves curve's `y(t) = 0`
//!  - curve/curve isolates candidates by bounding box subdivision and refines
//!    them with Newton's method
//!
//! All results are validated by evaluating both curves at the found parameters.
use crate::{
    almost_equal, length_tolerance, Curve, Line, Scalar, Segment, Transform, EPSILON,
    PARAM_TOLERANCE,
};

/// Maximum number of bounding box pairs examined by curve/curve subdivision
pub(crate) const SUBDIVISION_BUDGET: usize = 8192;
/// Stop subdividing once both boxes are smaller than this fraction of the scale
const SUBDIVISION_SIZE: Scalar = 1e-4;
/// Maximum overshoot of a parameter outside of `[0, 1]` before it is discarded
const PARAM_OVERSHOOT: Scalar = 1e-6;
/// Sample parameters used to confirm that two segments coincide
const COINCIDENT_SAMPLES: [Scalar; 3] = [0.25, 0.5, 0.75];

impl Segment {
    /// Find intersections between two segments
    ///
    /// Returns sorted by the parameter of `self` list of parameter pairs
    /// `(t_self, t_other)`. If segments partially coincide, only end points of the
    /// shared range are reported. `None` indicates that intersection could not be
    /// determined reliably and should be treated as absent.
    pub fn intersect(&self, other: &Segment, reference: Scalar) -> Option<Vec<(Scalar, Scalar)>> {
        self.intersect_with_budget(other, reference, SUBDIVISION_BUDGET)
    }

    /// Same as `intersect` with explicit limit on the number of curve/curve subdivision steps
    pub(crate) fn intersect_with_budget(
        &self,
        other: &Segment,
        reference: Scalar,
        budget: usize,
    ) -> Option<Vec<(Scalar, Scalar)>> {
        let tolerance = length_tolerance(reference);
        if !self.bbox(None).overlaps(other.bbox(None), tolerance) {
            return Some(Vec::new());
        }
        if self.is_degenerate(reference) || other.is_degenerate(reference) {
            return Some(Vec::new());
        }
        if let Some(overlap) = coincident(self, other, reference) {
            return Some(overlap);
        }

        let candidates = match (self, other) {
            (Segment::Line(l0), Segment::Line(l1)) => l0.intersect(*l1).into_iter().collect(),
            (Segment::Line(line), curve) => line_curve(*line, curve),
            (curve, Segment::Line(line)) => line_curve(*line, curve)
                .into_iter()
                .map(|(t1, t0)| (t0, t1))
                .collect(),
            _ => curve_curve(self, other, reference, budget)?,
        };

        let mut result: Vec<(Scalar, Scalar)> = Vec::with_capacity(candidates.len());
        for (t0, t1) in candidates {
            let (t0, t1) = match (
                split_check(self, t0, reference),
                split_check(other, t1, reference),
            ) {
                (Some(t0), Some(t1)) => (t0, t1),
                _ => continue,
            };
            if !self.at(t0).almost_equal(other.at(t1), reference) {
                tracing::trace!("[intersect:rejected] {:?} {:?} t=({}, {})", self, other, t0, t1);
                continue;
            }
            let duplicate = result.iter().any(|(r0, r1)| {
                (r0 - t0).abs() < PARAM_TOLERANCE * 10.0 && (r1 - t1).abs() < PARAM_TOLERANCE * 10.0
            });
            if !duplicate {
                result.push((t0, t1));
            }
        }
        result.sort_by(|(t0, _), (t1, _)| t0.total_cmp(t1));
        Some(result)
    }
}

/// Snap parameter to `0` or `1` if it is within tolerance from the ends of the segment
///
/// Returns `None` if parameter is outside of `[0, 1]` range.
pub(crate) fn split_check(segment: &Segment, t: Scalar, reference: Scalar) -> Option<Scalar> {
    if !t.is_finite() {
        return None;
    }
    let point = segment.at(t);
    let tolerance = length_tolerance(reference);
    if t <= 0.0 || point.dist(segment.start()) <= tolerance {
        (t >= -PARAM_OVERSHOOT || point.dist(segment.start()) <= tolerance).then_some(0.0)
    } else if t >= 1.0 || point.dist(segment.end()) <= tolerance {
        (t <= 1.0 + PARAM_OVERSHOOT || point.dist(segment.end()) <= tolerance).then_some(1.0)
    } else {
        Some(t)
    }
}

/// Detect segments which share a range of points
///
/// Returns parameter pairs at both ends of the shared range if segments coincide.
fn coincident(s0: &Segment, s1: &Segment, reference: Scalar) -> Option<Vec<(Scalar, Scalar)>> {
    let mut pairs: Vec<(Scalar, Scalar)> = Vec::with_capacity(4);
    for t0 in [0.0, 1.0] {
        if let Some(t1) = s1.from_point(s0.at(t0), reference) {
            pairs.push((t0, t1));
        }
    }
    for t1 in [0.0, 1.0] {
        if let Some(t0) = s0.from_point(s1.at(t1), reference) {
            pairs.push((t0, t1));
        }
    }
    let (first, last) = pairs.iter().fold(None, |acc: Option<((Scalar, Scalar), (Scalar, Scalar))>, pair| {
        Some(match acc {
            None => (*pair, *pair),
            Some((first, last)) => (
                if pair.0 < first.0 { *pair } else { first },
                if pair.0 > last.0 { *pair } else { last },
            ),
        })
    })?;
    if last.0 - first.0 < PARAM_TOLERANCE * 10.0 {
        return None;
    }
    let on_other = COINCIDENT_SAMPLES.iter().all(|ratio| {
        let t0 = first.0 + (last.0 - first.0) * ratio;
        s1.from_point(s0.at(t0), reference).is_some()
    });
    if !on_other {
        return None;
    }
    let first = (
        split_check(s0, first.0, reference)?,
        split_check(s1, first.1, reference)?,
    );
    let last = (
        split_check(s0, last.0, reference)?,
        split_check(s1, last.1, reference)?,
    );
    Some(vec![first, last])
}

/// Intersect line with a curve, returns pairs `(t_line, t_curve)` (not validated)
fn line_curve(line: Line, curve: &Segment) -> Vec<(Scalar, Scalar)> {
    let length = line.length();
    if length == 0.0 {
        return Vec::new();
    }
    let curve = curve.transform(Transform::make_horizontal(line));
    curve
        .y_roots()
        .filter(|t| (-PARAM_OVERSHOOT..=1.0 + PARAM_OVERSHOOT).contains(t))
        .map(|t| (curve.at(t).x() / length, t))
        .collect()
}

/// Intersect two curves, returns pairs `(t0, t1)` (not validated)
///
/// Divide curves as long as there is an intersection between bounding boxes, small
/// enough pairs are treated as approximate intersections which are refined with
/// Newton's method. Returns `None` if subdivision does not converge.
fn curve_curve(
    s0: &Segment,
    s1: &Segment,
    reference: Scalar,
    mut budget: usize,
) -> Option<Vec<(Scalar, Scalar)>> {
    let tolerance = length_tolerance(reference);
    let size = SUBDIVISION_SIZE * reference.abs().sqrt();
    let mut queue = vec![((*s0, 0.0, 1.0), (*s1, 0.0, 1.0))];
    let mut candidates = Vec::new();
    while let Some(((c0, a0, b0), (c1, a1, b1))) = queue.pop() {
        budget = match budget.checked_sub(1) {
            Some(budget) => budget,
            None => {
                tracing::trace!("[intersect:ambiguous] {:?} {:?}", s0, s1);
                return None;
            }
        };
        let bbox0 = c0.bbox(None);
        let bbox1 = c1.bbox(None);
        if !bbox0.overlaps(bbox1, tolerance) {
            continue;
        }
        let size0 = bbox0.width().max(bbox0.height());
        let size1 = bbox1.width().max(bbox1.height());
        if size0 <= size && size1 <= size {
            candidates.push(((a0 + b0) / 2.0, (a1 + b1) / 2.0));
            continue;
        }
        // split only curves with large bbox
        let m0 = (a0 + b0) / 2.0;
        let m1 = (a1 + b1) / 2.0;
        match (size0 > size, size1 > size) {
            (true, true) => {
                let (c00, c01) = c0.split();
                let (c10, c11) = c1.split();
                queue.push(((c00, a0, m0), (c10, a1, m1)));
                queue.push(((c00, a0, m0), (c11, m1, b1)));
                queue.push(((c01, m0, b0), (c10, a1, m1)));
                queue.push(((c01, m0, b0), (c11, m1, b1)));
            }
            (true, false) => {
                let (c00, c01) = c0.split();
                queue.push(((c00, a0, m0), (c1, a1, b1)));
                queue.push(((c01, m0, b0), (c1, a1, b1)));
            }
            _ => {
                let (c10, c11) = c1.split();
                queue.push(((c0, a0, b0), (c10, a1, m1)));
                queue.push(((c0, a0, b0), (c11, m1, b1)));
            }
        }
    }

    let mut result: Vec<(Scalar, Scalar)> = Vec::new();
    for (t0, t1) in candidates {
        let (t0, t1) = newton_refine(s0, s1, t0, t1);
        if !almost_equal(s0.at(t0).dist(s1.at(t1)), 0.0, reference) {
            continue;
        }
        let duplicate = result
            .iter()
            .any(|(r0, r1)| (r0 - t0).abs() < 1e-6 && (r1 - t1).abs() < 1e-6);
        if !duplicate {
            result.push((t0, t1));
        }
    }
    Some(result)
}

/// Refine intersection of two curves by solving `s0(t0) - s1(t1) = 0`
fn newton_refine(s0: &Segment, s1: &Segment, mut t0: Scalar, mut t1: Scalar) -> (Scalar, Scalar) {
    let d0 = s0.deriv();
    let d1 = s1.deriv();
    for _ in 0..16 {
        let f = s0.at(t0) - s1.at(t1);
        let c0 = d0.at(t0);
        let c1 = -d1.at(t1);
        let det = c0.cross(c1);
        if det.abs() <= EPSILON * c0.length() * c1.length() {
            break;
        }
        let dt0 = (-f).cross(c1) / det;
        let dt1 = c0.cross(-f) / det;
        t0 = (t0 + dt0).clamp(-PARAM_OVERSHOOT, 1.0 + PARAM_OVERSHOOT);
        t1 = (t1 + dt1).clamp(-PARAM_OVERSHOOT, 1.0 + PARAM_OVERSHOOT);
        if dt0.abs() < EPSILON && dt1.abs() < EPSILON {
            break;
        }
    }
    (t0, t1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, Cubic, Quad};

    const REF: Scalar = 100.0;

    fn check(s0: Segment, s1: Segment, expected: usize) -> Vec<(Scalar, Scalar)> {
        let result = s0.intersect(&s1, REF).expect("intersection is ambiguous");
        assert_eq!(result.len(), expected, "{:?}", result);
        for (t0, t1) in result.iter() {
            assert!(s0.at(*t0).dist(s1.at(*t1)) < 1e-6);
        }
        // symmetric
        let swapped = s1.intersect(&s0, REF).expect("intersection is ambiguous");
        assert_eq!(swapped.len(), expected);
        result
    }

    #[test]
    fn test_line_line() {
        let l0: Segment = Line::new((0.0, 0.0), (2.0, 2.0)).into();
        let l1: Segment = Line::new((0.0, 2.0), (2.0, 0.0)).into();
        let result = check(l0, l1, 1);
        assert_approx_eq!(result[0].0, 0.5);
        assert_approx_eq!(result[0].1, 0.5);

        // parallel
        let l2: Segment = Line::new((0.0, 1.0), (2.0, 3.0)).into();
        check(l0, l2, 0);

        // touching at the end
        let l3: Segment = Line::new((2.0, 2.0), (3.0, 0.0)).into();
        let result = check(l0, l3, 1);
        assert_eq!(result[0], (1.0, 0.0));
    }

    #[test]
    fn test_line_line_overlap() {
        let l0: Segment = Line::new((0.0, 0.0), (4.0, 0.0)).into();
        let l1: Segment = Line::new((6.0, 0.0), (2.0, 0.0)).into();
        let result = check(l0, l1, 2);
        assert_approx_eq!(result[0].0, 0.5);
        assert_approx_eq!(result[0].1, 1.0);
        assert_approx_eq!(result[1].0, 1.0);
        assert_approx_eq!(result[1].1, 0.5);
    }

    #[test]
    fn test_line_curve() {
        let line: Segment = Line::new((0.0, 1.0), (4.0, 1.0)).into();
        let quad: Segment = Quad::new((0.0, 0.0), (2.0, 4.0), (4.0, 0.0)).into();
        let result = check(line, quad, 2);
        assert_approx_eq!(result[0].0 + result[1].0, 1.0, 1e-9);

        let cubic: Segment = Cubic::new((0.0, 0.0), (1.0, 4.0), (3.0, -2.0), (4.0, 2.0)).into();
        let result = check(line, cubic, 3);
        for (t0, t1) in result {
            assert_approx_eq!(line.at(t0).y(), 1.0, 1e-9);
            assert_approx_eq!(cubic.at(t1).y(), 1.0, 1e-9);
        }

        let miss: Segment = Line::new((0.0, 5.0), (4.0, 5.0)).into();
        check(miss, quad, 0);
    }

    #[test]
    fn test_curve_curve() {
        let q0: Segment = Quad::new((0.0, 0.0), (2.0, 4.0), (4.0, 0.0)).into();
        let q1: Segment = Quad::new((0.0, 2.0), (2.0, -2.0), (4.0, 2.0)).into();
        let result = check(q0, q1, 2);
        for (t0, t1) in result {
            assert_approx_eq!(q0.at(t0).y(), 1.0, 1e-6);
            assert_approx_eq!(t0, t1, 1e-6);
        }

        let c0: Segment = Cubic::new((0.0, 0.0), (1.0, 3.0), (3.0, 3.0), (4.0, 0.0)).into();
        let c1: Segment = Cubic::new((0.0, 3.0), (1.0, 0.0), (3.0, 0.0), (4.0, 3.0)).into();
        check(c0, c1, 2);
        check(c0, q0, 2);
    }

    #[test]
    fn test_subdivision_budget() {
        let c0: Segment = Cubic::new((0.0, 0.0), (1.0, 3.0), (3.0, 3.0), (4.0, 0.0)).into();
        let c1: Segment = Cubic::new((0.0, 3.0), (1.0, 0.0), (3.0, 0.0), (4.0, 3.0)).into();
        assert!(c0.intersect_with_budget(&c1, REF, 1).is_none());
        assert!(c0.intersect_with_budget(&c1, REF, 0).is_none());
        assert_eq!(c0.intersect_with_budget(&c1, REF, SUBDIVISION_BUDGET).map(|r| r.len()), Some(2));

        // budget is not spent when bounding boxes are apart or one of segments is a line
        let far: Segment = Cubic::new((10.0, 0.0), (11.0, 3.0), (13.0, 3.0), (14.0, 0.0)).into();
        assert_eq!(c0.intersect_with_budget(&far, REF, 0), Some(Vec::new()));
        let line: Segment = Line::new((0.0, 1.0), (4.0, 1.0)).into();
        assert_eq!(c0.intersect_with_budget(&line, REF, 0).map(|r| r.len()), Some(2));
    }

    #[test]
    fn test_curve_coincident() {
        let cubic = Cubic::new((0.0, 0.0), (1.0, 3.0), (3.0, 3.0), (4.0, 0.0));
        let c0: Segment = cubic.into();
        let c1: Segment = cubic.cut(0.25, 1.0).into();
        let result = check(c0, c1, 2);
        assert_approx_eq!(result[0].0, 0.25, 1e-6);
        assert_approx_eq!(result[0].1, 0.0);
        assert_approx_eq!(result[1].0, 1.0);
        assert_approx_eq!(result[1].1, 1.0);
    }

    #[test]
    fn test_split_check() {
        let line: Segment = Line::new((0.0, 0.0), (10.0, 0.0)).into();
        assert_eq!(split_check(&line, -1e-12, REF), Some(0.0));
        assert_eq!(split_check(&line, 1e-10, REF), Some(0.0));
        assert_eq!(split_check(&line, 1.0 + 1e-12, REF), Some(1.0));
        assert_eq!(split_check(&line, 0.5, REF), Some(0.5));
        assert_eq!(split_check(&line, -0.1, REF), None);
        assert_eq!(split_check(&line, 1.1, REF), None);
    }
}
