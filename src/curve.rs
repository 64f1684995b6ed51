//! Bezier curves of degree one to three
//!
//! Curves are stored as arrays of control points and share generic algorithms:
//! de Casteljau subdivision for evaluation and splitting, power basis for roots
//! and extremities, and integrals of Bernstein products for the signed area.
use crate::{almost_zero, poly_roots, ArrayIter, BBox, Point, Scalar, Transform, EPSILON};
use std::{fmt, ops::Mul};

/// Parameters at which curve crosses `y = 0`
pub type CurveRoots = ArrayIter<Scalar, 3>;
/// Parameters of extreme points along `x` and `y` axes
pub type CurveExtremities = ArrayIter<Scalar, 4>;

/// Number of uniform samples used to seed closest point search
const CLOSEST_SAMPLES: usize = 16;

/// Common operations on curves, all parameters are in `[0, 1]`
pub trait Curve: Sized + Into<Segment> {
    /// Apply affine transformation to the curve
    fn transform(&self, tr: Transform) -> Self;

    /// Point at `t = 0`
    fn start(&self) -> Point;

    /// Point at `t = 1`
    fn end(&self) -> Point;

    /// Evaluate curve at parameter `t`
    fn at(&self, t: Scalar) -> Point;

    /// Split curve in two halves
    fn split(&self) -> (Self, Self) {
        self.split_at(0.5)
    }

    /// Split curve at parameter `t`
    fn split_at(&self, t: Scalar) -> (Self, Self);

    /// Part of the curve between parameters `a` and `b`
    fn cut(&self, a: Scalar, b: Scalar) -> Self;

    /// Extend `init` bounding box (if any) with the tight bounding box of the curve
    fn bbox(&self, init: Option<BBox>) -> BBox;

    /// Derivative with respect to `t`
    fn deriv(&self) -> Segment;

    /// Same curve traversed in the opposite direction
    fn reverse(&self) -> Self;

    /// Roots of `y(t) = 0` in `[0, 1]`, in increasing order
    fn roots(&self) -> CurveRoots;

    /// Parameters in `(0, 1)` where `x'(t) = 0` or `y'(t) = 0`, in increasing order
    fn extremities(&self) -> CurveExtremities;

    /// Contribution of the curve to the signed area of a closed contour
    ///
    /// Equal to `1/2 ∫ (x y' - y x') dt`, sum over a counter-clockwise contour is
    /// positive.
    fn signed_area(&self) -> Scalar;
}

fn binomial(n: usize, k: usize) -> Scalar {
    if k > n {
        return 0.0;
    }
    (0..k).fold(1.0, |acc, i| acc * (n - i) as Scalar / (i + 1) as Scalar)
}

#[inline]
fn lerp(p0: Point, p1: Point, t: Scalar) -> Point {
    (1.0 - t) * p0 + t * p1
}

fn casteljau_at<const N: usize>(mut points: [Point; N], t: Scalar) -> Point {
    for level in 1..N {
        for index in 0..N - level {
            points[index] = lerp(points[index], points[index + 1], t);
        }
    }
    points[0]
}

/// Control points of both halves of the curve split at `t`
fn casteljau_split<const N: usize>(points: [Point; N], t: Scalar) -> ([Point; N], [Point; N]) {
    let (mut left, mut right, mut work) = (points, points, points);
    for level in 1..N {
        for index in 0..N - level {
            work[index] = lerp(work[index], work[index + 1], t);
        }
        left[level] = work[0];
        right[N - 1 - level] = work[N - 1 - level];
    }
    (left, right)
}

fn casteljau_cut<const N: usize>(points: [Point; N], a: Scalar, b: Scalar) -> [Point; N] {
    let (head, _) = casteljau_split(points, b);
    let t = if b == 0.0 { 0.0 } else { a / b };
    casteljau_split(head, t).1
}

/// Polynomial coefficients of the curve in increasing degree order
fn power_basis<const N: usize>(points: &[Point; N]) -> [Point; N] {
    let mut coeffs = [Point::default(); N];
    for (k, coeff) in coeffs.iter_mut().enumerate() {
        let diff = (0..=k).fold(Point::default(), |acc, i| {
            let sign = if (k - i) % 2 == 0 { 1.0 } else { -1.0 };
            acc + (sign * binomial(k, i)) * points[i]
        });
        *coeff = binomial(N - 1, k) * diff;
    }
    coeffs
}

fn extremities<const N: usize>(points: &[Point; N]) -> CurveExtremities {
    let coeffs = power_basis(points);
    let mut result = CurveExtremities::new();
    for axis in 0..2 {
        let deriv: ArrayIter<Scalar, 3> = coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, coeff)| k as Scalar * coeff.0[axis])
            .collect();
        result.extend(poly_roots(deriv.as_slice()).filter(|t| *t > 0.0 && *t < 1.0));
    }
    result.sorted()
}

/// `1/2 Σ p_i × p_j ∫ B_i B_j'` over Bernstein polynomials of degree `N - 1`
fn signed_area<const N: usize>(points: &[Point; N]) -> Scalar {
    let n = N - 1;
    // ∫ B_i^n B_k^(n-1) dt
    let product = |i: usize, k: Option<usize>| match k {
        Some(k) if k < n => {
            binomial(n, i) * binomial(n - 1, k)
                / (binomial(2 * n - 1, i + k) * (2 * n) as Scalar)
        }
        _ => 0.0,
    };
    let mut area = 0.0;
    for (i, pi) in points.iter().enumerate() {
        for (j, pj) in points.iter().enumerate() {
            if i != j {
                let weight = n as Scalar * (product(i, j.checked_sub(1)) - product(i, Some(j)));
                area += pi.cross(*pj) * weight;
            }
        }
    }
    area / 2.0
}

macro_rules! bezier_curve {
    ($name:ident, $size:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq)]
        pub struct $name(pub [Point; $size]);

        impl $name {
            /// Control points of the curve
            pub fn points(&self) -> [Point; $size] {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($name))?;
                for point in self.0.iter() {
                    write!(f, " {:?}", point)?;
                }
                Ok(())
            }
        }

        impl Curve for $name {
            fn transform(&self, tr: Transform) -> Self {
                Self(self.0.map(|point| tr.apply(point)))
            }

            fn start(&self) -> Point {
                self.0[0]
            }

            fn end(&self) -> Point {
                self.0[$size - 1]
            }

            fn at(&self, t: Scalar) -> Point {
                casteljau_at(self.0, t)
            }

            fn split_at(&self, t: Scalar) -> (Self, Self) {
                let (left, right) = casteljau_split(self.0, t);
                (Self(left), Self(right))
            }

            fn cut(&self, a: Scalar, b: Scalar) -> Self {
                Self(casteljau_cut(self.0, a, b))
            }

            fn bbox(&self, init: Option<BBox>) -> BBox {
                let bbox = BBox::new(self.start(), self.end()).union_opt(init);
                self.extremities()
                    .fold(bbox, |bbox, t| bbox.extend(self.at(t)))
            }

            fn deriv(&self) -> Segment {
                let degree = ($size - 1) as Scalar;
                let hodograph: ArrayIter<Point, 3> = self
                    .0
                    .windows(2)
                    .map(|pair| degree * (pair[1] - pair[0]))
                    .collect();
                Segment::from_control(hodograph.as_slice())
            }

            fn reverse(&self) -> Self {
                let mut points = self.0;
                points.reverse();
                Self(points)
            }

            fn roots(&self) -> CurveRoots {
                Segment::from(*self)
                    .y_roots()
                    .filter(|t| (0.0..=1.0).contains(t))
                    .collect()
            }

            fn extremities(&self) -> CurveExtremities {
                extremities(&self.0)
            }

            fn signed_area(&self) -> Scalar {
                signed_area(&self.0)
            }
        }

        impl From<$name> for Segment {
            fn from(curve: $name) -> Self {
                Segment::$name(curve)
            }
        }
    };
}

bezier_curve!(Line, 2, "Line segment");
bezier_curve!(Quad, 3, "Quadratic bezier curve");
bezier_curve!(Cubic, 4, "Cubic bezier curve");

impl Line {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into()])
    }

    pub fn length(&self) -> Scalar {
        self.start().dist(self.end())
    }

    /// Vector from the start to the end
    pub fn direction(&self) -> Point {
        self.end() - self.start()
    }

    /// Parameters `(t_self, t_other)` of the intersection of the infinite lines
    ///
    /// `None` if lines are parallel.
    pub fn intersect(&self, other: Line) -> Option<(Scalar, Scalar)> {
        let (d0, d1) = (self.direction(), other.direction());
        let det = d0.cross(d1);
        if det.abs() <= EPSILON * d0.length() * d1.length() {
            return None;
        }
        let offset = other.start() - self.start();
        Some((offset.cross(d1) / det, offset.cross(d0) / det))
    }

    /// Parameter of the orthogonal projection of the point, not clamped
    pub fn project(&self, point: Point) -> Scalar {
        let dir = self.direction();
        let length2 = dir.dot(dir);
        if length2 == 0.0 {
            0.0
        } else {
            (point - self.start()).dot(dir) / length2
        }
    }
}

impl Quad {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into(), p2.into()])
    }
}

impl Cubic {
    pub fn new(
        p0: impl Into<Point>,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> Self {
        Self([p0.into(), p1.into(), p2.into(), p3.into()])
    }
}

/// Closed set of curves a contour is made of
#[derive(Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Line),
    Quad(Quad),
    Cubic(Cubic),
}

macro_rules! dispatch {
    ($segment:expr, $curve:ident => $body:expr) => {
        match $segment {
            Segment::Line($curve) => $body,
            Segment::Quad($curve) => $body,
            Segment::Cubic($curve) => $body,
        }
    };
}

impl Segment {
    /// Segment with the given control points, a single point gives a constant line
    fn from_control(points: &[Point]) -> Self {
        match *points {
            [p0] => Line([p0, p0]).into(),
            [p0, p1] => Line([p0, p1]).into(),
            [p0, p1, p2] => Quad([p0, p1, p2]).into(),
            [p0, p1, p2, p3, ..] => Cubic([p0, p1, p2, p3]).into(),
            [] => Line([Point::default(); 2]).into(),
        }
    }

    /// Control points of the segment
    pub fn points(&self) -> &[Point] {
        dispatch!(self, curve => &curve.0)
    }

    /// All real roots of `y(t) = 0`, including ones outside of `[0, 1]`
    pub(crate) fn y_roots(&self) -> CurveRoots {
        dispatch!(self, curve => poly_roots(&power_basis(&curve.0).map(Point::y)))
    }

    /// Check if all control points are within tolerance of the start
    pub fn is_degenerate(&self, reference: Scalar) -> bool {
        let start = self.start();
        self.points()
            .iter()
            .all(|point| point.almost_equal(start, reference))
    }

    /// Check if both segments have the same type and control points within tolerance
    pub fn almost_equal(&self, other: &Segment, reference: Scalar) -> bool {
        let (ps0, ps1) = (self.points(), other.points());
        ps0.len() == ps1.len()
            && ps0
                .iter()
                .zip(ps1)
                .all(|(p0, p1)| p0.almost_equal(*p1, reference))
    }

    /// Parameter of the closest point on the segment and the distance to it
    pub fn closest(&self, point: Point) -> (Scalar, Scalar) {
        if let Segment::Line(line) = self {
            let t = line.project(point).clamp(0.0, 1.0);
            return (t, line.at(t).dist(point));
        }
        // seed with uniform samples, then Newton on `(c(t) - p) . c'(t) = 0`
        let mut best = (0.0, self.start().dist(point));
        for index in 1..=CLOSEST_SAMPLES {
            let t = index as Scalar / CLOSEST_SAMPLES as Scalar;
            let dist = self.at(t).dist(point);
            if dist < best.1 {
                best = (t, dist);
            }
        }
        let deriv = self.deriv();
        let deriv2 = deriv.deriv();
        let mut t = best.0;
        for _ in 0..8 {
            let offset = self.at(t) - point;
            let d1 = deriv.at(t);
            let f = offset.dot(d1);
            let df = d1.dot(d1) + offset.dot(deriv2.at(t));
            if df.abs() <= EPSILON * d1.dot(d1) {
                break;
            }
            let next = (t - f / df).clamp(0.0, 1.0);
            let done = (next - t).abs() < EPSILON;
            t = next;
            if done {
                break;
            }
        }
        let dist = self.at(t).dist(point);
        if dist < best.1 { (t, dist) } else { best }
    }

    /// Parameter at which segment passes through the point
    ///
    /// `None` if the point is not on the segment within the tolerance.
    pub fn from_point(&self, point: Point, reference: Scalar) -> Option<Scalar> {
        let (t, dist) = self.closest(point);
        almost_zero(dist, reference).then_some(t)
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, curve => fmt::Debug::fmt(curve, f))
    }
}

impl Curve for Segment {
    fn transform(&self, tr: Transform) -> Self {
        dispatch!(self, curve => curve.transform(tr).into())
    }

    fn start(&self) -> Point {
        dispatch!(self, curve => curve.start())
    }

    fn end(&self) -> Point {
        dispatch!(self, curve => curve.end())
    }

    fn at(&self, t: Scalar) -> Point {
        dispatch!(self, curve => curve.at(t))
    }

    fn split_at(&self, t: Scalar) -> (Self, Self) {
        dispatch!(self, curve => {
            let (left, right) = curve.split_at(t);
            (left.into(), right.into())
        })
    }

    fn cut(&self, a: Scalar, b: Scalar) -> Self {
        dispatch!(self, curve => curve.cut(a, b).into())
    }

    fn bbox(&self, init: Option<BBox>) -> BBox {
        dispatch!(self, curve => curve.bbox(init))
    }

    fn deriv(&self) -> Segment {
        dispatch!(self, curve => curve.deriv())
    }

    fn reverse(&self) -> Self {
        dispatch!(self, curve => curve.reverse().into())
    }

    fn roots(&self) -> CurveRoots {
        dispatch!(self, curve => curve.roots())
    }

    fn extremities(&self) -> CurveExtremities {
        dispatch!(self, curve => curve.extremities())
    }

    fn signed_area(&self) -> Scalar {
        dispatch!(self, curve => curve.signed_area())
    }
}

impl Mul<Transform> for Segment {
    type Output = Segment;

    fn mul(self, tr: Transform) -> Self::Output {
        self.transform(tr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn assert_params(found: impl Iterator<Item = Scalar>, expected: &[Scalar]) {
        let found: Vec<_> = found.collect();
        assert_eq!(found.len(), expected.len(), "{:?} != {:?}", found, expected);
        for (t, reference) in found.iter().zip(expected) {
            assert_approx_eq!(t, reference, 1e-9);
        }
    }

    #[test]
    fn test_roots() {
        let l = Line::new((0.0, -1.0), (2.0, 1.0));
        assert_params(l.roots(), &[0.5]);

        let q = Quad::new((0.0, -2.0), (7.0, 6.0), (6.0, -4.0));
        assert_params(q.roots(), &[0.15047207654837882, 0.73841681234051]);

        let c = Cubic::new((0.0, -2.0), (2.0, 4.0), (4.0, -3.0), (9.0, 1.0));
        assert_params(
            c.roots(),
            &[0.1627575589800928, 0.5810237541174236, 0.8812186869024836],
        );
        for t in Segment::from(c).roots() {
            assert_approx_eq!(c.at(t).y(), 0.0, 1e-12);
        }

        // roots outside of the curve are only reported by `y_roots`
        let l: Segment = Line::new((0.0, 1.0), (1.0, 2.0)).into();
        assert!(l.roots().next().is_none());
        assert_params(l.y_roots(), &[-1.0]);
    }

    #[test]
    fn test_split() {
        let q = Quad::new((0.0, 0.0), (8.0, 5.0), (4.0, 0.0));
        let (ql, qr) = q.split();
        assert_eq!((ql, qr), q.split_at(0.5));
        assert_eq!(ql, q.cut(0.0, 0.5));
        assert_eq!(qr, q.cut(0.5, 1.0));
        assert_eq!(ql.end(), q.at(0.5));

        let c = Cubic::new((3.0, 7.0), (2.0, 8.0), (0.0, 3.0), (6.0, 5.0));
        let (cl, cr) = c.split();
        assert_eq!(cl, c.cut(0.0, 0.5));
        assert_eq!(cr, c.cut(0.5, 1.0));
        assert!(cl.at(0.5).dist(c.at(0.25)) < 1e-12);
        assert!(cr.at(0.5).dist(c.at(0.75)) < 1e-12);

        let mid = c.cut(0.25, 0.75);
        assert!(mid.start().dist(c.at(0.25)) < 1e-12);
        assert!(mid.at(0.5).dist(c.at(0.5)) < 1e-12);
        assert!(mid.end().dist(c.at(0.75)) < 1e-12);

        let point = c.cut(0.0, 0.0);
        assert!(Segment::from(point).is_degenerate(1.0));
    }

    #[test]
    fn test_deriv() {
        let c = Cubic::new((0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0));
        let d = c.deriv();
        assert!(matches!(d, Segment::Quad(_)));
        // central difference
        let h = 1e-6;
        for t in [0.1, 0.5, 0.9] {
            let numeric = (c.at(t + h) - c.at(t - h)) / (2.0 * h);
            assert!(d.at(t).dist(numeric) < 1e-6);
        }
        let l = Line::new((1.0, 1.0), (3.0, 2.0)).deriv();
        assert!(l.at(0.3).dist(Point::new(2.0, 1.0)) < 1e-12);
        assert!(l.deriv().at(0.7).dist(Point::new(0.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_bbox() {
        let cubic = Cubic::new((106.0, 0.0), (0.0, 100.0), (382.0, 216.0), (324.0, 14.0));
        let bbox = cubic.bbox(None);
        assert_approx_eq!(bbox.x(), 87.308, 0.001);
        assert_approx_eq!(bbox.y(), 0.0, 0.001);
        assert_approx_eq!(bbox.width(), 242.724, 0.001);
        assert_approx_eq!(bbox.height(), 125.140, 0.001);

        let quad = Quad::new((30.0, 90.0), (220.0, 200.0), (120.0, 50.0));
        let bbox = quad.bbox(None);
        assert_approx_eq!(bbox.x(), 30.0, 0.001);
        assert_approx_eq!(bbox.y(), 50.0, 0.001);
        assert_approx_eq!(bbox.width(), 124.483, 0.001);
        assert_approx_eq!(bbox.height(), 86.538, 0.001);
    }

    #[test]
    fn test_signed_area() {
        // triangle (0, 0) -> (2, 0) -> (0, 2) counter-clockwise
        let area: Scalar = [
            Line::new((0.0, 0.0), (2.0, 0.0)),
            Line::new((2.0, 0.0), (0.0, 2.0)),
            Line::new((0.0, 2.0), (0.0, 0.0)),
        ]
        .iter()
        .map(|line| line.signed_area())
        .sum();
        assert_approx_eq!(area, 2.0);

        // parabola y = x^2 on [-1, 1] closed by a line, area is 4/3
        let quad = Quad::new((1.0, 1.0), (0.0, -1.0), (-1.0, 1.0));
        let close = Line::new((-1.0, 1.0), (1.0, 1.0));
        assert_approx_eq!(quad.signed_area() + close.signed_area(), -4.0 / 3.0, 1e-12);

        // degree elevated curve has the same area contribution
        let [p0, p1, p2] = quad.points();
        let cubic = Cubic::new(
            p0,
            p0 + (2.0 / 3.0) * (p1 - p0),
            p2 + (2.0 / 3.0) * (p1 - p2),
            p2,
        );
        assert_approx_eq!(cubic.signed_area(), quad.signed_area(), 1e-12);
    }

    #[test]
    fn test_line_intersect() {
        let l0 = Line::new((0.0, 0.0), (4.0, 4.0));
        let l1 = Line::new((0.0, 4.0), (4.0, 0.0));
        let (t0, t1) = l0.intersect(l1).expect("lines cross");
        assert_approx_eq!(t0, 0.5);
        assert_approx_eq!(t1, 0.5);
        assert!(l0.intersect(Line::new((1.0, 0.0), (2.0, 1.0))).is_none());
        // tiny lines are not parallel just because of their size
        let tiny = 1e-9;
        assert!(Line::new((0.0, 0.0), (tiny, 0.0))
            .intersect(Line::new((0.0, -tiny), (0.0, tiny)))
            .is_some());
    }

    #[test]
    fn test_closest() {
        let line: Segment = Line::new((0.0, 0.0), (4.0, 0.0)).into();
        let (t, dist) = line.closest(Point::new(1.0, 1.0));
        assert_approx_eq!(t, 0.25);
        assert_approx_eq!(dist, 1.0);

        let cubic: Segment = Cubic::new((0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)).into();
        for t in [0.0, 0.1, 0.37, 0.5, 0.81, 1.0] {
            let found = cubic.from_point(cubic.at(t), 16.0).unwrap();
            assert_approx_eq!(found, t, 1e-6);
        }
        assert!(cubic.from_point(Point::new(2.0, 3.0), 16.0).is_none());
    }
}
