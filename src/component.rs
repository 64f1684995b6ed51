//! Closed contour made of segments
use crate::{BBox, Curve, Line, Point, Scalar, Segment, SubPath, Transform};
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Mul,
    sync::Arc,
};

/// Closed non-empty sequence of segments
///
/// End of each segment coincides with the start of the next one, and the end of
/// the last segment coincides with the start of the first one. Positive area
/// corresponds to counter-clockwise orientation in y-up coordinate system.
#[derive(Clone)]
pub struct Component {
    segments: Arc<[Segment]>,
    bbox: BBox,
    area: Scalar,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments.iter() {
            writeln!(f, "{:?}", segment)?;
        }
        writeln!(f, "Close")
    }
}

impl Component {
    /// Create component from segments, closing it with a line if needed
    ///
    /// Returns `None` if there are no segments.
    pub fn new(segments: impl IntoIterator<Item = Segment>) -> Option<Self> {
        let mut segments: Vec<Segment> = segments.into_iter().collect();
        let first = segments.first()?.start();
        let last = segments.last()?.end();
        if !first.is_close_to(last) {
            segments.push(Line::new(last, first).into());
        }
        let bbox = segments
            .iter()
            .fold(None, |bbox, segment| Some(segment.bbox(bbox)))?;
        let area = segments.iter().map(Curve::signed_area).sum();
        Some(Self {
            segments: segments.into(),
            bbox,
            area,
        })
    }

    /// Segments of the component
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Component always contains at least one segment
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bounding box of the component
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Signed area, positive for counter-clockwise orientation
    pub fn area(&self) -> Scalar {
        self.area
    }

    /// Whether component is oriented counter-clockwise
    pub fn is_positive(&self) -> bool {
        self.area >= 0.0
    }

    /// Starting point of the component
    pub fn start(&self) -> Point {
        self.segments[0].start()
    }

    /// Same contour traversed in the opposite direction
    pub fn reverse(&self) -> Self {
        let segments: Vec<_> = self.segments.iter().rev().map(Curve::reverse).collect();
        Self {
            segments: segments.into(),
            bbox: self.bbox,
            area: -self.area,
        }
    }

    /// Same contour with counter-clockwise orientation
    pub fn positive(&self) -> Self {
        if self.is_positive() {
            self.clone()
        } else {
            self.reverse()
        }
    }

    /// Apply affine transformation
    pub fn transform(&self, tr: Transform) -> Self {
        let segments: Vec<_> = self
            .segments
            .iter()
            .map(|segment| segment.transform(tr))
            .collect();
        let bbox = segments
            .iter()
            .fold(None, |bbox, segment| Some(segment.bbox(bbox)))
            .unwrap_or(self.bbox);
        Self {
            segments: segments.into(),
            bbox,
            area: self.area * tr.det(),
        }
    }

    /// Winding number of the component around the point
    ///
    /// Counts crossings of the ray directed from the point towards positive x,
    /// upward crossings contribute `+1` and downward `-1`. Half-open rule is used
    /// for crossings at vertices, so each crossing is counted exactly once.
    pub fn winding(&self, point: Point) -> i32 {
        let Point([x, y]) = point;
        if !(self.bbox.min().y()..=self.bbox.max().y()).contains(&y) || x > self.bbox.max().x() {
            return 0;
        }
        let mut winding = 0;
        for segment in self.segments.iter() {
            let bbox = segment.bbox(None);
            if y < bbox.min().y() || y > bbox.max().y() || x > bbox.max().x() {
                continue;
            }
            match segment {
                Segment::Line(_) => winding += monotone_winding(*segment, point),
                _ => {
                    let mut params: Vec<Scalar> = segment
                        .extremities()
                        .filter(|t| *t > 0.0 && *t < 1.0)
                        .collect();
                    params.sort_by(Scalar::total_cmp);
                    let mut start = 0.0;
                    for end in params.into_iter().chain(Some(1.0)) {
                        winding += monotone_winding(segment.cut(start, end), point);
                        start = end;
                    }
                }
            }
        }
        winding
    }

    /// Check if point is inside of the component
    pub fn contains(&self, point: Point) -> bool {
        self.winding(point) != 0
    }

    /// Check if point lies on the boundary of the component
    pub fn on_boundary(&self, point: Point, reference: Scalar) -> bool {
        self.segments.iter().any(|segment| {
            segment
                .bbox(None)
                .overlaps(BBox::new(point, point), crate::length_tolerance(reference))
                && segment.from_point(point, reference).is_some()
        })
    }

    /// Find a point on the component which does not lie on the boundary of the other
    pub(crate) fn sample_outside_of(&self, other: &Component, reference: Scalar) -> Option<Point> {
        [0.5, 0.25, 0.75].into_iter().find_map(|t| {
            self.segments
                .iter()
                .map(|segment| segment.at(t))
                .find(|point| !other.on_boundary(*point, reference))
        })
    }

    /// Check if both components describe the same contour
    ///
    /// Components are equal if they have the same number of segments and the
    /// segments match pairwise after a cyclic shift.
    pub fn almost_equal(&self, other: &Component, reference: Scalar) -> bool {
        let count = self.segments.len();
        if count != other.segments.len() {
            return false;
        }
        let first = &self.segments[0];
        (0..count).any(|shift| {
            other.segments[shift].almost_equal(first, reference)
                && (1..count).all(|index| {
                    self.segments[index]
                        .almost_equal(&other.segments[(index + shift) % count], reference)
                })
        })
    }

    /// Convert to closed sub-path
    pub fn to_subpath(&self) -> SubPath {
        SubPath::from_component(self.segments.to_vec())
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

/// Structural hash of the control points
///
/// Consistent with `PartialEq`, negative zero is hashed as zero.
impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.len().hash(state);
        let mut buffer = [Point::default(); 4];
        for segment in self.segments.iter() {
            let points = segment.points();
            points.len().hash(state);
            for (normal, point) in buffer.iter_mut().zip(points) {
                *normal = Point::new(point.x() + 0.0, point.y() + 0.0);
            }
            state.write(bytemuck::cast_slice(&buffer[..points.len()]));
        }
    }
}

impl Mul<Transform> for &Component {
    type Output = Component;

    fn mul(self, tr: Transform) -> Self::Output {
        self.transform(tr)
    }
}

impl Mul<Transform> for Component {
    type Output = Component;

    fn mul(self, tr: Transform) -> Self::Output {
        self.transform(tr)
    }
}

/// Winding contribution of the segment monotonic in y
fn monotone_winding(segment: Segment, point: Point) -> i32 {
    let Point([x, y]) = point;
    let (y0, y1) = (segment.start().y(), segment.end().y());
    let direction = if y0 <= y && y < y1 {
        1
    } else if y1 <= y && y < y0 {
        -1
    } else {
        return 0;
    };
    let cross_x = match segment {
        Segment::Line(Line([p0, p1])) => p0.x() + (p1.x() - p0.x()) * (y - y0) / (y1 - y0),
        _ => {
            let shifted = segment.transform(Transform::new_translate(0.0, -y));
            match shifted.roots().next() {
                Some(t) => segment.at(t).x(),
                None if (y - y0).abs() < (y - y1).abs() => segment.start().x(),
                None => segment.end().x(),
            }
        }
    };
    if cross_x > x { direction } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, Cubic, Quad};

    fn square(x: Scalar, y: Scalar, size: Scalar) -> Component {
        Component::new([
            Line::new((x, y), (x + size, y)).into(),
            Line::new((x + size, y), (x + size, y + size)).into(),
            Line::new((x + size, y + size), (x, y + size)).into(),
        ])
        .expect("non empty")
    }

    #[test]
    fn test_component_new() {
        let c = square(0.0, 0.0, 2.0);
        assert_eq!(c.len(), 4);
        assert_approx_eq!(c.area(), 4.0);
        assert!(c.is_positive());
        assert_eq!(c.bbox(), BBox::new((0.0, 0.0), (2.0, 2.0)));

        let r = c.reverse();
        assert_approx_eq!(r.area(), -4.0);
        assert!(r.positive().is_positive());
        assert!(Component::new(Vec::new()).is_none());
    }

    #[test]
    fn test_winding() {
        let c = square(0.0, 0.0, 2.0);
        assert_eq!(c.winding(Point::new(1.0, 1.0)), 1);
        assert_eq!(c.reverse().winding(Point::new(1.0, 1.0)), -1);
        assert_eq!(c.winding(Point::new(3.0, 1.0)), 0);
        assert_eq!(c.winding(Point::new(-1.0, 1.0)), 0);
        // ray passes through vertices
        assert_eq!(c.winding(Point::new(1.0, 0.0)), 1);
        assert_eq!(c.winding(Point::new(-1.0, 0.0)), 0);
        assert_eq!(c.winding(Point::new(-1.0, 2.0)), 0);

        // parabola closed with a line, counter-clockwise
        let c = Component::new([
            Quad::new((-1.0, 1.0), (0.0, -1.0), (1.0, 1.0)).into(),
            Line::new((1.0, 1.0), (-1.0, 1.0)).into(),
        ])
        .expect("non empty");
        assert_approx_eq!(c.area(), 4.0 / 3.0);
        assert_eq!(c.winding(Point::new(0.0, 0.5)), 1);
        assert_eq!(c.winding(Point::new(0.9, 0.5)), 0);
        assert_eq!(c.winding(Point::new(-0.9, 0.5)), 0);
        assert_eq!(c.winding(Point::new(0.0, -0.1)), 0);

        // cubic arch closed with a line, clockwise
        let c = Component::new([Cubic::new((0.0, 0.0), (0.0, 3.0), (2.0, 3.0), (2.0, 0.0)).into()])
            .expect("non empty");
        assert_eq!(c.len(), 2);
        assert!(!c.is_positive());
        assert_eq!(c.winding(Point::new(1.0, 1.0)), -1);
        assert_eq!(c.winding(Point::new(1.0, 2.5)), 0);
        assert_eq!(c.winding(Point::new(3.0, 1.0)), 0);
    }

    #[test]
    fn test_transform() {
        let c = square(0.0, 0.0, 1.0);
        let t = &c * Transform::new_scale(-2.0, 3.0);
        assert_approx_eq!(t.area(), -6.0);
        assert_eq!(t.bbox(), BBox::new((-2.0, 0.0), (0.0, 3.0)));
        assert_approx_eq!(t.area(), t.segments().iter().map(Curve::signed_area).sum::<Scalar>());
    }

    #[test]
    fn test_almost_equal() {
        let c0 = square(0.0, 0.0, 1.0);
        let c1 = Component::new([
            Line::new((1.0, 1.0), (0.0, 1.0 + 1e-12)).into(),
            Line::new((0.0, 1.0 + 1e-12), (0.0, 0.0)).into(),
            Line::new((0.0, 0.0), (1.0, 0.0)).into(),
            Line::new((1.0, 0.0), (1.0, 1.0)).into(),
        ])
        .expect("non empty");
        assert!(c0.almost_equal(&c1, 1.0));
        assert!(!c0.almost_equal(&c1.reverse(), 1.0));
        assert!(!c0.almost_equal(&square(0.0, 0.0, 1.1), 1.0));
    }

    #[test]
    fn test_hash_signed_zero() {
        use std::collections::hash_map::DefaultHasher;
        fn hash(component: &Component) -> u64 {
            let mut hasher = DefaultHasher::new();
            component.hash(&mut hasher);
            hasher.finish()
        }
        let c0 = square(0.0, 0.0, 1.0);
        let c1 = square(-0.0, -0.0, 1.0);
        assert_eq!(c0, c1);
        assert_eq!(hash(&c0), hash(&c1));
        assert_ne!(hash(&c0), hash(&square(0.0, 0.0, 2.0)));
    }

    #[test]
    fn test_boundary() {
        let c = square(0.0, 0.0, 1.0);
        assert!(c.on_boundary(Point::new(0.5, 0.0), 1.0));
        assert!(!c.on_boundary(Point::new(0.5, 0.5), 1.0));
        let other = square(0.0, 0.0, 0.5);
        let sample = c.sample_outside_of(&other, 1.0).expect("sample exists");
        assert!(!other.on_boundary(sample, 1.0));
    }
}
