//! Paths as input and output of regions
use crate::{BBox, Cubic, Curve, Line, Point, Quad, Scalar, Segment, Transform};
use std::fmt;

/// Cubic control point offset for a quarter of a circle, `4/3 * tan(pi/8)`
const QUARTER_ARC: Scalar = 0.552_284_749_830_793_5;

/// Non-empty chain of segments, end of each segment is the start of the next one
#[derive(Clone, PartialEq)]
pub struct SubPath {
    segments: Vec<Segment>,
    /// Implicitly connected back to the start
    closed: bool,
}

impl fmt::Debug for SubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.segments.iter()).finish()?;
        if self.closed {
            f.write_str(" closed")?;
        }
        Ok(())
    }
}

impl SubPath {
    /// `None` if there are no segments
    pub fn new(segments: Vec<Segment>, closed: bool) -> Option<Self> {
        (!segments.is_empty()).then_some(Self { segments, closed })
    }

    /// Closed sub-path made of segments of a closed contour
    pub(crate) fn from_component(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            closed: true,
        }
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn start(&self) -> Point {
        self.segments[0].start()
    }

    pub fn end(&self) -> Point {
        self.segments[self.segments.len() - 1].end()
    }

    pub fn bbox(&self, init: Option<BBox>) -> BBox {
        self.segments
            .iter()
            .fold(init, |bbox, segment| Some(segment.bbox(bbox)))
            .unwrap_or_else(|| BBox::new(self.start(), self.start()))
    }

    pub fn transform(&mut self, tr: Transform) {
        self.segments
            .iter_mut()
            .for_each(|segment| *segment = segment.transform(tr));
    }
}

/// Rule which decides if a point is inside of a path given its winding number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FillRule {
    /// Inside if winding number is not zero
    #[default]
    NonZero,
    /// Inside if winding number is odd
    EvenOdd,
}

impl FillRule {
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// Collection of sub-paths
#[derive(Clone, PartialEq, Default)]
pub struct Path {
    subpaths: Vec<SubPath>,
}

impl Path {
    pub fn new(subpaths: Vec<SubPath>) -> Self {
        Self { subpaths }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    pub fn builder() -> PathBuilder {
        PathBuilder::new()
    }

    /// Apply transformation in place
    pub fn transform(&mut self, tr: Transform) {
        self.subpaths
            .iter_mut()
            .for_each(|subpath| subpath.transform(tr));
    }

    /// Bounding box of all sub-paths, `None` for an empty path
    pub fn bbox(&self) -> Option<BBox> {
        self.subpaths
            .iter()
            .fold(None, |bbox, subpath| Some(subpath.bbox(bbox)))
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.subpaths.iter()).finish()
    }
}

/// Compact SVG-like notation, commands are repeated only when segment type changes
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for subpath in self.subpaths.iter() {
            write!(f, "M{:?}", subpath.start())?;
            let mut previous = None;
            for segment in subpath.segments() {
                let (command, points) = match segment {
                    Segment::Line(line) => ('L', &line.0[1..]),
                    Segment::Quad(quad) => ('Q', &quad.0[1..]),
                    Segment::Cubic(cubic) => ('C', &cubic.0[1..]),
                };
                if previous.replace(command) == Some(command) {
                    f.write_str(" ")?;
                } else {
                    write!(f, "{}", command)?;
                }
                for (index, point) in points.iter().enumerate() {
                    if index != 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{:?}", point)?;
                }
            }
            if subpath.closed() {
                f.write_str("Z")?;
            }
        }
        Ok(())
    }
}

impl IntoIterator for Path {
    type Item = SubPath;
    type IntoIter = std::vec::IntoIter<SubPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.subpaths.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a SubPath;
    type IntoIter = std::slice::Iter<'a, SubPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.subpaths.iter()
    }
}

impl Extend<SubPath> for Path {
    fn extend<T: IntoIterator<Item = SubPath>>(&mut self, iter: T) {
        self.subpaths.extend(iter)
    }
}

/// Incremental path construction with a current position
#[derive(Clone, Default)]
pub struct PathBuilder {
    position: Point,
    subpath: Vec<Segment>,
    subpaths: Vec<SubPath>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish path, pending segments become an open sub-path
    pub fn build(&mut self) -> Path {
        let PathBuilder {
            subpath,
            mut subpaths,
            ..
        } = std::mem::take(self);
        subpaths.extend(SubPath::new(subpath, false));
        Path::new(subpaths)
    }

    /// Start new sub-path at the point, pending segments become an open sub-path
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        let subpath = std::mem::take(&mut self.subpath);
        self.subpaths.extend(SubPath::new(subpath, false));
        self.position = p.into();
        self
    }

    /// Close pending segments and move back to their start
    pub fn close(&mut self) -> &mut Self {
        let subpath = std::mem::take(&mut self.subpath);
        if let Some(first) = subpath.first() {
            self.position = first.start();
        }
        self.subpaths.extend(SubPath::new(subpath, true));
        self
    }

    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        let p = p.into();
        if !self.position.is_close_to(p) {
            self.push(Line([self.position, p]).into());
        }
        self
    }

    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) -> &mut Self {
        self.push(Quad::new(self.position, p1, p2).into())
    }

    pub fn cubic_to(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> &mut Self {
        self.push(Cubic::new(self.position, p1, p2, p3).into())
    }

    /// Quarter of an axis aligned ellipse towards `p`, `corner` is the corner of
    /// the bounding box of the arc between current position and `p`
    pub fn quarter_arc_to(&mut self, corner: impl Into<Point>, p: impl Into<Point>) -> &mut Self {
        let (corner, p) = (corner.into(), p.into());
        let p0 = self.position;
        self.cubic_to(
            p0 + QUARTER_ARC * (corner - p0),
            p + QUARTER_ARC * (corner - p),
            p,
        )
    }

    /// Counter-clockwise circle around current position, position is not changed
    pub fn circle(&mut self, radius: Scalar) -> &mut Self {
        let center = self.position;
        let corner = |x: Scalar, y: Scalar| center + Point::new(x * radius, y * radius);
        self.move_to(corner(1.0, 0.0))
            .quarter_arc_to(corner(1.0, 1.0), corner(0.0, 1.0))
            .quarter_arc_to(corner(-1.0, 1.0), corner(-1.0, 0.0))
            .quarter_arc_to(corner(-1.0, -1.0), corner(0.0, -1.0))
            .quarter_arc_to(corner(1.0, -1.0), corner(1.0, 0.0))
            .close()
            .move_to(center)
    }

    /// Counter-clockwise box with rounded corners, current position is its
    /// minimal corner
    ///
    /// Radii are clamped to the half of the corresponding size.
    pub fn rbox(&mut self, size: impl Into<Point>, radii: impl Into<Point>) -> &mut Self {
        let (size, radii) = (size.into(), radii.into());
        let Point([lx, ly]) = self.position;
        let (hx, hy) = (lx + size.x().abs(), ly + size.y().abs());
        let rx = radii.x().abs().min(size.x().abs() / 2.0);
        let ry = radii.y().abs().min(size.y().abs() / 2.0);
        let rounded = rx > 0.0 && ry > 0.0;

        self.move_to((lx + rx, ly)).line_to((hx - rx, ly));
        if rounded {
            self.quarter_arc_to((hx, ly), (hx, ly + ry));
        }
        self.line_to((hx, hy - ry));
        if rounded {
            self.quarter_arc_to((hx, hy), (hx - rx, hy));
        }
        self.line_to((lx + rx, hy));
        if rounded {
            self.quarter_arc_to((lx, hy), (lx, hy - ry));
        }
        self.line_to((lx, ly + ry));
        if rounded {
            self.quarter_arc_to((lx, ly), (lx + rx, ly));
        }
        self.close().move_to((lx, ly))
    }

    pub fn position(&self) -> Point {
        self.position
    }

    fn push(&mut self, segment: Segment) -> &mut Self {
        self.position = segment.end();
        self.subpath.push(segment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, PI};

    fn area(subpath: &SubPath) -> Scalar {
        let mut area: Scalar = subpath.segments().iter().map(Curve::signed_area).sum();
        if subpath.start() != subpath.end() {
            area += Line([subpath.end(), subpath.start()]).signed_area();
        }
        area
    }

    #[test]
    fn test_builder() {
        let path = Path::builder()
            .move_to((0.0, 0.0))
            .line_to((1.0, -1.0))
            .line_to((1.0, 0.0))
            .close()
            .line_to((0.0, 1.0))
            .line_to((0.0, 1.0))
            .quad_to((1.0, 2.0), (2.0, 1.0))
            .move_to((5.0, 5.0))
            .cubic_to((6.0, 6.0), (7.0, 6.0), (8.0, 5.0))
            .build();
        let subpaths = path.subpaths();
        assert_eq!(subpaths.len(), 3);
        assert!(subpaths[0].closed());
        assert_eq!(subpaths[0].segments().len(), 2);
        // close moves back to the start, repeated points are skipped
        assert_eq!(subpaths[1].start(), Point::new(0.0, 0.0));
        assert_eq!(subpaths[1].segments().len(), 2);
        assert!(!subpaths[2].closed());
        assert_eq!(subpaths[2].end(), Point::new(8.0, 5.0));
        assert!(Path::builder().build().is_empty());
    }

    #[test]
    fn test_circle() {
        let path = Path::builder().move_to((1.0, 1.0)).circle(2.0).build();
        assert_eq!(path.subpaths().len(), 1);
        let circle = &path.subpaths()[0];
        assert!(circle.closed());
        assert_approx_eq!(area(circle), PI * 4.0, 1e-2);
        let bbox = path.bbox().expect("path is not empty");
        assert_approx_eq!(bbox.x(), -1.0, 1e-12);
        assert_approx_eq!(bbox.width(), 4.0, 1e-12);
        // every point is close to the circle
        for segment in circle.segments() {
            for t in [0.25, 0.5, 0.75] {
                assert_approx_eq!(segment.at(t).dist(Point::new(1.0, 1.0)), 2.0, 1e-3);
            }
        }
    }

    #[test]
    fn test_rbox() {
        let path = Path::builder()
            .move_to((1.0, 2.0))
            .rbox((4.0, 2.0), (1.0, 5.0))
            .build();
        let rbox = &path.subpaths()[0];
        let bbox = rbox.bbox(None);
        assert_approx_eq!(bbox.x(), 1.0, 1e-12);
        assert_approx_eq!(bbox.y(), 2.0, 1e-12);
        assert_approx_eq!(bbox.width(), 4.0, 1e-12);
        assert_approx_eq!(bbox.height(), 2.0, 1e-12);
        // radii clamped to (1, 1), four quarter circles
        assert_approx_eq!(area(rbox), 8.0 - 4.0 + PI, 2e-3);

        let path = Path::builder().rbox((2.0, 3.0), (0.0, 0.0)).build();
        assert_eq!(path.subpaths()[0].segments().len(), 4);
        assert_approx_eq!(area(&path.subpaths()[0]), 6.0);
    }

    #[test]
    fn test_display() {
        let path = Path::builder()
            .move_to((0.0, 0.0))
            .line_to((2.0, 0.0))
            .line_to((2.0, 2.0))
            .quad_to((1.0, 3.0), (0.0, 2.0))
            .close()
            .build();
        assert_eq!(path.to_string(), "M0,0L2,0 2,2Q1,3 0,2Z");
        assert_eq!(Path::empty().to_string(), "");
    }

    #[test]
    fn test_fill_rule() {
        assert_eq!(FillRule::default(), FillRule::NonZero);
        assert!(FillRule::EvenOdd.is_inside(-1));
        assert!(!FillRule::EvenOdd.is_inside(2));
        assert!(FillRule::NonZero.is_inside(2));
        assert!(!FillRule::NonZero.is_inside(0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&FillRule::EvenOdd)?, "\"evenodd\"");
        let rule: FillRule = serde_json::from_str("\"nonzero\"")?;
        assert_eq!(rule, FillRule::NonZero);
        let point: Point = serde_json::from_str("[1.5, -2]")?;
        assert_eq!(point, Point::new(1.5, -2.0));
        Ok(())
    }
}
