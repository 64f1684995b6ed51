//! Region is a set of disjoint solids with boolean algebra defined on it
//!
//! All public operations translate both operands so that their combined bounding
//! box starts at the origin, and use its area as a reference for all tolerances.
use crate::{
    area_almost_zero, length_tolerance, BBox, Component, FillRule, Line, Path, Point, Scalar,
    Segment, Solid, Transform,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Mul,
    sync::Arc,
};

/// Ordered collection of disjoint solids
#[derive(Clone, PartialEq)]
pub struct Region {
    solids: Arc<[Solid]>,
}

impl Default for Region {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Region(Empty)");
        }
        f.debug_list().entries(self.solids.iter()).finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_path().fmt(f)
    }
}

impl Region {
    /// Empty region
    pub fn empty() -> Self {
        Self {
            solids: Arc::from(Vec::new()),
        }
    }

    /// Create region from solids, which are expected to be disjoint
    pub fn from_solids(solids: Vec<Solid>) -> Self {
        Self {
            solids: solids.into(),
        }
    }

    /// Region bounded by a single component, empty if the component has no area
    pub fn from_component(component: Component) -> Self {
        let bbox = component.bbox();
        if area_almost_zero(component.area(), bbox.width() * bbox.height()) {
            Self::empty()
        } else {
            Self::from(Solid::new(component))
        }
    }

    /// Axis aligned rectangle
    pub fn rect(bbox: BBox) -> Self {
        let Point([x0, y0]) = bbox.min();
        let Point([x1, y1]) = bbox.max();
        Self::polygon([(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    /// Rectangle with rounded corners, radii are clamped to the half of the size
    pub fn rounded_rect(bbox: BBox, radii: impl Into<Point>) -> Self {
        let path = Path::builder()
            .move_to(bbox.min())
            .rbox(Point::new(bbox.width(), bbox.height()), radii)
            .build();
        Self::from_path(&path, FillRule::NonZero)
    }

    /// Axis aligned ellipse approximated with cubic bezier curves
    pub fn ellipse(center: impl Into<Point>, rx: Scalar, ry: Scalar) -> Self {
        if rx == 0.0 || ry == 0.0 || !rx.is_finite() || !ry.is_finite() {
            return Self::empty();
        }
        let center = center.into();
        let mut path = Path::builder().circle(1.0).build();
        path.transform(Transform::new_scale(rx.abs(), ry.abs()));
        path.transform(Transform::new_translate(center.x(), center.y()));
        Self::from_path(&path, FillRule::NonZero)
    }

    /// Circle approximated with cubic bezier curves
    pub fn circle(center: impl Into<Point>, radius: Scalar) -> Self {
        Self::ellipse(center, radius, radius)
    }

    /// Polygon, points are expected to form a simple (not self-intersecting) contour
    pub fn polygon<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Self {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        let segments = points
            .windows(2)
            .filter(|pair| !pair[0].is_close_to(pair[1]))
            .map(|pair| Segment::from(Line::new(pair[0], pair[1])));
        match Component::new(segments) {
            Some(component) => Self::from_component(component),
            None => Self::empty(),
        }
    }

    /// Create region from closed sub-paths of the path using provided fill rule
    ///
    /// Open sub-paths are ignored. With `NonZero` rule the plane is split into
    /// faces by all components, and a face is filled if the sum of orientations
    /// of the components covering it is not zero.
    pub fn from_path(path: &Path, fill_rule: FillRule) -> Self {
        let mut components: Vec<Component> = path
            .subpaths()
            .iter()
            .filter(|subpath| {
                if !subpath.closed() {
                    tracing::trace!("[region:open-subpath] start={:?}", subpath.start());
                }
                subpath.closed()
            })
            .filter_map(|subpath| Component::new(subpath.segments().iter().copied()))
            .filter(|component| {
                let bbox = component.bbox();
                !area_almost_zero(component.area(), bbox.width() * bbox.height())
            })
            .collect();
        components.sort_by(|c0, c1| c1.area().abs().total_cmp(&c0.area().abs()));
        match fill_rule {
            FillRule::EvenOdd => components
                .into_iter()
                .fold(Region::empty(), |region, component| {
                    region.symmetric_difference(&Region::from_component(component))
                }),
            FillRule::NonZero => {
                let mut faces: Vec<(Region, i32)> = Vec::new();
                let mut covered = Region::empty();
                for component in components {
                    let delta = if component.is_positive() { 1 } else { -1 };
                    let shape = Region::from_component(component);
                    let mut next = Vec::with_capacity(faces.len() * 2 + 1);
                    for (face, winding) in faces {
                        let inside = face.intersection(&shape);
                        let outside = face.subtracting(&shape);
                        if !inside.is_empty() {
                            next.push((inside, winding + delta));
                        }
                        if !outside.is_empty() {
                            next.push((outside, winding));
                        }
                    }
                    let fresh = shape.subtracting(&covered);
                    if !fresh.is_empty() {
                        next.push((fresh, delta));
                    }
                    covered = covered.union(&shape);
                    faces = next;
                }
                tracing::trace!("[region:faces] {}", faces.len());
                faces
                    .into_iter()
                    .filter(|(_, winding)| *winding != 0)
                    .fold(Region::empty(), |region, (face, _)| region.union(&face))
            }
        }
    }

    /// Outline of the region, outer boundaries are counter-clockwise and holes are clockwise
    pub fn to_path(&self) -> Path {
        let mut subpaths = Vec::new();
        for solid in self.solids.iter() {
            solid.subpaths(true, &mut subpaths);
        }
        Path::new(subpaths)
    }

    /// Solids of the region
    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    pub fn into_solids(self) -> Vec<Solid> {
        self.solids.to_vec()
    }

    /// Number of solids
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Total area of all solids
    pub fn area(&self) -> Scalar {
        self.solids.iter().map(Solid::area).sum()
    }

    /// Bounding box of the region, `None` if region is empty
    pub fn bbox(&self) -> Option<BBox> {
        self.solids
            .iter()
            .fold(None, |bbox, solid| Some(solid.bbox().union_opt(bbox)))
    }

    /// Number of times region covers the point
    pub fn winding(&self, point: Point) -> i32 {
        self.solids.iter().map(|solid| solid.winding(point)).sum()
    }

    /// Check if point is inside of the region
    pub fn contains(&self, point: Point) -> bool {
        self.solids.iter().any(|solid| solid.contains(point))
    }

    /// Apply affine transformation
    ///
    /// Degenerate transformation collapses region to an empty one.
    pub fn transform(&self, tr: Transform) -> Self {
        if tr.is_degenerate() {
            return Self::empty();
        }
        Self {
            solids: self.solids.iter().map(|solid| solid.transform(tr)).collect(),
        }
    }

    /// Union of two regions
    pub fn union(&self, other: &Region) -> Region {
        let _span = tracing::debug_span!("[union]").entered();
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        self.with_frame(other, |left, right, reference| {
            left.union_ref(right, reference)
        })
    }

    /// Intersection of two regions
    pub fn intersection(&self, other: &Region) -> Region {
        let _span = tracing::debug_span!("[intersection]").entered();
        if self.is_empty() || other.is_empty() {
            return Region::empty();
        }
        self.with_frame(other, |left, right, reference| {
            left.intersection_ref(right, reference)
        })
    }

    /// Subtract other region from this one
    pub fn subtracting(&self, other: &Region) -> Region {
        let _span = tracing::debug_span!("[subtracting]").entered();
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        self.with_frame(other, |left, right, reference| {
            left.subtracting_ref(right, reference)
        })
    }

    /// Points which belong to exactly one of the regions
    pub fn symmetric_difference(&self, other: &Region) -> Region {
        let _span = tracing::debug_span!("[symmetric_difference]").entered();
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        self.with_frame(other, |left, right, reference| {
            left.symmetric_difference_ref(right, reference)
        })
    }

    /// Check if every point of this region belongs to the other
    pub fn is_subset(&self, other: &Region) -> bool {
        self.subtracting(other).is_empty()
    }

    /// Check if every point of the other region belongs to this one
    pub fn is_superset(&self, other: &Region) -> bool {
        other.is_subset(self)
    }

    /// Check if regions do not share any area
    pub fn is_disjoint(&self, other: &Region) -> bool {
        self.intersection(other).is_empty()
    }

    /// Check if regions cover the same area
    pub fn is_equal(&self, other: &Region) -> bool {
        self.symmetric_difference(other).is_empty()
    }

    /// Run operation on both regions translated to the origin
    fn with_frame(
        &self,
        other: &Region,
        op: impl FnOnce(&Region, &Region, Scalar) -> Region,
    ) -> Region {
        let bbox = match (self.bbox(), other.bbox()) {
            (Some(left), Some(right)) => left.union(right),
            (Some(bbox), None) | (None, Some(bbox)) => bbox,
            (None, None) => return Region::empty(),
        };
        let reference = bbox.width() * bbox.height();
        let Point([x, y]) = bbox.min();
        let to_origin = Transform::new_translate(-x, -y);
        let left = self * to_origin;
        let right = other * to_origin;
        tracing::debug!("[left] {}", left.len());
        tracing::debug!("[right] {}", right.len());
        let result = op(&left, &right, reference) * Transform::new_translate(x, y);
        tracing::debug!("[result] {}", result.len());
        result
    }

    /// Union with externally provided reference area
    ///
    /// Solids of the other region are merged into the accumulated solids, merge
    /// results are scheduled to be merged again.
    pub(crate) fn union_ref(&self, other: &Region, reference: Scalar) -> Region {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let tolerance = length_tolerance(reference);
        let mut result: Vec<Solid> = self.solids.to_vec();
        let mut queue: Vec<Solid> = other.solids.iter().rev().cloned().collect();
        'queue: while let Some(solid) = queue.pop() {
            for index in 0..result.len() {
                if !result[index].bbox().overlaps(solid.bbox(), tolerance) {
                    continue;
                }
                if let Some(merged) = result[index].union(&solid, reference) {
                    result.swap_remove(index);
                    queue.extend(merged);
                    continue 'queue;
                }
            }
            result.push(solid);
        }
        Region::from_solids(result)
    }

    /// Intersection with externally provided reference area
    pub(crate) fn intersection_ref(&self, other: &Region, reference: Scalar) -> Region {
        if self.is_empty() || other.is_empty() {
            return Region::empty();
        }
        let tolerance = length_tolerance(reference);
        let mut result = Vec::new();
        for left in self.solids.iter() {
            for right in other.solids.iter() {
                if left.bbox().overlaps(right.bbox(), tolerance) {
                    result.extend(left.intersection(right, reference));
                }
            }
        }
        Region::from_solids(result)
    }

    /// Subtraction with externally provided reference area
    pub(crate) fn subtracting_ref(&self, other: &Region, reference: Scalar) -> Region {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        let tolerance = length_tolerance(reference);
        let mut result: Vec<Solid> = self.solids.to_vec();
        for right in other.solids.iter() {
            result = result
                .into_iter()
                .flat_map(|left| {
                    if left.bbox().overlaps(right.bbox(), tolerance) {
                        left.subtracting(right, reference)
                    } else {
                        vec![left]
                    }
                })
                .collect();
        }
        Region::from_solids(result)
    }

    /// Symmetric difference with externally provided reference area
    pub(crate) fn symmetric_difference_ref(&self, other: &Region, reference: Scalar) -> Region {
        let disjoint = match (self.bbox(), other.bbox()) {
            (Some(left), Some(right)) => !left.overlaps(right, length_tolerance(reference)),
            _ => true,
        };
        if disjoint {
            let mut solids = self.solids.to_vec();
            solids.extend(other.solids.iter().cloned());
            return Region::from_solids(solids);
        }
        let left = self.subtracting_ref(other, reference);
        let right = other.subtracting_ref(self, reference);
        left.union_ref(&right, reference)
    }
}

impl From<Solid> for Region {
    fn from(solid: Solid) -> Self {
        Self {
            solids: Arc::from(vec![solid]),
        }
    }
}

impl From<Component> for Region {
    fn from(component: Component) -> Self {
        Self::from_component(component)
    }
}

/// Structural hash of the control points
impl Hash for Region {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.solids.len().hash(state);
        for solid in self.solids.iter() {
            solid.hash(state);
        }
    }
}

impl Mul<Transform> for &Region {
    type Output = Region;

    fn mul(self, tr: Transform) -> Self::Output {
        self.transform(tr)
    }
}

impl Mul<Transform> for Region {
    type Output = Region;

    fn mul(self, tr: Transform) -> Self::Output {
        self.transform(tr)
    }
}
