//! Solid is an outer component with holes
use crate::{
    area_almost_zero, length_tolerance, process, BBox, BooleanOp, Component, Point,
    ProcessResult, Region, Scalar, SubPath, Transform,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Mul,
};

/// Area enclosed by a counter-clockwise outer component minus a region of holes
///
/// Holes are expected to lie inside of the outer component.
#[derive(Clone, PartialEq)]
pub struct Solid {
    outer: Component,
    holes: Region,
}

impl fmt::Debug for Solid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solid")
            .field("area", &self.area())
            .field("bbox", &self.bbox())
            .field("holes", &self.holes.len())
            .finish()
    }
}

impl Solid {
    /// Solid without holes, outer component is reoriented counter-clockwise
    pub fn new(outer: Component) -> Self {
        Self {
            outer: outer.positive(),
            holes: Region::empty(),
        }
    }

    /// Solid with holes
    pub fn with_holes(outer: Component, holes: Region) -> Self {
        Self {
            outer: outer.positive(),
            holes,
        }
    }

    /// Create solid, dropping it if its area is zero within tolerance
    pub(crate) fn checked(outer: Component, holes: Region, reference: Scalar) -> Option<Self> {
        let solid = Self::with_holes(outer, holes);
        let area = solid.area();
        if area_almost_zero(area, reference) {
            tracing::trace!("[solid:degenerate] area={}", area);
            None
        } else {
            Some(solid)
        }
    }

    /// Build solids from counter-clockwise outer loops and clockwise inner loops
    ///
    /// Each inner loop becomes a hole of the smallest outer loop containing it.
    pub(crate) fn assemble(
        outer: Vec<Component>,
        inner: Vec<Component>,
        reference: Scalar,
    ) -> Vec<Solid> {
        let tolerance = length_tolerance(reference);
        let mut holes: Vec<Vec<Solid>> = vec![Vec::new(); outer.len()];
        for hole in inner {
            let hole = hole.positive();
            let owner = outer
                .iter()
                .enumerate()
                .filter(|(_, outer)| {
                    outer.bbox().overlaps(hole.bbox(), tolerance)
                        && hole
                            .sample_outside_of(outer, reference)
                            .is_some_and(|point| outer.contains(point))
                })
                .min_by(|(_, c0), (_, c1)| c0.area().abs().total_cmp(&c1.area().abs()));
            match owner {
                Some((index, _)) => holes[index].push(Solid::new(hole)),
                None => tracing::trace!("[solid:orphan-hole] area={}", hole.area()),
            }
        }
        outer
            .into_iter()
            .zip(holes)
            .filter_map(|(outer, holes)| {
                Solid::checked(outer, Region::from_solids(holes), reference)
            })
            .collect()
    }

    /// Outer component, always counter-clockwise
    pub fn outer(&self) -> &Component {
        &self.outer
    }

    /// Region of holes
    pub fn holes(&self) -> &Region {
        &self.holes
    }

    /// Area of the outer component minus area of the holes
    pub fn area(&self) -> Scalar {
        (self.outer.area().abs() - self.holes.area()).max(0.0)
    }

    pub fn bbox(&self) -> BBox {
        self.outer.bbox()
    }

    /// Number of times solid covers the point
    pub fn winding(&self, point: Point) -> i32 {
        let winding = self.outer.winding(point);
        if winding == 0 {
            0
        } else {
            winding - self.holes.winding(point)
        }
    }

    /// Check if point is inside of the solid
    pub fn contains(&self, point: Point) -> bool {
        self.outer.contains(point) && !self.holes.contains(point)
    }

    /// Apply affine transformation
    pub fn transform(&self, tr: Transform) -> Self {
        Self {
            outer: self.outer.transform(tr).positive(),
            holes: self.holes.transform(tr),
        }
    }

    /// Outline of the solid, with outer boundary oriented as requested and holes
    /// oriented in the opposite direction
    pub(crate) fn subpaths(&self, positive: bool, out: &mut Vec<SubPath>) {
        let outer = if positive {
            self.outer.clone()
        } else {
            self.outer.reverse()
        };
        out.push(outer.to_subpath());
        for hole in self.holes.solids() {
            hole.subpaths(!positive, out);
        }
    }

    /// Union of two solids
    ///
    /// Returns `None` if solids do not overlap and can not be merged into one.
    pub fn union(&self, other: &Solid, reference: Scalar) -> Option<Vec<Solid>> {
        if !self.bbox().overlaps(other.bbox(), length_tolerance(reference)) {
            return None;
        }
        let base = match process(&self.outer, &other.outer, BooleanOp::Union, reference) {
            ProcessResult::None | ProcessResult::Regions(..) => return None,
            ProcessResult::Equal | ProcessResult::Superset => vec![Solid::new(self.outer.clone())],
            ProcessResult::Subset => vec![Solid::new(other.outer.clone())],
            ProcessResult::Loops { outer, inner } => {
                if outer.len() != 1 {
                    return None;
                }
                Solid::assemble(outer, inner, reference)
            }
        };
        // (H ∩ K) ∪ (H − Q) ∪ (K − P)
        let (h, k) = (&self.holes, &other.holes);
        let holes = if h.is_empty() && k.is_empty() {
            Region::empty()
        } else {
            let p = Region::from(Solid::new(self.outer.clone()));
            let q = Region::from(Solid::new(other.outer.clone()));
            h.intersection_ref(k, reference)
                .union_ref(&h.subtracting_ref(&q, reference), reference)
                .union_ref(&k.subtracting_ref(&p, reference), reference)
        };
        let result = Region::from_solids(base).subtracting_ref(&holes, reference);
        if result.len() != 1 {
            return None;
        }
        Some(result.into_solids())
    }

    /// Intersection of two solids
    pub fn intersection(&self, other: &Solid, reference: Scalar) -> Vec<Solid> {
        if !self.bbox().overlaps(other.bbox(), length_tolerance(reference)) {
            return Vec::new();
        }
        let base = match process(&self.outer, &other.outer, BooleanOp::Intersection, reference) {
            ProcessResult::None | ProcessResult::Regions(..) => return Vec::new(),
            ProcessResult::Equal | ProcessResult::Subset => vec![Solid::new(self.outer.clone())],
            ProcessResult::Superset => vec![Solid::new(other.outer.clone())],
            ProcessResult::Loops { outer, inner } => Solid::assemble(outer, inner, reference),
        };
        // H ∪ K
        let holes = self.holes.union_ref(&other.holes, reference);
        Region::from_solids(base)
            .subtracting_ref(&holes, reference)
            .into_solids()
    }

    /// Subtract other solid from this one
    pub fn subtracting(&self, other: &Solid, reference: Scalar) -> Vec<Solid> {
        if !self.bbox().overlaps(other.bbox(), length_tolerance(reference)) {
            return vec![self.clone()];
        }
        let (h, k) = (&self.holes, &other.holes);
        match process(&self.outer, &other.outer, BooleanOp::Subtraction, reference) {
            ProcessResult::None | ProcessResult::Loops { .. } => vec![self.clone()],
            ProcessResult::Equal => k.subtracting_ref(h, reference).into_solids(),
            ProcessResult::Superset => {
                // other is strictly inside, it becomes a hole and its holes become islands
                let q = Region::from(Solid::new(other.outer.clone()));
                let holes = h.union_ref(&q, reference);
                let mut result: Vec<Solid> =
                    Solid::checked(self.outer.clone(), holes, reference)
                        .into_iter()
                        .collect();
                result.extend(k.subtracting_ref(h, reference).into_solids());
                result
            }
            ProcessResult::Subset => {
                let p = Region::from(Solid::new(self.outer.clone()));
                p.intersection_ref(k, reference)
                    .subtracting_ref(h, reference)
                    .into_solids()
            }
            ProcessResult::Regions(left, right) => {
                let mut result = left.subtracting_ref(h, reference).into_solids();
                if !k.is_empty() {
                    result.extend(
                        right
                            .intersection_ref(k, reference)
                            .subtracting_ref(h, reference)
                            .into_solids(),
                    );
                }
                result
            }
        }
    }
}

/// Structural hash of the control points
impl Hash for Solid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.outer.hash(state);
        self.holes.hash(state);
    }
}

impl Mul<Transform> for &Solid {
    type Output = Solid;

    fn mul(self, tr: Transform) -> Self::Output {
        self.transform(tr)
    }
}

impl Mul<Transform> for Solid {
    type Output = Solid;

    fn mul(self, tr: Transform) -> Self::Output {
        self.transform(tr)
    }
}

impl From<Component> for Solid {
    fn from(outer: Component) -> Self {
        Solid::new(outer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, Line};

    fn rect(x: Scalar, y: Scalar, w: Scalar, h: Scalar) -> Component {
        Component::new([
            Line::new((x, y), (x + w, y)).into(),
            Line::new((x + w, y), (x + w, y + h)).into(),
            Line::new((x + w, y + h), (x, y + h)).into(),
        ])
        .expect("non empty")
    }

    fn ring(x: Scalar, y: Scalar, size: Scalar, border: Scalar) -> Solid {
        let hole = Solid::new(rect(x + border, y + border, size - 2.0 * border, size - 2.0 * border));
        Solid::with_holes(rect(x, y, size, size), Region::from(hole))
    }

    fn total_area(solids: &[Solid]) -> Scalar {
        solids.iter().map(Solid::area).sum()
    }

    #[test]
    fn test_solid_basic() {
        let s = ring(0.0, 0.0, 4.0, 1.0);
        assert_approx_eq!(s.area(), 12.0);
        assert!(s.contains(Point::new(0.5, 0.5)));
        assert!(!s.contains(Point::new(2.0, 2.0)));
        assert_eq!(s.winding(Point::new(2.0, 2.0)), 0);
        assert_eq!(s.winding(Point::new(0.5, 2.0)), 1);

        let t = &s * Transform::new_scale(-1.0, 2.0);
        assert!(t.outer().is_positive());
        assert_approx_eq!(t.area(), 24.0);

        let mut subpaths = Vec::new();
        s.subpaths(true, &mut subpaths);
        assert_eq!(subpaths.len(), 2);

        assert!(Solid::checked(rect(0.0, 0.0, 1.0, 1e-14), Region::empty(), 1.0).is_none());
    }

    #[test]
    fn test_solid_union() {
        let reference = 9.0;
        let a = Solid::new(rect(0.0, 0.0, 2.0, 2.0));
        let b = Solid::new(rect(1.0, 1.0, 2.0, 2.0));
        let result = a.union(&b, reference).expect("solids overlap");
        assert_eq!(result.len(), 1);
        assert_approx_eq!(total_area(&result), 7.0);

        let c = Solid::new(rect(5.0, 5.0, 1.0, 1.0));
        assert!(a.union(&c, 36.0).is_none());

        // hole partially covered by the other solid
        let r = ring(0.0, 0.0, 4.0, 1.0);
        let d = Solid::new(rect(1.5, -1.0, 1.0, 6.0));
        let result = r.union(&d, 36.0).expect("solids overlap");
        assert_eq!(result.len(), 1);
        assert_approx_eq!(total_area(&result), 12.0 + 2.0 + 1.0 + 1.0);
        assert_eq!(result[0].holes().len(), 2);
    }

    #[test]
    fn test_solid_intersection() {
        let r = ring(0.0, 0.0, 4.0, 1.0);
        let d = Solid::new(rect(1.5, -1.0, 1.0, 6.0));
        let result = r.intersection(&d, 36.0);
        assert_eq!(result.len(), 2);
        assert_approx_eq!(total_area(&result), 2.0);

        // disjoint with the hole
        let e = Solid::new(rect(1.5, 1.5, 1.0, 1.0));
        assert!(r.intersection(&e, 16.0).is_empty());
    }

    #[test]
    fn test_solid_subtracting() {
        let a = Solid::new(rect(0.0, 0.0, 4.0, 4.0));
        // strictly inside becomes a hole
        let b = Solid::new(rect(1.0, 1.0, 2.0, 2.0));
        let result = a.subtracting(&b, 16.0);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes().len(), 1);
        assert_approx_eq!(total_area(&result), 12.0);

        // ring inside produces an island
        let r = ring(0.5, 0.5, 3.0, 0.5);
        let result = a.subtracting(&r, 16.0);
        assert_eq!(result.len(), 2);
        assert_approx_eq!(total_area(&result), 16.0 - 5.0);

        // crossing
        let c = Solid::new(rect(2.0, 2.0, 4.0, 4.0));
        let result = a.subtracting(&c, 36.0);
        assert_approx_eq!(total_area(&result), 12.0);

        // equal
        assert!(a.subtracting(&a, 16.0).is_empty());
    }
}
