//! Boolean operations on a pair of components
//!
//! Boundaries of both components are cut at their intersections into arcs, each
//! arc is classified against the other component, and arcs selected by the
//! operation are linked back into closed loops.
use crate::{
    area_almost_zero, intersect::SUBDIVISION_BUDGET, length_tolerance, BBox, Component, Cubic,
    Curve, Line, Point, Quad, Region, Scalar, Segment, Solid, PARAM_TOLERANCE,
};
use std::{cmp::Ordering, fmt};

/// Boolean operation applied to a pair of components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Intersection,
    Subtraction,
}

/// Position on a component, index of the segment and parameter on it
#[derive(Clone, Copy)]
pub struct Split {
    pub index: usize,
    pub t: Scalar,
}

impl fmt::Debug for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:.6}", self.index, self.t)
    }
}

impl Split {
    pub fn new(index: usize, t: Scalar) -> Self {
        Self { index, t }
    }

    /// Move split at the end of a segment to the start of the next one
    pub fn normalize(self, count: usize) -> Self {
        if self.t >= 1.0 {
            Self::new((self.index + 1) % count, 0.0)
        } else {
            self
        }
    }

    /// Check if both splits denote the same position on a component
    pub fn almost_equal(&self, other: &Split) -> bool {
        self.index == other.index && (self.t - other.t).abs() <= PARAM_TOLERANCE * 10.0
    }
}

impl PartialEq for Split {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Split {}

impl PartialOrd for Split {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Split {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.t.total_cmp(&other.t))
    }
}

/// Relation between components which boundaries do not cross
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Components do not share any area
    None,
    /// Components describe the same contour
    Equal,
    /// Right component is inside of the left one
    Superset,
    /// Left component is inside of the right one
    Subset,
}

/// Result of the boolean operation on a pair of components
#[derive(Debug, Clone)]
pub enum ProcessResult {
    None,
    Equal,
    Superset,
    Subset,
    /// Subtraction of crossing components, `left = a - b` and `right = a ∩ b`
    Regions(Region, Region),
    /// Union or intersection of crossing components
    ///
    /// `outer` contains counter-clockwise loops, `inner` contains clockwise loops
    /// which are holes of the outer ones.
    Loops {
        outer: Vec<Component>,
        inner: Vec<Component>,
    },
}

impl From<Overlap> for ProcessResult {
    fn from(overlap: Overlap) -> Self {
        match overlap {
            Overlap::None => ProcessResult::None,
            Overlap::Equal => ProcessResult::Equal,
            Overlap::Superset => ProcessResult::Superset,
            Overlap::Subset => ProcessResult::Subset,
        }
    }
}

/// Component an arc was cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Position of an arc relative to the other component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Inside,
    Outside,
    /// Lies on the other boundary and has the same direction
    Same,
    /// Lies on the other boundary and has the opposite direction
    Opposite,
}

/// Part of a component boundary between two consecutive graph nodes
#[derive(Debug, Clone)]
pub struct Edge {
    pub segments: Vec<Segment>,
    pub start: usize,
    pub end: usize,
    pub side: Side,
    pub position: Position,
}

impl Edge {
    fn reverse(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(Curve::reverse).collect(),
            start: self.end,
            end: self.start,
            side: self.side,
            position: self.position,
        }
    }
}

/// Crossing graph of two components
///
/// Nodes are intersection points of both boundaries (nearly coincident crossings
/// are merged), edges are arcs of the boundaries between consecutive nodes.
#[derive(Debug)]
pub struct IntersectionTable {
    nodes: Vec<Point>,
    left: Vec<(Split, usize)>,
    right: Vec<(Split, usize)>,
    left_edges: Vec<Edge>,
    right_edges: Vec<Edge>,
}

impl IntersectionTable {
    /// Find all crossings of the components and classify resulting arcs
    pub fn new(a: &Component, b: &Component, reference: Scalar) -> Self {
        Self::with_budget(a, b, reference, SUBDIVISION_BUDGET)
    }

    /// Same as `new` with explicit curve/curve subdivision budget
    ///
    /// Pairs of segments which intersection is ambiguous do not produce nodes.
    pub(crate) fn with_budget(
        a: &Component,
        b: &Component,
        reference: Scalar,
        budget: usize,
    ) -> Self {
        let tolerance = length_tolerance(reference);
        let a_bboxes: Vec<_> = a.segments().iter().map(|s| s.bbox(None)).collect();
        let b_bboxes: Vec<_> = b.segments().iter().map(|s| s.bbox(None)).collect();

        let mut nodes: Vec<Point> = Vec::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (i, sa) in a.segments().iter().enumerate() {
            if !a_bboxes[i].overlaps(b.bbox(), tolerance) {
                continue;
            }
            for (j, sb) in b.segments().iter().enumerate() {
                if !a_bboxes[i].overlaps(b_bboxes[j], tolerance) {
                    continue;
                }
                let Some(pairs) = sa.intersect_with_budget(sb, reference, budget) else {
                    tracing::trace!("[process:ambiguous] left={} right={}", i, j);
                    continue;
                };
                for (t0, t1) in pairs {
                    let point = sa.at(t0);
                    let node = match nodes
                        .iter()
                        .position(|node| node.almost_equal(point, reference))
                    {
                        Some(node) => node,
                        None => {
                            nodes.push(point);
                            nodes.len() - 1
                        }
                    };
                    left.push((Split::new(i, t0).normalize(a.len()), node));
                    right.push((Split::new(j, t1).normalize(b.len()), node));
                }
            }
        }
        let left = dedup_splits(left);
        let right = dedup_splits(right);
        let left_edges = edges(a, b, &left, &nodes, Side::Left, reference);
        let right_edges = edges(b, a, &right, &nodes, Side::Right, reference);
        Self {
            nodes,
            left,
            right,
            left_edges,
            right_edges,
        }
    }

    /// Intersection points of both boundaries
    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }

    /// Positions of the nodes on the given side
    pub fn splits(&self, side: Side) -> &[(Split, usize)] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Classified arcs of the given side
    pub fn edges(&self, side: Side) -> &[Edge] {
        match side {
            Side::Left => &self.left_edges,
            Side::Right => &self.right_edges,
        }
    }

    /// Nodes where boundary of the given side touches the other boundary without crossing it
    pub fn touches(&self, side: Side) -> Vec<usize> {
        let edges = self.edges(side);
        if edges.len() < 2 {
            return edges.iter().map(|edge| edge.start).collect();
        }
        (0..edges.len())
            .filter_map(|index| {
                let prev = &edges[(index + edges.len() - 1) % edges.len()];
                let next = &edges[index];
                (prev.end == next.start && prev.position == next.position).then_some(next.start)
            })
            .collect()
    }

    /// Relation between components if their boundaries do not cross
    pub fn overlap(&self, a: &Component, b: &Component, reference: Scalar) -> Option<Overlap> {
        if self.nodes.is_empty() {
            return Some(containment(a, b, reference));
        }
        let uniform = |edges: &[Edge]| {
            let position = edges.first()?.position;
            edges
                .iter()
                .all(|edge| edge.position == position)
                .then_some(position)
        };
        match (uniform(&self.left_edges)?, uniform(&self.right_edges)?) {
            (Position::Same, Position::Same) => Some(Overlap::Equal),
            (Position::Outside, Position::Inside) => Some(Overlap::Superset),
            (Position::Inside, Position::Outside) => Some(Overlap::Subset),
            (Position::Outside, Position::Outside) => Some(Overlap::None),
            _ => None,
        }
    }

    /// Link arcs selected by the operation into closed loops
    ///
    /// Returns counter-clockwise and clockwise loops.
    pub fn loops(&self, op: BooleanOp, reference: Scalar) -> (Vec<Component>, Vec<Component>) {
        let mut selected = Vec::new();
        for edge in self.left_edges.iter() {
            let keep = match (op, edge.position) {
                (BooleanOp::Union, Position::Outside | Position::Same) => true,
                (BooleanOp::Intersection, Position::Inside | Position::Same) => true,
                (BooleanOp::Subtraction, Position::Outside | Position::Opposite) => true,
                _ => false,
            };
            if keep {
                selected.push(edge.clone());
            }
        }
        for edge in self.right_edges.iter() {
            match (op, edge.position) {
                (BooleanOp::Union, Position::Outside) => selected.push(edge.clone()),
                (BooleanOp::Intersection, Position::Inside) => selected.push(edge.clone()),
                (BooleanOp::Subtraction, Position::Inside) => selected.push(edge.reverse()),
                _ => {}
            }
        }
        link(selected, reference)
    }
}

/// Combine two components with the boolean operation
///
/// `reference` is an area of the combined bounding box which scales all tolerances.
pub fn process(a: &Component, b: &Component, op: BooleanOp, reference: Scalar) -> ProcessResult {
    let a = a.positive();
    let b = b.positive();
    if a.almost_equal(&b, reference) {
        return ProcessResult::Equal;
    }
    if !a.bbox().overlaps(b.bbox(), length_tolerance(reference)) {
        return ProcessResult::None;
    }
    let table = IntersectionTable::new(&a, &b, reference);
    if let Some(overlap) = table.overlap(&a, &b, reference) {
        return overlap.into();
    }
    match op {
        BooleanOp::Union | BooleanOp::Intersection => {
            let (outer, inner) = table.loops(op, reference);
            if outer.is_empty() {
                ProcessResult::None
            } else {
                ProcessResult::Loops { outer, inner }
            }
        }
        BooleanOp::Subtraction => {
            let (outer, inner) = table.loops(BooleanOp::Subtraction, reference);
            let left = Region::from_solids(Solid::assemble(outer, inner, reference));
            let (outer, inner) = table.loops(BooleanOp::Intersection, reference);
            let right = Region::from_solids(Solid::assemble(outer, inner, reference));
            ProcessResult::Regions(left, right)
        }
    }
}

/// Classify components which boundaries do not intersect
fn containment(a: &Component, b: &Component, reference: Scalar) -> Overlap {
    match b.sample_outside_of(a, reference) {
        Some(point) if a.contains(point) => return Overlap::Superset,
        Some(_) => {}
        None => return Overlap::Equal,
    }
    match a.sample_outside_of(b, reference) {
        Some(point) if b.contains(point) => Overlap::Subset,
        Some(_) => Overlap::None,
        None => Overlap::Equal,
    }
}

/// Sort splits and remove duplicates referring to the same node
fn dedup_splits(mut splits: Vec<(Split, usize)>) -> Vec<(Split, usize)> {
    splits.sort();
    let mut result: Vec<(Split, usize)> = Vec::with_capacity(splits.len());
    for (split, node) in splits {
        let duplicate = result
            .iter()
            .rev()
            .take_while(|(other, _)| other.index == split.index)
            .any(|(other, other_node)| *other_node == node && other.almost_equal(&split));
        if !duplicate {
            result.push((split, node));
        }
    }
    result
}

/// Cut component into arcs between consecutive splits and classify them
fn edges(
    component: &Component,
    other: &Component,
    splits: &[(Split, usize)],
    nodes: &[Point],
    side: Side,
    reference: Scalar,
) -> Vec<Edge> {
    let mut result = Vec::with_capacity(splits.len());
    for (index, (from, start)) in splits.iter().enumerate() {
        let (to, end) = splits[(index + 1) % splits.len()];
        let segments = cut_range(component, *from, to, nodes[*start], nodes[end], reference);
        if segments.is_empty() {
            continue;
        }
        let position = classify(&segments, other, reference);
        result.push(Edge {
            segments,
            start: *start,
            end,
            side,
            position,
        });
    }
    result
}

/// Extract part of the component between two splits
///
/// End points of the result are snapped to the provided node points.
fn cut_range(
    component: &Component,
    from: Split,
    to: Split,
    start: Point,
    end: Point,
    reference: Scalar,
) -> Vec<Segment> {
    let segments = component.segments();
    let count = segments.len();
    let mut result = Vec::new();
    if from.index == to.index && from.t < to.t {
        result.push(segments[from.index].cut(from.t, to.t));
    } else {
        result.push(segments[from.index].cut(from.t, 1.0));
        let mut index = (from.index + 1) % count;
        while index != to.index {
            result.push(segments[index]);
            index = (index + 1) % count;
        }
        result.push(segments[to.index].cut(0.0, to.t));
    }
    result.retain(|segment| !segment.is_degenerate(reference));
    if let Some(first) = result.first_mut() {
        *first = replace_ends(*first, Some(start), None);
    }
    if let Some(last) = result.last_mut() {
        *last = replace_ends(*last, None, Some(end));
    }
    result
}

/// Replace first and/or last control points of the segment
fn replace_ends(segment: Segment, start: Option<Point>, end: Option<Point>) -> Segment {
    match segment {
        Segment::Line(Line([p0, p1])) => {
            Line([start.unwrap_or(p0), end.unwrap_or(p1)]).into()
        }
        Segment::Quad(Quad([p0, p1, p2])) => {
            Quad([start.unwrap_or(p0), p1, end.unwrap_or(p2)]).into()
        }
        Segment::Cubic(Cubic([p0, p1, p2, p3])) => {
            Cubic([start.unwrap_or(p0), p1, p2, end.unwrap_or(p3)]).into()
        }
    }
}

/// Find position of the arc relative to the other component by probing its midpoint
fn classify(segments: &[Segment], other: &Component, reference: Scalar) -> Position {
    let piece = segments[segments.len() / 2];
    let mid = piece.at(0.5);
    let tangent = piece.deriv().at(0.5);
    let tolerance = length_tolerance(reference);
    let on_boundary = other.segments().iter().find_map(|segment| {
        if !segment.bbox(None).overlaps(BBox::new(mid, mid), tolerance) {
            return None;
        }
        segment.from_point(mid, reference).map(|t| (segment, t))
    });
    match on_boundary {
        Some((segment, t)) => {
            if tangent.dot(segment.deriv().at(t)) >= 0.0 {
                Position::Same
            } else {
                Position::Opposite
            }
        }
        None if other.contains(mid) => Position::Inside,
        None => Position::Outside,
    }
}

/// Link edges into closed loops through graph nodes
///
/// When several edges continue from a node, the one from the same component is
/// preferred. Loops which could not be closed are dropped.
fn link(edges: Vec<Edge>, reference: Scalar) -> (Vec<Component>, Vec<Component>) {
    let mut outer = Vec::new();
    let mut inner = Vec::new();
    let mut used = vec![false; edges.len()];
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let origin = edges[first].start;
        let mut node = edges[first].end;
        let mut side = edges[first].side;
        let mut segments = edges[first].segments.clone();
        while node != origin {
            let next = (0..edges.len())
                .filter(|index| !used[*index] && edges[*index].start == node)
                .min_by_key(|index| edges[*index].side != side);
            let Some(next) = next else {
                break;
            };
            used[next] = true;
            segments.extend(edges[next].segments.iter().copied());
            node = edges[next].end;
            side = edges[next].side;
        }
        if node != origin {
            tracing::trace!("[process:open-loop] segments={}", segments.len());
            continue;
        }
        let Some(component) = Component::new(segments) else {
            continue;
        };
        if area_almost_zero(component.area(), reference) {
            tracing::trace!("[process:degenerate-loop] area={}", component.area());
            continue;
        }
        if component.is_positive() {
            outer.push(component);
        } else {
            inner.push(component);
        }
    }
    (outer, inner)
}
