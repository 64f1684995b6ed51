//! Points, affine transforms, bounding boxes and tolerances
use crate::{Curve, Line};
use bytemuck::{Pod, Zeroable};
use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;
pub const EPSILON_SQRT: f64 = 1.490_116_119_384_765_6e-8;
pub const PI: f64 = std::f64::consts::PI;

/// Relative length tolerance, scaled by the square root of the reference area
pub const LENGTH_TOLERANCE: Scalar = 1e-7;
/// Tolerance used when comparing curve parameters
pub const PARAM_TOLERANCE: Scalar = 1e-7;
/// Solids with `sqrt(area)` below this fraction of `sqrt(reference)` are dropped
pub const AREA_TOLERANCE: Scalar = 1e-6;

/// Absolute length tolerance for an operation with the given reference area
#[inline]
pub fn length_tolerance(reference: Scalar) -> Scalar {
    LENGTH_TOLERANCE * reference.abs().sqrt().max(EPSILON_SQRT)
}

/// Check if length-like `value` is zero relative to the reference area
#[inline]
pub fn almost_zero(value: Scalar, reference: Scalar) -> bool {
    value.abs() <= length_tolerance(reference)
}

/// Check if two length-like values are equal relative to the reference area
#[inline]
pub fn almost_equal(v0: Scalar, v1: Scalar, reference: Scalar) -> bool {
    almost_zero(v0 - v1, reference)
}

/// Check if area is negligible relative to the reference area
#[inline]
pub fn area_almost_zero(area: Scalar, reference: Scalar) -> bool {
    area.abs().sqrt() <= AREA_TOLERANCE * reference.abs().sqrt().max(EPSILON_SQRT)
}

/// Write the shortest representation of the value which parses back exactly
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return write!(f, "{}", value as i64);
    }
    let mut buffer = [0u8; lexical_core::BUFFER_SIZE];
    let digits = lexical_core::write(value, &mut buffer);
    f.write_str(std::str::from_utf8(digits).map_err(|_| fmt::Error)?)
}

/// 2D point or vector
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        scalar_fmt(f, self.x())?;
        f.write_str(",")?;
        scalar_fmt(f, self.y())
    }
}

impl Point {
    #[inline]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    #[inline]
    pub fn x(self) -> Scalar {
        self.0[0]
    }

    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Distance from the origin
    pub fn length(self) -> Scalar {
        self.x().hypot(self.y())
    }

    pub fn dist(self, other: Self) -> Scalar {
        (self - other).length()
    }

    pub fn dot(self, other: Self) -> Scalar {
        self.x() * other.x() + self.y() * other.y()
    }

    /// `z` component of the 3D cross product, positive if `other` is counter-clockwise
    pub fn cross(self, other: Self) -> Scalar {
        self.x() * other.y() - self.y() * other.x()
    }

    /// Unit vector with the same direction, `None` for zero vector
    pub fn normalize(self) -> Option<Point> {
        let length = self.length();
        (length > 0.0 && length.is_finite()).then(|| self / length)
    }

    /// Exact comparison up to the machine epsilon
    pub fn is_close_to(self, other: Point) -> bool {
        (self.x() - other.x()).abs() < EPSILON && (self.y() - other.y()).abs() < EPSILON
    }

    /// Check if points coincide relative to the reference area
    pub fn almost_equal(self, other: Point, reference: Scalar) -> bool {
        almost_zero(self.dist(other), reference)
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from((x, y): (Scalar, Scalar)) -> Self {
        Self([x, y])
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, point: Point) -> Point {
        Point([self * point.x(), self * point.y()])
    }
}

impl Div<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn div(self, value: Scalar) -> Point {
        Point([self.x() / value, self.y() / value])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Point {
        Point([self.x() + other.x(), self.y() + other.y()])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Point {
        Point([self.x() - other.x(), self.y() - other.y()])
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Point {
        Point([-self.x(), -self.y()])
    }
}

/// 2D affine transformation `[m00, m01, m02, m10, m11, m12]`
///
/// Maps `(x, y)` to `(m00 x + m01 y + m02, m10 x + m11 y + m12)`.
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform([Scalar; 6]);

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(")?;
        for (index, value) in self.0.iter().enumerate() {
            if index != 0 {
                f.write_str(" ")?;
            }
            scalar_fmt(f, *value)?;
        }
        f.write_str(")")
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(
        m00: Scalar,
        m01: Scalar,
        m02: Scalar,
        m10: Scalar,
        m11: Scalar,
        m12: Scalar,
    ) -> Self {
        Self([m00, m01, m02, m10, m11, m12])
    }

    pub const fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }

    pub fn new_translate(tx: Scalar, ty: Scalar) -> Self {
        Self([1.0, 0.0, tx, 0.0, 1.0, ty])
    }

    pub fn new_scale(sx: Scalar, sy: Scalar) -> Self {
        Self([sx, 0.0, 0.0, 0.0, sy, 0.0])
    }

    /// Counter-clockwise rotation around the origin
    pub fn new_rotate(angle: Scalar) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self([cos, -sin, 0.0, sin, cos, 0.0])
    }

    pub fn apply(&self, point: Point) -> Point {
        let Self([m00, m01, m02, m10, m11, m12]) = *self;
        let Point([x, y]) = point;
        Point([m00 * x + m01 * y + m02, m10 * x + m11 * y + m12])
    }

    /// Determinant of the linear part, area scale factor
    pub fn det(&self) -> Scalar {
        let Self([m00, m01, _, m10, m11, _]) = *self;
        m00 * m11 - m01 * m10
    }

    /// Check if transformation collapses the plane onto a line or a point
    ///
    /// Determinant is compared with the product of the row norms, so the check
    /// does not depend on the overall scale.
    pub fn is_degenerate(&self) -> bool {
        let Self([m00, m01, _, m10, m11, _]) = *self;
        let det = self.det();
        !det.is_finite() || det.abs() <= EPSILON * (m00.abs() + m01.abs()) * (m10.abs() + m11.abs())
    }

    /// Rigid motion which moves line start to the origin and its direction to positive x
    pub fn make_horizontal(line: Line) -> Transform {
        let p0 = line.start();
        match (line.end() - p0).normalize() {
            None => Transform::new_translate(-p0.x(), -p0.y()),
            Some(Point([cos, sin])) => Transform::new(
                cos,
                sin,
                -cos * p0.x() - sin * p0.y(),
                -sin,
                cos,
                sin * p0.x() - cos * p0.y(),
            ),
        }
    }
}

/// Axis aligned bounding box
#[derive(Clone, Copy, PartialEq)]
pub struct BBox {
    min: Point,
    max: Point,
}

impl BBox {
    /// Smallest box which contains both points
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        let (p0, p1) = (p0.into(), p1.into());
        Self {
            min: Point::new(p0.x().min(p1.x()), p0.y().min(p1.y())),
            max: Point::new(p0.x().max(p1.x()), p0.y().max(p1.y())),
        }
    }

    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    #[inline]
    pub fn x(&self) -> Scalar {
        self.min.x()
    }

    #[inline]
    pub fn y(&self) -> Scalar {
        self.min.y()
    }

    #[inline]
    pub fn width(&self) -> Scalar {
        self.max.x() - self.min.x()
    }

    #[inline]
    pub fn height(&self) -> Scalar {
        self.max.y() - self.min.y()
    }

    /// Smallest box which contains this box and the point
    pub fn extend(&self, point: Point) -> Self {
        Self {
            min: Point::new(self.min.x().min(point.x()), self.min.y().min(point.y())),
            max: Point::new(self.max.x().max(point.x()), self.max.y().max(point.y())),
        }
    }

    pub fn union(&self, other: BBox) -> Self {
        self.extend(other.min).extend(other.max)
    }

    pub fn union_opt(&self, other: Option<BBox>) -> Self {
        other.map_or(*self, |other| self.union(other))
    }

    /// Check if boxes intersect after growing both by `tolerance`
    pub fn overlaps(&self, other: BBox, tolerance: Scalar) -> bool {
        self.min.x() <= other.max.x() + tolerance
            && other.min.x() <= self.max.x() + tolerance
            && self.min.y() <= other.max.y() + tolerance
            && other.min.y() <= self.max.y() + tolerance
    }
}

impl fmt::Debug for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox({:?} {:?})", self.min, self.max)
    }
}
