//! Boolean algebra on planar regions bounded by lines and bezier curves.
//!
//! Main features:
//!  - Union, intersection, subtraction and symmetric difference of regions
//!  - Regions with holes and islands inside of holes
//!  - Conversion from and to paths with `NonZero` and `EvenOdd` fill rules
//!  - Memoization of region operations
//!
#![deny(warnings)]

mod cache;
mod component;
mod curve;
mod geometry;
mod intersect;
mod path;
mod process;
mod region;
mod solid;
mod utils;

pub use cache::{RegionCache, RegionOp};
pub use component::Component;
pub use curve::{Cubic, Curve, CurveExtremities, CurveRoots, Line, Quad, Segment};
pub use geometry::{
    almost_equal, almost_zero, area_almost_zero, length_tolerance, scalar_fmt, BBox, Point,
    Scalar, Transform, AREA_TOLERANCE, EPSILON, EPSILON_SQRT, LENGTH_TOLERANCE,
    PARAM_TOLERANCE, PI,
};
pub use path::{FillRule, Path, PathBuilder, SubPath};
pub use process::{
    process, BooleanOp, Edge, IntersectionTable, Overlap, Position, ProcessResult, Side, Split,
};
pub use region::Region;
pub use solid::Solid;
pub use utils::ArrayIter;
use utils::poly_roots;
