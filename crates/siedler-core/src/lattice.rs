//! Hex lattice over a flat integer coordinate space.
//!
//! Fields, corners and edges all live on the same `(x, y)` grid; a point's role
//! is determined by its position, not by a tag:
//! - field centres sit on rows `y ≡ 2 (mod 6)` with even `x` and on rows
//!   `y ≡ 5 (mod 6)` with odd `x`
//! - the six corners of a field are fixed offsets from its centre
//! - an edge joins two corners that differ by `(±1, ±1)` or `(0, ±2)`
//!
//! ```text
//!          (0,-2)
//!   (-1,-1)      (1,-1)
//!          field
//!   (-1, 1)      (1, 1)
//!          (0, 2)
//! ```
//!
//! The lattice only remembers which field centres are registered. Corners and
//! edges exist exactly when they belong to a registered field.

use crate::config::MIN_COORDINATE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Corner offsets from a field centre, clockwise starting at the top.
pub const CORNER_OFFSETS: [(i32, i32); 6] = [(0, -2), (1, -1), (1, 1), (0, 2), (-1, 1), (-1, -1)];

/// The boundary vectors a legal edge may span.
pub const EDGE_VECTORS: [(i32, i32); 6] = [(1, 1), (1, -1), (-1, 1), (-1, -1), (0, 2), (0, -2)];

/// Caller bugs detected by the lattice. These are never rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LatticeError {
    #[error("coordinate {0} lies outside the lattice")]
    OutOfBounds(Point),

    #[error("coordinate {0} is not a field centre")]
    NotAFieldCoordinate(Point),

    #[error("field {0} is already registered")]
    DuplicateField(Point),

    #[error("field {0} is not registered")]
    UnknownField(Point),

    #[error("edge from {0} to itself")]
    DegenerateEdge(Point),

    #[error("{0} and {1} do not span an edge")]
    IllegalEdge(Point, Point),
}

/// Integer lattice coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by an offset
    pub const fn offset(&self, (dx, dy): (i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether this point has the shape of a field centre
    pub fn is_field_coordinate(&self) -> bool {
        match self.y.rem_euclid(6) {
            2 => self.x.rem_euclid(2) == 0,
            5 => self.x.rem_euclid(2) == 1,
            _ => false,
        }
    }

    /// Whether this point has the shape of a corner
    pub fn is_corner_coordinate(&self) -> bool {
        match self.y.rem_euclid(6) {
            0 | 4 => self.x.rem_euclid(2) == 0,
            1 | 3 => self.x.rem_euclid(2) == 1,
            _ => false,
        }
    }

    /// The six corners of the field centred here
    pub fn corners_of_field(&self) -> [Point; 6] {
        CORNER_OFFSETS.map(|offset| self.offset(offset))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Check whether two points span a hexagon side.
pub fn is_legal_edge(a: Point, b: Point) -> bool {
    EDGE_VECTORS.contains(&(b.x - a.x, b.y - a.y))
}

/// Undirected edge between two corners. `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    a: Point,
    b: Point,
}

impl Edge {
    /// Normalize the endpoints so either argument order yields the same edge.
    /// Geometry is not checked here; see [`HexLattice::edge`].
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Both endpoints in normalized order
    pub fn endpoints(&self) -> [Point; 2] {
        [self.a, self.b]
    }

    /// Whether `corner` is one of the endpoints
    pub fn touches(&self, corner: Point) -> bool {
        self.a == corner || self.b == corner
    }

    /// The endpoint that is not `corner`
    pub fn other_end(&self, corner: Point) -> Option<Point> {
        if self.a == corner {
            Some(self.b)
        } else if self.b == corner {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// The set of registered fields inside a bounded rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexLattice {
    max_x: i32,
    max_y: i32,
    fields: BTreeSet<Point>,
}

impl HexLattice {
    /// Create an empty lattice spanning `MIN_COORDINATE..=max_x` × `MIN_COORDINATE..=max_y`
    pub fn new(max_x: i32, max_y: i32) -> Self {
        Self {
            max_x,
            max_y,
            fields: BTreeSet::new(),
        }
    }

    /// Whether `p` lies inside the rectangle
    pub fn in_bounds(&self, p: Point) -> bool {
        (MIN_COORDINATE..=self.max_x).contains(&p.x) && (MIN_COORDINATE..=self.max_y).contains(&p.y)
    }

    fn ensure_in_bounds(&self, p: Point) -> Result<(), LatticeError> {
        if self.in_bounds(p) {
            Ok(())
        } else {
            Err(LatticeError::OutOfBounds(p))
        }
    }

    /// Register a field centre
    pub fn add_field(&mut self, center: Point) -> Result<(), LatticeError> {
        self.ensure_in_bounds(center)?;
        if !center.is_field_coordinate() {
            return Err(LatticeError::NotAFieldCoordinate(center));
        }
        if !self.fields.insert(center) {
            return Err(LatticeError::DuplicateField(center));
        }
        Ok(())
    }

    /// Registered field centres in coordinate order
    pub fn fields(&self) -> impl Iterator<Item = Point> + '_ {
        self.fields.iter().copied()
    }

    pub fn has_field(&self, center: Point) -> bool {
        self.fields.contains(&center)
    }

    /// Whether `corner` belongs to at least one registered field
    pub fn has_corner(&self, corner: Point) -> bool {
        CORNER_OFFSETS
            .iter()
            .any(|&(dx, dy)| self.has_field(corner.offset((-dx, -dy))))
    }

    /// Whether `a`–`b` is a side of at least one registered field
    pub fn has_edge(&self, a: Point, b: Point) -> bool {
        if !is_legal_edge(a, b) {
            return false;
        }
        self.fields_of_corner(a)
            .map(|fields| fields.iter().any(|f| f.corners_of_field().contains(&b)))
            .unwrap_or(false)
    }

    /// The six corners of a field
    pub fn corners_of_field(&self, center: Point) -> [Point; 6] {
        center.corners_of_field()
    }

    /// Registered fields having `corner` among their corners (at most three)
    pub fn fields_of_corner(&self, corner: Point) -> Result<Vec<Point>, LatticeError> {
        self.ensure_in_bounds(corner)?;
        Ok(CORNER_OFFSETS
            .iter()
            .map(|&(dx, dy)| corner.offset((-dx, -dy)))
            .filter(|f| self.has_field(*f))
            .collect())
    }

    /// Build a validated edge between two in-bounds corners
    pub fn edge(&self, a: Point, b: Point) -> Result<Edge, LatticeError> {
        self.ensure_in_bounds(a)?;
        self.ensure_in_bounds(b)?;
        if a == b {
            return Err(LatticeError::DegenerateEdge(a));
        }
        if !is_legal_edge(a, b) {
            return Err(LatticeError::IllegalEdge(a, b));
        }
        Ok(Edge::new(a, b))
    }

    /// Every registered edge touching `corner`, occupied or not
    pub fn adjacent_edges(&self, corner: Point) -> Result<Vec<Edge>, LatticeError> {
        self.ensure_in_bounds(corner)?;
        Ok(EDGE_VECTORS
            .iter()
            .map(|&offset| corner.offset(offset))
            .filter(|other| self.has_edge(corner, *other))
            .map(|other| Edge::new(corner, other))
            .collect())
    }

    /// Corners one edge away from `corner`, occupied or not
    pub fn neighbour_corners(&self, corner: Point) -> Result<Vec<Point>, LatticeError> {
        Ok(self
            .adjacent_edges(corner)?
            .iter()
            .filter_map(|edge| edge.other_end(corner))
            .collect())
    }

    /// Every corner of every registered field
    pub fn corners(&self) -> BTreeSet<Point> {
        self.fields
            .iter()
            .flat_map(|f| f.corners_of_field())
            .collect()
    }

    /// Every side of every registered field
    pub fn edges(&self) -> BTreeSet<Edge> {
        self.fields
            .iter()
            .flat_map(|f| {
                let corners = f.corners_of_field();
                (0..6).map(move |i| Edge::new(corners[i], corners[(i + 1) % 6]))
            })
            .collect()
    }
}
