//! Geometric primitives shared by every module.
//!
//! Coordinates are screen-space: x grows to the right, y grows downward.
//! Rotation angles are in degrees, clockwise on screen.

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

/// Absolute or relative 2D position
pub type Point = DVec2;

/// Axis-aligned rectangle described by its top-left corner and extents
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left corner
    pub fn origin(&self) -> Point {
        dvec2(self.x, self.y)
    }

    /// Width and height as a vector
    pub fn extents(&self) -> DVec2 {
        dvec2(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        dvec2(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Map a unit-square coordinate onto this rectangle
    pub fn at_relative(&self, rel: Point) -> Point {
        self.origin() + self.extents() * rel
    }

    /// Inclusive axis-aligned containment
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Expand into the full derived form
    pub fn bounds(&self) -> Bounds {
        Bounds::from(*self)
    }
}

/// Rectangle with every derived edge and center precomputed
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl From<Rect> for Bounds {
    fn from(r: Rect) -> Self {
        Bounds {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            left: r.x,
            top: r.y,
            right: r.x + r.width,
            bottom: r.y + r.height,
            center_x: r.x + r.width / 2.0,
            center_y: r.y + r.height / 2.0,
        }
    }
}

impl From<Bounds> for Rect {
    fn from(b: Bounds) -> Self {
        Rect::new(b.x, b.y, b.width, b.height)
    }
}

impl Bounds {
    pub fn center(&self) -> Point {
        dvec2(self.center_x, self.center_y)
    }
}

/// Rotate `p` about `center` by `degrees` (clockwise on screen)
pub fn rotate_about(p: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return p;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = p - center;
    center + dvec2(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// A unit direction vector (dimensionless, normalized)
/// Used for port exit directions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitVec {
    dx: f64,
    dy: f64,
}

impl UnitVec {
    /// Unit vector at `degrees`, measured clockwise from east
    pub fn from_degrees(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        UnitVec { dx: cos, dy: sin }
    }

    /// Get dx component
    pub fn dx(self) -> f64 {
        self.dx
    }

    /// Get dy component
    pub fn dy(self) -> f64 {
        self.dy
    }

    /// Scale into a displacement
    pub fn scaled(self, len: f64) -> DVec2 {
        dvec2(self.dx * len, self.dy * len)
    }
}
