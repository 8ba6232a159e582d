//! Backend-agnostic path representation.
//!
//! A [`PathData`] is an ordered list of [`Segment`]s built with a fluent API
//! (`m`, `l`, `q`, `c`, `a`, `z`). Mapping it onto a concrete vector backend is
//! left to the host; `Display` renders SVG path syntax for debugging and tests.

use std::fmt;

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

use crate::types::{Point, Rect};

/// One drawing command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum Segment {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
    CubicTo { c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64 },
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    Close,
}

impl Segment {
    /// The point this segment ends at, if it has one
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Segment::MoveTo { x, y }
            | Segment::LineTo { x, y }
            | Segment::QuadTo { x, y, .. }
            | Segment::CubicTo { x, y, .. }
            | Segment::ArcTo { x, y, .. } => Some(dvec2(x, y)),
            Segment::Close => None,
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Segment::MoveTo { x, y } | Segment::LineTo { x, y } => x.is_finite() && y.is_finite(),
            Segment::QuadTo { cx, cy, x, y } => [cx, cy, x, y].iter().all(|v| v.is_finite()),
            Segment::CubicTo { c1x, c1y, c2x, c2y, x, y } => {
                [c1x, c1y, c2x, c2y, x, y].iter().all(|v| v.is_finite())
            }
            Segment::ArcTo { rx, ry, rotation, x, y, .. } => {
                [rx, ry, rotation, x, y].iter().all(|v| v.is_finite())
            }
            Segment::Close => true,
        }
    }
}

/// An outline: closed contours end with `Close`, connectors stay open
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathData {
    segments: Vec<Segment>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn m(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::MoveTo { x, y });
        self
    }

    pub fn l(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::LineTo { x, y });
        self
    }

    pub fn q(mut self, cx: f64, cy: f64, x: f64, y: f64) -> Self {
        self.segments.push(Segment::QuadTo { cx, cy, x, y });
        self
    }

    pub fn c(mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> Self {
        self.segments.push(Segment::CubicTo { c1x, c1y, c2x, c2y, x, y });
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn a(mut self, rx: f64, ry: f64, rotation: f64, large_arc: bool, sweep: bool, x: f64, y: f64) -> Self {
        self.segments.push(Segment::ArcTo { rx, ry, rotation, large_arc, sweep, x, y });
        self
    }

    pub fn z(mut self) -> Self {
        self.segments.push(Segment::Close);
        self
    }

    pub fn move_to(self, p: Point) -> Self {
        self.m(p.x, p.y)
    }

    pub fn line_to(self, p: Point) -> Self {
        self.l(p.x, p.y)
    }

    /// Build a closed polygon through `points`
    pub fn polygon(points: &[Point]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::new();
        };
        rest.iter().fold(Self::new().move_to(*first), |p, pt| p.line_to(*pt)).z()
    }

    /// Append every segment of `other` (used for multi-contour outlines)
    pub fn extend(mut self, other: PathData) -> Self {
        self.segments.extend(other.segments);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the last segment closes the contour
    pub fn is_closed(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Close))
    }

    pub fn is_finite(&self) -> bool {
        self.segments.iter().all(Segment::is_finite)
    }

    /// On-curve endpoints in order (control points excluded)
    pub fn vertices(&self) -> Vec<Point> {
        self.segments.iter().filter_map(Segment::end_point).collect()
    }

    /// Bounding box of every endpoint and control point
    pub fn control_bounds(&self) -> Option<Rect> {
        let mut min = DVec2::splat(f64::MAX);
        let mut max = DVec2::splat(f64::MIN);
        let mut any = false;
        let mut add = |x: f64, y: f64| {
            min = min.min(dvec2(x, y));
            max = max.max(dvec2(x, y));
            any = true;
        };
        for seg in &self.segments {
            match *seg {
                Segment::MoveTo { x, y } | Segment::LineTo { x, y } | Segment::ArcTo { x, y, .. } => add(x, y),
                Segment::QuadTo { cx, cy, x, y } => {
                    add(cx, cy);
                    add(x, y);
                }
                Segment::CubicTo { c1x, c1y, c2x, c2y, x, y } => {
                    add(c1x, c1y);
                    add(c2x, c2y);
                    add(x, y);
                }
                Segment::Close => {}
            }
        }
        any.then(|| Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Segment::MoveTo { x, y } => write!(f, "M{},{}", x, y),
            Segment::LineTo { x, y } => write!(f, "L{},{}", x, y),
            Segment::QuadTo { cx, cy, x, y } => write!(f, "Q{},{} {},{}", cx, cy, x, y),
            Segment::CubicTo { c1x, c1y, c2x, c2y, x, y } => {
                write!(f, "C{},{} {},{} {},{}", c1x, c1y, c2x, c2y, x, y)
            }
            Segment::ArcTo { rx, ry, rotation, large_arc, sweep, x, y } => write!(
                f,
                "A{},{} {} {} {} {},{}",
                rx, ry, rotation, large_arc as u8, sweep as u8, x, y
            ),
            Segment::Close => write!(f, "Z"),
        }
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}
