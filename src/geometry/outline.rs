//! Outline generators for every shape kind.
//!
//! Each function is pure: it takes the shape's bounding rectangle (plus any
//! kind-specific parameters) and returns the boundary as a [`PathData`].
//! Closed outlines start at a corner or the topmost vertex and run clockwise
//! on screen.

use std::f64::consts::{PI, TAU};

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

use super::path::PathData;
use crate::defaults::MAX_VERTEX_COUNT;
use crate::types::{Point, Rect};

/// Which way a triangle points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangleOrientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl TriangleOrientation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Arrow variants for [`arrow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowKind {
    #[default]
    Single,
    Double,
    Curved,
}

impl ArrowKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(Self::Single),
            "double" => Some(Self::Double),
            "curved" => Some(Self::Curved),
            _ => None,
        }
    }
}

/// Rectangle, with rounded corners when `corner_radius > 0`.
/// The radius is clamped to half the shorter side.
pub fn rectangle(r: Rect, corner_radius: f64) -> PathData {
    let (x1, y1) = (r.x, r.y);
    let (x2, y2) = (r.x + r.width, r.y + r.height);
    let rad = corner_radius.min(r.width / 2.0).min(r.height / 2.0).max(0.0);

    if rad == 0.0 {
        return PathData::new().m(x1, y1).l(x2, y1).l(x2, y2).l(x1, y2).z();
    }

    PathData::new()
        .m(x1 + rad, y1)
        .l(x2 - rad, y1)
        .a(rad, rad, 0.0, false, true, x2, y1 + rad)
        .l(x2, y2 - rad)
        .a(rad, rad, 0.0, false, true, x2 - rad, y2)
        .l(x1 + rad, y2)
        .a(rad, rad, 0.0, false, true, x1, y2 - rad)
        .l(x1, y1 + rad)
        .a(rad, rad, 0.0, false, true, x1 + rad, y1)
        .z()
}

/// Ellipse inscribed in `r`, drawn as two half arcs from the left extreme
pub fn ellipse(r: Rect) -> PathData {
    let c = r.center();
    let (rx, ry) = (r.width / 2.0, r.height / 2.0);
    PathData::new()
        .m(c.x - rx, c.y)
        .a(rx, ry, 0.0, false, true, c.x + rx, c.y)
        .a(rx, ry, 0.0, false, true, c.x - rx, c.y)
        .z()
}

/// Circle centered in `r` with radius `min(width, height) / 2`
pub fn circle(r: Rect) -> PathData {
    let c = r.center();
    let rad = r.width.min(r.height) / 2.0;
    ellipse(Rect::new(c.x - rad, c.y - rad, rad * 2.0, rad * 2.0))
}

/// Rhombus touching the midpoint of each side of `r`
pub fn diamond(r: Rect) -> PathData {
    let c = r.center();
    PathData::polygon(&[
        dvec2(c.x, r.y),
        dvec2(r.x + r.width, c.y),
        dvec2(c.x, r.y + r.height),
        dvec2(r.x, c.y),
    ])
}

/// The three vertices of an isosceles triangle filling `r`
pub fn triangle_vertices(r: Rect, orientation: TriangleOrientation) -> [Point; 3] {
    let c = r.center();
    let (x1, y1, x2, y2) = (r.x, r.y, r.x + r.width, r.y + r.height);
    match orientation {
        TriangleOrientation::Up => [dvec2(c.x, y1), dvec2(x2, y2), dvec2(x1, y2)],
        TriangleOrientation::Down => [dvec2(x1, y1), dvec2(x2, y1), dvec2(c.x, y2)],
        TriangleOrientation::Left => [dvec2(x1, c.y), dvec2(x2, y1), dvec2(x2, y2)],
        TriangleOrientation::Right => [dvec2(x1, y1), dvec2(x2, c.y), dvec2(x1, y2)],
    }
}

pub fn triangle(r: Rect, orientation: TriangleOrientation) -> PathData {
    PathData::polygon(&triangle_vertices(r, orientation))
}

/// Vertices of a regular polygon inscribed in the ellipse of `r`.
///
/// The first vertex points up before `rotation` (degrees) is applied.
/// `sides` is clamped to `[3, MAX_VERTEX_COUNT]`.
pub fn regular_polygon_vertices(r: Rect, sides: u32, rotation: f64) -> Vec<Point> {
    let n = sides.clamp(3, MAX_VERTEX_COUNT);
    let c = r.center();
    let radii = dvec2(r.width / 2.0, r.height / 2.0);
    let start = rotation.to_radians() - PI / 2.0;
    (0..n)
        .map(|i| {
            let angle = start + TAU * f64::from(i) / f64::from(n);
            c + radii * dvec2(angle.cos(), angle.sin())
        })
        .collect()
}

pub fn regular_polygon(r: Rect, sides: u32, rotation: f64) -> PathData {
    PathData::polygon(&regular_polygon_vertices(r, sides, rotation))
}

/// Vertices of a star: `points` outer tips on the ellipse of `r`, alternating
/// with inner vertices at `inner_ratio` of the outer radii. `points` is
/// clamped to `[2, MAX_VERTEX_COUNT]`.
pub fn star_vertices(r: Rect, points: u32, inner_ratio: f64) -> Vec<Point> {
    let n = points.clamp(2, MAX_VERTEX_COUNT);
    let c = r.center();
    let outer = dvec2(r.width / 2.0, r.height / 2.0);
    let inner = outer * inner_ratio.clamp(0.0, 1.0);
    let step = PI / f64::from(n);
    (0..n * 2)
        .map(|i| {
            let angle = -PI / 2.0 + step * f64::from(i);
            let radii = if i % 2 == 0 { outer } else { inner };
            c + radii * dvec2(angle.cos(), angle.sin())
        })
        .collect()
}

pub fn star(r: Rect, points: u32, inner_ratio: f64) -> PathData {
    PathData::polygon(&star_vertices(r, points, inner_ratio))
}

/// Parallelogram leaning right: the top edge is shifted by `skew * width`.
/// A negative skew leans left.
pub fn parallelogram_vertices(r: Rect, skew: f64) -> [Point; 4] {
    let offset = (skew.clamp(-1.0, 1.0) * r.width).abs();
    let (x1, y1, x2, y2) = (r.x, r.y, r.x + r.width, r.y + r.height);
    if skew >= 0.0 {
        [dvec2(x1 + offset, y1), dvec2(x2, y1), dvec2(x2 - offset, y2), dvec2(x1, y2)]
    } else {
        [dvec2(x1, y1), dvec2(x2 - offset, y1), dvec2(x2, y2), dvec2(x1 + offset, y2)]
    }
}

pub fn parallelogram(r: Rect, skew: f64) -> PathData {
    PathData::polygon(&parallelogram_vertices(r, skew))
}

/// Trapezoid whose top edge is inset by `inset * width` on each side
pub fn trapezoid_vertices(r: Rect, inset: f64) -> [Point; 4] {
    let offset = inset.clamp(0.0, 0.5) * r.width;
    let (x1, y1, x2, y2) = (r.x, r.y, r.x + r.width, r.y + r.height);
    [dvec2(x1 + offset, y1), dvec2(x2 - offset, y1), dvec2(x2, y2), dvec2(x1, y2)]
}

pub fn trapezoid(r: Rect, inset: f64) -> PathData {
    PathData::polygon(&trapezoid_vertices(r, inset))
}

/// Document: rectangle whose bottom edge is a single wave of `wave_height`
pub fn document(r: Rect, wave_height: f64) -> PathData {
    let (x1, y1, x2, y2) = (r.x, r.y, r.x + r.width, r.y + r.height);
    let wave = wave_height.clamp(0.0, r.height / 2.0);
    let base = y2 - wave;
    PathData::new()
        .m(x1, y1)
        .l(x2, y1)
        .l(x2, base)
        .q(x1 + r.width * 0.75, base - wave, x1 + r.width * 0.5, base)
        .q(x1 + r.width * 0.25, base + wave, x1, base)
        .z()
}

/// Cylinder: side lines joined by the bottom front arc, plus the full top
/// ellipse (back half then front half).
pub fn cylinder(r: Rect, ellipse_height: f64) -> PathData {
    let rx = r.width / 2.0;
    let ry = (ellipse_height / 2.0).clamp(0.0, r.height / 2.0);
    let (left, right) = (r.x, r.x + r.width);
    let top_y = r.y + ry;
    let bottom_y = r.y + r.height - ry;

    PathData::new()
        .m(left, top_y)
        .l(left, bottom_y)
        .a(rx, ry, 0.0, false, false, right, bottom_y)
        .l(right, top_y)
        .a(rx, ry, 0.0, false, false, left, top_y)
        .a(rx, ry, 0.0, false, false, right, top_y)
}

/// Anchor points of a cloud's lobes, on an ellipse shrunk to 70% of `r`
pub fn cloud_anchors(r: Rect, lobes: u32) -> Vec<Point> {
    let n = lobes.clamp(3, MAX_VERTEX_COUNT);
    let c = r.center();
    let radii = dvec2(r.width, r.height) * 0.35;
    (0..n)
        .map(|i| {
            let angle = -PI / 2.0 + TAU * f64::from(i) / f64::from(n);
            c + radii * dvec2(angle.cos(), angle.sin())
        })
        .collect()
}

/// Cloud: a ring of semicircular arcs bulging outward between anchors
pub fn cloud(r: Rect, lobes: u32) -> PathData {
    let anchors = cloud_anchors(r, lobes);
    let mut path = PathData::new().move_to(anchors[0]);
    for (i, from) in anchors.iter().enumerate() {
        let to = anchors[(i + 1) % anchors.len()];
        let rad = from.distance(to) / 2.0;
        path = path.a(rad, rad, 0.0, false, true, to.x, to.y);
    }
    path.z()
}

/// Closed triangular arrowhead with its tip at `tip`, pointing along `direction`
pub fn arrowhead(tip: Point, direction: DVec2, length: f64, width: f64) -> PathData {
    let Some(unit) = direction.try_normalize() else {
        return PathData::new();
    };
    let perp = dvec2(-unit.y, unit.x);
    let base = tip - unit * length;
    let half = width / 2.0;
    PathData::polygon(&[tip, base + perp * half, base - perp * half])
}

/// Control point for a curved arrow shaft.
///
/// Offset perpendicular to the chord at half its length.
pub fn arc_control_point(clockwise: bool, from: Point, to: Point) -> Point {
    let midpoint = (from + to) * 0.5;
    let delta = to - from;
    let perp = dvec2(-delta.y, delta.x);
    if clockwise { midpoint - perp * 0.5 } else { midpoint + perp * 0.5 }
}

/// Arrow from `start` to `end`: an open shaft followed by closed head contours.
pub fn arrow(start: Point, end: Point, kind: ArrowKind, head_length: f64, head_width: f64) -> PathData {
    match kind {
        ArrowKind::Single => PathData::new()
            .move_to(start)
            .line_to(end)
            .extend(arrowhead(end, end - start, head_length, head_width)),
        ArrowKind::Double => PathData::new()
            .move_to(start)
            .line_to(end)
            .extend(arrowhead(end, end - start, head_length, head_width))
            .extend(arrowhead(start, start - end, head_length, head_width)),
        ArrowKind::Curved => {
            let control = arc_control_point(true, start, end);
            PathData::new()
                .move_to(start)
                .q(control.x, control.y, end.x, end.y)
                .extend(arrowhead(end, end - control, head_length, head_width))
        }
    }
}

/// Smooth curve through every point (Catmull-Rom converted to cubic segments).
///
/// Two points give a straight line; fewer give a bare move or nothing.
pub fn smooth_path(points: &[Point], closed: bool) -> PathData {
    match points {
        [] => PathData::new(),
        [p] => PathData::new().move_to(*p),
        [a, b] if !closed => PathData::new().move_to(*a).line_to(*b),
        _ => {
            let n = points.len();
            let at = |i: isize| -> Point {
                if closed {
                    points[i.rem_euclid(n as isize) as usize]
                } else {
                    points[i.clamp(0, n as isize - 1) as usize]
                }
            };
            let count = if closed { n } else { n - 1 };
            let mut path = PathData::new().move_to(points[0]);
            for i in 0..count as isize {
                let (p0, p1, p2, p3) = (at(i - 1), at(i), at(i + 1), at(i + 2));
                let c1 = p1 + (p2 - p0) / 6.0;
                let c2 = p2 - (p3 - p1) / 6.0;
                path = path.c(c1.x, c1.y, c2.x, c2.y, p2.x, p2.y);
            }
            if closed { path.z() } else { path }
        }
    }
}
