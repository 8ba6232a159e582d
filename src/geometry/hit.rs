//! Point containment tests.
//!
//! Boundaries count as inside for every test.

use glam::dvec2;

use crate::types::{Point, Rect};

/// Axis-aligned bounding-box test
pub fn in_rect(r: Rect, p: Point) -> bool {
    r.contains(p)
}

/// Euclidean distance from the center within `min(width, height) / 2`
pub fn in_circle(r: Rect, p: Point) -> bool {
    let radius = r.width.min(r.height) / 2.0;
    p.distance(r.center()) <= radius
}

/// Normalized quadratic form `(dx/rx)^2 + (dy/ry)^2 <= 1`
pub fn in_ellipse(r: Rect, p: Point) -> bool {
    let (rx, ry) = (r.width / 2.0, r.height / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let d = (p - r.center()) / dvec2(rx, ry);
    d.length_squared() <= 1.0
}

/// L1 distance across half extents: `|dx|/hw + |dy|/hh <= 1`
pub fn in_diamond(r: Rect, p: Point) -> bool {
    let (hw, hh) = (r.width / 2.0, r.height / 2.0);
    if hw <= 0.0 || hh <= 0.0 {
        return false;
    }
    let d = (p - r.center()).abs();
    d.x / hw + d.y / hh <= 1.0
}

/// Barycentric sign test: inside when `p` is on the same side of all three edges
pub fn in_triangle(vertices: [Point; 3], p: Point) -> bool {
    fn sign(p: Point, a: Point, b: Point) -> f64 {
        (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
    }
    let [a, b, c] = vertices;
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Even-odd ray casting against a closed polygon.
///
/// Points lying exactly on an edge are reported inside.
pub fn in_polygon(vertices: &[Point], p: Point) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (vertices[i], vertices[j]);
        if on_segment(a, b, p) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    const EPS: f64 = 1e-9;
    let cross = (b - a).perp_dot(p - a);
    if cross.abs() > EPS * (b - a).length().max(1.0) {
        return false;
    }
    let min = a.min(b) - dvec2(EPS, EPS);
    let max = a.max(b) + dvec2(EPS, EPS);
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_boundary_counts_as_inside() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(in_diamond(r, dvec2(50.0, 50.0)));
        assert!(in_diamond(r, dvec2(50.0, 0.0)));
        assert!(!in_diamond(r, dvec2(0.0, 0.0)));
    }

    #[test]
    fn circle_uses_shorter_side() {
        let r = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert!(in_circle(r, dvec2(50.0, 20.0)));
        assert!(in_circle(r, dvec2(70.0, 20.0)));
        assert!(!in_circle(r, dvec2(75.0, 20.0)));
    }

    #[test]
    fn ellipse_quadratic_form() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(in_ellipse(r, dvec2(100.0, 25.0)));
        assert!(!in_ellipse(r, dvec2(95.0, 5.0)));
    }

    #[test]
    fn triangle_sign_test() {
        let tri = [dvec2(50.0, 0.0), dvec2(100.0, 100.0), dvec2(0.0, 100.0)];
        assert!(in_triangle(tri, dvec2(50.0, 50.0)));
        assert!(in_triangle(tri, dvec2(50.0, 100.0)));
        assert!(!in_triangle(tri, dvec2(5.0, 5.0)));
    }

    #[test]
    fn polygon_ray_casting() {
        let square = [dvec2(0.0, 0.0), dvec2(10.0, 0.0), dvec2(10.0, 10.0), dvec2(0.0, 10.0)];
        assert!(in_polygon(&square, dvec2(5.0, 5.0)));
        assert!(in_polygon(&square, dvec2(10.0, 5.0)));
        assert!(!in_polygon(&square, dvec2(11.0, 5.0)));
        assert!(!in_polygon(&square[..2], dvec2(5.0, 0.0)));
    }
}
