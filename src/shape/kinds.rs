//! Built-in shape kinds
//!
//! Each kind is its own type that knows how to:
//! - Build its outline from the instance bounds
//! - Hit-test precisely where a bounding box is too coarse
//! - Describe its default configuration

use enum_dispatch::enum_dispatch;

use super::behavior::ShapeBehavior;
use super::drawable::{DrawLayer, Drawable, LayerRole, RenderContext};
use super::Shape;
use crate::config::{Constraints, DataBag, PortConfig, ShapeConfig};
use crate::defaults;
use crate::geometry::{ArrowKind, PathData, TriangleOrientation, hit, outline};
use crate::types::Point;
use crate::validator::{ValidationIssue, ValidationReport};

use glam::dvec2;

/// Type ids served by [`builtin`] and [`builtin_config`]
pub const BUILTIN_TYPES: [&str; 14] = [
    "rectangle",
    "rounded-rectangle",
    "circle",
    "ellipse",
    "diamond",
    "triangle",
    "polygon",
    "star",
    "parallelogram",
    "trapezoid",
    "document",
    "cylinder",
    "cloud",
    "arrow",
];

/// Vertex-count key a kind reads from its data bag, with its minimum
pub fn count_param(type_id: &str) -> Option<(&'static str, u32)> {
    match type_id {
        "polygon" => Some(("sides", 3)),
        "star" => Some(("points", 2)),
        "cloud" => Some(("lobes", 3)),
        _ => None,
    }
}

/// Error on `data.<key>` unless it is absent or an integer in `[min, MAX_VERTEX_COUNT]`
pub(crate) fn check_count(data: &DataBag, key: &str, min: u32, report: &mut ValidationReport) {
    let Some(value) = data.get(key) else {
        return;
    };
    let range = u64::from(min)..=u64::from(defaults::MAX_VERTEX_COUNT);
    if !value.as_u64().is_some_and(|n| range.contains(&n)) {
        report.error(ValidationIssue::new(
            format!("data.{}", key),
            format!(
                "must be an integer in [{}, {}], got {}",
                min,
                defaults::MAX_VERTEX_COUNT,
                value
            ),
        ));
    }
}

fn validate_count(kind: &str, shape: &Shape) -> ValidationReport {
    let mut report = ValidationReport::ok();
    if let Some((key, min)) = count_param(kind) {
        check_count(shape.data(), key, min, &mut report);
    }
    report
}

// ============================================================================
// Shape Kinds
// ============================================================================

/// Rectangle; `cornerRadius` in the data bag rounds the corners
#[derive(Debug, Clone)]
pub struct RectangleShape {
    kind: &'static str,
    corner_radius: f64,
}

impl RectangleShape {
    pub fn sharp() -> Self {
        Self {
            kind: "rectangle",
            corner_radius: 0.0,
        }
    }

    pub fn rounded() -> Self {
        Self {
            kind: "rounded-rectangle",
            corner_radius: defaults::CORNER_RADIUS,
        }
    }
}

impl ShapeBehavior for RectangleShape {
    fn kind(&self) -> &str {
        self.kind
    }

    fn path(&self, shape: &Shape) -> PathData {
        let radius = shape.data_f64("cornerRadius").unwrap_or(self.corner_radius);
        outline::rectangle(shape.rect(), radius)
    }

    fn validate(&self, shape: &Shape) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if shape.data_f64("cornerRadius").is_some_and(|r| r < 0.0) {
            report.error(ValidationIssue::new("data.cornerRadius", "must not be negative"));
        }
        report
    }
}

#[derive(Debug, Clone, Default)]
pub struct CircleShape;

impl ShapeBehavior for CircleShape {
    fn kind(&self) -> &str {
        "circle"
    }

    fn path(&self, shape: &Shape) -> PathData {
        outline::circle(shape.rect())
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_circle(shape.rect(), p)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EllipseShape;

impl ShapeBehavior for EllipseShape {
    fn kind(&self) -> &str {
        "ellipse"
    }

    fn path(&self, shape: &Shape) -> PathData {
        outline::ellipse(shape.rect())
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_ellipse(shape.rect(), p)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiamondShape;

impl ShapeBehavior for DiamondShape {
    fn kind(&self) -> &str {
        "diamond"
    }

    fn path(&self, shape: &Shape) -> PathData {
        outline::diamond(shape.rect())
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_diamond(shape.rect(), p)
    }
}

/// Triangle; `orientation` (`up`, `down`, `left`, `right`) in the data bag
#[derive(Debug, Clone, Default)]
pub struct TriangleShape;

impl TriangleShape {
    fn orientation(shape: &Shape) -> TriangleOrientation {
        shape
            .data_str("orientation")
            .and_then(TriangleOrientation::parse)
            .unwrap_or_default()
    }
}

impl ShapeBehavior for TriangleShape {
    fn kind(&self) -> &str {
        "triangle"
    }

    fn path(&self, shape: &Shape) -> PathData {
        outline::triangle(shape.rect(), Self::orientation(shape))
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_triangle(outline::triangle_vertices(shape.rect(), Self::orientation(shape)), p)
    }

    fn validate(&self, shape: &Shape) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if let Some(o) = shape.data_str("orientation") {
            if TriangleOrientation::parse(o).is_none() {
                report.error(ValidationIssue::new("data.orientation", format!("unknown orientation `{}`", o)));
            }
        }
        report
    }
}

/// Regular polygon; `sides` and `polygonRotation` in the data bag
#[derive(Debug, Clone, Default)]
pub struct PolygonShape;

impl ShapeBehavior for PolygonShape {
    fn kind(&self) -> &str {
        "polygon"
    }

    fn path(&self, shape: &Shape) -> PathData {
        let sides = shape.data_u32("sides").unwrap_or(defaults::POLYGON_SIDES);
        let rotation = shape.data_f64("polygonRotation").unwrap_or(0.0);
        outline::regular_polygon(shape.rect(), sides, rotation)
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_polygon(&self.path(shape).vertices(), p)
    }

    fn validate(&self, shape: &Shape) -> ValidationReport {
        validate_count(self.kind(), shape)
    }
}

/// Star; `points` and `innerRadius` (fraction of the outer radius) in the data bag
#[derive(Debug, Clone, Default)]
pub struct StarShape;

impl ShapeBehavior for StarShape {
    fn kind(&self) -> &str {
        "star"
    }

    fn path(&self, shape: &Shape) -> PathData {
        let points = shape.data_u32("points").unwrap_or(defaults::STAR_POINTS);
        let inner = shape.data_f64("innerRadius").unwrap_or(defaults::STAR_INNER_RATIO);
        outline::star(shape.rect(), points, inner)
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_polygon(&self.path(shape).vertices(), p)
    }

    fn validate(&self, shape: &Shape) -> ValidationReport {
        validate_count(self.kind(), shape)
    }
}

/// Parallelogram; `skew` (fraction of width) in the data bag
#[derive(Debug, Clone, Default)]
pub struct ParallelogramShape;

impl ShapeBehavior for ParallelogramShape {
    fn kind(&self) -> &str {
        "parallelogram"
    }

    fn path(&self, shape: &Shape) -> PathData {
        outline::parallelogram(shape.rect(), shape.data_f64("skew").unwrap_or(defaults::SKEW))
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_polygon(&self.path(shape).vertices(), p)
    }
}

/// Trapezoid; `skew` is the top inset on each side, as a fraction of width
#[derive(Debug, Clone, Default)]
pub struct TrapezoidShape;

impl ShapeBehavior for TrapezoidShape {
    fn kind(&self) -> &str {
        "trapezoid"
    }

    fn path(&self, shape: &Shape) -> PathData {
        outline::trapezoid(shape.rect(), shape.data_f64("skew").unwrap_or(defaults::SKEW))
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_polygon(&self.path(shape).vertices(), p)
    }
}

/// Document with a wavy bottom edge; `waveHeight` in the data bag
#[derive(Debug, Clone, Default)]
pub struct DocumentShape;

impl ShapeBehavior for DocumentShape {
    fn kind(&self) -> &str {
        "document"
    }

    fn path(&self, shape: &Shape) -> PathData {
        let rect = shape.rect();
        let wave = shape
            .data_f64("waveHeight")
            .unwrap_or(rect.height * defaults::WAVE_HEIGHT_RATIO);
        outline::document(rect, wave)
    }
}

/// Cylinder; `ellipseHeight` in the data bag
#[derive(Debug, Clone, Default)]
pub struct CylinderShape;

impl ShapeBehavior for CylinderShape {
    fn kind(&self) -> &str {
        "cylinder"
    }

    fn path(&self, shape: &Shape) -> PathData {
        let rect = shape.rect();
        let ellipse = shape
            .data_f64("ellipseHeight")
            .unwrap_or(rect.height * defaults::CYLINDER_ELLIPSE_RATIO * 2.0);
        outline::cylinder(rect, ellipse)
    }

    fn render(&self, shape: &Shape, ctx: &RenderContext) -> Drawable {
        // The outline is open, so fill it explicitly
        let mut drawable = Drawable::for_shape(shape, self.path(shape), ctx);
        if let Some(body) = drawable.layers.iter_mut().find(|l| l.role == LayerRole::Body) {
            body.fill = Some(shape.style().fill.clone());
        }
        drawable
    }
}

/// Cloud; `lobes` in the data bag
#[derive(Debug, Clone, Default)]
pub struct CloudShape;

impl ShapeBehavior for CloudShape {
    fn kind(&self) -> &str {
        "cloud"
    }

    fn path(&self, shape: &Shape) -> PathData {
        outline::cloud(shape.rect(), shape.data_u32("lobes").unwrap_or(defaults::CLOUD_LOBES))
    }

    fn contains_point(&self, shape: &Shape, p: Point) -> bool {
        hit::in_ellipse(shape.rect(), p)
    }

    fn validate(&self, shape: &Shape) -> ValidationReport {
        validate_count(self.kind(), shape)
    }
}

/// Block arrow spanning the bounds left to right; `arrow` (`single`,
/// `double`, `curved`) in the data bag
#[derive(Debug, Clone, Default)]
pub struct ArrowShape;

impl ArrowShape {
    fn arrow_kind(shape: &Shape) -> ArrowKind {
        shape.data_str("arrow").and_then(ArrowKind::parse).unwrap_or_default()
    }

    fn endpoints(shape: &Shape) -> (Point, Point) {
        let r = shape.rect();
        let cy = r.y + r.height / 2.0;
        (dvec2(r.x, cy), dvec2(r.x + r.width, cy))
    }

    fn head_size(shape: &Shape) -> (f64, f64) {
        let r = shape.rect();
        let length = defaults::ARROW_HEAD_LENGTH.min(r.width / 2.0);
        let width = defaults::ARROW_HEAD_WIDTH.min(r.height);
        (length, width)
    }
}

impl ShapeBehavior for ArrowShape {
    fn kind(&self) -> &str {
        "arrow"
    }

    fn path(&self, shape: &Shape) -> PathData {
        let (start, end) = Self::endpoints(shape);
        let (length, width) = Self::head_size(shape);
        outline::arrow(start, end, Self::arrow_kind(shape), length, width)
    }

    fn render(&self, shape: &Shape, ctx: &RenderContext) -> Drawable {
        // Shaft is stroked only; heads are filled with the stroke color
        let (start, end) = Self::endpoints(shape);
        let (length, width) = Self::head_size(shape);
        let style = shape.style();
        let (shaft, heads) = match Self::arrow_kind(shape) {
            ArrowKind::Single => (
                PathData::new().move_to(start).line_to(end),
                outline::arrowhead(end, end - start, length, width),
            ),
            ArrowKind::Double => (
                PathData::new().move_to(start).line_to(end),
                outline::arrowhead(end, end - start, length, width)
                    .extend(outline::arrowhead(start, start - end, length, width)),
            ),
            ArrowKind::Curved => {
                let c = outline::arc_control_point(true, start, end);
                (
                    PathData::new().move_to(start).q(c.x, c.y, end.x, end.y),
                    outline::arrowhead(end, end - c, length, width),
                )
            }
        };
        let layers = vec![
            DrawLayer {
                role: LayerRole::Body,
                path: shaft,
                fill: None,
                stroke: Some(style.stroke.clone()),
                stroke_width: style.stroke_width,
                opacity: style.opacity,
            },
            DrawLayer {
                role: LayerRole::Decoration,
                path: heads,
                fill: Some(style.stroke.clone()),
                stroke: Some(style.stroke.clone()),
                stroke_width: style.stroke_width,
                opacity: style.opacity,
            },
        ];
        Drawable::from_layers(shape, layers, ctx)
    }

    fn validate(&self, shape: &Shape) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if let Some(a) = shape.data_str("arrow") {
            if ArrowKind::parse(a).is_none() {
                report.error(ValidationIssue::new("data.arrow", format!("unknown arrow style `{}`", a)));
            }
        }
        report
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Closed set of built-in kinds, dispatched without a vtable
#[enum_dispatch(ShapeBehavior)]
#[derive(Debug, Clone)]
pub enum BuiltinShape {
    Rectangle(RectangleShape),
    Circle(CircleShape),
    Ellipse(EllipseShape),
    Diamond(DiamondShape),
    Triangle(TriangleShape),
    Polygon(PolygonShape),
    Star(StarShape),
    Parallelogram(ParallelogramShape),
    Trapezoid(TrapezoidShape),
    Document(DocumentShape),
    Cylinder(CylinderShape),
    Cloud(CloudShape),
    Arrow(ArrowShape),
}

/// Behavior for a built-in type id
pub fn builtin(type_id: &str) -> Option<BuiltinShape> {
    let shape: BuiltinShape = match type_id {
        "rectangle" => RectangleShape::sharp().into(),
        "rounded-rectangle" => RectangleShape::rounded().into(),
        "circle" => CircleShape.into(),
        "ellipse" => EllipseShape.into(),
        "diamond" => DiamondShape.into(),
        "triangle" => TriangleShape.into(),
        "polygon" => PolygonShape.into(),
        "star" => StarShape.into(),
        "parallelogram" => ParallelogramShape.into(),
        "trapezoid" => TrapezoidShape.into(),
        "document" => DocumentShape.into(),
        "cylinder" => CylinderShape.into(),
        "cloud" => CloudShape.into(),
        "arrow" => ArrowShape.into(),
        _ => return None,
    };
    Some(shape)
}

/// Default configuration document for a built-in type id
pub fn builtin_config(type_id: &str) -> Option<ShapeConfig> {
    let config = match type_id {
        "rectangle" => ShapeConfig::for_type(type_id, "Rectangle", "basic").with_size(120.0, 80.0),
        "rounded-rectangle" => ShapeConfig::for_type(type_id, "Rounded Rectangle", "basic")
            .with_size(120.0, 80.0)
            .with_data("cornerRadius", defaults::CORNER_RADIUS),
        "circle" => {
            let mut c = ShapeConfig::for_type(type_id, "Circle", "basic");
            c.constraints = Constraints {
                aspect_ratio: Some(1.0),
                ..Constraints::default()
            };
            c
        }
        "ellipse" => ShapeConfig::for_type(type_id, "Ellipse", "basic").with_size(120.0, 80.0),
        "diamond" => ShapeConfig::for_type(type_id, "Diamond", "flowchart").with_size(100.0, 100.0),
        "triangle" => ShapeConfig::for_type(type_id, "Triangle", "basic").with_data("orientation", "up"),
        "polygon" => ShapeConfig::for_type(type_id, "Hexagon", "basic")
            .with_size(100.0, 90.0)
            .with_data("sides", defaults::POLYGON_SIDES),
        "star" => ShapeConfig::for_type(type_id, "Star", "basic")
            .with_data("points", defaults::STAR_POINTS)
            .with_data("innerRadius", defaults::STAR_INNER_RATIO),
        "parallelogram" => ShapeConfig::for_type(type_id, "Parallelogram", "flowchart")
            .with_size(120.0, 70.0)
            .with_data("skew", defaults::SKEW),
        "trapezoid" => ShapeConfig::for_type(type_id, "Trapezoid", "flowchart")
            .with_size(120.0, 70.0)
            .with_data("skew", defaults::SKEW),
        "document" => ShapeConfig::for_type(type_id, "Document", "flowchart").with_size(100.0, 120.0),
        "cylinder" => ShapeConfig::for_type(type_id, "Database", "flowchart").with_size(80.0, 110.0),
        "cloud" => ShapeConfig::for_type(type_id, "Cloud", "basic").with_size(140.0, 90.0),
        "arrow" => {
            let mut c = ShapeConfig::for_type(type_id, "Arrow", "connectors")
                .with_size(120.0, 30.0)
                .with_data("arrow", "single");
            c.ports = vec![
                PortConfig::new("start", 0.0, 0.5, "input", "w"),
                PortConfig::new("end", 1.0, 0.5, "output", "e"),
            ];
            c.handles = vec!["w".to_string(), "e".to_string()];
            c
        }
        _ => return None,
    };
    Some(config)
}
