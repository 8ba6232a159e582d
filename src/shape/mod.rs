//! Shape instances and the behavior contract they delegate to.
//!
//! A [`Shape`] owns its geometry, style, ports, handles and interaction state;
//! everything kind-specific (outline, hit test, drawing) comes from the
//! [`ShapeBehavior`] it was created with.

pub mod behavior;
pub mod drawable;
pub mod kinds;

pub use behavior::{BehaviorRef, ShapeBehavior};
pub use drawable::{DrawLayer, Drawable, LabelAnchor, LayerRole, RenderContext};
pub use kinds::{BUILTIN_TYPES, BuiltinShape, builtin, builtin_config, count_param};

use serde_json::Value;

use crate::config::{Constraints, DataBag, Features, ShapeConfig, Style, TextStyle};
use crate::defaults;
use crate::errors::ShapeError;
use crate::geometry::PathData;
use crate::handles::{self, HandleId, ResizeOptions};
use crate::ports::{self, Port, PortPosition};
use crate::types::{Bounds, Point, Rect, rotate_about};
use crate::validator::{ValidationIssue, ValidationReport};

/// Absolute location of one resize handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePosition {
    pub handle: HandleId,
    pub point: Point,
}

/// A live shape instance
#[derive(Debug, Clone)]
pub struct Shape {
    id: String,
    type_id: String,
    name: String,
    category: String,
    rect: Rect,
    rotation: f64,
    style: Style,
    label: String,
    text_style: TextStyle,
    ports: Vec<Port>,
    ports_enabled: bool,
    handles: Vec<HandleId>,
    handles_enabled: bool,
    constraints: Constraints,
    features: Features,
    selected: bool,
    hovered: bool,
    locked: bool,
    visible: bool,
    data: DataBag,
    behavior: BehaviorRef,
}

impl Shape {
    /// Build an instance from a configuration document.
    ///
    /// Geometry is taken as given; port and handle declarations must be valid.
    pub fn from_config(config: &ShapeConfig, behavior: BehaviorRef) -> Result<Shape, ShapeError> {
        let mut report = ports::validate_ports(&config.ports);
        report.merge(ports::validate_handles(&config.handles));
        if !report.valid {
            return Err(ShapeError::Invalid(report));
        }

        Ok(Shape {
            id: config.id.clone(),
            type_id: config.type_id.clone(),
            name: config.name.clone(),
            category: config.category.clone(),
            rect: Rect::new(config.x, config.y, config.width, config.height),
            rotation: config.rotation,
            style: config.style.clone(),
            label: config.label.clone(),
            text_style: config.text_style.clone(),
            ports: config.ports.iter().filter_map(Port::from_config).collect(),
            ports_enabled: config.ports_enabled,
            handles: config.handles.iter().filter_map(|h| HandleId::parse(h)).collect(),
            handles_enabled: config.handles_enabled,
            constraints: config.constraints.clone(),
            features: config.features,
            selected: false,
            hovered: false,
            locked: config.locked,
            visible: config.visible,
            data: config.data.clone(),
            behavior,
        })
    }

    pub fn from_json(json: &str, behavior: BehaviorRef) -> Result<Shape, ShapeError> {
        let config: ShapeConfig = serde_json::from_str(json)?;
        Shape::from_config(&config, behavior)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Unrotated bounds
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn x(&self) -> f64 {
        self.rect.x
    }

    pub fn y(&self) -> f64 {
        self.rect.y
    }

    pub fn width(&self) -> f64 {
        self.rect.width
    }

    pub fn height(&self) -> f64 {
        self.rect.height
    }

    /// Degrees, clockwise
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn bounds(&self) -> Bounds {
        self.rect.bounds()
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text_style(&self) -> &TextStyle {
        &self.text_style
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn ports_enabled(&self) -> bool {
        self.ports_enabled
    }

    pub fn handles(&self) -> &[HandleId] {
        &self.handles
    }

    pub fn handles_enabled(&self) -> bool {
        self.handles_enabled
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn data(&self) -> &DataBag {
        &self.data
    }

    pub fn data_f64(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }

    pub fn data_u32(&self, key: &str) -> Option<u32> {
        self.data.get(key).and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok())
    }

    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn behavior(&self) -> &BehaviorRef {
        &self.behavior
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    /// Map a point from the unrotated frame to the canvas
    pub fn to_absolute(&self, p: Point) -> Point {
        if self.rotation == 0.0 {
            return p;
        }
        rotate_about(p, self.center(), self.rotation)
    }

    /// Map a canvas point into the unrotated frame
    pub fn to_local(&self, p: Point) -> Point {
        if self.rotation == 0.0 {
            return p;
        }
        rotate_about(p, self.center(), -self.rotation)
    }

    pub fn path(&self) -> PathData {
        self.behavior.path(self)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.behavior.contains_point(self, self.to_local(p))
    }

    pub fn render(&self, ctx: &RenderContext) -> Drawable {
        self.behavior.render(self, ctx)
    }

    pub fn port_positions(&self) -> Vec<PortPosition> {
        ports::port_positions(self)
    }

    /// Absolute handle locations; empty when handles are disabled
    pub fn handle_positions(&self) -> Vec<HandlePosition> {
        if !self.handles_enabled {
            return Vec::new();
        }
        self.handles
            .iter()
            .map(|&handle| {
                let (rx, ry) = handle.relative_position();
                let local = self.rect.at_relative(glam::dvec2(rx, ry));
                HandlePosition {
                    handle,
                    point: self.to_absolute(local),
                }
            })
            .collect()
    }

    /// Handle under `point`, nearest first, within `tolerance`
    pub fn handle_at(&self, point: Point, tolerance: f64) -> Option<HandleId> {
        let mut best: Option<(f64, HandleId)> = None;
        for pos in self.handle_positions() {
            let d = pos.point.distance(point);
            if d <= tolerance && best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, pos.handle));
            }
        }
        best.map(|(_, h)| h)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    pub fn set_position(&mut self, x: f64, y: f64) -> bool {
        if self.locked {
            return false;
        }
        self.rect.x = x;
        self.rect.y = y;
        true
    }

    /// Clamp to the constraints; with an aspect ratio, height follows width
    pub fn set_size(&mut self, width: f64, height: f64) -> bool {
        if self.locked {
            return false;
        }
        self.apply_size(width, height);
        true
    }

    pub(crate) fn apply_size(&mut self, width: f64, height: f64) {
        let width = self.constraints.clamp_width(width);
        let height = match self.constraints.ratio() {
            Some(ratio) => width / ratio,
            None => self.constraints.clamp_height(height),
        };
        self.rect.width = width;
        self.rect.height = height;
    }

    pub fn set_bounds(&mut self, r: Rect) -> bool {
        if self.locked {
            return false;
        }
        self.rect.x = r.x;
        self.rect.y = r.y;
        self.apply_size(r.width, r.height);
        true
    }

    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        if self.locked || !self.features.rotatable {
            return false;
        }
        self.rotation = degrees.rem_euclid(360.0);
        true
    }

    /// Drag `handle` by `(dx, dy)`; unknown handles and locked or
    /// non-resizable shapes are left untouched
    pub fn resize_with_handle(&mut self, handle: &str, dx: f64, dy: f64, options: &ResizeOptions) -> bool {
        if self.locked || !self.features.resizable {
            return false;
        }
        match handles::resize(self.rect, handle, dx, dy, &self.constraints, options) {
            Some(r) => {
                self.rect = r;
                true
            }
            None => false,
        }
    }

    /// Lock or unlock; locking requires the `lockable` feature
    pub fn set_locked(&mut self, locked: bool) -> bool {
        if locked && !self.features.lockable {
            return false;
        }
        self.locked = locked;
        true
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn set_data(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Wire-format document for this instance
    pub fn serialize(&self) -> ShapeConfig {
        ShapeConfig {
            id: self.id.clone(),
            type_id: self.type_id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            x: self.rect.x,
            y: self.rect.y,
            width: self.rect.width,
            height: self.rect.height,
            rotation: self.rotation,
            style: self.style.clone(),
            label: self.label.clone(),
            text_style: self.text_style.clone(),
            ports: self.ports.iter().map(Port::to_config).collect(),
            ports_enabled: self.ports_enabled,
            handles: self.handles.iter().map(|h| h.as_str().to_string()).collect(),
            handles_enabled: self.handles_enabled,
            constraints: self.constraints.clone(),
            features: self.features,
            locked: self.locked,
            visible: self.visible,
            data: self.data.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, ShapeError> {
        Ok(self.serialize().to_json()?)
    }

    /// Replace this instance's state with `config`.
    ///
    /// The document must be of the same type; interaction state other than
    /// `locked` and `visible` is kept.
    pub fn deserialize(&mut self, config: &ShapeConfig) -> Result<(), ShapeError> {
        if config.type_id != self.type_id {
            return Err(ShapeError::TypeMismatch {
                expected: self.type_id.clone(),
                found: config.type_id.clone(),
            });
        }
        let mut restored = Shape::from_config(config, BehaviorRef::clone(&self.behavior))?;
        restored.selected = self.selected;
        restored.hovered = self.hovered;
        *self = restored;
        Ok(())
    }

    /// Independent copy under `new_id`, or `None` when the shape is not clonable
    pub fn duplicate(&self, new_id: impl Into<String>) -> Option<Shape> {
        if !self.features.clonable {
            return None;
        }
        let mut copy = self.clone();
        copy.id = new_id.into();
        copy.selected = false;
        copy.hovered = false;
        Some(copy)
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Check instance invariants plus kind-specific rules
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if !self.rect.is_finite() || !self.rotation.is_finite() {
            report.error(ValidationIssue::new("geometry", "non-finite position, size or rotation"));
        }

        let c = &self.constraints;
        if !(c.min_width..=c.max_width).contains(&self.rect.width) {
            report.error(ValidationIssue::new(
                "width",
                format!("{} is outside [{}, {}]", self.rect.width, c.min_width, c.max_width),
            ));
        }
        if c.ratio().is_none() && !(c.min_height..=c.max_height).contains(&self.rect.height) {
            report.error(ValidationIssue::new(
                "height",
                format!("{} is outside [{}, {}]", self.rect.height, c.min_height, c.max_height),
            ));
        }
        if let Some(ratio) = c.ratio() {
            let actual = self.rect.width / self.rect.height;
            if actual.is_nan() || (actual - ratio).abs() >= defaults::ASPECT_TOLERANCE {
                report.error(ValidationIssue::new(
                    "constraints.aspectRatio",
                    format!("width/height is {:.4}, expected {}", actual, ratio),
                ));
            }
        }

        let serialized = self.serialize();
        report.merge(ports::validate_ports(&serialized.ports));
        report.merge(ports::validate_handles(&serialized.handles));
        report.merge(self.behavior.validate(self));
        report
    }
}
