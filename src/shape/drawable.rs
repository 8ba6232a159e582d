//! Drawing descriptions handed to a rendering backend.

use serde::Serialize;

use super::Shape;
use crate::config::TextStyle;
use crate::defaults;
use crate::geometry::{PathData, outline};
use crate::types::{Point, Rect};

/// What the host wants drawn besides the shape body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub show_ports: bool,
    /// Handles are only drawn for selected, resizable shapes
    pub show_handles: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            show_ports: false,
            show_handles: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    Body,
    Decoration,
    Port,
    Handle,
}

/// One styled path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawLayer {
    pub role: LayerRole,
    pub path: PathData,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub opacity: f64,
}

/// Where and how the label goes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAnchor {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub style: TextStyle,
}

/// Everything a backend needs to paint one shape.
///
/// Layer paths are in the unrotated frame; apply `rotation` degrees about
/// `(center_x, center_y)` when painting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawable {
    pub shape_id: String,
    pub layers: Vec<DrawLayer>,
    pub label: Option<LabelAnchor>,
    pub rotation: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Drawable {
    /// Standard description: filled body, then port and handle markers
    pub fn for_shape(shape: &Shape, body: PathData, ctx: &RenderContext) -> Self {
        let style = shape.style();
        let fill = body.is_closed().then(|| style.fill.clone());
        let layer = DrawLayer {
            role: LayerRole::Body,
            path: body,
            fill,
            stroke: Some(style.stroke.clone()),
            stroke_width: style.stroke_width,
            opacity: style.opacity,
        };
        Self::from_layers(shape, vec![layer], ctx)
    }

    /// Wrap kind-provided layers, adding label and markers
    pub fn from_layers(shape: &Shape, mut layers: Vec<DrawLayer>, ctx: &RenderContext) -> Self {
        let center = shape.center();
        if !shape.is_visible() {
            return Self {
                shape_id: shape.id().to_string(),
                layers: Vec::new(),
                label: None,
                rotation: shape.rotation(),
                center_x: center.x,
                center_y: center.y,
            };
        }

        if ctx.show_ports && shape.ports_enabled() {
            let rect = shape.rect();
            for port in shape.ports() {
                let p = rect.at_relative(port.rel);
                layers.push(marker(LayerRole::Port, circle_at(p, defaults::PORT_MARKER_RADIUS)));
            }
        }

        let resizable = shape.features().resizable && !shape.is_locked();
        if ctx.show_handles && shape.is_selected() && shape.handles_enabled() && resizable {
            let rect = shape.rect();
            for handle in shape.handles() {
                let (rx, ry) = handle.relative_position();
                let p = rect.at_relative(glam::dvec2(rx, ry));
                layers.push(marker(LayerRole::Handle, square_at(p, defaults::HANDLE_MARKER_SIZE)));
            }
        }

        let label = (!shape.label().is_empty()).then(|| LabelAnchor {
            text: shape.label().to_string(),
            x: center.x,
            y: center.y,
            style: shape.text_style().clone(),
        });

        Self {
            shape_id: shape.id().to_string(),
            layers,
            label,
            rotation: shape.rotation(),
            center_x: center.x,
            center_y: center.y,
        }
    }

    pub fn layers_with_role(&self, role: LayerRole) -> impl Iterator<Item = &DrawLayer> {
        self.layers.iter().filter(move |l| l.role == role)
    }
}

fn marker(role: LayerRole, path: PathData) -> DrawLayer {
    DrawLayer {
        role,
        path,
        fill: Some(defaults::FILL.to_string()),
        stroke: Some(defaults::STROKE.to_string()),
        stroke_width: 1.0,
        opacity: 1.0,
    }
}

fn circle_at(p: Point, radius: f64) -> PathData {
    outline::circle(Rect::new(p.x - radius, p.y - radius, radius * 2.0, radius * 2.0))
}

fn square_at(p: Point, size: f64) -> PathData {
    outline::rectangle(Rect::new(p.x - size / 2.0, p.y - size / 2.0, size, size), 0.0)
}
