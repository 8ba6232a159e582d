//! Ports: placement, nearest-match, connection rules and connector routing.

use std::fmt;
use std::collections::HashSet;

use glam::dvec2;

use crate::config::PortConfig;
use crate::defaults;
use crate::geometry::PathData;
use crate::handles::HandleId;
use crate::shape::Shape;
use crate::types::{Point, UnitVec};
use crate::validator::{ValidationIssue, ValidationReport};

/// Which ends of a connection a port may serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRole {
    Input,
    Output,
    Both,
}

impl PortRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "input" => Some(PortRole::Input),
            "output" => Some(PortRole::Output),
            "both" => Some(PortRole::Both),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortRole::Input => "input",
            PortRole::Output => "output",
            PortRole::Both => "both",
        }
    }

    /// Whether this port can act in `role` (`Both` satisfies either)
    pub fn includes(self, role: PortRole) -> bool {
        self == PortRole::Both || role == PortRole::Both || self == role
    }
}

/// Compass direction a connector leaves a port in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
    Any,
}

impl PortDirection {
    /// Accepts compass abbreviations and the side names `top`/`right`/`bottom`/`left`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "n" | "top" => Some(PortDirection::N),
            "ne" => Some(PortDirection::Ne),
            "e" | "right" => Some(PortDirection::E),
            "se" => Some(PortDirection::Se),
            "s" | "bottom" => Some(PortDirection::S),
            "sw" => Some(PortDirection::Sw),
            "w" | "left" => Some(PortDirection::W),
            "nw" => Some(PortDirection::Nw),
            "any" => Some(PortDirection::Any),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortDirection::N => "n",
            PortDirection::Ne => "ne",
            PortDirection::E => "e",
            PortDirection::Se => "se",
            PortDirection::S => "s",
            PortDirection::Sw => "sw",
            PortDirection::W => "w",
            PortDirection::Nw => "nw",
            PortDirection::Any => "any",
        }
    }

    /// Screen angle in degrees, clockwise from east. `Any` maps to 0.
    pub fn angle(self) -> f64 {
        match self {
            PortDirection::E | PortDirection::Any => 0.0,
            PortDirection::Se => 45.0,
            PortDirection::S => 90.0,
            PortDirection::Sw => 135.0,
            PortDirection::W => 180.0,
            PortDirection::Nw => 225.0,
            PortDirection::N => 270.0,
            PortDirection::Ne => 315.0,
        }
    }

    pub fn unit_vec(self) -> UnitVec {
        UnitVec::from_degrees(self.angle())
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A port declared on a shape, in unit-square coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: String,
    pub rel: Point,
    pub role: PortRole,
    pub direction: PortDirection,
}

impl Port {
    pub fn new(id: impl Into<String>, rx: f64, ry: f64, role: PortRole, direction: PortDirection) -> Self {
        Self {
            id: id.into(),
            rel: dvec2(rx, ry),
            role,
            direction,
        }
    }

    /// Typed port from its declaration; unknown tags yield `None`
    pub fn from_config(c: &PortConfig) -> Option<Self> {
        Some(Self {
            id: c.id.clone(),
            rel: dvec2(c.x, c.y),
            role: PortRole::parse(&c.role)?,
            direction: PortDirection::parse(&c.direction)?,
        })
    }

    pub fn to_config(&self) -> PortConfig {
        PortConfig::new(self.id.clone(), self.rel.x, self.rel.y, self.role.as_str(), self.direction.as_str())
    }
}

/// A port resolved to absolute coordinates on a particular shape
#[derive(Debug, Clone, PartialEq)]
pub struct PortPosition {
    pub shape_id: String,
    pub port_id: String,
    pub point: Point,
    pub role: PortRole,
    pub direction: PortDirection,
}

/// Absolute position of every declared port, in declaration order.
///
/// Empty when ports are disabled or none are declared.
pub fn port_positions(shape: &Shape) -> Vec<PortPosition> {
    if !shape.ports_enabled() {
        return Vec::new();
    }
    let rect = shape.rect();
    shape
        .ports()
        .iter()
        .map(|p| PortPosition {
            shape_id: shape.id().to_string(),
            port_id: p.id.clone(),
            point: shape.to_absolute(rect.at_relative(p.rel)),
            role: p.role,
            direction: p.direction,
        })
        .collect()
}

/// Nearest port within `max_distance` of `point`; the first declared wins ties
pub fn find_nearest_port(shape: &Shape, point: Point, max_distance: f64) -> Option<PortPosition> {
    let mut best: Option<(f64, PortPosition)> = None;
    for pos in port_positions(shape) {
        let d = pos.point.distance(point);
        if d > max_distance {
            continue;
        }
        if best.as_ref().is_none_or(|(bd, _)| d < *bd) {
            best = Some((d, pos));
        }
    }
    best.map(|(_, p)| p)
}

/// Whether a connection may run from `source` to `target`
pub fn can_connect(source: &PortPosition, target: &PortPosition) -> bool {
    if source.shape_id == target.shape_id && source.port_id == target.port_id {
        return false;
    }
    source.role.includes(PortRole::Output) && target.role.includes(PortRole::Input)
}

/// Port on `shape` matching `role` that lies closest to `target`'s center.
pub fn optimal_port(shape: &Shape, target: &Shape, role: PortRole) -> Option<PortPosition> {
    let center = target.center();
    let mut best: Option<(f64, PortPosition)> = None;
    for pos in port_positions(shape).into_iter().filter(|p| p.role.includes(role)) {
        let d = pos.point.distance(center);
        if best.as_ref().is_none_or(|(bd, _)| d < *bd) {
            best = Some((d, pos));
        }
    }
    best.map(|(_, p)| p)
}

/// How a connector is drawn between two ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStyle {
    #[default]
    Straight,
    Bezier,
    Orthogonal,
}

/// Open path from `source` to `target` in the given style
pub fn connection_path(source: &PortPosition, target: &PortPosition, style: ConnectionStyle) -> PathData {
    let (s, t) = (source.point, target.point);
    match style {
        ConnectionStyle::Straight => PathData::new().move_to(s).line_to(t),
        ConnectionStyle::Bezier => {
            let offset = s.distance(t) * defaults::BEZIER_CONTROL_RATIO;
            let c1 = s + source.direction.unit_vec().scaled(offset);
            let c2 = t + target.direction.unit_vec().scaled(offset);
            PathData::new().move_to(s).c(c1.x, c1.y, c2.x, c2.y, t.x, t.y)
        }
        ConnectionStyle::Orthogonal => orthogonal_path(s, source.direction, t, target.direction),
    }
}

fn orthogonal_path(s: Point, from: PortDirection, t: Point, to: PortDirection) -> PathData {
    match (from, to) {
        (PortDirection::E, PortDirection::W) => {
            let mid_x = (s.x + t.x) / 2.0;
            PathData::new().move_to(s).l(mid_x, s.y).l(mid_x, t.y).line_to(t)
        }
        (PortDirection::S, PortDirection::N) => {
            let mid_y = (s.y + t.y) / 2.0;
            PathData::new().move_to(s).l(s.x, mid_y).l(t.x, mid_y).line_to(t)
        }
        // Every other pairing bends once through (source.x, target.y)
        _ => PathData::new().move_to(s).l(s.x, t.y).line_to(t),
    }
}

/// Collect every port defect: duplicate ids, coordinates outside the unit
/// square, unknown role or direction tags.
pub fn validate_ports(ports: &[PortConfig]) -> ValidationReport {
    let mut report = ValidationReport::ok();
    let mut seen = HashSet::new();
    for (i, p) in ports.iter().enumerate() {
        let field = format!("ports[{}]", i);
        if p.id.is_empty() {
            report.error(ValidationIssue::new(format!("{field}.id"), "port id is empty"));
        } else if !seen.insert(p.id.as_str()) {
            report.error(ValidationIssue::new(format!("{field}.id"), format!("duplicate port id `{}`", p.id)));
        }
        for (axis, v) in [("x", p.x), ("y", p.y)] {
            if !(0.0..=1.0).contains(&v) {
                report.error(ValidationIssue::new(
                    format!("{field}.{axis}"),
                    format!("relative coordinate {} is outside [0, 1]", v),
                ));
            }
        }
        if PortRole::parse(&p.role).is_none() {
            report.error(ValidationIssue::new(
                format!("{field}.type"),
                format!("unknown port role `{}` (expected input, output or both)", p.role),
            ));
        }
        if PortDirection::parse(&p.direction).is_none() {
            report.error(ValidationIssue::new(
                format!("{field}.direction"),
                format!("unknown port direction `{}`", p.direction),
            ));
        }
    }
    report
}

/// Collect every handle defect: unknown ids and duplicates
pub fn validate_handles(handles: &[String]) -> ValidationReport {
    let mut report = ValidationReport::ok();
    let mut seen = HashSet::new();
    for (i, h) in handles.iter().enumerate() {
        let field = format!("handles[{}]", i);
        if HandleId::parse(h).is_none() {
            report.error(ValidationIssue::new(field, format!("unknown handle id `{}`", h)));
        } else if !seen.insert(h.as_str()) {
            report.error(ValidationIssue::new(field, format!("duplicate handle id `{}`", h)));
        }
    }
    report
}
