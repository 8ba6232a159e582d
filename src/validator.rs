//! Shape type validation.
//!
//! Three levels, each returning a [`ValidationReport`] instead of failing:
//!
//! - **structural**: the behavior produces a usable outline for the type's defaults
//! - **declarative**: required fields are present and numeric ranges are sane
//! - **cross-check**: the registered type id agrees with the document's own `id`
//!
//! Every problem is collected so a whole library can be checked in one pass.

use std::fmt;

use serde_json::Value;

use crate::config::{ShapeConfig, default_handles, default_ports};
use crate::geometry::Segment;
use crate::ports::{validate_handles, validate_ports};
use crate::shape::kinds::check_count;
use crate::shape::{BehaviorRef, Shape, count_param};

/// A single problem, tied to the field it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field (`constraints.minWidth`, `ports[2].x`, ...)
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::ok()
    }
}

impl ValidationReport {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, issue: ValidationIssue) {
        self.valid = false;
        self.errors.push(issue);
    }

    pub fn warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Fold `other` into this report
    pub fn merge(&mut self, other: ValidationReport) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Whether any error mentions `field`
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.errors {
            writeln!(f, "  error: {}", e)?;
        }
        for w in &self.warnings {
            writeln!(f, "  warning: {}", w)?;
        }
        Ok(())
    }
}

const REQUIRED_STRINGS: [&str; 2] = ["id", "name"];
const REQUIRED_NUMBERS: [&str; 2] = ["width", "height"];

/// Stateless validator; cheap to copy and safe to share
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeValidator;

impl ShapeValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run all three levels for a type about to be registered.
    ///
    /// The structural probe runs whenever the document parses, so one call
    /// reports every problem the three levels can find.
    pub fn validate(&self, type_id: &str, behavior: &BehaviorRef, config: &Value) -> ValidationReport {
        let mut report = self.validate_config(config);
        report.merge(self.cross_check(type_id, config));
        if let Ok(parsed) = serde_json::from_value::<ShapeConfig>(config.clone()) {
            report.merge(self.validate_behavior(type_id, behavior, &parsed));
        }
        report
    }

    /// Typed convenience over [`validate_config`](Self::validate_config)
    pub fn validate_shape_config(&self, config: &ShapeConfig) -> ValidationReport {
        match serde_json::to_value(config) {
            Ok(v) => self.validate_config(&v),
            Err(e) => {
                let mut report = ValidationReport::ok();
                report.error(ValidationIssue::new("", format!("cannot serialize configuration: {}", e)));
                report
            }
        }
    }

    /// Declarative level: required fields and numeric sanity
    pub fn validate_config(&self, config: &Value) -> ValidationReport {
        let mut report = ValidationReport::ok();
        let Some(obj) = config.as_object() else {
            report.error(ValidationIssue::new("", "configuration must be a JSON object"));
            return report;
        };

        for field in REQUIRED_STRINGS {
            match obj.get(field) {
                None | Some(Value::Null) => {
                    report.error(ValidationIssue::new(field, format!("missing required field `{}`", field)))
                }
                Some(Value::String(s)) if s.trim().is_empty() => {
                    report.error(ValidationIssue::new(field, format!("required field `{}` is empty", field)))
                }
                Some(Value::String(_)) => {}
                Some(_) => report.error(ValidationIssue::new(field, format!("`{}` must be a string", field))),
            }
        }
        for field in REQUIRED_NUMBERS {
            match obj.get(field) {
                None | Some(Value::Null) => {
                    report.error(ValidationIssue::new(field, format!("missing required field `{}`", field)))
                }
                Some(Value::Number(_)) => {}
                Some(_) => report.error(ValidationIssue::new(field, format!("`{}` must be a number", field))),
            }
        }

        // Rejected required fields fall back to their defaults so the
        // remaining checks still run
        let mut rest = obj.clone();
        for field in REQUIRED_STRINGS.into_iter().chain(REQUIRED_NUMBERS) {
            if report.has_error_for(field) {
                rest.remove(field);
            }
        }
        let parsed = match serde_json::from_value::<ShapeConfig>(Value::Object(rest)) {
            Ok(parsed) => parsed,
            Err(e) => {
                report.error(ValidationIssue::new("", format!("malformed configuration: {}", e)));
                return report;
            }
        };

        self.check_geometry(&parsed, &mut report);
        if let Some((key, min)) = count_param(&parsed.type_id) {
            check_count(&parsed.data, key, min, &mut report);
        }
        report.merge(validate_ports(&parsed.ports));
        report.merge(validate_handles(&parsed.handles));
        report
    }

    fn check_geometry(&self, c: &ShapeConfig, report: &mut ValidationReport) {
        for (field, v) in [("width", c.width), ("height", c.height)] {
            if !v.is_finite() || v <= 0.0 {
                report.error(ValidationIssue::new(field, format!("must be a positive number, got {}", v)));
            }
        }
        for (field, v) in [("x", c.x), ("y", c.y), ("rotation", c.rotation)] {
            if !v.is_finite() {
                report.error(ValidationIssue::new(field, "must be finite"));
            }
        }
        if c.style.stroke_width < 0.0 {
            report.error(ValidationIssue::new("style.strokeWidth", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&c.style.opacity) {
            report.error(ValidationIssue::new("style.opacity", "must be within [0, 1]"));
        }
        if c.text_style.font_size <= 0.0 {
            report.error(ValidationIssue::new("textStyle.fontSize", "must be positive"));
        }

        let k = &c.constraints;
        for (field, v) in [
            ("constraints.minWidth", k.min_width),
            ("constraints.minHeight", k.min_height),
            ("constraints.maxWidth", k.max_width),
            ("constraints.maxHeight", k.max_height),
        ] {
            if v.is_nan() || v < 0.0 {
                report.error(ValidationIssue::new(field, "must be a non-negative number"));
            }
        }
        if k.min_width > k.max_width {
            report.error(ValidationIssue::new(
                "constraints.minWidth",
                format!("minWidth {} exceeds maxWidth {}", k.min_width, k.max_width),
            ));
        }
        if k.min_height > k.max_height {
            report.error(ValidationIssue::new(
                "constraints.minHeight",
                format!("minHeight {} exceeds maxHeight {}", k.min_height, k.max_height),
            ));
        }
        if let Some(r) = k.aspect_ratio {
            if !r.is_finite() || r <= 0.0 {
                report.error(ValidationIssue::new("constraints.aspectRatio", "must be positive or null"));
            }
        }
        if report.valid && !k.admits(c.width, c.height) {
            report.warning(ValidationIssue::new(
                "width",
                format!("default size {}x{} violates the constraints and will be adjusted", c.width, c.height),
            ));
        }
    }

    /// Cross-check level: mismatches are warnings only
    pub fn cross_check(&self, type_id: &str, config: &Value) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if let Some(id) = config.get("id").and_then(Value::as_str) {
            if !id.is_empty() && id != type_id {
                report.warning(ValidationIssue::new(
                    "id",
                    format!("declared type `{}` does not match configuration id `{}`", type_id, id),
                ));
            }
        }
        if let Some(ty) = config.get("type").and_then(Value::as_str) {
            if !ty.is_empty() && ty != type_id {
                report.warning(ValidationIssue::new(
                    "type",
                    format!("declared type `{}` does not match configuration type `{}`", type_id, ty),
                ));
            }
        }
        report
    }

    /// Structural level: probe the behavior against the type's default geometry
    pub fn validate_behavior(&self, type_id: &str, behavior: &BehaviorRef, config: &ShapeConfig) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if behavior.kind().is_empty() {
            report.error(ValidationIssue::new("behavior", "behavior reports an empty kind"));
        } else if behavior.kind() != type_id {
            report.warning(ValidationIssue::new(
                "behavior",
                format!("behavior kind `{}` registered as `{}`", behavior.kind(), type_id),
            ));
        }

        // The probe exercises the outline; declarations are checked elsewhere
        let mut probe_config = config.clone();
        probe_config.type_id = type_id.to_string();
        probe_config.ports = default_ports();
        probe_config.handles = default_handles();
        let probe = match Shape::from_config(&probe_config, BehaviorRef::clone(behavior)) {
            Ok(shape) => shape,
            Err(e) => {
                report.error(ValidationIssue::new("behavior", format!("cannot build a probe instance: {}", e)));
                return report;
            }
        };

        let path = behavior.path(&probe);
        match path.segments().first() {
            None => report.error(ValidationIssue::new("behavior", "path() returned an empty outline")),
            Some(Segment::MoveTo { .. }) => {}
            Some(_) => report.error(ValidationIssue::new("behavior", "path() must start with a move")),
        }
        if !path.is_finite() {
            report.error(ValidationIssue::new("behavior", "path() produced non-finite coordinates"));
        }
        if report.valid && path.is_closed() && !behavior.contains_point(&probe, probe.center()) {
            report.warning(ValidationIssue::new("behavior", "closed outline does not contain its own center"));
        }
        report
    }
}
