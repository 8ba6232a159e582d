//! Shape configuration: the serialized wire format and per-instance overrides.
//!
//! A [`ShapeConfig`] is both the declarative document a shape type is
//! registered with and the result of serializing a live instance. Overrides
//! are merged into a definition's defaults through explicit `merged`
//! functions, so a definition's values are always copied, never shared.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::defaults;
use crate::handles::HandleId;

/// Free-form key/value bag carried by every shape
pub type DataBag = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: defaults::FILL.to_string(),
            stroke: defaults::STROKE.to_string(),
            stroke_width: defaults::STROKE_WIDTH,
            opacity: defaults::OPACITY,
        }
    }
}

impl Style {
    pub fn merged(&self, o: &StyleOverrides) -> Style {
        Style {
            fill: o.fill.clone().unwrap_or_else(|| self.fill.clone()),
            stroke: o.stroke.clone().unwrap_or_else(|| self.stroke.clone()),
            stroke_width: o.stroke_width.unwrap_or(self.stroke_width),
            opacity: o.opacity.unwrap_or(self.opacity),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOverrides {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub color: String,
    pub align: String,
    pub vertical_align: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: defaults::FONT_FAMILY.to_string(),
            font_size: defaults::FONT_SIZE,
            font_weight: defaults::FONT_WEIGHT.to_string(),
            color: defaults::TEXT_COLOR.to_string(),
            align: "center".to_string(),
            vertical_align: "middle".to_string(),
        }
    }
}

/// Declared port: position in the unit square, role tag and exit direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortConfig {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default = "default_port_role")]
    pub role: String,
    #[serde(default = "default_port_direction")]
    pub direction: String,
}

fn default_port_role() -> String {
    "both".to_string()
}

fn default_port_direction() -> String {
    "any".to_string()
}

impl PortConfig {
    pub fn new(id: impl Into<String>, x: f64, y: f64, role: &str, direction: &str) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            role: role.to_string(),
            direction: direction.to_string(),
        }
    }
}

/// Ports on the midpoint of each side
pub fn default_ports() -> Vec<PortConfig> {
    vec![
        PortConfig::new("top", 0.5, 0.0, "both", "n"),
        PortConfig::new("right", 1.0, 0.5, "both", "e"),
        PortConfig::new("bottom", 0.5, 1.0, "both", "s"),
        PortConfig::new("left", 0.0, 0.5, "both", "w"),
    ]
}

pub fn default_handles() -> Vec<String> {
    HandleId::ALL.iter().map(|h| h.as_str().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    pub min_width: f64,
    pub min_height: f64,
    pub max_width: f64,
    pub max_height: f64,
    pub aspect_ratio: Option<f64>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_width: defaults::MIN_SIZE,
            min_height: defaults::MIN_SIZE,
            max_width: defaults::MAX_SIZE,
            max_height: defaults::MAX_SIZE,
            aspect_ratio: None,
        }
    }
}

impl Constraints {
    pub fn merged(&self, o: &ConstraintOverrides) -> Constraints {
        Constraints {
            min_width: o.min_width.unwrap_or(self.min_width),
            min_height: o.min_height.unwrap_or(self.min_height),
            max_width: o.max_width.unwrap_or(self.max_width),
            max_height: o.max_height.unwrap_or(self.max_height),
            aspect_ratio: o.aspect_ratio.unwrap_or(self.aspect_ratio),
        }
    }

    pub fn clamp_width(&self, w: f64) -> f64 {
        w.max(self.min_width).min(self.max_width)
    }

    pub fn clamp_height(&self, h: f64) -> f64 {
        h.max(self.min_height).min(self.max_height)
    }

    /// Usable ratio: set, finite and positive
    pub fn ratio(&self) -> Option<f64> {
        self.aspect_ratio.filter(|r| r.is_finite() && *r > 0.0)
    }

    /// Whether `(w, h)` satisfies every constraint
    pub fn admits(&self, w: f64, h: f64) -> bool {
        let in_range = (self.min_width..=self.max_width).contains(&w)
            && (self.min_height..=self.max_height).contains(&h);
        let ratio_ok = match self.ratio() {
            Some(r) => h > 0.0 && (w / h - r).abs() < defaults::ASPECT_TOLERANCE,
            None => true,
        };
        in_range && ratio_ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintOverrides {
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    /// `Some(None)` clears an inherited ratio; on the wire that is an explicit
    /// `"aspectRatio": null`, while an absent key inherits
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<Option<f64>>,
}

/// Tell a present `null` apart from an absent key (which `default` covers)
fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub resizable: bool,
    pub rotatable: bool,
    pub connectable: bool,
    pub groupable: bool,
    pub lockable: bool,
    pub clonable: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            resizable: true,
            rotatable: true,
            connectable: true,
            groupable: true,
            lockable: true,
            clonable: true,
        }
    }
}

impl Features {
    pub fn merged(&self, o: &FeatureOverrides) -> Features {
        Features {
            resizable: o.resizable.unwrap_or(self.resizable),
            rotatable: o.rotatable.unwrap_or(self.rotatable),
            connectable: o.connectable.unwrap_or(self.connectable),
            groupable: o.groupable.unwrap_or(self.groupable),
            lockable: o.lockable.unwrap_or(self.lockable),
            clonable: o.clonable.unwrap_or(self.clonable),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOverrides {
    pub resizable: Option<bool>,
    pub rotatable: Option<bool>,
    pub connectable: Option<bool>,
    pub groupable: Option<bool>,
    pub lockable: Option<bool>,
    pub clonable: Option<bool>,
}

/// Serialized shape, field-for-field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub type_id: String,
    pub name: String,
    pub category: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub style: Style,
    pub label: String,
    pub text_style: TextStyle,
    pub ports: Vec<PortConfig>,
    pub ports_enabled: bool,
    pub handles: Vec<String>,
    pub handles_enabled: bool,
    pub constraints: Constraints,
    pub features: Features,
    pub locked: bool,
    pub visible: bool,
    pub data: DataBag,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            type_id: String::new(),
            name: String::new(),
            category: "basic".to_string(),
            x: 0.0,
            y: 0.0,
            width: defaults::WIDTH,
            height: defaults::HEIGHT,
            rotation: 0.0,
            style: Style::default(),
            label: String::new(),
            text_style: TextStyle::default(),
            ports: default_ports(),
            ports_enabled: true,
            handles: default_handles(),
            handles_enabled: true,
            constraints: Constraints::default(),
            features: Features::default(),
            locked: false,
            visible: true,
            data: DataBag::new(),
        }
    }
}

impl ShapeConfig {
    /// Minimal definition document for a shape type
    pub fn for_type(type_id: &str, name: &str, category: &str) -> Self {
        Self {
            id: type_id.to_string(),
            type_id: type_id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Per-instance values layered over a definition's defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeOverrides {
    pub id: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub style: StyleOverrides,
    pub label: Option<String>,
    pub text_style: Option<TextStyle>,
    pub ports: Option<Vec<PortConfig>>,
    pub ports_enabled: Option<bool>,
    pub handles: Option<Vec<String>>,
    pub handles_enabled: Option<bool>,
    pub constraints: ConstraintOverrides,
    pub features: FeatureOverrides,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    /// Merged key by key into the definition's bag
    pub data: DataBag,
}

impl ShapeOverrides {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Layer `o` over `base`, producing an instance document.
///
/// `id` and `type` are left for the caller: the registry assigns both.
pub fn merge_config(base: &ShapeConfig, o: &ShapeOverrides) -> ShapeConfig {
    let mut data = base.data.clone();
    for (k, v) in &o.data {
        data.insert(k.clone(), v.clone());
    }
    ShapeConfig {
        id: base.id.clone(),
        type_id: base.type_id.clone(),
        name: base.name.clone(),
        category: base.category.clone(),
        x: o.x.unwrap_or(base.x),
        y: o.y.unwrap_or(base.y),
        width: o.width.unwrap_or(base.width),
        height: o.height.unwrap_or(base.height),
        rotation: o.rotation.unwrap_or(base.rotation),
        style: base.style.merged(&o.style),
        label: o.label.clone().unwrap_or_else(|| base.label.clone()),
        text_style: o.text_style.clone().unwrap_or_else(|| base.text_style.clone()),
        ports: o.ports.clone().unwrap_or_else(|| base.ports.clone()),
        ports_enabled: o.ports_enabled.unwrap_or(base.ports_enabled),
        handles: o.handles.clone().unwrap_or_else(|| base.handles.clone()),
        handles_enabled: o.handles_enabled.unwrap_or(base.handles_enabled),
        constraints: base.constraints.merged(&o.constraints),
        features: base.features.merged(&o.features),
        locked: o.locked.unwrap_or(base.locked),
        visible: o.visible.unwrap_or(base.visible),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_camel_case() {
        let cfg = ShapeConfig::for_type("rectangle", "Rectangle", "basic");
        let v = serde_json::to_value(&cfg).unwrap();
        assert_eq!(v["type"], "rectangle");
        assert!(v["style"].get("strokeWidth").is_some());
        assert!(v["constraints"]["aspectRatio"].is_null());
        assert_eq!(v["ports"][0]["type"], "both");
        assert_eq!(v["handles"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn merge_does_not_alias_definition_style() {
        let base = ShapeConfig::for_type("rectangle", "Rectangle", "basic");
        let mut o = ShapeOverrides::at(5.0, 6.0);
        o.style.fill = Some("#ff0000".to_string());
        o.data.insert("cornerRadius".to_string(), 4.into());

        let merged = merge_config(&base, &o);
        assert_eq!(merged.style.fill, "#ff0000");
        assert_eq!(merged.style.stroke, base.style.stroke);
        assert_eq!(base.style.fill, defaults::FILL);
        assert_eq!(merged.x, 5.0);
        assert_eq!(merged.data["cornerRadius"], 4);
        assert!(base.data.is_empty());
    }

    #[test]
    fn constraint_override_can_clear_ratio() {
        let base = Constraints {
            aspect_ratio: Some(2.0),
            ..Constraints::default()
        };
        let cleared = base.merged(&ConstraintOverrides {
            aspect_ratio: Some(None),
            ..ConstraintOverrides::default()
        });
        assert_eq!(cleared.aspect_ratio, None);
        assert_eq!(base.merged(&ConstraintOverrides::default()).aspect_ratio, Some(2.0));
    }

    #[test]
    fn json_null_ratio_override_clears() {
        let parse = |s: &str| serde_json::from_str::<ConstraintOverrides>(s).unwrap().aspect_ratio;
        assert_eq!(parse(r#"{"aspectRatio": null}"#), Some(None));
        assert_eq!(parse(r#"{"aspectRatio": 1.5}"#), Some(Some(1.5)));
        assert_eq!(parse(r#"{"minWidth": 20}"#), None);

        let o: ShapeOverrides = serde_json::from_str(r#"{"constraints": {"aspectRatio": null}}"#).unwrap();
        let base = Constraints {
            aspect_ratio: Some(2.0),
            ..Constraints::default()
        };
        assert_eq!(base.merged(&o.constraints).aspect_ratio, None);

        let cleared = ConstraintOverrides {
            aspect_ratio: Some(None),
            ..ConstraintOverrides::default()
        };
        let back: ConstraintOverrides = serde_json::from_value(serde_json::to_value(&cleared).unwrap()).unwrap();
        assert_eq!(back, cleared);
    }

    #[test]
    fn admits_checks_range_and_ratio() {
        let c = Constraints {
            aspect_ratio: Some(2.0),
            ..Constraints::default()
        };
        assert!(c.admits(200.0, 100.0));
        assert!(!c.admits(200.0, 150.0));
        assert!(!Constraints::default().admits(5.0, 50.0));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: ShapeConfig = serde_json::from_str(r#"{"id":"x","width":40}"#).unwrap();
        assert_eq!(cfg.width, 40.0);
        assert_eq!(cfg.height, defaults::HEIGHT);
        assert!(cfg.visible);
        assert_eq!(cfg.ports.len(), 4);
    }
}
