//! Registered shape templates.

use crate::config::{ShapeConfig, ShapeOverrides, merge_config};
use crate::errors::ShapeError;
use crate::shape::{BehaviorRef, Shape};

/// Immutable template for one shape type: default configuration plus the
/// behavior every instance delegates to.
#[derive(Debug, Clone)]
pub struct ShapeDefinition {
    type_id: String,
    config: ShapeConfig,
    behavior: BehaviorRef,
}

impl ShapeDefinition {
    /// `config.type_id` is forced to `type_id`
    pub fn new(type_id: impl Into<String>, behavior: BehaviorRef, mut config: ShapeConfig) -> Self {
        let type_id = type_id.into();
        config.type_id = type_id.clone();
        Self {
            type_id,
            config,
            behavior,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn category(&self) -> &str {
        &self.config.category
    }

    /// Defaults every instance starts from
    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    pub fn behavior(&self) -> &BehaviorRef {
        &self.behavior
    }

    /// Build an instance named `id` from the defaults layered with `overrides`.
    ///
    /// Sizes outside the constraints are clamped; with an aspect ratio the
    /// height is derived from the width.
    pub fn instantiate(&self, id: String, overrides: &ShapeOverrides) -> Result<Shape, ShapeError> {
        let mut config = merge_config(&self.config, overrides);
        config.id = id;
        config.type_id = self.type_id.clone();

        let mut shape = Shape::from_config(&config, BehaviorRef::clone(&self.behavior))?;
        if !config.constraints.admits(config.width, config.height) {
            shape.apply_size(config.width, config.height);
        }
        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{builtin, builtin_config};
    use std::sync::Arc;

    fn circle() -> ShapeDefinition {
        ShapeDefinition::new(
            "circle",
            Arc::new(builtin("circle").unwrap()),
            builtin_config("circle").unwrap(),
        )
    }

    #[test]
    fn overrides_do_not_alias_defaults() {
        let def = circle();
        let mut overrides = ShapeOverrides::at(5.0, 6.0);
        overrides.style.fill = Some("#ff0000".to_string());
        let shape = def.instantiate("c1".to_string(), &overrides).unwrap();
        assert_eq!(shape.style().fill, "#ff0000");
        assert_eq!(def.config().style.fill, crate::defaults::FILL);
        assert_eq!((shape.x(), shape.y()), (5.0, 6.0));
    }

    #[test]
    fn instantiate_normalizes_size() {
        let def = circle();
        let shape = def
            .instantiate("c2".to_string(), &ShapeOverrides::default().with_size(60.0, 20.0))
            .unwrap();
        assert_eq!((shape.width(), shape.height()), (60.0, 60.0));
    }

    #[test]
    fn locked_override_still_normalizes() {
        let def = circle();
        let mut overrides = ShapeOverrides::default().with_size(50_000.0, 3.0);
        overrides.locked = Some(true);
        let shape = def.instantiate("c3".to_string(), &overrides).unwrap();
        assert!(shape.is_locked());
        assert_eq!((shape.width(), shape.height()), (10_000.0, 10_000.0));
    }
}
