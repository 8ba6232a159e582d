//! Shape type registry: typeId to definition map and instance factory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{ShapeConfig, ShapeOverrides};
use crate::definition::ShapeDefinition;
use crate::errors::RegistryError;
use crate::log::{Logger, TracingLogger};
use crate::shape::{BUILTIN_TYPES, BehaviorRef, Shape, builtin, builtin_config};
use crate::validator::{ShapeValidator, ValidationReport};

const COMPONENT: &str = "Registry";

/// Map of registered shape types.
///
/// Register and unregister are each a single atomic step; instances created
/// earlier keep working after their type is removed.
pub struct Registry {
    definitions: RwLock<HashMap<String, Arc<ShapeDefinition>>>,
    validator: ShapeValidator,
    logger: Arc<dyn Logger>,
    next_id: AtomicU64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("types", &self.type_ids()).finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_logger(Arc::new(TracingLogger))
    }

    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
            validator: ShapeValidator::new(),
            logger,
            next_id: AtomicU64::new(1),
        }
    }

    /// Registry preloaded with every built-in kind
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register every built-in kind not already present; returns how many were added
    pub fn register_builtins(&self) -> usize {
        let mut added = 0;
        for ty in BUILTIN_TYPES {
            let (Some(behavior), Some(config)) = (builtin(ty), builtin_config(ty)) else {
                continue;
            };
            match self.register(ty, Arc::new(behavior), config) {
                Ok(_) => added += 1,
                Err(RegistryError::AlreadyRegistered { .. }) => {}
                Err(e) => self.logger.warn(COMPONENT, &format!("built-in {} rejected: {}", ty, e)),
            }
        }
        added
    }

    /// Validate and store a definition.
    ///
    /// Returns the validation report (which may carry warnings) on success.
    pub fn register(
        &self,
        type_id: &str,
        behavior: BehaviorRef,
        config: ShapeConfig,
    ) -> Result<ValidationReport, RegistryError> {
        let report = match serde_json::to_value(&config) {
            Ok(document) => self.validator.validate(type_id, &behavior, &document),
            Err(_) => self.validator.validate_shape_config(&config),
        };
        self.insert_validated(type_id, behavior, config, report)
    }

    /// Store a definition whose document was already run through the validator
    pub(crate) fn insert_validated(
        &self,
        type_id: &str,
        behavior: BehaviorRef,
        config: ShapeConfig,
        report: ValidationReport,
    ) -> Result<ValidationReport, RegistryError> {
        for w in &report.warnings {
            self.logger.warn(COMPONENT, &format!("{}: {}", type_id, w));
        }
        if !report.valid {
            return Err(RegistryError::Invalid {
                type_id: type_id.to_string(),
                report,
            });
        }

        let mut definitions = self.definitions.write().unwrap_or_else(PoisonError::into_inner);
        if definitions.contains_key(type_id) {
            return Err(RegistryError::AlreadyRegistered {
                type_id: type_id.to_string(),
            });
        }
        definitions.insert(type_id.to_string(), Arc::new(ShapeDefinition::new(type_id, behavior, config)));
        self.logger.debug(COMPONENT, &format!("registered {}", type_id));
        Ok(report)
    }

    /// Remove a definition; returns it if it was present
    pub fn unregister(&self, type_id: &str) -> Option<Arc<ShapeDefinition>> {
        let removed = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(type_id);
        if removed.is_some() {
            self.logger.debug(COMPONENT, &format!("unregistered {}", type_id));
        }
        removed
    }

    /// Instantiate `type_id` with `overrides` layered over its defaults.
    ///
    /// The instance id is `overrides.id` or a generated `"{type_id}-{n}"`.
    pub fn create(&self, type_id: &str, overrides: &ShapeOverrides) -> Result<Shape, RegistryError> {
        let definition = self.get(type_id).ok_or_else(|| RegistryError::NotFound {
            type_id: type_id.to_string(),
        })?;
        let id = match &overrides.id {
            Some(id) => id.clone(),
            None => format!("{}-{}", type_id, self.next_id.fetch_add(1, Ordering::Relaxed)),
        };
        definition
            .instantiate(id, overrides)
            .map_err(|source| RegistryError::Instance {
                type_id: type_id.to_string(),
                source,
            })
    }

    pub fn get(&self, type_id: &str) -> Option<Arc<ShapeDefinition>> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_id)
            .cloned()
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(type_id)
    }

    /// Registered type ids, sorted
    pub fn type_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Registered definitions in one category, sorted by type id
    pub fn by_category(&self, category: &str) -> Vec<Arc<ShapeDefinition>> {
        let mut defs: Vec<Arc<ShapeDefinition>> = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|d| d.category() == category)
            .cloned()
            .collect();
        defs.sort_by(|a, b| a.type_id().cmp(b.type_id()));
        defs
    }

    pub fn len(&self) -> usize {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::RecordingLogger;

    #[test]
    fn create_unknown_type_is_not_found() {
        let registry = Registry::new();
        let err = registry.create("hexagram", &ShapeOverrides::default()).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { ref type_id } if type_id == "hexagram"));
    }

    #[test]
    fn builtins_all_register() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.len(), BUILTIN_TYPES.len());
        assert_eq!(registry.register_builtins(), 0);
    }

    #[test]
    fn duplicate_register_is_rejected() {
        let registry = Registry::with_builtins();
        let err = registry
            .register(
                "circle",
                Arc::new(builtin("circle").unwrap()),
                builtin_config("circle").unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
    }

    #[test]
    fn generated_ids_are_unique() {
        let registry = Registry::with_builtins();
        let a = registry.create("rectangle", &ShapeOverrides::default()).unwrap();
        let b = registry.create("rectangle", &ShapeOverrides::default()).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("rectangle-"));
        let named = registry
            .create("rectangle", &ShapeOverrides::default().with_id("r-main"))
            .unwrap();
        assert_eq!(named.id(), "r-main");
    }

    #[test]
    fn unregister_leaves_instances_alive() {
        let registry = Registry::with_builtins();
        let shape = registry.create("diamond", &ShapeOverrides::at(1.0, 2.0)).unwrap();
        assert!(registry.unregister("diamond").is_some());
        assert!(!registry.contains("diamond"));
        assert!(!shape.path().is_empty());
        assert!(registry.unregister("diamond").is_none());
    }

    #[test]
    fn mismatched_id_registers_with_warning() {
        let logger = Arc::new(RecordingLogger::new());
        let registry = Registry::with_logger(logger.clone());
        let mut config = builtin_config("ellipse").unwrap();
        config.id = "oval".to_string();
        let report = registry
            .register("ellipse", Arc::new(builtin("ellipse").unwrap()), config)
            .unwrap();
        assert!(report.valid);
        assert!(!report.warnings.is_empty());
        assert!(!logger.warnings().is_empty());
    }

    #[test]
    fn invalid_config_is_refused() {
        let registry = Registry::new();
        let mut config = builtin_config("rectangle").unwrap();
        config.constraints.min_width = 500.0;
        config.constraints.max_width = 50.0;
        let err = registry
            .register("rectangle", Arc::new(builtin("rectangle").unwrap()), config)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Invalid { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn huge_star_point_count_is_refused() {
        let registry = Registry::new();
        let config = builtin_config("star").unwrap().with_data("points", 3_000_000_000u64);
        let err = registry
            .register("star", Arc::new(builtin("star").unwrap()), config)
            .unwrap_err();
        match err {
            RegistryError::Invalid { report, .. } => assert!(report.has_error_for("data.points")),
            other => panic!("expected Invalid, got {other}"),
        }
        assert!(!registry.contains("star"));
    }
}
