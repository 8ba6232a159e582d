//! Asynchronous shape type loading.
//!
//! Each type id moves through `Unregistered -> Loading -> Loaded | Failed`.
//! A duplicate request for a type that is still loading is rejected with a
//! warning instead of being merged with the in-flight one, and a failure is
//! remembered until [`ShapeLoader::reload`] is called.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future;
use serde_json::Value;

use crate::config::ShapeConfig;
use crate::errors::{FetchError, LoadError};
use crate::log::{Logger, TracingLogger};
use crate::registry::Registry;
use crate::shape::{BehaviorRef, builtin, builtin_config};
use crate::validator::{ShapeValidator, ValidationReport};

const COMPONENT: &str = "ShapeLoader";

/// Where behavior modules and configuration documents come from.
///
/// Implemented by the host (network, bundle, plugin directory...).
pub trait ShapeSource {
    fn fetch_behavior(&self, type_id: &str) -> impl Future<Output = Result<BehaviorRef, FetchError>>;

    /// Raw JSON text of the type's configuration document
    fn fetch_config(&self, type_id: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Serves the built-in kinds
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSource;

impl ShapeSource for BuiltinSource {
    fn fetch_behavior(&self, type_id: &str) -> impl Future<Output = Result<BehaviorRef, FetchError>> {
        let result = match builtin(type_id) {
            Some(behavior) => Ok(Arc::new(behavior) as BehaviorRef),
            None => Err(FetchError::new(format!("no built-in shape named `{}`", type_id))),
        };
        future::ready(result)
    }

    fn fetch_config(&self, type_id: &str) -> impl Future<Output = Result<String, FetchError>> {
        let result = match builtin_config(type_id) {
            Some(config) => config.to_json().map_err(|e| FetchError::new(e.to_string())),
            None => Err(FetchError::new(format!("no built-in shape named `{}`", type_id))),
        };
        future::ready(result)
    }
}

/// Per-type loading state
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Unregistered,
    Loading,
    Loaded,
    Failed(Arc<LoadError>),
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Stop a batch at the first failure and return it
    pub fail_fast: bool,
}

/// Outcome of a batch load
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub loaded: Vec<String>,
    /// Duplicate requests turned away while the type was in flight
    pub rejected: Vec<String>,
    pub failed: Vec<(String, Arc<LoadError>)>,
}

impl LoadSummary {
    /// Every requested type ended up loaded
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }
}

/// Drives loading for one registry
pub struct ShapeLoader<S> {
    source: S,
    registry: Arc<Registry>,
    validator: ShapeValidator,
    states: Mutex<HashMap<String, LoadState>>,
    options: LoaderOptions,
    logger: Arc<dyn Logger>,
}

impl<S: ShapeSource> ShapeLoader<S> {
    pub fn new(source: S, registry: Arc<Registry>) -> Self {
        Self::with_options(source, registry, LoaderOptions::default())
    }

    pub fn with_options(source: S, registry: Arc<Registry>, options: LoaderOptions) -> Self {
        Self {
            source,
            registry,
            validator: ShapeValidator::new(),
            states: Mutex::new(HashMap::new()),
            options,
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    fn states(&self) -> MutexGuard<'_, HashMap<String, LoadState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load one type; `true` once it is usable from the registry
    pub async fn load(&self, type_id: &str) -> bool {
        self.try_load(type_id).await.is_ok()
    }

    /// Load one type, reporting why it is not usable
    pub async fn try_load(&self, type_id: &str) -> Result<(), Arc<LoadError>> {
        {
            let mut states = self.states();
            match states.get(type_id) {
                Some(LoadState::Loading) => {
                    self.logger
                        .warn(COMPONENT, &format!("{} is already loading; request ignored", type_id));
                    return Err(Arc::new(LoadError::AlreadyLoading {
                        type_id: type_id.to_string(),
                    }));
                }
                Some(LoadState::Loaded) if self.registry.contains(type_id) => return Ok(()),
                Some(LoadState::Failed(_)) => {
                    return Err(Arc::new(LoadError::PreviouslyFailed {
                        type_id: type_id.to_string(),
                    }));
                }
                // Loaded, but unregistered directly on the registry since
                Some(LoadState::Loaded) | Some(LoadState::Unregistered) | None => {}
            }
            if self.registry.contains(type_id) {
                states.insert(type_id.to_string(), LoadState::Loaded);
                return Ok(());
            }
            states.insert(type_id.to_string(), LoadState::Loading);
        }

        self.logger.debug(COMPONENT, &format!("loading {}", type_id));
        let (behavior, config, report) = match self.fetch(type_id).await {
            Ok(fetched) => fetched,
            Err(e) => return Err(self.fail(type_id, e)),
        };

        // Registration and the state change happen under one lock
        let mut states = self.states();
        match self.registry.insert_validated(type_id, behavior, config, report) {
            Ok(_) => {
                states.insert(type_id.to_string(), LoadState::Loaded);
                drop(states);
                self.logger.debug(COMPONENT, &format!("loaded {}", type_id));
                Ok(())
            }
            Err(e) => {
                drop(states);
                Err(self.fail(type_id, e.into()))
            }
        }
    }

    async fn fetch(&self, type_id: &str) -> Result<(BehaviorRef, ShapeConfig, ValidationReport), LoadError> {
        let (behavior, text) =
            future::join(self.source.fetch_behavior(type_id), self.source.fetch_config(type_id)).await;
        let behavior = behavior.map_err(|source| LoadError::Fetch {
            type_id: type_id.to_string(),
            what: "behavior",
            source,
        })?;
        let text = text.map_err(|source| LoadError::Fetch {
            type_id: type_id.to_string(),
            what: "configuration",
            source,
        })?;

        let document: Value = serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            type_id: type_id.to_string(),
            source,
        })?;
        // Validate the raw document so missing fields are not masked by defaults
        let report = self.validator.validate(type_id, &behavior, &document);
        if !report.valid {
            return Err(LoadError::Invalid {
                type_id: type_id.to_string(),
                report,
            });
        }
        let config = serde_json::from_value(document).map_err(|source| LoadError::Parse {
            type_id: type_id.to_string(),
            source,
        })?;
        Ok((behavior, config, report))
    }

    fn fail(&self, type_id: &str, error: LoadError) -> Arc<LoadError> {
        let error = Arc::new(error);
        self.logger
            .warn(COMPONENT, &format!("failed to load {}: {}", type_id, error));
        self.states()
            .insert(type_id.to_string(), LoadState::Failed(Arc::clone(&error)));
        error
    }

    /// Load several types.
    ///
    /// Without `fail_fast` every type is attempted concurrently and the summary
    /// lists each outcome. With it, types load in order and the first failure
    /// is returned.
    pub async fn load_all<I, T>(&self, type_ids: I) -> Result<LoadSummary, Arc<LoadError>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let ids: Vec<String> = type_ids.into_iter().map(|t| t.as_ref().to_string()).collect();
        let mut summary = LoadSummary::default();

        if self.options.fail_fast {
            for id in ids {
                match self.try_load(&id).await {
                    Ok(()) => summary.loaded.push(id),
                    Err(e) if matches!(*e, LoadError::AlreadyLoading { .. }) => summary.rejected.push(id),
                    Err(e) => return Err(e),
                }
            }
            return Ok(summary);
        }

        let results = future::join_all(ids.iter().map(|id| self.try_load(id))).await;
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => summary.loaded.push(id),
                Err(e) if matches!(*e, LoadError::AlreadyLoading { .. }) => summary.rejected.push(id),
                Err(e) => summary.failed.push((id, e)),
            }
        }
        Ok(summary)
    }

    /// Forget the type entirely: registry entry and remembered state
    pub fn unregister(&self, type_id: &str) -> bool {
        let mut states = self.states();
        let was_known = states.remove(type_id).is_some();
        let was_registered = self.registry.unregister(type_id).is_some();
        was_known || was_registered
    }

    /// Unregister, forget any failure, and load again
    pub async fn reload(&self, type_id: &str) -> bool {
        if self.state(type_id).is_loading() {
            self.logger
                .warn(COMPONENT, &format!("{} is loading; reload ignored", type_id));
            return false;
        }
        self.unregister(type_id);
        self.load(type_id).await
    }

    /// Current state; a type unregistered directly on the registry reads as `Unregistered`
    pub fn state(&self, type_id: &str) -> LoadState {
        match self.states().get(type_id) {
            Some(LoadState::Loaded) if !self.registry.contains(type_id) => LoadState::Unregistered,
            Some(state) => state.clone(),
            None => LoadState::Unregistered,
        }
    }

    /// Cause of a remembered failure
    pub fn failure(&self, type_id: &str) -> Option<Arc<LoadError>> {
        match self.states().get(type_id) {
            Some(LoadState::Failed(e)) => Some(Arc::clone(e)),
            _ => None,
        }
    }

    /// Types this loader has brought to `Loaded`, sorted
    pub fn loaded_types(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .states()
            .iter()
            .filter(|(id, s)| s.is_loaded() && self.registry.contains(id))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeOverrides;
    use futures::executor::block_on;

    fn loader() -> ShapeLoader<BuiltinSource> {
        ShapeLoader::new(BuiltinSource, Arc::new(Registry::new()))
    }

    #[test]
    fn loads_builtin_into_registry() {
        let loader = loader();
        assert!(block_on(loader.load("star")));
        assert!(loader.state("star").is_loaded());
        assert!(loader.registry().contains("star"));
        assert_eq!(loader.loaded_types(), vec!["star".to_string()]);
    }

    #[test]
    fn unknown_type_fails_and_is_remembered() {
        let loader = loader();
        assert!(!block_on(loader.load("hexagram")));
        let cause = loader.failure("hexagram").unwrap();
        assert!(matches!(*cause, LoadError::Fetch { what: "behavior", .. }));

        let err = block_on(loader.try_load("hexagram")).unwrap_err();
        assert!(matches!(*err, LoadError::PreviouslyFailed { .. }));
    }

    #[test]
    fn already_registered_types_count_as_loaded() {
        let registry = Arc::new(Registry::with_builtins());
        let loader = ShapeLoader::new(BuiltinSource, registry);
        assert!(block_on(loader.load("circle")));
        assert!(loader.state("circle").is_loaded());
    }

    #[test]
    fn unregister_resets_state() {
        let loader = loader();
        assert!(block_on(loader.load("cloud")));
        assert!(loader.unregister("cloud"));
        assert!(matches!(loader.state("cloud"), LoadState::Unregistered));
        assert!(!loader.registry().contains("cloud"));
        assert!(!loader.unregister("cloud"));
    }

    #[test]
    fn unregistering_on_the_registry_is_noticed() {
        let loader = loader();
        assert!(block_on(loader.load("circle")));
        assert!(loader.registry().unregister("circle").is_some());
        assert!(matches!(loader.state("circle"), LoadState::Unregistered));
        assert!(loader.loaded_types().is_empty());

        assert!(block_on(loader.load("circle")));
        assert!(loader.state("circle").is_loaded());
        assert!(loader.registry().create("circle", &ShapeOverrides::default()).is_ok());
    }
}
