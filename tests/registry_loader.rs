//! Registry and loader behavior through the public API.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use futures::executor::block_on;
use shapewright::shape::{BuiltinShape, builtin, builtin_config};
use shapewright::{
    BehaviorRef, BuiltinSource, FetchError, LoadError, LoaderOptions, PathData, RecordingLogger, Registry, RegistryError,
    Shape, ShapeBehavior, ShapeLoader, ShapeOverrides, ShapeSource,
};

/// Future that returns `Pending` once before completing
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// In-memory source whose fetches suspend once
#[derive(Default)]
struct MemorySource {
    behaviors: HashMap<String, BehaviorRef>,
    configs: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemorySource {
    fn with_builtin(mut self, ty: &str) -> Self {
        let config = builtin_config(ty).unwrap().to_json().unwrap();
        self.behaviors.insert(ty.to_string(), Arc::new(builtin(ty).unwrap()));
        self.configs.insert(ty.to_string(), config);
        self
    }

    fn with_raw(mut self, ty: &str, behavior_of: &str, config: &str) -> Self {
        self.behaviors
            .insert(ty.to_string(), Arc::new(builtin(behavior_of).unwrap()));
        self.configs.insert(ty.to_string(), config.to_string());
        self
    }
}

impl ShapeSource for MemorySource {
    fn fetch_behavior(&self, type_id: &str) -> impl Future<Output = Result<BehaviorRef, FetchError>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = self
            .behaviors
            .get(type_id)
            .cloned()
            .ok_or_else(|| FetchError::new(format!("no module for {}", type_id)));
        async move {
            YieldOnce(false).await;
            result
        }
    }

    fn fetch_config(&self, type_id: &str) -> impl Future<Output = Result<String, FetchError>> {
        let result = self
            .configs
            .get(type_id)
            .cloned()
            .ok_or_else(|| FetchError::new(format!("no configuration for {}", type_id)));
        async move {
            YieldOnce(false).await;
            result
        }
    }
}

fn loader(source: MemorySource) -> (ShapeLoader<MemorySource>, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::new());
    let registry = Arc::new(Registry::with_logger(logger.clone()));
    let loader = ShapeLoader::new(source, registry).with_logger(logger.clone());
    (loader, logger)
}

#[test]
fn create_unregistered_type_is_not_found() {
    let registry = Registry::new();
    match registry.create("rectangle", &ShapeOverrides::default()) {
        Err(RegistryError::NotFound { type_id }) => assert_eq!(type_id, "rectangle"),
        other => panic!("expected NotFound, got {:?}", other.map(|s| s.id().to_string())),
    }
}

#[test]
fn duplicate_in_flight_load_is_rejected() {
    let (loader, logger) = loader(MemorySource::default().with_builtin("rectangle"));
    let (first, second) = block_on(futures::future::join(loader.load("rectangle"), loader.load("rectangle")));
    assert!(first);
    assert!(!second);
    assert!(loader.state("rectangle").is_loaded());
    assert!(
        logger
            .warnings()
            .iter()
            .any(|e| e.component == "ShapeLoader" && e.message.contains("already loading"))
    );
    assert_eq!(loader.registry().len(), 1);
}

#[test]
fn loaded_is_only_visible_after_registration() {
    let (loader, _) = loader(MemorySource::default().with_builtin("ellipse"));
    let mut load = Box::pin(loader.load("ellipse"));
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);

    assert!(load.as_mut().poll(&mut cx).is_pending());
    assert!(loader.state("ellipse").is_loading());
    assert!(!loader.registry().contains("ellipse"));

    let done = loop {
        if let Poll::Ready(v) = load.as_mut().poll(&mut cx) {
            break v;
        }
    };
    assert!(done);
    assert!(loader.state("ellipse").is_loaded());
    assert!(loader.registry().contains("ellipse"));
}

#[test]
fn failures_are_remembered_until_reload() {
    let (loader, _) = loader(MemorySource::default().with_builtin("star"));
    assert!(!block_on(loader.load("cloud")));
    let cause = loader.failure("cloud").unwrap();
    assert!(matches!(*cause, LoadError::Fetch { .. }));
    assert_eq!(cause.type_id(), "cloud");

    let fetches = loader_fetches(&loader);
    assert!(!block_on(loader.load("cloud")));
    assert_eq!(loader_fetches(&loader), fetches, "failed types are not retried");

    assert!(!block_on(loader.reload("cloud")));
    assert_eq!(loader_fetches(&loader), fetches + 1, "reload fetches again");
}

fn loader_fetches(loader: &ShapeLoader<MemorySource>) -> usize {
    loader.source().fetches.load(Ordering::SeqCst)
}

#[test]
fn invalid_document_fails_validation_but_siblings_load() {
    let missing_name = r#"{ "id": "note", "type": "note", "width": 100, "height": 100 }"#;
    let source = MemorySource::default()
        .with_builtin("diamond")
        .with_raw("note", "document", missing_name)
        .with_raw("broken", "rectangle", "{ not json");
    let (loader, _) = loader(source);

    let summary = block_on(loader.load_all(["diamond", "note", "broken", "diamond"])).unwrap();
    assert_eq!(summary.loaded, vec!["diamond".to_string()]);
    assert_eq!(summary.rejected, vec!["diamond".to_string()]);
    assert_eq!(summary.failed.len(), 2);
    assert!(!summary.is_complete());

    let (_, note) = summary.failed.iter().find(|(id, _)| id == "note").unwrap();
    match &**note {
        LoadError::Invalid { report, .. } => {
            assert_eq!(report.errors.len(), 1);
            assert_eq!(report.errors[0].field, "name");
        }
        other => panic!("expected Invalid, got {other}"),
    }
    assert!(matches!(*loader.failure("broken").unwrap(), LoadError::Parse { .. }));
    assert!(loader.registry().contains("diamond"));
}

#[test]
fn fail_fast_stops_at_first_failure() {
    let source = MemorySource::default().with_builtin("circle").with_builtin("triangle");
    let registry = Arc::new(Registry::new());
    let loader = ShapeLoader::with_options(source, registry, LoaderOptions { fail_fast: true });

    let err = block_on(loader.load_all(["circle", "missing", "triangle"])).unwrap_err();
    assert_eq!(err.type_id(), "missing");
    assert!(loader.state("circle").is_loaded());
    assert!(matches!(loader.state("triangle"), shapewright::LoadState::Unregistered));
}

#[test]
fn mismatched_id_loads_with_a_warning() {
    let mut config = builtin_config("parallelogram").unwrap();
    config.id = "slanted".to_string();
    let source = MemorySource::default().with_raw("parallelogram", "parallelogram", &config.to_json().unwrap());
    let (loader, logger) = loader(source);

    assert!(block_on(loader.load("parallelogram")));
    assert!(
        logger
            .warnings()
            .iter()
            .any(|e| e.component == "Registry" && e.message.contains("slanted"))
    );
}

/// Built-in behavior that counts outline requests
#[derive(Debug)]
struct CountingOutline {
    inner: BuiltinShape,
    paths: Arc<AtomicUsize>,
}

impl ShapeBehavior for CountingOutline {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn path(&self, shape: &Shape) -> PathData {
        self.paths.fetch_add(1, Ordering::SeqCst);
        self.inner.path(shape)
    }
}

#[test]
fn loaded_documents_are_validated_once() {
    let paths = Arc::new(AtomicUsize::new(0));
    let behavior: BehaviorRef = Arc::new(CountingOutline {
        inner: builtin("rectangle").unwrap(),
        paths: paths.clone(),
    });
    let mut source = MemorySource::default().with_builtin("rectangle");
    source.behaviors.insert("rectangle".to_string(), behavior);
    let (loader, _) = loader(source);

    assert!(block_on(loader.load("rectangle")));
    assert_eq!(paths.load(Ordering::SeqCst), 1, "one structural check per load");
}

#[test]
fn instances_outlive_their_type() {
    let (loader, _) = loader(MemorySource::default().with_builtin("trapezoid"));
    assert!(block_on(loader.load("trapezoid")));
    let shape = loader
        .registry()
        .create("trapezoid", &ShapeOverrides::at(10.0, 10.0))
        .unwrap();

    assert!(loader.unregister("trapezoid"));
    assert!(matches!(
        loader.registry().create("trapezoid", &ShapeOverrides::default()),
        Err(RegistryError::NotFound { .. })
    ));
    assert!(!shape.path().is_empty());
    assert!(shape.validate().valid);
}

/// Debug output with `RUST_LOG=shapewright=debug cargo test --features tracing -- --nocapture`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn builtin_source_loads_the_whole_library() {
    init_tracing();
    let loader = ShapeLoader::new(BuiltinSource, Arc::new(Registry::new()));
    let summary = block_on(loader.load_all(shapewright::shape::BUILTIN_TYPES)).unwrap();
    assert!(summary.is_complete(), "{:?}", summary.failed);
    assert_eq!(loader.loaded_types().len(), shapewright::shape::BUILTIN_TYPES.len());

    let cloud = loader
        .registry()
        .create("cloud", &ShapeOverrides::at(0.0, 0.0))
        .unwrap();
    assert!(cloud.path().is_closed());
}
