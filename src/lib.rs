//! Diagram shape engine.
//!
//! Turns declarative shape configurations into behavior-bearing instances:
//! outlines, hit testing, constrained resizing, ports and connector routing,
//! plus the registry, loader and validator that make shape types pluggable.
//!
//! ```
//! use shapewright::{Registry, ShapeOverrides};
//!
//! let registry = Registry::with_builtins();
//! let shape = registry
//!     .create("diamond", &ShapeOverrides::at(0.0, 0.0).with_size(100.0, 60.0))
//!     .unwrap();
//! assert!(shape.contains_point(glam::dvec2(50.0, 30.0)));
//! ```

pub mod log;

pub mod config;
pub mod defaults;
pub mod definition;
pub mod errors;
pub mod geometry;
pub mod handles;
pub mod loader;
pub mod ports;
pub mod registry;
pub mod shape;
pub mod types;
pub mod validator;

pub use config::{Constraints, Features, PortConfig, ShapeConfig, ShapeOverrides, Style, TextStyle};
pub use definition::ShapeDefinition;
pub use errors::{FetchError, LoadError, RegistryError, ShapeError};
pub use geometry::{PathData, Segment};
pub use handles::{HandleId, ResizeOptions};
pub use loader::{BuiltinSource, LoadState, LoadSummary, LoaderOptions, ShapeLoader, ShapeSource};
pub use log::{Level, LogEntry, Logger, NullLogger, RecordingLogger, TracingLogger};
pub use ports::{ConnectionStyle, Port, PortDirection, PortPosition, PortRole};
pub use registry::Registry;
pub use shape::{BehaviorRef, Drawable, RenderContext, Shape, ShapeBehavior};
pub use types::{Bounds, Point, Rect};
pub use validator::{ShapeValidator, ValidationIssue, ValidationReport};
