//! Error types with diagnostic codes using miette
//!
//! Validation problems are never raised through these types mid-pipeline;
//! they travel as [`ValidationReport`]s and only become an error when a caller
//! asks for something the report forbids (registering, instantiating).

use miette::Diagnostic;
use thiserror::Error;

use crate::validator::ValidationReport;

// ============================================================================
// Registry Errors
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("shape type not registered: {type_id}")]
    #[diagnostic(
        code(shapewright::registry::not_found),
        help("register the type or load it through the shape loader first")
    )]
    NotFound { type_id: String },

    #[error("shape type already registered: {type_id}")]
    #[diagnostic(
        code(shapewright::registry::already_registered),
        help("unregister the existing definition before registering a replacement")
    )]
    AlreadyRegistered { type_id: String },

    #[error("shape type {type_id} failed validation:\n{report}")]
    #[diagnostic(code(shapewright::registry::invalid))]
    Invalid { type_id: String, report: ValidationReport },

    #[error("cannot instantiate {type_id}")]
    #[diagnostic(code(shapewright::registry::instance))]
    Instance {
        type_id: String,
        #[source]
        #[diagnostic_source]
        source: ShapeError,
    },
}

// ============================================================================
// Shape Errors
// ============================================================================

/// Errors raised while building or restoring a shape instance
#[derive(Error, Diagnostic, Debug)]
pub enum ShapeError {
    #[error("cannot apply data for type `{found}` to a shape of type `{expected}`")]
    #[diagnostic(code(shapewright::shape::type_mismatch))]
    TypeMismatch { expected: String, found: String },

    #[error("malformed shape document")]
    #[diagnostic(code(shapewright::shape::json))]
    Json(#[from] serde_json::Error),

    #[error("invalid shape data:\n{0}")]
    #[diagnostic(code(shapewright::shape::invalid))]
    Invalid(ValidationReport),
}

// ============================================================================
// Load Errors
// ============================================================================

/// Failure reported by an injected [`ShapeSource`](crate::loader::ShapeSource)
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
#[diagnostic(code(shapewright::loader::fetch))]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Why a shape type could not be loaded
#[derive(Error, Diagnostic, Debug)]
pub enum LoadError {
    #[error("shape type {type_id} is already loading")]
    #[diagnostic(
        code(shapewright::loader::already_loading),
        help("duplicate requests are rejected, not merged; wait for the first load to finish")
    )]
    AlreadyLoading { type_id: String },

    #[error("shape type {type_id} previously failed to load")]
    #[diagnostic(
        code(shapewright::loader::previously_failed),
        help("failures are never retried automatically; call reload() to try again")
    )]
    PreviouslyFailed { type_id: String },

    #[error("could not fetch {what} for {type_id}")]
    #[diagnostic(code(shapewright::loader::fetch_failed))]
    Fetch {
        type_id: String,
        what: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("configuration for {type_id} is not valid JSON")]
    #[diagnostic(code(shapewright::loader::parse))]
    Parse {
        type_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("shape type {type_id} failed validation:\n{report}")]
    #[diagnostic(code(shapewright::loader::invalid))]
    Invalid { type_id: String, report: ValidationReport },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),
}

impl LoadError {
    /// The shape type this failure belongs to
    pub fn type_id(&self) -> &str {
        match self {
            LoadError::AlreadyLoading { type_id }
            | LoadError::PreviouslyFailed { type_id }
            | LoadError::Fetch { type_id, .. }
            | LoadError::Parse { type_id, .. }
            | LoadError::Invalid { type_id, .. } => type_id,
            LoadError::Registry(
                RegistryError::NotFound { type_id }
                | RegistryError::AlreadyRegistered { type_id }
                | RegistryError::Invalid { type_id, .. }
                | RegistryError::Instance { type_id, .. },
            ) => type_id,
        }
    }
}
