//! Error types for addonkit-hooks

use std::path::PathBuf;
use thiserror::Error;

/// Result type for addonkit-hooks operations
pub type Result<T> = std::result::Result<T, HooksError>;

/// Errors crossing the hook-execution boundary
///
/// Everything here is fail-closed: a variant of this enum aborts the current
/// hook run and is reported to the caller with its cause chain intact.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HooksError {
    #[error(transparent)]
    Core(#[from] addonkit_core::CoreError),

    #[error(transparent)]
    Kube(#[from] addonkit_kube::KubeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no hook at index {index} ({registered} registered)")]
    HookNotFound { index: usize, registered: usize },

    #[error("hook '{name}' already registered")]
    DuplicateHook { name: String },

    #[error("hook '{name}' has an invalid config: {source}")]
    InvalidHook {
        name: String,
        #[source]
        source: addonkit_core::CoreError,
    },

    #[error("hook '{hook}' failed")]
    HookFailed {
        hook: String,
        #[source]
        source: crate::hook::BoxError,
    },

    #[error("failed to read {what} from {path:?}")]
    Input {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to write {what} to {path:?}")]
    Output {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
