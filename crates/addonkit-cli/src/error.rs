//! CLI error types with exit code handling
//!
//! Any root-command execution failure exits with code 1; the chain of causes
//! is preserved for miette to render.

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Hook lookup, input/output or handler failure
    #[error(transparent)]
    #[diagnostic(code(addonkit::cli::hook))]
    Hook(#[from] addonkit_hooks::HooksError),

    /// Config serialization failed
    #[error("failed to serialize hook configs: {0}")]
    #[diagnostic(code(addonkit::cli::config))]
    Config(#[from] serde_json::Error),

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {0}")]
    #[diagnostic(code(addonkit::cli::io))]
    Io(#[from] std::io::Error),

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(addonkit::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        exit_codes::ERROR
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
