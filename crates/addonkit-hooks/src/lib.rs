//! Addonkit Hooks - registration and execution of addon-operator hooks
//!
//! This crate provides:
//! - **Hook descriptors**: explicit metadata + config + handler values
//! - **Registry**: an explicit collection consumed by the entry point,
//!   validating configs at registration time
//! - **File transport**: the env-configured file protocol spoken with the
//!   orchestrator
//! - **Executor**: adapts decoded binding contexts into one typed
//!   [`HookInput`] call and serializes the accumulated output

pub mod error;
pub mod executor;
pub mod hook;
pub mod registry;
pub mod transport;

pub use error::{HooksError, Result};
pub use executor::execute_hook;
pub use hook::{BoxError, HandlerResult, Hook, HookInput, HookMetadata, ReconcileHandler};
pub use registry::Registry;
pub use transport::{FileTransport, TransportConfig};
