//! Hook descriptors and the typed invocation input
//!
//! A hook is a value: declared metadata, a validated config, and a handler.
//! No registration happens as a side effect of construction; the entry point
//! adds descriptors to a [`Registry`](crate::registry::Registry) explicitly.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use addonkit_core::{
    BindingContext, HookConfig, MetricsCollector, PatchCollector, PatchableValues, Snapshots,
};
use addonkit_kube::DependencyContainer;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = std::result::Result<(), BoxError>;

/// Explicit identity of a hook: its name and source path
///
/// Supplied by the registering code; nothing is inferred from the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookMetadata {
    pub name: String,
    pub path: String,
}

impl HookMetadata {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The reconciliation logic of a hook
#[async_trait]
pub trait ReconcileHandler: Send + Sync {
    async fn reconcile(&self, input: &mut HookInput) -> HandlerResult;
}

/// Adapter running a plain function as a handler
struct FnHandler<F>(F);

#[async_trait]
impl<F> ReconcileHandler for FnHandler<F>
where
    F: Fn(&mut HookInput) -> HandlerResult + Send + Sync,
{
    async fn reconcile(&self, input: &mut HookInput) -> HandlerResult {
        (self.0)(input)
    }
}

/// One registered hook: metadata, trigger config and handler
pub struct Hook {
    pub metadata: HookMetadata,
    pub config: HookConfig,
    handler: Arc<dyn ReconcileHandler>,
}

impl Hook {
    pub fn new(
        metadata: HookMetadata,
        config: HookConfig,
        handler: impl ReconcileHandler + 'static,
    ) -> Self {
        Self {
            metadata,
            config,
            handler: Arc::new(handler),
        }
    }

    /// Build a hook from a plain function
    pub fn from_fn<F>(metadata: HookMetadata, config: HookConfig, f: F) -> Self
    where
        F: Fn(&mut HookInput) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(metadata, config, FnHandler(f))
    }

    /// Invoke the handler
    pub async fn run(&self, input: &mut HookInput) -> HandlerResult {
        self.handler.reconcile(input).await
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("metadata", &self.metadata)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Everything a hook invocation sees and produces
///
/// Read-only inputs (`binding_contexts`, `snapshots`, the values snapshots
/// inside the two [`PatchableValues`]) and write-only collectors. One
/// instance per invocation; not safe for concurrent use, and never reused
/// across runs.
pub struct HookInput {
    pub binding_contexts: Vec<BindingContext>,
    pub snapshots: Snapshots,
    pub values: PatchableValues,
    pub config_values: PatchableValues,
    pub metrics: MetricsCollector,
    pub patch_collector: PatchCollector,
    pub dc: Arc<DependencyContainer>,
}

impl std::fmt::Debug for HookInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookInput")
            .field("binding_contexts", &self.binding_contexts)
            .field("snapshots", &self.snapshots)
            .finish_non_exhaustive()
    }
}

impl HookInput {
    /// An input with no contexts and empty values, mainly for tests
    pub fn empty(dc: Arc<DependencyContainer>) -> Self {
        Self {
            binding_contexts: Vec::new(),
            snapshots: Snapshots::new(),
            values: PatchableValues::default(),
            config_values: PatchableValues::default(),
            metrics: MetricsCollector::new(),
            patch_collector: PatchCollector::new(),
            dc,
        }
    }
}
