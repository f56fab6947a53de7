//! Addonkit Core - Core types for building addon-operator hooks
//!
//! This crate provides the foundational types used throughout addonkit:
//! - `PatchableValues`: read-only values with recorded patch operations
//! - `PatchCollector`: accumulated object-patch intents
//! - `MetricsCollector`: accumulated metric operations
//! - `Snapshots` / `BindingContext`: the input side of the hook protocol
//! - `HookConfig`: hook trigger declaration and validation

pub mod binding_context;
pub mod error;
pub mod hook_config;
pub mod metrics;
pub mod object_patch;
pub mod snapshots;
pub mod values;

pub use binding_context::{
    BindingContext, BindingType, WatchEvent, collect_snapshots, decode_binding_contexts,
};
pub use error::{CoreError, Result};
pub use hook_config::{
    FieldSelector, FieldSelectorRequirement, HookConfig, HookSettings, KubernetesBinding,
    LabelSelector, LabelSelectorRequirement, NameSelector, NamespaceSelector, ScheduleBinding,
};
pub use metrics::{MetricAction, MetricOperation, MetricOptions, MetricsCollector};
pub use object_patch::{NamespacedPatchCollector, ObjectPatch, PatchCollector, PatchOperation, PatchOptions};
pub use snapshots::{SnapshotEntry, Snapshots};
pub use values::{PatchableValues, ValuesPatchOp, ValuesPatchOperation};
