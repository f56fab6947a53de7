//! Binding contexts: the orchestrator's description of why a hook runs
//!
//! The orchestrator batches pending triggers and delivers them as a JSON
//! array of binding contexts. The executor merges their snapshots and hands
//! the hook one combined view.

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::error::{CoreError, Result};
use crate::snapshots::Snapshots;

/// Why a binding fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingType {
    /// Initial delivery of everything a kubernetes binding matches
    Synchronization,
    /// A single watch event on a kubernetes binding
    Event,
    /// A schedule binding fired
    Schedule,
    /// Several grouped bindings delivered together
    Group,
    #[serde(rename = "onStartup")]
    OnStartup,
}

/// Kubernetes watch event kind carried by an `Event` context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchEvent {
    Added,
    Modified,
    Deleted,
}

/// One entry of the orchestrator's binding-context array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingContext {
    /// Name of the binding that fired (or "onStartup")
    pub binding: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub binding_type: Option<BindingType>,

    #[serde(default, skip_serializing_if = "Snapshots::is_empty")]
    pub snapshots: Snapshots,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_event: Option<WatchEvent>,
}

/// Decode the binding-context array from the transport
///
/// Malformed input is an error that aborts the hook run; there is no partial
/// decode.
pub fn decode_binding_contexts<R: Read>(reader: R) -> Result<Vec<BindingContext>> {
    let contexts: Vec<BindingContext> =
        serde_json::from_reader(reader).map_err(|e| CoreError::InvalidBindingContext {
            message: e.to_string(),
        })?;
    Ok(contexts)
}

/// Merge snapshots of all contexts into one view, last context winning per
/// binding name
pub fn collect_snapshots(contexts: &[BindingContext]) -> Snapshots {
    let mut merged = Snapshots::new();
    for context in contexts {
        merged.merge(context.snapshots.clone());
    }
    merged
}
