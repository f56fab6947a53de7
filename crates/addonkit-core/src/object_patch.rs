//! Object-patch collector: accumulated mutation intents against cluster objects
//!
//! A hook never talks to the cluster directly for writes. It records intents
//! (create / delete / patch) on a [`PatchCollector`]; the orchestrator applies
//! them in recorded order after the hook returns. JQ filters are recorded as
//! strings and evaluated by the orchestrator, never here.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::io::Write;

use crate::error::Result;

/// Operation kind of an accumulated object patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchOperation {
    Create,
    CreateOrUpdate,
    CreateIfNotExists,
    Delete,
    DeleteInBackground,
    DeleteNonCascading,
    MergePatch,
    #[serde(rename = "JSONPatch")]
    JsonPatch,
    #[serde(rename = "JQPatch")]
    JqPatch,
}

impl PatchOperation {
    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOperation::Create => "Create",
            PatchOperation::CreateOrUpdate => "CreateOrUpdate",
            PatchOperation::CreateIfNotExists => "CreateIfNotExists",
            PatchOperation::Delete => "Delete",
            PatchOperation::DeleteInBackground => "DeleteInBackground",
            PatchOperation::DeleteNonCascading => "DeleteNonCascading",
            PatchOperation::MergePatch => "MergePatch",
            PatchOperation::JsonPatch => "JSONPatch",
            PatchOperation::JqPatch => "JQPatch",
        }
    }
}

impl std::fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional modifiers for patch operations
///
/// Passed by value; `Default` means no subresource and both flags off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Restrict the operation to a subresource (e.g. "status")
    pub subresource: Option<String>,
    /// Do not error when the target object is absent
    pub ignore_missing_object: bool,
    /// Continue applying subsequent operations if this one fails
    pub ignore_hook_error: bool,
}

impl PatchOptions {
    pub fn subresource(name: impl Into<String>) -> Self {
        Self {
            subresource: Some(name.into()),
            ..Default::default()
        }
    }
}

/// One accumulated operation, immutable once appended
///
/// Exactly one payload field is set (`object`, `merge_patch`, `json_patch`
/// or `jq_filter`), matching `operation`; the constructors on
/// [`PatchCollector`] uphold this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatch {
    pub operation: PatchOperation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_patch: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_patch: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jq_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subresource: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_missing_object: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_hook_error: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl ObjectPatch {
    /// The operation kind this patch records
    pub fn description(&self) -> &'static str {
        self.operation.as_str()
    }

    fn object_op(operation: PatchOperation, object: JsonValue) -> Self {
        Self {
            operation,
            object: Some(object),
            api_version: None,
            kind: None,
            namespace: None,
            name: None,
            merge_patch: None,
            json_patch: None,
            jq_filter: None,
            subresource: None,
            ignore_missing_object: false,
            ignore_hook_error: false,
        }
    }

    fn target_op(
        operation: PatchOperation,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
        opts: PatchOptions,
    ) -> Self {
        Self {
            operation,
            object: None,
            api_version: Some(api_version.to_string()),
            kind: Some(kind.to_string()),
            namespace: opt_string(namespace),
            name: Some(name.to_string()),
            merge_patch: None,
            json_patch: None,
            jq_filter: None,
            subresource: opts.subresource,
            ignore_missing_object: opts.ignore_missing_object,
            ignore_hook_error: opts.ignore_hook_error,
        }
    }
}

/// Empty namespace means a cluster-scoped resource: omit the field
fn opt_string(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Ordered, append-only collector of object-patch intents
///
/// One instance per hook invocation; not safe for concurrent use. Accumulation
/// calls never fail: an object that does not serialize is logged and dropped,
/// leaving unrelated operations in place.
#[derive(Debug, Default)]
pub struct PatchCollector {
    patches: Vec<ObjectPatch>,
}

impl PatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a create intent (the consumer fails if the object exists)
    pub fn create<T: Serialize>(&mut self, object: &T) {
        self.push_object(PatchOperation::Create, object);
    }

    /// Record an upsert intent
    pub fn create_or_update<T: Serialize>(&mut self, object: &T) {
        self.push_object(PatchOperation::CreateOrUpdate, object);
    }

    /// Record a create intent that is a no-op when the object exists
    pub fn create_if_not_exists<T: Serialize>(&mut self, object: &T) {
        self.push_object(PatchOperation::CreateIfNotExists, object);
    }

    /// Record a foreground-cascading delete intent
    pub fn delete(&mut self, api_version: &str, kind: &str, namespace: &str, name: &str) {
        self.push_delete(PatchOperation::Delete, api_version, kind, namespace, name);
    }

    /// Record a background-cascading delete intent
    pub fn delete_in_background(
        &mut self,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) {
        self.push_delete(
            PatchOperation::DeleteInBackground,
            api_version,
            kind,
            namespace,
            name,
        );
    }

    /// Record a delete intent that orphans dependents
    pub fn delete_non_cascading(
        &mut self,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) {
        self.push_delete(
            PatchOperation::DeleteNonCascading,
            api_version,
            kind,
            namespace,
            name,
        );
    }

    /// Record an RFC 7396 merge-patch intent
    pub fn merge_patch(
        &mut self,
        patch: JsonValue,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        let mut op = ObjectPatch::target_op(
            PatchOperation::MergePatch,
            api_version,
            kind,
            namespace,
            name,
            opts,
        );
        op.merge_patch = Some(patch);
        self.patches.push(op);
    }

    /// Alias of [`merge_patch`](Self::merge_patch)
    pub fn patch_with_merge(
        &mut self,
        patch: JsonValue,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        self.merge_patch(patch, api_version, kind, namespace, name, opts);
    }

    /// Record an RFC 6902 JSON-patch intent
    pub fn json_patch(
        &mut self,
        patch: JsonValue,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        let mut op = ObjectPatch::target_op(
            PatchOperation::JsonPatch,
            api_version,
            kind,
            namespace,
            name,
            opts,
        );
        op.json_patch = Some(patch);
        self.patches.push(op);
    }

    /// Alias of [`json_patch`](Self::json_patch)
    pub fn patch_with_json(
        &mut self,
        patch: JsonValue,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        self.json_patch(patch, api_version, kind, namespace, name, opts);
    }

    /// Record a transform applied by evaluating a JQ filter server-side
    ///
    /// Only the filter string is recorded; evaluation happens in the consumer.
    pub fn patch_with_jq(
        &mut self,
        filter: &str,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        let mut op = ObjectPatch::target_op(
            PatchOperation::JqPatch,
            api_version,
            kind,
            namespace,
            name,
            opts,
        );
        op.jq_filter = Some(filter.to_string());
        self.patches.push(op);
    }

    /// View of this collector that writes into a single fixed namespace
    pub fn namespaced(&mut self, namespace: impl Into<String>) -> NamespacedPatchCollector<'_> {
        NamespacedPatchCollector {
            inner: self,
            namespace: namespace.into(),
        }
    }

    /// Accumulated operations, in call order
    pub fn operations(&self) -> &[ObjectPatch] {
        &self.patches
    }

    /// Serialize every operation as one JSON object per line, in call order
    ///
    /// No reordering, no deduplication. Fails only when the writer fails.
    pub fn write_output<W: Write>(&self, writer: &mut W) -> Result<()> {
        for patch in &self.patches {
            serde_json::to_writer(&mut *writer, patch)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn push_object<T: Serialize>(&mut self, operation: PatchOperation, object: &T) {
        match serde_json::to_value(object) {
            Ok(value) => self.patches.push(ObjectPatch::object_op(operation, value)),
            Err(e) => {
                tracing::error!(operation = %operation, error = %e, "failed to convert object, dropping operation");
            }
        }
    }

    fn push_delete(
        &mut self,
        operation: PatchOperation,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) {
        self.patches.push(ObjectPatch::target_op(
            operation,
            api_version,
            kind,
            namespace,
            name,
            PatchOptions::default(),
        ));
    }

    fn push_namespaced_object<T: Serialize>(
        &mut self,
        operation: PatchOperation,
        object: &T,
        namespace: &str,
    ) {
        let mut value = match serde_json::to_value(object) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(operation = %operation, error = %e, "failed to convert object, dropping operation");
                return;
            }
        };

        // The fixed namespace overrides whatever the caller set on the object.
        let Some(root) = value.as_object_mut() else {
            tracing::error!(operation = %operation, "converted object is not a JSON object, dropping operation");
            return;
        };
        let metadata = root
            .entry("metadata")
            .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
        match metadata.as_object_mut() {
            Some(meta) => {
                meta.insert(
                    "namespace".to_string(),
                    JsonValue::String(namespace.to_string()),
                );
            }
            None => {
                tracing::error!(operation = %operation, "object metadata is not a JSON object, dropping operation");
                return;
            }
        }

        self.patches.push(ObjectPatch::object_op(operation, value));
    }
}

/// A [`PatchCollector`] view scoped to one namespace
///
/// Every method mirrors the base collector minus the `namespace` parameter.
/// Create variants force-set `metadata.namespace` on the converted object, so
/// a caller bound to one namespace cannot write outside it.
#[derive(Debug)]
pub struct NamespacedPatchCollector<'a> {
    inner: &'a mut PatchCollector,
    namespace: String,
}

impl NamespacedPatchCollector<'_> {
    /// The namespace fixed at construction time
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn create<T: Serialize>(&mut self, object: &T) {
        self.inner
            .push_namespaced_object(PatchOperation::Create, object, &self.namespace);
    }

    pub fn create_or_update<T: Serialize>(&mut self, object: &T) {
        self.inner
            .push_namespaced_object(PatchOperation::CreateOrUpdate, object, &self.namespace);
    }

    pub fn create_if_not_exists<T: Serialize>(&mut self, object: &T) {
        self.inner
            .push_namespaced_object(PatchOperation::CreateIfNotExists, object, &self.namespace);
    }

    pub fn delete(&mut self, api_version: &str, kind: &str, name: &str) {
        self.inner.delete(api_version, kind, &self.namespace, name);
    }

    pub fn delete_in_background(&mut self, api_version: &str, kind: &str, name: &str) {
        self.inner
            .delete_in_background(api_version, kind, &self.namespace, name);
    }

    pub fn delete_non_cascading(&mut self, api_version: &str, kind: &str, name: &str) {
        self.inner
            .delete_non_cascading(api_version, kind, &self.namespace, name);
    }

    pub fn merge_patch(
        &mut self,
        patch: JsonValue,
        api_version: &str,
        kind: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        self.inner
            .merge_patch(patch, api_version, kind, &self.namespace, name, opts);
    }

    pub fn json_patch(
        &mut self,
        patch: JsonValue,
        api_version: &str,
        kind: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        self.inner
            .json_patch(patch, api_version, kind, &self.namespace, name, opts);
    }

    pub fn patch_with_jq(
        &mut self,
        filter: &str,
        api_version: &str,
        kind: &str,
        name: &str,
        opts: PatchOptions,
    ) {
        self.inner
            .patch_with_jq(filter, api_version, kind, &self.namespace, name, opts);
    }
}
