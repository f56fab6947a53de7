//! Patchable values: a read-only JSON tree with recorded mutations
//!
//! Hooks never mutate values in place. Reads go against the immutable
//! snapshot the orchestrator supplied; `set`/`remove` record JSON-Patch
//! style operations that the orchestrator applies after the hook returns.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::io::Write;

use crate::error::{CoreError, Result};

static NULL: JsonValue = JsonValue::Null;

/// Operation kind of a recorded values patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuesPatchOp {
    Add,
    Remove,
}

/// One recorded values mutation
///
/// `path` is a slash-delimited JSON Pointer derived from the dotted path
/// (`a.b.c` becomes `/a/b/c`). `value` is present only for `add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesPatchOperation {
    pub op: ValuesPatchOp,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
}

/// Values container over an immutable JSON document
///
/// Not safe for concurrent use; construct one instance per hook invocation.
/// Reads never observe pending patches recorded on the same instance.
#[derive(Debug, Clone, Default)]
pub struct PatchableValues {
    values: JsonValue,
    patches: Vec<ValuesPatchOperation>,
}

impl PatchableValues {
    /// Wrap an already-parsed JSON document
    pub fn new(values: JsonValue) -> Self {
        Self {
            values,
            patches: Vec::new(),
        }
    }

    /// Parse values from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let values: JsonValue = serde_json::from_str(json)?;
        Ok(Self::new(values))
    }

    /// The underlying immutable document
    pub fn inner(&self) -> &JsonValue {
        &self.values
    }

    /// Get a value by dotted path (e.g., "global.cluster.name")
    ///
    /// Returns JSON `null` as the non-existent sentinel; use [`get_ok`]
    /// or [`exists`] to distinguish an absent path from a stored null.
    ///
    /// [`get_ok`]: Self::get_ok
    /// [`exists`]: Self::exists
    pub fn get(&self, path: &str) -> &JsonValue {
        self.get_raw(path).unwrap_or(&NULL)
    }

    /// Get a value by dotted path with an explicit existence flag
    pub fn get_ok(&self, path: &str) -> (&JsonValue, bool) {
        match self.get_raw(path) {
            Some(v) => (v, true),
            None => (&NULL, false),
        }
    }

    /// Check whether a dotted path exists in the snapshot
    pub fn exists(&self, path: &str) -> bool {
        self.get_raw(path).is_some()
    }

    /// Get the dynamically-typed decoded value at a dotted path
    pub fn get_raw(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.values, &parts)
    }

    /// Number of elements in the array at `path`
    ///
    /// An absent path counts as zero; a present non-array value is an error.
    pub fn array_count(&self, path: &str) -> Result<usize> {
        match self.get_raw(path) {
            None => Ok(0),
            Some(JsonValue::Array(items)) => Ok(items.len()),
            Some(_) => Err(CoreError::NotAnArray {
                path: path.to_string(),
            }),
        }
    }

    /// Record an "add" operation for `path`
    ///
    /// Serialization failures are logged and the write is dropped; the
    /// remaining recorded operations are unaffected.
    pub fn set<T: Serialize>(&mut self, path: &str, value: T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(path, error = %e, "failed to serialize value, dropping set");
                return;
            }
        };

        self.patches.push(ValuesPatchOperation {
            op: ValuesPatchOp::Add,
            path: dotted_to_pointer(path),
            value: Some(value),
        });
    }

    /// Record a "remove" operation for `path`
    ///
    /// A no-op when the path does not exist in the immutable snapshot, so
    /// the orchestrator never receives a remove against absent data. The
    /// check is against the snapshot only, not against pending patches.
    pub fn remove(&mut self, path: &str) {
        if !self.exists(path) {
            return;
        }

        self.patches.push(ValuesPatchOperation {
            op: ValuesPatchOp::Remove,
            path: dotted_to_pointer(path),
            value: None,
        });
    }

    /// All recorded operations, in call order
    pub fn patches(&self) -> &[ValuesPatchOperation] {
        &self.patches
    }

    /// Whether any operation has been recorded
    pub fn has_patches(&self) -> bool {
        !self.patches.is_empty()
    }

    /// Serialize the recorded operations as one JSON array
    ///
    /// Writes nothing at all when no operations were recorded; callers must
    /// treat absent output as "no changes", not as an error.
    pub fn write_output<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.patches.is_empty() {
            return Ok(());
        }

        serde_json::to_writer(&mut *writer, &self.patches)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Convert a dotted path to a leading-slash JSON Pointer: `a.b.c` -> `/a/b/c`
pub fn dotted_to_pointer(path: &str) -> String {
    format!("/{}", path.replace('.', "/"))
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return Some(value);
    }

    let key = path[0];
    let remaining = &path[1..];

    match value {
        JsonValue::Object(map) => map.get(key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_existing_path() {
        let values = PatchableValues::new(json!({"image": {"tag": "v1", "pullPolicy": "Always"}}));

        assert_eq!(values.get("image.tag"), "v1");
        assert_eq!(values.get("image.pullPolicy"), "Always");
    }

    #[test]
    fn test_get_missing_path_is_null_sentinel() {
        let values = PatchableValues::new(json!({"a": 1}));

        assert!(values.get("a.b.c").is_null());
        assert!(values.get("missing").is_null());
    }

    #[test]
    fn test_get_ok_distinguishes_stored_null() {
        let values = PatchableValues::new(json!({"a": null}));

        let (v, ok) = values.get_ok("a");
        assert!(v.is_null());
        assert!(ok);

        let (_, ok) = values.get_ok("b");
        assert!(!ok);
    }

    #[test]
    fn test_exists() {
        let values = PatchableValues::new(json!({"a": {"b": false}}));

        assert!(values.exists("a"));
        assert!(values.exists("a.b"));
        assert!(!values.exists("a.b.c"));
        assert!(!values.exists("x"));
    }

    #[test]
    fn test_array_count() {
        let values = PatchableValues::new(json!({"nodes": [1, 2, 3], "name": "stub"}));

        assert_eq!(values.array_count("nodes").unwrap(), 3);
        assert_eq!(values.array_count("missing").unwrap(), 0);
        assert!(matches!(
            values.array_count("name"),
            Err(CoreError::NotAnArray { .. })
        ));
    }

    #[test]
    fn test_set_records_add_op() {
        let mut values = PatchableValues::new(json!({}));
        values.set("a.b", "x");

        let patches = values.patches();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].op, ValuesPatchOp::Add);
        assert_eq!(patches[0].path, "/a/b");
        assert_eq!(patches[0].value, Some(json!("x")));
    }

    #[test]
    fn test_set_value_round_trips() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Endpoint {
            host: String,
            port: u16,
        }

        let mut values = PatchableValues::new(json!({}));
        values.set(
            "service.endpoint",
            Endpoint {
                host: "db".to_string(),
                port: 5432,
            },
        );

        let recorded = values.patches()[0].value.clone().unwrap();
        let decoded: Endpoint = serde_json::from_value(recorded).unwrap();
        assert_eq!(
            decoded,
            Endpoint {
                host: "db".to_string(),
                port: 5432,
            }
        );
    }

    #[test]
    fn test_remove_missing_path_is_noop() {
        let mut values = PatchableValues::new(json!({"metadata": {"name": "stub"}}));

        values.set("a.b", "x");
        // "a.b" never existed in the original snapshot, so the remove is
        // dropped even though a pending add targets the same path.
        values.remove("a.b");

        let patches = values.patches();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].op, ValuesPatchOp::Add);
    }

    #[test]
    fn test_remove_existing_path() {
        let mut values = PatchableValues::new(json!({"a": {"b": 1}}));
        values.remove("a.b");

        let patches = values.patches();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].op, ValuesPatchOp::Remove);
        assert_eq!(patches[0].path, "/a/b");
        assert_eq!(patches[0].value, None);
    }

    #[test]
    fn test_patches_preserve_call_order() {
        let mut values = PatchableValues::new(json!({"old": 1}));

        values.set("first", 1);
        values.remove("old");
        values.set("second", 2);

        let paths: Vec<&str> = values.patches().iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/first", "/old", "/second"]);
    }

    #[test]
    fn test_dotted_to_pointer() {
        assert_eq!(dotted_to_pointer("a.b.c"), "/a/b/c");
        assert_eq!(dotted_to_pointer("a"), "/a");
    }

    #[test]
    fn test_write_output_empty_writes_nothing() {
        let values = PatchableValues::new(json!({"a": 1}));

        let mut out = Vec::new();
        values.write_output(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_output_is_json_array() {
        let mut values = PatchableValues::new(json!({"drop": true}));
        values.set("a.b", 42);
        values.remove("drop");

        let mut out = Vec::new();
        values.write_output(&mut out).unwrap();

        let decoded: Vec<ValuesPatchOperation> = serde_json::from_slice(&out).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].path, "/a/b");
        assert_eq!(decoded[1].op, ValuesPatchOp::Remove);
    }

    #[test]
    fn test_reads_never_see_pending_patches() {
        let mut values = PatchableValues::new(json!({}));
        values.set("a.b", "x");

        assert!(!values.exists("a.b"));
        assert!(values.get("a.b").is_null());
    }
}
