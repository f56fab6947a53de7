//! Snapshots: pre-filtered cluster query results delivered to a hook
//!
//! The orchestrator runs the cluster queries a hook declared in its config
//! and ships the results as raw JSON fragments keyed by binding name. A hook
//! only ever reads them; there is no way to query the cluster through this
//! type.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};

/// One snapshot item: the full object and/or the declared filter's result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_result: Option<JsonValue>,
}

impl SnapshotEntry {
    /// The payload to decode: the filter result when present, else the object
    pub fn payload(&self) -> Option<&JsonValue> {
        self.filter_result.as_ref().or(self.object.as_ref())
    }
}

/// Ordered mapping from binding name to its snapshot items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshots(IndexMap<String, Vec<SnapshotEntry>>);

impl Snapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for a binding; an unknown binding yields an empty slice
    pub fn get(&self, binding: &str) -> &[SnapshotEntry] {
        self.0.get(binding).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Decode every entry of a binding into `T`
    ///
    /// Each entry decodes from its filter result when the binding declared a
    /// filter, otherwise from the full object.
    pub fn parse_all<T: DeserializeOwned>(&self, binding: &str) -> Result<Vec<T>> {
        self.get(binding)
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let payload = entry
                    .payload()
                    .ok_or_else(|| CoreError::EmptySnapshotEntry {
                        binding: binding.to_string(),
                        index,
                    })?;
                Ok(serde_json::from_value(payload.clone())?)
            })
            .collect()
    }

    pub fn insert(&mut self, binding: impl Into<String>, entries: Vec<SnapshotEntry>) {
        self.0.insert(binding.into(), entries);
    }

    /// Merge another snapshot map into this one; colliding bindings are
    /// replaced (last wins)
    pub fn merge(&mut self, other: Snapshots) {
        for (binding, entries) in other.0 {
            self.0.insert(binding, entries);
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(object: JsonValue) -> SnapshotEntry {
        SnapshotEntry {
            object: Some(object),
            filter_result: None,
        }
    }

    #[test]
    fn test_unknown_binding_is_empty() {
        let snapshots = Snapshots::new();
        assert!(snapshots.get("nodes").is_empty());
    }

    #[test]
    fn test_parse_all_prefers_filter_result() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct NodeName {
            name: String,
        }

        let mut snapshots = Snapshots::new();
        snapshots.insert(
            "nodes",
            vec![SnapshotEntry {
                object: Some(json!({"metadata": {"name": "full-object"}})),
                filter_result: Some(json!({"name": "filtered"})),
            }],
        );

        let parsed: Vec<NodeName> = snapshots.parse_all("nodes").unwrap();
        assert_eq!(parsed[0].name, "filtered");
    }

    #[test]
    fn test_parse_all_falls_back_to_object() {
        #[derive(Deserialize)]
        struct Meta {
            metadata: JsonValue,
        }

        let mut snapshots = Snapshots::new();
        snapshots.insert("pods", vec![entry(json!({"metadata": {"name": "stub"}}))]);

        let parsed: Vec<Meta> = snapshots.parse_all("pods").unwrap();
        assert_eq!(parsed[0].metadata["name"], "stub");
    }

    #[test]
    fn test_parse_all_empty_entry_is_error() {
        let mut snapshots = Snapshots::new();
        snapshots.insert("pods", vec![SnapshotEntry::default()]);

        let err = snapshots.parse_all::<JsonValue>("pods").unwrap_err();
        assert!(matches!(err, CoreError::EmptySnapshotEntry { index: 0, .. }));
    }

    #[test]
    fn test_merge_last_wins() {
        let mut base = Snapshots::new();
        base.insert("a", vec![entry(json!(1))]);
        base.insert("b", vec![entry(json!(2))]);

        let mut overlay = Snapshots::new();
        overlay.insert("b", vec![entry(json!(3)), entry(json!(4))]);

        base.merge(overlay);

        assert_eq!(base.get("a").len(), 1);
        assert_eq!(base.get("b").len(), 2);
        assert_eq!(base.get("b")[0].object, Some(json!(3)));
    }

    #[test]
    fn test_serde_transparent() {
        let decoded: Snapshots = serde_json::from_value(json!({
            "nodes": [{"object": {"kind": "Node"}}],
        }))
        .unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("nodes")[0].object, Some(json!({"kind": "Node"})));
    }
}
