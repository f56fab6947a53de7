//! Metrics collector: accumulated metric operations
//!
//! Hooks do not expose metrics endpoints. They record operations (counter
//! add, gauge set, group expiry) that the orchestrator replays into its own
//! metrics storage. Grouped metrics let a hook replace its previous samples
//! wholesale: expire the group, then re-add the current set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::Result;

/// Action of one metric operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricAction {
    Add,
    Set,
    Expire,
}

/// One accumulated metric operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub action: MetricAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Optional modifiers for metric operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricOptions {
    /// Attach the sample to a named group for bulk expiry
    pub group: Option<String>,
}

impl MetricOptions {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            group: Some(name.into()),
        }
    }
}

/// Ordered, append-only collector of metric operations
///
/// One instance per hook invocation; not safe for concurrent use.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    operations: Vec<MetricOperation>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter by one
    pub fn inc(&mut self, name: &str, labels: &[(&str, &str)]) {
        self.add(name, 1.0, labels);
    }

    /// Add to a counter
    pub fn add(&mut self, name: &str, value: f64, labels: &[(&str, &str)]) {
        self.add_with_options(name, value, labels, MetricOptions::default());
    }

    /// Add to a counter, with options
    pub fn add_with_options(
        &mut self,
        name: &str,
        value: f64,
        labels: &[(&str, &str)],
        opts: MetricOptions,
    ) {
        self.operations.push(MetricOperation {
            name: Some(name.to_string()),
            action: MetricAction::Add,
            value: Some(value),
            labels: collect_labels(labels),
            group: opts.group,
        });
    }

    /// Set a gauge
    pub fn set(&mut self, name: &str, value: f64, labels: &[(&str, &str)]) {
        self.set_with_options(name, value, labels, MetricOptions::default());
    }

    /// Set a gauge, with options
    pub fn set_with_options(
        &mut self,
        name: &str,
        value: f64,
        labels: &[(&str, &str)],
        opts: MetricOptions,
    ) {
        self.operations.push(MetricOperation {
            name: Some(name.to_string()),
            action: MetricAction::Set,
            value: Some(value),
            labels: collect_labels(labels),
            group: opts.group,
        });
    }

    /// Expire every sample previously attached to `group`
    pub fn expire_group(&mut self, group: &str) {
        self.operations.push(MetricOperation {
            name: None,
            action: MetricAction::Expire,
            value: None,
            labels: BTreeMap::new(),
            group: Some(group.to_string()),
        });
    }

    /// Accumulated operations, in call order
    pub fn operations(&self) -> &[MetricOperation] {
        &self.operations
    }

    /// Serialize every operation as one JSON object per line, in call order
    pub fn write_output<W: Write>(&self, writer: &mut W) -> Result<()> {
        for op in &self.operations {
            serde_json::to_writer(&mut *writer, op)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

fn collect_labels(labels: &[(&str, &str)]) -> BTreeMap<String, String> {
    labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inc_is_add_of_one() {
        let mut metrics = MetricsCollector::new();
        metrics.inc("hook_runs_total", &[("hook", "node_roles")]);

        let op = &metrics.operations()[0];
        assert_eq!(op.action, MetricAction::Add);
        assert_eq!(op.value, Some(1.0));
        assert_eq!(op.labels["hook"], "node_roles");
    }

    #[test]
    fn test_grouped_set_and_expire() {
        let mut metrics = MetricsCollector::new();
        metrics.expire_group("node_info");
        metrics.set_with_options(
            "node_ready",
            1.0,
            &[("node", "worker-1")],
            MetricOptions::group("node_info"),
        );

        let ops = metrics.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].action, MetricAction::Expire);
        assert_eq!(ops[0].group.as_deref(), Some("node_info"));
        assert!(ops[0].name.is_none());
        assert_eq!(ops[1].action, MetricAction::Set);
        assert_eq!(ops[1].group.as_deref(), Some("node_info"));
    }

    #[test]
    fn test_write_output_jsonl() {
        let mut metrics = MetricsCollector::new();
        metrics.add("a_total", 3.0, &[]);
        metrics.set("b", 0.5, &[("x", "y")]);

        let mut out = Vec::new();
        metrics.write_output(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: MetricOperation = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.name.as_deref(), Some("a_total"));
        // Empty labels are omitted from the wire form.
        assert!(!lines[0].contains("labels"));
    }

    #[test]
    fn test_write_output_empty() {
        let metrics = MetricsCollector::new();
        let mut out = Vec::new();
        metrics.write_output(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
