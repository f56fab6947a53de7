//! Hook configuration: declared triggers and their validation
//!
//! A hook declares when the orchestrator should run it: at startup, around
//! helm phases, on a schedule, or on Kubernetes events matched by selectors.
//! Validation runs at registration time; a bad config is a programmer error
//! and must stop the process before any hook executes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::error::{CoreError, Result};

fn default_config_version() -> String {
    "v1".to_string()
}

/// Declared triggering conditions of one hook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookConfig {
    #[serde(default = "default_config_version")]
    pub config_version: String,

    /// Run once at operator startup, ordered by this value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_startup: Option<u32>,

    /// Run before the module's helm release is applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_before_helm: Option<u32>,

    /// Run after the module's helm release is applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_after_helm: Option<u32>,

    /// Run after the module's helm release is deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_after_delete_helm: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<ScheduleBinding>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kubernetes: Vec<KubernetesBinding>,

    /// Dedicated orchestrator queue for this hook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<HookSettings>,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            on_startup: None,
            on_before_helm: None,
            on_after_helm: None,
            on_after_delete_helm: None,
            schedule: Vec::new(),
            kubernetes: Vec::new(),
            queue: None,
            settings: None,
        }
    }
}

/// A crontab-driven trigger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBinding {
    pub name: String,
    pub crontab: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_failure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// A Kubernetes-event trigger with its object query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesBinding {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_selector: Option<NameSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<NamespaceSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_selector: Option<FieldSelector>,
    /// JQ filter the orchestrator applies to matched objects before
    /// snapshotting them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jq_filter: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_failure: bool,
    /// Which watch events trigger the hook; `None` means all of them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute_hook_on_events: Option<Vec<crate::binding_context::WatchEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute_hook_on_synchronization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_synchronization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_full_objects_in_memory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameSelector {
    #[serde(default)]
    pub match_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_selector: Option<NameSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSelector {
    #[serde(default)]
    pub match_expressions: Vec<FieldSelectorRequirement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSelectorRequirement {
    pub field: String,
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Orchestrator-side execution throttling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_min_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_burst: Option<u32>,
}

impl HookConfig {
    /// Validate the declared triggers
    ///
    /// Called at registration time; every error here is a programmer error.
    pub fn validate(&self) -> Result<()> {
        if self.config_version != "v1" {
            return Err(invalid(format!(
                "unsupported config version '{}'",
                self.config_version
            )));
        }

        // Startup execution never has event snapshots available, so a hook
        // cannot be both a startup hook and a kubernetes-event hook.
        if self.on_startup.is_some() && !self.kubernetes.is_empty() {
            return Err(invalid(
                "onStartup cannot be combined with kubernetes bindings".to_string(),
            ));
        }

        if !self.has_trigger() {
            return Err(invalid("hook declares no trigger".to_string()));
        }

        let mut seen = HashSet::new();

        for binding in &self.schedule {
            if binding.name.is_empty() {
                return Err(invalid("schedule binding without a name".to_string()));
            }
            if binding.crontab.is_empty() {
                return Err(invalid(format!(
                    "schedule binding '{}' without a crontab",
                    binding.name
                )));
            }
            if !seen.insert(binding.name.as_str()) {
                return Err(invalid(format!("duplicate binding name '{}'", binding.name)));
            }
        }

        for binding in &self.kubernetes {
            if binding.name.is_empty() {
                return Err(invalid("kubernetes binding without a name".to_string()));
            }
            if binding.kind.is_empty() {
                return Err(invalid(format!(
                    "kubernetes binding '{}' without a kind",
                    binding.name
                )));
            }
            if !seen.insert(binding.name.as_str()) {
                return Err(invalid(format!("duplicate binding name '{}'", binding.name)));
            }
        }

        Ok(())
    }

    fn has_trigger(&self) -> bool {
        self.on_startup.is_some()
            || self.on_before_helm.is_some()
            || self.on_after_helm.is_some()
            || self.on_after_delete_helm.is_some()
            || !self.schedule.is_empty()
            || !self.kubernetes.is_empty()
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::InvalidHookConfig { message }
}
