//! Transport file paths, configurable through the environment
//!
//! The orchestrator points a hook binary at its input and output files via
//! environment variables; every variable has a default under `tmp/` so local
//! runs work without any setup.

use std::path::PathBuf;

/// Input and output file locations for one hook run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Where `hook config` output is expected (`HOOK_CONFIG_PATH`)
    pub hook_config_path: PathBuf,
    /// Binding-context array (`BINDING_CONTEXT_PATH`)
    pub binding_context_path: PathBuf,
    /// Runtime values document (`VALUES_PATH`)
    pub values_path: PathBuf,
    /// Persisted config values document (`CONFIG_VALUES_PATH`)
    pub config_values_path: PathBuf,
    /// Metric operations output (`METRICS_PATH`)
    pub metrics_path: PathBuf,
    /// Object-patch output (`KUBERNETES_PATCH_PATH`)
    pub kubernetes_patch_path: PathBuf,
    /// Runtime values-patch output (`VALUES_JSON_PATCH_PATH`)
    pub values_patch_path: PathBuf,
    /// Config values-patch output (`CONFIG_VALUES_JSON_PATCH_PATH`)
    pub config_values_patch_path: PathBuf,
}

impl TransportConfig {
    /// Read every path from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            hook_config_path: env_path("HOOK_CONFIG_PATH", "tmp/hook_config.json"),
            binding_context_path: env_path("BINDING_CONTEXT_PATH", "tmp/binding_context.json"),
            values_path: env_path("VALUES_PATH", "tmp/values.json"),
            config_values_path: env_path("CONFIG_VALUES_PATH", "tmp/config_values.json"),
            metrics_path: env_path("METRICS_PATH", "tmp/metrics.json"),
            kubernetes_patch_path: env_path("KUBERNETES_PATCH_PATH", "tmp/kubernetes_patch.json"),
            values_patch_path: env_path("VALUES_JSON_PATCH_PATH", "tmp/values_json_patch.json"),
            config_values_patch_path: env_path(
                "CONFIG_VALUES_JSON_PATCH_PATH",
                "tmp/config_values_json_patch.json",
            ),
        }
    }

    /// All paths relative to one base directory (used in tests)
    pub fn under(base: &std::path::Path) -> Self {
        Self {
            hook_config_path: base.join("hook_config.json"),
            binding_context_path: base.join("binding_context.json"),
            values_path: base.join("values.json"),
            config_values_path: base.join("config_values.json"),
            metrics_path: base.join("metrics.json"),
            kubernetes_patch_path: base.join("kubernetes_patch.json"),
            values_patch_path: base.join("values_json_patch.json"),
            config_values_patch_path: base.join("config_values_json_patch.json"),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
