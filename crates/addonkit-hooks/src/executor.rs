//! The batching executor
//!
//! Adapts the orchestrator's generic binding-context protocol into one
//! strongly-typed handler call: read input, run the hook, serialize the
//! collectors. A handler error aborts the run before any output file is
//! touched, so the orchestrator never applies a failed hook's partial state.

use std::sync::Arc;

use addonkit_kube::DependencyContainer;

use crate::error::{HooksError, Result};
use crate::registry::Registry;
use crate::transport::FileTransport;

/// Execute one registered hook by its registry index
pub async fn execute_hook(
    registry: &Registry,
    index: usize,
    transport: &FileTransport,
    dc: Arc<DependencyContainer>,
) -> Result<()> {
    let hook = registry.get(index).ok_or(HooksError::HookNotFound {
        index,
        registered: registry.len(),
    })?;

    let mut input = transport.read_input(dc)?;

    tracing::info!(hook = %hook.metadata.name, index, "executing hook");
    hook.run(&mut input)
        .await
        .map_err(|source| HooksError::HookFailed {
            hook: hook.metadata.name.clone(),
            source,
        })?;

    transport.write_output(&input)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{Hook, HookMetadata};
    use crate::transport::TransportConfig;
    use addonkit_core::{HookConfig, KubernetesBinding, PatchOptions};
    use std::path::Path;

    fn registry_with(hook: Hook) -> Registry {
        let mut registry = Registry::new();
        registry.add(hook);
        registry
    }

    fn pods_config() -> HookConfig {
        HookConfig {
            kubernetes: vec![KubernetesBinding {
                name: "pods".to_string(),
                api_version: "v1".to_string(),
                kind: "Pod".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn seed_inputs(dir: &Path) {
        std::fs::write(dir.join("values.json"), "{}").unwrap();
        std::fs::write(dir.join("config_values.json"), "{}").unwrap();
        std::fs::write(
            dir.join("binding_context.json"),
            r#"[{"binding": "pods", "type": "Synchronization", "snapshots": {"pods": [{"object": {"metadata": {"name": "web-1"}}}]}}]"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_execute_hook_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        seed_inputs(dir.path());

        let registry = registry_with(Hook::from_fn(
            HookMetadata::new("pause-pods", "hooks/pause_pods.rs"),
            pods_config(),
            |input| {
                for _ in input.snapshots.get("pods") {
                    input.patch_collector.patch_with_jq(
                        ".spec.paused = true",
                        "v1",
                        "Pod",
                        "ns",
                        "web-1",
                        PatchOptions::default(),
                    );
                }
                input.metrics.inc("paused_total", &[]);
                Ok(())
            },
        ));

        let transport = FileTransport::new(TransportConfig::under(dir.path()));
        execute_hook(
            &registry,
            0,
            &transport,
            Arc::new(DependencyContainer::new()),
        )
        .await
        .unwrap();

        let patches = std::fs::read_to_string(dir.path().join("kubernetes_patch.json")).unwrap();
        assert_eq!(patches.lines().count(), 1);
        let metrics = std::fs::read_to_string(dir.path().join("metrics.json")).unwrap();
        assert_eq!(metrics.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_index_is_error() {
        let dir = tempfile::tempdir().unwrap();
        seed_inputs(dir.path());

        let registry = Registry::new();
        let transport = FileTransport::new(TransportConfig::under(dir.path()));

        let err = execute_hook(
            &registry,
            3,
            &transport,
            Arc::new(DependencyContainer::new()),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            HooksError::HookNotFound {
                index: 3,
                registered: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_hook_writes_no_output() {
        let dir = tempfile::tempdir().unwrap();
        seed_inputs(dir.path());

        let registry = registry_with(Hook::from_fn(
            HookMetadata::new("failing", "hooks/failing.rs"),
            pods_config(),
            |input| {
                // Accumulated before the failure, must never reach disk.
                input.metrics.inc("never_written", &[]);
                Err("boom".into())
            },
        ));

        let transport = FileTransport::new(TransportConfig::under(dir.path()));
        let err = execute_hook(
            &registry,
            0,
            &transport,
            Arc::new(DependencyContainer::new()),
        )
        .await
        .unwrap_err();

        match err {
            HooksError::HookFailed { hook, source } => {
                assert_eq!(hook, "failing");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("metrics.json").exists());
    }
}
