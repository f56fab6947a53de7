//! Run command - execute one registered hook through the file transport

use std::sync::Arc;

use addonkit_hooks::{FileTransport, Registry, execute_hook};
use addonkit_kube::DependencyContainer;

use crate::error::Result;

/// Run the hook at `index` using the env-configured transport
pub async fn run(registry: &Registry, index: usize) -> Result<()> {
    let transport = FileTransport::from_env();
    run_with(registry, index, &transport, Arc::new(DependencyContainer::new())).await
}

/// Run with an explicit transport and dependency container
pub async fn run_with(
    registry: &Registry,
    index: usize,
    transport: &FileTransport,
    dc: Arc<DependencyContainer>,
) -> Result<()> {
    execute_hook(registry, index, transport, dc).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use addonkit_core::{HookConfig, KubernetesBinding};
    use addonkit_hooks::{Hook, HookMetadata, TransportConfig};

    #[tokio::test]
    async fn test_run_with_executes_hook() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("values.json"), "{}").unwrap();
        std::fs::write(dir.path().join("config_values.json"), "{}").unwrap();

        let mut registry = Registry::new();
        registry.add(Hook::from_fn(
            HookMetadata::new("noop", "hooks/noop.rs"),
            HookConfig {
                kubernetes: vec![KubernetesBinding {
                    name: "pods".to_string(),
                    api_version: "v1".to_string(),
                    kind: "Pod".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            |input| {
                input.metrics.inc("noop_runs_total", &[]);
                Ok(())
            },
        ));

        let transport = FileTransport::new(TransportConfig::under(dir.path()));
        run_with(
            &registry,
            0,
            &transport,
            Arc::new(DependencyContainer::new()),
        )
        .await
        .unwrap();

        assert!(dir.path().join("metrics.json").exists());
    }

    #[tokio::test]
    async fn test_run_with_bad_index_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("values.json"), "{}").unwrap();
        std::fs::write(dir.path().join("config_values.json"), "{}").unwrap();

        let transport = FileTransport::new(TransportConfig::under(dir.path()));
        let err = run_with(
            &Registry::new(),
            0,
            &transport,
            Arc::new(DependencyContainer::new()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.exit_code(), crate::exit_codes::ERROR);
    }
}
