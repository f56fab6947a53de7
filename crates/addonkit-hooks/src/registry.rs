//! The explicit hook registry
//!
//! Hooks are added by the entry point during startup, in a fixed order; the
//! CLI's `hook run <index>` addresses them by that order. There is no
//! process-wide registry and no registration as an import side effect.

use crate::error::{HooksError, Result};
use crate::hook::Hook;

/// Ordered collection of registered hooks
#[derive(Debug, Default)]
pub struct Registry {
    hooks: Vec<Hook>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook, validating its config
    ///
    /// Panics on an invalid config or a duplicate name: misconfiguration at
    /// registration time is a programmer error and must stop the process
    /// before any hook executes. Use [`try_add`](Self::try_add) to handle
    /// the error instead.
    pub fn add(&mut self, hook: Hook) {
        if let Err(e) = self.try_add(hook) {
            panic!("hook registration failed: {}", e);
        }
    }

    /// Register a hook, returning the validation error
    pub fn try_add(&mut self, hook: Hook) -> Result<()> {
        hook.config
            .validate()
            .map_err(|source| HooksError::InvalidHook {
                name: hook.metadata.name.clone(),
                source,
            })?;

        if self.hooks.iter().any(|h| h.metadata.name == hook.metadata.name) {
            return Err(HooksError::DuplicateHook {
                name: hook.metadata.name.clone(),
            });
        }

        self.hooks.push(hook);
        Ok(())
    }

    /// Registered hooks, in registration order
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// Hook at a given registration index
    pub fn get(&self, index: usize) -> Option<&Hook> {
        self.hooks.get(index)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::HookMetadata;
    use addonkit_core::{HookConfig, KubernetesBinding};

    fn hook(name: &str, config: HookConfig) -> Hook {
        Hook::from_fn(
            HookMetadata::new(name, format!("hooks/{}.rs", name)),
            config,
            |_| Ok(()),
        )
    }

    fn kubernetes_config() -> HookConfig {
        HookConfig {
            kubernetes: vec![KubernetesBinding {
                name: "nodes".to_string(),
                api_version: "v1".to_string(),
                kind: "Node".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn contradictory_config() -> HookConfig {
        HookConfig {
            on_startup: Some(1),
            ..kubernetes_config()
        }
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = Registry::new();
        registry.add(hook("first", kubernetes_config()));
        registry.add(hook(
            "second",
            HookConfig {
                on_startup: Some(10),
                ..Default::default()
            },
        ));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(0).unwrap().metadata.name, "first");
        assert_eq!(registry.get(1).unwrap().metadata.name, "second");
        assert!(registry.get(2).is_none());
    }

    #[test]
    #[should_panic(expected = "onStartup")]
    fn test_add_panics_on_startup_with_kubernetes() {
        let mut registry = Registry::new();
        registry.add(hook("broken", contradictory_config()));
    }

    #[test]
    fn test_try_add_reports_invalid_config() {
        let mut registry = Registry::new();
        let err = registry
            .try_add(hook("broken", contradictory_config()))
            .unwrap_err();

        assert!(matches!(err, HooksError::InvalidHook { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = Registry::new();
        registry.add(hook("same", kubernetes_config()));

        let err = registry
            .try_add(hook("same", kubernetes_config()))
            .unwrap_err();
        assert!(matches!(err, HooksError::DuplicateHook { .. }));
    }
}
