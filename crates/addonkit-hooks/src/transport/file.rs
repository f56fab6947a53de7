//! File-based transport
//!
//! Reads the orchestrator's input files into a typed [`HookInput`] and
//! serializes the accumulated collectors back out. Reading is fail-closed:
//! unreadable or undecodable values, config values or binding contexts abort
//! the run with the cause preserved. A missing binding-context file is the
//! one exception: startup runs have no events, so it decodes to an empty
//! context list.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use addonkit_core::{
    BindingContext, MetricsCollector, PatchCollector, PatchableValues, collect_snapshots,
    decode_binding_contexts,
};
use addonkit_kube::DependencyContainer;

use crate::error::{HooksError, Result};
use crate::hook::HookInput;
use crate::transport::TransportConfig;

/// The default local/file transport
#[derive(Debug, Clone)]
pub struct FileTransport {
    config: TransportConfig,
}

impl FileTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Transport configured from the environment
    pub fn from_env() -> Self {
        Self::new(TransportConfig::from_env())
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Read every input file into a fresh [`HookInput`]
    ///
    /// Collectors start empty; one input value is built per invocation and
    /// never shared across runs.
    pub fn read_input(&self, dc: Arc<DependencyContainer>) -> Result<HookInput> {
        let values = self.read_values(&self.config.values_path, "values")?;
        let config_values = self.read_values(&self.config.config_values_path, "config values")?;
        let binding_contexts = self.read_binding_contexts()?;
        let snapshots = collect_snapshots(&binding_contexts);

        Ok(HookInput {
            binding_contexts,
            snapshots,
            values,
            config_values,
            metrics: MetricsCollector::new(),
            patch_collector: PatchCollector::new(),
            dc,
        })
    }

    /// Write the four output artifacts
    ///
    /// Metrics and object patches are always written (possibly as empty
    /// files); a values-patch file is omitted entirely when its collector
    /// recorded nothing.
    pub fn write_output(&self, input: &HookInput) -> Result<()> {
        self.write_artifact(&self.config.metrics_path, "metrics", |w| {
            input.metrics.write_output(w)
        })?;

        self.write_artifact(&self.config.kubernetes_patch_path, "object patches", |w| {
            input.patch_collector.write_output(w)
        })?;

        if input.values.has_patches() {
            self.write_artifact(&self.config.values_patch_path, "values patches", |w| {
                input.values.write_output(w)
            })?;
        }

        if input.config_values.has_patches() {
            self.write_artifact(
                &self.config.config_values_patch_path,
                "config values patches",
                |w| input.config_values.write_output(w),
            )?;
        }

        Ok(())
    }

    /// Write one hook config dump to the configured path
    pub fn write_hook_config(&self, config_json: &str) -> Result<()> {
        self.write_artifact(&self.config.hook_config_path, "hook config", |w| {
            w.write_all(config_json.as_bytes())?;
            Ok(())
        })
    }

    fn read_values(&self, path: &Path, what: &'static str) -> Result<PatchableValues> {
        let content = std::fs::read_to_string(path).map_err(|e| HooksError::Input {
            what,
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        PatchableValues::from_json(&content).map_err(|e| HooksError::Input {
            what,
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    fn read_binding_contexts(&self) -> Result<Vec<BindingContext>> {
        let path = &self.config.binding_context_path;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path).map_err(|e| HooksError::Input {
            what: "binding context",
            path: path.clone(),
            source: Box::new(e),
        })?;

        decode_binding_contexts(BufReader::new(file)).map_err(|e| HooksError::Input {
            what: "binding context",
            path: path.clone(),
            source: Box::new(e),
        })
    }

    fn write_artifact<F>(&self, path: &Path, what: &'static str, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> addonkit_core::Result<()>,
    {
        let io_err = |e: Box<dyn std::error::Error + Send + Sync>| HooksError::Output {
            what,
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| io_err(Box::new(e)))?;
        }

        let file = File::create(path).map_err(|e| io_err(Box::new(e)))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer).map_err(|e| io_err(Box::new(e)))?;
        writer.flush().map_err(|e| io_err(Box::new(e)))?;
        Ok(())
    }
}

impl Default for FileTransport {
    fn default() -> Self {
        Self::from_env()
    }
}
