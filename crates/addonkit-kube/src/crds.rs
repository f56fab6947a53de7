//! CRD installation
//!
//! Hooks that own custom resources install their CRD manifests at startup.
//! Manifests are discovered by glob, non-CRD documents are skipped, and each
//! CRD is applied with Server-Side Apply, retrying on write conflicts.

use std::time::Duration;

use kube::{
    Client,
    api::{Api, DynamicObject, Patch, PatchParams},
    discovery::ApiResource,
};
use serde::Deserialize;

use crate::error::{KubeError, Result};

/// Field manager for CRD operations
const CRD_FIELD_MANAGER: &str = "addonkit-crd-installer";

/// Attempts per CRD before a conflict is reported
const CONFLICT_ATTEMPTS: u32 = 3;

/// Base backoff between conflict retries
const CONFLICT_BACKOFF: Duration = Duration::from_millis(200);

/// Installs CustomResourceDefinitions from manifest files
pub struct CrdInstaller {
    client: Client,
}

impl CrdInstaller {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying Kubernetes client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Apply every CRD found under a glob pattern (e.g. `crds/*.yaml`)
    ///
    /// Files are processed in sorted order. Documents whose kind is not
    /// `CustomResourceDefinition` are skipped silently, so CRD directories
    /// may carry other manifests.
    pub async fn ensure_crds(&self, pattern: &str) -> Result<Vec<CrdApplyResult>> {
        let mut paths: Vec<_> = glob::glob(pattern)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| KubeError::Io(e.into_error()))?;
        paths.sort();

        let mut results = Vec::new();
        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            for crd in parse_crd_manifests(&content)? {
                results.push(self.apply_crd(crd).await?);
            }
        }

        Ok(results)
    }

    /// Apply one CRD using Server-Side Apply, retrying on 409 conflicts
    pub async fn apply_crd(&self, obj: DynamicObject) -> Result<CrdApplyResult> {
        let name = obj
            .metadata
            .name
            .clone()
            .ok_or_else(|| KubeError::InvalidManifest("CRD missing metadata.name".to_string()))?;

        // CRDs are cluster-scoped
        let api: Api<DynamicObject> = Api::all_with(
            self.client.clone(),
            &ApiResource::erase::<k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition>(&()),
        );

        let exists = api.get_opt(&name).await?.is_some();

        let params = PatchParams {
            field_manager: Some(CRD_FIELD_MANAGER.to_string()),
            force: true,
            ..Default::default()
        };

        let mut attempt = 1;
        loop {
            match api.patch(&name, &params, &Patch::Apply(&obj)).await {
                Ok(_) => {
                    return Ok(CrdApplyResult {
                        name,
                        created: !exists,
                    });
                }
                Err(e) => {
                    let err = KubeError::Api(e);
                    if err.is_conflict() && attempt < CONFLICT_ATTEMPTS {
                        tracing::warn!(crd = %name, attempt, "conflict applying CRD, retrying");
                        tokio::time::sleep(CONFLICT_BACKOFF * attempt).await;
                        attempt += 1;
                        continue;
                    }
                    if err.is_conflict() {
                        return Err(KubeError::ConflictRetriesExhausted {
                            name,
                            attempts: attempt,
                        });
                    }
                    return Err(err);
                }
            }
        }
    }
}

/// Parse a (possibly multi-document) YAML manifest, keeping only CRDs
pub fn parse_crd_manifests(content: &str) -> Result<Vec<DynamicObject>> {
    let mut crds = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| KubeError::InvalidManifest(format!("invalid YAML document: {}", e)))?;

        if value.is_null() {
            continue;
        }

        let kind = value.get("kind").and_then(|k| k.as_str());
        if kind != Some("CustomResourceDefinition") {
            continue;
        }

        let obj: DynamicObject = serde_yaml::from_value(value)
            .map_err(|e| KubeError::InvalidManifest(format!("invalid CRD document: {}", e)))?;
        crds.push(obj);
    }

    Ok(crds)
}

/// Result of applying a CRD
#[derive(Debug, Clone)]
pub struct CrdApplyResult {
    /// CRD name
    pub name: String,
    /// Whether it was created (true) or updated (false)
    pub created: bool,
}

impl CrdApplyResult {
    /// Get a display message for this result
    pub fn message(&self) -> String {
        if self.created {
            format!("created CRD {}", self.name)
        } else {
            format!("updated CRD {}", self.name)
        }
    }
}
