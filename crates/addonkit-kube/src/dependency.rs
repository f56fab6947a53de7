//! Dependency container handed to every hook invocation
//!
//! Clients are constructed lazily: a hook that never touches the cluster
//! pays nothing for the Kubernetes client, and tests can run without any
//! cluster or network access. The clock is injectable for tests.

use chrono::{DateTime, Utc};
use oci_distribution::client::{ClientConfig, ClientProtocol};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::error::{KubeError, Result};

/// Time source abstraction
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Lazily-constructed clients shared with hook bodies
pub struct DependencyContainer {
    http: OnceCell<reqwest::Client>,
    kube: tokio::sync::OnceCell<kube::Client>,
    registry: OnceCell<oci_distribution::Client>,
    clock: Arc<dyn Clock>,
}

impl DependencyContainer {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Construct with an injected clock (for tests)
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            http: OnceCell::new(),
            kube: tokio::sync::OnceCell::new(),
            registry: OnceCell::new(),
            clock,
        }
    }

    /// Shared HTTP client, built on first use
    pub fn http_client(&self) -> Result<&reqwest::Client> {
        self.http.get_or_try_init(|| {
            reqwest::Client::builder()
                .build()
                .map_err(|e| KubeError::HttpClient(e.to_string()))
        })
    }

    /// Shared Kubernetes client, built on first use
    pub async fn kube_client(&self) -> Result<kube::Client> {
        let client = self
            .kube
            .get_or_try_init(|| async { crate::client::kube_client().await })
            .await?;
        Ok(client.clone())
    }

    /// Shared container-registry client, built on first use
    pub fn registry_client(&self) -> &oci_distribution::Client {
        self.registry.get_or_init(|| {
            let config = ClientConfig {
                protocol: ClientProtocol::Https,
                ..Default::default()
            };
            oci_distribution::Client::new(config)
        })
    }

    /// The container's time source
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl Default for DependencyContainer {
    fn default() -> Self {
        Self::new()
    }
}
