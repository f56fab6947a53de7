//! Kubernetes client construction

use crate::error::Result;

/// Build a client from the default configuration chain
///
/// Tries the in-cluster service account first, then the local kubeconfig.
pub async fn kube_client() -> Result<kube::Client> {
    Ok(kube::Client::try_default().await?)
}
