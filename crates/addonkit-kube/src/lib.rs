//! Addonkit Kube - Kubernetes utilities for addonkit hooks
//!
//! This crate provides:
//! - **Client construction**: default kubeconfig/in-cluster client
//! - **CRD installation**: Server-Side Apply with retry-on-conflict
//! - **Certificates**: self-signed certificate generation for webhooks
//! - **Dependency container**: lazily-constructed clients and a clock
//!   handed to every hook invocation

pub mod certificate;
pub mod client;
pub mod crds;
pub mod dependency;
pub mod error;

pub use certificate::{CertificateOptions, SelfSignedCertificate, generate_self_signed};
pub use client::kube_client;
pub use crds::{CrdApplyResult, CrdInstaller};
pub use dependency::{Clock, DependencyContainer, SystemClock};
pub use error::{KubeError, Result};
