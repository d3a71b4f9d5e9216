//! Kuboard API client.
//!
//! Creates namespaces and grants namespace roles through a Kuboard panel. Every
//! call is classified into an [`OperationOutcome`] at this boundary; callers
//! never see raw HTTP or transport errors.

// External crates
use async_trait::async_trait;
use tracing::{debug, info};

// Internal imports
use kb_config::ClusterSite;
use kb_messages::{msg, MESSAGES};

pub mod classify;
pub mod client;
pub mod error;
pub mod manifest;
pub mod outcome;

// When the `test-helpers` feature is enabled, include the scripted API and
// the stub panel.
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
#[cfg(any(test, feature = "test-helpers"))]
pub mod stub;


pub use client::HttpKuboard;
pub use error::ProviderError;
pub use outcome::{OperationOutcome, OutcomeKind};

/// Input for namespace creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRequest {
    pub cluster_id: String,
    pub namespace: String,
}

impl NamespaceRequest {
    pub fn new(cluster_id: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            namespace: namespace.into(),
        }
    }
}

/// Input for a permission grant. `role` is validated by Kubernetes, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
    pub cluster_id: String,
    pub namespace: String,
    pub user: String,
    pub role: String,
}

impl GrantRequest {
    pub fn new(
        cluster_id: impl Into<String>,
        namespace: impl Into<String>,
        user: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            namespace: namespace.into(),
            user: user.into(),
            role: role.into(),
        }
    }
}

/// The contract the saga needs from a Kuboard panel.
///
/// Implementations classify; they never retry.
#[async_trait]
pub trait KuboardApi: Send + Sync {
    /// Create `request.namespace` on the cluster.
    async fn create_namespace(&self, site: &ClusterSite, request: &NamespaceRequest)
        -> OperationOutcome;

    /// Stage 1: cluster-wide `viewer` binding for `user`.
    async fn grant_viewer_binding(
        &self,
        site: &ClusterSite,
        cluster_id: &str,
        user: &str,
    ) -> OperationOutcome;

    /// Stage 2: namespaced role binding.
    async fn grant_role_binding(&self, site: &ClusterSite, request: &GrantRequest)
        -> OperationOutcome;

    /// Both stages in order. Stage 1 failures short-circuit stage 2; a stage 2
    /// failure does not undo stage 1.
    async fn grant_permission(&self, site: &ClusterSite, request: &GrantRequest) -> OperationOutcome {
        let stage1 = self
            .grant_viewer_binding(site, &request.cluster_id, &request.user)
            .await;
        match stage1 {
            OperationOutcome::Success => {}
            OperationOutcome::AlreadyDone => info!(
                "{}",
                msg!(
                    MESSAGES.saga.viewer_binding_exists,
                    cluster_id = request.cluster_id.as_str(),
                    user = request.user.as_str()
                )
            ),
            failure => {
                debug!(outcome = %failure, "viewer binding failed, skipping role binding");
                return failure;
            }
        }

        let stage2 = self.grant_role_binding(site, request).await;
        match &stage2 {
            OperationOutcome::Success => info!(
                "{}",
                msg!(
                    MESSAGES.saga.permission_granted,
                    cluster_id = request.cluster_id.as_str(),
                    namespace = request.namespace.as_str(),
                    user = request.user.as_str(),
                    role = request.role.as_str()
                )
            ),
            OperationOutcome::AlreadyDone => info!(
                "{}",
                msg!(
                    MESSAGES.saga.role_binding_exists,
                    cluster_id = request.cluster_id.as_str(),
                    namespace = request.namespace.as_str(),
                    user = request.user.as_str(),
                    role = request.role.as_str()
                )
            ),
            _ => {}
        }
        stage2
    }
}
