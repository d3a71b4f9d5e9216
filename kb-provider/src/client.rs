//! reqwest-backed [`KuboardApi`].

use crate::classify::{
    classify_namespace_creation, classify_role_binding, classify_transport, classify_viewer_binding,
};
use crate::error::ProviderError;
use crate::manifest::{NamespaceManifest, RoleBindingManifest, ViewerBindingManifest};
use crate::{GrantRequest, KuboardApi, NamespaceRequest, OperationOutcome};
use async_trait::async_trait;
use kb_config::ClusterSite;
use kb_messages::{msg, MESSAGES};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// String to set as the user agent in HTTP requests.
static CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const JSON_UTF8: &str = "application/json;charset=UTF-8";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Kuboard client that opens a fresh session for every call.
#[derive(Debug, Clone)]
pub struct HttpKuboard {
    timeout: Duration,
}

impl Default for HttpKuboard {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl HttpKuboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn session(&self, site: &ClusterSite) -> Result<KuboardSession, ProviderError> {
        KuboardSession::open(site, self.timeout)
    }
}

/// One authenticated HTTP session against a Kuboard site.
struct KuboardSession {
    base_url: String,
    client: reqwest::Client,
}

impl KuboardSession {
    fn open(site: &ClusterSite, timeout: Duration) -> Result<Self, ProviderError> {
        let cookie = HeaderValue::from_str(&site.credentials.cookie()).map_err(|e| {
            ProviderError::InvalidCredentials {
                site: site.name.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(COOKIE, cookie);

        let client = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: site.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// POST `body` to `path`, returning status and body text.
    ///
    /// A body that fails to arrive in full is a transport error, not an empty
    /// response.
    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            // Set before `json`, which only fills in a missing content type.
            .header(CONTENT_TYPE, JSON_UTF8)
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

fn session_failure(err: ProviderError) -> OperationOutcome {
    match err {
        ProviderError::InvalidCredentials { .. } => OperationOutcome::AuthFailure(err.to_string()),
        ProviderError::Client(_) => OperationOutcome::UnexpectedFailure(err.to_string()),
    }
}

#[async_trait]
impl KuboardApi for HttpKuboard {
    #[instrument(skip(self, site), fields(site = %site.name, cluster_id = %request.cluster_id, namespace = %request.namespace))]
    async fn create_namespace(
        &self,
        site: &ClusterSite,
        request: &NamespaceRequest,
    ) -> OperationOutcome {
        let session = match self.session(site) {
            Ok(session) => session,
            Err(e) => return session_failure(e),
        };

        let path = format!("/k8s-api/{}/api/v1/namespaces", request.cluster_id);
        let outcome = match session
            .post(&path, &NamespaceManifest::new(&request.namespace))
            .await
        {
            Ok((status, body)) => classify_namespace_creation(status, &body),
            Err(e) => classify_transport(&e),
        };

        match &outcome {
            OperationOutcome::Success => info!(
                "{}",
                msg!(
                    MESSAGES.saga.namespace_created,
                    cluster_id = request.cluster_id.as_str(),
                    namespace = request.namespace.as_str()
                )
            ),
            OperationOutcome::AlreadyDone => warn!(
                "{}",
                msg!(
                    MESSAGES.saga.namespace_already_exists,
                    cluster_id = request.cluster_id.as_str(),
                    namespace = request.namespace.as_str()
                )
            ),
            failure => warn!(outcome = %failure, "namespace creation failed"),
        }
        outcome
    }

    #[instrument(skip(self, site), fields(site = %site.name))]
    async fn grant_viewer_binding(
        &self,
        site: &ClusterSite,
        cluster_id: &str,
        user: &str,
    ) -> OperationOutcome {
        let session = match self.session(site) {
            Ok(session) => session,
            Err(e) => return session_failure(e),
        };

        let path = format!("/kuboard-api/cluster/{cluster_id}/kind/KuboardAuthClusterRoleBinding");
        let outcome = match session
            .post(&path, &ViewerBindingManifest::new(cluster_id, user))
            .await
        {
            Ok((status, body)) => classify_viewer_binding(status, &body),
            Err(e) => classify_transport(&e),
        };

        if outcome.detail().is_some() {
            warn!(outcome = %outcome, "viewer binding failed");
        }
        outcome
    }

    #[instrument(skip(self, site), fields(site = %site.name, cluster_id = %request.cluster_id, namespace = %request.namespace))]
    async fn grant_role_binding(
        &self,
        site: &ClusterSite,
        request: &GrantRequest,
    ) -> OperationOutcome {
        let session = match self.session(site) {
            Ok(session) => session,
            Err(e) => return session_failure(e),
        };

        let path = format!(
            "/k8s-api/{}/apis/rbac.authorization.k8s.io/v1/namespaces/{}/rolebindings",
            request.cluster_id, request.namespace
        );
        let manifest = RoleBindingManifest::new(&request.namespace, &request.user, &request.role);
        let outcome = match session.post(&path, &manifest).await {
            Ok((status, body)) => classify_role_binding(status, &body),
            Err(e) => classify_transport(&e),
        };

        if let OperationOutcome::NotFound(_) = outcome {
            warn!(
                "{}",
                msg!(
                    MESSAGES.saga.namespace_not_found,
                    cluster_id = request.cluster_id.as_str(),
                    namespace = request.namespace.as_str()
                )
            );
        } else if outcome.detail().is_some() {
            warn!(outcome = %outcome, "role binding failed");
        }
        outcome
    }
}
