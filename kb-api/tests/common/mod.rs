//! Common test utilities for kb-api tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kb_api::{create_app, AppState};
use kb_config::{ClusterMapping, ConfigSiteResolver, KuboardConfig, SiteConfig};
use kb_orchestrator::{NamespaceSaga, RetryPolicy};
use kb_provider::mock::ScriptedKuboard;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub fn kuboard_config() -> KuboardConfig {
    KuboardConfig {
        sites: vec![SiteConfig {
            name: "s1".into(),
            url: "http://kuboard.test".into(),
            username: "admin".into(),
            access_key: "ak".into(),
            secret_key: "sk".into(),
        }],
        clusters: vec![ClusterMapping {
            cluster_id: "c1".into(),
            kuboard_site_name: "s1".into(),
        }],
    }
}

/// Millisecond backoff so exhausted retries finish quickly.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        initial_interval: Duration::from_millis(1),
        maximum_interval: Duration::from_millis(5),
        ..RetryPolicy::default()
    }
}

pub fn create_test_state(api: Arc<ScriptedKuboard>) -> AppState {
    let saga = NamespaceSaga::new(
        Arc::new(ConfigSiteResolver::new(Some(kuboard_config()))),
        api,
        fast_policy(),
    );
    AppState::new(saga, "kuboard")
}

pub fn create_test_app(api: Arc<ScriptedKuboard>) -> Router {
    create_app(create_test_state(api))
}

pub async fn post_workflow(
    app: Router,
    procedure: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/workflows/{procedure}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json_body(response).await)
}

/// Extract JSON body from response
pub async fn extract_json_body<T>(response: axum::response::Response) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}
