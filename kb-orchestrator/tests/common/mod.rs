//! Shared fixtures: a config-backed resolver, saga wiring and re-exports of
//! the stub Kuboard panel.

#![allow(dead_code)]

use kb_config::{ClusterMapping, ConfigSiteResolver, KuboardConfig, SiteConfig};
use kb_orchestrator::{NamespaceSaga, RetryPolicy};
use kb_provider::{GrantRequest, KuboardApi};
use std::sync::Arc;

pub use kb_provider::stub::{start, NAMESPACES, ROLEBINDINGS, VIEWER};

/// Kuboard config with site `s1` at `url` and cluster `c1` mapped to it.
pub fn kuboard_config(url: &str) -> KuboardConfig {
    KuboardConfig {
        sites: vec![SiteConfig {
            name: "s1".into(),
            url: url.into(),
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

pub fn saga_with(api: Arc<dyn KuboardApi>, url: &str) -> NamespaceSaga {
    NamespaceSaga::new(
        Arc::new(ConfigSiteResolver::new(Some(kuboard_config(url)))),
        api,
        RetryPolicy::default(),
    )
}

pub fn grant(cluster_id: &str, role: &str) -> GrantRequest {
    GrantRequest::new(cluster_id, "ns1", "alice", role)
}
