//! Cluster identifier to Kuboard site resolution.

use crate::config::KuboardConfig;
use crate::site::ClusterSite;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, instrument};

/// Why a cluster could not be mapped to a site. Never transient: a missing
/// mapping is a static configuration problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No kuboard cluster mapping found in configuration")]
    NoKuboardSection,

    #[error("No kuboard_site_name mapping found for cluster_id '{0}'")]
    MappingNotFound(String),

    #[error("Cluster '{cluster_id}' maps to kuboard site '{site}', which is not configured")]
    SiteNotFound { cluster_id: String, site: String },
}

impl ResolveError {
    pub fn cluster_id(&self) -> Option<&str> {
        match self {
            Self::NoKuboardSection => None,
            Self::MappingNotFound(cluster_id) => Some(cluster_id),
            Self::SiteNotFound { cluster_id, .. } => Some(cluster_id),
        }
    }
}

pub trait SiteResolver: Send + Sync {
    fn resolve(&self, cluster_id: &str) -> Result<ClusterSite, ResolveError>;
}

/// Resolves against a loaded [`KuboardConfig`], memoizing hits for the life of
/// the resolver. Misses are not cached.
#[derive(Debug, Default)]
pub struct ConfigSiteResolver {
    kuboard: Option<KuboardConfig>,
    cache: RwLock<HashMap<String, ClusterSite>>,
}

impl ConfigSiteResolver {
    pub fn new(kuboard: Option<KuboardConfig>) -> Self {
        Self {
            kuboard,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn lookup(&self, cluster_id: &str) -> Result<ClusterSite, ResolveError> {
        let kuboard = self
            .kuboard
            .as_ref()
            .filter(|k| !k.clusters.is_empty())
            .ok_or(ResolveError::NoKuboardSection)?;

        let site_name = kuboard
            .site_name_for(cluster_id)
            .ok_or_else(|| ResolveError::MappingNotFound(cluster_id.to_string()))?;

        kuboard
            .site(site_name)
            .map(|site| site.to_cluster_site())
            .ok_or_else(|| ResolveError::SiteNotFound {
                cluster_id: cluster_id.to_string(),
                site: site_name.to_string(),
            })
    }
}

impl SiteResolver for ConfigSiteResolver {
    #[instrument(skip(self))]
    fn resolve(&self, cluster_id: &str) -> Result<ClusterSite, ResolveError> {
        if let Ok(cache) = self.cache.read() {
            if let Some(site) = cache.get(cluster_id) {
                return Ok(site.clone());
            }
        }

        let site = self.lookup(cluster_id)?;
        debug!(site = %site.name, "resolved kuboard site");

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(cluster_id.to_string(), site.clone());
        }
        Ok(site)
    }
}
