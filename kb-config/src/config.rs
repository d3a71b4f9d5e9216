use crate::error::{ConfigError, Result};
use crate::site::{ClusterSite, Credentials};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Top-level `config.yaml` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub kuboard: Option<KuboardConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KuboardConfig {
    #[serde(default)]
    pub sites: Vec<SiteConfig>,

    /// `cluster_id` to Kuboard site name mapping.
    #[serde(default)]
    pub clusters: Vec<ClusterMapping>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
    pub username: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

impl SiteConfig {
    pub fn to_cluster_site(&self) -> ClusterSite {
        ClusterSite {
            name: self.name.clone(),
            base_url: self.url.trim_end_matches('/').to_string(),
            credentials: Credentials {
                username: self.username.clone(),
                access_key: self.access_key.clone(),
                secret_key: self.secret_key.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMapping {
    pub cluster_id: String,
    pub kuboard_site_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub file: Option<String>,

    /// `human` or `json`
    #[serde(default)]
    pub format: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            format: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_task_queue")]
    pub task_queue: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3130".to_string()
}

fn default_task_queue() -> String {
    "kuboard".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            task_queue: default_task_queue(),
        }
    }
}

/// Retry knobs for every remote call made by the saga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    #[serde(default = "default_backoff_coefficient")]
    pub backoff_coefficient: f64,

    #[serde(default = "default_maximum_interval_ms")]
    pub maximum_interval_ms: u64,

    #[serde(default = "default_maximum_attempts")]
    pub maximum_attempts: u32,

    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_initial_interval_ms() -> u64 {
    1_000
}

fn default_backoff_coefficient() -> f64 {
    2.0
}

fn default_maximum_interval_ms() -> u64 {
    10_000
}

fn default_maximum_attempts() -> u32 {
    3
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            backoff_coefficient: default_backoff_coefficient(),
            maximum_interval_ms: default_maximum_interval_ms(),
            maximum_attempts: default_maximum_attempts(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Check cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if let Some(kuboard) = &self.kuboard {
            kuboard.validate()?;
        }
        self.retry.validate()
    }
}

impl KuboardConfig {
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for site in &self.sites {
            if site.name.trim().is_empty() {
                return Err(ConfigError::Invalid("kuboard site with empty name".into()));
            }
            if !names.insert(site.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate kuboard site '{}'",
                    site.name
                )));
            }
            Url::parse(&site.url).map_err(|e| {
                ConfigError::Invalid(format!(
                    "kuboard site '{}' has invalid url '{}': {e}",
                    site.name, site.url
                ))
            })?;
        }

        for mapping in &self.clusters {
            if mapping.cluster_id.trim().is_empty() || mapping.kuboard_site_name.trim().is_empty()
            {
                return Err(ConfigError::Invalid(
                    "kuboard.clusters entries need both cluster_id and kuboard_site_name".into(),
                ));
            }
        }

        Ok(())
    }

    pub fn site(&self, name: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|site| site.name == name)
    }

    /// First mapping wins when a cluster is listed twice.
    pub fn site_name_for(&self, cluster_id: &str) -> Option<&str> {
        self.clusters
            .iter()
            .find(|m| m.cluster_id == cluster_id)
            .map(|m| m.kuboard_site_name.as_str())
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.maximum_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.maximum_attempts must be at least 1".into(),
            ));
        }
        if self.backoff_coefficient.is_nan() || self.backoff_coefficient < 1.0 {
            return Err(ConfigError::Invalid(
                "retry.backoff_coefficient must be >= 1.0".into(),
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "retry.call_timeout_ms must be at least 1".into(),
            ));
        }
        if self.maximum_interval_ms < self.initial_interval_ms {
            return Err(ConfigError::Invalid(
                "retry.maximum_interval_ms must not be below retry.initial_interval_ms".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, url: &str) -> SiteConfig {
        SiteConfig {
            name: name.to_string(),
            url: url.to_string(),
            username: "admin".to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
        }
    }

    #[test]
    fn test_retry_defaults() {
        let retry = RetryConfig::default();
        assert_eq!(retry.initial_interval_ms, 1_000);
        assert_eq!(retry.maximum_interval_ms, 10_000);
        assert_eq!(retry.maximum_attempts, 3);
        assert_eq!(retry.call_timeout_ms, 30_000);
        assert!(retry.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let retry = RetryConfig {
            maximum_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(retry.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_coefficient_rejected() {
        for coefficient in [0.5, f64::NAN, f64::NEG_INFINITY] {
            let retry = RetryConfig {
                backoff_coefficient: coefficient,
                ..Default::default()
            };
            assert!(
                matches!(retry.validate(), Err(ConfigError::Invalid(_))),
                "{coefficient}"
            );
        }
        let flat = RetryConfig {
            backoff_coefficient: 1.0,
            ..Default::default()
        };
        assert!(flat.validate().is_ok());
    }

    #[test]
    fn test_zero_call_timeout_rejected() {
        let retry = RetryConfig {
            call_timeout_ms: 0,
            ..Default::default()
        };
        let err = retry.validate().unwrap_err();
        assert!(err.to_string().contains("call_timeout_ms"));
    }

    #[test]
    fn test_worker_defaults() {
        let worker = WorkerConfig::default();
        assert_eq!(worker.bind_addr, "0.0.0.0:3130");
        assert_eq!(worker.task_queue, "kuboard");
    }

    #[test]
    fn test_duplicate_site_rejected() {
        let kuboard = KuboardConfig {
            sites: vec![
                site("s1", "https://a.example.com"),
                site("s1", "https://b.example.com"),
            ],
            clusters: vec![],
        };
        let err = kuboard.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let kuboard = KuboardConfig {
            sites: vec![site("s1", "not a url")],
            clusters: vec![],
        };
        assert!(kuboard.validate().is_err());
    }

    #[test]
    fn test_first_cluster_mapping_wins() {
        let kuboard = KuboardConfig {
            sites: vec![],
            clusters: vec![
                ClusterMapping {
                    cluster_id: "c1".into(),
                    kuboard_site_name: "s1".into(),
                },
                ClusterMapping {
                    cluster_id: "c1".into(),
                    kuboard_site_name: "s2".into(),
                },
            ],
        };
        assert_eq!(kuboard.site_name_for("c1"), Some("s1"));
        assert_eq!(kuboard.site_name_for("c2"), None);
    }

    #[test]
    fn test_to_cluster_site_trims_trailing_slash() {
        let site = site("s1", "https://kuboard.example.com/").to_cluster_site();
        assert_eq!(site.base_url, "https://kuboard.example.com");
        assert_eq!(site.credentials.username, "admin");
    }

    #[test]
    fn test_site_debug_hides_secret() {
        let rendered = format!("{:?}", site("s1", "https://a.example.com"));
        assert!(!rendered.contains("\"sk\""));
        assert!(rendered.contains("***"));
    }
}
