//! Configuration for the Kuboard saga worker.
//!
//! Loads `config.yaml`, validates it, and resolves cluster identifiers to the
//! Kuboard site that manages them.

pub mod config;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod site;

pub use config::{
    AppConfig, ClusterMapping, KuboardConfig, LoggingConfig, RetryConfig, SiteConfig, WorkerConfig,
};
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use resolver::{ConfigSiteResolver, ResolveError, SiteResolver};
pub use site::{ClusterSite, Credentials};
