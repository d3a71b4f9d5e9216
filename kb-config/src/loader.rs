// Standard library imports
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// External crate imports
use once_cell::sync::OnceCell;
use tracing::{debug, info};

// Internal imports
use crate::config::AppConfig;
use crate::error::{ConfigError, Result};
use kb_messages::{msg, MESSAGES};

/// Default location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "KB_CONFIG";

static GLOBAL_CONFIG: OnceCell<Arc<AppConfig>> = OnceCell::new();

/// A loader responsible for finding and loading `config.yaml`.
///
/// Priority chain:
/// 1. An explicit path handed to [`ConfigLoader::with_path`].
/// 2. The `KB_CONFIG` environment variable.
/// 3. `config/config.yaml` in the current directory.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Creates a new `ConfigLoader`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// The path that [`ConfigLoader::load`] will read.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Loads and validates the configuration.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.resolve_path();
        debug!("Loading config from: {}", path.display());
        Self::load_file(&path)
    }

    /// Loads the configuration once per process. Later calls return the same
    /// instance and ignore the loader's path.
    pub fn load_global(&self) -> Result<Arc<AppConfig>> {
        GLOBAL_CONFIG
            .get_or_try_init(|| self.load().map(Arc::new))
            .cloned()
    }

    /// Loads, deserializes and validates an `AppConfig` from a given file path.
    pub fn load_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&contents).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        let (sites, clusters) = config
            .kuboard
            .as_ref()
            .map(|k| (k.sites.len(), k.clusters.len()))
            .unwrap_or((0, 0));
        info!(
            "{}",
            msg!(
                MESSAGES.config.loaded,
                path = path.display().to_string(),
                sites = sites.to_string(),
                clusters = clusters.to_string()
            )
        );

        Ok(config)
    }

    /// Parses and validates YAML text.
    pub fn parse(contents: &str) -> Result<AppConfig> {
        let config: AppConfig =
            serde_yaml_ng::from_str(contents).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }
}
