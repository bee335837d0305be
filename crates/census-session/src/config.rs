//! Explorer configuration.
//!
//! Stored as TOML in the platform config directory:
//! - macOS: ~/Library/Application Support/org.census-explorer.Census-Explorer/
//! - Windows: %APPDATA%/census-explorer/Census Explorer/config/
//! - Linux: ~/.config/census-explorer/

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use census_filter::DEFAULT_CAPACITY;
use census_ingest::{Fetcher, FsFetcher};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

pub(crate) const APP_QUALIFIER: &str = "org";
pub(crate) const APP_ORG: &str = "census-explorer";
pub(crate) const APP_NAME: &str = "Census Explorer";
const CONFIG_FILENAME: &str = "config.toml";

/// Explorer settings, every section optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub data: DataConfig,
    pub filters: FilterConfig,
    pub loading: LoadingConfig,
}

/// Where dataset resources are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `data/` with the manifest and per-level tables.
    pub root: PathBuf,
    /// Deployment sub-path prepended to every resource path.
    pub base_prefix: String,
    /// Serve resources from this URL instead of `root`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            base_prefix: "/".to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Quiet period before filter edits are applied, in milliseconds.
    pub debounce_ms: u64,
    /// Number of remembered filter results.
    pub cache_capacity: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            cache_capacity: DEFAULT_CAPACITY.get(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Load the next level in the background after each drill-down.
    pub prefetch: bool,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self { prefetch: true }
    }
}

impl ExplorerConfig {
    /// Default config file location, `None` when no home directory is known.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// Load from the default location, falling back to defaults on any
    /// problem.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("could not determine config path, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(ExplorerError::ConfigRead { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load from `path`; unlike [`load`](Self::load) errors are returned.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ExplorerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ExplorerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|source| ExplorerError::ConfigSerialize { source })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.filters.debounce_ms)
    }

    /// Result cache capacity; zero falls back to the default.
    pub fn cache_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.filters.cache_capacity).unwrap_or(DEFAULT_CAPACITY)
    }

    /// Fetcher for the configured data location.
    pub fn data_source(&self) -> Result<DataSource> {
        #[cfg(feature = "http")]
        if let Some(url) = &self.data.base_url {
            let fetcher = census_ingest::HttpFetcher::new(url.as_str())
                .map_err(|source| ExplorerError::DataSource { source })?;
            return Ok(DataSource::Http(fetcher));
        }
        #[cfg(not(feature = "http"))]
        if let Some(url) = &self.data.base_url {
            tracing::warn!(%url, "built without HTTP support, reading from data.root instead");
        }
        Ok(DataSource::Fs(
            FsFetcher::new(&self.data.root).with_base_prefix(&self.data.base_prefix),
        ))
    }
}

/// The fetcher selected by [`ExplorerConfig::data_source`].
#[derive(Debug)]
pub enum DataSource {
    Fs(FsFetcher),
    #[cfg(feature = "http")]
    Http(census_ingest::HttpFetcher),
}

impl Fetcher for DataSource {
    async fn fetch_text(&self, path: &str) -> census_ingest::Result<String> {
        match self {
            Self::Fs(fetcher) => fetcher.fetch_text(path).await,
            #[cfg(feature = "http")]
            Self::Http(fetcher) => fetcher.fetch_text(path).await,
        }
    }

    fn location(&self) -> String {
        match self {
            Self::Fs(fetcher) => fetcher.location(),
            #[cfg(feature = "http")]
            Self::Http(fetcher) => fetcher.location(),
        }
    }
}
