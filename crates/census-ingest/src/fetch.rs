//! Resource fetching.
//!
//! Resources are addressed by relative paths such as
//! `data/census2024_state.csv`. Every fetcher resolves them against a base
//! prefix (the deployment sub-path) before reading.

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{IngestError, Result};

/// Source of raw resource text.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch the text of the resource at `path`.
    ///
    /// A missing resource fails with [`IngestError::NotFound`]; transport
    /// failures with [`IngestError::Network`] or [`IngestError::Read`].
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String>> + Send;

    /// Where resources come from, for log messages.
    fn location(&self) -> String;
}

/// Join a base prefix and a relative path with exactly one `/` between them.
///
/// `resolve_path("/app", "/data/x.csv")` is `/app/data/x.csv`.
pub fn resolve_path(base_prefix: &str, path: &str) -> String {
    let base = if base_prefix.ends_with('/') {
        base_prefix.to_string()
    } else {
        format!("{base_prefix}/")
    };
    format!("{base}{}", path.trim_start_matches('/'))
}

/// Reject an empty body.
pub fn ensure_payload(path: &str, text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(IngestError::EmptyPayload {
            path: path.to_string(),
        });
    }
    Ok(text)
}

/// Reads resources from a local directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
    base_prefix: String,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_prefix: "/".to_string(),
        }
    }

    /// Resolve every path below `prefix` inside the root directory.
    pub fn with_base_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.base_prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of the resource at `path`.
    pub fn path_for(&self, path: &str) -> PathBuf {
        let resolved = resolve_path(&self.base_prefix, path);
        self.root.join(resolved.trim_start_matches('/'))
    }
}

impl Fetcher for FsFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let full = self.path_for(path);
        tracing::debug!(path = %full.display(), "reading resource");
        tokio::fs::read_to_string(&full).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                IngestError::NotFound {
                    path: path.to_string(),
                }
            } else {
                IngestError::Read {
                    path: full.clone(),
                    source: e,
                }
            }
        })
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

/// Serves resources from memory and counts fetches per path.
///
/// Useful for embedding small datasets and for exercising loaders without
/// touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, (String, AtomicUsize)>,
    misses: AtomicUsize,
    latency: Option<Duration>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.resources
            .insert(path.into(), (text.into(), AtomicUsize::new(0)));
        self
    }

    /// Delay every fetch by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of fetches of `path` so far (including failed ones).
    pub fn fetch_count(&self, path: &str) -> usize {
        match self.resources.get(path) {
            Some((_, count)) => count.load(Ordering::SeqCst),
            None => self.misses.load(Ordering::SeqCst),
        }
    }

    /// Number of fetches of every path so far.
    pub fn total_fetches(&self) -> usize {
        self.resources
            .values()
            .map(|(_, count)| count.load(Ordering::SeqCst))
            .sum::<usize>()
            + self.misses.load(Ordering::SeqCst)
    }
}

impl Fetcher for MemoryFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.resources.get(path) {
            Some((text, count)) => {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(text.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                Err(IngestError::NotFound {
                    path: path.to_string(),
                })
            }
        }
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use reqwest::StatusCode;

    use super::{Fetcher, resolve_path};
    use crate::error::{IngestError, Result};

    /// Fetches resources over HTTP(S) below a base URL.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: reqwest::Client,
        base_url: String,
    }

    impl HttpFetcher {
        pub fn new(base_url: impl Into<String>) -> Result<Self> {
            let base_url = base_url.into();
            let client = reqwest::Client::builder()
                .build()
                .map_err(|e| IngestError::Network {
                    path: base_url.clone(),
                    message: format!("failed to create HTTP client: {e}"),
                })?;
            Ok(Self { client, base_url })
        }

        fn url_for(&self, path: &str) -> String {
            resolve_path(&self.base_url, path)
        }
    }

    impl Fetcher for HttpFetcher {
        async fn fetch_text(&self, path: &str) -> Result<String> {
            let url = self.url_for(path);
            tracing::debug!(%url, "fetching resource");
            let network = |message: String| IngestError::Network {
                path: path.to_string(),
                message,
            };

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| network(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(IngestError::NotFound {
                    path: path.to_string(),
                });
            }
            if !status.is_success() {
                return Err(network(format!("HTTP {status} from {url}")));
            }
            response.text().await.map_err(|e| network(e.to_string()))
        }

        fn location(&self) -> String {
            self.base_url.clone()
        }
    }
}
