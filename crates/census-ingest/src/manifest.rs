//! Dataset manifest loading.

use census_model::{MANIFEST_PATH, Manifest};

use crate::error::{IngestError, Result};
use crate::fetch::{Fetcher, ensure_payload};

/// Fetch and parse the manifest at [`MANIFEST_PATH`].
pub async fn load_manifest<F: Fetcher>(fetcher: &F) -> Result<Manifest> {
    let text = fetcher.fetch_text(MANIFEST_PATH).await?;
    let text = ensure_payload(MANIFEST_PATH, text)?;
    let manifest = parse_manifest(&text)?;
    tracing::info!(
        datasets = manifest.datasets.len(),
        source = %fetcher.location(),
        "loaded dataset manifest"
    );
    Ok(manifest)
}

/// Parse manifest JSON.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    serde_json::from_str(text).map_err(|source| IngestError::Manifest {
        path: MANIFEST_PATH.to_string(),
        source,
    })
}
