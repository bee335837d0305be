//! Dataset handles and the dataset manifest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::format_dataset_name;
use crate::level::Level;

/// Location of the manifest resource, relative to the data root.
pub const MANIFEST_PATH: &str = "data/manifest.json";

/// Names a family of three per-level tables (`{handle}_{level}.csv`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetHandle(String);

impl DatasetHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive a handle from a manifest filename by dropping the `.csv` suffix.
    pub fn from_filename(filename: &str) -> Self {
        let trimmed = filename.trim();
        Self(trimmed.strip_suffix(".csv").unwrap_or(trimmed).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Relative resource path of the table for `level`.
    pub fn resource_path(&self, level: Level) -> String {
        format!("data/{}_{}.csv", self.0, level.as_str())
    }

    /// Human-readable name derived from the handle.
    pub fn display_name(&self) -> String {
        format_dataset_name(&self.0)
    }
}

impl fmt::Display for DatasetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetHandle {
    fn from(value: &str) -> Self {
        Self::from_filename(value)
    }
}

/// One dataset listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Source filename, e.g. `census2024.csv`.
    #[serde(alias = "file")]
    pub filename: String,
    /// Optional display name; derived from the filename when absent.
    #[serde(default, alias = "label")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DatasetEntry {
    pub fn handle(&self) -> DatasetHandle {
        DatasetHandle::from_filename(&self.filename)
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format_dataset_name(&self.filename))
    }
}

/// Catalog of available datasets, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
}

impl Manifest {
    pub fn handles(&self) -> Vec<DatasetHandle> {
        self.datasets.iter().map(DatasetEntry::handle).collect()
    }

    pub fn find(&self, handle: &DatasetHandle) -> Option<&DatasetEntry> {
        self.datasets.iter().find(|entry| &entry.handle() == handle)
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_from_filename() {
        let handle = DatasetHandle::from_filename("census2024.csv");
        assert_eq!(handle.as_str(), "census2024");
        assert_eq!(
            handle.resource_path(Level::Zcta5),
            "data/census2024_zcta5.csv"
        );
    }

    #[test]
    fn test_manifest_lookup() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"datasets":[{"filename":"acs_income.csv"},{"file":"census2024.csv","name":"Census 2024"}]}"#,
        )
        .unwrap();
        assert_eq!(manifest.datasets.len(), 2);
        assert_eq!(manifest.datasets[0].display_name(), "Acs Income");
        let entry = manifest.find(&DatasetHandle::new("census2024")).unwrap();
        assert_eq!(entry.display_name(), "Census 2024");
    }
}
