//! Explorer error types.
//!
//! Every failure carries a user-facing message and, where one exists, a
//! hint on how to resolve it.

use std::path::PathBuf;

use census_ingest::IngestError;
use census_model::{DatasetHandle, ModelError};
use census_store::{LoadError, LoadFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    // === Loading Errors ===
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to load the dataset manifest")]
    Manifest {
        #[source]
        source: IngestError,
    },

    // === Selection Errors ===
    #[error("no dataset is selected")]
    NoDataset,

    #[error("dataset '{handle}' is not listed in the manifest")]
    UnknownDataset { handle: DatasetHandle },

    #[error("dataset '{handle}' has no year columns")]
    NoYears { handle: DatasetHandle },

    #[error("year {year} is not available")]
    UnknownYear { year: String },

    #[error("metric '{metric}' is not available for {year}")]
    UnknownMetric { metric: String, year: String },

    // === Navigation Errors ===
    #[error(transparent)]
    Navigation(#[from] ModelError),

    // === Configuration Errors ===
    #[error("failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration")]
    ConfigSerialize {
        #[source]
        source: toml::ser::Error,
    },

    #[cfg(feature = "http")]
    #[error("failed to set up the HTTP data source")]
    DataSource {
        #[source]
        source: IngestError,
    },
}

impl ExplorerError {
    /// A message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Load(err) => format!(
                "Could not load {} data for {}: {}",
                err.level(),
                err.handle().display_name(),
                failure_text(err.reason())
            ),
            Self::Manifest { .. } => "The list of available datasets could not be loaded.".into(),
            Self::NoDataset => "Select a dataset first.".into(),
            Self::UnknownDataset { handle } => {
                format!("There is no dataset named '{handle}'.")
            }
            Self::NoYears { handle } => format!(
                "The dataset {} has no year-specific columns to display.",
                handle.display_name()
            ),
            Self::UnknownYear { year } => format!("No data is available for {year}."),
            Self::UnknownMetric { metric, year } => {
                format!("The metric '{metric}' is not available for {year}.")
            }
            Self::Navigation(err) => format!("That view is not reachable from here ({err})."),
            Self::ConfigRead { path, .. } => {
                format!("Could not read the config file at {}", path.display())
            }
            Self::ConfigParse { path, source } => format!(
                "The config file at {} is not valid: {}",
                path.display(),
                source.message()
            ),
            Self::ConfigSerialize { .. } => "Could not write out the configuration.".into(),
            #[cfg(feature = "http")]
            Self::DataSource { .. } => "Could not connect to the data server.".into(),
        }
    }

    /// How the user might resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Load(err) => match err.reason() {
                LoadFailure::NotFound => Some(format!(
                    "Check that '{}' exists under the data directory.",
                    err.handle().resource_path(err.level())
                )),
                LoadFailure::Network => {
                    Some("Check your connection or the data directory permissions.".into())
                }
                LoadFailure::EmptyPayload | LoadFailure::NoData => {
                    Some("Regenerate the data file; it contains no rows.".into())
                }
                LoadFailure::ParseFailure => {
                    Some("Make sure the file is a comma-separated table with a header row.".into())
                }
                LoadFailure::Interrupted => Some("Try loading the data again.".into()),
            },
            Self::Manifest { .. } => {
                Some("Check that data/manifest.json exists and is valid JSON.".into())
            }
            Self::NoDataset | Self::UnknownDataset { .. } => {
                Some("Run the `datasets` command to list available datasets.".into())
            }
            Self::NoYears { .. } => {
                Some("Metric columns must end in a four-digit year, e.g. median_income_2023.".into())
            }
            Self::UnknownYear { .. } | Self::UnknownMetric { .. } => {
                Some("Pick one of the listed years and metrics.".into())
            }
            Self::Navigation(_) => None,
            Self::ConfigRead { .. } => Some("Check the path passed with --config.".into()),
            Self::ConfigParse { .. } => Some("Fix the TOML syntax or delete the file to use defaults.".into()),
            Self::ConfigSerialize { .. } => None,
            #[cfg(feature = "http")]
            Self::DataSource { .. } => Some("Check the data.base_url setting.".into()),
        }
    }
}

fn failure_text(reason: LoadFailure) -> &'static str {
    match reason {
        LoadFailure::NotFound => "the file was not found",
        LoadFailure::Network => "the file could not be read",
        LoadFailure::EmptyPayload => "the file is empty",
        LoadFailure::NoData => "the file has no data rows",
        LoadFailure::ParseFailure => "the file is malformed",
        LoadFailure::Interrupted => "loading was interrupted",
    }
}

/// Result type for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
