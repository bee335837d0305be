//! Error types for census data ingestion.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure category of an ingestion error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestErrorKind {
    /// Resource missing.
    NotFound,
    /// Transport or read failure.
    Network,
    /// Resource fetched but its body is empty.
    EmptyPayload,
    /// Content parsed but produced zero rows.
    NoData,
    /// Malformed tabular content.
    ParseFailure,
    /// Manifest unreadable or malformed.
    Manifest,
}

impl IngestErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::Network => "network error",
            Self::EmptyPayload => "empty payload",
            Self::NoData => "no data",
            Self::ParseFailure => "parse failure",
            Self::Manifest => "invalid manifest",
        }
    }
}

impl fmt::Display for IngestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while fetching or parsing resources.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Fetch Errors ===
    /// Resource does not exist.
    #[error("resource not found: {path}")]
    NotFound { path: String },

    /// Failed to read a local resource.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure or non-success response.
    #[error("failed to fetch {path}: {message}")]
    Network { path: String, message: String },

    /// Resource body is empty.
    #[error("resource is empty: {path}")]
    EmptyPayload { path: String },

    // === Parse Errors ===
    /// CSV text has no header row or is blank.
    #[error("CSV text is empty")]
    EmptyText,

    /// Malformed CSV record.
    #[error("malformed CSV at line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Header parsed but no data rows followed.
    #[error("no data rows parsed ({lines} non-blank lines)")]
    NoData { lines: usize },

    // === Manifest Errors ===
    /// Manifest JSON is malformed.
    #[error("invalid manifest {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    /// Failure category of this error.
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            Self::NotFound { .. } => IngestErrorKind::NotFound,
            Self::Read { .. } | Self::Network { .. } => IngestErrorKind::Network,
            Self::EmptyPayload { .. } | Self::EmptyText => IngestErrorKind::EmptyPayload,
            Self::Parse { .. } => IngestErrorKind::ParseFailure,
            Self::NoData { .. } => IngestErrorKind::NoData,
            Self::Manifest { .. } => IngestErrorKind::Manifest,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::NotFound {
            path: "data/census2024_state.csv".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "resource not found: data/census2024_state.csv"
        );
        assert_eq!(err.kind(), IngestErrorKind::NotFound);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(IngestError::EmptyText.kind(), IngestErrorKind::EmptyPayload);
        assert_eq!(
            IngestError::NoData { lines: 1 }.kind(),
            IngestErrorKind::NoData
        );
        let read = IngestError::Read {
            path: PathBuf::from("x.csv"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(read.kind(), IngestErrorKind::Network);
        assert_eq!(IngestErrorKind::ParseFailure.to_string(), "parse failure");
    }
}
