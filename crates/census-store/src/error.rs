//! Error types for level loading.

use census_ingest::{IngestError, IngestErrorKind};
use census_model::{DatasetHandle, Level};
use thiserror::Error;

/// Why a level load failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadFailure {
    NotFound,
    Network,
    EmptyPayload,
    NoData,
    ParseFailure,
    /// The background parse task panicked or was cancelled.
    Interrupted,
}

impl From<IngestErrorKind> for LoadFailure {
    fn from(kind: IngestErrorKind) -> Self {
        match kind {
            IngestErrorKind::NotFound => Self::NotFound,
            IngestErrorKind::Network => Self::Network,
            IngestErrorKind::EmptyPayload => Self::EmptyPayload,
            IngestErrorKind::NoData => Self::NoData,
            IngestErrorKind::ParseFailure | IngestErrorKind::Manifest => Self::ParseFailure,
        }
    }
}

/// A failed load of one `(dataset, level)` table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load {level} data for '{handle}': {source}")]
    Ingest {
        handle: DatasetHandle,
        level: Level,
        #[source]
        source: IngestError,
    },

    #[error("loading {level} data for '{handle}' was interrupted: {message}")]
    Interrupted {
        handle: DatasetHandle,
        level: Level,
        message: String,
    },
}

impl LoadError {
    pub(crate) fn ingest(handle: &DatasetHandle, level: Level, source: IngestError) -> Self {
        Self::Ingest {
            handle: handle.clone(),
            level,
            source,
        }
    }

    pub fn handle(&self) -> &DatasetHandle {
        match self {
            Self::Ingest { handle, .. } | Self::Interrupted { handle, .. } => handle,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Self::Ingest { level, .. } | Self::Interrupted { level, .. } => *level,
        }
    }

    pub fn reason(&self) -> LoadFailure {
        match self {
            Self::Ingest { source, .. } => source.kind().into(),
            Self::Interrupted { .. } => LoadFailure::Interrupted,
        }
    }
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
