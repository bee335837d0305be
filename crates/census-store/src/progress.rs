//! Progress of the load the user is waiting for.

use std::fmt;

use census_ingest::ParseProgress;
use census_model::{DatasetHandle, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStage {
    #[default]
    Idle,
    Loading,
    Downloading,
    Processing,
    Loaded,
    Failed,
}

/// Snapshot published by the loader for the focused `(dataset, level)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub handle: Option<DatasetHandle>,
    pub level: Level,
    pub stage: LoadStage,
    pub loaded: usize,
    pub total: usize,
    pub percentage: u8,
}

impl LoadProgress {
    pub(crate) fn started(handle: &DatasetHandle, level: Level) -> Self {
        Self {
            handle: Some(handle.clone()),
            level,
            stage: LoadStage::Loading,
            loaded: 0,
            total: 0,
            percentage: 0,
        }
    }

    pub fn is_for(&self, handle: &DatasetHandle, level: Level) -> bool {
        self.level == level && self.handle.as_ref() == Some(handle)
    }

    /// True while a load is running.
    pub fn is_active(&self) -> bool {
        matches!(
            self.stage,
            LoadStage::Loading | LoadStage::Downloading | LoadStage::Processing
        )
    }

    pub(crate) fn apply_parse(&mut self, parse: ParseProgress) {
        self.stage = LoadStage::Processing;
        self.loaded = parse.loaded;
        self.total = parse.total;
        self.percentage = parse.percentage;
    }

    pub(crate) fn finish(&mut self, rows: usize) {
        self.stage = LoadStage::Loaded;
        self.loaded = rows;
        self.total = rows;
        self.percentage = 100;
    }

    /// Human-readable stage, e.g. `Processing Counties...`.
    pub fn message(&self) -> String {
        let plural = self.level.plural();
        match self.stage {
            LoadStage::Idle => String::new(),
            LoadStage::Loading => format!("Loading {plural} data..."),
            LoadStage::Downloading => format!("Downloading {plural}..."),
            LoadStage::Processing => format!("Processing {plural}..."),
            LoadStage::Loaded => format!("{plural} loaded"),
            LoadStage::Failed => format!("Failed to load {plural}"),
        }
    }
}

impl fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.message(), self.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_messages() {
        let handle = DatasetHandle::new("census2024");
        let mut progress = LoadProgress::started(&handle, Level::County);
        assert_eq!(progress.message(), "Loading Counties data...");
        assert!(progress.is_active());
        progress.stage = LoadStage::Downloading;
        assert_eq!(progress.message(), "Downloading Counties...");
        progress.finish(3000);
        assert_eq!(progress.to_string(), "Counties loaded (100%)");
        assert!(!progress.is_active());
        assert!(progress.is_for(&handle, Level::County));
        assert!(!progress.is_for(&handle, Level::Zcta5));
    }
}
