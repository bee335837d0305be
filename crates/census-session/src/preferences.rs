//! Best-effort persistence of the last dataset / year / metric choice.

use std::path::{Path, PathBuf};

use census_model::Preferences;
use directories::ProjectDirs;

use crate::config::{APP_NAME, APP_ORG, APP_QUALIFIER};

const PREFERENCES_FILENAME: &str = "census_prefs.json";

/// JSON file holding [`Preferences`].
///
/// Reads and writes never fail the caller: problems are logged and the
/// store behaves as if nothing was saved.
#[derive(Debug, Clone, Default)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
}

impl PreferencesStore {
    /// Store in the platform data directory.
    pub fn default_location() -> Self {
        let path = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.data_dir().join(PREFERENCES_FILENAME));
        if path.is_none() {
            tracing::warn!("could not determine data directory, preferences will not persist");
        }
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A store that remembers nothing.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Option<Preferences> {
        let path = self.path.as_ref()?;
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read preferences");
                return None;
            }
        };
        match serde_json::from_str::<Preferences>(&content) {
            Ok(prefs) if prefs.is_empty() => None,
            Ok(prefs) => Some(prefs),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed preferences");
                None
            }
        }
    }

    pub fn save(&self, prefs: &Preferences) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_json(path, prefs) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save preferences");
        } else {
            tracing::debug!(path = %path.display(), "saved preferences");
        }
    }
}

fn write_json(path: &Path, prefs: &Preferences) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(prefs)?;
    std::fs::write(path, content)
}
