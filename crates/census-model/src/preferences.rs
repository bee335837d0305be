//! Persisted user preferences.

use serde::{Deserialize, Serialize};

/// The last dataset / year / metric choice, restored on the next start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub dataset: Option<String>,
    pub year: Option<String>,
    pub metric: Option<String>,
}

impl Preferences {
    pub fn is_empty(&self) -> bool {
        self.dataset.is_none() && self.year.is_none() && self.metric.is_none()
    }
}
