//! Drill-down position.

use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::level::Level;

const NATIONAL_LABEL: &str = "United States";

/// Where the user is in the state → county → zcta5 hierarchy.
///
/// Fields are private: every constructor and transition keeps
/// `state` set whenever the level is below `State`, and `county` set
/// exactly when the level is `Zcta5`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct NavigationState {
    level: Level,
    state: Option<String>,
    county: Option<String>,
}

impl NavigationState {
    /// National view (state level, nothing selected).
    pub fn national() -> Self {
        Self::default()
    }

    /// County level inside `state`.
    pub fn in_state(state: impl Into<String>) -> Self {
        Self {
            level: Level::County,
            state: Some(state.into()),
            county: None,
        }
    }

    /// ZCTA level inside `county` of `state`.
    pub fn in_county(state: impl Into<String>, county: impl Into<String>) -> Self {
        Self {
            level: Level::Zcta5,
            state: Some(state.into()),
            county: Some(county.into()),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn current_state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn current_county(&self) -> Option<&str> {
        self.county.as_deref()
    }

    /// `state → county`, selecting `state`.
    pub fn drill_to_state(&self, state: impl Into<String>) -> Result<Self> {
        match self.level {
            Level::State => Ok(Self::in_state(state)),
            level => Err(ModelError::InvalidTransition {
                action: "drill into a state",
                level,
            }),
        }
    }

    /// `county → zcta5`, selecting `county` inside the current state.
    pub fn drill_to_county(&self, county: impl Into<String>) -> Result<Self> {
        match (self.level, &self.state) {
            (Level::County, Some(state)) => Ok(Self::in_county(state.clone(), county)),
            (level, _) => Err(ModelError::InvalidTransition {
                action: "drill into a county",
                level,
            }),
        }
    }

    /// One level wider; `None` at the national view.
    pub fn back(&self) -> Option<Self> {
        match (self.level, &self.state) {
            (Level::Zcta5, Some(state)) => Some(Self::in_state(state.clone())),
            (Level::State, _) => None,
            _ => Some(Self::national()),
        }
    }

    /// Human-readable location of the current view.
    pub fn breadcrumb(&self) -> String {
        match (self.level, &self.state, &self.county) {
            (Level::Zcta5, Some(state), Some(county)) => format!("{county}, {state}"),
            (Level::County, Some(state), _) => state.clone(),
            _ => NATIONAL_LABEL.to_string(),
        }
    }
}
