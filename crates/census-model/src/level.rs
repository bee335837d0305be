//! Geographic granularity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Drill-down depth, strictly ordered `State < County < Zcta5`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    State,
    County,
    Zcta5,
}

impl Level {
    /// All levels, widest first.
    pub const ALL: [Level; 3] = [Self::State, Self::County, Self::Zcta5];

    /// Identifier used in resource names (`state`, `county`, `zcta5`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::County => "county",
            Self::Zcta5 => "zcta5",
        }
    }

    /// Display name of the level.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::State => "State Level",
            Self::County => "County Level",
            Self::Zcta5 => "ZIP Code Level",
        }
    }

    /// Plural noun for the rows of this level, used in progress stages.
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::State => "States",
            Self::County => "Counties",
            Self::Zcta5 => "ZIP Codes",
        }
    }

    /// The next finer level, if any.
    pub const fn child(&self) -> Option<Level> {
        match self {
            Self::State => Some(Self::County),
            Self::County => Some(Self::Zcta5),
            Self::Zcta5 => None,
        }
    }

    /// The next wider level, if any.
    pub const fn parent(&self) -> Option<Level> {
        match self {
            Self::State => None,
            Self::County => Some(Self::State),
            Self::Zcta5 => Some(Self::County),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state" => Ok(Self::State),
            "county" => Ok(Self::County),
            "zcta5" | "zcta" | "zip" => Ok(Self::Zcta5),
            _ => Err(ModelError::UnknownLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::State < Level::County);
        assert!(Level::County < Level::Zcta5);
        assert_eq!(Level::State.child(), Some(Level::County));
        assert_eq!(Level::Zcta5.parent(), Some(Level::County));
        assert_eq!(Level::Zcta5.child(), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("County".parse::<Level>().unwrap(), Level::County);
        assert_eq!("zcta5".parse::<Level>().unwrap(), Level::Zcta5);
        assert!(matches!(
            "tract".parse::<Level>(),
            Err(ModelError::UnknownLevel(_))
        ));
    }
}
