//! Row storage and level loading for the census explorer.
//!
//! - [`DatasetCache`]: process-wide memo of loaded `(dataset, level)` tables
//! - [`RowStore`]: the active dataset's tables with navigation scoping
//! - [`LevelLoader`]: fetch + parse with a per-key in-flight guard, focused
//!   progress reporting and speculative prefetch

mod cache;
mod error;
mod loader;
mod progress;
mod rows;

pub use cache::{CacheKey, DatasetCache};
pub use error::{LoadError, LoadFailure, Result};
pub use loader::LevelLoader;
pub use progress::{LoadProgress, LoadStage};
pub use rows::RowStore;
