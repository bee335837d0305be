//! Explorer session for the census explorer.
//!
//! [`Explorer`] is the single context object of an exploring session:
//! dataset / year / metric selection with rollback, the drill-down
//! navigation state machine, debounced filter application and sorting.
//! [`ExplorerConfig`] and [`PreferencesStore`] persist settings between
//! runs.

mod config;
mod debounce;
mod error;
mod events;
mod explorer;
mod preferences;

pub use config::{DataConfig, DataSource, ExplorerConfig, FilterConfig, LoadingConfig};
pub use debounce::Debouncer;
pub use error::{ExplorerError, Result};
pub use events::ExplorerEvent;
pub use explorer::{CompareYear, Comparison, Explorer, Selection};
pub use preferences::PreferencesStore;
