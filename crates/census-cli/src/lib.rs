//! CLI library components for the census explorer.

pub mod cli;
pub mod logging;
pub mod render;
