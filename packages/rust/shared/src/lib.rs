//! Shared types, error model, and configuration for sitekit.
//!
//! This crate is the foundation depended on by all other sitekit crates.
//! It provides:
//! - [`SitekitError`] — the unified error type
//! - Domain types ([`HeadingNode`], [`NavEntry`], [`NavTree`], [`SearchIndex`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnchorStrategy, AppConfig, SearchConfig, StarsConfig, TocConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, SitekitError};
pub use types::{
    HeadingNode, MAX_HEADING_LEVEL, MIN_HEADING_LEVEL, NavEntry, NavTree, SearchDoc,
    SearchIndex, SearchIndexConfig,
};
