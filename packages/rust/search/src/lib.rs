//! Client-side search index support.
//!
//! The index uses the lunr/mkdocs `search_index.json` layout: a `config`
//! object and one `docs` entry per rendered page.
//! - [`builder`] — scans a rendered site and writes the index
//! - [`loader`] — reads an index from disk or over HTTP
//! - [`query`] — term matching over a loaded index

pub mod builder;
pub mod loader;
pub mod query;

pub use builder::{build_index, index_config, write_index};
pub use loader::{IndexSource, load_index};
pub use query::{SearchHit, search};
