//! Heading hierarchy building for sitekit.
//!
//! - [`toc`] — builds a nested [`NavTree`](sitekit_shared::NavTree) from page headings
//! - [`anchor`] — injected anchor id minting strategies

pub mod anchor;
pub mod toc;

pub use anchor::{AnchorIdAssigner, CounterAssigner, SlugAssigner, assigner_for, slugify};
pub use toc::build_nav_tree;
