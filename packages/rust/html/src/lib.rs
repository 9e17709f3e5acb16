//! HTML page adapter for sitekit.
//!
//! Reads headings out of a rendered page, writes anchor ids back into it, and
//! attaches generated navigation markup:
//! - [`HtmlPage`] — heading extraction and streaming edits of the page source
//! - [`render`] — nav list and Markdown list rendering of a
//!   [`NavTree`](sitekit_shared::NavTree)
//! - [`toc`] — the page-level TOC pass tying both to the heading hierarchy builder

pub mod page;
pub mod render;
pub mod toc;

pub use page::HtmlPage;
pub use render::{NavClasses, render_markdown_list, render_nav_list};
pub use toc::{TocOutcome, build_page_toc, generate_toc, page_assigner};
