//! Core domain types shared across sitekit crates.

use serde::{Deserialize, Serialize};

/// Shallowest heading rank a document format offers (`<h1>`).
pub const MIN_HEADING_LEVEL: u8 = 1;

/// Deepest heading rank a document format offers (`<h6>`).
pub const MAX_HEADING_LEVEL: u8 = 6;

// ---------------------------------------------------------------------------
// HeadingNode
// ---------------------------------------------------------------------------

/// One document heading, as read from a page in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingNode {
    /// Heading rank (2 for `<h2>`, 3 for `<h3>`, ...).
    pub level: u8,
    /// Display text.
    pub text: String,
    /// Stable anchor identifier. Filled in by the TOC builder when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<String>,
}

impl HeadingNode {
    /// A heading with no anchor id yet.
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            anchor_id: None,
        }
    }

    /// A heading that already carries an anchor id.
    pub fn with_anchor(level: u8, text: impl Into<String>, anchor_id: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            anchor_id: Some(anchor_id.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// NavEntry / NavTree
// ---------------------------------------------------------------------------

/// A single entry in a generated navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    /// Link text, copied from the heading.
    pub label: String,
    /// Fragment reference (`#<anchor_id>`).
    pub href: String,
    /// Nested entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    /// A leaf entry pointing at `anchor_id`.
    pub fn new(label: impl Into<String>, anchor_id: &str) -> Self {
        Self {
            label: label.into(),
            href: format!("#{anchor_id}"),
            children: Vec::new(),
        }
    }

    /// Depth of the subtree rooted here (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(NavEntry::depth).max().unwrap_or(0)
    }

    /// Number of entries in the subtree rooted here, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NavEntry::count).sum::<usize>()
    }
}

/// Root of a navigation tree. Owns every entry beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTree {
    /// Top-level entries.
    pub entries: Vec<NavEntry>,
}

impl NavTree {
    /// `true` when the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deepest nesting below the root (0 for an empty tree).
    pub fn depth(&self) -> usize {
        self.entries.iter().map(NavEntry::depth).max().unwrap_or(0)
    }

    /// Total number of entries at every level.
    pub fn count(&self) -> usize {
        self.entries.iter().map(NavEntry::count).sum()
    }
}

// ---------------------------------------------------------------------------
// Search index
// ---------------------------------------------------------------------------

/// Root structure of `search_index.json` (lunr / mkdocs layout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndex {
    /// Settings the index was built with.
    pub config: SearchIndexConfig,
    /// Indexed pages.
    pub docs: Vec<SearchDoc>,
}

/// `config` object embedded in the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndexConfig {
    /// Indexing mode (`full`).
    pub indexing: String,
    /// Languages.
    pub lang: Vec<String>,
    /// Shortest query term considered.
    pub min_search_length: usize,
    /// Whether a prebuilt lunr index ships alongside the docs.
    #[serde(default)]
    pub prebuild_index: bool,
    /// Regex separating terms.
    pub separator: String,
}

/// One indexed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDoc {
    /// Site-relative location (`""` for the root, `guide/install/` otherwise).
    pub location: String,
    /// Page content HTML.
    pub text: String,
    /// Page title.
    pub title: String,
}
