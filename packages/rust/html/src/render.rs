//! Render a [`NavTree`] as nav list markup or as a Markdown list.

use html_escape::{encode_double_quoted_attribute, encode_text};
use sitekit_shared::{NavEntry, NavTree, TocConfig};

/// CSS classes put on the generated nav elements. Empty strings omit the
/// `class` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavClasses {
    /// Nested `<ul>`.
    pub list: String,
    /// `<li>`.
    pub item: String,
    /// `<a>`.
    pub link: String,
}

impl Default for NavClasses {
    fn default() -> Self {
        Self::from(&TocConfig::default())
    }
}

impl From<&TocConfig> for NavClasses {
    fn from(config: &TocConfig) -> Self {
        Self {
            list: config.list_class.clone(),
            item: config.item_class.clone(),
            link: config.link_class.clone(),
        }
    }
}

/// Render the tree as a run of `<li>` items, one per line, ready to be
/// appended into the nav container. Children nest in `<ul>` elements.
pub fn render_nav_list(tree: &NavTree, classes: &NavClasses) -> String {
    let mut out = String::new();
    for entry in &tree.entries {
        render_item(entry, classes, &mut out);
        out.push('\n');
    }
    out
}

fn render_item(entry: &NavEntry, classes: &NavClasses, out: &mut String) {
    out.push_str("<li");
    push_class(out, &classes.item);
    out.push_str("><a href=\"");
    out.push_str(&encode_double_quoted_attribute(&entry.href));
    out.push('"');
    push_class(out, &classes.link);
    out.push('>');
    out.push_str(&encode_text(&entry.label));
    out.push_str("</a>");

    if !entry.children.is_empty() {
        out.push_str("<ul");
        push_class(out, &classes.list);
        out.push('>');
        for child in &entry.children {
            render_item(child, classes, out);
        }
        out.push_str("</ul>");
    }

    out.push_str("</li>");
}

fn push_class(out: &mut String, class: &str) {
    if !class.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&encode_double_quoted_attribute(class));
        out.push('"');
    }
}

/// Render the tree as a nested Markdown bullet list of fragment links.
pub fn render_markdown_list(tree: &NavTree) -> String {
    let mut out = String::new();
    for entry in &tree.entries {
        render_markdown_item(entry, 0, &mut out);
    }
    out
}

fn render_markdown_item(entry: &NavEntry, depth: usize, out: &mut String) {
    let label = entry.label.replace('[', "\\[").replace(']', "\\]");
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("- [{label}]({})\n", entry.href));
    for child in &entry.children {
        render_markdown_item(child, depth + 1, out);
    }
}
