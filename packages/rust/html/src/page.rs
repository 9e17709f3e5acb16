//! An HTML page that headings are read from and nav markup is written into.
//!
//! Both reading and writing stream the page through `lol_html`, so the
//! headings that are extracted are exactly the tags that later receive ids,
//! and everything the handlers do not touch comes out byte-for-byte as it
//! went in. Raw-text elements (`<script>`, `<iframe>`, `<xmp>`, ...) and
//! comments are tokenized the way a browser does, never as markup.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lol_html::html_content::ContentType;
use lol_html::{ElementContentHandlers, RewriteStrSettings, Selector, element, rewrite_str, text};
use tracing::{debug, instrument, warn};

use sitekit_shared::{HeadingNode, MAX_HEADING_LEVEL, MIN_HEADING_LEVEL, Result, SitekitError};

/// Raw HTML page source with heading extraction and streaming edits.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    source: String,
}

/// How an element carrying a given id is laid out in the source.
#[derive(Debug, Clone, Copy)]
struct ElementShape {
    /// Not a void element and not written as `<tag />`.
    can_have_content: bool,
    /// The source has a matching end tag (it is not implied by the parser).
    explicit_end: bool,
}

impl HtmlPage {
    /// Wrap page source. Parsing is lazy; nothing here can fail.
    pub fn parse(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The current page source, including any edits.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Collect `<h{min_level}>` through `<h{max_level}>` elements in document order.
    ///
    /// Heading text has entities decoded and whitespace normalised. An empty
    /// `id` attribute counts as no id at all.
    #[instrument(skip(self))]
    pub fn headings(&self, min_level: u8, max_level: u8) -> Result<Vec<HeadingNode>> {
        let levels = heading_levels(min_level, max_level)?;
        let found: RefCell<Vec<(HeadingNode, String)>> = RefCell::new(Vec::new());

        let mut handlers = Vec::new();
        for level in levels {
            let tag = format!("h{level}");
            let found = &found;
            handlers.push(element!(tag.as_str(), move |el| {
                let anchor_id = el.get_attribute("id").filter(|id| !id.trim().is_empty());
                found.borrow_mut().push((
                    HeadingNode {
                        level,
                        text: String::new(),
                        anchor_id,
                    },
                    String::new(),
                ));
                Ok(())
            }));
            handlers.push(text!(tag.as_str(), move |chunk| {
                if let Some((_, raw)) = found.borrow_mut().last_mut() {
                    raw.push_str(chunk.as_str());
                }
                Ok(())
            }));
        }
        rewrite(&self.source, handlers)?;

        let headings: Vec<HeadingNode> = found
            .into_inner()
            .into_iter()
            .map(|(mut heading, raw)| {
                heading.text = html_escape::decode_html_entities(&raw)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                heading
            })
            .collect();

        debug!(count = headings.len(), "headings extracted");
        Ok(headings)
    }

    /// Write heading anchor ids back into the page's heading start tags.
    ///
    /// `headings` is the list returned by [`HtmlPage::headings`] for the same
    /// level range, after the TOC builder has filled in missing ids; the n-th
    /// heading tag takes the n-th entry. Tags that already carry a non-empty
    /// `id` are left alone. Returns the number of tags rewritten.
    #[instrument(skip(self, headings), fields(headings = headings.len()))]
    pub fn apply_anchor_ids(
        &mut self,
        headings: &[HeadingNode],
        min_level: u8,
        max_level: u8,
    ) -> Result<usize> {
        let levels = heading_levels(min_level, max_level)?;
        let seen = Cell::new(0usize);
        let written = Cell::new(0usize);

        let mut handlers = Vec::new();
        for level in levels {
            let tag = format!("h{level}");
            let (seen, written) = (&seen, &written);
            handlers.push(element!(tag.as_str(), move |el| {
                let index = seen.get();
                seen.set(index + 1);

                let Some(id) = headings.get(index).and_then(|h| h.anchor_id.as_deref()) else {
                    return Ok(());
                };
                if el.get_attribute("id").is_some_and(|existing| !existing.trim().is_empty()) {
                    return Ok(());
                }
                el.set_attribute("id", id)?;
                written.set(written.get() + 1);
                Ok(())
            }));
        }
        self.source = rewrite(&self.source, handlers)?;

        if seen.get() != headings.len() {
            warn!(
                tags = seen.get(),
                headings = headings.len(),
                "heading list does not match the page, extra entries ignored"
            );
        }
        debug!(written = written.get(), "anchor ids written to heading tags");
        Ok(written.get())
    }

    /// Append `markup` as the last children of every element whose `id` is `id`.
    ///
    /// An element whose end tag is implied rather than written gets the
    /// markup right after its start tag instead. Returns the number of
    /// elements updated. No matching element, or a match that cannot hold
    /// children, is a validation error.
    #[instrument(skip(self, markup), fields(markup_len = markup.len()))]
    pub fn append_to_element(&mut self, id: &str, markup: &str) -> Result<usize> {
        let selector = id_selector(id)?;
        let shapes = self.element_shapes(&selector)?;
        if shapes.is_empty() {
            return Err(SitekitError::validation(format!(
                "no element with id \"{id}\" in the page"
            )));
        }
        if shapes.iter().any(|shape| !shape.can_have_content) {
            return Err(SitekitError::validation(format!(
                "element with id \"{id}\" cannot hold content"
            )));
        }

        let index = Cell::new(0usize);
        let handler = element!(selector.as_str(), |el| {
            let i = index.get();
            index.set(i + 1);
            if shapes.get(i).is_some_and(|shape| shape.explicit_end) {
                el.append(markup, ContentType::Html);
            } else {
                debug!(id, "end tag is implied, inserting after the start tag");
                el.prepend(markup, ContentType::Html);
            }
            Ok(())
        });
        self.source = rewrite(&self.source, vec![handler])?;

        Ok(shapes.len())
    }

    /// Replace the content of every element whose `id` is `id` with `text`.
    ///
    /// Elements whose end tag is implied keep their content and get `text`
    /// in front of it, since their extent is unknown to a streaming pass.
    /// Returns the number of elements updated (possibly zero).
    #[instrument(skip(self, text))]
    pub fn set_element_text(&mut self, id: &str, text: &str) -> Result<usize> {
        let selector = id_selector(id)?;
        let shapes = self.element_shapes(&selector)?;
        if shapes.is_empty() {
            return Ok(0);
        }

        let index = Cell::new(0usize);
        let updated = Cell::new(0usize);
        let handler = element!(selector.as_str(), |el| {
            let i = index.get();
            index.set(i + 1);
            let Some(shape) = shapes.get(i) else {
                return Ok(());
            };
            if !shape.can_have_content {
                debug!(id, tag = %el.tag_name(), "element cannot hold text, skipping");
                return Ok(());
            }
            if shape.explicit_end {
                el.set_inner_content(text, ContentType::Text);
            } else {
                warn!(id, "end tag is implied, keeping the old content");
                el.prepend(text, ContentType::Text);
            }
            updated.set(updated.get() + 1);
            Ok(())
        });
        self.source = rewrite(&self.source, vec![handler])?;

        Ok(updated.get())
    }

    /// Shapes of the elements matching `selector`, in document order.
    fn element_shapes(&self, selector: &str) -> Result<Vec<ElementShape>> {
        let shapes: Rc<RefCell<Vec<ElementShape>>> = Rc::default();
        let found = Rc::clone(&shapes);

        let handler = element!(selector, move |el| {
            let index = {
                let mut shapes = found.borrow_mut();
                shapes.push(ElementShape {
                    can_have_content: el.can_have_content(),
                    explicit_end: false,
                });
                shapes.len() - 1
            };
            if let Some(end_handlers) = el.end_tag_handlers() {
                let found = Rc::clone(&found);
                let end_handler: lol_html::EndTagHandler<'static> = Box::new(move |_end| {
                    if let Some(shape) = found.borrow_mut().get_mut(index) {
                        shape.explicit_end = true;
                    }
                    Ok(())
                });
                end_handlers.push(end_handler);
            }
            Ok(())
        });
        rewrite(&self.source, vec![handler])?;

        Ok(shapes.take())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rewrite<'h, 's>(
    source: &str,
    handlers: Vec<(Cow<'s, Selector>, ElementContentHandlers<'h>)>,
) -> Result<String> {
    rewrite_str(
        source,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| SitekitError::parse(format!("failed to rewrite page: {e}")))
}

fn heading_levels(min_level: u8, max_level: u8) -> Result<std::ops::RangeInclusive<u8>> {
    let valid = MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL;
    if !valid.contains(&min_level) || !valid.contains(&max_level) || min_level > max_level {
        return Err(SitekitError::validation(format!(
            "invalid heading range h{min_level}..h{max_level}"
        )));
    }
    Ok(min_level..=max_level)
}

/// Attribute selector for `id`, checked to parse.
fn id_selector(id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(SitekitError::validation("element id must not be empty"));
    }
    let selector = format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""));
    selector
        .parse::<Selector>()
        .map_err(|e| SitekitError::validation(format!("invalid element id \"{id}\": {e}")))?;
    Ok(selector)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
