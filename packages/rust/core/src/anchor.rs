//! Anchor id minting for headings that arrive without an `id`.
//!
//! Assigners are injected into [`crate::toc::build_nav_tree`] rather than
//! living as ambient state. Create one per document so counters and slug
//! de-duplication never leak between pages.

use std::collections::HashMap;

use sitekit_shared::HeadingNode;
use sitekit_shared::config::AnchorStrategy;

/// Mints a fresh, unique-within-document id for a heading.
pub trait AnchorIdAssigner {
    /// Produce an id for `heading`, which has no `anchor_id` yet.
    fn assign(&mut self, heading: &HeadingNode) -> String;
}

impl<F> AnchorIdAssigner for F
where
    F: FnMut(&HeadingNode) -> String,
{
    fn assign(&mut self, heading: &HeadingNode) -> String {
        self(heading)
    }
}

// ---------------------------------------------------------------------------
// CounterAssigner
// ---------------------------------------------------------------------------

/// `toc1`, `toc2`, ... in the order headings are visited.
#[derive(Debug, Clone)]
pub struct CounterAssigner {
    prefix: String,
    issued: u32,
}

impl CounterAssigner {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }

    /// Number of ids minted so far.
    pub fn issued(&self) -> u32 {
        self.issued
    }
}

impl Default for CounterAssigner {
    fn default() -> Self {
        Self::new("toc")
    }
}

impl AnchorIdAssigner for CounterAssigner {
    fn assign(&mut self, _heading: &HeadingNode) -> String {
        self.issued += 1;
        format!("{}{}", self.prefix, self.issued)
    }
}

// ---------------------------------------------------------------------------
// SlugAssigner
// ---------------------------------------------------------------------------

/// Slug of the heading text, suffixed `-1`, `-2`, ... on repeats.
///
/// Headings whose text yields an empty slug (punctuation only, for example)
/// fall back to a counter id so every heading still gets a target.
#[derive(Debug, Clone)]
pub struct SlugAssigner {
    seen: HashMap<String, u32>,
    fallback: CounterAssigner,
}

impl SlugAssigner {
    pub fn new(fallback_prefix: impl Into<String>) -> Self {
        Self {
            seen: HashMap::new(),
            fallback: CounterAssigner::new(fallback_prefix),
        }
    }

    /// Tell the assigner about ids already present in the document so minted
    /// slugs never collide with them.
    pub fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }
}

impl Default for SlugAssigner {
    fn default() -> Self {
        Self::new("toc")
    }
}

impl AnchorIdAssigner for SlugAssigner {
    fn assign(&mut self, heading: &HeadingNode) -> String {
        let base = slugify(&heading.text);
        if base.is_empty() {
            return self.fallback.assign(heading);
        }

        let mut repeats = match self.seen.get(&base) {
            Some(&n) => n,
            None => {
                self.seen.insert(base.clone(), 0);
                return base;
            }
        };

        // Skip suffixed forms already taken by earlier headings.
        loop {
            repeats += 1;
            let candidate = format!("{base}-{repeats}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(base, repeats);
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

/// Build the assigner selected by configuration.
///
/// `reserved` lists ids already present in the document. The slug strategy
/// steers clear of them; counter ids follow document order regardless.
pub fn assigner_for<'a>(
    strategy: AnchorStrategy,
    prefix: &str,
    reserved: impl IntoIterator<Item = &'a str>,
) -> Box<dyn AnchorIdAssigner> {
    match strategy {
        AnchorStrategy::Counter => Box::new(CounterAssigner::new(prefix)),
        AnchorStrategy::Slug => {
            let mut assigner = SlugAssigner::new(prefix);
            for id in reserved {
                assigner.reserve(id);
            }
            Box::new(assigner)
        }
    }
}

/// Generate a URL-safe slug from heading text.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_starts_at_one() {
        let mut assigner = CounterAssigner::default();
        let heading = HeadingNode::new(2, "Intro");
        assert_eq!(assigner.assign(&heading), "toc1");
        assert_eq!(assigner.assign(&heading), "toc2");
        assert_eq!(assigner.issued(), 2);
    }

    #[test]
    fn counter_is_scoped_per_instance() {
        let heading = HeadingNode::new(2, "Intro");
        let mut first = CounterAssigner::new("sec");
        first.assign(&heading);
        first.assign(&heading);

        let mut second = CounterAssigner::new("sec");
        assert_eq!(second.assign(&heading), "sec1");
    }

    #[test]
    fn closures_are_assigners() {
        let mut calls = 0;
        let mut stub = |h: &HeadingNode| {
            calls += 1;
            format!("stub-{}", h.level)
        };
        assert_eq!(stub.assign(&HeadingNode::new(3, "x")), "stub-3");
        drop(stub);
        assert_eq!(calls, 1);
    }

    #[test]
    fn slug_assigner_deduplicates() {
        let mut assigner = SlugAssigner::default();
        assert_eq!(assigner.assign(&HeadingNode::new(2, "Getting Started")), "getting-started");
        assert_eq!(assigner.assign(&HeadingNode::new(3, "Getting started")), "getting-started-1");
        assert_eq!(assigner.assign(&HeadingNode::new(3, "Getting  Started!")), "getting-started-2");
    }

    #[test]
    fn slug_assigner_skips_taken_suffixes() {
        let mut assigner = SlugAssigner::default();
        assert_eq!(assigner.assign(&HeadingNode::new(2, "Setup 1")), "setup-1");
        assert_eq!(assigner.assign(&HeadingNode::new(2, "Setup")), "setup");
        assert_eq!(assigner.assign(&HeadingNode::new(2, "Setup")), "setup-2");
    }

    #[test]
    fn slug_assigner_respects_reserved_ids() {
        let mut assigner = SlugAssigner::default();
        assigner.reserve("usage");
        assert_eq!(assigner.assign(&HeadingNode::new(2, "Usage")), "usage-1");
    }

    #[test]
    fn slug_assigner_falls_back_on_empty_slug() {
        let mut assigner = SlugAssigner::new("h");
        assert_eq!(assigner.assign(&HeadingNode::new(2, "???")), "h1");
    }

    #[test]
    fn assigner_for_strategy() {
        let heading = HeadingNode::new(2, "API Reference");
        let none: [&str; 0] = [];
        let mut counter = assigner_for(AnchorStrategy::Counter, "toc", none);
        assert_eq!(counter.assign(&heading), "toc1");
        let mut slug = assigner_for(AnchorStrategy::Slug, "toc", none);
        assert_eq!(slug.assign(&heading), "api-reference");
    }

    #[test]
    fn assigner_for_reserves_ids_for_slugs() {
        let heading = HeadingNode::new(2, "Install");
        let mut slug = assigner_for(AnchorStrategy::Slug, "toc", ["install"]);
        assert_eq!(slug.assign(&heading), "install-1");

        let mut counter = assigner_for(AnchorStrategy::Counter, "toc", ["toc1"]);
        assert_eq!(counter.assign(&heading), "toc1");
    }

    #[test]
    fn slugify_handles_common_patterns() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  API_Reference (v2) "), "api-reference-v2");
        assert_eq!(slugify("--"), "");
    }
}
