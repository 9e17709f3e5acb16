//! Term matching over a loaded search index.

use regex::Regex;
use scraper::Html;
use serde_json::json;
use tracing::debug;

use sitekit_shared::{Result, SearchDoc, SearchIndex, SitekitError};

/// Weight of a term occurrence in a page title relative to its body.
const TITLE_WEIGHT: usize = 10;

/// One matching page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Site-relative page location.
    pub location: String,
    /// Page title.
    pub title: String,
    /// Weighted count of term occurrences.
    pub score: usize,
}

impl SearchHit {
    /// JSON form used by the CLI's `--json` output.
    pub fn to_json(&self) -> serde_json::Value {
        json!({ "location": self.location, "title": self.title, "score": self.score })
    }
}

/// Find the pages matching `query`.
///
/// The query is split with the index's separator regex and lowercased; terms
/// shorter than the index's `min_search_length` are dropped. Hits are ordered
/// by score, then location.
pub fn search(index: &SearchIndex, query: &str) -> Result<Vec<SearchHit>> {
    let separator = Regex::new(&index.config.separator).map_err(|e| {
        SitekitError::parse(format!(
            "index separator '{}' is not a valid regex: {e}",
            index.config.separator
        ))
    })?;

    let mut terms: Vec<String> = separator
        .split(query)
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() >= index.config.min_search_length)
        .collect();
    terms.sort();
    terms.dedup();

    if terms.is_empty() {
        debug!(query, "no usable search terms");
        return Ok(Vec::new());
    }

    let mut hits: Vec<SearchHit> = index
        .docs
        .iter()
        .filter_map(|doc| {
            let score = score_doc(doc, &terms);
            (score > 0).then(|| SearchHit {
                location: doc.location.clone(),
                title: doc.title.clone(),
                score,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.location.cmp(&b.location)));
    debug!(?terms, hits = hits.len(), "search complete");
    Ok(hits)
}

fn score_doc(doc: &SearchDoc, terms: &[String]) -> usize {
    let title = doc.title.to_lowercase();
    let body = plain_text(&doc.text).to_lowercase();

    terms
        .iter()
        .map(|term| {
            title.matches(term.as_str()).count() * TITLE_WEIGHT
                + body.matches(term.as_str()).count()
        })
        .sum()
}

/// Text content of an HTML fragment, tags dropped.
fn plain_text(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitekit_shared::SearchConfig;

    use crate::builder::index_config;

    fn doc(location: &str, title: &str, text: &str) -> SearchDoc {
        SearchDoc {
            location: location.into(),
            title: title.into(),
            text: text.into(),
        }
    }

    fn index() -> SearchIndex {
        SearchIndex {
            config: index_config(&SearchConfig::default()),
            docs: vec![
                doc("", "Home", "<p>Kart is a static site generator.</p>"),
                doc("install/", "Install", "<p>Install kart with pip. Then install themes.</p>"),
                doc("themes/", "Themes", "<p class=\"install\">Pick a theme.</p>"),
            ],
        }
    }

    #[test]
    fn title_matches_outrank_body_matches() {
        let hits = search(&index(), "install").unwrap();
        let locations: Vec<&str> = hits.iter().map(|h| h.location.as_str()).collect();
        assert_eq!(locations, vec!["install/"]);
        assert_eq!(hits[0].score, TITLE_WEIGHT + 2);
    }

    #[test]
    fn markup_is_not_searched() {
        // "install" only appears as a class attribute on the themes page.
        let hits = search(&index(), "install").unwrap();
        assert!(hits.iter().all(|h| h.location != "themes/"));
    }

    #[test]
    fn separator_splits_query_terms() {
        let hits = search(&index(), "static-site").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Home");
        assert_eq!(hits[0].score, 2);
    }

    #[test]
    fn short_terms_are_ignored() {
        assert!(search(&index(), "is a").unwrap().is_empty());
    }

    #[test]
    fn ties_are_ordered_by_location() {
        let hits = search(&index(), "kart").unwrap();
        let locations: Vec<&str> = hits.iter().map(|h| h.location.as_str()).collect();
        assert_eq!(locations, vec!["", "install/"]);
    }

    #[test]
    fn invalid_separator_is_a_parse_error() {
        let mut index = index();
        index.config.separator = "(".into();
        assert!(search(&index, "kart").is_err());
    }

    #[test]
    fn hit_json_shape() {
        let hit = SearchHit {
            location: "install/".into(),
            title: "Install".into(),
            score: 3,
        };
        assert_eq!(
            hit.to_json(),
            serde_json::json!({"location": "install/", "title": "Install", "score": 3})
        );
    }
}
