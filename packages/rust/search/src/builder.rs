//! Build `search_index.json` from a rendered site directory.

use std::path::Path;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use sitekit_shared::{
    Result, SearchConfig, SearchDoc, SearchIndex, SearchIndexConfig, SitekitError,
};

/// The `config` block recorded in an index built with `config`.
pub fn index_config(config: &SearchConfig) -> SearchIndexConfig {
    SearchIndexConfig {
        indexing: config.indexing.clone(),
        lang: config.lang.clone(),
        min_search_length: config.min_search_length,
        prebuild_index: false,
        separator: config.separator.clone(),
    }
}

/// Scan every `*.html` file under `site_dir` and index its content element.
///
/// Pages are visited in path order so the output is stable. Each page's
/// location is its directory relative to `site_dir` (`""` for the root,
/// `guide/install/` otherwise). Pages without a `config.content_selector`
/// element are skipped.
#[instrument(skip(config), fields(site_dir = %site_dir.display()))]
pub fn build_index(site_dir: &Path, config: &SearchConfig) -> Result<SearchIndex> {
    if !site_dir.is_dir() {
        return Err(SitekitError::validation(format!(
            "site directory {} does not exist",
            site_dir.display()
        )));
    }

    let content_sel = Selector::parse(&config.content_selector).map_err(|e| {
        SitekitError::config(format!(
            "invalid content selector '{}': {e}",
            config.content_selector
        ))
    })?;
    let title_sel = Selector::parse("title")
        .map_err(|e| SitekitError::parse(format!("invalid title selector: {e}")))?;

    let mut docs = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(site_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(site_dir).to_path_buf();
            SitekitError::io(path, std::io::Error::other(e.to_string()))
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some("html")
        {
            continue;
        }

        let source = std::fs::read_to_string(path).map_err(|e| SitekitError::io(path, e))?;
        let doc = Html::parse_document(&source);

        let Some(content) = doc.select(&content_sel).next() else {
            warn!(
                path = %path.display(),
                selector = %config.content_selector,
                "no content element, skipping page"
            );
            skipped += 1;
            continue;
        };

        let title = doc
            .select(&title_sel)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let location = page_location(site_dir, path);
        debug!(%location, %title, "indexed page");

        docs.push(SearchDoc {
            location,
            text: content.html(),
            title,
        });
    }

    info!(pages = docs.len(), skipped, "search index built");

    Ok(SearchIndex {
        config: index_config(config),
        docs,
    })
}

/// Write `index` as JSON to `path`, creating parent directories.
pub fn write_index(index: &SearchIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SitekitError::io(parent, e))?;
    }

    let json = serde_json::to_string(index)
        .map_err(|e| SitekitError::Serialization(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| SitekitError::io(path, e))?;

    info!(path = %path.display(), docs = index.docs.len(), "search index written");
    Ok(())
}

/// Directory of `page` relative to `site_dir`, `/`-separated with a trailing slash.
fn page_location(site_dir: &Path, page: &Path) -> String {
    let Some(dir) = page.parent().and_then(|p| p.strip_prefix(site_dir).ok()) else {
        return String::new();
    };

    let segments: Vec<String> = dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if segments.is_empty() {
        String::new()
    } else {
        format!("{}/", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn page(title: &str, body: &str) -> String {
        format!(
            "<html><head><title>{title}</title></head>\
             <body><nav>menu</nav><div class=\"content\">{body}</div></body></html>"
        )
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join("index.html"), page("Home", "<p>Welcome to Kart</p>")).unwrap();
        fs::create_dir_all(root.join("docs/install")).unwrap();
        fs::write(
            root.join("docs/install/index.html"),
            page("Install", "<h2>Install</h2><p>pip install kart</p>"),
        )
        .unwrap();
        fs::write(root.join("docs/style.css"), "body {}").unwrap();
        fs::write(
            root.join("docs/raw.html"),
            "<html><head><title>Raw</title></head><body>no content</body></html>",
        )
        .unwrap();
        dir
    }

    #[test]
    fn builds_docs_with_locations() {
        let dir = site();
        let index = build_index(dir.path(), &SearchConfig::default()).unwrap();

        assert_eq!(index.docs.len(), 2);
        // Sorted by file name: docs/ comes before index.html
        assert_eq!(index.docs[0].location, "docs/install/");
        assert_eq!(index.docs[0].title, "Install");
        assert!(index.docs[0].text.starts_with("<div class=\"content\">"));
        assert!(index.docs[0].text.contains("pip install kart"));

        assert_eq!(index.docs[1].location, "");
        assert_eq!(index.docs[1].title, "Home");
        assert!(!index.docs[1].text.contains("menu"));
    }

    #[test]
    fn index_config_mirrors_search_config() {
        let dir = site();
        let index = build_index(dir.path(), &SearchConfig::default()).unwrap();
        assert_eq!(index.config.indexing, "full");
        assert_eq!(index.config.lang, vec!["en".to_string()]);
        assert_eq!(index.config.min_search_length, 3);
        assert!(!index.config.prebuild_index);
        assert_eq!(index.config.separator, r"[\s\-]+");
    }

    #[test]
    fn custom_content_selector() {
        let dir = site();
        let config = SearchConfig {
            content_selector: "body".into(),
            ..SearchConfig::default()
        };
        let index = build_index(dir.path(), &config).unwrap();
        assert_eq!(index.docs.len(), 3);
    }

    #[test]
    fn missing_site_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_index(&dir.path().join("public"), &SearchConfig::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn write_index_creates_parents() {
        let dir = site();
        let index = build_index(dir.path(), &SearchConfig::default()).unwrap();
        let out = dir.path().join("search/search_index.json");
        write_index(&index, &out).unwrap();

        let raw = fs::read_to_string(&out).unwrap();
        let parsed: SearchIndex = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.docs.len(), 2);
    }

    #[test]
    fn page_location_formats() {
        let root = Path::new("/site");
        assert_eq!(page_location(root, Path::new("/site/index.html")), "");
        assert_eq!(page_location(root, Path::new("/site/a/b/index.html")), "a/b/");
    }
}
