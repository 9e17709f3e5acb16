//! Application configuration for sitekit.
//!
//! User config lives at `~/.sitekit/sitekit.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SitekitError};
use crate::types::{MAX_HEADING_LEVEL, MIN_HEADING_LEVEL};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitekit.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitekit";

// ---------------------------------------------------------------------------
// Config structs (matching sitekit.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Table-of-contents generation.
    #[serde(default)]
    pub toc: TocConfig,

    /// Star-count widgets.
    #[serde(default)]
    pub stars: StarsConfig,

    /// Search index building and loading.
    #[serde(default)]
    pub search: SearchConfig,
}

impl AppConfig {
    /// Reject values that would make the tools misbehave.
    pub fn validate(&self) -> Result<()> {
        let toc = &self.toc;
        if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(&toc.min_level) {
            return Err(SitekitError::config(format!(
                "toc.min_level must be between {MIN_HEADING_LEVEL} and {MAX_HEADING_LEVEL}, got {}",
                toc.min_level
            )));
        }
        if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(&toc.max_level) {
            return Err(SitekitError::config(format!(
                "toc.max_level must be between {MIN_HEADING_LEVEL} and {MAX_HEADING_LEVEL}, got {}",
                toc.max_level
            )));
        }
        if toc.min_level > toc.max_level {
            return Err(SitekitError::config(format!(
                "toc.min_level ({}) is greater than toc.max_level ({})",
                toc.min_level, toc.max_level
            )));
        }
        if toc.container_id.trim().is_empty() {
            return Err(SitekitError::config("toc.container_id must not be empty"));
        }

        if let Some(repo) = &self.stars.github_repo {
            validate_github_repo(repo)?;
        }

        if self.search.min_search_length == 0 {
            return Err(SitekitError::config(
                "search.min_search_length must be at least 1",
            ));
        }
        Regex::new(&self.search.separator).map_err(|e| {
            SitekitError::config(format!("search.separator is not a valid regex: {e}"))
        })?;

        Ok(())
    }
}

/// How anchor ids are minted for headings that lack one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnchorStrategy {
    /// `toc1`, `toc2`, ... in document order.
    #[default]
    Counter,
    /// Slug of the heading text, de-duplicated within the document.
    Slug,
}

/// `[toc]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocConfig {
    /// Rank of the headings that hang directly off the nav root.
    #[serde(default = "default_min_level")]
    pub min_level: u8,

    /// Deepest heading rank collected from the page.
    #[serde(default = "default_max_level")]
    pub max_level: u8,

    /// Id of the element the nav list is appended to.
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// Prefix for counter-minted anchor ids.
    #[serde(default = "default_anchor_prefix")]
    pub anchor_prefix: String,

    /// Anchor id minting strategy.
    #[serde(default)]
    pub anchor_strategy: AnchorStrategy,

    /// Class on nested `<ul>` elements.
    #[serde(default = "default_list_class")]
    pub list_class: String,

    /// Class on `<li>` elements.
    #[serde(default = "default_item_class")]
    pub item_class: String,

    /// Class on `<a>` elements.
    #[serde(default = "default_link_class")]
    pub link_class: String,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_level: default_min_level(),
            max_level: default_max_level(),
            container_id: default_container_id(),
            anchor_prefix: default_anchor_prefix(),
            anchor_strategy: AnchorStrategy::default(),
            list_class: default_list_class(),
            item_class: default_item_class(),
            link_class: default_link_class(),
        }
    }
}

fn default_min_level() -> u8 {
    2
}
fn default_max_level() -> u8 {
    MAX_HEADING_LEVEL
}
fn default_container_id() -> String {
    "toc".into()
}
fn default_anchor_prefix() -> String {
    "toc".into()
}
fn default_list_class() -> String {
    "md-nav__list".into()
}
fn default_item_class() -> String {
    "md-nav__item".into()
}
fn default_link_class() -> String {
    "md-nav__link".into()
}

/// `[stars]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarsConfig {
    /// GitHub repository as `owner/name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,

    /// GitLab project id or `namespace/path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab_project: Option<String>,

    /// GitHub REST API base URL.
    #[serde(default = "default_github_api")]
    pub github_api: String,

    /// GitLab instance base URL.
    #[serde(default = "default_gitlab_api")]
    pub gitlab_api: String,

    /// Id of the element(s) receiving the GitHub count.
    #[serde(default = "default_github_element_id")]
    pub github_element_id: String,

    /// Id of the element(s) receiving the GitLab count.
    #[serde(default = "default_gitlab_element_id")]
    pub gitlab_element_id: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            github_repo: None,
            gitlab_project: None,
            github_api: default_github_api(),
            gitlab_api: default_gitlab_api(),
            github_element_id: default_github_element_id(),
            gitlab_element_id: default_gitlab_element_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_github_api() -> String {
    "https://api.github.com".into()
}
fn default_gitlab_api() -> String {
    "https://gitlab.com".into()
}
fn default_github_element_id() -> String {
    "github".into()
}
fn default_gitlab_element_id() -> String {
    "gitlab".into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Rendered site directory scanned for `*.html` pages.
    #[serde(default = "default_site_dir")]
    pub site_dir: String,

    /// Index output path, relative to `site_dir` unless absolute.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// CSS selector of the element holding a page's searchable content.
    #[serde(default = "default_content_selector")]
    pub content_selector: String,

    /// Indexing mode recorded in the index config.
    #[serde(default = "default_indexing")]
    pub indexing: String,

    /// Search languages.
    #[serde(default = "default_lang")]
    pub lang: Vec<String>,

    /// Query terms shorter than this are ignored.
    #[serde(default = "default_min_search_length")]
    pub min_search_length: usize,

    /// Regex splitting queries into terms.
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site_dir: default_site_dir(),
            index_path: default_index_path(),
            content_selector: default_content_selector(),
            indexing: default_indexing(),
            lang: default_lang(),
            min_search_length: default_min_search_length(),
            separator: default_separator(),
        }
    }
}

fn default_site_dir() -> String {
    "public".into()
}
fn default_index_path() -> String {
    "search/search_index.json".into()
}
fn default_content_selector() -> String {
    ".content".into()
}
fn default_indexing() -> String {
    "full".into()
}
fn default_lang() -> Vec<String> {
    vec!["en".into()]
}
fn default_min_search_length() -> usize {
    3
}
fn default_separator() -> String {
    r"[\s\-]+".into()
}

/// Check a GitHub `owner/name` slug.
fn validate_github_repo(repo: &str) -> Result<()> {
    static REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*/[A-Za-z0-9._-]+$").expect("valid regex")
    });

    if REPO_RE.is_match(repo) {
        Ok(())
    } else {
        Err(SitekitError::config(format!(
            "stars.github_repo must look like 'owner/name', got '{repo}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitekit/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SitekitError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitekit/sitekit.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SitekitError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SitekitError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SitekitError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SitekitError::Serialization(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SitekitError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("container_id"));
        assert!(toml_str.contains("md-nav__list"));
        assert!(toml_str.contains("https://api.github.com"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.toc.min_level, 2);
        assert_eq!(parsed.toc.anchor_prefix, "toc");
        assert_eq!(parsed.search.min_search_length, 3);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn config_with_overrides() {
        let toml_str = r#"
[toc]
min_level = 3
anchor_strategy = "slug"

[stars]
github_repo = "hasbaiSB/kart"
gitlab_project = "25466570"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.toc.min_level, 3);
        assert_eq!(config.toc.max_level, 6);
        assert_eq!(config.toc.anchor_strategy, AnchorStrategy::Slug);
        assert_eq!(config.stars.gitlab_project.as_deref(), Some("25466570"));
        assert_eq!(config.stars.github_api, "https://api.github.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_levels() {
        let mut config = AppConfig::default();
        config.toc.min_level = 5;
        config.toc.max_level = 3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("greater than"));
    }

    #[test]
    fn validate_rejects_out_of_range_level() {
        let mut config = AppConfig::default();
        config.toc.min_level = 0;
        assert!(config.validate().is_err());

        config.toc.min_level = 2;
        config.toc.max_level = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_github_repo() {
        let mut config = AppConfig::default();
        config.stars.github_repo = Some("not a repo".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("owner/name"));
    }

    #[test]
    fn validate_rejects_bad_separator() {
        let mut config = AppConfig::default();
        config.search.separator = "[unclosed".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn anchor_strategy_value_names() {
        use clap::ValueEnum;
        assert_eq!(
            AnchorStrategy::from_str("counter", false).unwrap(),
            AnchorStrategy::Counter
        );
        assert_eq!(AnchorStrategy::from_str("SLUG", true).unwrap(), AnchorStrategy::Slug);
        assert!(AnchorStrategy::from_str("random", true).is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sitekit.toml");
        std::fs::write(&path, "[toc]\ncontainer_id = \"nav\"\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.toc.container_id, "nav");
    }

    #[test]
    fn load_config_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sitekit.toml");
        std::fs::write(&path, "[toc]\ncontainer_id = \"  \"\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("container_id"));
    }
}
