//! Load a search index from a local file or a URL.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use sitekit_shared::{Result, SearchIndex, SitekitError};

/// Timeout in seconds for fetching a remote index.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User-Agent string for index requests.
const USER_AGENT: &str = concat!("sitekit/", env!("CARGO_PKG_VERSION"));

/// Where a search index lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSource {
    /// A file on disk.
    Path(PathBuf),
    /// An `http(s)` URL, usually the site's own `search/search_index.json`.
    Url(Url),
}

impl IndexSource {
    /// `http://` and `https://` strings are URLs, anything else is a path.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw)
                .map_err(|e| SitekitError::validation(format!("invalid index URL '{raw}': {e}")))?;
            Ok(Self::Url(url))
        } else {
            Ok(Self::Path(PathBuf::from(raw)))
        }
    }
}

impl std::fmt::Display for IndexSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Read and deserialize the index at `source`.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_index(source: &IndexSource) -> Result<SearchIndex> {
    let raw = match source {
        IndexSource::Path(path) => {
            std::fs::read_to_string(path).map_err(|e| SitekitError::io(path, e))?
        }
        IndexSource::Url(url) => fetch_index(url).await?,
    };
    debug!(bytes = raw.len(), "index read");

    let index: SearchIndex = serde_json::from_str(&raw)
        .map_err(|e| SitekitError::parse(format!("{source}: not a search index: {e}")))?;

    info!(docs = index.docs.len(), "search index loaded");
    Ok(index)
}

async fn fetch_index(url: &Url) -> Result<String> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| SitekitError::Network(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| SitekitError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SitekitError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| SitekitError::Network(format!("{url}: failed to read body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX: &str = r#"{
        "config": {"indexing": "full", "lang": ["en"], "min_search_length": 3,
                   "prebuild_index": false, "separator": "[\\s\\-]+"},
        "docs": [{"location": "", "text": "<p>Hello</p>", "title": "Home"}]
    }"#;

    #[test]
    fn parse_source_kinds() {
        assert!(matches!(
            IndexSource::parse("https://example.com/search/search_index.json").unwrap(),
            IndexSource::Url(_)
        ));
        assert_eq!(
            IndexSource::parse("public/search/search_index.json").unwrap(),
            IndexSource::Path(PathBuf::from("public/search/search_index.json"))
        );
        assert!(IndexSource::parse("http://").is_err());
    }

    #[tokio::test]
    async fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("search_index.json");
        std::fs::write(&file, INDEX).unwrap();

        let index = load_index(&IndexSource::Path(file)).await.unwrap();
        assert_eq!(index.docs[0].title, "Home");
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let err = load_index(&IndexSource::Path("/nonexistent/search_index.json".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, SitekitError::Io { .. }));
    }

    #[tokio::test]
    async fn load_from_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/search_index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(INDEX))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/search/search_index.json", server.uri())).unwrap();
        let index = load_index(&IndexSource::Url(url)).await.unwrap();
        assert_eq!(index.config.min_search_length, 3);
        assert_eq!(index.docs.len(), 1);
    }

    #[tokio::test]
    async fn url_not_found_is_network_error() {
        let server = MockServer::start().await;
        let url = Url::parse(&format!("{}/missing.json", server.uri())).unwrap();
        let err = load_index(&IndexSource::Url(url)).await.unwrap_err();
        assert!(matches!(err, SitekitError::Network(_)));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, r#"{"docs": "nope"}"#).unwrap();

        let err = load_index(&IndexSource::Path(file)).await.unwrap_err();
        assert!(matches!(err, SitekitError::Parse { .. }));
    }
}
