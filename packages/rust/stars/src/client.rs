//! HTTP fetching of star counts and injection into page widgets.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use sitekit_html::HtmlPage;
use sitekit_shared::{Result, SitekitError};

use crate::providers::StarProvider;

/// User-Agent string for API requests (GitHub rejects requests without one).
const USER_AGENT: &str = concat!("sitekit/", env!("CARGO_PKG_VERSION"));

/// A star count fetched from one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarCount {
    /// Provider name (`github`, `gitlab`).
    pub provider: String,
    /// Id of the page element(s) showing the count.
    pub element_id: String,
    /// Number of stars.
    pub stars: u64,
}

/// Outcome of one provider in [`StarClient::fetch_all`].
#[derive(Debug)]
pub struct StarFetch {
    /// Provider name.
    pub provider: String,
    /// The count, or why it could not be fetched.
    pub result: Result<StarCount>,
}

/// Fetches star counts from code-hosting APIs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StarClient {
    client: Client,
}

impl StarClient {
    /// Create a client with the given request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SitekitError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch the star count from one provider.
    ///
    /// A non-success status is a network error; a body without a
    /// non-negative integer count field is a parse error. No retries.
    #[instrument(skip_all, fields(provider = provider.name()))]
    pub async fn fetch(&self, provider: &dyn StarProvider) -> Result<StarCount> {
        let url = provider.api_url()?;
        debug!(%url, "requesting repository metadata");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SitekitError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitekitError::Network(format!("{url}: HTTP {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SitekitError::parse(format!("{url}: response is not JSON: {e}")))?;

        let field = provider.count_field();
        let stars = body
            .get(field)
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| {
                SitekitError::parse(format!("{url}: response has no numeric '{field}' field"))
            })?;

        info!(stars, "star count fetched");
        Ok(StarCount {
            provider: provider.name().to_string(),
            element_id: provider.element_id().to_string(),
            stars,
        })
    }

    /// Fetch every provider concurrently. Results come back in provider order.
    #[instrument(skip_all, fields(providers = providers.len()))]
    pub async fn fetch_all(&self, providers: Vec<Box<dyn StarProvider>>) -> Vec<StarFetch> {
        let mut tasks = JoinSet::new();
        let mut names = Vec::with_capacity(providers.len());

        for (index, provider) in providers.into_iter().enumerate() {
            names.push(provider.name().to_string());
            let client = self.clone();
            tasks.spawn(async move { (index, client.fetch(provider.as_ref()).await) });
        }

        let mut results: Vec<Option<Result<StarCount>>> = names.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!(error = %e, "star count task failed"),
            }
        }

        names
            .into_iter()
            .zip(results)
            .map(|(provider, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(SitekitError::Network(format!("{provider}: fetch task aborted")))
                });
                StarFetch { provider, result }
            })
            .collect()
    }
}

/// Write each count into every element carrying its provider's element id.
///
/// Returns the number of elements updated. Providers whose widget is missing
/// from the page are skipped with a debug log; a widget that cannot be
/// written is skipped with a warning and the other providers still go in.
pub fn inject_star_counts(page: &mut HtmlPage, counts: &[StarCount]) -> usize {
    let mut updated = 0;
    for count in counts {
        match page.set_element_text(&count.element_id, &count.stars.to_string()) {
            Ok(0) => debug!(
                provider = %count.provider,
                element_id = %count.element_id,
                "no widget element on page"
            ),
            Ok(n) => updated += n,
            Err(e) => warn!(
                provider = %count.provider,
                element_id = %count.element_id,
                error = %e,
                "widget not updated"
            ),
        }
    }
    updated
}
