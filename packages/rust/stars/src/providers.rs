//! Code-hosting providers that expose a repository star count.

use sitekit_shared::{Result, SitekitError, StarsConfig};
use url::Url;

/// A code-hosting API that reports a star count for one repository.
pub trait StarProvider: Send + Sync {
    /// Human-readable provider name for tracing and reports.
    fn name(&self) -> &str;

    /// Id of the page element(s) the count is written into.
    fn element_id(&self) -> &str;

    /// Repository metadata endpoint.
    fn api_url(&self) -> Result<Url>;

    /// JSON field in the metadata response holding the star count.
    fn count_field(&self) -> &str;
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// `GET {api}/repos/{owner}/{name}` → `stargazers_count`.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    api_base: String,
    repo: String,
    element_id: String,
}

impl GitHubProvider {
    pub fn new(
        api_base: impl Into<String>,
        repo: impl Into<String>,
        element_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            repo: repo.into(),
            element_id: element_id.into(),
        }
    }
}

impl StarProvider for GitHubProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn element_id(&self) -> &str {
        &self.element_id
    }

    fn api_url(&self) -> Result<Url> {
        let (owner, name) = self
            .repo
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| {
                SitekitError::validation(format!(
                    "GitHub repository must look like 'owner/name', got '{}'",
                    self.repo
                ))
            })?;

        endpoint(&self.api_base, &["repos", owner, name])
    }

    fn count_field(&self) -> &str {
        "stargazers_count"
    }
}

// ---------------------------------------------------------------------------
// GitLab
// ---------------------------------------------------------------------------

/// `GET {base}/api/v4/projects/{id}` → `star_count`.
///
/// The project may be a numeric id or a `namespace/path`; the path form is
/// percent-encoded into a single segment as the GitLab API requires.
#[derive(Debug, Clone)]
pub struct GitLabProvider {
    api_base: String,
    project: String,
    element_id: String,
}

impl GitLabProvider {
    pub fn new(
        api_base: impl Into<String>,
        project: impl Into<String>,
        element_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            project: project.into(),
            element_id: element_id.into(),
        }
    }
}

impl StarProvider for GitLabProvider {
    fn name(&self) -> &str {
        "gitlab"
    }

    fn element_id(&self) -> &str {
        &self.element_id
    }

    fn api_url(&self) -> Result<Url> {
        if self.project.trim().is_empty() {
            return Err(SitekitError::validation("GitLab project must not be empty"));
        }
        endpoint(&self.api_base, &["api", "v4", "projects", &self.project])
    }

    fn count_field(&self) -> &str {
        "star_count"
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Providers for every repository named in the config, GitHub first.
pub fn providers_from_config(config: &StarsConfig) -> Vec<Box<dyn StarProvider>> {
    let mut providers: Vec<Box<dyn StarProvider>> = Vec::new();

    if let Some(repo) = &config.github_repo {
        providers.push(Box::new(GitHubProvider::new(
            config.github_api.clone(),
            repo.clone(),
            config.github_element_id.clone(),
        )));
    }
    if let Some(project) = &config.gitlab_project {
        providers.push(Box::new(GitLabProvider::new(
            config.gitlab_api.clone(),
            project.clone(),
            config.gitlab_element_id.clone(),
        )));
    }

    providers
}

/// Join `segments` onto `base`, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| SitekitError::config(format!("invalid API base URL '{base}': {e}")))?;

    url.path_segments_mut()
        .map_err(|()| SitekitError::config(format!("API base URL '{base}' cannot have a path")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
