use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::{IntoAppError, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;
use url::Url;

/// Host of every repository this tool can score.
pub const GITHUB_HOST: &str = "github.com";

/// Public GitHub REST API root used to derive a repository's API URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Characters left alone by `encodeURIComponent`; everything else is percent-encoded.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Canonical `https://github.com/{owner}/{repo}` identity of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    url: Arc<Url>,
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoSpec {
    /// Parse a GitHub URL, dropping any path beyond owner and repository.
    pub fn parse(url: &Url) -> Result<Self> {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if host != GITHUB_HOST && host != "www.github.com" {
            bail!("not a GitHub repository URL: {url}");
        }

        let path_segments: Vec<_> = url.path_segments().map(Iterator::collect).unwrap_or_default();

        if path_segments.len() < 2 {
            bail!("invalid repository URL format: {url}");
        }

        let owner = path_segments[0];
        let repo = path_segments[1].trim_end_matches(".git");

        if owner.is_empty() || repo.is_empty() {
            bail!("invalid repository URL: empty owner or repo name: {url}");
        }

        let clean_url = Url::parse(&format!("https://{GITHUB_HOST}/{owner}/{repo}")).into_app_err("reconstructing repository URL")?;

        Ok(Self {
            owner: Arc::from(owner),
            repo: Arc::from(repo),
            url: Arc::new(clean_url),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `owner/repo`, as used by GitHub search qualifiers.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Path of this repository below an API root: `/repos/{owner}/{repo}` with both parts encoded.
    #[must_use]
    pub fn api_path(&self) -> String {
        format!(
            "/repos/{}/{}",
            utf8_percent_encode(&self.owner, URI_COMPONENT),
            utf8_percent_encode(&self.repo, URI_COMPONENT)
        )
    }

    /// Repository endpoint on the public GitHub API.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{GITHUB_API_URL}{}", self.api_path())
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.url)
    }
}
