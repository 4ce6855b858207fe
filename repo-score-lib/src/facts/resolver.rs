//! Resolution of raw input URLs into GitHub repository identities.

use super::{RepoIdentity, RepoSpec};
use crate::Result;
use core::fmt::{Display, Formatter};
use core::time::Duration;
use serde::Deserialize;
use url::Url;

const LOG_TARGET: &str = "  resolver";

/// Default base URL of the npm registry
pub const DEFAULT_NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

const NPM_HOSTS: &[&str] = &["www.npmjs.com", "npmjs.com"];
const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Why a URL could not be turned into a repository identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The input is not a well-formed absolute http(s) URL.
    InvalidUrl(String),

    /// The URL did not answer the existence check.
    NotFound,

    /// The URL is neither an npm package page nor a GitHub repository.
    UnsupportedHost(String),

    /// No GitHub repository could be derived from the package metadata.
    NoRepository(String),
}

impl Display for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidUrl(reason) => write!(f, "invalid URL: {reason}"),
            Self::NotFound => write!(f, "URL is not reachable"),
            Self::UnsupportedHost(host) => write!(f, "unsupported host '{host}', expected npmjs.com or github.com"),
            Self::NoRepository(reason) => write!(f, "no GitHub repository found: {reason}"),
        }
    }
}

impl core::error::Error for ResolutionError {}

/// Registry document for a package; only the repository field matters here.
#[derive(Debug, Deserialize)]
struct PackageDocument {
    repository: Option<RepositoryField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RepositoryField {
    Detailed {
        #[serde(rename = "type")]
        kind: Option<String>,
        url: Option<String>,
    },
    Shorthand(String),
}

/// Resolves npm package pages and GitHub URLs into [`RepoIdentity`] values.
///
/// Resolution performs at most two requests (existence check and registry lookup)
/// and never retries; any network failure maps onto the matching [`ResolutionError`].
#[derive(Debug, Clone)]
pub struct Resolver {
    client: reqwest::Client,
    registry_url: String,
    check_existence: bool,
}

impl Resolver {
    pub fn new(registry_url: Option<&str>, check_existence: bool, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("repo-score").timeout(timeout).build()?;

        Ok(Self {
            client,
            registry_url: registry_url.unwrap_or(DEFAULT_NPM_REGISTRY_URL).trim_end_matches('/').to_string(),
            check_existence,
        })
    }

    pub async fn resolve(&self, raw_url: &str) -> Result<RepoIdentity, ResolutionError> {
        let raw_url = raw_url.trim();
        let url = Url::parse(raw_url).map_err(|e| ResolutionError::InvalidUrl(format!("'{raw_url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ResolutionError::InvalidUrl(format!("'{raw_url}' is not an http(s) URL")));
        }

        if self.check_existence && !self.url_exists(&url).await {
            return Err(ResolutionError::NotFound);
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let spec = if NPM_HOSTS.contains(&host.as_str()) {
            self.resolve_npm(&url).await?
        } else if GITHUB_HOSTS.contains(&host.as_str()) {
            RepoSpec::parse(&url).map_err(|e| ResolutionError::NoRepository(format!("{e:#}")))?
        } else {
            return Err(ResolutionError::UnsupportedHost(host));
        };

        log::debug!(target: LOG_TARGET, "Resolved '{raw_url}' to {spec}");
        Ok(RepoIdentity::new(raw_url, spec))
    }

    async fn url_exists(&self, url: &Url) -> bool {
        match self.client.head(url.as_str()).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                if !ok {
                    log::info!(target: LOG_TARGET, "Existence check for '{url}' returned {}", resp.status());
                }
                ok
            }
            Err(e) => {
                log::info!(target: LOG_TARGET, "Error checking URL '{url}': {e:#}");
                false
            }
        }
    }

    async fn resolve_npm(&self, url: &Url) -> Result<RepoSpec, ResolutionError> {
        let package = npm_package_name(url).ok_or_else(|| ResolutionError::NoRepository(format!("no package name in '{url}'")))?;
        let registry_url = format!("{}/{}", self.registry_url, package.replace('/', "%2F"));

        log::info!(target: LOG_TARGET, "Querying npm registry for package '{package}'");

        let document = match self.fetch_package_document(&registry_url).await {
            Ok(doc) => doc,
            Err(e) => {
                log::info!(target: LOG_TARGET, "Error getting GitHub URL from npm package '{package}'");
                log::debug!(target: LOG_TARGET, "{e:#}");
                return Err(ResolutionError::NoRepository(format!("npm registry lookup for '{package}' failed")));
            }
        };

        let repo_url = match document.repository {
            Some(RepositoryField::Detailed { kind: Some(kind), url: Some(url) }) if kind == "git" => url,
            Some(RepositoryField::Shorthand(shorthand)) => shorthand,
            _ => {
                return Err(ResolutionError::NoRepository(format!(
                    "package '{package}' does not declare a git repository"
                )));
            }
        };

        github_https_url(&repo_url)
            .and_then(|https| RepoSpec::parse(&https).ok())
            .ok_or_else(|| ResolutionError::NoRepository(format!("'{repo_url}' is not a GitHub repository URL")))
    }

    async fn fetch_package_document(&self, registry_url: &str) -> Result<PackageDocument> {
        let resp = self.client.get(registry_url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}

/// Extract the package name from an npm page URL, keeping the scope of scoped packages.
fn npm_package_name(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.skip_while(|s| *s != "package").skip(1);
    let first = segments.next().filter(|s| !s.is_empty())?;

    if first.starts_with('@') {
        let name = segments.next().filter(|s| !s.is_empty())?;
        Some(format!("{first}/{name}"))
    } else {
        Some(first.to_string())
    }
}

/// Convert the repository URL forms found in package metadata into an `https://` URL.
///
/// Handles `git+` prefixes, `.git` suffixes, `git://`, `ssh://git@`, scp-style
/// `git@host:owner/repo`, and the `github:owner/repo` and bare `owner/repo` shorthands.
fn github_https_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("git+").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let https = if let Some(rest) = trimmed.strip_prefix("git://") {
        format!("https://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("ssh://git@") {
        format!("https://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("git@") {
        format!("https://{}", rest.replacen(':', "/", 1))
    } else if let Some(rest) = trimmed.strip_prefix("github:") {
        format!("https://github.com/{rest}")
    } else if !trimmed.contains(':') && trimmed.split('/').count() == 2 {
        format!("https://github.com/{trimmed}")
    } else {
        trimmed.to_string()
    };

    Url::parse(&https).ok()
}
