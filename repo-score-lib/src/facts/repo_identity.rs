use super::RepoSpec;
use core::fmt::{Display, Formatter};
use std::sync::Arc;
use url::Url;

/// A resolved repository: the URL the user supplied plus the GitHub repository it maps to.
///
/// Instances only exist once resolution has succeeded, so every accessor is infallible.
/// Cloning is cheap and the value is immutable, which lets all metrics of a
/// repository share it while they run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentity {
    input_url: Arc<str>,
    spec: RepoSpec,
}

impl RepoIdentity {
    #[must_use]
    pub fn new(input_url: impl Into<Arc<str>>, spec: RepoSpec) -> Self {
        Self {
            input_url: input_url.into(),
            spec,
        }
    }

    /// The URL exactly as it appeared in the input.
    #[must_use]
    pub fn input_url(&self) -> &str {
        &self.input_url
    }

    /// The URL shown in output records.
    #[must_use]
    pub fn display_url(&self) -> &str {
        &self.input_url
    }

    /// Canonical `https://github.com/{owner}/{repo}` URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        self.spec.url()
    }

    /// `https://api.github.com/repos/{owner}/{repo}`
    #[must_use]
    pub fn api_url(&self) -> String {
        self.spec.api_url()
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        self.spec.owner()
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        self.spec.repo()
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        self.spec.repo()
    }

    #[must_use]
    pub const fn spec(&self) -> &RepoSpec {
        &self.spec
    }
}

impl Display for RepoIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        if self.input_url.as_ref() == self.spec.url().as_str() {
            write!(f, "{}", self.spec)
        } else {
            write!(f, "{} ({})", self.input_url, self.spec)
        }
    }
}
