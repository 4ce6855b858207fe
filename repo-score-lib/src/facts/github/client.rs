//! GitHub REST API client
//!
//! Authenticated client shared by every metric. All calls funnel through
//! [`Client::api_call`], which throttles, retries transient failures, and classifies
//! the response.

use crate::Result;
use crate::facts::RepoSpec;
use crate::facts::resilient_http::{RetryPolicy, resilient_get};
use crate::facts::throttler::Throttler;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::{EnrichableExt, bail};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const LOG_TARGET: &str = "    github";

/// Default root of the GitHub REST API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of a GitHub API call
#[derive(Debug)]
pub enum ApiResult<T> {
    /// Request succeeded; contains data and optional rate limit info
    Success(T, Option<RateLimitInfo>),

    /// The requested resource does not exist (404)
    NotFound,

    /// Quota exhausted and the reset is too far away to wait for
    RateLimited(RateLimitInfo),

    /// The token was rejected (401)
    Unauthorized,

    /// Request failed permanently
    Failed(ohno::AppError),
}

impl<T> ApiResult<T> {
    /// Collapse into a `Result`, mapping 404 to `None` and every other failure to an error naming `what`.
    pub fn into_result(self, what: &str) -> Result<Option<T>> {
        match self {
            Self::Success(data, _) => Ok(Some(data)),
            Self::NotFound => Ok(None),
            Self::RateLimited(rl) => bail!("rate limited while fetching {what}, quota resets at {}", rl.reset_at.format("%T")),
            Self::Unauthorized => bail!("GitHub rejected the token while fetching {what}"),
            Self::Failed(e) => Err(e.enrich_with(|| format!("fetching {what}"))),
        }
    }
}

/// Tuning knobs for [`Client`].
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub max_concurrent_requests: usize,
    pub max_rate_limit_wait: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            max_concurrent_requests: 8,
            max_rate_limit_wait: Duration::from_secs(60),
        }
    }
}

/// GitHub API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    throttler: Arc<Throttler>,
    max_rate_limit_wait: Duration,
}

impl Client {
    /// Create a client authenticating with `token` against `base_url` (the public API when `None`).
    pub fn new(token: &str, base_url: Option<&str>, options: ClientOptions) -> Result<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("token {token}"))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = reqwest::Client::builder()
            .user_agent("repo-score")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_API_URL).trim_end_matches('/').to_string(),
            retry: RetryPolicy {
                timeout: options.request_timeout,
                max_retries: options.max_retries,
                ..RetryPolicy::default()
            },
            throttler: Throttler::new(options.max_concurrent_requests),
            max_rate_limit_wait: options.max_rate_limit_wait,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Construct the API URL for a repository with an optional path suffix
    #[must_use]
    pub fn repo_url(&self, spec: &RepoSpec, suffix: &str) -> String {
        format!("{}{}{suffix}", self.base_url, spec.api_path())
    }

    /// Make an API call and classify the result.
    ///
    /// When the quota is exhausted and resets within the configured wait, every request
    /// through this client is paused until the reset and the call is retried once.
    pub async fn api_call(&self, url: &str) -> ApiResult<reqwest::Response> {
        let mut waited = false;

        loop {
            let result = {
                let _permit = self.throttler.acquire().await;
                self.classified_call(url).await
            };

            let ApiResult::RateLimited(rate_limit) = result else {
                return result;
            };

            let wait = (rate_limit.reset_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            if waited || wait > self.max_rate_limit_wait {
                log::warn!(target: LOG_TARGET, "GitHub rate limit exhausted until {}", rate_limit.reset_at.with_timezone(&chrono::Local).format("%T"));
                return ApiResult::RateLimited(rate_limit);
            }

            if self.throttler.pause_for(wait) {
                log::info!(target: LOG_TARGET, "Hit GitHub rate limit, pausing requests for {}s", wait.as_secs());
            }
            waited = true;
        }
    }

    async fn classified_call(&self, url: &str) -> ApiResult<reqwest::Response> {
        log::debug!(target: LOG_TARGET, "GET {url}");

        let resp = match resilient_get(&self.client, url, self.retry).await {
            Ok(r) => r,
            Err(e) => return ApiResult::Failed(e),
        };

        let rate_limit = extract_rate_limit_from_headers(resp.headers());
        let status = resp.status();

        if status.is_success() {
            return ApiResult::Success(resp, rate_limit);
        }

        match status {
            StatusCode::NOT_FOUND => ApiResult::NotFound,
            StatusCode::UNAUTHORIZED => ApiResult::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => ApiResult::RateLimited(rate_limit.unwrap_or_else(default_reset)),
            StatusCode::FORBIDDEN if rate_limit.is_some_and(|rl| rl.remaining == 0) => {
                ApiResult::RateLimited(rate_limit.unwrap_or_else(default_reset))
            }
            _ => match resp.error_for_status() {
                Err(e) => ApiResult::Failed(e.into()),
                Ok(resp) => ApiResult::Failed(ohno::app_err!("unexpected status {} from '{url}'", resp.status())),
            },
        }
    }

    /// Fetch and decode a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        match self.api_call(url).await {
            ApiResult::Success(resp, rate_limit) => match resp.json().await {
                Ok(data) => ApiResult::Success(data, rate_limit),
                Err(e) => ApiResult::Failed(ohno::AppError::from(e).enrich_with(|| format!("decoding response from '{url}'"))),
            },
            ApiResult::NotFound => ApiResult::NotFound,
            ApiResult::RateLimited(rl) => ApiResult::RateLimited(rl),
            ApiResult::Unauthorized => ApiResult::Unauthorized,
            ApiResult::Failed(e) => ApiResult::Failed(e),
        }
    }

    /// Check the token against `/user`.
    ///
    /// A 401 is fatal. Any other failure is only logged so that a flaky check does
    /// not prevent scoring.
    pub async fn verify_token(&self) -> Result<()> {
        let url = format!("{}/user", self.base_url);
        match self.api_call(&url).await {
            ApiResult::Success(..) => {
                log::debug!(target: LOG_TARGET, "GitHub token accepted");
                Ok(())
            }
            ApiResult::Unauthorized => bail!("invalid GitHub token"),
            ApiResult::NotFound => {
                log::warn!(target: LOG_TARGET, "Could not verify GitHub token: '{url}' not found");
                Ok(())
            }
            ApiResult::RateLimited(_) => {
                log::warn!(target: LOG_TARGET, "Could not verify GitHub token: rate limited");
                Ok(())
            }
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not verify GitHub token: {e:#}");
                Ok(())
            }
        }
    }
}

fn default_reset() -> RateLimitInfo {
    RateLimitInfo {
        remaining: 0,
        reset_at: Utc::now() + chrono::Duration::hours(1),
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;
    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
