//! Resilient HTTP GET with per-attempt timeout and retry.
//!
//! Transient failures (network errors, 5xx, 429 and secondary rate limits that carry
//! `Retry-After`) are retried with exponential backoff so that a flaky endpoint does not
//! turn into a missing metric.

use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::app_err;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

const LOG_TARGET: &str = "      http";

/// Delay used for a 429 response without a `Retry-After` header.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

/// Longest `Retry-After` honoured inline; anything longer is returned to the caller.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Timeout and retry parameters applied to each GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on a single attempt, from send until headers arrive.
    pub timeout: Duration,

    /// Retries on top of the original attempt.
    pub max_retries: u32,

    /// First backoff delay, doubled after every retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Parse the `Retry-After` header value as seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let s = headers.get(RETRY_AFTER).and_then(|h| h.to_str().ok())?;
    s.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn recovery_for(result: &crate::Result<reqwest::Response>) -> RecoveryInfo {
    match result {
        Err(_) => RecoveryInfo::retry(),
        Ok(resp) => recovery_for_status(resp.status(), resp.headers()),
    }
}

fn recovery_for_status(status: StatusCode, headers: &HeaderMap) -> RecoveryInfo {
    if status.is_server_error() {
        return RecoveryInfo::retry();
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => match parse_retry_after(headers) {
            Some(delay) if delay > MAX_RETRY_AFTER => RecoveryInfo::never(),
            Some(delay) => RecoveryInfo::retry().delay(delay),
            None => RecoveryInfo::retry().delay(DEFAULT_RATE_LIMIT_DELAY),
        },
        // Secondary rate limits come back as 403 with Retry-After
        StatusCode::FORBIDDEN => parse_retry_after(headers)
            .filter(|delay| *delay <= MAX_RETRY_AFTER)
            .map_or_else(RecoveryInfo::never, |delay| RecoveryInfo::retry().delay(delay)),
        _ => RecoveryInfo::never(),
    }
}

/// Send an HTTP GET request with automatic retry and timeout.
///
/// The last outcome is returned once retries are exhausted, so callers still see
/// the final status code of a persistently failing endpoint.
pub async fn resilient_get(client: &reqwest::Client, url: &str, policy: RetryPolicy) -> crate::Result<reqwest::Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("http_get");

    let client = client.clone();
    let target = url.to_string();

    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &crate::Result<reqwest::Response>, _| recovery_for(result))
            .max_retry_attempts(policy.max_retries)
            .base_delay(policy.base_delay)
            .backoff(Backoff::Exponential)
            .on_retry(|_output, args| {
                log::debug!(
                    target: LOG_TARGET,
                    "Retrying HTTP GET (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis()
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(move |args| app_err!("HTTP request to '{target}' timed out after {:?}", args.timeout()))
            .timeout(policy.timeout),
        Execute::new(move |url: String| {
            let client = client.clone();
            async move { client.get(&url).send().await.map_err(ohno::AppError::from) }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
