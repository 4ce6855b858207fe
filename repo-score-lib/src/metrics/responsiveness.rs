//! How quickly issues and pull requests get closed after discussion.

use super::MetricContext;
use crate::Result;
use crate::facts::RepoIdentity;
use crate::facts::github::ApiResult;
use chrono::{DateTime, Utc};
use ohno::{EnrichableExt, bail};
use reqwest::header::LINK;
use serde::Deserialize;

const LOG_TARGET: &str = "responsive";

const PAGE_SIZE: u8 = 100;
const MAX_PAGES: u32 = 10;

const MS_PER_DAY: f64 = 86_400_000.0;
const FAST_RESPONSE_MS: f64 = MS_PER_DAY;
const SLOW_RESPONSE_MS: f64 = 30.0 * MS_PER_DAY;

/// Issue or pull request as returned by the issues endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueItem {
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: u64,
}

impl IssueItem {
    /// Milliseconds from creation to close, for discussed and closed items only.
    #[expect(clippy::cast_precision_loss, reason = "durations in ms fit comfortably in f64")]
    fn response_ms(&self) -> Option<f64> {
        if self.comments == 0 {
            return None;
        }

        let closed_at = self.closed_at?;
        Some((closed_at - self.created_at).num_milliseconds().max(0) as f64)
    }
}

pub async fn compute(ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<f64>> {
    let since = Utc::now() - chrono::Duration::days(i64::from(ctx.settings.responsiveness_window_days));
    let items = fetch_items_since(ctx, identity, since).await?;

    let durations: Vec<f64> = items.iter().filter_map(IssueItem::response_ms).collect();
    log::debug!(
        target: LOG_TARGET,
        "'{identity}' has {} closed and discussed items out of {} in the window",
        durations.len(),
        items.len()
    );

    Ok(Some(responsiveness_score(&durations, ctx.settings.responsiveness_steepness)))
}

/// Issues and pull requests updated since `since`, following pagination links.
async fn fetch_items_since(ctx: &MetricContext, identity: &RepoIdentity, since: DateTime<Utc>) -> Result<Vec<IssueItem>> {
    let since_str = since.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let mut all_items = Vec::new();
    let mut page = 1;

    loop {
        let url = ctx.client.repo_url(
            identity.spec(),
            &format!("/issues?state=all&since={since_str}&per_page={PAGE_SIZE}&page={page}"),
        );

        let resp = match ctx.client.api_call(&url).await {
            ApiResult::Success(resp, _) => resp,
            ApiResult::NotFound => bail!("issues of '{identity}' not found"),
            ApiResult::RateLimited(rl) => bail!(
                "rate limited while fetching issues of '{identity}', quota resets at {}",
                rl.reset_at.format("%T")
            ),
            ApiResult::Unauthorized => bail!("GitHub rejected the token while fetching issues of '{identity}'"),
            ApiResult::Failed(e) => return Err(e.enrich_with(|| format!("fetching issues page {page} for '{identity}'"))),
        };

        let has_next_page = resp
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|link| link.contains(r#"rel="next""#));

        let items: Vec<IssueItem> = resp
            .json()
            .await
            .map_err(|e| ohno::AppError::from(e).enrich_with(|| format!("decoding issues page {page} for '{identity}'")))?;

        if items.is_empty() {
            break;
        }

        all_items.extend(items);

        if !has_next_page {
            break;
        }

        page += 1;
        if page > MAX_PAGES {
            log::debug!(target: LOG_TARGET, "Reached page limit ({MAX_PAGES}) for '{identity}' after {} items", all_items.len());
            break;
        }
    }

    Ok(all_items)
}

/// Logistic decay of the mean response time, clamped to [1 day, 30 days].
///
/// No samples scores 0.
#[expect(clippy::cast_precision_loss, reason = "sample counts fit comfortably in f64")]
#[must_use]
pub fn responsiveness_score(durations_ms: &[f64], steepness: f64) -> f64 {
    if durations_ms.is_empty() {
        return 0.0;
    }

    let mean = durations_ms.iter().sum::<f64>() / durations_ms.len() as f64;
    let clamped = mean.clamp(FAST_RESPONSE_MS, SLOW_RESPONSE_MS);
    let t = (clamped - FAST_RESPONSE_MS) / (SLOW_RESPONSE_MS - FAST_RESPONSE_MS);

    (1.0 / (1.0 + (steepness * (t - 0.5)).exp())).clamp(0.0, 1.0)
}
