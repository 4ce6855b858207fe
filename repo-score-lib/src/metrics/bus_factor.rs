//! Concentration of work in the single most active contributor.

use super::MetricContext;
use crate::Result;
use crate::facts::RepoIdentity;
use crate::facts::github::ApiResult;
use ohno::EnrichableExt;
use reqwest::StatusCode;
use serde::Deserialize;

const LOG_TARGET: &str = "bus_factor";

/// One entry of `/stats/contributors`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub weeks: Vec<WeekStats>,
}

/// Weekly additions and deletions of one contributor.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WeekStats {
    #[serde(default, rename = "a")]
    pub additions: u64,
    #[serde(default, rename = "d")]
    pub deletions: u64,
}

impl ContributorStats {
    fn changed_lines(&self) -> u64 {
        self.weeks.iter().map(|w| w.additions + w.deletions).sum()
    }
}

pub async fn compute(ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<f64>> {
    let Some(stats) = fetch_contributor_stats(ctx, identity).await? else {
        return Ok(None);
    };

    Ok(bus_factor_score(&stats))
}

/// Fetch contributor statistics, waiting while GitHub is still computing them.
async fn fetch_contributor_stats(ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<Vec<ContributorStats>>> {
    let url = ctx.client.repo_url(identity.spec(), "/stats/contributors");
    let mut attempt = 0;

    loop {
        let resp = match ctx.client.api_call(&url).await {
            ApiResult::Success(resp, _) => resp,
            other => return other.into_result("contributor statistics").map(|_| None),
        };

        match resp.status() {
            StatusCode::ACCEPTED if attempt < ctx.settings.stats_pending_retries => {
                attempt += 1;
                log::debug!(target: LOG_TARGET, "Contributor statistics for '{identity}' are being computed, retry {attempt}");
                tokio::time::sleep(ctx.settings.stats_pending_delay).await;
            }
            StatusCode::ACCEPTED => {
                log::info!(target: LOG_TARGET, "Contributor statistics for '{identity}' still pending, giving up");
                return Ok(None);
            }
            StatusCode::NO_CONTENT => return Ok(None),
            _ => {
                let stats = resp
                    .json()
                    .await
                    .map_err(|e| ohno::AppError::from(e).enrich_with(|| format!("decoding contributor statistics for '{identity}'")))?;
                return Ok(Some(stats));
            }
        }
    }
}

/// `1 - 0.5 * commit_share - 0.5 * line_share` of the top contributor.
///
/// A share whose total is zero is dropped and the other share carries the full weight.
/// Returns `None` for an empty contributor list.
#[expect(clippy::cast_precision_loss, reason = "commit and line counts fit comfortably in f64")]
#[must_use]
pub fn bus_factor_score(stats: &[ContributorStats]) -> Option<f64> {
    let top = stats.iter().max_by_key(|c| (c.total, c.changed_lines()))?;

    let total_commits: u64 = stats.iter().map(|c| c.total).sum();
    let total_lines: u64 = stats.iter().map(ContributorStats::changed_lines).sum();

    let commit_share = top.total as f64 / total_commits.max(1) as f64;
    let line_share = top.changed_lines() as f64 / total_lines.max(1) as f64;

    let score = match (total_commits > 0, total_lines > 0) {
        (true, true) => 1.0 - 0.5 * commit_share - 0.5 * line_share,
        (true, false) => 1.0 - 0.5 * commit_share,
        (false, true) => 1.0 - 0.5 * line_share,
        (false, false) => 1.0,
    };

    Some(score.min(1.0))
}
