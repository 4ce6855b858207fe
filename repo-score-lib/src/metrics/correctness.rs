//! Share of all issues that have been closed.

use super::MetricContext;
use crate::Result;
use crate::facts::RepoIdentity;
use serde::Deserialize;

const LOG_TARGET: &str = "correctness";

#[derive(Debug, Deserialize)]
struct SearchResult {
    total_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

pub async fn compute(ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<f64>> {
    let (open, closed) = tokio::join!(
        count_issues(ctx, identity, IssueState::Open),
        count_issues(ctx, identity, IssueState::Closed)
    );

    Ok(Some(correctness_score(open, closed)))
}

/// Count issues in one state; any failure counts as zero.
async fn count_issues(ctx: &MetricContext, identity: &RepoIdentity, state: IssueState) -> u64 {
    let url = format!(
        "{}/search/issues?q=repo:{}+type:issue+state:{}&per_page=1",
        ctx.client.base_url(),
        identity.spec().full_name(),
        state.as_str()
    );

    match ctx.client.get_json::<SearchResult>(&url).await.into_result("issue count") {
        Ok(Some(result)) => result.total_count,
        Ok(None) => 0,
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Could not count {} issues for '{identity}': {e:#}", state.as_str());
            0
        }
    }
}

/// `closed / (open + closed)`, defined as 0 when there are no issues at all.
#[expect(clippy::cast_precision_loss, reason = "issue counts fit comfortably in f64")]
#[must_use]
pub fn correctness_score(open: u64, closed: u64) -> f64 {
    let total = open + closed;
    if total == 0 {
        return 0.0;
    }

    closed as f64 / total as f64
}
