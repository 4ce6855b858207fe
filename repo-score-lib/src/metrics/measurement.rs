use super::{MetricContext, MetricKind};
use crate::facts::RepoIdentity;
use core::time::Duration;
use std::time::Instant;

const LOG_TARGET: &str = "   metrics";

/// Outcome of one metric for one repository.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub kind: MetricKind,

    /// Score in [0, 1], or `None` when the metric could not be computed.
    pub score: Option<f64>,

    /// Wall-clock duration of the whole computation, including failed attempts.
    pub latency: Duration,
}

impl Measurement {
    /// Run one metric, timing it and folding any failure into an unavailable score.
    pub async fn measure(kind: MetricKind, ctx: &MetricContext, identity: &RepoIdentity) -> Self {
        let start = Instant::now();
        let outcome = kind.compute(ctx, identity).await;
        let latency = start.elapsed();

        let score = match outcome {
            Ok(Some(score)) if score.is_finite() => Some(score.clamp(0.0, 1.0)),
            Ok(Some(score)) => {
                log::debug!(target: LOG_TARGET, "{kind} for '{identity}' produced non-finite score {score}");
                None
            }
            Ok(None) => {
                log::debug!(target: LOG_TARGET, "{kind} is unavailable for '{identity}'");
                None
            }
            Err(e) => {
                log::debug!(target: LOG_TARGET, "{kind} failed for '{identity}': {e:#}");
                None
            }
        };

        log::info!(target: LOG_TARGET, "{kind} for '{identity}': {score:?} in {}ms", latency.as_millis());

        Self { kind, score, latency }
    }
}
