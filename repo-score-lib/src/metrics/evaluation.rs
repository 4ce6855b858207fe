use super::{Measurement, MetricContext, MetricKind, Weights};
use crate::facts::RepoIdentity;
use core::time::Duration;
use futures_util::future::join_all;
use std::time::Instant;
use strum::IntoEnumIterator;

const LOG_TARGET: &str = "evaluation";

/// All metric outcomes for one repository plus their weighted combination.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub identity: RepoIdentity,
    pub net_score: Option<f64>,

    /// Wall-clock time of the concurrent fan-out and the aggregation.
    pub net_latency: Duration,

    pub measurements: Vec<Measurement>,
}

impl Evaluation {
    /// Run every metric concurrently and wait for all of them, whatever their outcome.
    pub async fn evaluate(ctx: &MetricContext, weights: &Weights, identity: RepoIdentity) -> Self {
        log::info!(target: LOG_TARGET, "Scoring '{identity}'");

        let start = Instant::now();
        let measurements = join_all(MetricKind::iter().map(|kind| Measurement::measure(kind, ctx, &identity))).await;
        let net_score = weights.combine(&measurements);
        let net_latency = start.elapsed();

        log::info!(target: LOG_TARGET, "Net score for '{identity}': {net_score:?} in {}ms", net_latency.as_millis());

        Self {
            identity,
            net_score,
            net_latency,
            measurements,
        }
    }

    #[must_use]
    pub fn measurement(&self, kind: MetricKind) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.kind == kind)
    }
}
