use crate::facts::github::Client;
use core::time::Duration;

/// Tunables consumed by individual metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSettings {
    /// Trailing window, in days, sampled by the responsiveness metric.
    pub responsiveness_window_days: u32,

    /// Steepness `k` of the responsiveness logistic curve.
    pub responsiveness_steepness: f64,

    /// How often to re-ask for contributor statistics GitHub is still computing.
    pub stats_pending_retries: u32,

    /// Pause between requests for contributor statistics that are still being computed.
    pub stats_pending_delay: Duration,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            responsiveness_window_days: 90,
            responsiveness_steepness: 7.0,
            stats_pending_retries: 3,
            stats_pending_delay: Duration::from_secs(2),
        }
    }
}

/// Everything a metric needs besides the repository it scores.
#[derive(Debug, Clone)]
pub struct MetricContext {
    pub client: Client,
    pub settings: MetricSettings,
}

impl MetricContext {
    #[must_use]
    pub const fn new(client: Client, settings: MetricSettings) -> Self {
        Self { client, settings }
    }
}
