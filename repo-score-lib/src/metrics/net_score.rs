use super::{Measurement, MetricKind};
use serde::{Deserialize, Serialize};

/// Relative weight of each metric in the net score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
    pub bus_factor: f64,
    pub license: f64,
    pub ramp_up: f64,
    pub responsiveness: f64,
    pub correctness: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            bus_factor: 0.35,
            license: 0.25,
            ramp_up: 0.15,
            responsiveness: 0.15,
            correctness: 0.10,
        }
    }
}

impl Weights {
    #[must_use]
    pub const fn weight(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::BusFactor => self.bus_factor,
            MetricKind::Correctness => self.correctness,
            MetricKind::RampUp => self.ramp_up,
            MetricKind::License => self.license,
            MetricKind::Responsiveness => self.responsiveness,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.bus_factor + self.license + self.ramp_up + self.responsiveness + self.correctness
    }

    /// Weighted mean over the available scores, renormalized over their weights.
    ///
    /// Returns `None` when no weighted metric is available.
    #[must_use]
    pub fn combine<'a>(&self, measurements: impl IntoIterator<Item = &'a Measurement>) -> Option<f64> {
        let (weighted_sum, total_weight) = measurements
            .into_iter()
            .filter_map(|m| m.score.map(|score| (score, self.weight(m.kind))))
            .fold((0.0, 0.0), |(sum, total), (score, weight)| (sum + score * weight, total + weight));

        (total_weight > 0.0).then(|| (weighted_sum / total_weight).clamp(0.0, 1.0))
    }
}
