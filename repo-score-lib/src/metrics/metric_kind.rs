use super::{MetricContext, bus_factor, correctness, license, ramp_up, responsiveness};
use crate::Result;
use crate::facts::RepoIdentity;
use strum::{Display, EnumIter};

/// The fixed set of scoring units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum MetricKind {
    BusFactor,
    Correctness,
    RampUp,
    License,
    Responsiveness,
}

impl MetricKind {
    /// Field name used for this metric in output records.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BusFactor => "BusFactor",
            Self::Correctness => "Correctness",
            Self::RampUp => "RampUp",
            Self::License => "License",
            Self::Responsiveness => "ResponsiveMaintainer",
        }
    }

    /// Compute the raw score. `Ok(None)` means the metric is unavailable for this repository.
    pub async fn compute(self, ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<f64>> {
        match self {
            Self::BusFactor => bus_factor::compute(ctx, identity).await,
            Self::Correctness => correctness::compute(ctx, identity).await,
            Self::RampUp => ramp_up::compute(ctx, identity).await,
            Self::License => license::compute(ctx, identity).await,
            Self::Responsiveness => responsiveness::compute(ctx, identity).await,
        }
    }
}
