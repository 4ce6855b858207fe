//! Scoring units and their weighted combination
//!
//! Each [`MetricKind`] is an independent scoring unit: it takes a resolved
//! [`RepoIdentity`](crate::facts::RepoIdentity), queries the GitHub API, and
//! normalizes what it finds into a score in `[0, 1]`.
//!
//! # Implementation Model
//!
//! [`Measurement::measure`] runs one unit, timing the complete computation and turning
//! any failure into an unavailable score (`None`). [`Evaluation::evaluate`] fans out
//! all units for a repository concurrently, waits for every one of them to settle, and
//! combines the available scores with [`Weights::combine`], which renormalizes over
//! the metrics that produced a value.

mod bus_factor;
mod correctness;
mod evaluation;
mod license;
mod measurement;
mod metric_context;
mod metric_kind;
mod net_score;
mod ramp_up;
mod responsiveness;

pub use evaluation::Evaluation;
pub use measurement::Measurement;
pub use metric_context::{MetricContext, MetricSettings};
pub use metric_kind::MetricKind;
pub use net_score::Weights;
