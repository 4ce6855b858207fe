use crate::Result;
use crate::metrics::{Evaluation, MetricKind};
use core::fmt::Write;
use core::time::Duration;
use serde::Serialize;

/// Value written for a score or latency that could not be measured.
pub const UNAVAILABLE: f64 = -1.0;

/// One output line. Field order matches the published schema.
#[derive(Debug, Serialize)]
struct Record<'a> {
    #[serde(rename = "URL")]
    url: &'a str,
    #[serde(rename = "NetScore")]
    net_score: f64,
    #[serde(rename = "NetScore_Latency")]
    net_score_latency: f64,
    #[serde(rename = "RampUp")]
    ramp_up: f64,
    #[serde(rename = "RampUp_Latency")]
    ramp_up_latency: f64,
    #[serde(rename = "Correctness")]
    correctness: f64,
    #[serde(rename = "Correctness_Latency")]
    correctness_latency: f64,
    #[serde(rename = "BusFactor")]
    bus_factor: f64,
    #[serde(rename = "BusFactor_Latency")]
    bus_factor_latency: f64,
    #[serde(rename = "ResponsiveMaintainer")]
    responsive_maintainer: f64,
    #[serde(rename = "ResponsiveMaintainer_Latency")]
    responsive_maintainer_latency: f64,
    #[serde(rename = "License")]
    license: f64,
    #[serde(rename = "License_Latency")]
    license_latency: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn score_field(score: Option<f64>) -> f64 {
    score.map_or(UNAVAILABLE, round2)
}

fn latency_field(latency: Duration) -> f64 {
    round2(latency.as_secs_f64())
}

fn metric_fields(evaluation: &Evaluation, kind: MetricKind) -> (f64, f64) {
    evaluation
        .measurement(kind)
        .map_or((UNAVAILABLE, UNAVAILABLE), |m| (score_field(m.score), latency_field(m.latency)))
}

/// Write one evaluation as a single newline-terminated JSON object.
pub fn generate<W: Write>(evaluation: &Evaluation, writer: &mut W) -> Result<()> {
    let (ramp_up, ramp_up_latency) = metric_fields(evaluation, MetricKind::RampUp);
    let (correctness, correctness_latency) = metric_fields(evaluation, MetricKind::Correctness);
    let (bus_factor, bus_factor_latency) = metric_fields(evaluation, MetricKind::BusFactor);
    let (responsive_maintainer, responsive_maintainer_latency) = metric_fields(evaluation, MetricKind::Responsiveness);
    let (license, license_latency) = metric_fields(evaluation, MetricKind::License);

    let record = Record {
        url: evaluation.identity.display_url(),
        net_score: score_field(evaluation.net_score),
        net_score_latency: latency_field(evaluation.net_latency),
        ramp_up,
        ramp_up_latency,
        correctness,
        correctness_latency,
        bus_factor,
        bus_factor_latency,
        responsive_maintainer,
        responsive_maintainer_latency,
        license,
        license_latency,
    };

    writeln!(writer, "{}", serde_json::to_string(&record)?)?;
    Ok(())
}
