//! Integration tests for the individual metrics against a mock GitHub API

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use core::time::Duration;
use repo_score_lib::facts::github::{Client, ClientOptions};
use repo_score_lib::facts::{RepoIdentity, RepoSpec};
use repo_score_lib::metrics::{Evaluation, Measurement, MetricContext, MetricKind, MetricSettings, Weights};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "/repos/octo/widget";

fn context(server: &MockServer) -> MetricContext {
    let options = ClientOptions {
        request_timeout: Duration::from_secs(5),
        max_retries: 0,
        max_concurrent_requests: 4,
        max_rate_limit_wait: Duration::ZERO,
    };

    let settings = MetricSettings {
        stats_pending_delay: Duration::from_millis(10),
        ..MetricSettings::default()
    };

    MetricContext::new(Client::new("test-token", Some(&server.uri()), options).unwrap(), settings)
}

fn identity() -> RepoIdentity {
    let url = Url::parse("https://github.com/octo/widget").unwrap();
    RepoIdentity::new("https://github.com/octo/widget", RepoSpec::parse(&url).unwrap())
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap();
    assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
}

#[tokio::test]
async fn test_bus_factor_waits_for_pending_statistics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/stats/contributors")))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/stats/contributors")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "total": 30, "weeks": [{ "w": 0, "a": 100, "d": 50, "c": 30 }] },
            { "total": 10, "weeks": [{ "w": 0, "a": 50, "d": 0, "c": 10 }] }
        ])))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::BusFactor, &context(&server), &identity()).await;

    assert_close(measurement.score, 0.25);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_bus_factor_no_content_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/stats/contributors")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::BusFactor, &context(&server), &identity()).await;
    assert_eq!(measurement.score, None);
}

#[tokio::test]
async fn test_correctness_from_issue_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "repo:octo/widget type:issue state:open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_count": 25, "items": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "repo:octo/widget type:issue state:closed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_count": 75, "items": [] })))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::Correctness, &context(&server), &identity()).await;
    assert_close(measurement.score, 0.75);
}

#[tokio::test]
async fn test_correctness_failed_counts_score_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::Correctness, &context(&server), &identity()).await;
    assert_close(measurement.score, 0.0);
}

#[tokio::test]
async fn test_ramp_up_walks_source_folders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "README.md", "path": "README.md", "type": "file", "size": 400 },
            { "name": "index.js", "path": "index.js", "type": "file", "size": 1000 },
            { "name": "style.css", "path": "style.css", "type": "file", "size": 9000 },
            { "name": "src", "path": "src", "type": "dir", "size": 0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents/src")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "a.js", "path": "src/a.js", "type": "file", "size": 3000 },
            { "name": "nested", "path": "src/nested", "type": "dir", "size": 0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents/src/nested")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::RampUp, &context(&server), &identity()).await;

    // 400 bytes of docs against 4000 bytes of code in a small project
    assert_close(measurement.score, 0.5);
}

#[tokio::test]
async fn test_ramp_up_stops_two_levels_below_source_folder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "README.md", "path": "README.md", "type": "file", "size": 400 },
            { "name": "src", "path": "src", "type": "dir", "size": 0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents/src")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "a", "path": "src/a", "type": "dir", "size": 0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents/src/a")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "b", "path": "src/a/b", "type": "dir", "size": 0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents/src/a/b")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "x.js", "path": "src/a/b/x.js", "type": "file", "size": 4000 },
            { "name": "c", "path": "src/a/b/c", "type": "dir", "size": 0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents/src/a/b/c")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "y.js", "path": "src/a/b/c/y.js", "type": "file", "size": 100_000 }
        ])))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let first = Measurement::measure(MetricKind::RampUp, &ctx, &identity()).await;
    let second = Measurement::measure(MetricKind::RampUp, &ctx, &identity()).await;

    // Only src/a/b/x.js counts: 400 bytes of docs against 4000 bytes of code
    assert_close(first.score, 0.5);
    assert_eq!(first.score, second.score);

    let too_deep = format!("{REPO}/contents/src/a/b/c");
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != too_deep));
}

#[tokio::test]
async fn test_ramp_up_counts_documentation_folders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Docs", "path": "Docs", "type": "dir", "size": 0 },
            { "name": "main.py", "path": "main.py", "type": "file", "size": 20000 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents/Docs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "guide.md", "path": "Docs/guide.md", "type": "file", "size": 2000 }
        ])))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::RampUp, &context(&server), &identity()).await;

    // 2000 / 20000 in a large project
    assert_close(measurement.score, 0.15);
}

#[tokio::test]
async fn test_ramp_up_unlisted_repository_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/contents")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::RampUp, &context(&server), &identity()).await;
    assert_eq!(measurement.score, None);
}

#[tokio::test]
async fn test_license_from_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/license")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "LICENSE",
            "license": { "key": "mit", "spdx_id": "MIT" }
        })))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::License, &context(&server), &identity()).await;
    assert_close(measurement.score, 1.0);
}

#[tokio::test]
async fn test_license_incompatible_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/license")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "license": { "key": "agpl-3.0", "spdx_id": "AGPL-3.0" }
        })))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::License, &context(&server), &identity()).await;
    assert_close(measurement.score, 0.0);
}

#[tokio::test]
async fn test_license_falls_back_to_readme() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/license")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let encoded = STANDARD.encode("# Widget\n\n## License\n\nReleased under the MIT terms.\n");
    let (head, tail) = encoded.split_at(12);
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/readme")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "encoding": "base64",
            "content": format!("{head}\n{tail}\n")
        })))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::License, &context(&server), &identity()).await;
    assert_close(measurement.score, 1.0);
}

#[tokio::test]
async fn test_license_noassertion_falls_back_to_readme() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/license")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "license": { "key": "other", "spdx_id": "NOASSERTION" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/readme")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "encoding": "base64",
            "content": STANDARD.encode("# Widget\n\n## License\n\nMIT\n")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::License, &context(&server), &identity()).await;
    assert_close(measurement.score, 1.0);
}

#[tokio::test]
async fn test_license_without_any_source_scores_zero() {
    let server = MockServer::start().await;

    let measurement = Measurement::measure(MetricKind::License, &context(&server), &identity()).await;
    assert_close(measurement.score, 0.0);
}

#[tokio::test]
async fn test_responsiveness_fast_closures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/issues")))
        .and(query_param("state", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-03T00:00:00Z", "comments": 3 },
            { "created_at": "2024-01-05T00:00:00Z", "closed_at": "2024-01-07T00:00:00Z", "comments": 1 },
            { "created_at": "2024-01-05T00:00:00Z", "closed_at": null, "comments": 8 }
        ])))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::Responsiveness, &context(&server), &identity()).await;

    let score = measurement.score.unwrap();
    assert!(score > 0.5, "got {score}");
}

#[tokio::test]
async fn test_responsiveness_follows_next_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/issues")))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", r#"<https://api.github.com/repositories/1/issues?page=2>; rel="next""#)
                .set_body_json(json!([
                    { "created_at": "2024-01-01T00:00:00Z", "closed_at": null, "comments": 0 }
                ])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/issues")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-03-01T00:00:00Z", "comments": 2 }
        ])))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::Responsiveness, &context(&server), &identity()).await;

    // A single sample beyond 30 days sits at the slow end of the curve
    let score = measurement.score.unwrap();
    assert!(score < 0.1, "got {score}");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_responsiveness_without_samples_scores_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/issues")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::Responsiveness, &context(&server), &identity()).await;
    assert_close(measurement.score, 0.0);
}

#[tokio::test]
async fn test_responsiveness_missing_issues_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/issues")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::Responsiveness, &context(&server), &identity()).await;
    assert_eq!(measurement.score, None);
}

#[tokio::test]
async fn test_responsiveness_rejected_token_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/issues")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let measurement = Measurement::measure(MetricKind::Responsiveness, &context(&server), &identity()).await;
    assert_eq!(measurement.score, None);
}

#[tokio::test]
async fn test_evaluation_renormalizes_over_available_metrics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/license")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "license": { "spdx_id": "Apache-2.0" } })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "repo:octo/widget type:issue state:open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_count": 1 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "repo:octo/widget type:issue state:closed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_count": 3 })))
        .mount(&server)
        .await;

    let evaluation = Evaluation::evaluate(&context(&server), &Weights::default(), identity()).await;

    assert_eq!(evaluation.measurements.len(), 5);
    assert_eq!(evaluation.measurement(MetricKind::BusFactor).unwrap().score, None);
    assert_eq!(evaluation.measurement(MetricKind::RampUp).unwrap().score, None);
    assert_eq!(evaluation.measurement(MetricKind::Responsiveness).unwrap().score, None);

    // (0.25 * 1.0 + 0.10 * 0.75) / (0.25 + 0.10)
    assert_close(evaluation.net_score, 0.325 / 0.35);
    assert!(evaluation.net_latency >= evaluation.measurements.iter().map(|m| m.latency).max().unwrap());
}
