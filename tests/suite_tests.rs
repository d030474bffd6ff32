//! End-to-end check runs against a local stub of the posts API.

mod common;

use common::{spawn_stub, write_fixtures, Behavior};
use postcheck::checks::Check;
use postcheck::sink::SinkError;
use postcheck::suite::build_context;
use postcheck::{
    run_suite, CsvSink, MemorySink, Outcome, RequestType, ResultRecord, ResultSink, SuiteConfig,
};

/// Sink whose storage is never reachable.
struct UnwritableSink;

#[async_trait::async_trait]
impl ResultSink for UnwritableSink {
    async fn record(&self, _record: &ResultRecord) -> Result<(), SinkError> {
        Err(SinkError::Open {
            path: "/unwritable/results.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

fn config_for(base_url: String, dir: &std::path::Path) -> SuiteConfig {
    SuiteConfig {
        base_url,
        fixtures_path: write_fixtures(dir),
        results_path: dir.join("results.csv"),
        ..SuiteConfig::default()
    }
}

fn outcome_of(records: &[ResultRecord], name: &str) -> Outcome {
    records
        .iter()
        .find(|r| r.test_name == name)
        .map(|r| r.outcome)
        .unwrap_or_else(|| panic!("no record for {name}"))
}

#[tokio::test]
async fn test_compliant_service_passes_every_check() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior::default()).await;
    let ctx = build_context(&config_for(base, dir.path())).unwrap();

    let sink = MemorySink::new();
    let report = run_suite(&ctx, &Check::ALL, &sink).await;

    let records = sink.records();
    assert_eq!(records.len(), Check::ALL.len());
    assert!(report.errored.is_empty(), "{:?}", report.errored);
    for r in &records {
        assert_eq!(r.outcome, Outcome::Passed, "{} failed", r.test_name);
    }
    assert_eq!(report.passed(), 17);
    assert_eq!(report.failed(), 0);

    let post_status = records.iter().find(|r| r.test_name == "status").unwrap();
    assert_eq!(post_status.request_type, RequestType::Post);
    assert_eq!(post_status.response_status, 201);
}

#[tokio::test]
async fn test_one_broken_contract_fails_only_that_check() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior {
        delete_body: "{ }",
        ..Behavior::default()
    })
    .await;
    let ctx = build_context(&config_for(base, dir.path())).unwrap();

    let sink = MemorySink::new();
    let report = run_suite(&ctx, &Check::ALL, &sink).await;

    let records = sink.records();
    assert_eq!(records.len(), 17);
    assert_eq!(outcome_of(&records, "response_text"), Outcome::Failed);
    assert_eq!(report.failed(), 1);

    // status code is still 200; the body alone decides
    let delete = records.iter().find(|r| r.test_name == "response_text").unwrap();
    assert_eq!(delete.response_status, 200);

    let detail = report
        .results
        .iter()
        .find(|r| r.check == Check::DeletePost)
        .and_then(|r| r.outcome.detail.clone())
        .unwrap();
    assert!(detail.contains("{ }"));
}

#[tokio::test]
async fn test_public_service_shape_fails_credential_and_count_checks() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior {
        post_count: 3,
        put_credentials: false,
        ..Behavior::default()
    })
    .await;
    let ctx = build_context(&config_for(base, dir.path())).unwrap();

    let sink = MemorySink::new();
    run_suite(&ctx, &Check::ALL, &sink).await;

    let records = sink.records();
    assert_eq!(records.len(), 17);
    assert_eq!(outcome_of(&records, "Authorization"), Outcome::Failed);
    assert_eq!(outcome_of(&records, "cookies"), Outcome::Failed);
    assert_eq!(outcome_of(&records, "posts_count"), Outcome::Failed);
    assert_eq!(outcome_of(&records, "response_length"), Outcome::Passed);
    assert_eq!(outcome_of(&records, "keys"), Outcome::Passed);
}

#[tokio::test]
async fn test_put_echoes_update_fixture_title() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior::default()).await;
    let ctx = build_context(&config_for(base, dir.path())).unwrap();

    let outcome = Check::PutUpdatePost.run(&ctx).await.unwrap();
    assert_eq!(outcome.outcome, Outcome::Passed);
    assert_eq!(outcome.status, 200);
}

#[tokio::test]
async fn test_repeated_runs_share_one_header() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior::default()).await;
    let config = config_for(base, dir.path());
    let ctx = build_context(&config).unwrap();

    let checks = [Check::GetStatus, Check::PostTitle];
    run_suite(&ctx, &checks, &CsvSink::new(&config.results_path)).await;
    run_suite(&ctx, &checks, &CsvSink::new(&config.results_path)).await;

    let content = std::fs::read_to_string(&config.results_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Request Type,Test,Response Status,Result",
            "GET,get_status,200,Passed",
            "POST,post_title,201,Passed",
            "GET,get_status,200,Passed",
            "POST,post_title,201,Passed",
        ]
    );
}

#[tokio::test]
async fn test_missing_fixture_file_only_errors_payload_checks() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior::default()).await;
    let config = SuiteConfig {
        base_url: base,
        fixtures_path: dir.path().join("absent.json"),
        results_path: dir.path().join("results.csv"),
        ..SuiteConfig::default()
    };
    let ctx = build_context(&config).unwrap();

    let sink = MemorySink::new();
    let report = run_suite(&ctx, &Check::ALL, &sink).await;

    // 5 GET + 3 DELETE checks need no payload
    assert_eq!(sink.records().len(), 8);
    assert_eq!(report.errored.len(), 9);
    assert!(report
        .errored
        .iter()
        .all(|e| matches!(e.request_type, RequestType::Post | RequestType::Put)));
}

#[tokio::test]
async fn test_sink_errors_are_reported_and_run_continues() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior::default()).await;
    let ctx = build_context(&config_for(base, dir.path())).unwrap();

    let report = run_suite(&ctx, &Check::ALL, &UnwritableSink).await;

    assert_eq!(report.results.len(), Check::ALL.len());
    assert!(report.errored.is_empty());
    for r in &report.results {
        let err = r
            .sink_error
            .as_deref()
            .unwrap_or_else(|| panic!("{} has no sink error", r.check));
        assert!(err.contains("/unwritable/results.csv"));
    }
    // outcomes are still evaluated even though nothing was stored
    assert_eq!(report.passed(), 17);
}

#[tokio::test]
async fn test_payload_comes_from_catalog_fixture() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = spawn_stub(Behavior::default()).await;
    let fixtures = dir.path().join("named.json");
    std::fs::write(
        &fixtures,
        r#"{
            "echo": {"title": "echoed", "body": "e", "userId": 1},
            "update": {"title": "T", "body": "B", "userId": 5}
        }"#,
    )
    .unwrap();
    let config = SuiteConfig {
        base_url: base,
        fixtures_path: fixtures,
        results_path: dir.path().join("results.csv"),
        ..SuiteConfig::default()
    };
    let ctx = build_context(&config).unwrap();

    let sink = MemorySink::new();
    let report = run_suite(&ctx, &Check::ALL, &sink).await;

    // Only the check the catalog maps to `create` lacks its payload.
    let errored: Vec<Check> = report.errored.iter().map(|e| e.check).collect();
    assert_eq!(errored, vec![Check::PostIdPresent]);
    assert!(report.errored[0].error.contains("create"));
    assert_eq!(sink.records().len(), 16);
    assert!(sink.records().iter().all(|r| r.outcome == Outcome::Passed));
}
