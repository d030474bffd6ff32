//! Sequential check runner.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::checks::{Check, CheckContext, CheckOutcome};
use crate::client::PostsClient;
use crate::config::SuiteConfig;
use crate::fixtures::FixtureSet;
use crate::sink::{Outcome, RequestType, ResultRecord, ResultSink};

#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub results: Vec<CheckReport>,
    pub errored: Vec<CheckFailure>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.outcome.is_passed())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }
}

/// A check that produced an outcome.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub check: Check,
    pub request_type: RequestType,
    pub test_name: &'static str,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    /// Set when the outcome could not be written to the sink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sink_error: Option<String>,
}

/// A check that ended in an error and wrote no record.
#[derive(Debug, Serialize)]
pub struct CheckFailure {
    pub check: Check,
    pub request_type: RequestType,
    pub error: String,
}

/// Build the shared context from configuration. A fixture file that cannot
/// be loaded only affects the checks that send a payload.
pub fn build_context(config: &SuiteConfig) -> Result<CheckContext> {
    let client = PostsClient::new(&config.base_url, config.request_timeout())
        .context("failed to set up HTTP client")?;

    let fixtures = match FixtureSet::load(&config.fixtures_path) {
        Ok(set) => {
            if set.is_empty() {
                warn!(
                    path = %config.fixtures_path.display(),
                    "fixture file holds no payloads, payload checks will error"
                );
            }
            Ok(set)
        }
        Err(e) => {
            warn!(error = %e, "fixtures unavailable, payload checks will error");
            Err(e.to_string())
        }
    };

    Ok(CheckContext {
        client,
        fixtures,
        response_time_budget: config.response_time_budget(),
    })
}

/// Run `checks` one after another, recording each outcome in `sink`.
///
/// A Failed condition never stops the run. A check that errors writes no
/// record and is listed in [`SuiteReport::errored`].
pub async fn run_suite(
    ctx: &CheckContext,
    checks: &[Check],
    sink: &dyn ResultSink,
) -> SuiteReport {
    let started_at = Utc::now();
    info!(base_url = %ctx.client.base_url(), checks = checks.len(), "starting check run");

    let mut results = Vec::new();
    let mut errored = Vec::new();

    for &check in checks {
        match check.run(ctx).await {
            Ok(outcome) => {
                let record = ResultRecord::new(
                    check.request_type(),
                    check.test_name(),
                    outcome.status,
                    outcome.outcome,
                );

                match outcome.outcome {
                    Outcome::Passed => info!(%check, status = outcome.status, "passed"),
                    Outcome::Failed => warn!(
                        %check,
                        status = outcome.status,
                        detail = outcome.detail.as_deref().unwrap_or(""),
                        "failed"
                    ),
                }

                let sink_error = match sink.record(&record).await {
                    Ok(()) => None,
                    Err(e) => {
                        warn!(%check, error = %e, "could not record result");
                        Some(e.to_string())
                    }
                };

                results.push(CheckReport {
                    check,
                    request_type: check.request_type(),
                    test_name: check.test_name(),
                    outcome,
                    sink_error,
                });
            }
            Err(e) => {
                error!(%check, error = %e, "check errored, no result recorded");
                errored.push(CheckFailure {
                    check,
                    request_type: check.request_type(),
                    error: e.to_string(),
                });
            }
        }
    }

    let report = SuiteReport {
        base_url: ctx.client.base_url().to_string(),
        started_at,
        results,
        errored,
    };

    info!(
        passed = report.passed(),
        failed = report.failed(),
        errored = report.errored.len(),
        "check run complete"
    );

    report
}
