//! Delete checks.

use super::{CheckContext, CheckError, CheckOutcome, JSON_CONTENT_TYPE};

const SAMPLE_POST_ID: u64 = 1;
const TIMED_POST_ID: u64 = 2;

/// Literal body the service answers a delete with.
pub const EMPTY_OBJECT_BODY: &str = "{}";

pub async fn response_text(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.delete_post(SAMPLE_POST_ID).await?;
    Ok(CheckOutcome::evaluate(&resp, resp.body == EMPTY_OBJECT_BODY, || {
        format!("expected body {EMPTY_OBJECT_BODY:?}, got {:?}", truncate(&resp.body))
    }))
}

pub async fn response_time(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.delete_post(TIMED_POST_ID).await?;
    let budget = ctx.response_time_budget;
    Ok(CheckOutcome::evaluate(&resp, resp.elapsed < budget, || {
        format!("took {:?}, budget {:?}", resp.elapsed, budget)
    }))
}

pub async fn content_type(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.delete_post(TIMED_POST_ID).await?;
    let actual = resp.content_type();
    Ok(CheckOutcome::evaluate(
        &resp,
        actual == Some(JSON_CONTENT_TYPE),
        || format!("expected Content-Type {JSON_CONTENT_TYPE:?}, got {actual:?}"),
    ))
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(80) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
