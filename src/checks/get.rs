//! Read checks against the collection and a single item.

use serde_json::Value;

use super::{CheckContext, CheckError, CheckOutcome};

pub const EXPECTED_POST_COUNT: usize = 100;
const SAMPLE_POST_ID: u64 = 1;

pub async fn status(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.list_posts().await?;
    let status = resp.status_code();
    Ok(CheckOutcome::evaluate(&resp, status == 200, || {
        format!("expected status 200, got {status}")
    }))
}

pub async fn response_type(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.list_posts().await?;
    let body = resp.json()?;
    Ok(CheckOutcome::evaluate(&resp, body.is_array(), || {
        format!("expected a JSON array, got {}", kind(&body))
    }))
}

pub async fn response_length(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.list_posts().await?;
    let body = resp.json()?;
    let len = collection_len(&body);
    Ok(CheckOutcome::evaluate(&resp, len > 0, || {
        "no posts returned".to_string()
    }))
}

pub async fn post_type(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.get_post(SAMPLE_POST_ID).await?;
    let body = resp.json()?;
    Ok(CheckOutcome::evaluate(&resp, body.is_object(), || {
        format!("expected a JSON object, got {}", kind(&body))
    }))
}

pub async fn post_count(ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.list_posts().await?;
    let body = resp.json()?;
    let len = collection_len(&body);
    Ok(CheckOutcome::evaluate(&resp, len == EXPECTED_POST_COUNT, || {
        format!("expected {EXPECTED_POST_COUNT} posts, got {len}")
    }))
}

/// Number of entries in an array or object body, characters in a string
/// body; zero for other scalars.
pub fn collection_len(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(text) => text.chars().count(),
        _ => 0,
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
