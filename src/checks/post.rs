//! Create checks.

use serde_json::Value;

use super::{CheckContext, CheckError, CheckOutcome, JSON_CONTENT_TYPE};
use crate::fixtures::PostPayload;

pub async fn status(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.create_post(payload).await?;
    let status = resp.status_code();
    Ok(CheckOutcome::evaluate(&resp, status == 201, || {
        format!("expected status 201, got {status}")
    }))
}

pub async fn id_present(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.create_post(payload).await?;
    let body = resp.json()?;
    Ok(CheckOutcome::evaluate(&resp, has_key(&body, "id"), || {
        "response has no \"id\" field".to_string()
    }))
}

pub async fn title(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.create_post(payload).await?;
    let body = resp.json()?;
    Ok(CheckOutcome::evaluate(
        &resp,
        title_matches(&body, &payload.title),
        || format!("expected title {:?}, got {}", payload.title, body["title"]),
    ))
}

pub async fn content_type(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.create_post(payload).await?;
    let actual = resp.content_type();
    Ok(CheckOutcome::evaluate(
        &resp,
        actual == Some(JSON_CONTENT_TYPE),
        || format!("expected Content-Type {JSON_CONTENT_TYPE:?}, got {actual:?}"),
    ))
}

pub fn has_key(body: &Value, key: &str) -> bool {
    body.as_object().is_some_and(|map| map.contains_key(key))
}

/// True when the body's `title` is a string equal to `expected`.
pub fn title_matches(body: &Value, expected: &str) -> bool {
    body.get("title").and_then(Value::as_str) == Some(expected)
}
