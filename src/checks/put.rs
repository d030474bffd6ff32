//! Update checks.
//!
//! The Authorization header and session_id cookie checks encode expectations
//! the public service is not known to meet; they are kept as-is and are
//! expected to log Failed against it.

use std::collections::BTreeSet;

use serde_json::Value;

use super::post::title_matches;
use super::{CheckContext, CheckError, CheckOutcome};
use crate::fixtures::PostPayload;

const UPDATE_TARGET_ID: u64 = 4;
const SAMPLE_POST_ID: u64 = 1;

pub const EXPECTED_KEYS: [&str; 4] = ["id", "title", "body", "userId"];

pub async fn updated_title(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.update_post(UPDATE_TARGET_ID, payload).await?;
    let body = resp.json()?;
    Ok(CheckOutcome::evaluate(
        &resp,
        title_matches(&body, &payload.title),
        || format!("expected title {:?}, got {}", payload.title, body["title"]),
    ))
}

pub async fn post_id(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.update_post(SAMPLE_POST_ID, payload).await?;
    let body = resp.json()?;
    Ok(CheckOutcome::evaluate(&resp, id_equals(&body, SAMPLE_POST_ID), || {
        format!("expected id {SAMPLE_POST_ID}, got {}", body["id"])
    }))
}

pub async fn authorization(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.update_post(SAMPLE_POST_ID, payload).await?;
    let present = resp.headers.contains_key(reqwest::header::AUTHORIZATION);
    Ok(CheckOutcome::evaluate(&resp, present, || {
        "no Authorization header in response".to_string()
    }))
}

pub async fn cookies(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.update_post(SAMPLE_POST_ID, payload).await?;
    Ok(CheckOutcome::evaluate(&resp, resp.has_cookie("session_id"), || {
        format!("no session_id cookie, got {:?}", resp.cookies)
    }))
}

pub async fn response_keys(
    ctx: &CheckContext,
    payload: &PostPayload,
) -> Result<CheckOutcome, CheckError> {
    let resp = ctx.client.update_post(SAMPLE_POST_ID, payload).await?;
    let body = resp.json()?;
    let keys = key_set(&body);
    Ok(CheckOutcome::evaluate(&resp, keys_match(&keys), || {
        format!("expected keys {EXPECTED_KEYS:?}, got {keys:?}")
    }))
}

/// Numeric comparison, so `1` and `1.0` both match id 1.
pub fn id_equals(body: &Value, expected: u64) -> bool {
    body.get("id").and_then(Value::as_f64) == Some(expected as f64)
}

/// Object keys of the body; empty for non-objects.
pub fn key_set(body: &Value) -> BTreeSet<&str> {
    body.as_object()
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

pub fn keys_match(keys: &BTreeSet<&str>) -> bool {
    keys.len() == EXPECTED_KEYS.len() && EXPECTED_KEYS.iter().all(|k| keys.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_equals() {
        assert!(id_equals(&json!({"id": 1}), 1));
        assert!(id_equals(&json!({"id": 1.0}), 1));
        assert!(!id_equals(&json!({"id": 1.5}), 1));
        assert!(!id_equals(&json!({"id": "1"}), 1));
        assert!(!id_equals(&json!({"id": 4}), 1));
        assert!(!id_equals(&json!({}), 1));
    }

    #[test]
    fn test_keys_match_exact_set() {
        let exact = json!({"id": 1, "title": "T", "body": "B", "userId": 5});
        assert!(keys_match(&key_set(&exact)));

        let extra = json!({"id": 1, "title": "T", "body": "B", "userId": 5, "tags": []});
        assert!(!keys_match(&key_set(&extra)));

        let missing = json!({"id": 1, "title": "T", "body": "B"});
        assert!(!keys_match(&key_set(&missing)));

        assert!(!keys_match(&key_set(&json!([]))));
    }
}
