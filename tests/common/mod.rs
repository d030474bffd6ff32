//! Local stand-in for the public posts API.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path as UrlPath, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub const JSON_CT: &str = "application/json; charset=utf-8";

/// Knobs for how the stub deviates from the expected contract.
#[derive(Clone)]
pub struct Behavior {
    pub post_count: usize,
    pub delete_body: &'static str,
    /// Add an Authorization header and session_id cookie to PUT responses.
    pub put_credentials: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            post_count: 100,
            delete_body: "{}",
            put_credentials: true,
        }
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, JSON_CT)
        .body(Body::from(body))
        .unwrap()
}

fn sample_post(id: u64) -> Value {
    json!({
        "userId": 1,
        "id": id,
        "title": format!("post {id}"),
        "body": "lorem ipsum",
    })
}

async fn list_posts(State(b): State<Arc<Behavior>>) -> Response {
    let posts: Vec<Value> = (1..=b.post_count as u64).map(sample_post).collect();
    json_response(StatusCode::OK, Value::Array(posts).to_string())
}

async fn get_post(UrlPath(id): UrlPath<u64>) -> Response {
    json_response(StatusCode::OK, sample_post(id).to_string())
}

async fn create_post(Json(mut payload): Json<Value>) -> Response {
    payload["id"] = json!(101);
    json_response(StatusCode::CREATED, payload.to_string())
}

async fn update_post(
    State(b): State<Arc<Behavior>>,
    UrlPath(id): UrlPath<u64>,
    Json(mut payload): Json<Value>,
) -> Response {
    payload["id"] = json!(id);
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, JSON_CT);
    if b.put_credentials {
        builder = builder
            .header(header::AUTHORIZATION, "Bearer stub")
            .header(header::SET_COOKIE, "session_id=abc123; Path=/");
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

async fn delete_post(State(b): State<Arc<Behavior>>) -> Response {
    json_response(StatusCode::OK, b.delete_body.to_string())
}

/// Start the stub on an ephemeral port and return its base URL.
pub async fn spawn_stub(behavior: Behavior) -> String {
    let app = Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .with_state(Arc::new(behavior));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Write a positional (array-shaped) fixture file.
pub fn write_fixtures(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("test_data.json");
    let data = json!([
        {"title": "first post", "body": "first body", "userId": 1},
        {"title": "T", "body": "B", "userId": 5},
        {"title": "third post", "body": "third body", "userId": 3}
    ]);
    std::fs::write(&path, data.to_string()).unwrap();
    path
}
