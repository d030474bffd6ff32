//! Typed client for the posts resource.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::fixtures::PostPayload;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: String,
        source: reqwest::Error,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        source: serde_json::Error,
    },
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Cookie names set by the response.
    pub cookies: Vec<String>,
    pub body: String,
    /// Time from sending the request until the response head arrived.
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, ClientError> {
        serde_json::from_str(&self.body).map_err(|source| ClientError::InvalidJson {
            url: self.url.clone(),
            source,
        })
    }

    /// Header value as text; `None` when absent or not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.iter().any(|c| c == name)
    }
}

/// Client for `{base_url}/posts`.
#[derive(Debug, Clone)]
pub struct PostsClient {
    client: Client,
    base_url: String,
}

impl PostsClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    pub fn item_url(&self, id: u64) -> String {
        format!("{}/posts/{}", self.base_url, id)
    }

    pub async fn list_posts(&self) -> Result<ApiResponse, ClientError> {
        self.send(Method::GET, self.collection_url(), None).await
    }

    pub async fn get_post(&self, id: u64) -> Result<ApiResponse, ClientError> {
        self.send(Method::GET, self.item_url(id), None).await
    }

    pub async fn create_post(&self, payload: &PostPayload) -> Result<ApiResponse, ClientError> {
        self.send(Method::POST, self.collection_url(), Some(payload))
            .await
    }

    pub async fn update_post(
        &self,
        id: u64,
        payload: &PostPayload,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::PUT, self.item_url(id), Some(payload)).await
    }

    pub async fn delete_post(&self, id: u64) -> Result<ApiResponse, ClientError> {
        self.send(Method::DELETE, self.item_url(id), None).await
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        payload: Option<&PostPayload>,
    ) -> Result<ApiResponse, ClientError> {
        let mut request = self.client.request(method.clone(), &url);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let request_err = |source| ClientError::Request {
            method: method.clone(),
            url: url.clone(),
            source,
        };

        let start = Instant::now();
        let response = request.send().await.map_err(request_err)?;
        let elapsed = start.elapsed();

        let status = response.status();
        let headers = response.headers().clone();
        let cookies = response.cookies().map(|c| c.name().to_string()).collect();
        let body = response.text().await.map_err(request_err)?;

        debug!(
            %method,
            %url,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "request complete"
        );

        Ok(ApiResponse {
            url,
            status,
            headers,
            cookies,
            body,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> ApiResponse {
        ApiResponse {
            url: "http://localhost/posts".into(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            cookies: vec!["session_id".into()],
            body: body.into(),
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = PostsClient::new("https://example.test/", None).unwrap();
        assert_eq!(client.collection_url(), "https://example.test/posts");
        assert_eq!(client.item_url(4), "https://example.test/posts/4");
    }

    #[test]
    fn test_json_parse_error_is_typed() {
        let err = response("<html>").json().unwrap_err();
        assert!(matches!(err, ClientError::InvalidJson { .. }));
        assert_eq!(response("[1,2]").json().unwrap(), serde_json::json!([1, 2]));
    }

    #[test]
    fn test_header_and_cookie_lookup() {
        let mut resp = response("{}");
        resp.headers.insert(
            CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        assert_eq!(resp.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(resp.header("content-type"), resp.content_type());
        assert!(resp.header("authorization").is_none());
        assert!(resp.has_cookie("session_id"));
        assert!(!resp.has_cookie("other"));
    }
}
