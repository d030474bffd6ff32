//! Check catalog for the posts API.
//!
//! Every check issues one request and evaluates one condition on the
//! response. A condition that does not hold is a [`Outcome::Failed`] value,
//! not an error; errors are reserved for the request itself failing, a body
//! that must be JSON and is not, or a missing fixture.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::client::{ApiResponse, ClientError, PostsClient};
use crate::fixtures::{FixtureError, FixtureKey, FixtureSet, PostPayload};
use crate::sink::{Outcome, RequestType};

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

/// Content type the API is expected to answer with.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("fixtures were not loaded: {0}")]
    FixturesUnavailable(String),

    #[error("check {0} sends a payload but names no fixture")]
    NoFixture(Check),
}

/// What a check hands back to the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub status: u16,
    pub outcome: Outcome,
    /// Short description of what was observed when the check failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn passed(status: u16) -> Self {
        Self {
            status,
            outcome: Outcome::Passed,
            detail: None,
        }
    }

    pub fn failed(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            outcome: Outcome::Failed,
            detail: Some(detail.into()),
        }
    }

    /// Build from a condition and a lazily rendered failure detail.
    pub fn evaluate(resp: &ApiResponse, holds: bool, detail: impl FnOnce() -> String) -> Self {
        if holds {
            Self::passed(resp.status_code())
        } else {
            Self::failed(resp.status_code(), detail())
        }
    }
}

/// Shared inputs for a run.
pub struct CheckContext {
    pub client: PostsClient,
    /// `Err` carries the load failure so only checks needing a payload error.
    pub fixtures: Result<FixtureSet, String>,
    pub response_time_budget: Duration,
}

impl CheckContext {
    pub fn fixture(&self, key: FixtureKey) -> Result<&PostPayload, CheckError> {
        match &self.fixtures {
            Ok(set) => Ok(set.get(key)?),
            Err(reason) => Err(CheckError::FixturesUnavailable(reason.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    GetStatus,
    GetResponseType,
    GetResponseLength,
    GetPostType,
    GetPostCount,
    PostStatus,
    PostIdPresent,
    PostTitle,
    PostHeader,
    PutUpdatePost,
    PutPostId,
    PutAuthorization,
    PutCookies,
    PutResponseKeys,
    DeletePost,
    DeleteResponseTime,
    DeleteContentType,
}

impl Check {
    /// All checks in run order.
    pub const ALL: [Check; 17] = [
        Check::GetStatus,
        Check::GetResponseType,
        Check::GetResponseLength,
        Check::GetPostType,
        Check::GetPostCount,
        Check::PostStatus,
        Check::PostIdPresent,
        Check::PostTitle,
        Check::PostHeader,
        Check::PutUpdatePost,
        Check::PutPostId,
        Check::PutAuthorization,
        Check::PutCookies,
        Check::PutResponseKeys,
        Check::DeletePost,
        Check::DeleteResponseTime,
        Check::DeleteContentType,
    ];

    /// Identifier used on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Check::GetStatus => "get_status",
            Check::GetResponseType => "get_response_type",
            Check::GetResponseLength => "get_response_length",
            Check::GetPostType => "get_post_type",
            Check::GetPostCount => "get_post_count",
            Check::PostStatus => "post_status",
            Check::PostIdPresent => "post_id_present",
            Check::PostTitle => "post_title",
            Check::PostHeader => "post_header",
            Check::PutUpdatePost => "put_update_post",
            Check::PutPostId => "put_post_id",
            Check::PutAuthorization => "put_authorization",
            Check::PutCookies => "put_cookies",
            Check::PutResponseKeys => "put_response_keys",
            Check::DeletePost => "delete_post",
            Check::DeleteResponseTime => "delete_response_time",
            Check::DeleteContentType => "delete_content_type",
        }
    }

    /// Name written to the result log.
    pub fn test_name(self) -> &'static str {
        match self {
            Check::GetStatus => "get_status",
            Check::GetResponseType => "response_type",
            Check::GetResponseLength => "response_length",
            Check::GetPostType => "post_type",
            Check::GetPostCount => "posts_count",
            Check::PostStatus => "status",
            Check::PostIdPresent => "id_present",
            Check::PostTitle => "post_title",
            Check::PostHeader => "content-type",
            Check::PutUpdatePost => "updated_title",
            Check::PutPostId => "post_id",
            Check::PutAuthorization => "Authorization",
            Check::PutCookies => "cookies",
            Check::PutResponseKeys => "keys",
            Check::DeletePost => "response_text",
            Check::DeleteResponseTime => "response_time",
            Check::DeleteContentType => "Content-Type",
        }
    }

    pub fn request_type(self) -> RequestType {
        match self {
            Check::GetStatus
            | Check::GetResponseType
            | Check::GetResponseLength
            | Check::GetPostType
            | Check::GetPostCount => RequestType::Get,
            Check::PostStatus | Check::PostIdPresent | Check::PostTitle | Check::PostHeader => {
                RequestType::Post
            }
            Check::PutUpdatePost
            | Check::PutPostId
            | Check::PutAuthorization
            | Check::PutCookies
            | Check::PutResponseKeys => RequestType::Put,
            Check::DeletePost | Check::DeleteResponseTime | Check::DeleteContentType => {
                RequestType::Delete
            }
        }
    }

    /// Fixture payload the check sends, if any.
    pub fn fixture(self) -> Option<FixtureKey> {
        match self {
            Check::PostStatus => Some(FixtureKey::Update),
            Check::PostIdPresent => Some(FixtureKey::Create),
            Check::PostTitle | Check::PostHeader => Some(FixtureKey::Echo),
            Check::PutUpdatePost
            | Check::PutPostId
            | Check::PutAuthorization
            | Check::PutCookies
            | Check::PutResponseKeys => Some(FixtureKey::Update),
            _ => None,
        }
    }

    /// One-line description for `postcheck list`.
    pub fn description(self) -> &'static str {
        match self {
            Check::GetStatus => "GET /posts answers 200",
            Check::GetResponseType => "GET /posts returns a JSON array",
            Check::GetResponseLength => "GET /posts returns at least one post",
            Check::GetPostType => "GET /posts/1 returns a JSON object",
            Check::GetPostCount => "GET /posts returns exactly 100 posts",
            Check::PostStatus => "POST /posts answers 201",
            Check::PostIdPresent => "POST /posts response carries an id",
            Check::PostTitle => "POST /posts echoes the payload title",
            Check::PostHeader => "POST /posts answers with JSON content type",
            Check::PutUpdatePost => "PUT /posts/4 echoes the payload title",
            Check::PutPostId => "PUT /posts/1 keeps id 1",
            Check::PutAuthorization => "PUT /posts/1 sets an Authorization header",
            Check::PutCookies => "PUT /posts/1 sets a session_id cookie",
            Check::PutResponseKeys => "PUT /posts/1 returns exactly id, title, body, userId",
            Check::DeletePost => "DELETE /posts/1 returns the body {}",
            Check::DeleteResponseTime => "DELETE /posts/2 answers within the time budget",
            Check::DeleteContentType => "DELETE /posts/2 answers with JSON content type",
        }
    }

    pub fn from_id(id: &str) -> Option<Check> {
        Check::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Resolve the payload named by [`Check::fixture`], issue the request and
    /// evaluate the condition.
    pub async fn run(self, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
        let payload = self.fixture().map(|key| ctx.fixture(key)).transpose()?;

        match (self, payload) {
            (Check::GetStatus, _) => get::status(ctx).await,
            (Check::GetResponseType, _) => get::response_type(ctx).await,
            (Check::GetResponseLength, _) => get::response_length(ctx).await,
            (Check::GetPostType, _) => get::post_type(ctx).await,
            (Check::GetPostCount, _) => get::post_count(ctx).await,
            (Check::PostStatus, Some(p)) => post::status(ctx, p).await,
            (Check::PostIdPresent, Some(p)) => post::id_present(ctx, p).await,
            (Check::PostTitle, Some(p)) => post::title(ctx, p).await,
            (Check::PostHeader, Some(p)) => post::content_type(ctx, p).await,
            (Check::PutUpdatePost, Some(p)) => put::updated_title(ctx, p).await,
            (Check::PutPostId, Some(p)) => put::post_id(ctx, p).await,
            (Check::PutAuthorization, Some(p)) => put::authorization(ctx, p).await,
            (Check::PutCookies, Some(p)) => put::cookies(ctx, p).await,
            (Check::PutResponseKeys, Some(p)) => put::response_keys(ctx, p).await,
            (Check::DeletePost, _) => delete::response_text(ctx).await,
            (Check::DeleteResponseTime, _) => delete::response_time(ctx).await,
            (Check::DeleteContentType, _) => delete::content_type(ctx).await,
            (check, None) => Err(CheckError::NoFixture(check)),
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.id())
    }
}
