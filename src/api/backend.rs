use std::fmt;

use async_trait::async_trait;

use super::types::{AckResponse, CommentResponse, LikeResponse, PostId};

/// Errors from one round trip to the page endpoints.
#[derive(Debug)]
pub enum BackendError {
    /// Client misconfigured (bad base URL, TLS setup). Nothing was sent.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The server answered with a failure status. `message` is the
    /// response's `error` field when the body carried one.
    Api { status: u16, message: Option<String> },
    /// The body was not the JSON object the endpoint promises.
    Parse(String),
}

impl BackendError {
    /// Server-supplied text worth showing to the user, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => match message {
                Some(m) => write!(f, "server error (HTTP {status}): {m}"),
                None => write!(f, "server error (HTTP {status})"),
            },
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The server side of the page, seen only through its endpoints.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the name of the backend, for logs.
    fn name(&self) -> &str;

    /// `POST /like` with `post_id`.
    async fn like(&self, post_id: &PostId) -> Result<LikeResponse, BackendError>;

    /// `POST /comment` with the form's fields plus `post_id`.
    async fn comment(
        &self,
        post_id: &PostId,
        fields: &[(String, String)],
    ) -> Result<CommentResponse, BackendError>;

    /// `POST /share` with `original_id` and `message`.
    async fn share(&self, original_id: &PostId, message: &str) -> Result<AckResponse, BackendError>;

    /// `POST /post/{id}/delete`. Succeeds only on HTTP 200.
    async fn delete_post(&self, post_id: &PostId) -> Result<AckResponse, BackendError>;
}
