//! reqwest-backed `Backend` talking to the page's own server.
//!
//! Bodies go out as `application/x-www-form-urlencoded`, which the server
//! reads the same way it reads a submitted `FormData`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::backend::{Backend, BackendError};
use super::types::{AckResponse, CommentResponse, LikeResponse, PostId};

/// Which statuses count as an answer worth decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    AnySuccess,
    ExactlyOk,
}

impl Accept {
    fn allows(self, status: StatusCode) -> bool {
        match self {
            Accept::AnySuccess => status.is_success(),
            Accept::ExactlyOk => status == StatusCode::OK,
        }
    }
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Creates a backend rooted at `base_url`.
    ///
    /// `timeout` bounds each whole request; `None` waits forever.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        ajax: bool,
        accept: Accept,
    ) -> Result<T, BackendError> {
        info!("POST {} ({} fields)", path, form.len());

        let mut request = self.client.post(self.url(path)).form(form);
        if ajax {
            request = request.header("X-Requested-With", "XMLHttpRequest");
        }
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        debug!("{} response status: {}", path, status);

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !accept.allows(status) {
            warn!("{} failed: {} - {}", path, status, body);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_field(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("{} returned unparseable body: {}", path, e);
            BackendError::Parse(e.to_string())
        })
    }
}

/// Pulls an `error` string out of a failure body, if it is JSON.
fn error_field(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn like(&self, post_id: &PostId) -> Result<LikeResponse, BackendError> {
        let form = [("post_id".to_string(), post_id.to_string())];
        self.post_form("/like", &form, false, Accept::AnySuccess).await
    }

    async fn comment(
        &self,
        post_id: &PostId,
        fields: &[(String, String)],
    ) -> Result<CommentResponse, BackendError> {
        let mut form = fields.to_vec();
        form.push(("post_id".to_string(), post_id.to_string()));
        self.post_form("/comment", &form, false, Accept::AnySuccess).await
    }

    async fn share(&self, original_id: &PostId, message: &str) -> Result<AckResponse, BackendError> {
        let form = [
            ("original_id".to_string(), original_id.to_string()),
            ("message".to_string(), message.to_string()),
        ];
        self.post_form("/share", &form, false, Accept::AnySuccess).await
    }

    async fn delete_post(&self, post_id: &PostId) -> Result<AckResponse, BackendError> {
        let path = format!("/post/{post_id}/delete");
        self.post_form(&path, &[], true, Accept::ExactlyOk).await
    }
}
