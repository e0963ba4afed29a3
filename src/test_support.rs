//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use crate::api::{AckResponse, Backend, BackendError, CommentResponse, LikeResponse, PostId};
use crate::core::page::Page;
use crate::core::reconciler::Reconciler;
use crate::dom::{Document, NodeSpec};
use crate::host::RecordingHost;

/// Fixture for one rendered post, wired the way the templates render it.
pub fn post_spec(id: &str) -> serde_json::Value {
    json!({
        "tag": "article", "attrs": { "class": "post", "data-post-id": id },
        "children": [
            { "tag": "div", "attrs": { "class": "post-menu", "data-post-id": id }, "children": [
                { "tag": "button", "attrs": { "class": "post-menu-btn" }, "text": "⋯" },
                { "tag": "ul", "attrs": { "class": "post-menu-list" }, "display": "none", "children": [
                    { "tag": "li", "children": [
                        { "tag": "button", "attrs": { "class": "post-menu-delete-btn" }, "text": "刪除" }
                    ]}
                ]}
            ]},
            { "tag": "p", "attrs": { "class": "post-body" }, "text": "今天打卡完成！" },
            { "tag": "div", "attrs": { "class": "post-actions" }, "children": [
                { "tag": "button", "attrs": { "class": "like-btn", "data-post-id": id }, "children": [
                    "👍 ",
                    { "tag": "span", "attrs": { "class": "like-count" }, "text": "3" }
                ]},
                { "tag": "button", "attrs": { "class": "comment-toggle", "data-post-id": id }, "text": "💬 留言 (2)" },
                { "tag": "button", "attrs": { "class": "share-btn", "data-post-id": id }, "text": "分享" }
            ]},
            { "tag": "div", "attrs": { "id": format!("comments-{id}"), "class": "comments" }, "display": "none", "children": [
                { "tag": "ul", "attrs": { "class": "comment-list" }, "children": [
                    { "tag": "li", "text": "bob: 加油" },
                    { "tag": "li", "text": "carol: 👍" }
                ]},
                { "tag": "form", "attrs": { "class": "comment-form", "data-post-id": id }, "children": [
                    { "tag": "input", "attrs": { "name": "text", "type": "text" }, "value": "" },
                    { "tag": "button", "attrs": { "type": "submit" }, "text": "送出" }
                ]}
            ]}
        ]
    })
}

/// A document holding one post per id.
pub fn page_doc(ids: &[&str]) -> Document {
    let specs: Vec<NodeSpec> = ids
        .iter()
        .map(|id| serde_json::from_value(post_spec(id)).expect("fixture is valid"))
        .collect();
    Document::from_specs(&specs)
}

/// A request the scripted backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Like(PostId),
    Comment(PostId, Vec<(String, String)>),
    Share(PostId, String),
    Delete(PostId),
}

#[derive(Default)]
struct Script {
    likes: VecDeque<Result<LikeResponse, BackendError>>,
    comments: VecDeque<Result<CommentResponse, BackendError>>,
    acks: VecDeque<Result<AckResponse, BackendError>>,
    calls: Vec<Call>,
}

/// A backend answering from queued responses. An empty queue answers with
/// a network error.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request waits for a `notify_one` on the returned handle before
    /// it answers.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                script: Mutex::default(),
                gate: Some(gate.clone()),
            },
            gate,
        )
    }

    pub fn push_like(&self, r: Result<LikeResponse, BackendError>) {
        self.script.lock().unwrap().likes.push_back(r);
    }

    pub fn push_comment(&self, r: Result<CommentResponse, BackendError>) {
        self.script.lock().unwrap().comments.push_back(r);
    }

    pub fn push_ack(&self, r: Result<AckResponse, BackendError>) {
        self.script.lock().unwrap().acks.push_back(r);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn unscripted<T>() -> Result<T, BackendError> {
        Err(BackendError::Network("connection refused".to_string()))
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn like(&self, post_id: &PostId) -> Result<LikeResponse, BackendError> {
        self.script.lock().unwrap().calls.push(Call::Like(post_id.clone()));
        self.wait().await;
        let next = self.script.lock().unwrap().likes.pop_front();
        next.unwrap_or_else(Self::unscripted)
    }

    async fn comment(
        &self,
        post_id: &PostId,
        fields: &[(String, String)],
    ) -> Result<CommentResponse, BackendError> {
        self.script
            .lock()
            .unwrap()
            .calls
            .push(Call::Comment(post_id.clone(), fields.to_vec()));
        self.wait().await;
        let next = self.script.lock().unwrap().comments.pop_front();
        next.unwrap_or_else(Self::unscripted)
    }

    async fn share(&self, original_id: &PostId, message: &str) -> Result<AckResponse, BackendError> {
        self.script
            .lock()
            .unwrap()
            .calls
            .push(Call::Share(original_id.clone(), message.to_string()));
        self.wait().await;
        let next = self.script.lock().unwrap().acks.pop_front();
        next.unwrap_or_else(Self::unscripted)
    }

    async fn delete_post(&self, post_id: &PostId) -> Result<AckResponse, BackendError> {
        self.script.lock().unwrap().calls.push(Call::Delete(post_id.clone()));
        self.wait().await;
        let next = self.script.lock().unwrap().acks.pop_front();
        next.unwrap_or_else(Self::unscripted)
    }
}

/// A reconciler over a page of `ids`, with handles to its collaborators.
pub fn test_reconciler(ids: &[&str]) -> (Reconciler, Arc<ScriptedBackend>, Arc<RecordingHost>) {
    let backend = Arc::new(ScriptedBackend::new());
    let host = Arc::new(RecordingHost::new());
    let reconciler = Reconciler::new(Page::new(page_doc(ids)), backend.clone(), host.clone());
    (reconciler, backend, host)
}
