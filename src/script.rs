//! # Gesture Scripts
//!
//! A script is a JSON array of steps replayed against a reconciler:
//!
//! ```json
//! [
//!   { "fill": { "selector": ".comment-form input[name=text]", "value": "hi" } },
//!   { "submit": ".comment-form" },
//!   { "prompt": "look at this" },
//!   { "click": ".share-btn" },
//!   { "concurrent": [ { "click": ".like-btn" }, { "click": ".like-btn" } ] }
//! ]
//! ```
//!
//! Steps inside `concurrent` are dispatched together, so the second like
//! above lands while the first request is still in flight.

use std::fmt;

use futures::future::join_all;
use log::{debug, info};
use serde::Deserialize;

use crate::core::action::{Action, Gesture};
use crate::core::reconciler::Reconciler;
use crate::dom::{DomError, Selector};
use crate::host::RecordingHost;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Click(String),
    Submit(String),
    Fill { selector: String, value: String },
    /// Answer for the next prompt; `null` cancels it.
    Prompt(Option<String>),
    Concurrent(Vec<Step>),
}

#[derive(Debug)]
pub enum ScriptError {
    Dom(DomError),
    /// `concurrent` inside `concurrent`.
    NestedConcurrent,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Dom(e) => write!(f, "script step failed: {e}"),
            ScriptError::NestedConcurrent => write!(f, "concurrent steps cannot be nested"),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<DomError> for ScriptError {
    fn from(e: DomError) -> Self {
        ScriptError::Dom(e)
    }
}

/// What one gesture step resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub step: String,
    pub action: Option<Action>,
}

/// Runs `steps` in order and reports every gesture's outcome.
pub async fn run(
    reconciler: &Reconciler,
    host: &RecordingHost,
    steps: &[Step],
) -> Result<Vec<Outcome>, ScriptError> {
    let mut outcomes = Vec::new();
    for step in steps {
        match step {
            Step::Concurrent(inner) => {
                let mut gestures = Vec::new();
                for s in inner {
                    if matches!(s, Step::Concurrent(_)) {
                        return Err(ScriptError::NestedConcurrent);
                    }
                    if let Some(g) = prepare(reconciler, host, s)? {
                        gestures.push(g);
                    }
                }
                info!("dispatching {} gestures concurrently", gestures.len());
                let results =
                    join_all(gestures.iter().map(|(_, g)| reconciler.dispatch(*g))).await;
                for ((label, _), action) in gestures.into_iter().zip(results) {
                    outcomes.push(Outcome { step: label, action });
                }
            }
            other => {
                if let Some((label, g)) = prepare(reconciler, host, other)? {
                    let action = reconciler.dispatch(g).await;
                    outcomes.push(Outcome { step: label, action });
                }
            }
        }
    }
    Ok(outcomes)
}

/// Applies non-gesture steps directly; turns gesture steps into a labelled
/// `Gesture` for dispatch.
fn prepare(
    reconciler: &Reconciler,
    host: &RecordingHost,
    step: &Step,
) -> Result<Option<(String, Gesture)>, ScriptError> {
    let page = reconciler.page();
    match step {
        Step::Click(sel) => {
            let target = page.read(|doc| doc.select(sel))?;
            Ok(Some((format!("click {sel}"), Gesture::Click(target))))
        }
        Step::Submit(sel) => {
            let target = page.read(|doc| doc.select(sel))?;
            Ok(Some((format!("submit {sel}"), Gesture::Submit(target))))
        }
        Step::Fill { selector, value } => {
            let target = page.read(|doc| select_descendant(doc, selector))?;
            page.write(|doc| doc.set_value(target, value));
            debug!("filled {} with {:?}", selector, value);
            Ok(None)
        }
        Step::Prompt(answer) => {
            host.queue_answer(answer.clone());
            Ok(None)
        }
        Step::Concurrent(_) => Err(ScriptError::NestedConcurrent),
    }
}

/// Like `Document::select`, plus one level of descendant combinator
/// (`.comment-form input[name=text]`), which is what fill steps need.
fn select_descendant(doc: &crate::dom::Document, selector: &str) -> Result<crate::dom::NodeId, DomError> {
    let parts: Vec<&str> = selector.split_whitespace().collect();
    match parts.as_slice() {
        [single] => doc.select(single),
        [outer, inner] => {
            let scope = doc.select(outer)?;
            let inner_sel: Selector = inner.parse()?;
            doc.query(scope, &inner_sel)
                .ok_or_else(|| DomError::NoMatch(selector.to_string()))
        }
        _ => Err(DomError::Selector(format!("unsupported selector {selector}"))),
    }
}
