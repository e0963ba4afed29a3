//! # Host Capabilities
//!
//! The window-level effects the reconciler may trigger: a blocking alert,
//! a blocking text prompt, and a full page reload. A browser binding maps
//! these to `alert()`, `prompt()` and `location.reload()`.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use log::info;

pub trait Host: Send + Sync {
    /// Shows a modal message. Returns once the user dismissed it.
    fn alert(&self, message: &str);

    /// Asks for a line of text. `None` when the user cancelled.
    fn prompt(&self, message: &str) -> Option<String>;

    /// Reloads the page. The current page state is gone afterwards.
    fn reload(&self);
}

#[derive(Debug, Default)]
struct Record {
    alerts: Vec<String>,
    prompts: Vec<String>,
    answers: VecDeque<Option<String>>,
    reloads: usize,
}

/// A headless host that records every effect.
///
/// Prompt answers are queued up front with `queue_answer`; a prompt with no
/// queued answer behaves as cancelled.
#[derive(Debug, Default)]
pub struct RecordingHost {
    record: Mutex<Record>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, Record> {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn queue_answer(&self, answer: Option<String>) {
        self.record().answers.push_back(answer);
    }

    pub fn alerts(&self) -> Vec<String> {
        self.record().alerts.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.record().prompts.clone()
    }

    pub fn reloads(&self) -> usize {
        self.record().reloads
    }
}

impl Host for RecordingHost {
    fn alert(&self, message: &str) {
        info!("alert: {}", message);
        self.record().alerts.push(message.to_string());
    }

    fn prompt(&self, message: &str) -> Option<String> {
        let mut record = self.record();
        record.prompts.push(message.to_string());
        let answer = record.answers.pop_front().flatten();
        info!("prompt: {} -> {:?}", message, answer);
        answer
    }

    fn reload(&self) {
        info!("reload requested");
        self.record().reloads += 1;
    }
}
