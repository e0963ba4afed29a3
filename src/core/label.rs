//! Best-effort bump of the count shown in a comment toggle label.
//!
//! The label embeds the count as `<word> (<digits>)`, e.g. `💬 留言 (3)`.
//! Only the digits are rewritten. A label that does not match is left
//! alone; the true count comes back with the next reload.

use log::warn;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct CountLabel {
    pattern: Regex,
}

impl CountLabel {
    /// Pattern for `<word> (<digits>)`. `None` for an empty word, which
    /// disables label updates.
    pub fn new(word: &str) -> Option<Self> {
        if word.is_empty() {
            return None;
        }
        match Regex::new(&format!(r"{} \((\d+)\)", regex::escape(word))) {
            Ok(pattern) => Some(Self { pattern }),
            Err(e) => {
                warn!("comment label word {:?} unusable: {}", word, e);
                None
            }
        }
    }

    /// Returns `label` with its first embedded count increased by one, or
    /// `None` when there is no count or it would overflow.
    pub fn increment(&self, label: &str) -> Option<String> {
        let digits = self.pattern.captures(label)?.get(1)?;
        let count: u64 = digits.as_str().parse().ok()?;
        let next = count.checked_add(1)?;
        Some(format!(
            "{}{}{}",
            &label[..digits.start()],
            next,
            &label[digits.end()..]
        ))
    }
}
