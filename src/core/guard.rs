//! Scoped disabling of the control that triggered a request.
//!
//! Acquiring disables the control; dropping the guard re-enables it. Every
//! exit from a request handler (success, failure alert, early return,
//! panic unwinding) therefore ends with the control enabled again, and
//! exactly once.

use log::debug;

use super::page::Page;
use crate::dom::NodeId;

pub struct DisabledControl {
    page: Page,
    control: NodeId,
}

impl DisabledControl {
    /// Disables `control` and returns the guard, or `None` if it was already
    /// disabled. A disabled control receives no gestures, so `None` means
    /// the gesture must be dropped.
    pub fn acquire(page: &Page, control: NodeId) -> Option<Self> {
        let acquired = page.write(|doc| {
            if doc.is_disabled(control) {
                false
            } else {
                doc.set_disabled(control, true);
                true
            }
        });
        if !acquired {
            debug!("control {:?} already disabled, gesture dropped", control);
            return None;
        }
        Some(Self {
            page: page.clone(),
            control,
        })
    }
}

impl Drop for DisabledControl {
    fn drop(&mut self) {
        let control = self.control;
        self.page.write(|doc| doc.set_disabled(control, false));
    }
}
