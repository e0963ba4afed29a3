//! Shared handle to the live document.
//!
//! Several gestures can be in flight at once, so handlers share the page
//! rather than borrow it. The lock is only ever taken for synchronous DOM
//! work and never held across a network await.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::dom::Document;

#[derive(Debug, Clone, Default)]
pub struct Page {
    doc: Arc<Mutex<Document>>,
}

impl Page {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: Arc::new(Mutex::new(doc)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&*self.lock())
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut *self.lock())
    }
}
