//! # Interaction Reconciler
//!
//! Turns delegated gestures into endpoint round trips and patches the
//! answers into the page.
//!
//! ```text
//! gesture ─▶ resolve() ─▶ Action
//!                           │
//!        ┌──────────────────┼─────────────────────────┐
//!        ▼                  ▼                         ▼
//!  local toggle       disable control            prompt + request
//!  (menu, panel)      request once               reload or alert
//!                     reconcile | alert
//!                     re-enable (guard drop)
//! ```
//!
//! The server is the only source of truth: counts, toggle state and comment
//! contents are copied from responses, never computed here. A response
//! field that is absent leaves its part of the page untouched.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::api::{Backend, BackendError, CommentView, LikeResponse, PostId};
use crate::dom::{Document, NodeId, Selector};
use crate::host::Host;

use super::action::{
    self, Action, Gesture, COMMENT_LIST, COMMENT_TOGGLE, LIKED, LIKE_COUNT, POST_ID_ATTR,
};
use super::config::{Messages, ResolvedConfig, DEFAULT_COMMENT_WORD};
use super::guard::DisabledControl;
use super::label::CountLabel;
use super::menu::MenuTracker;
use super::page::Page;

/// Which alert texts belong to an action.
struct FailureText<'a> {
    failed: &'a str,
    network: &'a str,
}

impl FailureText<'_> {
    /// Server message if there is one, else the generic text for the kind
    /// of failure.
    fn for_error(&self, err: &BackendError) -> String {
        if let Some(message) = err.server_message() {
            return message.to_string();
        }
        match err {
            BackendError::Api { .. } => self.failed.to_string(),
            BackendError::Config(_) | BackendError::Network(_) | BackendError::Parse(_) => {
                self.network.to_string()
            }
        }
    }

    fn for_rejection(&self, error: Option<String>) -> String {
        error.unwrap_or_else(|| self.failed.to_string())
    }
}

pub struct Reconciler {
    page: Page,
    backend: Arc<dyn Backend>,
    host: Arc<dyn Host>,
    messages: Messages,
    count_label: Option<CountLabel>,
    menus: Mutex<MenuTracker>,
}

impl Reconciler {
    pub fn new(page: Page, backend: Arc<dyn Backend>, host: Arc<dyn Host>) -> Self {
        let menus = page.read(MenuTracker::from_document);
        info!("reconciler talking to the {} backend", backend.name());
        Self {
            page,
            backend,
            host,
            messages: Messages::default(),
            count_label: CountLabel::new(DEFAULT_COMMENT_WORD),
            menus: Mutex::new(menus),
        }
    }

    pub fn from_config(
        page: Page,
        backend: Arc<dyn Backend>,
        host: Arc<dyn Host>,
        config: &ResolvedConfig,
    ) -> Self {
        let mut reconciler = Self::new(page, backend, host);
        reconciler.messages = config.messages.clone();
        reconciler.count_label = CountLabel::new(&config.comment_word);
        reconciler
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn open_menu(&self) -> Option<PostId> {
        self.menus().open_menu().cloned()
    }

    fn menus(&self) -> MutexGuard<'_, MenuTracker> {
        self.menus.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ========================================================================
    // Delegation entry points
    // ========================================================================

    /// Handles one gesture to completion and returns the action it resolved
    /// to, if any.
    pub async fn dispatch(&self, gesture: Gesture) -> Option<Action> {
        let (resolved, outside_menus) = self.page.read(|doc| {
            let outside = match gesture {
                Gesture::Click(target) => action::is_outside_menus(doc, target),
                Gesture::Submit(_) => false,
            };
            (action::resolve(doc, gesture), outside)
        });
        if outside_menus {
            let mut menus = self.menus();
            self.page.write(|doc| menus.close(doc));
        }
        let resolved = resolved?;
        debug!("{:?} resolved to {:?}", gesture, resolved);
        self.perform(&resolved).await;
        Some(resolved)
    }

    pub async fn click(&self, target: NodeId) -> Option<Action> {
        self.dispatch(Gesture::Click(target)).await
    }

    pub async fn submit(&self, target: NodeId) -> Option<Action> {
        self.dispatch(Gesture::Submit(target)).await
    }

    async fn perform(&self, action: &Action) {
        match action {
            Action::ToggleLike { post_id, button } => self.like(post_id, *button).await,
            Action::Share { post_id } => self.share(post_id).await,
            Action::ToggleComments { post_id } => self.toggle_comments(post_id),
            Action::ToggleMenu { post_id } => {
                let mut menus = self.menus();
                self.page.write(|doc| menus.toggle(doc, post_id));
            }
            Action::DeletePost { post_id, button } => self.delete(post_id, *button).await,
            Action::AddComment { post_id, form } => self.comment(post_id, *form).await,
        }
    }

    // ========================================================================
    // Request-backed actions
    // ========================================================================

    async fn like(&self, post_id: &PostId, button: NodeId) {
        let Some(_disabled) = DisabledControl::acquire(&self.page, button) else {
            return;
        };
        let text = FailureText {
            failed: &self.messages.like_failed,
            network: &self.messages.like_network,
        };

        match self.backend.like(post_id).await {
            Ok(resp) if resp.ok => {
                info!("like {}: likes={:?} liked={:?}", post_id, resp.likes, resp.liked);
                self.page.write(|doc| apply_like(doc, button, &resp));
            }
            Ok(_) => {
                warn!("like {} rejected", post_id);
                self.host.alert(text.failed);
            }
            Err(e) => {
                warn!("like {} failed: {}", post_id, e);
                self.host.alert(&text.for_error(&e));
            }
        }
    }

    async fn comment(&self, post_id: &PostId, form: NodeId) {
        let (fields, submit_button) = self.page.read(|doc| {
            (
                doc.form_fields(form),
                doc.query(form, &Selector::tag("button").with_attr("type", "submit")),
            )
        });
        let _disabled = match submit_button {
            Some(button) => match DisabledControl::acquire(&self.page, button) {
                Some(guard) => Some(guard),
                None => return,
            },
            None => None,
        };
        let text = FailureText {
            failed: &self.messages.comment_failed,
            network: &self.messages.comment_network,
        };

        match self.backend.comment(post_id, &fields).await {
            Ok(resp) if resp.ok => match resp.comment {
                Some(comment) => {
                    info!("comment on {} by {}", post_id, comment.user);
                    let applied = self.page.write(|doc| {
                        apply_comment(doc, form, post_id, &comment, self.count_label.as_ref())
                    });
                    if !applied {
                        self.host.alert(text.network);
                    }
                }
                None => debug!("comment on {} accepted without a comment payload", post_id),
            },
            Ok(resp) => {
                warn!("comment on {} rejected: {:?}", post_id, resp.error);
                self.host.alert(&text.for_rejection(resp.error));
            }
            Err(e) => {
                warn!("comment on {} failed: {}", post_id, e);
                self.host.alert(&text.for_error(&e));
            }
        }
    }

    async fn share(&self, post_id: &PostId) {
        let message = self.host.prompt(&self.messages.share_prompt).unwrap_or_default();
        let text = FailureText {
            failed: &self.messages.share_failed,
            network: &self.messages.share_network,
        };

        match self.backend.share(post_id, &message).await {
            Ok(resp) if resp.ok => {
                info!("shared {}", post_id);
                self.host.reload();
            }
            Ok(resp) => {
                warn!("share of {} rejected: {:?}", post_id, resp.error);
                self.host.alert(&text.for_rejection(resp.error));
            }
            Err(e) => {
                warn!("share of {} failed: {}", post_id, e);
                self.host.alert(&text.for_error(&e));
            }
        }
    }

    async fn delete(&self, post_id: &PostId, button: NodeId) {
        let Some(_disabled) = DisabledControl::acquire(&self.page, button) else {
            return;
        };
        let text = FailureText {
            failed: &self.messages.delete_failed,
            network: &self.messages.delete_network,
        };

        match self.backend.delete_post(post_id).await {
            Ok(resp) if resp.ok => {
                info!("deleted {}", post_id);
                self.host.reload();
            }
            Ok(resp) => {
                warn!("delete of {} rejected: {:?}", post_id, resp.error);
                self.host.alert(&text.for_rejection(resp.error));
            }
            Err(e) => {
                warn!("delete of {} failed: {}", post_id, e);
                self.host.alert(&text.for_error(&e));
            }
        }
    }

    // ========================================================================
    // Local actions
    // ========================================================================

    fn toggle_comments(&self, post_id: &PostId) {
        self.page.write(|doc| {
            let Some(panel) = doc.get_element_by_id(&format!("comments-{post_id}")) else {
                debug!("no comment panel for {}", post_id);
                return;
            };
            let next = if doc.display(panel) == Some("none") {
                "block"
            } else {
                "none"
            };
            doc.set_display(panel, next);
        });
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

fn apply_like(doc: &mut Document, button: NodeId, resp: &LikeResponse) {
    if let Some(likes) = resp.likes
        && let Some(count) = doc.query(button, &Selector::class(LIKE_COUNT))
    {
        doc.set_text_content(count, &likes.to_string());
    }
    match resp.liked {
        Some(true) => doc.add_class(button, LIKED),
        Some(false) => doc.remove_class(button, LIKED),
        None => {}
    }
}

fn apply_comment(
    doc: &mut Document,
    form: NodeId,
    post_id: &PostId,
    comment: &CommentView,
    count_label: Option<&CountLabel>,
) -> bool {
    let list_selector = Selector::class(COMMENT_LIST);
    let list = doc
        .parent(form)
        .and_then(|parent| doc.query(parent, &list_selector));
    let Some(list) = list else {
        warn!("no {} next to the form of {}, comment not shown", list_selector, post_id);
        return false;
    };
    let item = render_comment(doc, comment);
    doc.append_child(list, item);

    if let Some(input) = doc.query(form, &Selector::tag("input").with_attr("name", "text")) {
        doc.set_value(input, "");
    }

    let toggle = doc.query(
        doc.root(),
        &Selector::class(COMMENT_TOGGLE).with_attr(POST_ID_ATTR, post_id.as_str()),
    );
    if let (Some(toggle), Some(count_label)) = (toggle, count_label) {
        let current = doc.text_content(toggle);
        match count_label.increment(&current) {
            Some(next) => doc.set_text_content(toggle, &next),
            None => debug!("comment label {:?} has no count, left as is", current),
        }
    }
    true
}

/// `<li>[<img class="c-avatar">]<strong>user</strong>: text <span class="c-time">time</span></li>`
///
/// Built node by node, so server text never becomes markup.
fn render_comment(doc: &mut Document, comment: &CommentView) -> NodeId {
    let li = doc.create_element("li");

    if let Some(avatar) = &comment.avatar {
        let img = doc.create_element("img");
        doc.set_attr(img, "class", "c-avatar");
        doc.set_attr(img, "src", avatar);
        doc.set_attr(img, "alt", &comment.user);
        doc.append_child(li, img);
    }

    let user = doc.create_element("strong");
    doc.set_text_content(user, &comment.user);
    doc.append_child(li, user);

    let body = doc.create_text(&format!(": {} ", comment.text));
    doc.append_child(li, body);

    let time = doc.create_element("span");
    doc.set_attr(time, "class", "c-time");
    doc.set_text_content(time, &comment.time);
    doc.append_child(li, time);

    li
}
