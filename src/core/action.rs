//! # Actions
//!
//! Every gesture the page reacts to becomes an `Action`.
//! A click on a like button? That's `Action::ToggleLike`.
//! A submitted comment form? That's `Action::AddComment`.
//!
//! Resolution is pure: it reads the document and the gesture target, walks
//! up to the nearest marked ancestor, and names what should happen. Network
//! round trips and DOM patches happen in the reconciler.
//!
//! ```text
//! Gesture + Document  →  resolve()  →  Option<Action>
//! ```

use log::warn;

use crate::api::PostId;
use crate::dom::{Document, NodeId, Selector};

// DOM contract with the templates. Renaming any of these breaks the page.
pub const LIKE_BTN: &str = "like-btn";
pub const LIKE_COUNT: &str = "like-count";
pub const LIKED: &str = "liked";
pub const SHARE_BTN: &str = "share-btn";
pub const COMMENT_TOGGLE: &str = "comment-toggle";
pub const COMMENT_FORM: &str = "comment-form";
pub const COMMENT_LIST: &str = "comment-list";
pub const POST_MENU: &str = "post-menu";
pub const POST_MENU_BTN: &str = "post-menu-btn";
pub const POST_MENU_LIST: &str = "post-menu-list";
pub const POST_MENU_DELETE_BTN: &str = "post-menu-delete-btn";
pub const DELETE_POST_BTN: &str = "delete-post-btn";
pub const POST_ID_ATTR: &str = "data-post-id";

/// A raw event delivered to the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click(NodeId),
    Submit(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ToggleLike { post_id: PostId, button: NodeId },
    Share { post_id: PostId },
    ToggleComments { post_id: PostId },
    ToggleMenu { post_id: PostId },
    DeletePost { post_id: PostId, button: NodeId },
    AddComment { post_id: PostId, form: NodeId },
}

impl Action {
    pub fn post_id(&self) -> &PostId {
        match self {
            Action::ToggleLike { post_id, .. }
            | Action::Share { post_id }
            | Action::ToggleComments { post_id }
            | Action::ToggleMenu { post_id }
            | Action::DeletePost { post_id, .. }
            | Action::AddComment { post_id, .. } => post_id,
        }
    }
}

/// One row of the dispatch table: the marker classes that select it and
/// how to build the action from the marked element.
struct Rule {
    markers: &'static [&'static str],
    build: fn(NodeId, PostId) -> Action,
}

fn like(button: NodeId, post_id: PostId) -> Action {
    Action::ToggleLike { post_id, button }
}

fn share(_: NodeId, post_id: PostId) -> Action {
    Action::Share { post_id }
}

fn toggle_comments(_: NodeId, post_id: PostId) -> Action {
    Action::ToggleComments { post_id }
}

fn toggle_menu(_: NodeId, post_id: PostId) -> Action {
    Action::ToggleMenu { post_id }
}

fn delete(button: NodeId, post_id: PostId) -> Action {
    Action::DeletePost { post_id, button }
}

fn add_comment(form: NodeId, post_id: PostId) -> Action {
    Action::AddComment { post_id, form }
}

/// Click rules in precedence order. The first rule with a marked ancestor
/// wins.
const CLICK_RULES: &[Rule] = &[
    Rule { markers: &[LIKE_BTN], build: like },
    Rule { markers: &[SHARE_BTN], build: share },
    Rule { markers: &[COMMENT_TOGGLE], build: toggle_comments },
    Rule { markers: &[POST_MENU_BTN], build: toggle_menu },
    Rule { markers: &[POST_MENU_DELETE_BTN, DELETE_POST_BTN], build: delete },
];

/// Post id of a marked element: its own `data-post-id`, else the nearest
/// ancestor's.
fn post_id_of(doc: &Document, node: NodeId) -> Option<PostId> {
    let carrier = doc.closest(node, &Selector::default().with_attr_present(POST_ID_ATTR))?;
    doc.attr(carrier, POST_ID_ATTR).map(PostId::new)
}

fn apply_rule(doc: &Document, rule: &Rule, marked: NodeId) -> Option<Action> {
    match post_id_of(doc, marked) {
        Some(post_id) => Some((rule.build)(marked, post_id)),
        None => {
            warn!("{} element without {}, gesture ignored", rule.markers[0], POST_ID_ATTR);
            None
        }
    }
}

/// Nearest inclusive ancestor carrying any of `markers`.
fn closest_marked(doc: &Document, target: NodeId, markers: &[&str]) -> Option<NodeId> {
    let mut current = Some(target);
    while let Some(node) = current {
        if markers.iter().any(|marker| doc.has_class(node, marker)) {
            return Some(node);
        }
        current = doc.parent(node);
    }
    None
}

pub fn resolve_click(doc: &Document, target: NodeId) -> Option<Action> {
    for rule in CLICK_RULES {
        if let Some(marked) = closest_marked(doc, target, rule.markers) {
            return apply_rule(doc, rule, marked);
        }
    }
    None
}

/// Submit delegation has a single rule: the target itself must be a
/// comment form.
pub fn resolve_submit(doc: &Document, target: NodeId) -> Option<Action> {
    const SUBMIT_RULE: Rule = Rule { markers: &[COMMENT_FORM], build: add_comment };
    if doc.matches(target, &Selector::class(COMMENT_FORM)) {
        return apply_rule(doc, &SUBMIT_RULE, target);
    }
    None
}

pub fn resolve(doc: &Document, gesture: Gesture) -> Option<Action> {
    match gesture {
        Gesture::Click(target) => resolve_click(doc, target),
        Gesture::Submit(target) => resolve_submit(doc, target),
    }
}

/// True when the click landed outside every post menu.
pub fn is_outside_menus(doc: &Document, target: NodeId) -> bool {
    doc.closest(target, &Selector::class(POST_MENU)).is_none()
}
