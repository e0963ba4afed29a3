//! Post menus: at most one open at a time.
//!
//! The open menu is tracked by post id instead of being rediscovered by
//! scanning the page, so opening or closing touches at most two menus.

use log::debug;

use crate::api::PostId;
use crate::dom::{Document, NodeId, Selector};

use super::action::{POST_MENU, POST_MENU_LIST};

const SHOWN: &str = "block";
const HIDDEN: &str = "none";

#[derive(Debug, Default)]
pub struct MenuTracker {
    open: Option<PostId>,
}

impl MenuTracker {
    /// Picks up a menu the page was rendered with already open.
    pub fn from_document(doc: &Document) -> Self {
        let open = doc
            .query_all(doc.root(), &Selector::class(POST_MENU).with_attr_present("data-post-id"))
            .into_iter()
            .find(|menu| {
                doc.query(*menu, &Selector::class(POST_MENU_LIST))
                    .is_some_and(|list| doc.display(list) == Some(SHOWN))
            })
            .and_then(|menu| doc.data(menu, "post-id"))
            .map(PostId::new);
        Self { open }
    }

    pub fn open_menu(&self) -> Option<&PostId> {
        self.open.as_ref()
    }

    /// Opens the menu of `post_id`, closing any other; closes it if it was
    /// the open one.
    pub fn toggle(&mut self, doc: &mut Document, post_id: &PostId) {
        if self.open.as_ref() == Some(post_id) {
            self.close(doc);
            return;
        }
        self.close(doc);
        if let Some(list) = menu_list(doc, post_id) {
            doc.set_display(list, SHOWN);
            self.open = Some(post_id.clone());
            debug!("menu {} opened", post_id);
        }
    }

    /// Closes the open menu, if any.
    pub fn close(&mut self, doc: &mut Document) {
        if let Some(post_id) = self.open.take() {
            if let Some(list) = menu_list(doc, &post_id) {
                doc.set_display(list, HIDDEN);
            }
            debug!("menu {} closed", post_id);
        }
    }
}

fn menu_list(doc: &Document, post_id: &PostId) -> Option<NodeId> {
    let menu = doc.query(
        doc.root(),
        &Selector::class(POST_MENU).with_attr("data-post-id", post_id.as_str()),
    )?;
    doc.query(menu, &Selector::class(POST_MENU_LIST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::page_doc;

    fn list_shown(doc: &Document, id: &str) -> bool {
        menu_list(doc, &PostId::new(id)).is_some_and(|l| doc.display(l) == Some(SHOWN))
    }

    #[test]
    fn test_second_menu_closes_first() {
        let mut doc = page_doc(&["1", "2"]);
        let mut menus = MenuTracker::default();
        menus.toggle(&mut doc, &PostId::new("1"));
        assert!(list_shown(&doc, "1"));
        menus.toggle(&mut doc, &PostId::new("2"));
        assert!(!list_shown(&doc, "1"));
        assert!(list_shown(&doc, "2"));
        assert_eq!(menus.open_menu(), Some(&PostId::new("2")));
    }

    #[test]
    fn test_toggle_same_menu_closes_it() {
        let mut doc = page_doc(&["1"]);
        let mut menus = MenuTracker::default();
        menus.toggle(&mut doc, &PostId::new("1"));
        menus.toggle(&mut doc, &PostId::new("1"));
        assert!(!list_shown(&doc, "1"));
        assert_eq!(menus.open_menu(), None);
    }

    #[test]
    fn test_close_without_open_menu_is_noop() {
        let mut doc = page_doc(&["1"]);
        let before = doc.outer_html(doc.root());
        MenuTracker::default().close(&mut doc);
        assert_eq!(doc.outer_html(doc.root()), before);
    }

    #[test]
    fn test_from_document_finds_open_menu() {
        let mut doc = page_doc(&["1", "2"]);
        let list = menu_list(&doc, &PostId::new("2")).unwrap();
        doc.set_display(list, SHOWN);
        let menus = MenuTracker::from_document(&doc);
        assert_eq!(menus.open_menu(), Some(&PostId::new("2")));
    }

    #[test]
    fn test_unknown_post_leaves_nothing_open() {
        let mut doc = page_doc(&["1"]);
        let mut menus = MenuTracker::default();
        menus.toggle(&mut doc, &PostId::new("99"));
        assert_eq!(menus.open_menu(), None);
    }
}
