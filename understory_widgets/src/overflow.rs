// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overflow menu listing docked widgets that did not fit.

use serde_json::{Value, json};
use tracing::warn;
use understory_dom::{Document, ElementAttrs, ElementId};

use crate::context::WidgetContext;
use crate::error::WidgetError;
use crate::instance::{Chrome, Wid};
use crate::widget::{Widget, WidgetDefinition};

/// Registered name of [`BoxSelector`].
pub const BOX_SELECTOR: &str = "BoxSelector";

#[derive(Clone, Debug)]
struct MenuItem {
    wid: Wid,
    element: Option<ElementId>,
}

/// A toggle button over a list of evicted docked widgets.
///
/// Every context registers it as [`BOX_SELECTOR`]. The dock creates one instance on the first
/// eviction and destroys it when its last item is restored. A click on an item maps to
/// [`WidgetContext::restore_docked`].
#[derive(Clone, Debug, Default)]
pub struct BoxSelector {
    button: Option<ElementId>,
    list: Option<ElementId>,
    items: Vec<MenuItem>,
    open: bool,
}

impl Widget for BoxSelector {
    fn append(&mut self, cx: &mut WidgetContext, chrome: &Chrome) -> Result<(), WidgetError> {
        let doc = cx.document_mut();
        self.button = Some(doc.add(
            "button",
            chrome.body,
            ElementAttrs::class("btn btn-secondary dropdown-toggle").with_text("Widgets"),
        )?);
        let list = doc.add("ul", chrome.body, ElementAttrs::class("dropdown-menu"))?;
        doc.set_style(list, "display", "none");
        self.list = Some(list);
        Ok(())
    }

    fn get_values(&self) -> Value {
        json!(self.items.iter().map(|i| i.wid.get()).collect::<Vec<_>>())
    }
}

impl BoxSelector {
    pub(crate) fn definition() -> WidgetDefinition {
        WidgetDefinition::of::<Self>()
            .with_panel(false)
            .with_class_name("box-selector")
            .with_version("0.1.0")
    }

    /// Add an entry for `wid`. Returns false if it is already listed.
    pub fn add_item(&mut self, doc: &mut Document, wid: Wid, label: &str) -> bool {
        if self.items.iter().any(|i| i.wid == wid) {
            return false;
        }
        let element = self.list.and_then(|list| {
            match doc.add("li", list, ElementAttrs::class("dropdown-item").with_text(label)) {
                Ok(li) => {
                    doc.set_attribute(li, "data-wid", &wid.to_string());
                    Some(li)
                }
                Err(err) => {
                    warn!(%wid, error = %err, "could not list overflowed widget");
                    None
                }
            }
        });
        self.items.push(MenuItem { wid, element });
        true
    }

    /// Remove the entry for `wid`. Returns false if it was not listed.
    pub fn remove_item(&mut self, doc: &mut Document, wid: Wid) -> bool {
        let Some(pos) = self.items.iter().position(|i| i.wid == wid) else {
            return false;
        };
        let item = self.items.remove(pos);
        if let Some(li) = item.element {
            // Gone together with the list is expected; gone on its own is not.
            if let Err(err) = doc.remove(li) {
                if self.list.is_some_and(|list| doc.is_alive(list)) {
                    warn!(%wid, error = %err, "could not remove overflow menu item");
                }
            }
        }
        true
    }

    /// Listed instances, in insertion order.
    pub fn items(&self) -> Vec<Wid> {
        self.items.iter().map(|i| i.wid).collect()
    }

    /// Element of the entry for `wid`.
    pub fn item_element(&self, wid: Wid) -> Option<ElementId> {
        self.items.iter().find(|i| i.wid == wid)?.element
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is listed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The toggle button.
    pub fn button(&self) -> Option<ElementId> {
        self.button
    }

    /// Open or close the list. Returns whether it is now open.
    pub fn toggle_list(&mut self, doc: &mut Document) -> bool {
        self.open = !self.open;
        if let Some(list) = self.list {
            if self.open {
                doc.remove_style(list, "display");
            } else {
                doc.set_style(list, "display", "none");
            }
        }
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attach::RootRef;
    use crate::options::WidgetOptions;
    use crate::test_support::LogCapture;

    #[test]
    fn menu_items_render_as_list_entries() {
        let mut cx = WidgetContext::default();
        let menu = cx
            .append(BOX_SELECTOR, RootRef::Default, &WidgetOptions::new())
            .unwrap();
        let chrome = cx.instance(menu).unwrap().chrome().unwrap();
        assert!(cx.document().has_class(chrome.panel, "no-panel-widget"));
        assert!(cx.document().has_class(chrome.panel, "box-selector"));

        let (a, b) = (Wid(1), Wid(2));
        let added = cx.with_widget_mut(menu, |m: &mut BoxSelector, doc| {
            (m.add_item(doc, a, "First"), m.add_item(doc, b, "Second"), m.add_item(doc, a, "again"))
        });
        assert_eq!(added, Some((true, true, false)));

        let selector = cx.widget::<BoxSelector>(menu).unwrap();
        assert_eq!(selector.items(), vec![a, b]);
        let li = selector.item_element(b).unwrap();
        assert_eq!(cx.document().text(li), Some("Second"));
        assert_eq!(cx.document().attribute(li, "data-wid"), Some("2"));
        assert_eq!(cx.get_values(menu), json!([1, 2]));

        let removed = cx.with_widget_mut(menu, |m: &mut BoxSelector, doc| m.remove_item(doc, b));
        assert_eq!(removed, Some(true));
        assert!(!cx.document().is_alive(li));
    }

    #[test]
    fn toggle_list_shows_and_hides() {
        let mut cx = WidgetContext::default();
        let menu = cx
            .append(BOX_SELECTOR, RootRef::Default, &WidgetOptions::new())
            .unwrap();
        let open = cx.with_widget_mut(menu, |m: &mut BoxSelector, doc| {
            let open = m.toggle_list(doc);
            let list = m.list.unwrap();
            (open, doc.style(list, "display").map(str::to_owned))
        });
        assert_eq!(open, Some((true, None)));
        let closed = cx.with_widget_mut(menu, |m: &mut BoxSelector, doc| m.toggle_list(doc));
        assert_eq!(closed, Some(false));
    }

    #[test]
    fn removing_an_item_warns_only_when_its_element_vanished_alone() {
        let mut cx = WidgetContext::default();
        let menu = cx
            .append(BOX_SELECTOR, RootRef::Default, &WidgetOptions::new())
            .unwrap();
        let (a, b) = (Wid(1), Wid(2));
        cx.with_widget_mut(menu, |m: &mut BoxSelector, doc| {
            m.add_item(doc, a, "First");
            m.add_item(doc, b, "Second");
        });
        let li = cx.widget::<BoxSelector>(menu).unwrap().item_element(a).unwrap();
        cx.document_mut().remove(li).unwrap();

        let logs = LogCapture::default();
        let removed = logs.run(|| {
            cx.with_widget_mut(menu, |m: &mut BoxSelector, doc| m.remove_item(doc, a))
        });
        assert_eq!(removed, Some(true));
        assert_eq!(logs.count("could not remove overflow menu item"), 1);

        let panel = cx.instance(menu).unwrap().panel_div().unwrap();
        cx.document_mut().remove(panel).unwrap();
        let removed = logs.run(|| {
            cx.with_widget_mut(menu, |m: &mut BoxSelector, doc| m.remove_item(doc, b))
        });
        assert_eq!(removed, Some(true));
        assert_eq!(logs.count("could not remove overflow menu item"), 1, "list gone too");
    }
}
