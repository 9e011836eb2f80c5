// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Docking along the right edge of the viewport.
//!
//! ## Layout
//!
//! Docked panels stack right to left in docking order. The first sits `margin` pixels from the
//! edge; each next one sits at the previous entry's `right` plus its stored width, where the stored
//! width is the measured panel width plus `margin`.
//!
//! ## Overflow
//!
//! When a newly placed panel would end within `safety_margin` pixels of the left edge of the
//! viewport, the oldest entries are evicted one at a time (hidden, not destroyed) into the
//! [`BoxSelector`] menu until it fits or no older entry is left. Each eviction compacts the
//! remaining entries, so the loop re-reads the new panel's position after every step.

use tracing::{debug, warn};

use crate::attach::RootRef;
use crate::context::{DockConfig, WidgetContext};
use crate::instance::{Wid, WidgetFlags};
use crate::options::WidgetOptions;
use crate::overflow::{BOX_SELECTOR, BoxSelector};

/// One docked instance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DockEntry {
    /// The docked instance.
    pub wid: Wid,
    /// Measured width plus the margin, as stored at placement time.
    pub offset_width: f64,
    /// Current `right` style, in pixels.
    pub right: f64,
}

/// Docked instances in docking order, plus those evicted to the overflow menu.
#[derive(Clone, Debug, Default)]
pub struct DockLayout {
    pub(crate) config: DockConfig,
    pub(crate) docked: Vec<DockEntry>,
    pub(crate) hidden: Vec<Wid>,
    pub(crate) selector: Option<Wid>,
}

impl DockLayout {
    pub(crate) fn new(config: DockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Geometry in use.
    pub fn config(&self) -> DockConfig {
        self.config
    }

    /// Visible docked entries, oldest first.
    pub fn entries(&self) -> &[DockEntry] {
        &self.docked
    }

    /// Entry of a visible docked instance.
    pub fn entry(&self, wid: Wid) -> Option<&DockEntry> {
        self.docked.iter().find(|e| e.wid == wid)
    }

    /// Instances evicted to the overflow menu, in eviction order.
    pub fn overflowed(&self) -> &[Wid] {
        &self.hidden
    }

    /// The overflow menu instance, while one exists.
    pub fn selector(&self) -> Option<Wid> {
        self.selector
    }

    pub(crate) fn push(&mut self, wid: Wid) {
        if self.position(wid).is_none() {
            self.docked.push(DockEntry {
                wid,
                offset_width: 0.0,
                right: 0.0,
            });
        }
    }

    /// Drop an entry that was never placed.
    pub(crate) fn remove(&mut self, wid: Wid) {
        self.docked.retain(|e| e.wid != wid);
    }

    fn position(&self, wid: Wid) -> Option<usize> {
        self.docked.iter().position(|e| e.wid == wid)
    }
}

impl WidgetContext {
    /// Place docked instance `wid` after its predecessor, then evict older entries while it
    /// does not fit the viewport.
    pub(crate) fn set_right_style(&mut self, wid: Wid) {
        let DockConfig {
            margin,
            safety_margin,
        } = self.dock.config;
        let Some(idx) = self.dock.position(wid) else {
            return;
        };
        let right = match idx.checked_sub(1).map(|p| self.dock.docked[p]) {
            Some(prev) => prev.right + prev.offset_width,
            None => margin,
        };
        let panel = self.slots.get(&wid).and_then(|i| i.panel_div);
        let width = panel.map_or(0.0, |p| self.doc.offset_width(p));
        let entry = &mut self.dock.docked[idx];
        entry.right = right;
        entry.offset_width = width + margin;
        if let Some(panel) = panel {
            self.doc.set_style_px(panel, "right", right);
        }

        let viewport = self.doc.inner_width();
        while let Some(entry) = self.dock.entry(wid).copied() {
            if entry.right + width + safety_margin <= viewport {
                break;
            }
            let oldest = self.dock.docked[0].wid;
            if oldest == wid {
                break;
            }
            debug!(%wid, evicted = %oldest, right = entry.right, viewport, "dock overflow");
            self.close_docked(oldest, true);
        }
    }

    /// Take docked instance `wid` out of the dock and move every later entry right by its width.
    ///
    /// With `hide`, the instance is hidden and listed in the overflow menu, created on first use.
    /// Without it, the instance stops being docked. Returns false if `wid` is not in the dock.
    pub fn close_docked(&mut self, wid: Wid, hide: bool) -> bool {
        let Some(idx) = self.dock.position(wid) else {
            return false;
        };
        let removed = self.dock.docked.remove(idx);
        for entry in &mut self.dock.docked[idx..] {
            entry.right -= removed.offset_width;
            if let Some(panel) = self.slots.get(&entry.wid).and_then(|i| i.panel_div) {
                self.doc.set_style_px(panel, "right", entry.right);
            }
        }

        if hide {
            self.hide(wid);
            self.dock.hidden.push(wid);
            self.list_overflowed(wid);
        } else if let Some((inst, doc)) = self.parts(wid) {
            inst.flags.remove(WidgetFlags::DOCKED);
            if let Some(panel) = inst.panel_div {
                doc.remove_class(panel, "docked");
                doc.remove_style(panel, "right");
            }
        }
        true
    }

    /// Bring an evicted instance back: show it, dock it last, and drop it from the overflow menu.
    ///
    /// This is the action of a click on a menu item. The menu is destroyed once it is empty.
    /// Returns false if `wid` is not in the overflow list.
    pub fn restore_docked(&mut self, wid: Wid) -> bool {
        let Some(pos) = self.dock.hidden.iter().position(|w| *w == wid) else {
            return false;
        };
        self.dock.hidden.remove(pos);
        self.show(wid);
        self.dock.push(wid);
        self.set_right_style(wid);
        self.unlist_overflowed(wid);
        true
    }

    /// Drop a destroyed instance from the overflow list and menu.
    pub(crate) fn forget_overflowed(&mut self, wid: Wid) {
        if let Some(pos) = self.dock.hidden.iter().position(|w| *w == wid) {
            self.dock.hidden.remove(pos);
            self.unlist_overflowed(wid);
        }
    }

    fn list_overflowed(&mut self, wid: Wid) {
        let items = match self.dock.selector.filter(|s| self.slots.contains_key(s)) {
            Some(selector) => vec![(selector, wid)],
            None => {
                let Some(selector) = self.open_selector() else {
                    return;
                };
                self.dock.hidden.iter().map(|w| (selector, *w)).collect()
            }
        };
        for (selector, item) in items {
            let label = self.overflow_label(item);
            self.with_widget_mut(selector, |menu: &mut BoxSelector, doc| {
                menu.add_item(doc, item, &label)
            });
        }
    }

    fn unlist_overflowed(&mut self, wid: Wid) {
        let Some(selector) = self.dock.selector else {
            return;
        };
        let empty = self.with_widget_mut(selector, |menu: &mut BoxSelector, doc| {
            menu.remove_item(doc, wid);
            menu.is_empty()
        });
        if empty.unwrap_or(true) {
            self.destroy(selector);
            self.dock.selector = None;
        }
    }

    fn open_selector(&mut self) -> Option<Wid> {
        let last = self.last_appended;
        let body = self.doc.body();
        let options = WidgetOptions::new().class_name("docked-left");
        let selector = match self.append(BOX_SELECTOR, RootRef::Element(body), &options) {
            Ok(selector) => selector,
            Err(err) => {
                warn!(error = %err, "could not create the overflow menu");
                return None;
            }
        };
        self.last_appended = last;
        self.dock.selector = Some(selector);
        Some(selector)
    }

    fn overflow_label(&self, wid: Wid) -> String {
        self.slots.get(&wid).map_or_else(
            || wid.to_string(),
            |i| {
                i.title
                    .clone()
                    .or_else(|| i.id.clone())
                    .unwrap_or_else(|| i.name.clone())
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;
    use crate::test_support::{Probe, probe_context};

    fn dock(cx: &mut WidgetContext, width: f64) -> Wid {
        cx.append(
            Probe::NAME,
            RootRef::Default,
            &WidgetOptions::new()
                .docked(true)
                .extra("width", serde_json::json!(width)),
        )
        .unwrap()
    }

    fn right(cx: &WidgetContext, wid: Wid) -> f64 {
        let panel = cx.instance(wid).unwrap().panel_div().unwrap();
        cx.document().style_px(panel, "right").unwrap()
    }

    fn wide_context() -> WidgetContext {
        let mut cx = probe_context();
        cx.document_mut().set_viewport(Size::new(5000.0, 800.0));
        cx
    }

    #[test]
    fn entries_stack_right_to_left() {
        let mut cx = wide_context();
        let a = dock(&mut cx, 100.0);
        let b = dock(&mut cx, 50.0);
        let c = dock(&mut cx, 70.0);
        assert_eq!(right(&cx, a), 20.0);
        assert_eq!(right(&cx, b), 20.0 + 120.0);
        assert_eq!(right(&cx, c), 140.0 + 70.0);
        assert_eq!(cx.dock().entry(b).unwrap().offset_width, 70.0);
        assert!(cx.is_docked(a));
        let panel = cx.instance(a).unwrap().panel_div().unwrap();
        assert!(cx.document().has_class(panel, "docked"));
    }

    #[test]
    fn destroying_middle_entry_compacts_later_ones() {
        let mut cx = wide_context();
        let a = dock(&mut cx, 100.0);
        let b = dock(&mut cx, 50.0);
        let c = dock(&mut cx, 70.0);
        let a_before = right(&cx, a);
        let c_before = right(&cx, c);
        let b_width = cx.dock().entry(b).unwrap().offset_width;

        assert!(cx.destroy(b));
        assert_eq!(right(&cx, a), a_before);
        assert_eq!(right(&cx, c), c_before - b_width);
        let order: Vec<Wid> = cx.dock().entries().iter().map(|e| e.wid).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn close_without_hide_undocks() {
        let mut cx = wide_context();
        let a = dock(&mut cx, 100.0);
        assert!(cx.close_docked(a, false));
        assert!(!cx.close_docked(a, false));
        assert!(!cx.is_docked(a));
        let panel = cx.instance(a).unwrap().panel_div().unwrap();
        assert_eq!(cx.document().style(panel, "right"), None);
        assert!(cx.dock().selector().is_none());
    }

    #[test]
    fn overflow_evicts_oldest_into_menu() {
        let mut cx = probe_context();
        // Each panel stores 120px; the third would end at 260 + 100 + 200 > 500.
        cx.document_mut().set_viewport(Size::new(500.0, 600.0));
        let a = dock(&mut cx, 100.0);
        let b = dock(&mut cx, 100.0);
        assert!(cx.dock().selector().is_none());
        let c = dock(&mut cx, 100.0);

        assert_eq!(cx.dock().overflowed(), &[a]);
        assert!(cx.is_hidden(a));
        assert!(cx.is_live(a), "evicted, not destroyed");
        assert_eq!(right(&cx, b), 20.0);
        assert_eq!(right(&cx, c), 140.0);

        let menu = cx.dock().selector().unwrap();
        assert_eq!(cx.widget::<BoxSelector>(menu).unwrap().items(), vec![a]);
        assert_eq!(cx.last_appended(), Some(c), "menu creation keeps the pointer");
        let menu_panel = cx.instance(menu).unwrap().panel_div().unwrap();
        assert!(cx.document().has_class(menu_panel, "docked-left"));
        assert_eq!(cx.document().parent(menu_panel), Some(cx.document().body()));
    }

    #[test]
    fn restore_redocks_last_with_fresh_offset() {
        let mut cx = probe_context();
        cx.document_mut().set_viewport(Size::new(620.0, 600.0));
        let a = dock(&mut cx, 100.0);
        let b = dock(&mut cx, 100.0);
        let c = dock(&mut cx, 100.0);
        // c ends at 260 + 100 + 200 = 560 <= 620; a fourth does not fit.
        let d = dock(&mut cx, 100.0);
        assert_eq!(cx.dock().overflowed(), &[a]);
        let menu = cx.dock().selector().unwrap();

        // Making room lets the restored widget fit without evicting anything.
        cx.destroy(b);
        assert!(cx.restore_docked(a));
        let order: Vec<Wid> = cx.dock().entries().iter().map(|e| e.wid).collect();
        assert_eq!(order, vec![c, d, a]);
        assert!(!cx.is_hidden(a));

        let prev = cx.dock().entry(d).copied().unwrap();
        assert_eq!(right(&cx, a), prev.right + prev.offset_width);
        assert!(cx.dock().overflowed().is_empty());
        assert!(!cx.is_live(menu), "empty menu is destroyed");
        assert!(cx.dock().selector().is_none());
        assert!(!cx.restore_docked(a));
    }

    #[test]
    fn overflow_loop_stops_at_the_new_entry() {
        let mut cx = probe_context();
        cx.document_mut().set_viewport(Size::new(300.0, 600.0));
        let a = dock(&mut cx, 100.0);
        let b = dock(&mut cx, 400.0);
        assert_eq!(cx.dock().overflowed(), &[a]);
        let order: Vec<Wid> = cx.dock().entries().iter().map(|e| e.wid).collect();
        assert_eq!(order, vec![b], "a lone entry stays even when too wide");
    }

    #[test]
    fn destroying_an_evicted_widget_cleans_the_menu() {
        let mut cx = probe_context();
        cx.document_mut().set_viewport(Size::new(500.0, 600.0));
        let a = dock(&mut cx, 100.0);
        let _b = dock(&mut cx, 100.0);
        let _c = dock(&mut cx, 100.0);
        let menu = cx.dock().selector().unwrap();
        assert!(cx.destroy(a));
        assert!(cx.dock().overflowed().is_empty());
        assert!(!cx.is_live(menu));
    }

    #[test]
    fn menu_recreated_after_external_destroy_lists_everything() {
        let mut cx = probe_context();
        cx.document_mut().set_viewport(Size::new(500.0, 600.0));
        let a = dock(&mut cx, 100.0);
        let b = dock(&mut cx, 100.0);
        let _c = dock(&mut cx, 100.0);
        let menu = cx.dock().selector().unwrap();
        cx.destroy(menu);
        assert!(cx.dock().selector().is_none());

        let _d = dock(&mut cx, 100.0);
        let menu = cx.dock().selector().unwrap();
        assert_eq!(cx.widget::<BoxSelector>(menu).unwrap().items(), vec![a, b]);
    }
}
