// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default instance behaviour: visibility, collapsing, enabling, highlighting, lookups.
//!
//! Before an instance is appended these calls only stage the change; `append` applies it.
//! After that they edit the page and run the matching hook. Repeating a call is a no-op
//! that returns false.

use serde_json::Value;
use tracing::warn;

use crate::context::WidgetContext;
use crate::instance::{HookKind, Wid, WidgetFlags};

impl WidgetContext {
    /// Hide the panel.
    pub fn hide(&mut self, wid: Wid) -> bool {
        let Some((inst, doc)) = self.parts(wid) else {
            return false;
        };
        if inst.flags.contains(WidgetFlags::HIDDEN) {
            return false;
        }
        let Some(panel) = inst.panel_div else {
            let was = inst.staged.contains(WidgetFlags::HIDDEN);
            inst.staged.insert(WidgetFlags::HIDDEN);
            return !was;
        };
        doc.set_style(panel, "display", "none");
        inst.flags.insert(WidgetFlags::HIDDEN);
        doc.request_layout();
        self.emit_hook(wid, HookKind::Hidden);
        true
    }

    /// Show the panel.
    pub fn show(&mut self, wid: Wid) -> bool {
        let Some((inst, doc)) = self.parts(wid) else {
            return false;
        };
        let Some(panel) = inst.panel_div else {
            let was = inst.staged.contains(WidgetFlags::HIDDEN);
            inst.staged.remove(WidgetFlags::HIDDEN);
            return was;
        };
        if !inst.flags.contains(WidgetFlags::HIDDEN) {
            return false;
        }
        doc.remove_style(panel, "display");
        inst.flags.remove(WidgetFlags::HIDDEN);
        doc.request_layout();
        self.emit_hook(wid, HookKind::Shown);
        true
    }

    /// Show if hidden, hide otherwise.
    pub fn toggle(&mut self, wid: Wid) -> bool {
        if self.is_hidden(wid) {
            self.show(wid)
        } else {
            self.hide(wid)
        }
    }

    /// Hide body and footer, keeping the heading.
    ///
    /// With a collapse target the panel also moves into that element.
    pub fn collapse(&mut self, wid: Wid) -> bool {
        let Some((inst, doc)) = self.parts(wid) else {
            return false;
        };
        if inst.flags.contains(WidgetFlags::COLLAPSED) {
            return false;
        }
        let Some(panel) = inst.panel_div else {
            let was = inst.staged.contains(WidgetFlags::COLLAPSED);
            inst.staged.insert(WidgetFlags::COLLAPSED);
            return !was;
        };
        for part in [inst.body_div, inst.footer_div].into_iter().flatten() {
            doc.set_style(part, "display", "none");
        }
        if let Some(target) = &inst.collapse_target {
            match doc.get_element_by_id(target) {
                Some(el) => {
                    if let Err(err) = doc.append_child(el, panel) {
                        warn!(%wid, target = %target, error = %err, "could not move collapsed widget");
                    }
                }
                None => warn!(%wid, target = %target, "collapse target not found"),
            }
        }
        inst.flags.insert(WidgetFlags::COLLAPSED);
        doc.request_layout();
        self.emit_hook(wid, HookKind::Collapsed);
        true
    }

    /// Show body and footer again, moving the panel back to its original root if it was retargeted.
    pub fn uncollapse(&mut self, wid: Wid) -> bool {
        let Some((inst, doc)) = self.parts(wid) else {
            return false;
        };
        let Some(panel) = inst.panel_div else {
            let was = inst.staged.contains(WidgetFlags::COLLAPSED);
            inst.staged.remove(WidgetFlags::COLLAPSED);
            return was;
        };
        if !inst.flags.contains(WidgetFlags::COLLAPSED) {
            return false;
        }
        for part in [inst.body_div, inst.footer_div].into_iter().flatten() {
            doc.remove_style(part, "display");
        }
        if inst.collapse_target.is_some() {
            if let Some(root) = inst.original_root.filter(|r| doc.is_alive(*r)) {
                if doc.parent(panel) != Some(root) {
                    if let Err(err) = doc.append_child(root, panel) {
                        warn!(%wid, error = %err, "could not restore collapsed widget");
                    }
                }
            }
        }
        inst.flags.remove(WidgetFlags::COLLAPSED);
        doc.request_layout();
        self.emit_hook(wid, HookKind::Uncollapsed);
        true
    }

    /// Uncollapse if collapsed, collapse otherwise.
    pub fn toggle_collapse(&mut self, wid: Wid) -> bool {
        if self.is_collapsed(wid) {
            self.uncollapse(wid)
        } else {
            self.collapse(wid)
        }
    }

    /// Disable the widget's controls.
    pub fn disable(&mut self, wid: Wid) -> bool {
        self.set_disabled(wid, true)
    }

    /// Enable the widget's controls.
    pub fn enable(&mut self, wid: Wid) -> bool {
        self.set_disabled(wid, false)
    }

    /// Mark the panel as highlighted.
    pub fn highlight(&mut self, wid: Wid) -> bool {
        self.set_highlighted(wid, true)
    }

    /// Remove the highlight.
    pub fn unhighlight(&mut self, wid: Wid) -> bool {
        self.set_highlighted(wid, false)
    }

    /// Hidden, or staged to be.
    pub fn is_hidden(&self, wid: Wid) -> bool {
        self.has_state(wid, WidgetFlags::HIDDEN)
    }

    /// Collapsed, or staged to be.
    pub fn is_collapsed(&self, wid: Wid) -> bool {
        self.has_state(wid, WidgetFlags::COLLAPSED)
    }

    /// Disabled, or staged to be.
    pub fn is_disabled(&self, wid: Wid) -> bool {
        self.has_state(wid, WidgetFlags::DISABLED)
    }

    /// Highlighted, or staged to be.
    pub fn is_highlighted(&self, wid: Wid) -> bool {
        self.has_state(wid, WidgetFlags::HIGHLIGHTED)
    }

    /// Docked, or staged to be.
    pub fn is_docked(&self, wid: Wid) -> bool {
        self.has_state(wid, WidgetFlags::DOCKED)
    }

    /// Inserted into the page.
    pub fn is_appended(&self, wid: Wid) -> bool {
        self.slots
            .get(&wid)
            .is_some_and(|i| i.flags.contains(WidgetFlags::APPENDED))
    }

    /// Sound file registered under `name`.
    pub fn get_sound(&self, wid: Wid, name: &str) -> Option<&str> {
        self.slots.get(&wid)?.sounds.get(name).map(String::as_str)
    }

    /// Text registered under `name`.
    pub fn get_text(&self, wid: Wid, name: &str) -> Option<&str> {
        self.slots.get(&wid)?.texts.get(name).map(String::as_str)
    }

    /// Values currently held by the widget, `null` for unknown instances.
    pub fn get_values(&self, wid: Wid) -> Value {
        self.slots
            .get(&wid)
            .and_then(|i| i.widget.as_deref())
            .map_or(Value::Null, |w| w.get_values())
    }

    fn has_state(&self, wid: Wid, flag: WidgetFlags) -> bool {
        self.slots
            .get(&wid)
            .is_some_and(|i| (i.flags | i.staged).contains(flag))
    }

    fn set_disabled(&mut self, wid: Wid, disabled: bool) -> bool {
        let Some((inst, doc)) = self.parts(wid) else {
            return false;
        };
        if inst.flags.contains(WidgetFlags::DISABLED) == disabled && inst.panel_div.is_some() {
            return false;
        }
        let Some(chrome) = inst.chrome() else {
            let was = inst.staged.contains(WidgetFlags::DISABLED);
            inst.staged.set(WidgetFlags::DISABLED, disabled);
            return was != disabled;
        };
        if disabled {
            doc.add_class(chrome.panel, "disabled");
        } else {
            doc.remove_class(chrome.panel, "disabled");
        }
        if let Some(widget) = inst.widget.as_deref_mut() {
            widget.set_disabled(doc, &chrome, disabled);
        }
        inst.flags.set(WidgetFlags::DISABLED, disabled);
        let kind = if disabled {
            HookKind::Disabled
        } else {
            HookKind::Enabled
        };
        self.emit_hook(wid, kind);
        true
    }

    fn set_highlighted(&mut self, wid: Wid, on: bool) -> bool {
        let Some((inst, doc)) = self.parts(wid) else {
            return false;
        };
        let Some(panel) = inst.panel_div else {
            let was = inst.staged.contains(WidgetFlags::HIGHLIGHTED);
            inst.staged.set(WidgetFlags::HIGHLIGHTED, on);
            return was != on;
        };
        if inst.flags.contains(WidgetFlags::HIGHLIGHTED) == on {
            return false;
        }
        if on {
            doc.add_class(panel, "highlighted");
        } else {
            doc.remove_class(panel, "highlighted");
        }
        inst.flags.set(WidgetFlags::HIGHLIGHTED, on);
        let kind = if on {
            HookKind::Highlighted
        } else {
            HookKind::Unhighlighted
        };
        self.emit_hook(wid, kind);
        true
    }
}
