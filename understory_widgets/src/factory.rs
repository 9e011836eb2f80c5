// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instantiation and destruction.
//!
//! [`WidgetContext::get`] records the listener changes made by the widget's
//! [`listeners`](crate::Widget::listeners) call. [`WidgetContext::destroy`] reverts exactly those
//! changes, so creating and destroying a widget leaves the bus as it found it.

use std::rc::Rc;

use tracing::{debug, error, warn};

use crate::context::WidgetContext;
use crate::error::WidgetError;
use crate::instance::{HookKind, Hooks, Wid, WidgetFlags, WidgetInstance};
use crate::options::{Label, WidgetOptions};

impl WidgetContext {
    /// Create an instance of the registered class `name`.
    ///
    /// The instance is configured but not on the page; see [`WidgetContext::append`].
    /// UI state requested by `options` (hidden, collapsed, highlighted, disabled, docked) is staged
    /// and applied by `append`.
    ///
    /// All errors are returned before the bus or the page are touched.
    pub fn get(&mut self, name: &str, options: &WidgetOptions) -> Result<Wid, WidgetError> {
        let def = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| WidgetError::UnknownWidget(name.to_owned()))?;
        if options.docked && !options.store_ref {
            return Err(WidgetError::DockedWithoutStoreRef(name.to_owned()));
        }
        if let Some(dependency) = self.scopes.missing(&self.registry, &def.meta().dependencies) {
            error!(widget = name, dependency, "missing dependency");
            return Err(WidgetError::UnmetDependency {
                widget: name.to_owned(),
                dependency: dependency.to_owned(),
            });
        }

        let mut widget = def.construct(options);
        let meta = def.meta();
        let title = match &options.title {
            Label::Inherit => meta.title.clone(),
            Label::Off => None,
            Label::Text(t) => Some(t.clone()),
        };
        let footer = match &options.footer {
            Label::Inherit => meta.footer.clone(),
            Label::Off => None,
            Label::Text(t) => Some(t.clone()),
        };
        let class_name = match (meta.class_name.as_deref(), options.class_name.as_deref()) {
            (Some(a), Some(b)) => Some(format!("{a} {b}")),
            (a, b) => a.or(b).map(str::to_owned),
        };
        let mut sounds = meta.sounds.clone();
        sounds.extend(options.sounds.clone());
        let mut texts = meta.texts.clone();
        texts.extend(options.texts.clone());

        widget.init(options)?;

        let wid = self.fresh_wid();
        let mut staged = WidgetFlags::empty();
        staged.set(WidgetFlags::HIDDEN, options.hidden);
        staged.set(WidgetFlags::COLLAPSED, options.collapsed);
        staged.set(WidgetFlags::HIGHLIGHTED, options.highlighted);
        staged.set(WidgetFlags::DISABLED, options.disabled);
        staged.set(WidgetFlags::DOCKED, options.docked);

        let changes = if options.listeners {
            let bus = Rc::clone(&self.bus);
            let txn = bus.begin();
            widget.listeners(&bus);
            Some(txn.commit())
        } else {
            None
        };

        let inst = WidgetInstance {
            wid,
            name: name.to_owned(),
            id: options.full_id(),
            title,
            footer,
            panel: options.panel.or(meta.panel).unwrap_or(true),
            class_name,
            context: options.context.clone().or_else(|| meta.context.clone()),
            sounds,
            texts,
            collapsible: options.collapsible,
            closable: options.closable,
            collapse_target: options.collapse_target.clone(),
            store_ref: options.store_ref,
            flags: WidgetFlags::empty(),
            staged,
            panel_div: None,
            heading_div: None,
            body_div: None,
            footer_div: None,
            original_root: None,
            hooks: Hooks::new(),
            changes,
            widget: Some(widget),
            tearing_down: false,
        };
        debug!(
            widget = name,
            %wid,
            id = ?inst.id,
            listeners = inst.changes.as_ref().map_or(0, |c| c.len()),
            "created widget"
        );
        self.slots.insert(wid, inst);
        if options.store_ref {
            self.instances.push(wid);
        }
        Ok(wid)
    }

    /// Tear down instance `wid`, undoing everything its creation and attachment did.
    ///
    /// In order: the widget's [`on_destroy`](crate::Widget::on_destroy) runs, the panel leaves the
    /// page, recorded listener changes are reverted, the instance leaves the instance set (and the
    /// last-appended pointer), and a docked instance leaves the dock. The `destroyed` hook runs last.
    ///
    /// Never fails. Returns false if `wid` is not live or is already being destroyed.
    pub fn destroy(&mut self, wid: Wid) -> bool {
        let Some(inst) = self.slots.get_mut(&wid) else {
            return false;
        };
        if inst.tearing_down {
            return false;
        }
        inst.tearing_down = true;

        if let Some(mut widget) = inst.widget.take() {
            widget.on_destroy(self, wid);
            if let Some(inst) = self.slots.get_mut(&wid) {
                inst.widget = Some(widget);
            }
        }

        let Some(inst) = self.slots.get_mut(&wid) else {
            return false;
        };
        let panel = inst.panel_div;
        let changes = inst.changes.take();
        let store_ref = inst.store_ref;
        let docked = inst.flags.contains(WidgetFlags::DOCKED);

        if let Some(panel) = panel {
            if let Err(err) = self.doc.remove(panel) {
                warn!(%wid, error = %err, "could not remove widget panel");
            }
        }
        if let Some(changes) = changes {
            self.bus.revert(changes);
        }
        if store_ref {
            self.instances.remove(wid);
            if self.last_appended == Some(wid) {
                self.last_appended = None;
            }
        }
        if docked {
            if !self.close_docked(wid, false) {
                self.forget_overflowed(wid);
            }
        } else {
            self.doc.request_layout();
        }
        if self.dock.selector == Some(wid) {
            self.dock.selector = None;
        }

        if let Some(inst) = self.slots.get_mut(&wid) {
            inst.flags.insert(WidgetFlags::DESTROYED);
        }
        self.emit_hook(wid, HookKind::Destroyed);
        let name = self.slots.remove(&wid).map(|inst| inst.name);
        debug!(%wid, widget = ?name, "destroyed widget");
        true
    }

    fn fresh_wid(&self) -> Wid {
        loop {
            let wid = Wid(rand::random::<u64>());
            if wid.0 != 0 && !self.slots.contains_key(&wid) {
                return wid;
            }
        }
    }
}
