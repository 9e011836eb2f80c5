// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attachment: inserting an instance into the page.
//!
//! ## Panel structure
//!
//! ```text
//! div.ng_widget.card.<class names>[.docked][.border-<context>]   (panel)
//!   div.card-header                                              (heading, when titled)
//!     span.widget-title
//!     button.collapse-btn / button.close-btn                     (when requested)
//!   div.card-body                                                (body)
//!   div.card-footer                                              (footer, when declared)
//! ```
//!
//! Panel-less widgets use `no-panel-widget`, `no-panel-heading`, `no-panel-body`, and
//! `no-panel-footer` instead of the card classes.

use tracing::{debug, warn};
use understory_dom::{Document, ElementAttrs, ElementId};

use crate::context::WidgetContext;
use crate::error::WidgetError;
use crate::instance::{Chrome, Wid, WidgetFlags};
use crate::options::{Label, WidgetOptions};

/// What to append: a registered class (instantiated first) or an existing instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WidgetRef<'a> {
    /// Create an instance of this class with the same options.
    Name(&'a str),
    /// Append an instance created by [`WidgetContext::get`].
    Instance(Wid),
}

impl<'a> From<&'a str> for WidgetRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<Wid> for WidgetRef<'_> {
    fn from(wid: Wid) -> Self {
        Self::Instance(wid)
    }
}

/// Where to append.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RootRef<'a> {
    /// The content-frame root if one is loaded, else the page body.
    Default,
    /// This element.
    Element(ElementId),
    /// The connected element with this `id` attribute.
    Id(&'a str),
}

impl From<ElementId> for RootRef<'_> {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

impl<'a> From<&'a str> for RootRef<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl WidgetContext {
    /// Build the panel of a widget and insert it into `root`.
    ///
    /// A name is resolved with [`WidgetContext::get`] first, forwarding `options`.
    /// Options given here also override the instance's panel, title, footer, class names,
    /// context, and staged UI state.
    ///
    /// The root, the instance, and the docking constraints are validated before anything is
    /// created. Returns the instance's [`Wid`].
    ///
    /// On failure nothing of the attachment survives: an instance created by this call is
    /// destroyed, and an existing instance is detached again with its staged state restored.
    pub fn append<'a>(
        &mut self,
        widget: impl Into<WidgetRef<'a>>,
        root: impl Into<RootRef<'a>>,
        options: &WidgetOptions,
    ) -> Result<Wid, WidgetError> {
        let root = self.resolve_root(root.into())?;
        let (wid, created) = match widget.into() {
            WidgetRef::Instance(wid) => {
                let inst = self
                    .slots
                    .get(&wid)
                    .ok_or(WidgetError::UnknownInstance(wid))?;
                if inst.flags.contains(WidgetFlags::APPENDED) {
                    return Err(WidgetError::AlreadyAppended(wid));
                }
                let docked = options.docked || inst.staged.contains(WidgetFlags::DOCKED);
                if docked && !inst.store_ref {
                    return Err(WidgetError::DockedWithoutStoreRef(inst.name.clone()));
                }
                (wid, false)
            }
            WidgetRef::Name(name) => (self.get(name, options)?, true),
        };

        let before = self
            .slots
            .get(&wid)
            .map(|inst| (inst.flags, inst.staged))
            .unwrap_or_default();
        if let Err(err) = self.attach(wid, root, options) {
            // The caller never sees a wid it created, so nothing of it may survive.
            if created {
                self.destroy(wid);
            } else {
                self.unwind_attach(wid, before);
            }
            return Err(err);
        }
        Ok(wid)
    }

    fn attach(
        &mut self,
        wid: Wid,
        root: ElementId,
        options: &WidgetOptions,
    ) -> Result<(), WidgetError> {
        let chrome = self.build_chrome(wid, options)?;

        // Phase one needs only the outer containers.
        if self.is_staged(wid, WidgetFlags::HIDDEN) {
            self.hide(wid);
        }
        if self.is_staged(wid, WidgetFlags::COLLAPSED) {
            self.collapse(wid);
        }

        // A collapse with a target has already placed the panel.
        if self.doc.parent(chrome.panel).is_none() {
            self.doc.append_child(root, chrome.panel)?;
        }
        if let Some(inst) = self.slots.get_mut(&wid) {
            inst.original_root = Some(root);
            inst.flags.insert(WidgetFlags::APPENDED);
        }

        let taken = self.slots.get_mut(&wid).and_then(|inst| inst.widget.take());
        if let Some(mut widget) = taken {
            let rendered = widget.append(self, &chrome);
            if let Some(inst) = self.slots.get_mut(&wid) {
                inst.widget = Some(widget);
            }
            rendered?;
        }

        // Phase two may touch elements the widget just rendered.
        if self.is_staged(wid, WidgetFlags::HIGHLIGHTED) {
            self.highlight(wid);
        }
        if self.is_staged(wid, WidgetFlags::DISABLED) {
            self.disable(wid);
        }

        let Some(inst) = self.slots.get_mut(&wid) else {
            return Err(WidgetError::UnknownInstance(wid));
        };
        inst.staged = WidgetFlags::empty();
        let flags = inst.flags;
        let store_ref = inst.store_ref;
        debug!(widget = %inst.name, %wid, ?flags, "appended widget");

        if flags.contains(WidgetFlags::DOCKED) {
            self.set_right_style(wid);
        } else if !flags.intersects(WidgetFlags::HIDDEN | WidgetFlags::COLLAPSED) {
            self.doc.request_layout();
        }
        if store_ref {
            self.last_appended = Some(wid);
        }
        Ok(())
    }

    /// Take a caller-created instance back to its state before a failed attachment.
    fn unwind_attach(&mut self, wid: Wid, (flags, staged): (WidgetFlags, WidgetFlags)) {
        self.dock.remove(wid);
        let Some((inst, doc)) = self.parts(wid) else {
            return;
        };
        if let Some(panel) = inst.panel_div.take() {
            if let Err(err) = doc.remove(panel) {
                warn!(%wid, error = %err, "could not remove panel of a failed append");
            }
        }
        inst.heading_div = None;
        inst.body_div = None;
        inst.footer_div = None;
        inst.original_root = None;
        inst.flags = flags;
        inst.staged = staged;
        debug!(widget = %inst.name, %wid, "append failed, instance detached");
    }

    /// Set or clear the title. The heading is created or removed on an appended instance.
    pub fn set_title(&mut self, wid: Wid, title: Option<&str>) -> Result<(), WidgetError> {
        let (inst, doc) = self.parts(wid).ok_or(WidgetError::UnknownInstance(wid))?;
        inst.title = title.map(str::to_owned);
        let Some(panel) = inst.panel_div else {
            return Ok(());
        };
        match (title, inst.heading_div) {
            (None, Some(heading)) => {
                doc.remove(heading)?;
                inst.heading_div = None;
            }
            (Some(text), Some(heading)) => {
                if let Some(span) = find_child_with_class(doc, heading, "widget-title") {
                    doc.set_text(span, Some(text));
                }
            }
            (Some(text), None) => {
                let heading = doc.create_element("div");
                doc.add_class(heading, heading_class(inst.panel));
                doc.add("span", heading, ElementAttrs::class("widget-title").with_text(text))?;
                add_heading_buttons(doc, heading, inst.collapsible, inst.closable)?;
                doc.insert_child(panel, 0, heading)?;
                inst.heading_div = Some(heading);
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Set or clear the footer. The footer is created or removed on an appended instance.
    pub fn set_footer(&mut self, wid: Wid, footer: Option<&str>) -> Result<(), WidgetError> {
        let (inst, doc) = self.parts(wid).ok_or(WidgetError::UnknownInstance(wid))?;
        inst.footer = footer.map(str::to_owned);
        let Some(panel) = inst.panel_div else {
            return Ok(());
        };
        match (footer, inst.footer_div) {
            (None, Some(div)) => {
                doc.remove(div)?;
                inst.footer_div = None;
            }
            (Some(text), Some(div)) => doc.set_text(div, Some(text)),
            (Some(text), None) => {
                let div = doc.add(
                    "div",
                    panel,
                    ElementAttrs::class(footer_class(inst.panel)).with_text(text),
                )?;
                if inst.flags.contains(WidgetFlags::COLLAPSED) {
                    doc.set_style(div, "display", "none");
                }
                inst.footer_div = Some(div);
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Set or clear the context (`"info"`, `"warning"`, ...), shown as a `border-<context>` class.
    pub fn set_context(&mut self, wid: Wid, context: Option<&str>) -> Result<(), WidgetError> {
        let (inst, doc) = self.parts(wid).ok_or(WidgetError::UnknownInstance(wid))?;
        inst.context = context.map(str::to_owned);
        if let Some(panel) = inst.panel_div {
            apply_context(doc, panel, context);
        }
        Ok(())
    }

    fn resolve_root(&self, root: RootRef<'_>) -> Result<ElementId, WidgetError> {
        match root {
            RootRef::Default => Ok(self.doc.frame_root().unwrap_or_else(|| self.doc.body())),
            RootRef::Element(id) if self.doc.is_alive(id) => Ok(id),
            RootRef::Element(id) => Err(WidgetError::RootNotFound(format!("{id:?}"))),
            RootRef::Id(id) => self
                .doc
                .get_element_by_id(id)
                .ok_or_else(|| WidgetError::RootNotFound(id.to_owned())),
        }
    }

    fn is_staged(&self, wid: Wid, flag: WidgetFlags) -> bool {
        self.slots
            .get(&wid)
            .is_some_and(|inst| inst.staged.contains(flag))
    }

    /// Create the detached panel with heading, body, and footer, and merge `options` into the
    /// instance's staged state.
    fn build_chrome(&mut self, wid: Wid, options: &WidgetOptions) -> Result<Chrome, WidgetError> {
        let (inst, doc) = self.parts(wid).ok_or(WidgetError::UnknownInstance(wid))?;

        let panel = options.panel.unwrap_or(inst.panel);
        inst.panel = panel;
        match &options.title {
            Label::Inherit => {}
            Label::Off => inst.title = None,
            Label::Text(t) => inst.title = Some(t.clone()),
        }
        match &options.footer {
            Label::Inherit => {}
            Label::Off => inst.footer = None,
            Label::Text(t) => inst.footer = Some(t.clone()),
        }
        if options.context.is_some() {
            inst.context.clone_from(&options.context);
        }
        inst.collapsible |= options.collapsible;
        inst.closable |= options.closable;
        if options.collapse_target.is_some() {
            inst.collapse_target.clone_from(&options.collapse_target);
        }
        let mut requested = WidgetFlags::empty();
        requested.set(WidgetFlags::HIDDEN, options.hidden);
        requested.set(WidgetFlags::COLLAPSED, options.collapsed);
        requested.set(WidgetFlags::HIGHLIGHTED, options.highlighted);
        requested.set(WidgetFlags::DISABLED, options.disabled);
        requested.set(WidgetFlags::DOCKED, options.docked);
        inst.staged |= requested;

        let panel_div = doc.create_element("div");
        inst.panel_div = Some(panel_div);
        doc.add_class(panel_div, "ng_widget");
        doc.add_class(panel_div, if panel { "card" } else { "no-panel-widget" });
        if let Some(class_name) = &inst.class_name {
            doc.add_class(panel_div, class_name);
        }
        if let Some(class_name) = &options.class_name {
            doc.add_class(panel_div, class_name);
        }
        if let Some(id) = &inst.id {
            doc.set_element_id(panel_div, Some(id.as_str()));
        }
        let docked = inst.staged.contains(WidgetFlags::DOCKED);
        if docked {
            doc.add_class(panel_div, "docked");
            inst.flags.insert(WidgetFlags::DOCKED);
        }

        let heading = match &inst.title {
            Some(title) => {
                let heading = doc.add("div", panel_div, ElementAttrs::class(heading_class(panel)))?;
                doc.add(
                    "span",
                    heading,
                    ElementAttrs::class("widget-title").with_text(title.as_str()),
                )?;
                add_heading_buttons(doc, heading, inst.collapsible, inst.closable)?;
                Some(heading)
            }
            None => None,
        };
        let body = doc.add("div", panel_div, ElementAttrs::class(body_class(panel)))?;
        let footer = match &inst.footer {
            Some(text) => Some(doc.add(
                "div",
                panel_div,
                ElementAttrs::class(footer_class(panel)).with_text(text.as_str()),
            )?),
            None => None,
        };
        apply_context(doc, panel_div, inst.context.as_deref());

        inst.heading_div = heading;
        inst.body_div = Some(body);
        inst.footer_div = footer;
        if docked {
            self.dock.push(wid);
        }
        Ok(Chrome {
            wid,
            panel: panel_div,
            heading,
            body,
            footer,
        })
    }
}

fn heading_class(panel: bool) -> &'static str {
    if panel { "card-header" } else { "no-panel-heading" }
}

fn body_class(panel: bool) -> &'static str {
    if panel { "card-body" } else { "no-panel-body" }
}

fn footer_class(panel: bool) -> &'static str {
    if panel { "card-footer" } else { "no-panel-footer" }
}

fn add_heading_buttons(
    doc: &mut Document,
    heading: ElementId,
    collapsible: bool,
    closable: bool,
) -> Result<(), WidgetError> {
    if collapsible {
        doc.add("button", heading, ElementAttrs::class("btn collapse-btn"))?;
    }
    if closable {
        doc.add("button", heading, ElementAttrs::class("btn close-btn"))?;
    }
    Ok(())
}

fn apply_context(doc: &mut Document, panel: ElementId, context: Option<&str>) {
    doc.remove_classes_with_prefix(panel, "border-");
    if let Some(context) = context {
        doc.add_class(panel, &format!("border-{context}"));
    }
}

pub(crate) fn find_child_with_class(
    doc: &Document,
    parent: ElementId,
    class: &str,
) -> Option<ElementId> {
    doc.children(parent)
        .iter()
        .copied()
        .find(|c| doc.has_class(*c, class))
}
