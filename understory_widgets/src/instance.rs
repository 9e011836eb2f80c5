// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live widget instances: identity, UI flags, hooks, and page elements.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use understory_dom::ElementId;
use understory_event_bus::types::ChangeSet;

use crate::widget::Widget;

/// Process-unique identifier assigned to every instance at creation.
///
/// Unlike the caller-chosen `id`, a `Wid` is never shared by two live instances, so it is the key
/// used to find an instance in the [`InstanceSet`](crate::InstanceSet) and the dock.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Wid(pub(crate) u64);

impl Wid {
    /// Raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Wid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags::bitflags! {
    /// UI state of an instance.
    ///
    /// The same type is used for the state staged by [`get`](crate::WidgetContext::get) and
    /// applied by [`append`](crate::WidgetContext::append).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WidgetFlags: u8 {
        /// Controls are disabled.
        const DISABLED    = 0b0000_0001;
        /// Panel is highlighted.
        const HIGHLIGHTED = 0b0000_0010;
        /// Body and footer are collapsed.
        const COLLAPSED   = 0b0000_0100;
        /// Panel is hidden.
        const HIDDEN      = 0b0000_1000;
        /// Panel is docked to the viewport edge.
        const DOCKED      = 0b0001_0000;
        /// Panel has been inserted into the page.
        const APPENDED    = 0b0010_0000;
        /// Instance has been destroyed.
        const DESTROYED   = 0b0100_0000;
    }
}

/// Named instance events, each with its own hook list.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum HookKind {
    /// After [`hide`](crate::WidgetContext::hide).
    Hidden,
    /// After [`show`](crate::WidgetContext::show).
    Shown,
    /// After [`collapse`](crate::WidgetContext::collapse).
    Collapsed,
    /// After [`uncollapse`](crate::WidgetContext::uncollapse).
    Uncollapsed,
    /// After [`disable`](crate::WidgetContext::disable).
    Disabled,
    /// After [`enable`](crate::WidgetContext::enable).
    Enabled,
    /// At the end of [`destroy`](crate::WidgetContext::destroy).
    Destroyed,
    /// After [`highlight`](crate::WidgetContext::highlight).
    Highlighted,
    /// After [`unhighlight`](crate::WidgetContext::unhighlight).
    Unhighlighted,
}

impl HookKind {
    /// Every hook kind, in table order.
    pub const ALL: [Self; 9] = [
        Self::Hidden,
        Self::Shown,
        Self::Collapsed,
        Self::Uncollapsed,
        Self::Disabled,
        Self::Enabled,
        Self::Destroyed,
        Self::Highlighted,
        Self::Unhighlighted,
    ];

    /// Event name, also used as the event type on the `widgets` bus channel.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Shown => "shown",
            Self::Collapsed => "collapsed",
            Self::Uncollapsed => "uncollapsed",
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::Destroyed => "destroyed",
            Self::Highlighted => "highlighted",
            Self::Unhighlighted => "unhighlighted",
        }
    }
}

/// Argument passed to hook callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookEvent {
    /// Instance that changed.
    pub wid: Wid,
    /// Its caller-assigned id, if any.
    pub id: Option<String>,
    /// What happened.
    pub kind: HookKind,
}

/// A hook callback.
pub type Hook = Box<dyn FnMut(&HookEvent)>;

/// Per-instance table of hook lists, one per [`HookKind`].
pub struct Hooks {
    table: BTreeMap<HookKind, Vec<Hook>>,
}

impl Hooks {
    pub(crate) fn new() -> Self {
        Self {
            table: HookKind::ALL.iter().map(|k| (*k, Vec::new())).collect(),
        }
    }

    pub(crate) fn push(&mut self, kind: HookKind, hook: Hook) {
        self.table.entry(kind).or_default().push(hook);
    }

    /// Number of callbacks registered for `kind`.
    pub fn len(&self, kind: HookKind) -> usize {
        self.table.get(&kind).map_or(0, Vec::len)
    }

    pub(crate) fn run(&mut self, event: &HookEvent) {
        if let Some(list) = self.table.get_mut(&event.kind) {
            for hook in list.iter_mut() {
                hook(event);
            }
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.table.iter().map(|(k, v)| (k.as_str(), v.len())))
            .finish()
    }
}

/// The page elements that make up an appended instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Chrome {
    /// Owning instance.
    pub wid: Wid,
    /// Root container (`panelDiv`).
    pub panel: ElementId,
    /// Title container, when a title is shown.
    pub heading: Option<ElementId>,
    /// Content container that the widget renders into.
    pub body: ElementId,
    /// Footer container, when a footer is declared.
    pub footer: Option<ElementId>,
}

/// One widget instance as tracked by a [`WidgetContext`](crate::WidgetContext).
pub struct WidgetInstance {
    pub(crate) wid: Wid,
    pub(crate) name: String,
    pub(crate) id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) footer: Option<String>,
    pub(crate) panel: bool,
    pub(crate) class_name: Option<String>,
    pub(crate) context: Option<String>,
    pub(crate) sounds: BTreeMap<String, String>,
    pub(crate) texts: BTreeMap<String, String>,
    pub(crate) collapsible: bool,
    pub(crate) closable: bool,
    pub(crate) collapse_target: Option<String>,
    pub(crate) store_ref: bool,
    pub(crate) flags: WidgetFlags,
    pub(crate) staged: WidgetFlags,
    pub(crate) panel_div: Option<ElementId>,
    pub(crate) heading_div: Option<ElementId>,
    pub(crate) body_div: Option<ElementId>,
    pub(crate) footer_div: Option<ElementId>,
    pub(crate) original_root: Option<ElementId>,
    pub(crate) hooks: Hooks,
    // Consumed by destroy.
    pub(crate) changes: Option<ChangeSet<Value>>,
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) tearing_down: bool,
}

impl fmt::Debug for WidgetInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetInstance")
            .field("wid", &self.wid)
            .field("name", &self.name)
            .field("id", &self.id)
            .field("flags", &self.flags)
            .field("staged", &self.staged)
            .field("panel_div", &self.panel_div)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl WidgetInstance {
    /// Process-unique identifier.
    pub fn wid(&self) -> Wid {
        self.wid
    }

    /// Registered name of the widget class.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Caller-assigned id (prefix applied), if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Resolved title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Resolved footer.
    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// Whether the instance renders with a bordered panel.
    pub fn has_panel(&self) -> bool {
        self.panel
    }

    /// Resolved extra class names.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Resolved context (e.g. `"info"`, `"warning"`).
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Current UI flags.
    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    /// UI flags waiting for [`append`](crate::WidgetContext::append).
    pub fn staged(&self) -> WidgetFlags {
        self.staged
    }

    /// Whether the instance is tracked in the [`InstanceSet`](crate::InstanceSet).
    pub fn stores_ref(&self) -> bool {
        self.store_ref
    }

    /// Root container, once appended.
    pub fn panel_div(&self) -> Option<ElementId> {
        self.panel_div
    }

    /// Body container, once appended.
    pub fn body_div(&self) -> Option<ElementId> {
        self.body_div
    }

    /// Heading container, when shown.
    pub fn heading_div(&self) -> Option<ElementId> {
        self.heading_div
    }

    /// Footer container, when shown.
    pub fn footer_div(&self) -> Option<ElementId> {
        self.footer_div
    }

    /// Element the panel was first inserted into.
    pub fn original_root(&self) -> Option<ElementId> {
        self.original_root
    }

    /// Hook table.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Listener changes made by the widget's `listeners` call, until destroy consumes them.
    pub fn listener_changes(&self) -> Option<&ChangeSet<Value>> {
        self.changes.as_ref()
    }

    /// Page elements of an appended instance.
    pub fn chrome(&self) -> Option<Chrome> {
        Some(Chrome {
            wid: self.wid,
            panel: self.panel_div?,
            heading: self.heading_div,
            body: self.body_div?,
            footer: self.footer_div,
        })
    }
}
