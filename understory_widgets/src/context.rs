// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The context object that owns every piece of lifecycle state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Value, json};
use understory_dom::Document;
use understory_event_bus::bus::EventBus;

use crate::deps::DependencyScopes;
use crate::dock::DockLayout;
use crate::error::WidgetError;
use crate::instance::{HookEvent, HookKind, Wid, WidgetInstance};
use crate::instances::InstanceSet;
use crate::overflow::{BOX_SELECTOR, BoxSelector};
use crate::registry::WidgetRegistry;

/// The event bus type widgets subscribe on.
pub type Bus = EventBus<Value>;

/// Bus channel on which instance hooks are re-emitted, with a `{wid, id, name}` payload.
pub const WIDGETS_CHANNEL: &str = "widgets";

/// Docking geometry, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DockConfig {
    /// Gap between docked widgets, and between the first one and the viewport edge.
    pub margin: f64,
    /// Space kept free to the left of the dock before older widgets overflow.
    pub safety_margin: f64,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            safety_margin: 200.0,
        }
    }
}

/// Configuration of a [`WidgetContext`].
///
/// ```
/// use understory_widgets::ContextConfig;
///
/// let cfg = ContextConfig::from_json(r#"{ "dock": { "safetyMargin": 50 } }"#).unwrap();
/// assert_eq!(cfg.dock.safety_margin, 50.0);
/// assert_eq!(cfg.dock.margin, 20.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextConfig {
    /// Docking geometry.
    pub dock: DockConfig,
}

impl ContextConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, WidgetError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Registry, page, bus, and live instances.
///
/// Every lifecycle operation goes through a context, so independent contexts never share state.
pub struct WidgetContext {
    pub(crate) registry: WidgetRegistry,
    pub(crate) scopes: DependencyScopes,
    pub(crate) bus: Rc<Bus>,
    pub(crate) doc: Document,
    pub(crate) slots: HashMap<Wid, WidgetInstance>,
    pub(crate) instances: InstanceSet,
    pub(crate) dock: DockLayout,
    pub(crate) last_appended: Option<Wid>,
}

impl fmt::Debug for WidgetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetContext")
            .field("registry", &self.registry.names())
            .field("doc", &self.doc)
            .field("bus", &self.bus)
            .field("live", &self.slots.len())
            .field("instances", &self.instances)
            .field("dock", &self.dock)
            .field("last_appended", &self.last_appended)
            .finish_non_exhaustive()
    }
}

impl Default for WidgetContext {
    fn default() -> Self {
        Self::new(Document::default(), Rc::new(Bus::new()))
    }
}

impl WidgetContext {
    /// Create a context over `doc` and `bus` with the default configuration.
    pub fn new(doc: Document, bus: Rc<Bus>) -> Self {
        Self::with_config(doc, bus, ContextConfig::default())
    }

    /// Create a context with an explicit configuration.
    pub fn with_config(doc: Document, bus: Rc<Bus>, config: ContextConfig) -> Self {
        let mut registry = WidgetRegistry::new();
        // The name is a non-empty constant.
        let _ = registry.register(BOX_SELECTOR, BoxSelector::definition());
        Self {
            registry,
            scopes: DependencyScopes::default(),
            bus,
            doc,
            slots: HashMap::new(),
            instances: InstanceSet::default(),
            dock: DockLayout::new(config.dock),
            last_appended: None,
        }
    }

    /// Registered classes.
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Registered classes, for registration.
    pub fn registry_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.registry
    }

    /// Dependency lookup scopes.
    pub fn scopes(&self) -> &DependencyScopes {
        &self.scopes
    }

    /// Dependency lookup scopes, for publishing values.
    pub fn scopes_mut(&mut self) -> &mut DependencyScopes {
        &mut self.scopes
    }

    /// Check the dependencies of a registered class. See [`DependencyScopes::check`].
    pub fn check_dependencies(&self, name: &str, quiet: bool) -> bool {
        self.scopes.check(&self.registry, name, quiet)
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Rc<Bus> {
        &self.bus
    }

    /// The page.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The page, for host-side mutation (sizes, viewport, frame).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Tracked instances, in creation order.
    pub fn instances(&self) -> &InstanceSet {
        &self.instances
    }

    /// Dock state.
    pub fn dock(&self) -> &DockLayout {
        &self.dock
    }

    /// Most recently appended tracked instance.
    pub fn last_appended(&self) -> Option<Wid> {
        self.last_appended
    }

    /// Look up a live instance, tracked or not.
    pub fn instance(&self, wid: Wid) -> Option<&WidgetInstance> {
        self.slots.get(&wid)
    }

    /// Returns true if `wid` names a live instance.
    pub fn is_live(&self, wid: Wid) -> bool {
        self.slots.contains_key(&wid)
    }

    /// Number of live instances, tracked or not.
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    /// The widget of instance `wid`, if it is a `T`.
    pub fn widget<T: Any>(&self, wid: Wid) -> Option<&T> {
        let w: &dyn Any = self.slots.get(&wid)?.widget.as_deref()?;
        w.downcast_ref()
    }

    /// The widget of instance `wid`, mutably, if it is a `T`.
    pub fn widget_mut<T: Any>(&mut self, wid: Wid) -> Option<&mut T> {
        let w: &mut dyn Any = self.slots.get_mut(&wid)?.widget.as_deref_mut()?;
        w.downcast_mut()
    }

    /// Run `f` with the widget of instance `wid` and the page.
    pub fn with_widget_mut<T: Any, R>(
        &mut self,
        wid: Wid,
        f: impl FnOnce(&mut T, &mut Document) -> R,
    ) -> Option<R> {
        let w: &mut dyn Any = self.slots.get_mut(&wid)?.widget.as_deref_mut()?;
        let w = w.downcast_mut::<T>()?;
        Some(f(w, &mut self.doc))
    }

    /// Register a hook on instance `wid`. Returns false if the instance does not exist.
    pub fn on_hook(
        &mut self,
        wid: Wid,
        kind: HookKind,
        hook: impl FnMut(&HookEvent) + 'static,
    ) -> bool {
        match self.slots.get_mut(&wid) {
            Some(inst) => {
                inst.hooks.push(kind, Box::new(hook));
                true
            }
            None => false,
        }
    }

    pub(crate) fn emit_hook(&mut self, wid: Wid, kind: HookKind) {
        let Some(inst) = self.slots.get_mut(&wid) else {
            return;
        };
        let event = HookEvent {
            wid,
            id: inst.id.clone(),
            kind,
        };
        inst.hooks.run(&event);
        let payload = json!({ "wid": wid.get(), "id": event.id, "name": inst.name });
        self.bus.emit(WIDGETS_CHANNEL, kind.as_str(), &payload);
    }

    pub(crate) fn parts(&mut self, wid: Wid) -> Option<(&mut WidgetInstance, &mut Document)> {
        let inst = self.slots.get_mut(&wid)?;
        Some((inst, &mut self.doc))
    }
}
