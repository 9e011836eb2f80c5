// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_widgets --heading-base-level=0

//! Understory Widgets: widget lifecycle and docking over an Understory DOM and event bus.
//!
//! A [`WidgetContext`] owns everything a page needs to manage widgets: the class registry, the
//! dependency scopes, the page ([`understory_dom::Document`]), the shared event bus, the live
//! instances, and the dock.
//!
//! ## Lifecycle
//!
//! - [`WidgetRegistry::register`] adds a class: a constructor plus [`WidgetMeta`] defaults.
//!   [`Widget`] methods all have defaults, so a class implements only what it renders.
//! - [`WidgetContext::get`] checks dependencies, builds the instance, and records the bus
//!   subscriptions its [`Widget::listeners`] call makes.
//! - [`WidgetContext::append`] builds the panel (heading, body, footer), inserts it, lets the
//!   widget render into the body, and applies staged state in two phases: hidden and collapsed
//!   before rendering, highlighted and disabled after.
//! - [`WidgetContext::destroy`] removes the panel and reverts exactly the recorded subscriptions.
//!   It never fails and is safe to call twice.
//!
//! [`WidgetContext::destroy_all`] and [`WidgetContext::garbage_collection`] operate on the
//! [`InstanceSet`]; the latter collects widgets whose panels were detached from the page by other
//! code, and runs on every [`WidgetContext::frame_reloaded`].
//!
//! ## Docking
//!
//! Docked widgets stack along the right edge of the viewport. When one does not fit, the oldest
//! are hidden and listed in a [`BoxSelector`] menu; [`WidgetContext::restore_docked`] brings one
//! back. See [`DockLayout`] and [`DockConfig`].
//!
//! ## Minimal usage
//!
//! ```
//! use understory_widgets::{RootRef, Widget, WidgetContext, WidgetDefinition, WidgetOptions, Bus};
//!
//! #[derive(Default)]
//! struct Clock;
//!
//! impl Widget for Clock {
//!     fn listeners(&mut self, bus: &Bus) {
//!         let _ = bus.on("ng", "PLAYING", |_| {});
//!     }
//! }
//!
//! let mut cx = WidgetContext::default();
//! cx.registry_mut()
//!     .register("Clock", WidgetDefinition::of::<Clock>().with_title("Time"))
//!     .unwrap();
//!
//! let wid = cx.append("Clock", RootRef::Default, &WidgetOptions::new()).unwrap();
//! assert_eq!(cx.bus().listener_count("ng"), 1);
//! assert!(cx.is_appended(wid));
//!
//! assert!(cx.destroy(wid));
//! assert_eq!(cx.bus().listener_count("ng"), 0);
//! assert!(cx.instances().is_empty());
//! ```

mod attach;
mod context;
mod deps;
mod dock;
mod error;
mod factory;
mod instance;
mod instances;
mod options;
mod overflow;
mod registry;
mod state;
mod widget;

#[cfg(test)]
mod test_support;

pub use attach::{RootRef, WidgetRef};
pub use context::{Bus, ContextConfig, DockConfig, WIDGETS_CHANNEL, WidgetContext};
pub use deps::{DependencyScope, DependencyScopes, ScopeKind};
pub use dock::{DockEntry, DockLayout};
pub use error::WidgetError;
pub use instance::{Chrome, Hook, HookEvent, HookKind, Hooks, Wid, WidgetFlags, WidgetInstance};
pub use instances::InstanceSet;
pub use options::{Label, WidgetOptions};
pub use overflow::{BOX_SELECTOR, BoxSelector};
pub use registry::WidgetRegistry;
pub use widget::{Widget, WidgetDefinition, WidgetMeta};
