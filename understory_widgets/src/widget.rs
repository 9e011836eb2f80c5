// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The widget contract and the definitions stored in the registry.
//!
//! ## Default behaviour
//!
//! Every method of [`Widget`] has a default, so a widget type implements only what it renders.
//! Behaviour shared by all widgets (hiding, collapsing, titles, footers, sounds, texts,
//! destruction) is provided by [`WidgetContext`] and never needs to be re-implemented;
//! a widget customizes it through [`Widget::set_disabled`] and [`Widget::on_destroy`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use understory_dom::Document;

use crate::context::{Bus, WidgetContext};
use crate::error::WidgetError;
use crate::instance::{Chrome, Wid};
use crate::options::WidgetOptions;

/// Behaviour of one widget type.
///
/// All methods run synchronously. In particular, subscriptions must be made inside
/// [`Widget::listeners`] itself: the bus records exactly that call, and a subscription made
/// later is not undone when the instance is destroyed.
pub trait Widget: Any {
    /// Configure the instance from its options. Runs before any page element exists.
    fn init(&mut self, options: &WidgetOptions) -> Result<(), WidgetError> {
        let _ = options;
        Ok(())
    }

    /// Subscribe to bus events. Every change made here is reverted on destroy.
    fn listeners(&mut self, bus: &Bus) {
        let _ = bus;
    }

    /// Render into `chrome.body`.
    ///
    /// `cx` gives access to the page and allows appending nested widgets.
    fn append(&mut self, cx: &mut WidgetContext, chrome: &Chrome) -> Result<(), WidgetError> {
        let _ = (cx, chrome);
        Ok(())
    }

    /// Current values held by the widget.
    fn get_values(&self) -> Value {
        Value::Null
    }

    /// Enable or disable the widget's own controls.
    fn set_disabled(&mut self, doc: &mut Document, chrome: &Chrome, disabled: bool) {
        let _ = (doc, chrome, disabled);
    }

    /// Release widget-specific resources, such as nested widgets, before the instance is torn down.
    fn on_destroy(&mut self, cx: &mut WidgetContext, wid: Wid) {
        let _ = (cx, wid);
    }
}

/// Class-level metadata of a widget type.
///
/// Options passed to [`WidgetContext::get`] take precedence over these values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WidgetMeta {
    /// Default title.
    pub title: Option<String>,
    /// Widget version.
    pub version: Option<String>,
    /// Extra class names for the root container.
    pub class_name: Option<String>,
    /// Whether to render a bordered panel (`None` means yes).
    pub panel: Option<bool>,
    /// Default footer.
    pub footer: Option<String>,
    /// Default context.
    pub context: Option<String>,
    /// Default sound files by name.
    pub sounds: BTreeMap<String, String>,
    /// Default texts by name.
    pub texts: BTreeMap<String, String>,
    /// Names that must resolve in some lookup scope before instantiation.
    pub dependencies: Vec<String>,
}

type Constructor = dyn Fn(&WidgetOptions) -> Box<dyn Widget>;

/// A registered widget class: a constructor plus [`WidgetMeta`].
#[derive(Clone)]
pub struct WidgetDefinition {
    pub(crate) meta: WidgetMeta,
    constructor: Rc<Constructor>,
}

impl fmt::Debug for WidgetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDefinition")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl WidgetDefinition {
    /// Create a definition from a constructor.
    pub fn new(constructor: impl Fn(&WidgetOptions) -> Box<dyn Widget> + 'static) -> Self {
        Self {
            meta: WidgetMeta::default(),
            constructor: Rc::new(constructor),
        }
    }

    /// Create a definition for a widget type built with [`Default`].
    pub fn of<W: Widget + Default>() -> Self {
        Self::new(|_| Box::new(W::default()))
    }

    /// Class metadata.
    pub fn meta(&self) -> &WidgetMeta {
        &self.meta
    }

    /// Set the default title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.meta.version = Some(version.into());
        self
    }

    /// Set extra class names.
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.meta.class_name = Some(class_name.into());
        self
    }

    /// Choose between a bordered panel and a bare container.
    #[must_use]
    pub fn with_panel(mut self, panel: bool) -> Self {
        self.meta.panel = Some(panel);
        self
    }

    /// Set the default footer.
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.meta.footer = Some(footer.into());
        self
    }

    /// Set the default context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.meta.context = Some(context.into());
        self
    }

    /// Add a default sound.
    #[must_use]
    pub fn with_sound(mut self, name: impl Into<String>, file: impl Into<String>) -> Self {
        self.meta.sounds.insert(name.into(), file.into());
        self
    }

    /// Add a default text.
    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.meta.texts.insert(name.into(), text.into());
        self
    }

    /// Declare a dependency, as a dotted path such as `"JSUS.shuffle"`.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.meta.dependencies.push(name.into());
        self
    }

    pub(crate) fn construct(&self, options: &WidgetOptions) -> Box<dyn Widget> {
        (self.constructor)(options)
    }
}
