// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixture widget shared by the unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use kurbo::Size;
use serde_json::{Value, json};
use tracing_subscriber::fmt::MakeWriter;
use understory_dom::{Document, ElementAttrs, ElementId};

use crate::attach::RootRef;
use crate::context::{Bus, WidgetContext};
use crate::error::WidgetError;
use crate::instance::{Chrome, Wid};
use crate::options::{WidgetOptions, json_type};
use crate::widget::{Widget, WidgetDefinition};

/// Renders a content block of a known width and an input; subscribes on `ng` and `game`.
///
/// Options: `width` (number), `nested` (append a child probe into the body),
/// `steal` (unsubscribe every `ng`/`PAUSED` listener while recording).
#[derive(Debug)]
pub(crate) struct Probe {
    pub(crate) width: f64,
    pub(crate) nested: bool,
    pub(crate) steal: bool,
    pub(crate) input: Option<ElementId>,
    pub(crate) children: Vec<Wid>,
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            width: 100.0,
            nested: false,
            steal: false,
            input: None,
            children: Vec::new(),
        }
    }
}

impl Probe {
    pub(crate) const NAME: &'static str = "Probe";
}

impl Widget for Probe {
    fn init(&mut self, options: &WidgetOptions) -> Result<(), WidgetError> {
        if let Some(v) = options.extra.get("width") {
            self.width = v.as_f64().ok_or_else(|| WidgetError::InvalidOption {
                option: "width".into(),
                expected: "number",
                got: json_type(v),
            })?;
        }
        self.nested = options.extra.get("nested").and_then(Value::as_bool) == Some(true);
        self.steal = options.extra.get("steal").and_then(Value::as_bool) == Some(true);
        Ok(())
    }

    fn listeners(&mut self, bus: &Bus) {
        let _ = bus.on("ng", "PLAYING", |_| {});
        let _ = bus.on("game", "STEP", |_| {});
        if self.steal {
            bus.off_event("ng", "PAUSED");
        }
    }

    fn append(&mut self, cx: &mut WidgetContext, chrome: &Chrome) -> Result<(), WidgetError> {
        let doc = cx.document_mut();
        let content = doc.add("div", chrome.body, ElementAttrs::class("probe-content"))?;
        doc.set_size(content, Size::new(self.width, 30.0));
        self.input = Some(doc.add("input", chrome.body, ElementAttrs::default())?);
        if self.nested {
            let child = cx.append(
                Self::NAME,
                RootRef::Element(chrome.body),
                &WidgetOptions::new().extra("width", json!(10)),
            )?;
            self.children.push(child);
        }
        Ok(())
    }

    fn get_values(&self) -> Value {
        json!({ "width": self.width })
    }

    fn set_disabled(&mut self, doc: &mut Document, _chrome: &Chrome, disabled: bool) {
        if let Some(input) = self.input {
            if disabled {
                doc.set_attribute(input, "disabled", "true");
            } else {
                doc.remove_attribute(input, "disabled");
            }
        }
    }

    fn on_destroy(&mut self, cx: &mut WidgetContext, _wid: Wid) {
        for child in self.children.drain(..) {
            cx.destroy(child);
        }
    }
}

/// A context with [`Probe`] registered (title `"Probe"`, sound `tick`).
pub(crate) fn probe_context() -> WidgetContext {
    let mut cx = WidgetContext::default();
    cx.registry_mut()
        .register(
            Probe::NAME,
            WidgetDefinition::of::<Probe>()
                .with_title("Probe")
                .with_sound("tick", "tick.ogg"),
        )
        .expect("valid name");
    cx
}

/// Collects formatted `warn!` and `error!` output of the closures it runs.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub(crate) fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Number of captured occurrences of `needle`.
    pub(crate) fn count(&self, needle: &str) -> usize {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).matches(needle).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
