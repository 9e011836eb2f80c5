// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance options.
//!
//! Options arrive either built in code or as a JSON object (camelCase keys, as a page script would
//! write them). JSON input is type-checked key by key: a value of the wrong type is an error, never
//! silently ignored. Unrecognized keys are kept in [`WidgetOptions::extra`] for the widget's own `init`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::WidgetError;

/// A text setting that can inherit the class default, be switched off, or be set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Label {
    /// Use the class-level default.
    #[default]
    Inherit,
    /// Do not render it.
    Off,
    /// Use this text.
    Text(String),
}

/// Options for [`WidgetContext::get`](crate::WidgetContext::get) and
/// [`WidgetContext::append`](crate::WidgetContext::append).
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetOptions {
    /// Caller-assigned id. Not required to be unique.
    pub id: Option<String>,
    /// Prefix prepended to `id`.
    pub id_prefix: Option<String>,
    /// Title override.
    pub title: Label,
    /// Footer override.
    pub footer: Label,
    /// Bordered panel override.
    pub panel: Option<bool>,
    /// Extra class names.
    pub class_name: Option<String>,
    /// Context override.
    pub context: Option<String>,
    /// Sounds, merged over the class defaults.
    pub sounds: BTreeMap<String, String>,
    /// Texts, merged over the class defaults.
    pub texts: BTreeMap<String, String>,
    /// Start hidden.
    pub hidden: bool,
    /// Start collapsed.
    pub collapsed: bool,
    /// Start highlighted.
    pub highlighted: bool,
    /// Start disabled.
    pub disabled: bool,
    /// Dock to the viewport edge.
    pub docked: bool,
    /// Render a collapse button in the heading.
    pub collapsible: bool,
    /// Render a close button in the heading.
    pub closable: bool,
    /// Element id the panel moves into while collapsed.
    pub collapse_target: Option<String>,
    /// Track the instance in the instance set (default true).
    pub store_ref: bool,
    /// Run the widget's `listeners` (default true).
    pub listeners: bool,
    /// Widget-specific options.
    pub extra: Map<String, Value>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            id: None,
            id_prefix: None,
            title: Label::Inherit,
            footer: Label::Inherit,
            panel: None,
            class_name: None,
            context: None,
            sounds: BTreeMap::new(),
            texts: BTreeMap::new(),
            hidden: false,
            collapsed: false,
            highlighted: false,
            disabled: false,
            docked: false,
            collapsible: false,
            closable: false,
            collapse_target: None,
            store_ref: true,
            listeners: true,
            extra: Map::new(),
        }
    }
}

impl TryFrom<&Value> for WidgetOptions {
    type Error = WidgetError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl WidgetOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object. `null` yields the defaults.
    pub fn from_value(value: &Value) -> Result<Self, WidgetError> {
        let mut out = Self::default();
        let obj = match value {
            Value::Null => return Ok(out),
            Value::Object(obj) => obj,
            other => return Err(mismatch("options", "object", other)),
        };
        for (key, v) in obj {
            match key.as_str() {
                "id" => {
                    out.id = match v {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        other => return Err(mismatch(key, "string or number", other)),
                    }
                }
                "idPrefix" => out.id_prefix = opt_string(key, v)?,
                "title" => out.title = label(key, v)?,
                "footer" => out.footer = label(key, v)?,
                "panel" => out.panel = opt_bool(key, v)?,
                "className" => out.class_name = class_names(key, v)?,
                "context" => out.context = opt_string(key, v)?,
                "sounds" => out.sounds = string_map(key, v)?,
                "texts" => out.texts = string_map(key, v)?,
                "hidden" => out.hidden = flag(key, v)?,
                "collapsed" => out.collapsed = flag(key, v)?,
                "highlighted" => out.highlighted = flag(key, v)?,
                "disabled" => out.disabled = flag(key, v)?,
                "docked" => out.docked = flag(key, v)?,
                "collapsible" => out.collapsible = flag(key, v)?,
                "closable" => out.closable = flag(key, v)?,
                "collapseTarget" => out.collapse_target = opt_string(key, v)?,
                "storeRef" => out.store_ref = opt_bool(key, v)?.unwrap_or(true),
                "listeners" => out.listeners = opt_bool(key, v)?.unwrap_or(true),
                _ => {
                    out.extra.insert(key.clone(), v.clone());
                }
            }
        }
        Ok(out)
    }

    /// The id with its prefix applied.
    pub fn full_id(&self) -> Option<String> {
        let id = self.id.as_deref()?;
        Some(match &self.id_prefix {
            Some(prefix) => format!("{prefix}{id}"),
            None => id.to_owned(),
        })
    }

    /// Set the id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the id prefix.
    #[must_use]
    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Label::Text(title.into());
        self
    }

    /// Suppress the title.
    #[must_use]
    pub fn no_title(mut self) -> Self {
        self.title = Label::Off;
        self
    }

    /// Set the footer.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Label::Text(footer.into());
        self
    }

    /// Choose between a bordered panel and a bare container.
    #[must_use]
    pub fn panel(mut self, panel: bool) -> Self {
        self.panel = Some(panel);
        self
    }

    /// Set extra class names.
    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set the context.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a sound.
    #[must_use]
    pub fn sound(mut self, name: impl Into<String>, file: impl Into<String>) -> Self {
        self.sounds.insert(name.into(), file.into());
        self
    }

    /// Add a text.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(name.into(), text.into());
        self
    }

    /// Start hidden.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Start collapsed.
    #[must_use]
    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Start highlighted.
    #[must_use]
    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }

    /// Start disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Dock to the viewport edge.
    #[must_use]
    pub fn docked(mut self, docked: bool) -> Self {
        self.docked = docked;
        self
    }

    /// Render a collapse button.
    #[must_use]
    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    /// Render a close button.
    #[must_use]
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    /// Move the panel into the element with this id while collapsed.
    #[must_use]
    pub fn collapse_target(mut self, element_id: impl Into<String>) -> Self {
        self.collapse_target = Some(element_id.into());
        self
    }

    /// Track the instance in the instance set.
    #[must_use]
    pub fn store_ref(mut self, store_ref: bool) -> Self {
        self.store_ref = store_ref;
        self
    }

    /// Run the widget's `listeners`.
    #[must_use]
    pub fn listeners(mut self, listeners: bool) -> Self {
        self.listeners = listeners;
        self
    }

    /// Add a widget-specific option.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

pub(crate) fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(option: &str, expected: &'static str, got: &Value) -> WidgetError {
    WidgetError::InvalidOption {
        option: option.to_owned(),
        expected,
        got: json_type(got),
    }
}

fn flag(key: &str, v: &Value) -> Result<bool, WidgetError> {
    Ok(opt_bool(key, v)?.unwrap_or(false))
}

fn opt_bool(key: &str, v: &Value) -> Result<Option<bool>, WidgetError> {
    match v {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(mismatch(key, "boolean", other)),
    }
}

fn opt_string(key: &str, v: &Value) -> Result<Option<String>, WidgetError> {
    match v {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(mismatch(key, "string", other)),
    }
}

fn label(key: &str, v: &Value) -> Result<Label, WidgetError> {
    match v {
        Value::Null => Ok(Label::Inherit),
        Value::Bool(false) => Ok(Label::Off),
        Value::String(s) => Ok(Label::Text(s.clone())),
        other => Err(mismatch(key, "string or false", other)),
    }
}

fn class_names(key: &str, v: &Value) -> Result<Option<String>, WidgetError> {
    match v {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => names.push(s.as_str()),
                    other => return Err(mismatch(key, "string or array of strings", other)),
                }
            }
            Ok(Some(names.join(" ")))
        }
        other => Err(mismatch(key, "string or array of strings", other)),
    }
}

fn string_map(key: &str, v: &Value) -> Result<BTreeMap<String, String>, WidgetError> {
    match v {
        Value::Null => Ok(BTreeMap::new()),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, item)| match item {
                Value::String(s) => Ok((k.clone(), s.clone())),
                other => Err(mismatch(&format!("{key}.{k}"), "string", other)),
            })
            .collect(),
        other => Err(mismatch(key, "object", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_track_and_listen() {
        let o = WidgetOptions::from_value(&Value::Null).unwrap();
        assert!(o.store_ref);
        assert!(o.listeners);
        assert_eq!(o.title, Label::Inherit);
        assert_eq!(o, WidgetOptions::new());
    }

    #[test]
    fn numeric_id_is_coerced_and_prefixed() {
        let o = WidgetOptions::from_value(&json!({ "id": 7, "idPrefix": "w_" })).unwrap();
        assert_eq!(o.id.as_deref(), Some("7"));
        assert_eq!(o.full_id().as_deref(), Some("w_7"));
    }

    #[test]
    fn prefix_without_id_yields_no_id() {
        let o = WidgetOptions::new().id_prefix("w_");
        assert_eq!(o.full_id(), None);
    }

    #[test]
    fn title_false_switches_title_off() {
        let o = WidgetOptions::from_value(&json!({ "title": false, "footer": "bye" })).unwrap();
        assert_eq!(o.title, Label::Off);
        assert_eq!(o.footer, Label::Text("bye".into()));
    }

    #[test]
    fn class_name_array_is_joined() {
        let o = WidgetOptions::from_value(&json!({ "className": ["a", "b"] })).unwrap();
        assert_eq!(o.class_name.as_deref(), Some("a b"));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let cases = [
            json!({ "id": true }),
            json!({ "title": true }),
            json!({ "panel": "yes" }),
            json!({ "className": [1] }),
            json!({ "sounds": { "beep": 3 } }),
            json!({ "docked": 1 }),
            json!({ "storeRef": "no" }),
        ];
        for case in &cases {
            let err = WidgetOptions::from_value(case).unwrap_err();
            assert!(
                matches!(err, WidgetError::InvalidOption { .. }),
                "{case} should be a type error, got {err:?}"
            );
        }
    }

    #[test]
    fn mismatch_reports_key_and_types() {
        let err = WidgetOptions::from_value(&json!({ "texts": { "hi": [] } })).unwrap_err();
        match err {
            WidgetError::InvalidOption {
                option,
                expected,
                got,
            } => {
                assert_eq!(option, "texts.hi");
                assert_eq!(expected, "string");
                assert_eq!(got, "array");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(WidgetOptions::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn unknown_keys_go_to_extra() {
        let o = WidgetOptions::from_value(&json!({ "width": 120, "storeRef": false })).unwrap();
        assert_eq!(o.extra.get("width"), Some(&json!(120)));
        assert!(!o.store_ref);
    }
}
