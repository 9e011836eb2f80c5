// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name to class map.

use std::collections::HashMap;

use tracing::debug;

use crate::error::WidgetError;
use crate::widget::WidgetDefinition;

/// Registered widget classes, keyed by name.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    classes: HashMap<String, WidgetDefinition>,
}

impl WidgetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definition` under `name`, replacing any previous class of that name.
    ///
    /// A definition without a class name gets one derived from `name`
    /// (`"ChoiceTable"` becomes `"choice-table"`).
    pub fn register(
        &mut self,
        name: &str,
        mut definition: WidgetDefinition,
    ) -> Result<(), WidgetError> {
        if name.trim().is_empty() {
            return Err(WidgetError::InvalidName(name.to_owned()));
        }
        if definition.meta.class_name.is_none() {
            definition.meta.class_name = Some(dashed(name));
        }
        let replaced = self.classes.insert(name.to_owned(), definition).is_some();
        debug!(widget = name, replaced, "registered widget");
        Ok(())
    }

    /// Look up a class.
    pub fn get(&self, name: &str) -> Option<&WidgetDefinition> {
        self.classes.get(name)
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn dashed(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Widget;

    #[derive(Default)]
    struct Plain;
    impl Widget for Plain {}

    #[test]
    fn rejects_blank_names() {
        let mut r = WidgetRegistry::new();
        for name in ["", "   "] {
            let err = r.register(name, WidgetDefinition::of::<Plain>()).unwrap_err();
            assert!(matches!(err, WidgetError::InvalidName(_)), "{name:?}");
        }
        assert!(r.is_empty());
    }

    #[test]
    fn backfills_class_name_only_when_absent() {
        let mut r = WidgetRegistry::new();
        r.register("ChoiceTable", WidgetDefinition::of::<Plain>())
            .unwrap();
        r.register(
            "Slider",
            WidgetDefinition::of::<Plain>().with_class_name("range"),
        )
        .unwrap();
        assert_eq!(
            r.get("ChoiceTable").unwrap().meta().class_name.as_deref(),
            Some("choice-table")
        );
        assert_eq!(
            r.get("Slider").unwrap().meta().class_name.as_deref(),
            Some("range")
        );
    }

    #[test]
    fn reregistration_replaces() {
        let mut r = WidgetRegistry::new();
        r.register("A", WidgetDefinition::of::<Plain>().with_title("one"))
            .unwrap();
        r.register("A", WidgetDefinition::of::<Plain>().with_title("two"))
            .unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.get("A").unwrap().meta().title.as_deref(), Some("two"));
        assert_eq!(r.names(), vec!["A"]);
    }
}
