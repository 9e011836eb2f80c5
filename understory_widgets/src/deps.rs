// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency checking.
//!
//! A widget class may declare names it needs, such as `"JSUS"` or `"W.getFrameDocument"`.
//! Each name is looked up, as a dotted path, in these scopes in order:
//!
//! 1. the global scope,
//! 2. the framework root object,
//! 3. the widget registry (a registered class name satisfies a dependency),
//! 4. the DOM-facing root.
//!
//! A name is satisfied if any scope resolves it.

use serde_json::{Map, Value};
use tracing::error;

use crate::registry::WidgetRegistry;

/// Something a dotted dependency path can be resolved against.
pub trait DependencyScope {
    /// Returns true if `path` resolves to a present value.
    fn resolve(&self, path: &str) -> bool;
}

impl DependencyScope for Value {
    fn resolve(&self, path: &str) -> bool {
        let mut cur = self;
        for key in path.split('.') {
            match cur.get(key) {
                Some(next) => cur = next,
                None => return false,
            }
        }
        !cur.is_null()
    }
}

impl DependencyScope for WidgetRegistry {
    fn resolve(&self, path: &str) -> bool {
        self.contains(path)
    }
}

/// Which of the host-provided scopes a value is published in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// The global scope.
    Global,
    /// The framework root object.
    Framework,
    /// The DOM-facing root.
    Dom,
}

/// The host-provided lookup scopes. The registry is the remaining scope.
#[derive(Clone, Debug, PartialEq)]
pub struct DependencyScopes {
    /// Global scope.
    pub global: Value,
    /// Framework root object.
    pub framework: Value,
    /// DOM-facing root.
    pub dom: Value,
}

impl Default for DependencyScopes {
    fn default() -> Self {
        Self {
            global: Value::Object(Map::new()),
            framework: Value::Object(Map::new()),
            dom: Value::Object(Map::new()),
        }
    }
}

impl DependencyScopes {
    /// Publish `value` at the dotted `path` of a scope, creating intermediate objects.
    ///
    /// Non-object values met on the way are replaced.
    pub fn provide(&mut self, scope: ScopeKind, path: &str, value: Value) {
        let mut cur = match scope {
            ScopeKind::Global => &mut self.global,
            ScopeKind::Framework => &mut self.framework,
            ScopeKind::Dom => &mut self.dom,
        };
        let mut keys = path.split('.').peekable();
        while let Some(key) = keys.next() {
            if !cur.is_object() {
                *cur = Value::Object(Map::new());
            }
            let Value::Object(obj) = cur else {
                return;
            };
            if keys.peek().is_none() {
                obj.insert(key.to_owned(), value);
                return;
            }
            cur = obj
                .entry(key.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    /// First dependency in `dependencies` that no scope resolves.
    pub fn missing<'a>(
        &self,
        registry: &WidgetRegistry,
        dependencies: &'a [String],
    ) -> Option<&'a str> {
        let scopes: [&dyn DependencyScope; 4] =
            [&self.global, &self.framework, registry, &self.dom];
        dependencies
            .iter()
            .find(|dep| !scopes.iter().any(|s| s.resolve(dep)))
            .map(String::as_str)
    }

    /// Check the dependencies of the registered class `name`.
    ///
    /// Returns false, and logs an error unless `quiet`, when one is missing.
    /// An unknown class has nothing to check and passes.
    pub fn check(&self, registry: &WidgetRegistry, name: &str, quiet: bool) -> bool {
        let Some(def) = registry.get(name) else {
            return true;
        };
        match self.missing(registry, &def.meta().dependencies) {
            None => true,
            Some(dependency) => {
                if !quiet {
                    error!(widget = name, dependency, "missing dependency");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Widget, WidgetDefinition};
    use serde_json::json;

    #[derive(Default)]
    struct Plain;
    impl Widget for Plain {}

    #[test]
    fn dotted_lookup_requires_every_segment() {
        let v = json!({ "JSUS": { "shuffle": {} }, "gone": null });
        assert!(v.resolve("JSUS"));
        assert!(v.resolve("JSUS.shuffle"));
        assert!(!v.resolve("JSUS.sort"));
        assert!(!v.resolve("gone"), "null counts as absent");
    }

    #[test]
    fn provide_builds_nested_objects() {
        let mut scopes = DependencyScopes::default();
        scopes.provide(ScopeKind::Framework, "W.getFrameDocument", json!(true));
        assert!(scopes.framework.resolve("W.getFrameDocument"));
        assert!(!scopes.global.resolve("W"));
    }

    #[test]
    fn any_scope_satisfies() {
        let mut registry = WidgetRegistry::new();
        registry
            .register("Table", WidgetDefinition::of::<Plain>())
            .unwrap();
        let mut scopes = DependencyScopes::default();
        scopes.provide(ScopeKind::Global, "JSUS", json!({}));
        scopes.provide(ScopeKind::Dom, "canvas", json!({}));

        let deps = ["JSUS", "Table", "canvas"].map(String::from);
        assert_eq!(scopes.missing(&registry, &deps), None);

        let deps = ["JSUS", "Y"].map(String::from);
        assert_eq!(scopes.missing(&registry, &deps), Some("Y"));
    }

    #[test]
    fn check_reports_unmet_class() {
        let mut registry = WidgetRegistry::new();
        registry
            .register("X", WidgetDefinition::of::<Plain>().with_dependency("Y"))
            .unwrap();
        registry
            .register("Free", WidgetDefinition::of::<Plain>())
            .unwrap();
        let scopes = DependencyScopes::default();
        assert!(!scopes.check(&registry, "X", true));
        assert!(scopes.check(&registry, "Free", false));
    }
}
