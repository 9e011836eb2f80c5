// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by registration, instantiation, and attachment.

use understory_dom::DomError;

use crate::instance::Wid;

/// Errors returned by [`WidgetContext`](crate::WidgetContext) operations.
///
/// Every variant except [`WidgetError::Dom`] is detected before the page is touched.
/// Destruction never fails; cleanup faults are logged instead.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// A widget name was empty or only whitespace.
    #[error("invalid widget name: {0:?}")]
    InvalidName(String),
    /// No widget is registered under this name.
    #[error("unknown widget: {0}")]
    UnknownWidget(String),
    /// A declared dependency is not present in any lookup scope.
    #[error("widget {widget} is missing dependency {dependency}")]
    UnmetDependency {
        /// Widget being instantiated.
        widget: String,
        /// First missing dependency.
        dependency: String,
    },
    /// An option had the wrong type.
    #[error("type mismatch for option '{option}': expected {expected}, got {got}")]
    InvalidOption {
        /// Option key.
        option: String,
        /// Accepted type(s).
        expected: &'static str,
        /// JSON type actually supplied.
        got: &'static str,
    },
    /// `docked` was requested for a widget created with `storeRef: false`.
    #[error("widget {0}: a docked widget cannot be created with storeRef false")]
    DockedWithoutStoreRef(String),
    /// The root element could not be resolved.
    #[error("root element not found: {0}")]
    RootNotFound(String),
    /// The instance does not exist (never created, or already destroyed).
    #[error("unknown widget instance {0}")]
    UnknownInstance(Wid),
    /// The instance was already appended to the page.
    #[error("widget instance {0} is already appended")]
    AlreadyAppended(Wid),
    /// A widget failed while initializing or rendering.
    #[error("widget {widget} failed: {message}")]
    Widget {
        /// Widget name.
        widget: String,
        /// Failure description.
        message: String,
    },
    /// A structural page operation failed.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Context configuration could not be parsed.
    #[error("invalid context configuration: {0}")]
    Config(#[from] serde_json::Error),
}
