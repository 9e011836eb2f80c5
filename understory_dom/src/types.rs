// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: element identifiers, creation attributes, and errors.

use alloc::string::String;

/// Identifier for an element in a [`Document`](crate::Document).
///
/// This is a small, copyable handle that stays stable while the element is alive
/// and becomes stale once the element is removed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On [`remove`](crate::Document::remove), the slot is freed; any existing `ElementId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ElementId`.
///
/// [`detach`](crate::Document::detach) only unlinks an element from its parent; the handle stays alive
/// and the element can be inserted again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// Attributes applied by [`Document::add`](crate::Document::add) when creating an element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementAttrs {
    /// Value of the `id` attribute.
    pub id: Option<String>,
    /// Space separated class names.
    pub class_name: Option<String>,
    /// Text content.
    pub text: Option<String>,
}

impl ElementAttrs {
    /// Attributes carrying only a class name.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Errors raised by structural operations on a [`Document`](crate::Document).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The handle refers to an element that has been removed.
    #[error("stale element handle {0:?}")]
    Stale(ElementId),
    /// Inserting the child would make an element its own ancestor.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Intended parent.
        parent: ElementId,
        /// Element being inserted.
        child: ElementId,
    },
    /// The element is not attached to any parent.
    #[error("element {0:?} has no parent")]
    NoParent(ElementId),
}
