// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dom --heading-base-level=0

//! Understory DOM: a Kurbo-native, in-memory element tree.
//!
//! Understory DOM is the page model that widget layers build on.
//!
//! - Represents a page as an `<html>` root with a `<body>`, plus an optional content-frame root.
//! - Elements carry a tag, an `id` attribute, classes, inline styles, attributes, and text.
//! - Handles are generational, so a removed element never aliases a newer one.
//! - Answers the questions a widget manager asks of a browser: is this element still attached to the
//!   page, how wide is it, how wide is the viewport.
//!
//! ## Not a layout engine
//!
//! This crate does not perform layout. The host assigns rendered sizes with [`Document::set_size`];
//! [`Document::offset_width`] then reports what `offsetWidth` would: the explicit width, otherwise the
//! widest child, and `0` for detached elements or elements under `display: none`.
//! [`Document::request_layout`] records that the page wants re-measuring.
//!
//! ## Attachment
//!
//! An element is *connected* when its ancestor chain reaches the body or the active content-frame root
//! (see [`Document::set_frame_root`]). [`Document::detach`] unlinks an element but keeps its handle alive,
//! which is how a page silently orphans content; [`Document::remove`] frees the whole subtree.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_dom::{Document, ElementAttrs};
//! use kurbo::Size;
//!
//! let mut doc = Document::new(Size::new(800.0, 600.0));
//! let body = doc.body();
//! let panel = doc.add("div", body, ElementAttrs::class("ng_widget card")).unwrap();
//! let content = doc.add("div", panel, ElementAttrs::default()).unwrap();
//! doc.set_size(content, Size::new(120.0, 40.0));
//!
//! assert_eq!(doc.offset_width(panel), 120.0);
//! assert!(doc.is_connected(panel));
//!
//! doc.detach(panel).unwrap();
//! assert!(!doc.is_connected(panel));
//! assert_eq!(doc.offset_width(panel), 0.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod document;
mod types;

pub use document::Document;
pub use types::{DomError, ElementAttrs, ElementId};
