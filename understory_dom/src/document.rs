// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: structure, mutation, measurement, queries.

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use kurbo::Size;

use crate::types::{DomError, ElementAttrs, ElementId};

#[derive(Clone, Debug)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    size: Option<Size>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            id: None,
            classes: Vec::new(),
            style: BTreeMap::new(),
            attributes: BTreeMap::new(),
            text: None,
            size: None,
            parent: None,
            children: Vec::new(),
        }
    }

    fn is_display_none(&self) -> bool {
        self.style.get("display").is_some_and(|d| d == "none")
    }
}

/// An in-memory page: an `<html>` root with a `<body>`, an optional content-frame
/// root, and a viewport.
///
/// Elements are stored in generational slots and addressed by [`ElementId`].
/// Geometry is not computed here; the host assigns rendered sizes with
/// [`Document::set_size`] and [`Document::offset_width`] reports them the way a
/// browser reports `offsetWidth`.
pub struct Document {
    elements: Vec<Option<Element>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: ElementId,
    body: ElementId,
    frame_root: Option<ElementId>,
    viewport: Size,
    layout_epoch: u64,
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.elements.len();
        let alive = self.elements.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Document")
            .field("elements_total", &total)
            .field("elements_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("frame_root", &self.frame_root)
            .field("viewport", &self.viewport)
            .field("layout_epoch", &self.layout_epoch)
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Size::new(1024.0, 768.0))
    }
}

impl Document {
    /// Create a page with an empty `<body>` and the given viewport.
    pub fn new(viewport: Size) -> Self {
        let mut doc = Self {
            elements: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: ElementId::new(0, 0),
            body: ElementId::new(0, 0),
            frame_root: None,
            viewport,
            layout_epoch: 0,
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.link(doc.root, doc.body, None);
        doc
    }

    /// The `<html>` element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The page `<body>`.
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Root of the active content frame, if one is loaded.
    pub fn frame_root(&self) -> Option<ElementId> {
        self.frame_root
    }

    /// Create a detached `<body>` suitable for use as a content-frame root.
    pub fn create_frame_root(&mut self) -> ElementId {
        self.create_element("body")
    }

    /// Install (or clear) the content-frame root.
    ///
    /// Elements under the previous frame root stop being connected.
    pub fn set_frame_root(&mut self, root: Option<ElementId>) {
        self.frame_root = root.filter(|r| self.is_alive(*r));
    }

    /// Current viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Viewport width, as `window.innerWidth`.
    pub fn inner_width(&self) -> f64 {
        self.viewport.width
    }

    /// Ask the host to re-measure the page.
    pub fn request_layout(&mut self) {
        self.layout_epoch = self.layout_epoch.wrapping_add(1);
    }

    /// Number of layout requests so far.
    pub fn layout_epoch(&self) -> u64 {
        self.layout_epoch
    }

    // --- structure ---

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Element::new(tag);
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] += 1;
            self.elements[idx] = Some(element);
            idx
        } else {
            self.elements.push(Some(element));
            self.generations.push(1);
            self.elements.len() - 1
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ElementId uses 32-bit indices by design."
        )]
        ElementId::new(idx as u32, self.generations[idx])
    }

    /// Create an element with `attrs` and append it to `parent`.
    pub fn add(
        &mut self,
        tag: &str,
        parent: ElementId,
        attrs: ElementAttrs,
    ) -> Result<ElementId, DomError> {
        self.check(parent)?;
        let id = self.create_element(tag);
        let el = self.el_mut(id);
        el.id = attrs.id;
        if let Some(class_name) = attrs.class_name {
            el.classes = split_classes(&class_name);
        }
        el.text = attrs.text;
        self.link(parent, id, None);
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link(parent, child, None);
        Ok(())
    }

    /// Insert `child` at `index` among `parent`'s children (clamped to the end).
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        index: usize,
        child: ElementId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link(parent, child, Some(index));
        Ok(())
    }

    /// Unlink `id` from its parent without freeing it.
    pub fn detach(&mut self, id: ElementId) -> Result<(), DomError> {
        self.check(id)?;
        if self.el(id).parent.is_none() {
            return Err(DomError::NoParent(id));
        }
        self.unlink(id);
        Ok(())
    }

    /// Unlink `id` and free it together with its subtree.
    pub fn remove(&mut self, id: ElementId) -> Result<(), DomError> {
        self.check(id)?;
        self.unlink(id);
        self.free_subtree(id);
        Ok(())
    }

    /// Returns true if `id` refers to a live element.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.elements
            .get(id.idx())
            .and_then(|e| e.as_ref())
            .is_some()
            && self.generations[id.idx()] == id.generation()
    }

    /// Parent of `id`, if attached.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent
    }

    /// Children of `id`, in document order.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Iterate the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        let mut cur = self.parent(id);
        core::iter::from_fn(move || {
            let next = cur?;
            cur = self.parent(next);
            Some(next)
        })
    }

    /// Returns true if `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.is_alive(node) && (node == ancestor || self.ancestors(node).any(|a| a == ancestor))
    }

    /// Returns true if `id` is the body, the frame root, or a descendant of either.
    pub fn is_connected(&self, id: ElementId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let anchors = |e: ElementId| e == self.body || Some(e) == self.frame_root;
        anchors(id) || self.ancestors(id).any(anchors)
    }

    /// Find a connected element by its `id` attribute.
    ///
    /// The page body is searched before the content frame, each in document order.
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        let mut stack: Vec<ElementId> = Vec::new();
        if let Some(frame) = self.frame_root {
            stack.push(frame);
        }
        stack.push(self.body);
        while let Some(cur) = stack.pop() {
            let el = self.el(cur);
            if el.id.as_deref() == Some(id) {
                return Some(cur);
            }
            stack.extend(el.children.iter().rev().copied());
        }
        None
    }

    // --- attributes ---

    /// Tag name of `id`.
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|e| e.tag.as_str())
    }

    /// The `id` attribute of an element.
    pub fn element_id(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.id.as_deref()
    }

    /// Set (or clear) the `id` attribute of an element.
    pub fn set_element_id(&mut self, id: ElementId, value: Option<&str>) {
        if let Some(el) = self.get_mut(id) {
            el.id = value.map(ToOwned::to_owned);
        }
    }

    /// Text content of an element.
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.text.as_deref()
    }

    /// Set (or clear) the text content of an element.
    pub fn set_text(&mut self, id: ElementId, text: Option<&str>) {
        if let Some(el) = self.get_mut(id) {
            el.text = text.map(ToOwned::to_owned);
        }
    }

    /// Read an arbitrary attribute.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id)?.attributes.get(name).map(String::as_str)
    }

    /// Set an arbitrary attribute.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    /// Remove an arbitrary attribute.
    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attributes.remove(name);
        }
    }

    // --- classes ---

    /// Space separated class list, as `className`.
    pub fn class_name(&self, id: ElementId) -> String {
        self.get(id).map(|e| e.classes.join(" ")).unwrap_or_default()
    }

    /// Returns true if the element carries `class`.
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    /// Add each whitespace separated class in `classes` not already present.
    pub fn add_class(&mut self, id: ElementId, classes: &str) {
        if let Some(el) = self.get_mut(id) {
            for class in classes.split_whitespace() {
                if !el.classes.iter().any(|c| c == class) {
                    el.classes.push(class.to_owned());
                }
            }
        }
    }

    /// Remove `class` from the element.
    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Remove every class starting with `prefix`.
    pub fn remove_classes_with_prefix(&mut self, id: ElementId, prefix: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.retain(|c| !c.starts_with(prefix));
        }
    }

    // --- style ---

    /// Read an inline style property.
    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.get(id)?.style.get(property).map(String::as_str)
    }

    /// Read an inline style property holding a pixel length such as `"20px"`.
    pub fn style_px(&self, id: ElementId, property: &str) -> Option<f64> {
        let raw = self.style(id, property)?;
        raw.trim().trim_end_matches("px").trim().parse().ok()
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) {
        if let Some(el) = self.get_mut(id) {
            el.style.insert(property.to_owned(), value.to_owned());
        }
    }

    /// Set an inline style property to a pixel length.
    pub fn set_style_px(&mut self, id: ElementId, property: &str, px: f64) {
        self.set_style(id, property, &format!("{px}px"));
    }

    /// Clear an inline style property.
    pub fn remove_style(&mut self, id: ElementId, property: &str) {
        if let Some(el) = self.get_mut(id) {
            el.style.remove(property);
        }
    }

    // --- measurement ---

    /// Assign the rendered size of an element, as computed by the host layout.
    pub fn set_size(&mut self, id: ElementId, size: Size) {
        if let Some(el) = self.get_mut(id) {
            el.size = Some(size);
        }
    }

    /// Rendered width, as `offsetWidth`.
    ///
    /// Elements without an explicit size are as wide as their widest child.
    /// Detached elements and elements under `display: none` measure `0`.
    pub fn offset_width(&self, id: ElementId) -> f64 {
        if !self.is_connected(id) {
            return 0.0;
        }
        let hidden = self.el(id).is_display_none()
            || self.ancestors(id).any(|a| self.el(a).is_display_none());
        if hidden {
            return 0.0;
        }
        self.intrinsic_width(id)
    }

    /// Returns true if the element is connected and neither it nor an ancestor is `display: none`.
    pub fn is_rendered(&self, id: ElementId) -> bool {
        self.is_connected(id)
            && !self.el(id).is_display_none()
            && !self.ancestors(id).any(|a| self.el(a).is_display_none())
    }

    // --- internals ---

    fn intrinsic_width(&self, id: ElementId) -> f64 {
        let el = self.el(id);
        if el.is_display_none() {
            return 0.0;
        }
        if let Some(size) = el.size {
            return size.width;
        }
        el.children
            .iter()
            .map(|c| self.intrinsic_width(*c))
            .fold(0.0, f64::max)
    }

    fn check(&self, id: ElementId) -> Result<(), DomError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(DomError::Stale(id))
        }
    }

    fn check_insert(&self, parent: ElementId, child: ElementId) -> Result<(), DomError> {
        self.check(parent)?;
        self.check(child)?;
        if self.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        Ok(())
    }

    fn get(&self, id: ElementId) -> Option<&Element> {
        if !self.is_alive(id) {
            return None;
        }
        self.elements[id.idx()].as_ref()
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        if !self.is_alive(id) {
            return None;
        }
        self.elements[id.idx()].as_mut()
    }

    fn el(&self, id: ElementId) -> &Element {
        self.elements[id.idx()].as_ref().expect("dangling ElementId")
    }

    fn el_mut(&mut self, id: ElementId) -> &mut Element {
        self.elements[id.idx()]
            .as_mut()
            .expect("dangling ElementId")
    }

    fn link(&mut self, parent: ElementId, child: ElementId, index: Option<usize>) {
        let p = self.el_mut(parent);
        match index {
            Some(i) if i < p.children.len() => p.children.insert(i, child),
            _ => p.children.push(child),
        }
        self.el_mut(child).parent = Some(parent);
    }

    fn unlink(&mut self, id: ElementId) {
        if let Some(parent) = self.el(id).parent {
            self.el_mut(parent).children.retain(|c| *c != id);
            self.el_mut(id).parent = None;
        }
    }

    fn free_subtree(&mut self, id: ElementId) {
        let children = core::mem::take(&mut self.el_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        if self.frame_root == Some(id) {
            self.frame_root = None;
        }
        self.elements[id.idx()] = None;
        self.free_list.push(id.idx());
    }
}

fn split_classes(class_name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for class in class_name.split_whitespace() {
        if !out.iter().any(|c| c == class) {
            out.push(class.to_owned());
        }
    }
    out
}
