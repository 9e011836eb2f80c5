// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live-instance list, bulk destruction, and garbage collection.

use tracing::{debug, warn};
use understory_dom::ElementId;

use crate::context::WidgetContext;
use crate::instance::Wid;

/// Tracked instances in creation order.
///
/// Instances created with `storeRef: false` are live but not listed here.
#[derive(Clone, Debug, Default)]
pub struct InstanceSet {
    order: Vec<Wid>,
}

impl InstanceSet {
    /// Number of tracked instances.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Oldest tracked instance.
    pub fn first(&self) -> Option<Wid> {
        self.order.first().copied()
    }

    /// Tracked instances, oldest first.
    pub fn as_slice(&self) -> &[Wid] {
        &self.order
    }

    /// Iterate tracked instances, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Wid> + '_ {
        self.order.iter().copied()
    }

    /// Returns true if `wid` is tracked.
    pub fn contains(&self, wid: Wid) -> bool {
        self.order.contains(&wid)
    }

    pub(crate) fn push(&mut self, wid: Wid) {
        debug_assert!(!self.contains(wid), "wid {wid} tracked twice");
        self.order.push(wid);
    }

    pub(crate) fn remove(&mut self, wid: Wid) -> bool {
        match self.order.iter().position(|w| *w == wid) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl WidgetContext {
    /// Destroy every tracked instance. Returns how many instances were destroyed, nested
    /// untracked ones included.
    ///
    /// Destruction always takes the front of the list: a destroy may remove other entries (a
    /// parent destroying its children), so the list is re-read after every step. If the front
    /// entry survives its own destroy the loop stops and a warning is logged.
    pub fn destroy_all(&mut self) -> usize {
        let before = self.slots.len();
        while let Some(front) = self.instances.first() {
            self.destroy(front);
            if self.instances.first() == Some(front) {
                break;
            }
        }
        if !self.instances.is_empty() {
            warn!(
                remaining = self.instances.len(),
                "destroy_all could not destroy every widget"
            );
        }
        let destroyed = before.saturating_sub(self.slots.len());
        debug!(destroyed, "destroyed all widgets");
        destroyed
    }

    /// Destroy every tracked instance whose panel is no longer connected to the page body or the
    /// content frame. Returns the collected instances.
    pub fn garbage_collection(&mut self) -> Vec<Wid> {
        let mut collected = Vec::new();
        let mut i = 0;
        while let Some(wid) = self.instances.as_slice().get(i).copied() {
            let detached = self
                .slots
                .get(&wid)
                .and_then(|inst| inst.panel_div)
                .is_some_and(|panel| !self.doc.is_connected(panel));
            if !detached {
                i += 1;
                continue;
            }
            if self.destroy(wid) {
                collected.push(wid);
            }
            // The list shrank under the cursor unless the destroy failed.
            if self.instances.as_slice().get(i) == Some(&wid) {
                i += 1;
            }
        }
        if !collected.is_empty() {
            debug!(collected = collected.len(), "garbage collected widgets");
        }
        collected
    }

    /// Page-lifecycle signal: a content frame finished loading (or was unloaded).
    ///
    /// Installs `frame_root` as the content-frame root and collects widgets left behind in the
    /// previous frame.
    pub fn frame_reloaded(&mut self, frame_root: Option<ElementId>) -> Vec<Wid> {
        self.doc.set_frame_root(frame_root);
        self.garbage_collection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attach::RootRef;
    use crate::options::WidgetOptions;
    use crate::test_support::{LogCapture, Probe, probe_context};
    use crate::widget::{Widget, WidgetDefinition};

    #[test]
    fn destroy_all_empties_the_set() {
        let mut cx = probe_context();
        for _ in 0..3 {
            cx.append(Probe::NAME, RootRef::Default, &WidgetOptions::new())
                .unwrap();
        }
        let _pending = cx.get(Probe::NAME, &WidgetOptions::new()).unwrap();
        assert_eq!(cx.destroy_all(), 4);
        assert!(cx.instances().is_empty());
        assert_eq!(cx.bus().listener_count("ng"), 0);
        assert!(cx.document().children(cx.document().body()).is_empty());
    }

    #[test]
    fn destroy_all_handles_nested_removal() {
        let mut cx = probe_context();
        let nested = WidgetOptions::new().extra("nested", serde_json::json!(true));
        cx.append(Probe::NAME, RootRef::Default, &nested).unwrap();
        cx.append(Probe::NAME, RootRef::Default, &nested).unwrap();
        assert_eq!(cx.instances().len(), 4);
        assert_eq!(cx.destroy_all(), 4);
        assert!(cx.instances().is_empty());
        assert_eq!(cx.live_count(), 0);
    }

    #[derive(Default)]
    struct Reentrant;
    impl Widget for Reentrant {
        fn on_destroy(&mut self, cx: &mut WidgetContext, _wid: Wid) {
            // Bulk destruction from inside a destroy cannot make progress on this entry.
            cx.destroy_all();
        }
    }

    #[test]
    fn destroy_all_terminates_on_reentrant_destroy() {
        let mut cx = probe_context();
        cx.registry_mut()
            .register("Reentrant", WidgetDefinition::of::<Reentrant>())
            .unwrap();
        let a = cx.get("Reentrant", &WidgetOptions::new()).unwrap();
        let b = cx.get(Probe::NAME, &WidgetOptions::new()).unwrap();
        assert_eq!(cx.destroy_all(), 2);
        assert!(!cx.is_live(a) && !cx.is_live(b));
        assert!(cx.instances().is_empty());
    }

    const LEFTOVER_WARNING: &str = "destroy_all could not destroy every widget";

    #[test]
    fn destroy_all_warns_once_when_the_front_survives() {
        let mut cx = probe_context();
        cx.registry_mut()
            .register("Reentrant", WidgetDefinition::of::<Reentrant>())
            .unwrap();
        let a = cx.get("Reentrant", &WidgetOptions::new()).unwrap();
        let b = cx.get(Probe::NAME, &WidgetOptions::new()).unwrap();

        // The nested call finds `a` mid-destroy at the front; the outer call still finishes.
        let logs = LogCapture::default();
        let destroyed = logs.run(|| cx.destroy_all());
        assert_eq!(destroyed, 2);
        assert_eq!(logs.count(LEFTOVER_WARNING), 1);
        assert!(!cx.is_live(a) && !cx.is_live(b));
    }

    #[test]
    fn destroy_all_is_quiet_when_it_empties_the_set() {
        let mut cx = probe_context();
        for _ in 0..3 {
            cx.append(Probe::NAME, RootRef::Default, &WidgetOptions::new())
                .unwrap();
        }
        let logs = LogCapture::default();
        assert_eq!(logs.run(|| cx.destroy_all()), 3);
        assert_eq!(logs.count(LEFTOVER_WARNING), 0);
        assert_eq!(logs.count("WARN"), 0);
    }

    #[test]
    fn garbage_collection_takes_detached_panels_only() {
        let mut cx = probe_context();
        let keep = cx
            .append(Probe::NAME, RootRef::Default, &WidgetOptions::new())
            .unwrap();
        let lost = cx
            .append(Probe::NAME, RootRef::Default, &WidgetOptions::new())
            .unwrap();
        let also_lost = cx
            .append(Probe::NAME, RootRef::Default, &WidgetOptions::new())
            .unwrap();
        let never_appended = cx.get(Probe::NAME, &WidgetOptions::new()).unwrap();

        for wid in [lost, also_lost] {
            let panel = cx.instance(wid).unwrap().panel_div().unwrap();
            cx.document_mut().detach(panel).unwrap();
        }
        let collected = cx.garbage_collection();
        assert_eq!(collected, vec![lost, also_lost]);
        assert_eq!(cx.instances().as_slice(), &[keep, never_appended]);
        assert!(cx.garbage_collection().is_empty());
    }

    #[test]
    fn frame_reload_collects_widgets_of_the_old_frame() {
        let mut cx = probe_context();
        let old = cx.document_mut().create_frame_root();
        cx.document_mut().set_frame_root(Some(old));
        let in_frame = cx
            .append(Probe::NAME, RootRef::Default, &WidgetOptions::new())
            .unwrap();
        let body = cx.document().body();
        let on_page = cx
            .append(Probe::NAME, body, &WidgetOptions::new())
            .unwrap();

        let fresh = cx.document_mut().create_frame_root();
        let collected = cx.frame_reloaded(Some(fresh));
        assert_eq!(collected, vec![in_frame]);
        assert!(cx.is_live(on_page));
        assert_eq!(cx.document().frame_root(), Some(fresh));
    }
}
