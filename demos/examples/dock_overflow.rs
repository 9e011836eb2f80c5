// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Docking, overflow, and restore.
//!
//! Docks five fixed-width panels into a narrow viewport, prints where each one sits and which were
//! moved to the overflow menu, then restores one from the menu.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example dock_overflow`

use kurbo::Size;
use understory_dom::ElementAttrs;
use understory_widgets::{
    BoxSelector, Chrome, RootRef, Wid, Widget, WidgetContext, WidgetDefinition, WidgetError,
    WidgetOptions,
};

#[derive(Default)]
struct Chat;

impl Widget for Chat {
    fn append(&mut self, cx: &mut WidgetContext, chrome: &Chrome) -> Result<(), WidgetError> {
        let doc = cx.document_mut();
        let log = doc.add("div", chrome.body, ElementAttrs::class("chat-log"))?;
        doc.set_size(log, Size::new(180.0, 120.0));
        Ok(())
    }
}

fn print_dock(cx: &WidgetContext) {
    for entry in cx.dock().entries() {
        let title = cx.instance(entry.wid).and_then(|i| i.title()).unwrap_or("?");
        println!("  {title:<8} right={:>5}px width={:>5}px", entry.right, entry.offset_width);
    }
    let evicted: Vec<&str> = cx
        .dock()
        .overflowed()
        .iter()
        .filter_map(|w| cx.instance(*w).and_then(|i| i.title()))
        .collect();
    println!("  overflow: {evicted:?}");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut cx = WidgetContext::default();
    cx.document_mut().set_viewport(Size::new(900.0, 700.0));
    cx.registry_mut()
        .register("Chat", WidgetDefinition::of::<Chat>())
        .unwrap();

    let mut wids: Vec<Wid> = Vec::new();
    for i in 1..=5 {
        let options = WidgetOptions::new().docked(true).title(format!("chat {i}"));
        wids.push(cx.append("Chat", RootRef::Default, &options).unwrap());
        println!("after docking chat {i}:");
        print_dock(&cx);
    }

    if let Some(menu) = cx.dock().selector() {
        let items = cx.widget::<BoxSelector>(menu).map(BoxSelector::len).unwrap_or(0);
        println!("menu lists {items} widget(s)");
    }

    println!("closing chat 4, then restoring chat 1 from the menu:");
    cx.destroy(wids[3]);
    cx.restore_docked(wids[0]);
    print_dock(&cx);

    println!("destroyed {} widget(s)", cx.destroy_all());
}
