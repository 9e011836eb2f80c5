// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener undo and garbage collection.
//!
//! A widget subscribes on two channels and drops a listener it did not add. Destroying it puts the
//! bus back exactly as it was. Then a content frame is replaced and the widgets left in the old
//! frame are collected.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example listener_undo`

use std::rc::Rc;

use serde_json::json;
use understory_dom::Document;
use understory_event_bus::bus::EventBus;
use understory_widgets::{
    Bus, HookKind, RootRef, WIDGETS_CHANNEL, Widget, WidgetContext, WidgetDefinition,
    WidgetOptions,
};

#[derive(Default)]
struct Timer;

impl Widget for Timer {
    fn listeners(&mut self, bus: &Bus) {
        let _ = bus.on("ng", "PLAYING", |_| println!("  timer: start"));
        let _ = bus.on("game", "STEP", |v| println!("  timer: step {v}"));
        bus.off_event("ng", "PAUSED");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let bus: Rc<Bus> = Rc::new(EventBus::new());
    let _ = bus.on("ng", "PAUSED", |_| println!("  page: paused"));
    let _ = bus.on(WIDGETS_CHANNEL, "destroyed", |v| println!("  page: widget gone {v}"));
    let before = bus.listener_table("ng");

    let mut cx = WidgetContext::new(Document::default(), Rc::clone(&bus));
    cx.registry_mut()
        .register("Timer", WidgetDefinition::of::<Timer>().with_title("Timer"))
        .unwrap();

    let options = WidgetOptions::from_value(&json!({ "id": 1, "idPrefix": "timer_" })).unwrap();
    let timer = cx.append("Timer", RootRef::Default, &options).unwrap();
    cx.on_hook(timer, HookKind::Destroyed, |e| println!("  hook: {:?} destroyed", e.id));

    println!("with the timer:");
    bus.emit("ng", "PLAYING", &json!(null));
    bus.emit("ng", "PAUSED", &json!(null));
    bus.emit("game", "STEP", &json!(3));

    cx.destroy(timer);
    println!("after destroy, ng table restored: {}", bus.listener_table("ng") == before);
    bus.emit("ng", "PAUSED", &json!(null));

    let old = cx.document_mut().create_frame_root();
    cx.document_mut().set_frame_root(Some(old));
    for _ in 0..3 {
        cx.append("Timer", RootRef::Default, &WidgetOptions::new())
            .unwrap();
    }
    let fresh = cx.document_mut().create_frame_root();
    let collected = cx.frame_reloaded(Some(fresh));
    println!("frame reloaded, collected {} widget(s)", collected.len());
}
