// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Size;
use understory_dom::ElementAttrs;
use understory_event_bus::bus::EventBus;
use understory_widgets::{
    Bus, Chrome, RootRef, Widget, WidgetContext, WidgetDefinition, WidgetError, WidgetOptions,
};

#[derive(Default)]
struct Tile {
    width: f64,
}

impl Widget for Tile {
    fn init(&mut self, options: &WidgetOptions) -> Result<(), WidgetError> {
        self.width = options
            .extra
            .get("width")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(80.0);
        Ok(())
    }

    fn listeners(&mut self, bus: &Bus) {
        for event in ["PLAYING", "PAUSED", "DONE"] {
            let _ = bus.on("ng", event, |_| {});
        }
        let _ = bus.on("game", "STEP", |_| {});
    }

    fn append(&mut self, cx: &mut WidgetContext, chrome: &Chrome) -> Result<(), WidgetError> {
        let doc = cx.document_mut();
        let content = doc.add("div", chrome.body, ElementAttrs::default())?;
        doc.set_size(content, Size::new(self.width, 40.0));
        Ok(())
    }
}

fn context(viewport: f64) -> WidgetContext {
    let mut cx = WidgetContext::default();
    cx.document_mut().set_viewport(Size::new(viewport, 800.0));
    cx.registry_mut()
        .register("Tile", WidgetDefinition::of::<Tile>().with_title("Tile"))
        .unwrap();
    cx
}

fn bench_bus(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus");
    for &n in &[16_usize, 256] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("record_revert_{n}"), |b| {
            b.iter_batched(
                || {
                    let bus: EventBus<u32> = EventBus::new();
                    for i in 0..n {
                        let _ = bus.on("ng", if i % 2 == 0 { "a" } else { "b" }, |_| {});
                    }
                    bus
                },
                |bus| {
                    let txn = bus.begin();
                    for _ in 0..n {
                        let _ = bus.on("ng", "c", |_| {});
                    }
                    bus.off_event("ng", "a");
                    let changes = txn.commit();
                    bus.revert(changes);
                    black_box(bus.listener_count("ng"))
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.bench_function("append_destroy", |b| {
        let mut cx = context(4000.0);
        let opts = WidgetOptions::new();
        b.iter(|| {
            let wid = cx.append("Tile", RootRef::Default, &opts).unwrap();
            black_box(cx.destroy(wid))
        });
    });
    for &n in &[32_usize, 256] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("destroy_all_{n}"), |b| {
            b.iter_batched(
                || {
                    let mut cx = context(4000.0);
                    for _ in 0..n {
                        cx.append("Tile", RootRef::Default, &WidgetOptions::new())
                            .unwrap();
                    }
                    cx
                },
                |mut cx| black_box(cx.destroy_all()),
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("garbage_collection_{n}"), |b| {
            b.iter_batched(
                || {
                    let mut cx = context(4000.0);
                    for i in 0..n {
                        let wid = cx
                            .append("Tile", RootRef::Default, &WidgetOptions::new())
                            .unwrap();
                        if i % 3 == 0 {
                            let panel = cx.instance(wid).unwrap().panel_div().unwrap();
                            cx.document_mut().detach(panel).unwrap();
                        }
                    }
                    cx
                },
                |mut cx| black_box(cx.garbage_collection().len()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_dock(c: &mut Criterion) {
    let mut group = c.benchmark_group("dock");
    for &n in &[8_usize, 64] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("dock_overflow_{n}"), |b| {
            b.iter_batched(
                || context(1200.0),
                |mut cx| {
                    let opts = WidgetOptions::new().docked(true);
                    for _ in 0..n {
                        cx.append("Tile", RootRef::Default, &opts).unwrap();
                    }
                    black_box(cx.dock().overflowed().len())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bus, bench_lifecycle, bench_dock);
criterion_main!(benches);
