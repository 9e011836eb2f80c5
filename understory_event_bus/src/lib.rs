// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_event_bus --heading-base-level=0

//! Understory Event Bus: a single-threaded, `no_std` publish/subscribe hub with undoable subscriptions.
//!
//! ## Overview
//!
//! An [`EventBus`](crate::bus::EventBus) holds named channels; each channel holds an ordered table of
//! listeners keyed by event type. Listeners are shared closures (`Rc<dyn Fn(&E)>`) over a payload type `E`
//! chosen by the embedder.
//!
//! ## Transactions
//!
//! The bus can record the subscriptions a piece of code makes. Open a
//! [`Transaction`](crate::bus::Transaction) with [`EventBus::begin`](crate::bus::EventBus::begin), run the
//! code, and [`commit`](crate::bus::Transaction::commit) to obtain a [`ChangeSet`](crate::types::ChangeSet).
//! Handing that set to [`EventBus::revert`](crate::bus::EventBus::revert) later restores every touched
//! channel to its earlier state: added listeners are removed and removed listeners come back with their
//! original id and position.
//!
//! The recording window is tied to the guard's lifetime, so it closes on every exit path.
//! Windows nest; a change is attributed to the innermost open window only.
//!
//! Recording is synchronous. A subscription made after the bracketed call returns (for example from a
//! deferred callback) is not part of the set and will not be reverted.
//!
//! ## Minimal example
//!
//! ```
//! use understory_event_bus::bus::EventBus;
//!
//! let bus: EventBus<u32> = EventBus::new();
//! let _existing = bus.on("ng", "DONE", |_| {});
//! let before = bus.listener_table("ng");
//!
//! let txn = bus.begin();
//! let _ = bus.on("ng", "PLAYING", |_| {});
//! let _ = bus.on("game", "STEP", |_| {});
//! let changes = txn.commit();
//! assert_eq!(changes.len(), 2);
//!
//! bus.revert(changes);
//! assert_eq!(bus.listener_table("ng"), before);
//! assert_eq!(bus.listener_count("game"), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod bus;
pub mod types;
