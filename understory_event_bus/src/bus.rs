// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bus implementation.
//!
//! ## Overview
//!
//! Channels map event types to ordered listener tables.
//! The bus is single-threaded and uses interior mutability so listeners may subscribe
//! or unsubscribe while an emission is in flight; emission iterates a snapshot.
//!
//! ## Recording
//!
//! [`EventBus::begin`] opens a [`Transaction`]. While it is the innermost open transaction,
//! every `on`/`off` on any channel (including channels created during the window) is logged
//! into it. [`Transaction::commit`] closes the window and returns the [`ChangeSet`].
//! Dropping the guard without committing also closes the window, so a panic or an early
//! return inside the bracketed call cannot leave recording enabled.
//!
//! Transactions nest: opening one while another is open pushes a new window and the outer
//! one stops seeing changes until the inner one closes.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::types::{Change, ChangeSet, Listener, ListenerId, ListenerRecord};

struct Entry<E> {
    id: ListenerId,
    event: String,
    listener: Listener<E>,
}

struct State<E> {
    channels: BTreeMap<String, Vec<Entry<E>>>,
    next_id: u64,
    recording: Vec<ChangeSet<E>>,
}

/// Publish/subscribe hub with named channels.
///
/// ## Usage
///
/// - Subscribe with [`EventBus::on`]; keep the returned [`ListenerId`] to unsubscribe with [`EventBus::off`].
/// - Deliver with [`EventBus::emit`].
/// - Bracket a call with [`EventBus::begin`] / [`Transaction::commit`] to learn which listeners it
///   added or removed, and later undo them with [`EventBus::revert`].
pub struct EventBus<E> {
    state: RefCell<State<E>>,
}

impl<E> core::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let st = self.state.borrow();
        f.debug_struct("EventBus")
            .field("channels", &st.channels.len())
            .field("next_id", &st.next_id)
            .field("recording_depth", &st.recording.len())
            .finish_non_exhaustive()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    /// Create a bus with no channels.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                channels: BTreeMap::new(),
                next_id: 1,
                recording: Vec::new(),
            }),
        }
    }

    /// Create a bus with the given channels declared up front.
    pub fn with_channels<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bus = Self::new();
        {
            let mut st = bus.state.borrow_mut();
            for name in names {
                st.channels.entry(name.into()).or_default();
            }
        }
        bus
    }

    /// Subscribe `listener` to `event` on `channel`.
    pub fn on(&self, channel: &str, event: &str, listener: impl Fn(&E) + 'static) -> ListenerId {
        self.on_rc(channel, event, Rc::new(listener))
    }

    /// Subscribe an already shared listener.
    pub fn on_rc(&self, channel: &str, event: &str, listener: Listener<E>) -> ListenerId {
        let mut st = self.state.borrow_mut();
        let id = ListenerId(st.next_id);
        st.next_id += 1;
        let State {
            channels,
            recording,
            ..
        } = &mut *st;
        let table = channels.entry(String::from(channel)).or_default();
        table.push(Entry {
            id,
            event: String::from(event),
            listener: listener.clone(),
        });
        if let Some(set) = recording.last_mut() {
            set.record_added(
                channel,
                ListenerRecord {
                    event: String::from(event),
                    id,
                    listener,
                    position: table.len() - 1,
                },
            );
        }
        id
    }

    /// Unsubscribe listener `id` from `channel`.
    ///
    /// Returns false if no such subscription exists.
    pub fn off(&self, channel: &str, id: ListenerId) -> bool {
        let mut st = self.state.borrow_mut();
        let State {
            channels,
            recording,
            ..
        } = &mut *st;
        let Some(table) = channels.get_mut(channel) else {
            return false;
        };
        let Some(position) = table.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = table.remove(position);
        if let Some(set) = recording.last_mut() {
            set.record_removed(
                channel,
                ListenerRecord {
                    event: entry.event,
                    id,
                    listener: entry.listener,
                    position,
                },
            );
        }
        true
    }

    /// Unsubscribe every listener of `event` on `channel`, returning how many were removed.
    pub fn off_event(&self, channel: &str, event: &str) -> usize {
        let ids: Vec<ListenerId> = {
            let st = self.state.borrow();
            st.channels
                .get(channel)
                .map(|t| t.iter().filter(|e| e.event == event).map(|e| e.id).collect())
                .unwrap_or_default()
        };
        ids.into_iter().filter(|id| self.off(channel, *id)).count()
    }

    /// Deliver `payload` to every listener of `event` on `channel`, in subscription order.
    ///
    /// Returns the number of listeners called.
    pub fn emit(&self, channel: &str, event: &str, payload: &E) -> usize {
        let targets: Vec<Listener<E>> = {
            let st = self.state.borrow();
            let Some(table) = st.channels.get(channel) else {
                return 0;
            };
            table
                .iter()
                .filter(|e| e.event == event)
                .map(|e| e.listener.clone())
                .collect()
        };
        for listener in &targets {
            listener(payload);
        }
        targets.len()
    }

    /// Ordered `(event, id)` snapshot of a channel's listener table.
    pub fn listener_table(&self, channel: &str) -> Vec<(String, ListenerId)> {
        let st = self.state.borrow();
        st.channels
            .get(channel)
            .map(|t| t.iter().map(|e| (e.event.clone(), e.id)).collect())
            .unwrap_or_default()
    }

    /// Number of listeners subscribed on `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.state
            .borrow()
            .channels
            .get(channel)
            .map_or(0, Vec::len)
    }

    /// Names of all known channels.
    pub fn channel_names(&self) -> Vec<String> {
        self.state.borrow().channels.keys().cloned().collect()
    }

    /// Returns true while any transaction is open.
    pub fn is_recording(&self) -> bool {
        !self.state.borrow().recording.is_empty()
    }

    /// Open a recording transaction.
    pub fn begin(&self) -> Transaction<'_, E> {
        let mut st = self.state.borrow_mut();
        st.recording.push(ChangeSet::default());
        Transaction {
            bus: self,
            depth: st.recording.len(),
            open: true,
        }
    }

    /// Undo the changes in `changes`: remove what was added, restore what was removed.
    ///
    /// Each channel's log is replayed backwards. Restored listeners keep their id and return to
    /// their former position. Reverting is not recorded into any open transaction.
    pub fn revert(&self, changes: ChangeSet<E>) {
        let mut st = self.state.borrow_mut();
        for (channel, log) in changes.channels {
            let table = st.channels.entry(channel).or_default();
            for change in log.into_iter().rev() {
                match change {
                    Change::Added(r) => table.retain(|e| e.id != r.id),
                    Change::Removed(r) => {
                        if table.iter().any(|e| e.id == r.id) {
                            continue;
                        }
                        let at = r.position.min(table.len());
                        table.insert(
                            at,
                            Entry {
                                id: r.id,
                                event: r.event,
                                listener: r.listener,
                            },
                        );
                    }
                }
            }
        }
    }

    fn close(&self, depth: usize) -> ChangeSet<E> {
        let mut st = self.state.borrow_mut();
        if st.recording.len() < depth {
            return ChangeSet::default();
        }
        // Inner windows that were leaked close with this one.
        st.recording.truncate(depth);
        st.recording.pop().unwrap_or_default()
    }
}

/// Guard for an open recording window. See [`EventBus::begin`].
#[must_use = "dropping a transaction discards its recorded changes"]
pub struct Transaction<'a, E> {
    bus: &'a EventBus<E>,
    depth: usize,
    open: bool,
}

impl<E> core::fmt::Debug for Transaction<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("depth", &self.depth)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl<E> Transaction<'_, E> {
    /// Close the window and return what it recorded.
    pub fn commit(mut self) -> ChangeSet<E> {
        self.open = false;
        self.bus.close(self.depth)
    }
}

impl<E> Drop for Transaction<'_, E> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.bus.close(self.depth);
        }
    }
}
