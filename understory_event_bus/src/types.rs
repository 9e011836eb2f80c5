// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the bus: listener handles and recorded change sets.
//!
//! ## Overview
//!
//! A [`ChangeSet`] is what a [`Transaction`](crate::bus::Transaction) hands back when it commits.
//! It keeps, per channel, the chronological log of listeners added and removed while the
//! transaction was the innermost one open, which is exactly what
//! [`EventBus::revert`](crate::bus::EventBus::revert) needs to undo them.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

/// A subscribed callback.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Identifier of one subscription.
///
/// Ids are unique for the lifetime of an [`EventBus`](crate::bus::EventBus) and are preserved when a
/// removed listener is restored by [`revert`](crate::bus::EventBus::revert).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ListenerId(pub(crate) u64);

/// A listener as captured in a [`ChangeSet`].
pub struct ListenerRecord<E> {
    /// Event type the listener is subscribed to.
    pub event: String,
    /// Subscription id.
    pub id: ListenerId,
    pub(crate) listener: Listener<E>,
    // Index in the channel table at the time of removal; unused for additions.
    pub(crate) position: usize,
}

impl<E> Clone for ListenerRecord<E> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            id: self.id,
            listener: self.listener.clone(),
            position: self.position,
        }
    }
}

impl<E> core::fmt::Debug for ListenerRecord<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// One recorded mutation of a channel's listener table.
pub enum Change<E> {
    /// A listener was subscribed.
    Added(ListenerRecord<E>),
    /// A listener was unsubscribed.
    Removed(ListenerRecord<E>),
}

impl<E> Clone for Change<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Added(r) => Self::Added(r.clone()),
            Self::Removed(r) => Self::Removed(r.clone()),
        }
    }
}

impl<E> core::fmt::Debug for Change<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Added(r) => f.debug_tuple("Added").field(r).finish(),
            Self::Removed(r) => f.debug_tuple("Removed").field(r).finish(),
        }
    }
}

/// Listener changes captured by a committed transaction, keyed by channel.
pub struct ChangeSet<E> {
    pub(crate) channels: BTreeMap<String, Vec<Change<E>>>,
}

impl<E> Default for ChangeSet<E> {
    fn default() -> Self {
        Self {
            channels: BTreeMap::new(),
        }
    }
}

impl<E> core::fmt::Debug for ChangeSet<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.channels.iter()).finish()
    }
}

impl<E> ChangeSet<E> {
    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.channels.values().all(Vec::is_empty)
    }

    /// Total number of recorded changes across channels.
    pub fn len(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    /// Channels with at least one recorded change.
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels
            .iter()
            .filter(|(_, log)| !log.is_empty())
            .map(|(name, _)| name.as_str())
    }

    /// Chronological change log for `channel`.
    pub fn changes(&self, channel: &str) -> &[Change<E>] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Listeners added on `channel`.
    pub fn added(&self, channel: &str) -> Vec<&ListenerRecord<E>> {
        self.changes(channel)
            .iter()
            .filter_map(|c| match c {
                Change::Added(r) => Some(r),
                Change::Removed(_) => None,
            })
            .collect()
    }

    /// Listeners removed from `channel`.
    pub fn removed(&self, channel: &str) -> Vec<&ListenerRecord<E>> {
        self.changes(channel)
            .iter()
            .filter_map(|c| match c {
                Change::Removed(r) => Some(r),
                Change::Added(_) => None,
            })
            .collect()
    }

    pub(crate) fn record_added(&mut self, channel: &str, record: ListenerRecord<E>) {
        self.log_mut(channel).push(Change::Added(record));
    }

    pub(crate) fn record_removed(&mut self, channel: &str, record: ListenerRecord<E>) {
        let log = self.log_mut(channel);
        // Added and removed inside the same window: nothing to undo.
        if let Some(i) = log
            .iter()
            .position(|c| matches!(c, Change::Added(r) if r.id == record.id))
        {
            log.remove(i);
            return;
        }
        log.push(Change::Removed(record));
    }

    fn log_mut(&mut self, channel: &str) -> &mut Vec<Change<E>> {
        self.channels.entry(String::from(channel)).or_default()
    }
}
