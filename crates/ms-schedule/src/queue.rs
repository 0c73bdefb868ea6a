//! `EventQueue`: an ordered multiset of items keyed by [`Event`].
//!
//! # Why a sequence number
//!
//! Several entries may share one event key.  Each push is tagged with a
//! monotonically increasing sequence number, so entries with equal keys pop
//! in insertion (FIFO) order and iteration is fully deterministic.
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log N) push and pop-first.  The queues in this kernel
//! hold one entry per scheduled message (or per sub-scale), so N is small.

use std::collections::BTreeMap;

use ms_core::Event;

/// Items ordered by `(Event, insertion order)`.
pub struct EventQueue<T> {
    inner: BTreeMap<(Event, u64), T>,
    seq:   u64,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { inner: BTreeMap::new(), seq: 0 }
    }

    /// Insert `item` under `event`.  No uniqueness constraint.
    pub fn push(&mut self, event: Event, item: T) {
        self.inner.insert((event, self.seq), item);
        self.seq = self.seq.wrapping_add(1);
    }

    /// Remove and return the ordered-first entry.
    pub fn pop(&mut self) -> Option<(Event, T)> {
        self.inner.pop_first().map(|((event, _), item)| (event, item))
    }

    /// The ordered-first entry without removing it.
    pub fn peek(&self) -> Option<(&Event, &T)> {
        self.inner.first_key_value().map(|((event, _), item)| (event, item))
    }

    /// The ordered-first event, or `None` if the queue is empty.
    pub fn peek_event(&self) -> Option<Event> {
        self.inner.keys().next().map(|(event, _)| *event)
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Event, &T)> + '_ {
        self.inner.iter().map(|((event, _), item)| (event, item))
    }

    /// Event keys in order.
    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.keys().map(|(event, _)| *event)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
