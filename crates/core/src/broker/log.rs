// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-key event log with consumer-group tracking and lazy expiry
//!
//! Each key holds its events in publish order. An event remembers which
//! groups have already received it, so every group sees it at most once.
//! Expired events are swept only when their key is touched.

use crate::clock::Clock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Name of a consumer group
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A published data item
#[derive(Debug)]
pub struct Event<T> {
    /// Log-wide publish order
    pub sequence: u64,
    pub data: T,
    pub timestamp: Instant,
    consumed_by: HashSet<GroupId>,
}

impl<T> Event<T> {
    pub fn is_consumed_by(&self, group: &GroupId) -> bool {
        self.consumed_by.contains(group)
    }
}

/// Event storage for every key of a broker
pub struct EventLog<T, C: Clock> {
    streams: HashMap<String, Vec<Event<T>>>,
    ttl: Duration,
    clock: C,
    sequence: u64,
}

impl<T, C: Clock> EventLog<T, C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            streams: HashMap::new(),
            ttl,
            clock,
            sequence: 0,
        }
    }

    /// Append an event to `key`, returning its sequence number
    pub fn append(&mut self, key: &str, data: T) -> u64 {
        self.sweep(key);
        self.sequence += 1;

        let event = Event {
            sequence: self.sequence,
            data,
            timestamp: self.clock.now(),
            consumed_by: HashSet::new(),
        };
        self.streams.entry(key.to_string()).or_default().push(event);

        self.sequence
    }

    /// Drop every event on `key` that has reached the TTL
    ///
    /// Returns the number of events removed. A key left with no events is
    /// forgotten entirely.
    pub fn sweep(&mut self, key: &str) -> usize {
        let Some(events) = self.streams.get_mut(key) else {
            return 0;
        };

        let clock = &self.clock;
        let ttl = self.ttl;
        let before = events.len();
        events.retain(|e| clock.elapsed_since(e.timestamp) < ttl);
        let expired = before - events.len();

        if events.is_empty() {
            self.streams.remove(key);
        }
        if expired > 0 {
            tracing::trace!(key, expired, "swept expired events");
        }
        expired
    }

    /// Live events on `key` that `group` has not received, in publish order
    pub fn unconsumed_for(&mut self, key: &str, group: &GroupId) -> Vec<&Event<T>> {
        self.sweep(key);
        self.streams
            .get(key)
            .map(|events| events.iter().filter(|e| !e.is_consumed_by(group)).collect())
            .unwrap_or_default()
    }

    /// Record that `group` has received the events with the given sequence numbers
    ///
    /// `sequences` must be ascending, as produced by
    /// [`unconsumed_for`](Self::unconsumed_for).
    pub fn mark_consumed(&mut self, key: &str, sequences: &[u64], group: &GroupId) {
        self.for_each_selected(key, sequences, |event| {
            event.consumed_by.insert(group.clone());
        });
    }

    /// Undo [`mark_consumed`](Self::mark_consumed) for a hand-off that never
    /// reached its consumer
    pub fn release(&mut self, key: &str, sequences: &[u64], group: &GroupId) {
        self.for_each_selected(key, sequences, |event| {
            event.consumed_by.remove(group);
        });
    }

    /// Apply `f` to each event whose sequence is in the ascending `sequences`
    fn for_each_selected(
        &mut self,
        key: &str,
        sequences: &[u64],
        mut f: impl FnMut(&mut Event<T>),
    ) {
        let Some(events) = self.streams.get_mut(key) else {
            return;
        };
        for event in events.iter_mut() {
            if sequences.binary_search(&event.sequence).is_ok() {
                f(event);
            }
        }
    }

    /// Number of stored events on `key`, including ones awaiting a sweep
    pub fn len(&self, key: &str) -> usize {
        self.streams.get(key).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.streams.len()
    }

    pub fn total_events(&self) -> usize {
        self.streams.values().map(Vec::len).sum()
    }
}

impl<T: Clone, C: Clock> EventLog<T, C> {
    /// Select and mark `group`'s unconsumed events on `key` in one step
    pub fn take_unconsumed(&mut self, key: &str, group: &GroupId) -> Vec<T> {
        self.claim(key, group).1
    }

    /// Like [`take_unconsumed`](Self::take_unconsumed), also returning the
    /// ascending sequence numbers so the claim can be [`release`](Self::release)d
    pub fn claim(&mut self, key: &str, group: &GroupId) -> (Vec<u64>, Vec<T>) {
        self.sweep(key);
        let Some(events) = self.streams.get_mut(key) else {
            return (Vec::new(), Vec::new());
        };
        events
            .iter_mut()
            .filter(|e| !e.is_consumed_by(group))
            .map(|e| {
                e.consumed_by.insert(group.clone());
                (e.sequence, e.data.clone())
            })
            .unzip()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
