// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of consumers parked on a key
//!
//! Each key keeps a FIFO queue of waiters. A waiter leaves the queue exactly
//! once: taken from the head by a publish, or removed by its own deadline.
//! Both paths run under the broker lock, so whichever removes the entry owns
//! its completion.

use super::log::GroupId;
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Registry-unique handle for a parked consumer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaiterId(pub u64);

/// Single-use channel that resumes a parked consumer
pub type Completion<T> = oneshot::Sender<Vec<T>>;

/// A consumer waiting for events on a key
pub struct WaitEntry<T> {
    pub id: WaiterId,
    pub group: GroupId,
    completion: Completion<T>,
    deadline: JoinHandle<()>,
}

impl<T> WaitEntry<T> {
    /// True when the consumer's receiving side has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.completion.is_closed()
    }

    /// Hand `batch` to the consumer
    ///
    /// Gives the batch back if the consumer is gone.
    pub fn resolve(self, batch: Vec<T>) -> Result<(), Vec<T>> {
        self.completion.send(batch)
    }

    fn cancel_deadline(&self) {
        self.deadline.abort();
    }
}

/// Per-key wait queues
pub struct WaitRegistry<T> {
    queues: HashMap<String, VecDeque<WaitEntry<T>>>,
    next_id: u64,
}

impl<T> WaitRegistry<T> {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
            next_id: 1,
        }
    }

    /// Park a consumer at the tail of `key`'s queue
    ///
    /// `arm` receives the new waiter's id and must start the deadline task
    /// that later calls [`remove`](Self::remove) for it.
    pub fn enroll(
        &mut self,
        key: &str,
        group: GroupId,
        completion: Completion<T>,
        arm: impl FnOnce(WaiterId) -> JoinHandle<()>,
    ) -> WaiterId {
        let id = WaiterId(self.next_id);
        self.next_id += 1;

        let entry = WaitEntry {
            id,
            group,
            completion,
            deadline: arm(id),
        };
        self.queues.entry(key.to_string()).or_default().push_back(entry);
        id
    }

    /// Remove the oldest waiter on `key` and cancel its deadline
    pub fn take_first(&mut self, key: &str) -> Option<WaitEntry<T>> {
        let queue = self.queues.get_mut(key)?;
        let entry = queue.pop_front();
        if queue.is_empty() {
            self.queues.remove(key);
        }

        let entry = entry?;
        entry.cancel_deadline();
        Some(entry)
    }

    /// Remove a specific waiter wherever it sits in `key`'s queue
    ///
    /// Returns `None` if the waiter was already taken.
    pub fn remove(&mut self, key: &str, id: WaiterId) -> Option<WaitEntry<T>> {
        let queue = self.queues.get_mut(key)?;
        let index = queue.iter().position(|e| e.id == id)?;
        let entry = queue.remove(index);
        if queue.is_empty() {
            self.queues.remove(key);
        }
        entry
    }

    /// Drop waiters whose consumer has gone away, cancelling their deadlines
    ///
    /// Returns the number of entries removed.
    pub fn prune_abandoned(&mut self) -> usize {
        let mut pruned = 0;
        self.queues.retain(|_, queue| {
            queue.retain(|entry| {
                if entry.is_abandoned() {
                    entry.cancel_deadline();
                    pruned += 1;
                    false
                } else {
                    true
                }
            });
            !queue.is_empty()
        });
        if pruned > 0 {
            tracing::trace!(pruned, "pruned abandoned waiters");
        }
        pruned
    }

    /// Number of waiters parked on `key`
    pub fn pending(&self, key: &str) -> usize {
        self.queues.get(key).map_or(0, VecDeque::len)
    }

    pub fn total_pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    pub fn key_count(&self) -> usize {
        self.queues.len()
    }
}

impl<T> Default for WaitRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
