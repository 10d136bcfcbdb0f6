// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publish and long-poll entry points
//!
//! The event log and the wait registry share one lock. A publish appends and
//! hands off to the oldest waiter inside that lock; a get selects, marks, and
//! (if nothing is pending) enrolls inside it. Neither path can observe the
//! other half-done, which rules out double delivery and lost wakeups.

use super::log::{EventLog, GroupId};
use super::registry::{WaitRegistry, WaiterId};
use crate::clock::{Clock, SystemClock};
use crate::config::BrokerConfig;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

/// Snapshot of broker occupancy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BrokerStats {
    /// Keys currently holding events (stale ones included until swept)
    pub keys: usize,
    pub events: usize,
    /// Consumers parked across all keys, not counting ones whose caller has gone
    pub waiters: usize,
}

struct State<T, C: Clock> {
    log: EventLog<T, C>,
    waits: WaitRegistry<T>,
}

struct Shared<T, C: Clock> {
    state: Mutex<State<T, C>>,
    config: BrokerConfig,
}

impl<T, C: Clock> Shared<T, C> {
    fn lock(&self) -> MutexGuard<'_, State<T, C>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deadline path: resolve the waiter with an empty batch unless a publish got there first
    fn expire_waiter(&self, key: &str, id: WaiterId) {
        let Some(entry) = self.lock().waits.remove(key, id) else {
            return;
        };
        tracing::debug!(key, waiter = id.0, group = %entry.group, "wait timed out");
        let _ = entry.resolve(Vec::new());
    }
}

/// In-process event broker
///
/// Producers [`publish`](Broker::publish) data under a key. Consumers call
/// [`blocking_get`](Broker::blocking_get) with a group id and receive every
/// live event on that key their group has not yet seen, waiting for the next
/// publish when there is none.
///
/// Cloning yields another handle to the same broker.
pub struct Broker<T, C: Clock = SystemClock> {
    shared: Arc<Shared<T, C>>,
}

impl<T> Broker<T, SystemClock>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    pub fn with_config(config: BrokerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<T> Default for Broker<T, SystemClock>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Broker<T, C>
where
    T: Clone + Send + 'static,
    C: Clock,
{
    pub fn with_clock(config: BrokerConfig, clock: C) -> Self {
        let state = State {
            log: EventLog::new(config.event_ttl, clock),
            waits: WaitRegistry::new(),
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                config,
            }),
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.shared.config
    }

    /// Append `data` to `key` and wake at most one waiter
    ///
    /// The woken waiter receives everything its group has not consumed on
    /// `key`, not only this event. Other waiters stay parked until a later
    /// publish or their own timeout.
    pub fn publish(&self, key: &str, data: T) {
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        let sequence = state.log.append(key, data);
        tracing::debug!(key, sequence, "published event");

        while let Some(waiter) = state.waits.take_first(key) {
            if waiter.is_abandoned() {
                tracing::trace!(key, waiter = waiter.id.0, "skipping abandoned waiter");
                continue;
            }

            let (sequences, batch) = state.log.claim(key, &waiter.group);

            let id = waiter.id;
            let group = waiter.group.clone();
            match waiter.resolve(batch) {
                Ok(()) => {
                    tracing::debug!(
                        key,
                        waiter = id.0,
                        %group,
                        count = sequences.len(),
                        "woke waiter"
                    );
                    break;
                }
                Err(_) => {
                    // Consumer vanished between the check and the send
                    state.log.release(key, &sequences, &group);
                }
            }
        }
    }

    /// Return `group`'s unconsumed events on `key`, waiting for a publish if there are none
    ///
    /// Resolves immediately when events are pending. Otherwise the caller is
    /// parked behind any earlier waiters on `key` and resumes with the batch a
    /// publish hands it, or with an empty batch once the wait timeout elapses.
    /// Must be polled inside a tokio runtime.
    pub async fn blocking_get(&self, key: &str, group: impl Into<GroupId>) -> Vec<T> {
        let group = group.into();
        tracing::debug!(key, %group, "blocking get");

        let completion = {
            let mut state = self.shared.lock();
            let batch = state.log.take_unconsumed(key, &group);
            if !batch.is_empty() {
                tracing::debug!(key, %group, count = batch.len(), "returning unconsumed events");
                return batch;
            }

            let (tx, rx) = oneshot::channel();
            let shared = Arc::clone(&self.shared);
            let timeout = self.shared.config.wait_timeout;
            let owned_key = key.to_string();
            let id = state.waits.enroll(key, group.clone(), tx, move |id| {
                tokio::spawn(async move {
                    tokio::time::sleep(timeout).await;
                    shared.expire_waiter(&owned_key, id);
                })
            });
            tracing::debug!(
                key,
                %group,
                waiter = id.0,
                ?timeout,
                "no events available, waiting"
            );
            rx
        };

        completion.await.unwrap_or_default()
    }

    /// Non-waiting variant of [`blocking_get`](Self::blocking_get)
    pub fn try_get(&self, key: &str, group: impl Into<GroupId>) -> Vec<T> {
        let group = group.into();
        self.shared.lock().log.take_unconsumed(key, &group)
    }

    /// Consumers currently parked on `key`
    pub fn pending_waiters(&self, key: &str) -> usize {
        let mut state = self.shared.lock();
        state.waits.prune_abandoned();
        state.waits.pending(key)
    }

    /// Events stored on `key`, including expired ones not yet swept
    pub fn event_count(&self, key: &str) -> usize {
        self.shared.lock().log.len(key)
    }

    pub fn stats(&self) -> BrokerStats {
        let mut state = self.shared.lock();
        state.waits.prune_abandoned();
        BrokerStats {
            keys: state.log.key_count(),
            events: state.log.total_events(),
            waiters: state.waits.total_pending(),
        }
    }
}

impl<T, C: Clock> Clone for Broker<T, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
