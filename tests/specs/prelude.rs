//! Shared helpers for broker specs

pub use evq_core::{Broker, BrokerConfig, GroupId};
pub use serde_json::{json, Value};
pub use std::time::Duration;
pub use tokio::task::JoinHandle;
pub use tokio::time::Instant;

pub const WAIT_TIMEOUT: Duration = evq_core::DEFAULT_WAIT_TIMEOUT;
pub const EVENT_TTL: Duration = evq_core::DEFAULT_EVENT_TTL;

/// Start a blocking get on a background task
pub fn spawn_get(broker: &Broker<Value>, key: &str, group: &str) -> JoinHandle<Vec<Value>> {
    let broker = broker.clone();
    let key = key.to_string();
    let group = GroupId::new(group);
    tokio::spawn(async move { broker.blocking_get(&key, group).await })
}

/// Yield until `count` consumers are parked on `key`
pub async fn parked(broker: &Broker<Value>, key: &str, count: usize) {
    while broker.pending_waiters(key) < count {
        tokio::task::yield_now().await;
    }
}
