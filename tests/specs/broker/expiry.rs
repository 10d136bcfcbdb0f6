//! Expiry specs
//!
//! Events older than the TTL are never delivered, consumed or not.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn expired_event_is_not_returned() {
    let broker = Broker::new();
    broker.publish("k", json!("old"));
    tokio::time::advance(EVENT_TTL).await;

    let start = Instant::now();
    assert!(broker.blocking_get("k", "g1").await.is_empty());
    assert!(start.elapsed() >= WAIT_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn event_just_inside_ttl_is_returned() {
    let broker = Broker::new();
    broker.publish("k", json!("fresh"));
    tokio::time::advance(EVENT_TTL - Duration::from_secs(1)).await;

    assert_eq!(broker.blocking_get("k", "g1").await, vec![json!("fresh")]);
}

#[tokio::test(start_paused = true)]
async fn only_expired_events_are_dropped() {
    let broker = Broker::new();
    broker.publish("k", json!("old"));
    tokio::time::advance(Duration::from_secs(90)).await;
    broker.publish("k", json!("new"));
    tokio::time::advance(Duration::from_secs(30)).await;

    assert_eq!(broker.blocking_get("k", "g1").await, vec![json!("new")]);
}

#[tokio::test(start_paused = true)]
async fn untouched_keys_keep_stale_events_until_accessed() {
    let broker = Broker::new();
    broker.publish("idle", json!(1));
    tokio::time::advance(EVENT_TTL * 2).await;

    assert_eq!(broker.event_count("idle"), 1);
    assert!(broker.try_get("idle", "g1").is_empty());
    assert_eq!(broker.event_count("idle"), 0);
}

#[tokio::test(start_paused = true)]
async fn custom_ttl_is_honored() {
    let config = BrokerConfig::default().with_event_ttl(Duration::from_secs(10));
    let broker = Broker::with_config(config);
    broker.publish("k", json!("a"));
    tokio::time::advance(Duration::from_secs(10)).await;

    assert!(broker.try_get("k", "g1").is_empty());
}
