//! Long-poll specs
//!
//! Parked consumers are woken by publishes in FIFO order, one per publish,
//! or released empty when the wait timeout elapses.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn parked_get_resolves_promptly_on_publish() {
    let broker = Broker::new();
    let start = Instant::now();
    let waiting = spawn_get(&broker, "k", "g1");
    parked(&broker, "k", 1).await;

    broker.publish("k", json!("x"));

    assert_eq!(waiting.await.unwrap(), vec![json!("x")]);
    assert!(start.elapsed() < WAIT_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn get_without_publish_times_out_empty() {
    let broker: Broker<Value> = Broker::new();
    let start = Instant::now();

    assert!(broker.blocking_get("k", "g1").await.is_empty());

    let elapsed = start.elapsed();
    assert!(elapsed >= WAIT_TIMEOUT, "returned after {elapsed:?}");
    assert!(elapsed < WAIT_TIMEOUT + Duration::from_secs(1));
    assert_eq!(broker.stats().waiters, 0);
}

#[tokio::test(start_paused = true)]
async fn first_parked_group_is_woken_first() {
    let broker = Broker::new();
    let g1 = spawn_get(&broker, "k", "g1");
    parked(&broker, "k", 1).await;
    let g2 = spawn_get(&broker, "k", "g2");
    parked(&broker, "k", 2).await;

    broker.publish("k", json!("e"));

    assert_eq!(g1.await.unwrap(), vec![json!("e")]);
    assert!(!g2.is_finished());
    assert_eq!(broker.pending_waiters("k"), 1);
}

#[tokio::test(start_paused = true)]
async fn each_publish_wakes_the_next_waiter() {
    let broker = Broker::new();
    let g1 = spawn_get(&broker, "k", "g1");
    parked(&broker, "k", 1).await;
    let g2 = spawn_get(&broker, "k", "g2");
    parked(&broker, "k", 2).await;

    broker.publish("k", json!("a"));
    broker.publish("k", json!("b"));

    assert_eq!(g1.await.unwrap(), vec![json!("a")]);
    assert_eq!(g2.await.unwrap(), vec![json!("a"), json!("b")]);
    assert_eq!(broker.try_get("k", "g1"), vec![json!("b")]);
}

#[tokio::test(start_paused = true)]
async fn parked_groups_left_behind_time_out() {
    let broker = Broker::new();
    let g1 = spawn_get(&broker, "k", "g1");
    parked(&broker, "k", 1).await;
    let g2 = spawn_get(&broker, "k", "g2");
    parked(&broker, "k", 2).await;

    broker.publish("k", json!("e"));

    assert_eq!(g1.await.unwrap(), vec![json!("e")]);
    assert!(g2.await.unwrap().is_empty());
    assert_eq!(broker.blocking_get("k", "g2").await, vec![json!("e")]);
}

#[tokio::test(start_paused = true)]
async fn disconnected_consumer_does_not_swallow_events() {
    let broker = Broker::new();
    let gone = spawn_get(&broker, "k", "g1");
    parked(&broker, "k", 1).await;
    gone.abort();
    let _ = gone.await;

    broker.publish("k", json!("a"));

    assert_eq!(broker.blocking_get("k", "g1").await, vec![json!("a")]);
}
