//! Integration tests for live update fan-out

use std::time::Duration;

use mnwatch_core::broadcast::KEEPALIVE_COMMENT;
use mnwatch_core::{BroadcastError, Broadcaster, Frame, HealthTag, NodeDescriptor, NodeKind, NodeRecord};

async fn settle<F: Fn() -> bool>(done: F) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

fn record(ordinal: u32) -> NodeRecord {
    let mut record = NodeRecord::new(&NodeDescriptor::new(NodeKind::Regular, ordinal, "10.0.1.1"));
    record.health = HealthTag::Syncing;
    record
}

#[tokio::test]
async fn test_event_reaches_every_subscriber() {
    let broadcaster = Broadcaster::default();
    let mut first = broadcaster.subscribe().unwrap();
    let mut second = broadcaster.subscribe().unwrap();
    assert_ne!(first.id, second.id);

    assert_eq!(broadcaster.publish("nodeUpdate", &record(3)), 2);

    for subscription in [&mut first, &mut second] {
        assert_eq!(subscription.frames.recv().await.unwrap().to_sse(), ":\n\n");
        let sse = subscription.frames.recv().await.unwrap().to_sse();
        assert!(sse.starts_with("event: nodeUpdate\ndata: {"));
        assert!(sse.contains(r#""name":"masternode-3""#));
        assert!(sse.contains(r#""health":"syncing""#));
        assert!(sse.ends_with("\n\n"));
    }
}

#[tokio::test]
async fn test_slow_subscriber_is_dropped() {
    let broadcaster = Broadcaster::new(10, Duration::from_secs(30), 2);
    let _slow = broadcaster.subscribe().unwrap();
    let mut fast = broadcaster.subscribe().unwrap();
    fast.frames.recv().await;

    assert_eq!(broadcaster.publish("nodeUpdate", &record(1)), 2);
    fast.frames.recv().await;
    // The slow channel now holds two unread frames
    assert_eq!(broadcaster.publish("nodeUpdate", &record(2)), 1);
    assert_eq!(broadcaster.subscriber_count(), 1);

    let frame = fast.frames.recv().await.unwrap();
    assert!(matches!(frame, Frame::Event { ref data, .. } if data.contains("masternode-2")));
}

#[tokio::test]
async fn test_disconnect_deregisters() {
    let broadcaster = Broadcaster::default();
    let subscription = broadcaster.subscribe().unwrap();
    let _other = broadcaster.subscribe().unwrap();
    assert_eq!(broadcaster.subscriber_count(), 2);

    drop(subscription);
    settle(|| broadcaster.subscriber_count() == 1).await;
    assert_eq!(broadcaster.subscriber_count(), 1);
}

#[tokio::test]
async fn test_capacity_is_enforced() {
    let broadcaster = Broadcaster::new(2, Duration::from_secs(30), 8);
    let first = broadcaster.subscribe().unwrap();
    let _second = broadcaster.subscribe().unwrap();

    assert!(matches!(
        broadcaster.subscribe(),
        Err(BroadcastError::CapacityReached { limit: 2 })
    ));

    assert!(broadcaster.unsubscribe(first.id));
    assert!(broadcaster.subscribe().is_ok());
}

#[tokio::test]
async fn test_shutdown_ends_streams() {
    let broadcaster = Broadcaster::default();
    let mut subscription = broadcaster.subscribe().unwrap();

    broadcaster.shutdown();
    assert!(broadcaster.is_closed());
    assert_eq!(broadcaster.subscriber_count(), 0);
    assert!(matches!(broadcaster.subscribe(), Err(BroadcastError::Closed)));

    assert_eq!(subscription.frames.recv().await, Some(Frame::Comment(String::new())));
    assert_eq!(subscription.frames.recv().await, None);
    assert_eq!(broadcaster.publish("nodeUpdate", &record(1)), 0);
}

#[tokio::test(start_paused = true)]
async fn test_keepalive_reaches_idle_subscribers() {
    let broadcaster = Broadcaster::new(10, Duration::from_secs(30), 8);
    let mut subscription = broadcaster.subscribe().unwrap();
    subscription.frames.recv().await;

    let frame = subscription.frames.recv().await.unwrap();
    assert_eq!(frame, Frame::Comment(KEEPALIVE_COMMENT.to_string()));
    assert_eq!(frame.to_sse(), ":keepalive\n\n");
    broadcaster.shutdown();
}

#[tokio::test]
async fn test_keepalive_skips_departed_subscribers() {
    let broadcaster = Broadcaster::default();
    let mut staying = broadcaster.subscribe().unwrap();
    let leaving = broadcaster.subscribe().unwrap();
    drop(leaving);

    assert_eq!(broadcaster.keepalive(), 1);
    assert_eq!(broadcaster.subscriber_count(), 1);

    staying.frames.recv().await;
    assert_eq!(
        staying.frames.recv().await,
        Some(Frame::Comment(KEEPALIVE_COMMENT.to_string()))
    );
}
