use atelier_event_bus::{EventBus, EventBusError};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
struct Ping(u64);

#[derive(Clone, Debug, PartialEq)]
struct Job(&'static str);

#[tokio::test]
async fn broadcast_fans_out_to_all_subscribers() {
    let bus = EventBus::new();
    let mut rx1 = bus.subscribe::<Ping>().unwrap();
    let mut rx2 = bus.subscribe::<Ping>().unwrap();

    let observed = bus.publish(Ping(7)).unwrap();
    assert_eq!(observed, 2);

    assert_eq!(rx1.recv().await.unwrap().0, 7);
    assert_eq!(rx2.recv().await.unwrap().0, 7);
}

#[test]
fn publish_without_subscribers_is_dropped() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(Ping(1)).unwrap(), 0);
    assert_eq!(bus.channel_count(), 0);
}

#[tokio::test]
async fn queue_delivers_to_single_worker() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe_queue::<Job>(8).unwrap();

    bus.publish(Job("first")).unwrap();
    bus.publish(Job("second")).unwrap();

    assert_eq!(*rx.recv().await.unwrap(), Job("first"));
    assert_eq!(*rx.recv().await.unwrap(), Job("second"));
}

#[test]
fn queue_receiver_taken_once() {
    let bus = EventBus::new();
    let _rx = bus.subscribe_queue::<Job>(8).unwrap();

    let err = bus.subscribe_queue::<Job>(8).unwrap_err();
    assert!(matches!(err, EventBusError::ReceiverTaken { .. }));
}

#[test]
fn kind_conflict_is_rejected() {
    let bus = EventBus::new();
    let _rx = bus.subscribe::<Ping>().unwrap();

    let err = bus.subscribe_queue::<Ping>(8).unwrap_err();
    assert!(matches!(err, EventBusError::KindMismatch { .. }));
}

#[test]
fn zero_capacity_is_invalid() {
    let bus = EventBus::new();
    let err = bus.subscribe_with_capacity::<Ping>(0).unwrap_err();
    assert!(matches!(err, EventBusError::InvalidCapacity { .. }));
}

#[tokio::test]
async fn publish_arc_avoids_cloning() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<Ping>().unwrap();

    let shared = Arc::new(Ping(99));
    bus.publish_arc(Arc::clone(&shared)).unwrap();

    let received = rx.recv().await.unwrap();
    assert_eq!(*received, *shared);
}
