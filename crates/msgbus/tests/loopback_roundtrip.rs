// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

//! Send/receive behaviour over the loopback transport.

mod common;

use common::{random_payload, random_topic, RecordingTransport};
use msgbus::{code, Client, Config, LoopbackTransport, Received};

fn client(name: &str) -> Client {
    Client::open(
        LoopbackTransport::new(),
        Config::default()
            .with_segment_name(name)
            .with_max_message_size(4096)
            .with_max_queue_size(64),
    )
    .expect("open")
}

#[test]
fn test_random_round_trips_preserve_topic_and_payload() {
    let client = client("random");
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for _ in 0..500 {
        let topic = random_topic(&mut rng, 64);
        let payload = random_payload(&mut rng, 1024);

        assert!(client.send(&topic, &payload).unwrap());
        let msg = client
            .receive(64, 1024)
            .unwrap()
            .into_message()
            .expect("message");

        assert_eq!(msg.topic(), topic);
        assert_eq!(msg.payload(), payload.as_slice());
        assert_eq!(msg.len(), payload.len());
    }
}

#[test]
fn test_empty_queue_reports_no_message() {
    let client = client("empty");
    assert_eq!(client.receive(16, 16).unwrap(), Received::NoMessage);

    assert!(client.send("t", &[1]).unwrap());
    assert!(client.receive(16, 16).unwrap().is_message());
    assert_eq!(client.receive(16, 16).unwrap(), Received::NoMessage);
}

#[test]
fn test_unbounded_capacity_is_a_limit_not_an_allocation() {
    let client = client("unbounded");
    assert_eq!(
        client.receive(256, usize::MAX).unwrap(),
        Received::NoMessage
    );

    assert!(client.send("alerts", &[1, 2, 3]).unwrap());
    let msg = client
        .receive(256, usize::MAX)
        .unwrap()
        .into_message()
        .expect("message");
    assert_eq!(msg.topic(), "alerts");
    assert_eq!(msg.payload(), &[1, 2, 3]);
    assert_eq!(msg.len(), 3);

    assert_eq!(
        client.receive(usize::MAX, usize::MAX).unwrap(),
        Received::NoMessage
    );
}

#[test]
fn test_large_capacity_polls_stay_cheap() {
    let client = client("cheap-polls");
    let started = std::time::Instant::now();
    for _ in 0..1000 {
        assert_eq!(
            client.receive(1 << 28, 1 << 28).unwrap(),
            Received::NoMessage
        );
    }
    // Each poll is independent of the capacity it was given.
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[test]
fn test_payload_never_carries_stale_bytes() {
    let client = client("stale");

    assert!(client.send("t", &[0xAA; 200]).unwrap());
    let first = client.receive(8, 512).unwrap().into_message().unwrap();
    assert_eq!(first.len(), 200);

    assert!(client.send("t", &[0x01, 0x02]).unwrap());
    let second = client.receive(8, 512).unwrap().into_message().unwrap();
    assert_eq!(second.payload(), &[0x01, 0x02]);
    assert_eq!(second.len(), second.payload().len());
}

#[test]
fn test_payload_length_never_exceeds_capacity() {
    let client = client("bounded");
    let mut rng = fastrand::Rng::with_seed(42);

    for _ in 0..200 {
        let payload = random_payload(&mut rng, 300);
        let capacity = rng.usize(0..=300);
        assert!(client.send("cap", &payload).unwrap());

        match client.receive(16, capacity).unwrap() {
            Received::Message(msg) => {
                assert!(msg.len() <= capacity);
                assert_eq!(msg.payload(), payload.as_slice());
            }
            Received::Error(e) => {
                assert!(payload.len() > capacity);
                assert_eq!(e.code(), code::PAYLOAD_OVERFLOW);
                // Drain with enough room.
                assert!(client.receive(16, 300).unwrap().is_message());
            }
            Received::NoMessage => panic!("message was queued"),
        }
    }
}

#[test]
fn test_oversize_is_error_not_no_message() {
    let client = client("oversize");
    assert!(client.send("a-long-topic", &[1, 2, 3, 4, 5]).unwrap());

    let Received::Error(e) = client.receive(4, 1024).unwrap() else {
        panic!("expected receive error");
    };
    assert_eq!(e.code(), code::TOPIC_OVERFLOW);
    assert!(e.is_overflow());

    let Received::Error(e) = client.receive(64, 4).unwrap() else {
        panic!("expected receive error");
    };
    assert_eq!(e.code(), code::PAYLOAD_OVERFLOW);

    // The message is still there for a caller with room.
    let msg = client.receive(64, 5).unwrap().into_message().unwrap();
    assert_eq!(msg.topic(), "a-long-topic");
}

#[test]
fn test_zero_capacity_receive() {
    let client = client("zero");
    assert!(client.send("t", &[]).unwrap());

    let Received::Error(e) = client.receive(0, 0).unwrap() else {
        panic!("topic cannot fit zero capacity");
    };
    assert_eq!(e.code(), code::TOPIC_OVERFLOW);

    let msg = client.receive(1, 0).unwrap().into_message().unwrap();
    assert!(msg.is_empty());
}

#[test]
fn test_full_queue_rejects_send() {
    let client = Client::open(
        LoopbackTransport::new(),
        Config::default()
            .with_segment_name("full")
            .with_max_queue_size(3),
    )
    .unwrap();

    for i in 0..3u8 {
        assert!(client.send("t", &[i]).unwrap());
    }
    assert!(!client.send("t", &[3]).unwrap());

    assert!(client.receive(8, 8).unwrap().is_message());
    assert!(client.send("t", &[4]).unwrap());
}

#[test]
fn test_frame_too_large_rejects_send() {
    let client = Client::open(
        LoopbackTransport::new(),
        Config::default()
            .with_segment_name("frame")
            .with_max_message_size(32),
    )
    .unwrap();

    assert!(!client.send("topic", &[0u8; 64]).unwrap());
    assert_eq!(client.receive(16, 128).unwrap(), Received::NoMessage);
}

#[test]
fn test_clients_on_one_segment_exchange_messages() {
    let transport = LoopbackTransport::new();
    let config = Config::default().with_segment_name("pubsub");
    let publisher = Client::open(transport.clone(), config.clone()).unwrap();
    let subscriber = Client::open(transport.clone(), config).unwrap();

    assert!(publisher.send("sensors/lidar", b"scan-0").unwrap());
    let msg = subscriber.receive(64, 64).unwrap().into_message().unwrap();
    assert_eq!(msg.topic(), "sensors/lidar");
    assert_eq!(msg.payload(), b"scan-0");

    publisher.release();
    assert!(subscriber.send("sensors/lidar", b"scan-1").unwrap());
    assert!(subscriber.receive(64, 64).unwrap().is_message());
}

#[test]
fn test_teardown_surfaces_session_closed() {
    let transport = RecordingTransport::new();
    let client = Client::open(transport.clone(), Config::default().with_segment_name("gone"))
        .unwrap();
    assert!(client.send("t", &[1]).unwrap());

    assert!(transport.loopback().teardown("gone"));

    assert!(!client.send("t", &[2]).unwrap());
    let Received::Error(e) = client.receive(8, 8).unwrap() else {
        panic!("expected session closed");
    };
    assert_eq!(e.code(), code::SESSION_CLOSED);

    client.release();
    assert_eq!(transport.calls.close(), 1);
}

#[test]
fn test_connect_uses_global_loopback() {
    let a = Client::connect(Config::default().with_segment_name("global-connect")).unwrap();
    let b = Client::connect(Config::default().with_segment_name("global-connect")).unwrap();
    assert!(a.send("hello", b"world").unwrap());
    let msg = b.receive(16, 16).unwrap().into_message().unwrap();
    assert_eq!(msg.payload(), b"world");
}
