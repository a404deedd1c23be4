//! Scale session behaviour over the in-memory transport.
//!
//! Time is paused: the runtime jumps the clock forward whenever every task
//! is idle, so the 150 ms flush fires deterministically.

use std::sync::Arc;
use std::time::Duration;

use tarazu::events::{self, DeviceStatus, Event};
use tarazu::label::{LabelField, LabelStore};
use tarazu::scale::ScaleSession;
use tarazu::transport::{MemoryPeer, MemoryProvider};
use tokio::sync::broadcast;

const PORT: &str = "mem://scale";

struct Rig {
    session: ScaleSession,
    store: Arc<LabelStore>,
    peer: MemoryPeer,
    rx: broadcast::Receiver<Event>,
}

async fn connected() -> Rig {
    let provider = MemoryProvider::new();
    let peer = provider.add_port(PORT);
    let store = Arc::new(LabelStore::default());
    let events = events::channel();
    let rx = events.subscribe();
    let session = ScaleSession::new(Arc::new(provider), store.clone(), events);
    session.connect(PORT).await.unwrap();
    Rig {
        session,
        store,
        peer,
        rx,
    }
}

/// Let the read task catch up without reaching the flush deadline.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn weights(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::WeightUpdated { sample } => Some(sample.text.clone()),
            _ => None,
        })
        .collect()
}

fn lines(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Line { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// LINE HANDLING
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_terminated_line_updates_weight() {
    let mut rig = connected().await;
    rig.peer.send("ST,GS,+  1.200kg\r\n");
    settle().await;

    assert_eq!(rig.store.snapshot().await.weight, "1.2");
    let events = drain(&mut rig.rx);
    assert_eq!(lines(&events), vec!["ST,GS,+  1.200kg"]);
    assert_eq!(weights(&events), vec!["1.2"]);
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_line_split_across_reads() {
    let mut rig = connected().await;
    rig.peer.send("12");
    settle().await;
    rig.peer.send("3.4\n");
    settle().await;

    let events = drain(&mut rig.rx);
    assert_eq!(lines(&events), vec!["123.4"]);
    assert_eq!(rig.store.snapshot().await.weight, "123.4");
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unterminated_value_flushes_once() {
    let mut rig = connected().await;
    rig.peer.send("12.5");
    tokio::time::sleep(Duration::from_millis(149)).await;
    assert!(weights(&drain(&mut rig.rx)).is_empty());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let events = drain(&mut rig.rx);
    assert_eq!(weights(&events), vec!["12.5"]);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BufferFlush { text } if text == "12.5")));

    // The buffer was emptied by the flush: the next line stands alone.
    rig.peer.send("7\n");
    settle().await;
    let events = drain(&mut rig.rx);
    assert_eq!(lines(&events), vec!["7"]);
    assert_eq!(rig.store.snapshot().await.weight, "7");
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_new_bytes_restart_the_quiet_period() {
    let mut rig = connected().await;
    rig.peer.send("1");
    tokio::time::sleep(Duration::from_millis(100)).await;
    rig.peer.send("5");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(weights(&drain(&mut rig.rx)).is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(weights(&drain(&mut rig.rx)), vec!["15"]);
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_weight_not_reannounced() {
    let mut rig = connected().await;
    rig.peer.send("ST,GS,+  1.200kg\r\nST,GS,+  1.200kg\r\n1.2\r\n");
    settle().await;
    rig.peer.send("ST,GS,+  1.350kg\r\n");
    settle().await;

    let events = drain(&mut rig.rx);
    assert_eq!(lines(&events).len(), 4);
    assert_eq!(weights(&events), vec!["1.2", "1.35"]);
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_manual_weight_edit_is_overwritten_by_next_reading() {
    let mut rig = connected().await;
    rig.peer.send("500\n");
    settle().await;
    rig.store.set(LabelField::Weight, "480").await;
    rig.peer.send("500\n");
    settle().await;

    assert_eq!(rig.store.snapshot().await.weight, "500");
    assert_eq!(weights(&drain(&mut rig.rx)), vec!["500", "500"]);
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_line_without_weight_is_a_miss() {
    let mut rig = connected().await;
    rig.peer.send("US,GS,  0.000kg\r\nOVERLOAD\r\n");
    settle().await;

    let events = drain(&mut rig.rx);
    let misses = events
        .iter()
        .filter(|e| matches!(e, Event::ExtractionMiss { .. }))
        .count();
    assert_eq!(misses, 2);
    assert!(rig.store.snapshot().await.weight.is_empty());
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_multibyte_character_split_across_reads() {
    let mut rig = connected().await;
    rig.peer.send(b"\xc3");
    settle().await;
    rig.peer.send(b"\xa9 7\n");
    settle().await;

    assert_eq!(lines(&drain(&mut rig.rx)), vec!["é 7"]);
    rig.session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_runaway_output_is_capped() {
    let mut rig = connected().await;
    rig.peer.send("x".repeat(1200));
    settle().await;

    let events = drain(&mut rig.rx);
    let dropped: usize = events
        .iter()
        .filter_map(|e| match e {
            Event::BufferOverflow { dropped } => Some(*dropped),
            _ => None,
        })
        .sum();
    assert_eq!(dropped, 200);
    rig.session.disconnect().await.unwrap();
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_disconnect_is_quiet_and_final() {
    let mut rig = connected().await;
    rig.peer.send("12.5");
    settle().await;

    rig.peer.fail_close("port vanished");
    rig.session.disconnect().await.unwrap();
    assert_eq!(rig.session.status(), DeviceStatus::Disconnected);
    assert!(rig.peer.is_closed());

    let events = drain(&mut rig.rx);
    assert!(events.iter().any(
        |e| matches!(e, Event::Error { message, .. } if message.contains("port vanished"))
    ));
    // The pending "12.5" was dropped with the read task, not flushed.
    assert!(weights(&events).is_empty());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(drain(&mut rig.rx).is_empty());
    assert!(rig.store.snapshot().await.weight.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_read_fault_moves_to_error() {
    let mut rig = connected().await;
    let mut status = rig.session.subscribe_status();
    rig.peer.fail_read("cable pulled");

    status
        .wait_for(|s| *s == DeviceStatus::Error)
        .await
        .unwrap();
    assert!(rig.peer.is_closed());
    let events = drain(&mut rig.rx);
    assert!(events.iter().any(
        |e| matches!(e, Event::Error { message, .. } if message == "Read fault: cable pulled")
    ));
    let info = rig.session.info().await;
    assert_eq!(info.status, DeviceStatus::Error);
    assert_eq!(info.endpoint, None);

    rig.session.disconnect().await.unwrap();
    assert_eq!(rig.session.status(), DeviceStatus::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_end_of_stream_disconnects() {
    let Rig {
        session, peer, ..
    } = connected().await;
    let mut status = session.subscribe_status();
    assert_eq!(session.info().await.endpoint.as_deref(), Some(PORT));
    drop(peer);

    status
        .wait_for(|s| *s == DeviceStatus::Disconnected)
        .await
        .unwrap();
    let info = session.info().await;
    assert_eq!(info.status, DeviceStatus::Disconnected);
    assert_eq!(info.endpoint, None);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_after_fault() {
    let provider = MemoryProvider::new();
    let first = provider.add_port("mem://a");
    let second = provider.add_port("mem://b");
    let store = Arc::new(LabelStore::default());
    let session = ScaleSession::new(Arc::new(provider), store.clone(), events::channel());

    session.connect("mem://a").await.unwrap();
    let mut status = session.subscribe_status();
    first.fail_read("gone");
    status
        .wait_for(|s| *s == DeviceStatus::Error)
        .await
        .unwrap();

    session.connect("mem://b").await.unwrap();
    second.send("42\n");
    settle().await;
    assert_eq!(store.snapshot().await.weight, "42");
    session.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_status_events_in_order() {
    let provider = MemoryProvider::new();
    let _peer = provider.add_port(PORT);
    let events = events::channel();
    let mut rx = events.subscribe();
    let session = ScaleSession::new(Arc::new(provider), Arc::new(LabelStore::default()), events);

    session.connect(PORT).await.unwrap();
    session.disconnect().await.unwrap();

    let statuses: Vec<DeviceStatus> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::StatusChanged { status, .. } => Some(status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            DeviceStatus::Connecting,
            DeviceStatus::Connected,
            DeviceStatus::Disconnected
        ]
    );
}
