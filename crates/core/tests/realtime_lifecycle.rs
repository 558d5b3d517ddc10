//! Realtime client lifecycle tests.
//!
//! Drive the client against the scripted mock transport with tokio's clock
//! paused, so reconnect delays can be checked exactly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use storefront_core::{
    realtime::ReconnectPolicy,
    testing::MockTransport,
    ConnectionState, DisconnectReason, InboundMessage, RealtimeClient, RealtimeEvent,
};

const URL: &str = "ws://localhost:5217/ws";

fn client_with(transport: &Arc<MockTransport>) -> RealtimeClient {
    RealtimeClient::new(URL, ReconnectPolicy::default(), transport.clone())
}

/// Wait for the first event matching `pred`.
async fn wait_for(
    events: &mut broadcast::Receiver<RealtimeEvent>,
    pred: impl Fn(&RealtimeEvent) -> bool,
) -> RealtimeEvent {
    loop {
        match events.recv().await {
            Ok(event) if pred(&event) => return event,
            Ok(_) => continue,
            Err(e) => panic!("event channel failed: {}", e),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_backoff_schedule_then_give_up() {
    let transport = Arc::new(MockTransport::new());
    let client = client_with(&transport);
    let mut events = client.subscribe();

    assert!(client.connect().await.is_err());
    wait_for(&mut events, |e| *e == RealtimeEvent::GaveUp).await;

    // Initial attempt plus five reconnects
    let times = transport.connect_times().await;
    assert_eq!(times.len(), 6);

    let gaps: Vec<u128> = times
        .windows(2)
        .map(|w| (w[1] - w[0]).as_millis())
        .collect();
    assert_eq!(gaps, vec![2000, 4000, 8000, 16000, 30000]);

    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(client.disconnect_reason(), Some(DisconnectReason::GaveUp));

    // No sixth reconnect
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(transport.connect_count().await, 6);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_after_server_close_resets_attempts() {
    let transport = Arc::new(MockTransport::new());
    let mut first = transport.push_connection().await;
    let client = client_with(&transport);
    let mut events = client.subscribe();

    client.connect().await.unwrap();
    assert!(client.is_connected());

    let _second = transport.push_connection().await;
    first.close();

    let scheduled = wait_for(&mut events, |e| {
        matches!(e, RealtimeEvent::ReconnectScheduled { .. })
    })
    .await;
    assert_eq!(
        scheduled,
        RealtimeEvent::ReconnectScheduled {
            attempt: 1,
            delay: Duration::from_secs(2)
        }
    );
    assert_eq!(client.attempts(), 1);

    wait_for(&mut events, |e| *e == RealtimeEvent::Connected).await;
    assert!(client.is_connected());
    assert_eq!(client.attempts(), 0);
    assert_eq!(transport.connect_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_succeeds_after_refusals() {
    let transport = Arc::new(MockTransport::new());
    transport.push_refusal().await;
    transport.push_refusal().await;
    let _peer = transport.push_connection().await;

    let client = client_with(&transport);
    let mut events = client.subscribe();

    assert!(client.connect().await.is_err());
    wait_for(&mut events, |e| *e == RealtimeEvent::Connected).await;

    let times = transport.connect_times().await;
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(2));
    assert_eq!(times[2] - times[1], Duration::from_secs(4));
    assert_eq!(client.attempts(), 0);
}

#[tokio::test]
async fn test_listeners_receive_json_and_raw_text() {
    let transport = Arc::new(MockTransport::new());
    let peer = transport.push_connection().await;
    let client = client_with(&transport);

    let (first_tx, mut first_rx) = mpsc::unbounded_channel();
    let (second_tx, mut second_rx) = mpsc::unbounded_channel();
    client.on_message(move |msg| {
        let _ = first_tx.send(msg.clone());
    });
    client.on_message(move |msg| {
        let _ = second_tx.send(msg.clone());
    });

    client.connect().await.unwrap();
    peer.send(r#"{"type":"stock","id":3}"#);
    peer.send("Connected to WebSocket server");

    for rx in [&mut first_rx, &mut second_rx] {
        let json = rx.recv().await.unwrap();
        assert_eq!(json.as_json().unwrap()["type"], "stock");

        let text = rx.recv().await.unwrap();
        assert_eq!(
            text,
            InboundMessage::Text("Connected to WebSocket server".to_string())
        );
    }
}

#[tokio::test]
async fn test_disconnect_closes_connection_and_stops() {
    let transport = Arc::new(MockTransport::new());
    let mut peer = transport.push_connection().await;
    let client = client_with(&transport);
    let mut events = client.subscribe();

    client.connect().await.unwrap();
    client.disconnect();

    assert_eq!(peer.recv().await, None);
    assert!(!client.send("after close"));
    assert_eq!(
        client.disconnect_reason(),
        Some(DisconnectReason::ClosedByCaller)
    );
    wait_for(&mut events, |e| *e == RealtimeEvent::ClosedByCaller).await;
    assert_eq!(transport.connect_count().await, 1);
}

#[tokio::test]
async fn test_connect_replaces_existing_connection() {
    let transport = Arc::new(MockTransport::new());
    let mut first = transport.push_connection().await;
    let mut second = transport.push_connection().await;
    let client = client_with(&transport);

    client.connect().await.unwrap();
    client.connect().await.unwrap();

    // The first connection was dropped without triggering a reconnect.
    assert_eq!(first.recv().await, None);
    assert!(client.is_connected());
    assert_eq!(client.attempts(), 0);

    assert!(client.send("hi"));
    assert_eq!(second.recv().await.as_deref(), Some("hi"));
}

#[tokio::test]
async fn test_dropping_client_closes_connection() {
    let transport = Arc::new(MockTransport::new());
    let mut peer = transport.push_connection().await;
    let client = client_with(&transport);
    client.connect().await.unwrap();

    drop(client);
    assert_eq!(peer.recv().await, None);
}
