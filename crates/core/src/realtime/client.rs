//! Realtime client state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backoff::ReconnectPolicy;
use super::transport::{Connection, RealtimeTransport};
use super::tungstenite::TungsteniteTransport;
use super::types::{
    ConnectionState, DisconnectReason, InboundMessage, OutboundMessage, RealtimeError,
    RealtimeEvent,
};
use crate::config::RealtimeConfig;
use crate::metrics::{REALTIME_CONNECTIONS, REALTIME_GIVE_UPS, REALTIME_RECONNECTS};

type Listener = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Mutable client state. Only touched under the mutex, never across an await.
struct Shared {
    state: ConnectionState,
    disconnect_reason: Option<DisconnectReason>,
    attempts: u32,
    /// Bumped by every `connect()` and `disconnect()`; close notifications
    /// carrying an older value are ignored.
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<String>>,
    reader: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
    listeners: Vec<Listener>,
}

impl Shared {
    /// Drop the current connection and cancel any pending reconnect.
    fn teardown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(reconnect) = self.reconnect.take() {
            reconnect.abort();
        }
        self.outbound = None;
    }
}

struct Inner {
    url: String,
    policy: ReconnectPolicy,
    transport: Arc<dyn RealtimeTransport>,
    shared: Mutex<Shared>,
    events: broadcast::Sender<RealtimeEvent>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shared
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .teardown();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: RealtimeEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn connect(inner: Arc<Inner>) -> BoxFuture<'static, Result<(), RealtimeError>> {
        async move {
            let generation = {
                let mut shared = inner.lock();
                shared.teardown();
                shared.generation += 1;
                shared.state = ConnectionState::Connecting;
                shared.disconnect_reason = None;
                shared.generation
            };
            inner.emit(RealtimeEvent::Connecting);
            debug!(url = %inner.url, "Connecting realtime client");

            match inner.transport.connect(&inner.url).await {
                Ok(connection) => Inner::on_open(&inner, generation, connection),
                Err(e) => {
                    warn!(url = %inner.url, error = %e, "Realtime connection failed");
                    Inner::handle_close(&inner, generation);
                    Err(e)
                }
            }
        }
        .boxed()
    }

    fn on_open(
        inner: &Arc<Inner>,
        generation: u64,
        connection: Connection,
    ) -> Result<(), RealtimeError> {
        let Connection {
            outbound,
            mut inbound,
        } = connection;

        {
            let mut shared = inner.lock();
            if shared.generation != generation {
                // Superseded while the handshake was in flight; dropping
                // `outbound` closes the fresh connection.
                return Err(RealtimeError::Cancelled);
            }

            shared.state = ConnectionState::Connected;
            shared.attempts = 0;
            shared.outbound = Some(outbound);

            let weak = Arc::downgrade(inner);
            shared.reader = Some(tokio::spawn(async move {
                while let Some(text) = inbound.recv().await {
                    let Some(inner) = weak.upgrade() else { return };
                    inner.dispatch(text);
                }
                if let Some(inner) = weak.upgrade() {
                    Inner::handle_close(&inner, generation);
                }
            }));
        }

        REALTIME_CONNECTIONS.inc();
        inner.emit(RealtimeEvent::Connected);
        info!(url = %inner.url, "Realtime client connected");
        Ok(())
    }

    fn dispatch(&self, text: String) {
        let message = InboundMessage::parse(text);
        let listeners = self.lock().listeners.clone();
        for listener in listeners {
            listener(&message);
        }
    }

    /// React to the connection for `generation` closing or failing to open.
    fn handle_close(inner: &Arc<Inner>, generation: u64) {
        let mut shared = inner.lock();
        if shared.generation != generation || shared.state == ConnectionState::Disconnected {
            return;
        }

        shared.state = ConnectionState::Disconnected;
        shared.outbound = None;
        // Detach rather than abort: this may be running on the reader task.
        shared.reader = None;

        if shared.attempts < inner.policy.max_attempts {
            shared.attempts += 1;
            let attempt = shared.attempts;
            let delay = inner.policy.delay_for(attempt);
            shared.disconnect_reason = Some(DisconnectReason::ConnectionLost);

            let weak: Weak<Inner> = Arc::downgrade(inner);
            shared.reconnect = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let Some(inner) = weak.upgrade() else { return };
                {
                    let mut shared = inner.lock();
                    if shared.generation != generation {
                        return;
                    }
                    // This task; connect() must not abort it.
                    shared.reconnect = None;
                }
                let _ = Inner::connect(inner).await;
            }));
            drop(shared);

            REALTIME_RECONNECTS.inc();
            inner.emit(RealtimeEvent::Disconnected(DisconnectReason::ConnectionLost));
            inner.emit(RealtimeEvent::ReconnectScheduled { attempt, delay });
            info!(
                attempt,
                max_attempts = inner.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Realtime connection lost, reconnect scheduled"
            );
        } else {
            shared.disconnect_reason = Some(DisconnectReason::GaveUp);
            drop(shared);

            REALTIME_GIVE_UPS.inc();
            inner.emit(RealtimeEvent::Disconnected(DisconnectReason::GaveUp));
            inner.emit(RealtimeEvent::GaveUp);
            warn!(
                url = %inner.url,
                max_attempts = inner.policy.max_attempts,
                "Realtime client gave up reconnecting"
            );
        }
    }
}

/// Reconnecting duplex client for server notifications.
///
/// Cheap to clone; clones share one connection. Background tasks only hold
/// weak references, so dropping every handle shuts the client down.
///
/// # Example
///
/// ```rust,ignore
/// let client = RealtimeClient::from_config(&config.realtime);
/// client.on_message(|msg| println!("{:?}", msg));
/// client.connect().await?;
/// client.send(serde_json::json!({"type": "hello"}));
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("url", &self.inner.url)
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish()
    }
}

impl RealtimeClient {
    /// Create a disconnected client.
    pub fn new(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        transport: Arc<dyn RealtimeTransport>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                policy,
                transport,
                shared: Mutex::new(Shared {
                    state: ConnectionState::Disconnected,
                    disconnect_reason: None,
                    attempts: 0,
                    generation: 0,
                    outbound: None,
                    reader: None,
                    reconnect: None,
                    listeners: Vec::new(),
                }),
                events,
            }),
        }
    }

    /// Create a WebSocket client from configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(
            config.url.clone(),
            config.reconnect_policy(),
            Arc::new(TungsteniteTransport::new()),
        )
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.inner.policy
    }

    /// Open a connection, replacing any existing one.
    ///
    /// On failure the error is returned and, attempts permitting, a
    /// reconnect is already scheduled.
    pub async fn connect(&self) -> Result<(), RealtimeError> {
        Inner::connect(Arc::clone(&self.inner)).await
    }

    /// Close the connection and stop reconnecting.
    pub fn disconnect(&self) {
        {
            let mut shared = self.inner.lock();
            shared.attempts = self.inner.policy.max_attempts;
            shared.generation += 1;
            shared.teardown();
            shared.state = ConnectionState::Disconnected;
            shared.disconnect_reason = Some(DisconnectReason::ClosedByCaller);
        }

        self.inner
            .emit(RealtimeEvent::Disconnected(DisconnectReason::ClosedByCaller));
        self.inner.emit(RealtimeEvent::ClosedByCaller);
        info!(url = %self.inner.url, "Realtime client disconnected");
    }

    /// Send a message. Returns `false` if not connected.
    pub fn send(&self, message: impl Into<OutboundMessage>) -> bool {
        let text = match message.into().into_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Dropping unserializable realtime message");
                return false;
            }
        };

        let shared = self.inner.lock();
        if shared.state != ConnectionState::Connected {
            debug!("Realtime client not connected, message not sent");
            return false;
        }
        match &shared.outbound {
            Some(tx) => tx.send(text).is_ok(),
            None => false,
        }
    }

    /// Serialize `value` as JSON and send it.
    pub fn send_json<T: Serialize>(&self, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.send(OutboundMessage::Json(value)),
            Err(e) => {
                warn!(error = %e, "Dropping unserializable realtime message");
                false
            }
        }
    }

    /// Register a listener for every inbound message. There is no unregister.
    pub fn on_message<F>(&self, listener: F)
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.inner.lock().listeners.push(Arc::new(listener));
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.inner.events.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Why the client is disconnected, if it is.
    pub fn disconnect_reason(&self) -> Option<DisconnectReason> {
        let shared = self.inner.lock();
        match shared.state {
            ConnectionState::Disconnected => shared.disconnect_reason,
            _ => None,
        }
    }

    /// Reconnect attempts since the last successful connection.
    pub fn attempts(&self) -> u32 {
        self.inner.lock().attempts
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}
