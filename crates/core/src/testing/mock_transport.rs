//! Scripted realtime transport for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::Instant;

use crate::realtime::{Connection, RealtimeError, RealtimeTransport};

enum Scripted {
    Refuse,
    Accept(Connection),
}

/// Mock implementation of the RealtimeTransport trait.
///
/// Each `connect` call consumes the next scripted outcome. With nothing
/// scripted the connection is refused. Connect times are recorded with
/// tokio's clock, so paused-time tests can check backoff delays exactly.
///
/// # Example
///
/// ```rust,ignore
/// let transport = Arc::new(MockTransport::new());
/// let mut peer = transport.push_connection().await;
/// let client = RealtimeClient::new("ws://mock", policy, transport.clone());
///
/// client.connect().await?;
/// peer.send("hello");
/// peer.close(); // triggers a reconnect
/// ```
#[derive(Default)]
pub struct MockTransport {
    script: Arc<RwLock<VecDeque<Scripted>>>,
    connects: Arc<RwLock<Vec<Instant>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("script", &"<script>")
            .field("connects", &"<connects>")
            .finish()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next connect to fail.
    pub async fn push_refusal(&self) {
        self.script.write().await.push_back(Scripted::Refuse);
    }

    /// Script the next connect to succeed, returning the server side of it.
    pub async fn push_connection(&self) -> MockPeer {
        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        self.script
            .write()
            .await
            .push_back(Scripted::Accept(Connection { outbound, inbound }));
        MockPeer {
            to_client: Some(to_client),
            from_client,
        }
    }

    /// Number of connect calls so far.
    pub async fn connect_count(&self) -> usize {
        self.connects.read().await.len()
    }

    /// When each connect call happened.
    pub async fn connect_times(&self) -> Vec<Instant> {
        self.connects.read().await.clone()
    }
}

#[async_trait]
impl RealtimeTransport for MockTransport {
    async fn connect(&self, url: &str) -> Result<Connection, RealtimeError> {
        self.connects.write().await.push(Instant::now());

        match self.script.write().await.pop_front() {
            Some(Scripted::Accept(connection)) => Ok(connection),
            Some(Scripted::Refuse) | None => Err(RealtimeError::ConnectFailed {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Server side of a scripted connection.
///
/// Dropping the peer closes the connection from the server side.
#[derive(Debug)]
pub struct MockPeer {
    to_client: Option<mpsc::UnboundedSender<String>>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl MockPeer {
    /// Deliver a frame to the client. Returns `false` once closed.
    pub fn send(&self, text: impl Into<String>) -> bool {
        match &self.to_client {
            Some(tx) => tx.send(text.into()).is_ok(),
            None => false,
        }
    }

    /// Close the connection from the server side.
    pub fn close(&mut self) {
        self.to_client = None;
    }

    /// Next frame sent by the client, or `None` once the client closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }
}
