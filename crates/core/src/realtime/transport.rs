use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::RealtimeError;

/// An open duplex text connection.
///
/// Dropping `outbound` closes the connection. `inbound` yields `None` once
/// the remote side has closed or the connection failed.
#[derive(Debug)]
pub struct Connection {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

/// Opens connections for the realtime client.
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Connection, RealtimeError>;
}
