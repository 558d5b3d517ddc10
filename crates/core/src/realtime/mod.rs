//! Reconnecting realtime notification client.
//!
//! The client keeps one duplex text connection open to the backend's `/ws`
//! endpoint. When the connection drops it reconnects with exponential
//! backoff, up to a bounded number of attempts, then gives up and says so on
//! its event channel. Inbound frames are parsed as JSON where possible and
//! handed to every registered listener.
//!
//! - `RealtimeClient`: caller-owned client and state machine
//! - `RealtimeTransport`: how connections are opened (tungstenite or a mock)
//! - `ReconnectPolicy`: backoff schedule

mod backoff;
mod client;
mod transport;
mod tungstenite;
mod types;

pub use backoff::ReconnectPolicy;
pub use client::RealtimeClient;
pub use transport::{Connection, RealtimeTransport};
pub use tungstenite::TungsteniteTransport;
pub use types::{
    ConnectionState, DisconnectReason, InboundMessage, OutboundMessage, RealtimeError,
    RealtimeEvent,
};
