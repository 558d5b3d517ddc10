//! WebSocket echo endpoint.
//!
//! Sends a welcome text on open, then echoes every message back with the
//! same type until the client closes.

use axum::{
    extract::ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_FRAMES_ECHOED};

/// First message sent on every connection.
pub const WELCOME_MESSAGE: &str = "Connected to WebSocket server";

/// WebSocket upgrade handler. Plain HTTP requests get a 400.
pub async fn ws_handler(ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>) -> Response {
    match ws {
        Ok(ws) => ws.on_upgrade(handle_socket).into_response(),
        Err(rejection) => {
            debug!("Rejected non-WebSocket request to /ws: {}", rejection);
            (StatusCode::BAD_REQUEST, "Expected a WebSocket request").into_response()
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_socket(mut socket: WebSocket) {
    let session = Uuid::new_v4();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!(%session, "WebSocket client connected");

    if let Err(e) = socket.send(Message::Text(WELCOME_MESSAGE.into())).await {
        warn!(%session, "Failed to send welcome message: {}", e);
        WS_CONNECTIONS_ACTIVE.dec();
        return;
    }

    while let Some(result) = socket.recv().await {
        let (reply, kind) = match result {
            Ok(Message::Text(text)) => (Message::Text(text), "text"),
            Ok(Message::Binary(data)) => (Message::Binary(data), "binary"),
            Ok(Message::Close(frame)) => {
                // The close handshake reply is sent by the protocol layer.
                debug!(%session, ?frame, "WebSocket client requested close");
                break;
            }
            Ok(_) => {
                // Ping/pong handled by axum
                continue;
            }
            Err(e) => {
                warn!(%session, "WebSocket receive error: {}", e);
                break;
            }
        };

        if let Err(e) = socket.send(reply).await {
            debug!(%session, "WebSocket echo failed, client disconnected: {}", e);
            break;
        }
        WS_FRAMES_ECHOED.with_label_values(&[kind]).inc();
    }

    WS_CONNECTIONS_ACTIVE.dec();
    info!(%session, "WebSocket client disconnected");
}
