//! Persistent JSON-RPC channel: one text frame per envelope.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tracing::{debug, info, warn};

use super::http::AppState;
use super::MAX_MESSAGE_BYTES;
use crate::handlers::Dispatcher;
use crate::protocol::JsonRpcRequest;

/// Hard ceiling on a single inbound frame. Frames between
/// [`MAX_MESSAGE_BYTES`] and this are read, dropped and counted; anything
/// larger makes the socket fail and ends the connection.
pub const MAX_FRAME_BYTES: usize = 16 * MAX_MESSAGE_BYTES;

/// GET /ws
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.max_message_size(MAX_FRAME_BYTES)
        .max_frame_size(MAX_FRAME_BYTES)
        .on_upgrade(move |socket| serve_connection(socket, state.dispatcher))
}

/// Run one client's message loop until it closes or fails.
///
/// Frames are handled one at a time and each response is sent before the next
/// frame is read. Failures end only this connection.
pub async fn serve_connection(mut socket: WebSocket, dispatcher: Arc<Dispatcher>) {
    let stats = Arc::clone(dispatcher.stats());
    stats.connection_opened();
    info!("websocket client connected");

    loop {
        let text = match socket.recv().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "binary frame is not valid UTF-8, dropped");
                    stats.increment_errors();
                    continue;
                }
            },
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "client closed connection");
                break;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!(error = %e, "websocket connection failed");
                stats.increment_errors();
                break;
            }
            None => {
                warn!("websocket closed without a close frame");
                stats.increment_errors();
                break;
            }
        };

        if text.len() > MAX_MESSAGE_BYTES {
            warn!(bytes = text.len(), limit = MAX_MESSAGE_BYTES, "frame too large, dropped");
            stats.increment_errors();
            continue;
        }

        let req: JsonRpcRequest = match serde_json::from_str(&text) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "error decoding frame, dropped");
                stats.increment_errors();
                continue;
            }
        };

        let Some(resp) = dispatcher.handle(&req).await else {
            continue;
        };

        let payload = match serde_json::to_string(&resp) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to encode response");
                stats.increment_errors();
                continue;
            }
        };

        if let Err(e) = socket.send(Message::Text(payload)).await {
            warn!(error = %e, "failed to send response");
            stats.increment_errors();
            break;
        }
    }

    stats.connection_closed();
    info!("websocket client disconnected");
}
