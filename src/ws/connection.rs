//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered outcomes.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use super::messages::{WsCommand, WsMessage, parse_operations};
use crate::domain::OutcomeSubscription;
use crate::driver::DriverHandle;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards outcomes accepted by the connection's filter. A new
///   connection receives nothing until it subscribes.
pub async fn run_connection(
    socket: WebSocket,
    mut outcomes: OutcomeSubscription,
    driver: DriverHandle,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut outcomes, &driver).await;
                        if let Some(json) = reply.to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            outcome = outcomes.recv() => {
                match outcome {
                    Ok(outcome) => {
                        if let Some(json) = WsMessage::event(&outcome).to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind outcome notifier");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    outcomes: &mut OutcomeSubscription,
    driver: &DriverHandle,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { operations } => match parse_operations(&operations) {
            Ok((kinds, wildcard)) => {
                let filter = outcomes.filter_mut();
                filter.subscribe(&kinds, wildcard);
                WsMessage::response(
                    msg.id,
                    serde_json::json!({
                        "subscribed": kinds,
                        "count": filter.count(),
                        "wildcard": filter.is_subscribed_all(),
                    }),
                )
            }
            Err(err) => WsMessage::error(msg.id, 400, err),
        },
        WsCommand::Unsubscribe { operations } => match parse_operations(&operations) {
            Ok((kinds, wildcard)) => {
                let filter = outcomes.filter_mut();
                if wildcard {
                    filter.clear();
                } else {
                    filter.unsubscribe(&kinds);
                }
                WsMessage::response(
                    msg.id,
                    serde_json::json!({
                        "unsubscribed": kinds,
                        "remaining_count": filter.count(),
                    }),
                )
            }
            Err(err) => WsMessage::error(msg.id, 400, err),
        },
        WsCommand::Status => match driver.status().await {
            Ok(status) => WsMessage::response(
                msg.id,
                serde_json::to_value(&status).unwrap_or_default(),
            ),
            Err(err) => WsMessage::error(msg.id, 503, err.to_string()),
        },
    }
}
