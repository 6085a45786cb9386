//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{OperationKind, SessionOutcome};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client outcome broadcast.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands a client sends in the envelope payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Receive outcomes of the given operations. `"*"` selects all.
    Subscribe {
        /// Operation names (`create`, `find`, `join`, `start`, `destroy`).
        operations: Vec<String>,
    },
    /// Stop receiving outcomes of the given operations.
    Unsubscribe {
        /// Operation names.
        operations: Vec<String>,
    },
    /// Current driver state.
    Status,
}

/// Operation names split into kinds and the wildcard flag.
///
/// # Errors
///
/// Returns the first name that is neither `"*"` nor an operation.
pub fn parse_operations(names: &[String]) -> Result<(Vec<OperationKind>, bool), String> {
    let mut kinds = Vec::with_capacity(names.len());
    let mut wildcard = false;
    for name in names {
        if name == "*" {
            wildcard = true;
        } else {
            kinds.push(name.parse::<OperationKind>()?);
        }
    }
    Ok((kinds, wildcard))
}

impl WsMessage {
    /// Response to the command with `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error reply.
    #[must_use]
    pub fn error(id: String, code: u16, message: impl Into<String>) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }

    /// Outcome broadcast with a fresh id.
    #[must_use]
    pub fn event(outcome: &SessionOutcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "event": outcome.event_type_str(),
                "operation": outcome.kind(),
                "data": outcome,
            }),
        }
    }

    /// Serialized form, `None` if serialization fails.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}
