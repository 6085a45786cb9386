//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::OperationKind;

/// Response body of every operation endpoint (202 Accepted).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AcceptedResponse {
    /// Operation that was handed to the coordinator.
    pub operation: String,
    /// Always `"accepted"`; the result is published as an outcome.
    pub status: String,
}

impl AcceptedResponse {
    /// Acknowledges `operation`.
    #[must_use]
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation: operation.as_str().to_string(),
            status: "accepted".to_string(),
        }
    }
}

/// Response body of the menu actions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MenuActionResponse {
    /// `"host"` or `"join"`.
    pub action: String,
    /// `false` when the action was disabled and nothing happened.
    pub accepted: bool,
}
