//! Search DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SessionSearchResult;

/// Request body for `POST /searches`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FindSessionsRequest {
    /// Result cap. Defaults to the menu's search cap.
    #[serde(default)]
    pub max_results: Option<u32>,
}

/// One entry of the last search.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResultDto {
    /// Position to pass to the join endpoint.
    pub index: usize,
    /// Backend session id.
    pub session_id: uuid::Uuid,
    /// Hosting player.
    pub owner: uuid::Uuid,
    /// Build id of the host.
    pub build_unique_id: u32,
    /// Free public slots.
    pub open_public_slots: u32,
    /// Total public slots.
    pub max_public_slots: u32,
    /// Round-trip estimate in milliseconds.
    pub ping_ms: u32,
    /// Advertised match type.
    pub match_type: Option<String>,
    /// All advertised attributes.
    pub attributes: BTreeMap<String, String>,
}

impl SearchResultDto {
    /// Maps the entry at `index`.
    #[must_use]
    pub fn from_result(index: usize, result: &SessionSearchResult) -> Self {
        Self {
            index,
            session_id: result.session_id,
            owner: *result.owner.as_uuid(),
            build_unique_id: result.build_unique_id,
            open_public_slots: result.open_public_slots,
            max_public_slots: result.max_public_slots,
            ping_ms: result.ping_ms,
            match_type: result.match_type().map(str::to_string),
            attributes: result.attributes.clone(),
        }
    }
}

/// Response body for `GET /searches/results`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResultsResponse {
    /// Number of entries.
    pub count: usize,
    /// Entries in search order.
    pub data: Vec<SearchResultDto>,
}

impl SearchResultsResponse {
    /// Maps the results of one search.
    #[must_use]
    pub fn from_results(results: &[SessionSearchResult]) -> Self {
        let data: Vec<SearchResultDto> = results
            .iter()
            .enumerate()
            .map(|(index, result)| SearchResultDto::from_result(index, result))
            .collect();
        Self {
            count: data.len(),
            data,
        }
    }
}
