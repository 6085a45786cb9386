//! Backend search results as seen by the coordinator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::LocalPlayerId;
use super::intent::MATCH_TYPE_KEY;

/// One session returned by a search.
///
/// Opaque to the coordinator apart from [`Self::is_valid`] and the
/// advertised match type; the rest is carried for the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSearchResult {
    /// Backend id of the session. The nil UUID marks an invalid entry.
    pub session_id: uuid::Uuid,
    /// Player hosting the session.
    pub owner: LocalPlayerId,
    /// Build id the host runs.
    pub build_unique_id: u32,
    /// Public slots still free.
    pub open_public_slots: u32,
    /// Public slots in total.
    pub max_public_slots: u32,
    /// Round trip to the host in milliseconds.
    pub ping_ms: u32,
    /// Advertised attributes.
    pub attributes: BTreeMap<String, String>,
}

impl SessionSearchResult {
    /// Returns `false` for entries the backend could not fill in.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.session_id.is_nil()
    }

    /// Returns the advertised match type, if any.
    #[must_use]
    pub fn match_type(&self) -> Option<&str> {
        self.attributes.get(MATCH_TYPE_KEY).map(String::as_str)
    }
}
