//! What the local player asks the backend for: session intent, the
//! settings derived from it, and search queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Attribute key under which a session advertises its match type.
pub const MATCH_TYPE_KEY: &str = "MatchType";

/// Parameters of the session the local player wants to host.
///
/// Retained by the coordinator so it can be replayed after a forced
/// destroy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIntent {
    max_public_slots: u32,
    match_type: String,
}

impl SessionIntent {
    /// Validates and builds an intent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRequest`] when `max_public_slots` is
    /// zero and [`SessionError::InvalidMatchType`] when `match_type` is
    /// blank.
    pub fn new(max_public_slots: u32, match_type: impl Into<String>) -> Result<Self, SessionError> {
        let match_type = match_type.into();
        if max_public_slots == 0 {
            return Err(SessionError::InvalidRequest(
                "max_public_slots must be positive".to_string(),
            ));
        }
        if match_type.trim().is_empty() {
            return Err(SessionError::InvalidMatchType(match_type));
        }
        Ok(Self {
            max_public_slots,
            match_type,
        })
    }

    /// Number of public connections the session offers.
    #[must_use]
    pub const fn max_public_slots(&self) -> u32 {
        self.max_public_slots
    }

    /// Match type advertised for discovery.
    #[must_use]
    pub fn match_type(&self) -> &str {
        &self.match_type
    }
}

/// How far an attribute is advertised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advertisement {
    /// Kept on the host only.
    DontAdvertise,
    /// Visible to LAN pings only.
    ViaPingOnly,
    /// Published to the online service only.
    ViaOnlineService,
    /// Published to the online service and answered in LAN pings.
    ViaOnlineServiceAndPing,
}

impl Advertisement {
    /// Returns `true` if searches may see the attribute.
    #[must_use]
    pub const fn is_advertised(self) -> bool {
        !matches!(self, Self::DontAdvertise)
    }
}

/// A single session attribute and its visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAttribute {
    /// Attribute value.
    pub value: String,
    /// Visibility of the attribute.
    pub advertisement: Advertisement,
}

/// Settings handed to the backend's create entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Local-only session (no online subsystem available).
    pub is_lan_match: bool,
    /// Number of public connections.
    pub num_public_connections: u32,
    /// Whether players may join after the session started.
    pub allow_join_in_progress: bool,
    /// Whether friends may join through presence.
    pub allow_join_via_presence: bool,
    /// Whether the session is published for discovery.
    pub should_advertise: bool,
    /// Whether the session is tied to presence.
    pub uses_presence: bool,
    /// Prefer lobbies when the backend offers them.
    pub use_lobbies_if_available: bool,
    /// Only clients with the same build id can see the session.
    pub build_unique_id: u32,
    /// Custom attributes keyed by name.
    pub attributes: BTreeMap<String, SessionAttribute>,
}

impl SessionSettings {
    /// Builds the settings for hosting `intent`.
    #[must_use]
    pub fn for_intent(intent: &SessionIntent, is_lan_match: bool, build_unique_id: u32) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            MATCH_TYPE_KEY.to_string(),
            SessionAttribute {
                value: intent.match_type().to_string(),
                advertisement: Advertisement::ViaOnlineServiceAndPing,
            },
        );
        Self {
            is_lan_match,
            num_public_connections: intent.max_public_slots(),
            allow_join_in_progress: true,
            allow_join_via_presence: true,
            should_advertise: true,
            uses_presence: true,
            use_lobbies_if_available: true,
            build_unique_id,
            attributes,
        }
    }

    /// Returns the value of an attribute, if set.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|attr| attr.value.as_str())
    }

    /// Returns the advertised match type, if set.
    #[must_use]
    pub fn match_type(&self) -> Option<&str> {
        self.attribute(MATCH_TYPE_KEY)
    }

    /// Attributes that searches are allowed to see.
    #[must_use]
    pub fn advertised_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.advertisement.is_advertised())
            .map(|(key, attr)| (key.clone(), attr.value.clone()))
            .collect()
    }
}

/// Query handed to the backend's find entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSearch {
    /// Search the local network instead of the online service.
    pub is_lan_query: bool,
    /// Upper bound on returned results.
    pub max_search_results: u32,
    /// Restrict results to presence sessions.
    pub presence_only: bool,
}

impl SessionSearch {
    /// Builds a presence-only search.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRequest`] when `max_search_results`
    /// is zero.
    pub fn presence(max_search_results: u32, is_lan_query: bool) -> Result<Self, SessionError> {
        if max_search_results == 0 {
            return Err(SessionError::InvalidRequest(
                "max_results must be positive".to_string(),
            ));
        }
        Ok(Self {
            is_lan_query,
            max_search_results,
            presence_only: true,
        })
    }
}
