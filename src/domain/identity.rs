//! Type-safe identifiers for players and named sessions.
//!
//! [`LocalPlayerId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so
//! that player identities cannot be confused with session ids.
//! [`SessionName`] is the key the backend stores a named session under;
//! the coordinator always passes it explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Session name reserved for the game session.
pub const GAME_SESSION: &str = "GameSession";

/// Identity of the local player issuing backend calls.
///
/// Generated once per coordinator and passed with every create, find and
/// join call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalPlayerId(uuid::Uuid);

impl LocalPlayerId {
    /// Creates a new random `LocalPlayerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `LocalPlayerId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for LocalPlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalPlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for LocalPlayerId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

/// Name under which the backend keeps a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionName(String);

impl SessionName {
    /// Creates a session name from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The reserved [`GAME_SESSION`] name.
    #[must_use]
    pub fn game() -> Self {
        Self::new(GAME_SESSION)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionName {
    fn default() -> Self {
        Self::game()
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
