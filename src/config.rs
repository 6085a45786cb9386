//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparsable values fall back
//! to their defaults; only `LISTEN_ADDR` is strict.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::{GAME_SESSION, SessionName};
use crate::gateway::loopback::{DEFAULT_BUILD_ID, DEFAULT_HOST_ADDRESS};
use crate::service::MenuSettings;
use crate::service::menu::{
    DEFAULT_LOBBY_PATH, DEFAULT_MATCH_TYPE, DEFAULT_MAX_SEARCH_RESULTS, DEFAULT_PUBLIC_CONNECTIONS,
};

/// Default HTTP bind address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is not a socket address.
    #[error("invalid LISTEN_ADDR {value:?}: {source}")]
    ListenAddr {
        /// Raw value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`SessionsConfig::from_env`].
#[derive(Debug, Clone)]
pub struct SessionsConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Reserved session name.
    pub session_name: SessionName,

    /// Build id stamped into hosted sessions and required of search hits.
    pub build_unique_id: u32,

    /// Host/join menu parameters.
    pub menu: MenuSettings,

    /// Capacity of the outcome broadcast channel.
    pub event_bus_capacity: usize,

    /// Seconds before an outstanding call is failed (0 = never).
    pub operation_timeout_secs: u64,

    /// Milliseconds between gateway polls on the control thread.
    pub tick_interval_ms: u64,

    /// Address the loopback backend hands to joining clients.
    pub loopback_host_address: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl SessionsConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|source| ConfigError::ListenAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let session_name = non_blank(&lookup, "SESSION_NAME")
            .map_or_else(SessionName::game, SessionName::new);

        let menu = MenuSettings {
            num_public_connections: parse_positive(
                &lookup,
                "MENU_PUBLIC_CONNECTIONS",
                DEFAULT_PUBLIC_CONNECTIONS,
            ),
            match_type: non_blank(&lookup, "MENU_MATCH_TYPE")
                .unwrap_or_else(|| DEFAULT_MATCH_TYPE.to_string()),
            lobby_path: non_blank(&lookup, "MENU_LOBBY_PATH")
                .unwrap_or_else(|| DEFAULT_LOBBY_PATH.to_string()),
            max_search_results: parse_positive(
                &lookup,
                "MENU_MAX_SEARCH_RESULTS",
                DEFAULT_MAX_SEARCH_RESULTS,
            ),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            session_name,
            build_unique_id: parse(&lookup, "BUILD_ID", DEFAULT_BUILD_ID),
            menu,
            event_bus_capacity: parse_positive(&lookup, "EVENT_BUS_CAPACITY", 1024),
            operation_timeout_secs: parse(&lookup, "OPERATION_TIMEOUT_SECS", 0),
            tick_interval_ms: parse_positive(&lookup, "TICK_INTERVAL_MS", 16),
            loopback_host_address: non_blank(&lookup, "LOOPBACK_HOST_ADDRESS")
                .unwrap_or_else(|| DEFAULT_HOST_ADDRESS.to_string()),
            log_format,
        })
    }

    /// Operation timeout, `None` when disabled.
    #[must_use]
    pub const fn operation_timeout(&self) -> Option<Duration> {
        if self.operation_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.operation_timeout_secs))
        }
    }

    /// Interval between gateway polls.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            session_name: SessionName::new(GAME_SESSION),
            build_unique_id: DEFAULT_BUILD_ID,
            menu: MenuSettings::default(),
            event_bus_capacity: 1024,
            operation_timeout_secs: 0,
            tick_interval_ms: 16,
            loopback_host_address: DEFAULT_HOST_ADDRESS.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Like [`parse`], but zero also falls back to `default`.
fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialEq + Default + Copy,
{
    let value = parse(lookup, key, default);
    if value == T::default() { default } else { value }
}

fn non_blank(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
