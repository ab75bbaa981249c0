//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::LobbySyncError;

/// Who we log in as and how we keep the connection alive.
///
/// Every field has a default, so a JSON file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Display name sent with `login`. Escaped on the wire.
    pub name: String,

    /// Team name sent with `login`. May be empty.
    pub team: String,

    /// Country code sent with `login`, as-is.
    pub locale: String,

    /// Protocol version we announce.
    pub protocol_version: u32,

    /// Keepalive interval used until the server asks for another one.
    ///
    /// A `welcome` carrying this same value is treated as not asking.
    pub ping_interval_ms: u64,

    /// Line sent on every keepalive tick.
    pub ping_message: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            team: String::new(),
            locale: String::new(),
            protocol_version: 1,
            ping_interval_ms: 5_000,
            ping_message: "ping".to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, LobbySyncError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }
}
