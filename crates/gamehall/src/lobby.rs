//! `Lobby` builder and shared service state.
//!
//! The lobby is the process-wide entry point: it owns the room
//! [`Registry`], the transport every participant delivers through, and the
//! registered game corridors. The command surface lives in
//! [`commands`](crate::commands).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gamehall_protocol::Profile;
use gamehall_room::{Corridor, DEFAULT_ROOM_ID_LEN, Registry};
use gamehall_session::{Player, SessionConfig};
use gamehall_transport::Transport;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Lobby-wide settings.
///
/// Every field has a default, so a config file may set only what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Minimum gap between two queued deliveries to one participant.
    pub message_delay: Duration,

    /// How long players have to acknowledge a game start.
    pub ready_timeout: Duration,

    /// How long a leaving host has to pick a successor.
    pub transfer_timeout: Duration,

    /// Capacity for rooms created without one. `None` means unlimited.
    pub default_capacity: Option<usize>,

    /// Number of digits in generated room ids.
    pub room_id_len: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            message_delay: Duration::from_millis(100),
            ready_timeout: Duration::from_secs(60),
            transfer_timeout: Duration::from_secs(60),
            default_capacity: None,
            room_id_len: DEFAULT_ROOM_ID_LEN,
        }
    }
}

impl LobbyConfig {
    /// The per-participant part of the config.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            message_delay: self.message_delay,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`Lobby`].
///
/// # Example
///
/// ```rust,ignore
/// use gamehall::prelude::*;
///
/// let (transport, deliveries) = LocalTransport::new();
/// let lobby = Lobby::builder()
///     .config(LobbyConfig::default())
///     .corridor(RpsCorridor)
///     .build(transport);
/// ```
#[derive(Default)]
pub struct LobbyBuilder {
    config: LobbyConfig,
    corridors: HashMap<String, Arc<dyn Corridor>>,
}

impl LobbyBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lobby configuration.
    pub fn config(mut self, config: LobbyConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a game type. A later corridor with the same name wins.
    pub fn corridor(mut self, corridor: impl Corridor) -> Self {
        let name = corridor.name().to_string();
        if self
            .corridors
            .insert(name.clone(), Arc::new(corridor))
            .is_some()
        {
            tracing::warn!(game = %name, "corridor registered twice, keeping the last one");
        }
        self
    }

    /// Builds the lobby on top of `transport`.
    pub fn build(self, transport: impl Transport) -> Lobby {
        tracing::info!(
            corridors = self.corridors.len(),
            "lobby ready"
        );
        Lobby {
            inner: Arc::new(LobbyInner {
                registry: Registry::with_id_len(self.config.room_id_len),
                transport: Arc::new(transport),
                corridors: self.corridors,
                config: self.config,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// Shared lobby state.
pub(crate) struct LobbyInner {
    pub(crate) config: LobbyConfig,
    pub(crate) registry: Arc<Registry>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) corridors: HashMap<String, Arc<dyn Corridor>>,
}

/// The multiplayer room service.
///
/// Cheap to clone; clones share the same rooms.
#[derive(Clone)]
pub struct Lobby {
    pub(crate) inner: Arc<LobbyInner>,
}

impl Lobby {
    /// Creates a new builder.
    pub fn builder() -> LobbyBuilder {
        LobbyBuilder::new()
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.inner.config
    }

    /// The live room index.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    /// Names of the registered game types, sorted.
    pub fn games(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.corridors.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn corridor(&self, name: &str) -> Option<Arc<dyn Corridor>> {
        self.inner.corridors.get(name).cloned()
    }

    /// Builds a fresh player endpoint for `profile`.
    pub(crate) fn player_for(&self, profile: Profile) -> Arc<Player> {
        Player::new(
            profile,
            Arc::clone(&self.inner.transport),
            &self.inner.config.session(),
        )
    }
}

impl std::fmt::Debug for Lobby {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lobby")
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .field("games", &self.games())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lobby_config_default() {
        let config = LobbyConfig::default();
        assert_eq!(config.message_delay, Duration::from_millis(100));
        assert_eq!(config.room_id_len, 6);
        assert_eq!(config.default_capacity, None);
    }

    #[test]
    fn test_lobby_config_partial_json() {
        let config: LobbyConfig =
            serde_json::from_str(r#"{"default_capacity": 4, "room_id_len": 4}"#).unwrap();
        assert_eq!(config.default_capacity, Some(4));
        assert_eq!(config.room_id_len, 4);
        assert_eq!(config.ready_timeout, LobbyConfig::default().ready_timeout);
    }

    #[test]
    fn test_session_config_follows_message_delay() {
        let config = LobbyConfig {
            message_delay: Duration::ZERO,
            ..LobbyConfig::default()
        };
        assert_eq!(config.session().message_delay, Duration::ZERO);
    }
}
