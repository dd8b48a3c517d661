//! The `Game` and `Corridor` traits: the extension point for game modules.
//!
//! A game module registers one [`Corridor`] per game type. When a host
//! opens a game, the corridor builds a fresh [`Game`] bound to that room;
//! the room then drives it through validate, readiness, and start:
//!
//! ```text
//! Corridor::create(room, options) ─► Room::attach(game)
//!                                        │
//! Room::start ─► Game::validate ─► readiness round ─► Game::start ─► done
//!                                         ▲                   ▲
//!               Room::terminate / destroy ┴───────────────────┘ (aborts)
//! ```
//!
//! Games talk to players through the room they were given: broadcasts,
//! groups, and the per-player prompts.

use std::sync::Arc;

use async_trait::async_trait;
use gamehall_session::Player;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{GameError, Room};

/// One running (or ready to run) game in one room.
///
/// Implementations usually keep the `Arc<Room>` they were created with.
/// The room drops its game when it is destroyed, so that reference never
/// outlives the room.
#[async_trait]
pub trait Game: Send + Sync + 'static {
    /// The game type's name, as shown to players.
    fn name(&self) -> &str;

    /// Checks whether the room is in a shape this game can run in,
    /// e.g. the right number of players.
    ///
    /// Called before the readiness round. Default: accept.
    async fn validate(&self) -> Result<(), GameError> {
        Ok(())
    }

    /// Runs the game to completion.
    ///
    /// An `Err` ends the game abnormally and is announced to the room.
    async fn start(&self) -> Result<(), GameError>;

    /// Called when a player leaves while the game runs.
    ///
    /// An `Err` terminates the game. Default: ignore.
    async fn leave(&self, _player: &Arc<Player>) -> Result<(), GameError> {
        Ok(())
    }
}

/// A registered game type: builds [`Game`] instances for rooms.
///
/// One corridor exists per game type for the lifetime of the lobby.
pub trait Corridor: Send + Sync + 'static {
    /// The name hosts use to open this game.
    fn name(&self) -> &str;

    /// Builds a game bound to `room`.
    fn create(&self, room: Arc<Room>, options: GameOptions) -> Result<Arc<dyn Game>, GameError>;
}

// ---------------------------------------------------------------------------
// GameOptions
// ---------------------------------------------------------------------------

/// Caller-supplied game options, as a JSON object.
///
/// Each game deserializes them into its own typed options:
///
/// ```
/// # use gamehall_room::GameOptions;
/// #[derive(serde::Deserialize)]
/// struct Rounds { rounds: u32 }
///
/// let options = GameOptions::default().with("rounds", 3);
/// assert_eq!(options.parse::<Rounds>().unwrap().rounds, 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameOptions(Map<String, Value>);

impl GameOptions {
    /// Wraps a JSON value. Anything but an object (or `null`) is rejected.
    pub fn from_value(value: Value) -> Result<Self, GameError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(GameError::Rejected(format!(
                "game options must be an object, got {other}"
            ))),
        }
    }

    /// Adds one option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Reads one raw option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserializes the options into the game's own type.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, GameError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }
}
