//! Room options and state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomOptions
// ---------------------------------------------------------------------------

/// Host-controlled settings of a room.
///
/// Every field has a default, so options can be deserialized from a
/// partial object such as `{"capacity": 4}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomOptions {
    /// Display name. Defaults to the room id.
    pub name: Option<String>,

    /// Maximum number of seated players. `None` means unlimited.
    pub capacity: Option<usize>,

    /// Private rooms are joinable by id but not listed.
    pub private: bool,
}

impl RoomOptions {
    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks the room private.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Whether a room with `size` players can seat one more.
    pub fn has_room_for_one_more(&self, size: usize) -> bool {
        self.capacity.is_none_or(|capacity| size < capacity)
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// A room cycles through a start and a game until it is destroyed:
///
/// ```text
/// Waiting ─► Starting ─► Playing
///    ▲          │           │
///    └──────────┴───────────┘
///         (any) ─► Destroyed
/// ```
///
/// - **Waiting**: accepting joins, chat is open, a game may be attached
///   or replaced.
/// - **Starting**: a start claimed the room and the readiness round runs.
///   The seat list is frozen; chat stays open so players can answer.
/// - **Playing**: a game is running. The room is locked and open chat is
///   disabled until the game finishes or is terminated.
/// - **Destroyed**: terminal. The room is gone from the registry; every
///   operation on a stale handle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    Waiting,
    Starting,
    Playing,
    Destroyed,
}

impl RoomState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if a game is running.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Returns `true` while a start or a game holds the room.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Starting | Self::Playing)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Starting)
                | (Self::Starting, Self::Playing | Self::Waiting)
                | (Self::Playing, Self::Waiting)
                | (Self::Waiting | Self::Starting | Self::Playing, Self::Destroyed)
        )
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Starting => write!(f, "Starting"),
            Self::Playing => write!(f, "Playing"),
            Self::Destroyed => write!(f, "Destroyed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_state_transitions() {
        assert!(RoomState::Waiting.can_transition_to(RoomState::Starting));
        assert!(RoomState::Starting.can_transition_to(RoomState::Playing));
        assert!(RoomState::Starting.can_transition_to(RoomState::Waiting));
        assert!(RoomState::Playing.can_transition_to(RoomState::Waiting));
        assert!(!RoomState::Waiting.can_transition_to(RoomState::Playing));
        assert!(!RoomState::Starting.can_transition_to(RoomState::Starting));
        assert!(RoomState::Playing.can_transition_to(RoomState::Destroyed));
        assert!(!RoomState::Destroyed.can_transition_to(RoomState::Waiting));
        assert!(!RoomState::Waiting.can_transition_to(RoomState::Waiting));
    }

    #[test]
    fn test_room_state_is_joinable() {
        assert!(RoomState::Waiting.is_joinable());
        assert!(!RoomState::Starting.is_joinable());
        assert!(!RoomState::Playing.is_joinable());
        assert!(!RoomState::Destroyed.is_joinable());
        assert!(RoomState::Starting.is_busy());
        assert!(!RoomState::Waiting.is_busy());
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::Waiting.to_string(), "Waiting");
        assert_eq!(RoomState::Destroyed.to_string(), "Destroyed");
    }

    #[test]
    fn test_room_options_from_partial_json() {
        let options: RoomOptions = serde_json::from_str(r#"{"capacity": 4}"#).unwrap();
        assert_eq!(options.capacity, Some(4));
        assert!(!options.private);
        assert_eq!(options.name, None);
    }

    #[test]
    fn test_capacity_check() {
        let options = RoomOptions::default().with_capacity(2);
        assert!(options.has_room_for_one_more(1));
        assert!(!options.has_room_for_one_more(2));
        assert!(RoomOptions::default().has_room_for_one_more(1000));
    }
}
