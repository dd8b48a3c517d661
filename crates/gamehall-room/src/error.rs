//! Error types for the room layer.

use gamehall_protocol::{PlayerId, RoomId, Seat};

/// Errors that can occur during room operations.
///
/// Every variant is a validation failure: it is returned before anything
/// was mutated or broadcast.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or was destroyed).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// No more seats available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player already sits in a room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player is not seated anywhere (or not in this room).
    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    /// Only the host may do this.
    #[error("player {0} is not the host")]
    NotHost(PlayerId),

    /// Some of the requested seats are empty.
    #[error("seats not found: {}", format_seats(.0))]
    SeatsNotFound(Vec<Seat>),

    /// The host cannot target themselves.
    #[error("seat {0} belongs to the host")]
    TargetIsHost(Seat),

    /// The operation needs at least one target seat.
    #[error("no target seats given")]
    NoTargets,

    /// No game is attached to the room.
    #[error("no game attached")]
    NoGame,

    /// The room is in a state that doesn't allow this operation.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The game refused to be created or started.
    #[error("game rejected: {0}")]
    GameRejected(#[source] GameError),

    /// No game type with this name is registered.
    #[error("unknown game {0:?}")]
    UnknownGame(String),

    /// Open chat is disabled while a game runs.
    #[error("chat is disabled in this room right now")]
    SpeechDisabled,

    /// A room option was out of range.
    #[error("invalid room option: {0}")]
    InvalidOption(String),
}

fn format_seats(seats: &[Seat]) -> String {
    seats
        .iter()
        .map(Seat::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by game modules.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The game refuses to run in the room's current shape.
    #[error("{0}")]
    Rejected(String),

    /// The game was stopped from outside.
    #[error("game aborted: {0}")]
    Aborted(String),

    /// Caller options did not match what the game expects.
    #[error("invalid game options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// A player the game needs left mid-game.
    #[error("{0} left the game")]
    PlayerLeft(String),

    /// Any other failure inside the game.
    #[error("{0}")]
    Failed(String),
}
