//! Unified error type for gamehall.

use gamehall_protocol::ProtocolError;
use gamehall_room::{GameError, RoomError};
use gamehall_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `gamehall` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GamehallError {
    /// A delivery failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encoding or parsing failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room operation was rejected (full, not found, not host, ...).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A game module failed.
    #[error(transparent)]
    Game(#[from] GameError),
}
