//! Rooms for gamehall.
//!
//! A room groups players under a host, keeps a log of everything it
//! broadcast, and runs at most one game at a time. Rooms are tracked by a
//! process-wide [`Registry`], which only room lifecycle operations write to.
//!
//! # Key types
//!
//! - [`Room`]: membership, host control, and the game lifecycle
//! - [`Registry`]: live rooms and who sits where
//! - [`Group`]: predicate-defined broadcast views over a room
//! - [`Game`] / [`Corridor`]: the traits game modules implement
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomOptions`]: host-controlled settings (capacity, privacy, name)

mod config;
mod error;
mod game;
mod group;
mod registry;
mod room;

pub use config::{RoomOptions, RoomState};
pub use error::{GameError, RoomError};
pub use game::{Corridor, Game, GameOptions};
pub use group::{Broadcast, Group};
pub use registry::{DEFAULT_ROOM_ID_LEN, Registry};
pub use room::{Room, RoomInfo, StartClaim, StartOutcome};
