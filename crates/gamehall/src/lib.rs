//! # gamehall
//!
//! Multiplayer room coordination for chat environments.
//!
//! gamehall tracks who is grouped with whom, delivers ordered messages to
//! every participant, and gives game modules a timed request/response
//! protocol for collecting input from several players at once. Game
//! developers implement [`Corridor`](gamehall_room::Corridor) and
//! [`Game`](gamehall_room::Game); a chat adapter implements
//! [`Transport`](gamehall_transport::Transport) and feeds typed commands
//! into the [`Lobby`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamehall::prelude::*;
//!
//! # async fn demo() -> Result<(), GamehallError> {
//! let (transport, mut deliveries) = LocalTransport::new();
//! let lobby = Lobby::builder().build(transport);
//!
//! let alice = Profile::new(PlayerId(1), "alice", Address::private("demo", "1"));
//! let room = lobby.create(alice, RoomOptions::default())?;
//!
//! let bob = Profile::new(PlayerId(2), "bob", Address::private("demo", "2"));
//! lobby.join(bob, &room)?;
//!
//! while let Some(delivery) = deliveries.recv().await {
//!     println!("{} <- {:?}", delivery.address, delivery.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod commands;
mod error;
mod lobby;

pub use commands::{CHAT_PREFIX, LeaveOutcome};
pub use error::GamehallError;
pub use lobby::{Lobby, LobbyBuilder, LobbyConfig};

/// Everything a game module or adapter usually needs.
pub mod prelude {
    pub use crate::{GamehallError, LeaveOutcome, Lobby, LobbyBuilder, LobbyConfig};
    pub use gamehall_protocol::{
        Address, ChannelId, Codec, Content, JsonCodec, Notice, PlayerId, Profile, RoomId, Seat,
        Seated, Transcript,
    };
    pub use gamehall_room::{
        Broadcast, Corridor, Game, GameError, GameOptions, Group, Room, RoomError, RoomInfo,
        RoomOptions, RoomState, StartClaim, StartOutcome,
    };
    pub use gamehall_session::{Endpoint, Guest, Player, SessionConfig, collect};
    pub use gamehall_task::{Party, Task};
    pub use gamehall_transport::{Delivery, LocalTransport, Transport, TransportError};
}
