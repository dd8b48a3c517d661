//! Shared vocabulary for gamehall.
//!
//! This crate defines what every other layer talks about:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`], [`Seat`], [`ChannelId`],
//!   [`Address`], [`Profile`]): who a participant is and where their
//!   messages go.
//! - **Content** ([`Content`], [`Notice`], [`Transcript`]): what gets
//!   delivered. The core never renders text; the chat adapter localizes
//!   notices and game keys.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how content and
//!   transcripts are turned into bytes for adapters or audit logs.
//!
//! ```text
//! Lobby / Room  →  Content  →  Transport (adapter)
//! ```

mod codec;
mod content;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use content::{Content, Notice, Seated, Transcript};
pub use error::ProtocolError;
pub use types::{Address, ChannelId, PlayerId, Profile, RoomId, Seat};
