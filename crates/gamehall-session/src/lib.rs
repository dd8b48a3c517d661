//! Participants for gamehall.
//!
//! This crate models the two kinds of participant the room engine talks
//! to, and the timed prompts used to collect their input:
//!
//! 1. **Guests** ([`Guest`]): channels that observe a room. They only
//!    receive broadcasts.
//! 2. **Players** ([`Player`]): seated participants. On top of delivery,
//!    a player routes inbound text to armed listeners, which is what the
//!    prompt primitives ([`Player::pause`], [`Player::confirm`],
//!    [`Player::select`], [`collect`]) are built on.
//!
//! Both share the delivery mechanics through the [`Endpoint`] trait.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← seats players, broadcasts to endpoints
//!     ↕
//! Session Layer (this crate)  ← endpoints, listeners, prompts
//!     ↕
//! Transport + Task (below)  ← ordered delivery, timed coordination
//! ```

mod config;
mod endpoint;
mod guest;
mod player;
mod prompt;

pub use config::SessionConfig;
pub use endpoint::Endpoint;
pub use guest::Guest;
pub use player::{ListenerId, Membership, Player};
pub use prompt::collect;
