//! Identity types shared by every gamehall layer.
//!
//! A participant is known to the core by three things: a stable account
//! id ([`PlayerId`]), a display [`Profile`], and an [`Address`] the chat
//! adapter knows how to deliver to. Rooms are addressed by an opaque
//! [`RoomId`] and players inside a room by their [`Seat`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a participant's account.
///
/// Newtype wrapper so a `PlayerId` can never be confused with a seat
/// number, even though both are plain integers underneath.
/// `#[serde(transparent)]` serializes `PlayerId(42)` as just `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// An opaque, unique identifier for a room.
///
/// Room ids are what players type to join a room, so they are short
/// strings rather than integers (the lobby generates numeric strings by
/// default, but adapters may hand out anything unique).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A seat number inside one room.
///
/// Seats are handed out by a per-room counter starting at 1 and are never
/// reused, so a seat number names the same player for the whole time that
/// player stays in the room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Seat(pub u32);

impl Seat {
    /// The seat given to whoever creates a room.
    pub const FIRST: Seat = Seat(1);

    /// The seat after this one.
    pub fn next(self) -> Seat {
        Seat(self.0 + 1)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a seat number typed by a participant, e.g. `" 3 "`.
impl FromStr for Seat {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Seat)
            .map_err(|_| ProtocolError::InvalidSeat(s.to_string()))
    }
}

/// Identity of a guest channel (a group chat observing a room).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Builds the conventional `platform:channel` id.
    pub fn new(platform: &str, channel_id: &str) -> Self {
        Self(format!("{platform}:{channel_id}"))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Address & Profile
// ---------------------------------------------------------------------------

/// Where the chat adapter should deliver content.
///
/// Players are reached in private, guests in the channel they watch from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Address {
    /// A private conversation with one user.
    Private { platform: String, user_id: String },
    /// A shared channel.
    Channel { platform: String, channel_id: String },
}

impl Address {
    /// Shorthand for a private address.
    pub fn private(platform: &str, user_id: &str) -> Self {
        Self::Private {
            platform: platform.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// Shorthand for a channel address.
    pub fn channel(platform: &str, channel_id: &str) -> Self {
        Self::Channel {
            platform: platform.to_string(),
            channel_id: channel_id.to_string(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private { platform, user_id } => {
                write!(f, "private:{platform}:{user_id}")
            }
            Self::Channel {
                platform,
                channel_id,
            } => write!(f, "channel:{platform}:{channel_id}"),
        }
    }
}

/// Everything the adapter resolved about a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable account id.
    pub id: PlayerId,
    /// Display name, used in notices.
    pub name: String,
    /// Preferred locale, passed through to the adapter untouched.
    #[serde(default)]
    pub locale: Option<String>,
    /// Private delivery address.
    pub address: Address,
}

impl Profile {
    /// Creates a profile without a locale preference.
    pub fn new(id: PlayerId, name: impl Into<String>, address: Address) -> Self {
        Self {
            id,
            name: name.into(),
            locale: None,
            address,
        }
    }

    /// Sets the locale preference.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_id_display_is_raw() {
        assert_eq!(RoomId::from("114514").to_string(), "114514");
    }

    #[test]
    fn test_seat_ordering_and_next() {
        assert_eq!(Seat::FIRST.next(), Seat(2));
        assert!(Seat(2) < Seat(10));
    }

    #[test]
    fn test_seat_parses_trimmed_input() {
        assert_eq!(" 3 ".parse::<Seat>().unwrap(), Seat(3));
        assert!(matches!(
            "three".parse::<Seat>(),
            Err(ProtocolError::InvalidSeat(_))
        ));
        assert!("-1".parse::<Seat>().is_err());
    }

    #[test]
    fn test_channel_id_new() {
        assert_eq!(ChannelId::new("qq", "123").to_string(), "qq:123");
    }

    #[test]
    fn test_address_json_is_tagged() {
        let json = serde_json::to_value(Address::private("qq", "111")).unwrap();
        assert_eq!(json["kind"], "private");
        assert_eq!(json["user_id"], "111");
    }

    #[test]
    fn test_profile_locale_defaults_to_none() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":1,"name":"alice","address":{"kind":"private","platform":"qq","user_id":"1"}}"#,
        )
        .unwrap();
        assert_eq!(profile.locale, None);
        assert_eq!(profile.name, "alice");
    }
}
