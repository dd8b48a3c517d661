//! Codec trait and implementations for serializing content.
//!
//! The core hands structured [`Content`](crate::Content) to the adapter,
//! but adapters that bridge to a byte-oriented platform, and anything that
//! stores a room [`Transcript`](crate::Transcript), need bytes. The
//! [`Codec`] trait is the strategy for that conversion; [`JsonCodec`] is the
//! default implementation.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so one codec can be shared by every delivery
/// worker without borrowing.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use gamehall_protocol::{Codec, Content, JsonCodec, Notice, RoomId, Transcript};
///
/// let transcript = Transcript {
///     room: RoomId::from("114514"),
///     entries: vec![Content::from(Notice::Joined { target: "alice".into() })],
/// };
///
/// let bytes = JsonCodec.encode(&transcript).unwrap();
/// let decoded: Transcript = JsonCodec.decode(&bytes).unwrap();
/// assert_eq!(transcript, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
