//! Delivery layer for gamehall.
//!
//! Provides the [`Transport`] trait, the single seam between the room
//! engine and a chat-platform adapter, and the [`DeliveryQueue`] that
//! turns an unordered, variable-latency transport into an ordered,
//! paced stream per participant.
//!
//! # Implementations
//!
//! - [`LocalTransport`]: forwards every delivery into an in-process
//!   channel. Used by tests, demos, and adapters that poll.

mod error;
mod local;
mod queue;

pub use error::TransportError;
pub use local::{Delivery, LocalTransport};
pub use queue::{DeliveryQueue, Receipt};

use async_trait::async_trait;
use gamehall_protocol::{Address, Content};

/// Delivers content to one address.
///
/// Implemented by the chat adapter. The core never calls `deliver` for the
/// same address concurrently through a [`DeliveryQueue`], but immediate
/// sends may overlap with queued ones.
///
/// Object safe (via `async_trait`) so the lobby can hold one
/// `Arc<dyn Transport>` shared by every participant.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends `content` to `address`. Returns once the platform accepted it.
    async fn deliver(
        &self,
        address: &Address,
        content: &Content,
    ) -> Result<(), TransportError>;
}
