//! Delivery mechanics shared by guests and players.

use std::future::Future;

use gamehall_protocol::Content;
use gamehall_transport::{DeliveryQueue, Receipt, TransportError};

/// Anything that owns a [`DeliveryQueue`].
///
/// Implementors only provide [`queue`](Self::queue); sending, immediate
/// sending, and flushing come for free and behave identically for every
/// kind of participant.
pub trait Endpoint {
    /// The participant's outbound queue.
    fn queue(&self) -> &DeliveryQueue;

    /// Enqueues content; see [`DeliveryQueue::send`].
    fn send(&self, content: impl Into<Content>) -> Receipt
    where
        Self: Sized,
    {
        self.queue().send(content.into())
    }

    /// Delivers content immediately, ahead of anything still queued.
    fn send_now(
        &self,
        content: impl Into<Content>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send
    where
        Self: Sized + Sync,
    {
        let content = content.into();
        async move { self.queue().send_now(&content).await }
    }

    /// Resolves once everything queued so far was delivered.
    fn flush(&self) -> Receipt {
        self.queue().flush()
    }
}
