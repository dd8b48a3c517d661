use gamehall_protocol::Address;

/// Errors that can occur while delivering content.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The adapter refused or failed to deliver.
    #[error("delivery to {address} failed: {reason}")]
    DeliveryFailed { address: Address, reason: String },

    /// The adapter side of the transport is gone.
    #[error("transport closed: {0}")]
    ConnectionClosed(String),

    /// The delivery queue stopped before the item was handled.
    #[error("delivery queue shut down")]
    Shutdown,
}
