//! In-process transport backed by an mpsc channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gamehall_protocol::{Address, Content};
use tokio::sync::mpsc;

use crate::{Transport, TransportError};

/// One delivered item, as observed on the receiving side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub address: Address,
    pub content: Content,
}

type LatencyFn = dyn Fn(&Address, &Content) -> Duration + Send + Sync;

/// A [`Transport`] that pushes every delivery into an unbounded channel.
///
/// Cheap to clone; all clones feed the same receiver. An optional latency
/// function simulates slow platforms.
#[derive(Clone)]
pub struct LocalTransport {
    sender: mpsc::UnboundedSender<Delivery>,
    latency: Option<Arc<LatencyFn>>,
}

impl LocalTransport {
    /// Creates a transport and the receiver that observes its deliveries.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                latency: None,
            },
            receiver,
        )
    }

    /// Delays each delivery by whatever `latency` returns for it.
    pub fn with_latency(
        mut self,
        latency: impl Fn(&Address, &Content) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.latency = Some(Arc::new(latency));
        self
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn deliver(
        &self,
        address: &Address,
        content: &Content,
    ) -> Result<(), TransportError> {
        if let Some(latency) = &self.latency {
            let delay = latency(address, content);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        tracing::trace!(%address, "local delivery");
        self.sender
            .send(Delivery {
                address: address.clone(),
                content: content.clone(),
            })
            .map_err(|_| {
                TransportError::ConnectionClosed("local receiver dropped".into())
            })
    }
}
