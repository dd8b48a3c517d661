//! Per-participant ordered delivery.
//!
//! Every participant owns one [`DeliveryQueue`]. Queued items are handed
//! to a dedicated worker task through an mpsc channel, so they reach the
//! transport strictly in enqueue order no matter how long each delivery
//! takes. After each delivery the worker sleeps for the configured delay
//! before touching the next item, which keeps chat platforms from
//! reordering or rate-limiting bursts.
//!
//! ```text
//! send(a) ─┐
//! send(b) ─┼─► [mpsc] ─► worker: deliver(a), sleep, deliver(b), sleep, …
//! flush() ─┘                                   └─► flush resolves here
//! ```
//!
//! Immediate sends ([`DeliveryQueue::send_now`]) bypass the worker and go
//! straight to the transport, so they always overtake anything still
//! waiting in the queue.

use std::sync::Arc;
use std::time::Duration;

use gamehall_protocol::{Address, Content};
use tokio::sync::{mpsc, oneshot};

use crate::{Transport, TransportError};

type Reply = oneshot::Sender<Result<(), TransportError>>;

/// Work items for the queue worker.
enum Job {
    Send { content: Content, reply: Reply },
    Flush { reply: Reply },
}

/// Resolves once the corresponding queued item has been handled.
///
/// Dropping a receipt does not cancel the delivery.
#[derive(Debug)]
#[must_use = "a receipt does nothing unless awaited; drop it to fire and forget"]
pub struct Receipt {
    receiver: oneshot::Receiver<Result<(), TransportError>>,
}

impl Receipt {
    /// Waits for the delivery (or flush) to complete and returns its result.
    ///
    /// Returns [`TransportError::Shutdown`] if the worker stopped first.
    pub async fn wait(self) -> Result<(), TransportError> {
        self.receiver
            .await
            .unwrap_or(Err(TransportError::Shutdown))
    }
}

/// Ordered, paced outbound queue for one address.
pub struct DeliveryQueue {
    address: Address,
    transport: Arc<dyn Transport>,
    jobs: mpsc::UnboundedSender<Job>,
}

impl DeliveryQueue {
    /// Starts the worker task for `address` and returns its queue.
    ///
    /// Must be called inside a Tokio runtime. The worker stops once the
    /// queue is dropped and everything already enqueued was handled.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        address: Address,
        delay: Duration,
    ) -> Self {
        let (jobs, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(
            Arc::clone(&transport),
            address.clone(),
            delay,
            receiver,
        ));
        Self {
            address,
            transport,
            jobs,
        }
    }

    /// The address this queue delivers to.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Appends `content` to the queue.
    ///
    /// Enqueuing never waits; await the returned [`Receipt`] to learn when
    /// (and whether) the item was delivered.
    pub fn send(&self, content: Content) -> Receipt {
        let (reply, receiver) = oneshot::channel();
        if self.jobs.send(Job::Send { content, reply }).is_err() {
            tracing::warn!(address = %self.address, "delivery worker gone, dropping message");
        }
        Receipt { receiver }
    }

    /// Delivers `content` right away, outside the queue.
    pub async fn send_now(&self, content: &Content) -> Result<(), TransportError> {
        self.transport.deliver(&self.address, content).await
    }

    /// Returns a receipt that resolves once everything enqueued so far has
    /// been delivered.
    pub fn flush(&self) -> Receipt {
        let (reply, receiver) = oneshot::channel();
        let _ = self.jobs.send(Job::Flush { reply });
        Receipt { receiver }
    }
}

impl std::fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

async fn run_worker(
    transport: Arc<dyn Transport>,
    address: Address,
    delay: Duration,
    mut jobs: mpsc::UnboundedReceiver<Job>,
) {
    tracing::debug!(%address, "delivery queue started");

    while let Some(job) = jobs.recv().await {
        match job {
            Job::Send { content, reply } => {
                let result = transport.deliver(&address, &content).await;
                // A failed item must not jam the items behind it.
                if let Err(e) = &result {
                    tracing::warn!(%address, error = %e, "delivery failed");
                }
                let _ = reply.send(result);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Job::Flush { reply } => {
                let _ = reply.send(Ok(()));
            }
        }
    }

    tracing::debug!(%address, "delivery queue stopped");
}
