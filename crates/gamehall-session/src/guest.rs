//! Guest channels: observers that receive a room's broadcasts.

use std::sync::{Arc, Mutex, PoisonError};

use gamehall_protocol::{Address, ChannelId, RoomId};
use gamehall_transport::{DeliveryQueue, Transport};

use crate::{Endpoint, SessionConfig};

/// A channel bound to the lobby, optionally watching one room.
#[derive(Debug)]
pub struct Guest {
    channel: ChannelId,
    locale: Option<String>,
    queue: DeliveryQueue,
    watching: Mutex<Option<RoomId>>,
}

impl Guest {
    /// Creates a guest and starts its delivery queue.
    pub fn new(
        channel: ChannelId,
        address: Address,
        locale: Option<String>,
        transport: Arc<dyn Transport>,
        config: &SessionConfig,
    ) -> Arc<Self> {
        let queue = DeliveryQueue::spawn(transport, address, config.message_delay);
        Arc::new(Self {
            channel,
            locale,
            queue,
            watching: Mutex::new(None),
        })
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// The room this guest currently observes.
    pub fn watching(&self) -> Option<RoomId> {
        self.watching
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Updates the watched room. Written by the room only.
    pub fn set_watching(&self, room: Option<RoomId>) {
        *self.watching.lock().unwrap_or_else(PoisonError::into_inner) = room;
    }
}

impl Endpoint for Guest {
    fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }
}
