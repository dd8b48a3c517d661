//! Players: seated participants with routed input.
//!
//! A player is created by the lobby from a resolved [`Profile`] and is
//! seated in at most one room at a time. The room writes the player's
//! [`Membership`] on join and clears it on leave; the player itself never
//! changes it. That back reference is a plain `RoomId` + `Seat` pair, not
//! an owning pointer, so players and rooms never keep each other alive.
//!
//! Inbound text reaches a player through [`Player::receive`], which offers
//! it to armed listeners, newest first, until one consumes it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gamehall_protocol::{Address, PlayerId, Profile, RoomId, Seat};
use gamehall_transport::{DeliveryQueue, Transport};

use crate::{Endpoint, SessionConfig};

/// Handle for an armed listener, used to disarm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Where a player currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room: RoomId,
    pub seat: Seat,
}

type Handler = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Armed input listeners for one player.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(ListenerId, Handler)>>,
}

impl Listeners {
    fn lock(&self) -> MutexGuard<'_, Vec<(ListenerId, Handler)>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add(&self, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, handler));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(armed, _)| *armed != id);
        handlers.len() != before
    }

    fn snapshot(&self) -> Vec<Handler> {
        self.lock()
            .iter()
            .rev()
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// A participant who can be seated in a room.
pub struct Player {
    profile: Profile,
    queue: DeliveryQueue,
    pub(crate) listeners: Arc<Listeners>,
    membership: Mutex<Option<Membership>>,
}

impl Player {
    /// Creates a player and starts its delivery queue.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        profile: Profile,
        transport: Arc<dyn Transport>,
        config: &SessionConfig,
    ) -> Arc<Self> {
        let queue = DeliveryQueue::spawn(
            transport,
            profile.address.clone(),
            config.message_delay,
        );
        Arc::new(Self {
            profile,
            queue,
            listeners: Arc::new(Listeners::default()),
            membership: Mutex::new(None),
        })
    }

    // -- Identity --

    pub fn id(&self) -> PlayerId {
        self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn locale(&self) -> Option<&str> {
        self.profile.locale.as_deref()
    }

    pub fn address(&self) -> &Address {
        &self.profile.address
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    // -- Membership (back reference, written by the room) --

    /// The room and seat this player occupies, if any.
    pub fn membership(&self) -> Option<Membership> {
        self.membership
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The room this player sits in.
    pub fn room(&self) -> Option<RoomId> {
        self.membership().map(|m| m.room)
    }

    /// This player's seat number in their room.
    pub fn seat(&self) -> Option<Seat> {
        self.membership().map(|m| m.seat)
    }

    /// Sets or clears the back reference. Only rooms call this.
    pub fn set_membership(&self, membership: Option<Membership>) {
        *self.membership.lock().unwrap_or_else(PoisonError::into_inner) = membership;
    }

    // -- Input routing --

    /// Arms a listener. `handler` returns `true` when it consumed the text.
    pub fn listen(
        &self,
        handler: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.add(Arc::new(handler))
    }

    /// Disarms a listener. Returns `false` if it was not armed.
    pub fn unlisten(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of armed listeners.
    pub fn listening(&self) -> usize {
        self.listeners.len()
    }

    /// Offers inbound text to armed listeners, newest first.
    ///
    /// Returns `true` if some listener consumed it. Handlers run outside
    /// the listener lock, so they may arm or disarm listeners themselves.
    pub fn receive(&self, text: &str) -> bool {
        for handler in self.listeners.snapshot() {
            if handler(text) {
                tracing::debug!(player_id = %self.id(), "input consumed by listener");
                return true;
            }
        }
        false
    }
}

impl Endpoint for Player {
    fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.profile.id)
            .field("name", &self.profile.name)
            .field("membership", &self.membership())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.profile.name)
    }
}
