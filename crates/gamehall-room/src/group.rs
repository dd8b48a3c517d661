//! Broadcast views over a room's players.

use std::sync::Arc;

use futures_util::future::join_all;
use gamehall_protocol::Content;
use gamehall_session::{Endpoint, Player};
use gamehall_transport::{Receipt, TransportError};

use crate::Room;

type Predicate = Arc<dyn Fn(&Player) -> bool + Send + Sync>;

/// A subset of a room's players, defined by a predicate.
///
/// Groups hold no member list: the predicate is re-evaluated against the
/// live players on every broadcast, so a player who left in between is
/// never reached. The room-wide group ([`Room::group`]) also reaches the
/// room's guests; filtered groups reach players only.
///
/// Predicates run while the room is locked and must not call back into
/// the room.
#[derive(Clone)]
pub struct Group<'a> {
    room: &'a Room,
    predicate: Predicate,
    silent: bool,
    guests: bool,
}

impl<'a> Group<'a> {
    pub(crate) fn everyone(room: &'a Room) -> Self {
        Self {
            room,
            predicate: Arc::new(|_| true),
            silent: false,
            guests: true,
        }
    }

    /// A child group of the members that also satisfy `predicate`.
    pub fn filter(&self, predicate: impl Fn(&Player) -> bool + Send + Sync + 'static) -> Self {
        let parent = Arc::clone(&self.predicate);
        Self {
            room: self.room,
            predicate: Arc::new(move |player| parent(player) && predicate(player)),
            silent: self.silent,
            guests: false,
        }
    }

    /// The same group, but broadcasts skip the room's message log.
    pub fn silent(&self) -> Self {
        Self {
            silent: true,
            ..self.clone()
        }
    }

    /// The players currently in the group, by seat.
    pub fn members(&self) -> Vec<Arc<Player>> {
        self.room.with_inner(|inner| {
            inner
                .players
                .values()
                .filter(|player| (self.predicate)(player))
                .cloned()
                .collect()
        })
    }

    /// Enqueues `content` to every member.
    ///
    /// Unless the group is silent, exactly one entry is appended to the
    /// room log. Enqueueing happens before this returns; await
    /// [`Broadcast::delivered`] to wait for the deliveries themselves.
    pub fn broadcast(&self, content: impl Into<Content>) -> Broadcast {
        let content = content.into();
        let receipts = self.room.with_inner(|inner| {
            if !self.silent {
                inner.messages.push(content.clone());
            }
            let players = inner
                .players
                .values()
                .filter(|player| (self.predicate)(player))
                .map(|player| player.send(content.clone()));
            let guests = inner
                .guests
                .values()
                .filter(|_| self.guests)
                .map(|guest| guest.send(content.clone()));
            players.chain(guests).collect::<Vec<_>>()
        });
        tracing::debug!(
            room_id = %self.room.id(),
            recipients = receipts.len(),
            silent = self.silent,
            "broadcast"
        );
        Broadcast { receipts }
    }
}

impl std::fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("room", self.room.id())
            .field("silent", &self.silent)
            .field("guests", &self.guests)
            .finish_non_exhaustive()
    }
}

/// The pending deliveries of one broadcast.
///
/// Dropping it does not cancel anything.
#[derive(Debug)]
pub struct Broadcast {
    receipts: Vec<Receipt>,
}

impl Broadcast {
    /// How many participants the broadcast was enqueued to.
    pub fn recipients(&self) -> usize {
        self.receipts.len()
    }

    /// Waits for every delivery, concurrently. Returns the failures.
    pub async fn delivered(self) -> Vec<TransportError> {
        join_all(self.receipts.into_iter().map(Receipt::wait))
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }
}
