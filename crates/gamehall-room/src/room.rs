//! Rooms: membership, host control, and the game lifecycle.
//!
//! A room is shared state behind a short synchronous lock. Every
//! membership change (seat map, registry index, player back reference)
//! is committed inside one critical section, and the matching broadcast
//! is enqueued right after. No lock is ever held across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use gamehall_protocol::{ChannelId, Content, Notice, PlayerId, RoomId, Seat, Seated, Transcript};
use gamehall_session::{Endpoint, Guest, Membership, Player, collect};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::registry::Index;
use crate::{Broadcast, Game, GameError, Group, Registry, RoomError, RoomOptions, RoomState};

// ---------------------------------------------------------------------------
// Snapshots & outcomes
// ---------------------------------------------------------------------------

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInfo {
    pub id: RoomId,
    pub name: String,
    /// Display name of the host.
    pub host: String,
    pub state: RoomState,
    pub size: usize,
    pub capacity: Option<usize>,
    pub private: bool,
    /// Name of the attached game, if any.
    pub game: Option<String>,
    pub players: Vec<Seated>,
}

/// How a call to [`Room::start`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Somebody missed the readiness round; the game never ran.
    Cancelled { missing: Vec<String> },
    /// The game ran to completion.
    Finished,
    /// The game failed or was aborted.
    Terminated(String),
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

pub(crate) struct RoomInner {
    name: String,
    host: Arc<Player>,
    pub(crate) players: BTreeMap<Seat, Arc<Player>>,
    next_seat: Seat,
    options: RoomOptions,
    pub(crate) messages: Vec<Content>,
    allow_speech: bool,
    locked: bool,
    state: RoomState,
    pub(crate) guests: HashMap<ChannelId, Arc<Guest>>,
    game: Option<Arc<dyn Game>>,
    /// Present while a start holds the room; sending aborts it.
    abort: Option<oneshot::Sender<String>>,
}

impl RoomInner {
    fn seat_of(&self, id: PlayerId) -> Option<Seat> {
        self.players
            .iter()
            .find(|(_, player)| player.id() == id)
            .map(|(seat, _)| *seat)
    }

    /// Checks that `seats` all name non-host players of this room.
    fn resolve_targets(&self, seats: &[Seat]) -> Result<Vec<(Seat, Arc<Player>)>, RoomError> {
        if seats.is_empty() {
            return Err(RoomError::NoTargets);
        }
        let mut unique = seats.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let missing: Vec<Seat> = unique
            .iter()
            .copied()
            .filter(|seat| !self.players.contains_key(seat))
            .collect();
        if !missing.is_empty() {
            return Err(RoomError::SeatsNotFound(missing));
        }

        let host = self.host.id();
        let mut targets = Vec::with_capacity(unique.len());
        for seat in unique {
            let player = Arc::clone(&self.players[&seat]);
            if player.id() == host {
                return Err(RoomError::TargetIsHost(seat));
            }
            targets.push((seat, player));
        }
        Ok(targets)
    }
}

/// A group of players sharing a host, a message log, and at most one game.
pub struct Room {
    id: RoomId,
    registry: Weak<Registry>,
    inner: Mutex<RoomInner>,
}

impl Room {
    /// Creates a room with `host` as its only player, at seat 1.
    ///
    /// Fails with [`RoomError::AlreadyInRoom`] if the host already sits in
    /// a room.
    pub fn open(
        registry: &Arc<Registry>,
        host: Arc<Player>,
        options: RoomOptions,
    ) -> Result<Arc<Room>, RoomError> {
        let room = {
            let mut index = registry.lock();
            if let Some(current) = index.players.get(&host.id()).and_then(|p| p.room()) {
                return Err(RoomError::AlreadyInRoom(host.id(), current));
            }

            let id = registry.allocate_id(&index);
            let name = options.name.clone().unwrap_or_else(|| id.to_string());
            let seat = Seat::FIRST;
            let room = Arc::new(Room {
                id: id.clone(),
                registry: Arc::downgrade(registry),
                inner: Mutex::new(RoomInner {
                    name,
                    host: Arc::clone(&host),
                    players: BTreeMap::from([(seat, Arc::clone(&host))]),
                    next_seat: seat.next(),
                    options,
                    messages: Vec::new(),
                    allow_speech: true,
                    locked: false,
                    state: RoomState::Waiting,
                    guests: HashMap::new(),
                    game: None,
                    abort: None,
                }),
            });
            index.rooms.insert(id.clone(), Arc::clone(&room));
            index.players.insert(host.id(), Arc::clone(&host));
            host.set_membership(Some(Membership { room: id, seat }));
            room
        };

        tracing::info!(room_id = %room.id, player_id = %host.id(), "room created");
        room.group().broadcast(Notice::Joined {
            target: host.name().to_string(),
        });
        Ok(room)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, RoomInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&mut RoomInner) -> R) -> R {
        f(&mut self.lock())
    }

    fn registry(&self) -> Result<Arc<Registry>, RoomError> {
        self.registry
            .upgrade()
            .ok_or_else(|| RoomError::NotFound(self.id.clone()))
    }

    fn ensure_live(&self, inner: &RoomInner) -> Result<(), RoomError> {
        if inner.state == RoomState::Destroyed {
            return Err(RoomError::NotFound(self.id.clone()));
        }
        Ok(())
    }

    // -- Accessors --

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn host(&self) -> Arc<Player> {
        Arc::clone(&self.lock().host)
    }

    /// Whether `id` is the host.
    pub fn is_host(&self, id: PlayerId) -> bool {
        self.lock().host.id() == id
    }

    pub fn size(&self) -> usize {
        self.lock().players.len()
    }

    /// Seated players, by seat.
    pub fn players(&self) -> Vec<(Seat, Arc<Player>)> {
        self.lock()
            .players
            .iter()
            .map(|(seat, player)| (*seat, Arc::clone(player)))
            .collect()
    }

    pub fn player(&self, seat: Seat) -> Option<Arc<Player>> {
        self.lock().players.get(&seat).cloned()
    }

    pub fn seat_of(&self, id: PlayerId) -> Option<Seat> {
        self.lock().seat_of(id)
    }

    pub fn state(&self) -> RoomState {
        self.lock().state
    }

    pub fn options(&self) -> RoomOptions {
        self.lock().options.clone()
    }

    pub fn allows_speech(&self) -> bool {
        self.lock().allow_speech
    }

    pub fn is_locked(&self) -> bool {
        self.lock().locked
    }

    /// Every logged broadcast, oldest first.
    pub fn messages(&self) -> Vec<Content> {
        self.lock().messages.clone()
    }

    /// The message log, ready to be encoded.
    pub fn transcript(&self) -> Transcript {
        Transcript {
            room: self.id.clone(),
            entries: self.messages(),
        }
    }

    /// The attached game.
    pub fn game(&self) -> Option<Arc<dyn Game>> {
        self.lock().game.clone()
    }

    /// Guests watching this room.
    pub fn guests(&self) -> Vec<Arc<Guest>> {
        self.lock().guests.values().cloned().collect()
    }

    pub fn info(&self) -> RoomInfo {
        let inner = self.lock();
        RoomInfo {
            id: self.id.clone(),
            name: inner.name.clone(),
            host: inner.host.name().to_string(),
            state: inner.state,
            size: inner.players.len(),
            capacity: inner.options.capacity,
            private: inner.options.private,
            game: inner.game.as_ref().map(|game| game.name().to_string()),
            players: inner
                .players
                .iter()
                .map(|(seat, player)| Seated {
                    seat: *seat,
                    name: player.name().to_string(),
                })
                .collect(),
        }
    }

    // -- Broadcasting --

    /// Everyone in the room, guests included.
    pub fn group(&self) -> Group<'_> {
        Group::everyone(self)
    }

    /// Shorthand for `self.group().broadcast(content)`.
    pub fn broadcast(&self, content: impl Into<Content>) -> Broadcast {
        self.group().broadcast(content)
    }

    // -- Membership --

    /// Seats `player` at the next free seat number.
    ///
    /// Fails if the player already sits somewhere, or if the room is
    /// starting, playing, locked, or full.
    pub fn join(&self, player: Arc<Player>) -> Result<Seat, RoomError> {
        let registry = self.registry()?;
        let seat = {
            let mut index = registry.lock();
            let mut inner = self.lock();
            self.ensure_live(&inner)?;
            if let Some(current) = index.players.get(&player.id()).and_then(|p| p.room()) {
                return Err(RoomError::AlreadyInRoom(player.id(), current));
            }
            if !inner.state.is_joinable() || inner.locked {
                return Err(RoomError::InvalidState(format!(
                    "room {} is {}",
                    self.id, inner.state
                )));
            }
            if !inner.options.has_room_for_one_more(inner.players.len()) {
                return Err(RoomError::RoomFull(self.id.clone()));
            }

            let seat = inner.next_seat;
            inner.next_seat = seat.next();
            inner.players.insert(seat, Arc::clone(&player));
            index.players.insert(player.id(), Arc::clone(&player));
            player.set_membership(Some(Membership {
                room: self.id.clone(),
                seat,
            }));
            seat
        };

        tracing::info!(room_id = %self.id, player_id = %player.id(), %seat, "player joined");
        self.broadcast(Notice::Joined {
            target: player.name().to_string(),
        });
        Ok(seat)
    }

    /// Removes `id` from the room.
    ///
    /// If that empties the room, it is destroyed in the same step and
    /// nothing is broadcast. The host is not reassigned; callers move host
    /// status first with [`transfer`](Self::transfer).
    pub fn leave(&self, id: PlayerId) -> Result<Arc<Player>, RoomError> {
        let registry = self.registry()?;
        let (player, emptied) = {
            let mut index = registry.lock();
            let mut inner = self.lock();
            self.ensure_live(&inner)?;
            let seat = inner.seat_of(id).ok_or(RoomError::NotInRoom(id))?;
            let player = self
                .unseat(&mut index, &mut inner, seat)
                .ok_or(RoomError::NotInRoom(id))?;
            let emptied = inner.players.is_empty();
            if emptied {
                self.teardown(&mut index, &mut inner);
            }
            (player, emptied)
        };

        tracing::info!(room_id = %self.id, player_id = %id, "player left");
        if emptied {
            tracing::info!(room_id = %self.id, "room destroyed (empty)");
        } else {
            self.broadcast(Notice::Left {
                target: player.name().to_string(),
            });
        }
        Ok(player)
    }

    /// Removes the players at `seats` on behalf of the host.
    ///
    /// Either every seat names a current non-host player and all of them
    /// are removed, or nothing changes. Each removed player is told in
    /// private; the room gets one notice naming all of them.
    pub fn kick(&self, seats: &[Seat]) -> Result<Vec<Arc<Player>>, RoomError> {
        let registry = self.registry()?;
        let (kicked, host) = {
            let mut index = registry.lock();
            let mut inner = self.lock();
            self.ensure_live(&inner)?;
            let targets = inner.resolve_targets(seats)?;
            let kicked: Vec<Arc<Player>> = targets
                .into_iter()
                .filter_map(|(seat, _)| self.unseat(&mut index, &mut inner, seat))
                .collect();
            (kicked, inner.host.name().to_string())
        };

        for player in &kicked {
            tracing::info!(room_id = %self.id, player_id = %player.id(), "player kicked");
            let _ = player.send(Notice::KickedYou {
                room: self.id.clone(),
                source: host.clone(),
            });
        }
        self.broadcast(Notice::Kicked {
            targets: kicked.iter().map(|p| p.name().to_string()).collect(),
            source: host,
        });
        Ok(kicked)
    }

    /// Makes the player at `seat` the host.
    ///
    /// With `also_leave`, the previous host leaves the room in the same
    /// step. Either way the room gets a single notice.
    pub fn transfer(&self, seat: Seat, also_leave: bool) -> Result<Arc<Player>, RoomError> {
        let registry = self.registry()?;
        let (source, target) = {
            let mut index = registry.lock();
            let mut inner = self.lock();
            self.ensure_live(&inner)?;
            let (_, target) = inner
                .resolve_targets(&[seat])?
                .pop()
                .ok_or(RoomError::NoTargets)?;
            let source = std::mem::replace(&mut inner.host, Arc::clone(&target));
            if also_leave {
                if let Some(old_seat) = inner.seat_of(source.id()) {
                    self.unseat(&mut index, &mut inner, old_seat);
                }
            }
            (source, target)
        };

        tracing::info!(
            room_id = %self.id,
            from = %source.id(),
            to = %target.id(),
            also_leave,
            "host transferred"
        );
        let (target_name, source_name) = (target.name().to_string(), source.name().to_string());
        self.broadcast(if also_leave {
            Notice::LeftTransfer {
                target: target_name,
                source: source_name,
            }
        } else {
            Notice::Transferred {
                target: target_name,
                source: source_name,
            }
        });
        Ok(target)
    }

    /// Announces the end of the room, then removes it and every member
    /// from the registry. A running game is aborted.
    ///
    /// Only the first of several racing calls succeeds and broadcasts.
    pub fn destroy(&self) -> Result<(), RoomError> {
        let registry = self.registry()?;
        {
            let mut inner = self.lock();
            self.ensure_live(&inner)?;
            // Seats stay until the notice is out; everything else now fails.
            inner.state = RoomState::Destroyed;
            inner.locked = true;
        }
        self.broadcast(Notice::Destroyed {
            room: self.id.clone(),
        });
        {
            let mut index = registry.lock();
            let mut inner = self.lock();
            let seats: Vec<Seat> = inner.players.keys().copied().collect();
            for seat in seats {
                self.unseat(&mut index, &mut inner, seat);
            }
            self.teardown(&mut index, &mut inner);
        }
        tracing::info!(room_id = %self.id, "room destroyed");
        Ok(())
    }

    /// Removes the player at `seat` from the room and the index.
    fn unseat(&self, index: &mut Index, inner: &mut RoomInner, seat: Seat) -> Option<Arc<Player>> {
        let player = inner.players.remove(&seat)?;
        index.players.remove(&player.id());
        player.set_membership(None);
        Some(player)
    }

    /// Marks the room destroyed and drops everything it owns.
    fn teardown(&self, index: &mut Index, inner: &mut RoomInner) {
        inner.state = RoomState::Destroyed;
        inner.locked = true;
        index.rooms.remove(&self.id);
        for (channel, guest) in inner.guests.drain() {
            index.guests.remove(&channel);
            guest.set_watching(None);
        }
        if let Some(abort) = inner.abort.take() {
            let _ = abort.send("room destroyed".to_string());
        }
        inner.game = None;
    }

    // -- Settings & chat --

    /// Applies new options. Capacity may not drop below the current size.
    pub fn configure(&self, options: RoomOptions) -> Result<(), RoomError> {
        let mut inner = self.lock();
        self.ensure_live(&inner)?;
        if let Some(capacity) = options.capacity {
            if capacity < inner.players.len() {
                return Err(RoomError::InvalidOption(format!(
                    "capacity {capacity} is below the current size {}",
                    inner.players.len()
                )));
            }
        }
        if let Some(name) = &options.name {
            inner.name = name.clone();
        }
        inner.options = options;
        tracing::debug!(room_id = %self.id, options = ?inner.options, "room configured");
        Ok(())
    }

    /// Broadcasts a chat line from `player`. Empty lines are ignored.
    pub fn chat(&self, player: &Player, text: &str) -> Result<(), RoomError> {
        {
            let inner = self.lock();
            self.ensure_live(&inner)?;
            if !inner.allow_speech {
                return Err(RoomError::SpeechDisabled);
            }
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.broadcast(Notice::Chat {
            source: player.name().to_string(),
            content: text.to_string(),
        });
        Ok(())
    }

    // -- Guests --

    /// Adds `guest` as an observer.
    ///
    /// A guest watches one room at a time; callers unwatch the previous
    /// room first.
    pub fn watch(&self, guest: Arc<Guest>) -> Result<(), RoomError> {
        let registry = self.registry()?;
        let mut index = registry.lock();
        let mut inner = self.lock();
        self.ensure_live(&inner)?;
        if let Some(current) = guest.watching() {
            if current != self.id {
                return Err(RoomError::InvalidState(format!(
                    "channel {} already watches room {current}",
                    guest.channel()
                )));
            }
        }
        guest.set_watching(Some(self.id.clone()));
        index
            .guests
            .insert(guest.channel().clone(), Arc::clone(&guest));
        inner.guests.insert(guest.channel().clone(), guest);
        Ok(())
    }

    /// Removes an observer. Returns `false` if it was not watching.
    pub fn unwatch(&self, channel: &ChannelId) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut index = registry.lock();
        let mut inner = self.lock();
        match inner.guests.remove(channel) {
            Some(guest) => {
                index.guests.remove(channel);
                guest.set_watching(None);
                true
            }
            None => false,
        }
    }

    // -- Game lifecycle --

    /// Attaches `game`, replacing any previous one.
    ///
    /// Only allowed while the room is waiting.
    pub fn attach(&self, game: Arc<dyn Game>) -> Result<(), RoomError> {
        let name = game.name().to_string();
        {
            let mut inner = self.lock();
            self.ensure_live(&inner)?;
            if !inner.state.is_joinable() {
                return Err(RoomError::InvalidState(format!(
                    "cannot attach a game while {}",
                    inner.state
                )));
            }
            inner.game = Some(game);
        }
        tracing::info!(room_id = %self.id, game = %name, "game attached");
        self.broadcast(Notice::GameAttached { game: name });
        Ok(())
    }

    /// Claims the room for one game start.
    ///
    /// The room moves to [`RoomState::Starting`] before this returns, so
    /// joins, a second start, and attaching another game are refused until
    /// the claim has run or is dropped. Dropping the claim at any point
    /// puts the room back to waiting.
    pub fn claim_start(self: &Arc<Self>) -> Result<StartClaim, RoomError> {
        let (game, aborted) = {
            let mut inner = self.lock();
            self.ensure_live(&inner)?;
            if !inner.state.can_transition_to(RoomState::Starting) {
                return Err(RoomError::InvalidState(format!(
                    "room {} is {}",
                    self.id, inner.state
                )));
            }
            let game = inner.game.clone().ok_or(RoomError::NoGame)?;
            let (abort, aborted) = oneshot::channel();
            inner.state = RoomState::Starting;
            inner.locked = true;
            inner.abort = Some(abort);
            (game, aborted)
        };
        tracing::debug!(room_id = %self.id, game = %game.name(), "start claimed");
        Ok(StartClaim {
            room: Arc::clone(self),
            game,
            aborted,
        })
    }

    /// Claims the room and runs the attached game; see [`StartClaim::run`].
    pub async fn start(self: &Arc<Self>, ready_timeout: Duration) -> Result<StartOutcome, RoomError> {
        self.claim_start()?.run(ready_timeout).await
    }

    /// Aborts the readiness round or the running game; the start reports
    /// it as terminated with `reason`.
    pub fn terminate(&self, reason: impl Into<String>) -> Result<(), RoomError> {
        let abort = self
            .lock()
            .abort
            .take()
            .ok_or_else(|| RoomError::InvalidState("no game is starting or running".to_string()))?;
        let _ = abort.send(reason.into());
        Ok(())
    }

    /// Announces how a game run ended.
    fn game_ended(&self, game: String, result: Result<(), GameError>) -> StartOutcome {
        match result {
            Ok(()) => {
                tracing::info!(room_id = %self.id, %game, "game finished");
                self.broadcast(Notice::GameFinished { game });
                StartOutcome::Finished
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(room_id = %self.id, %game, %reason, "game terminated");
                self.broadcast(Notice::GameTerminated {
                    game,
                    reason: reason.clone(),
                });
                StartOutcome::Terminated(reason)
            }
        }
    }
}

fn aborted(reason: Result<String, oneshot::error::RecvError>) -> GameError {
    GameError::Aborted(reason.unwrap_or_else(|_| "aborted".to_string()))
}

// ---------------------------------------------------------------------------
// StartClaim
// ---------------------------------------------------------------------------

/// A room held for one game start, from [`Room::claim_start`].
///
/// Dropping it, finished or not, returns the room to waiting.
pub struct StartClaim {
    room: Arc<Room>,
    game: Arc<dyn Game>,
    aborted: oneshot::Receiver<String>,
}

impl StartClaim {
    /// The claimed room.
    pub fn room(&self) -> &Arc<Room> {
        &self.room
    }

    /// Runs the start.
    ///
    /// 1. The game validates the room; a rejection is returned as an error
    ///    and nothing is broadcast.
    /// 2. Every seated player must reply to a readiness round within
    ///    `ready_timeout`; if anyone does not, the start is cancelled and
    ///    the game never runs. Nobody can join meanwhile.
    /// 3. Open chat is disabled while the game runs. Game failures and
    ///    aborts are announced to the room, not returned.
    pub async fn run(mut self, ready_timeout: Duration) -> Result<StartOutcome, RoomError> {
        let room = Arc::clone(&self.room);
        let game = Arc::clone(&self.game);
        game.validate().await.map_err(RoomError::GameRejected)?;

        let name = game.name().to_string();
        let players: Vec<Arc<Player>> = room.players().into_iter().map(|(_, p)| p).collect();
        tracing::info!(room_id = %room.id, game = %name, players = players.len(), "readiness round");
        room.broadcast(Notice::ReadyCheck {
            game: name.clone(),
            timeout_secs: ready_timeout.as_secs(),
        });
        let readiness = collect(&players, ready_timeout, None, |text| {
            (!text.trim().is_empty()).then_some(())
        });
        let answers = tokio::select! {
            answers = readiness => answers,
            reason = &mut self.aborted => return Ok(room.game_ended(name, Err(aborted(reason)))),
        };

        let missing: Vec<String> = answers
            .iter()
            .filter(|(_, answer)| answer.is_none())
            .map(|(player, _)| player.name().to_string())
            .collect();
        if !missing.is_empty() {
            tracing::info!(room_id = %room.id, ?missing, "start cancelled");
            room.broadcast(Notice::StartCancelled {
                missing: missing.clone(),
            });
            return Ok(StartOutcome::Cancelled { missing });
        }

        {
            let mut inner = room.lock();
            room.ensure_live(&inner)?;
            if !inner.state.can_transition_to(RoomState::Playing) {
                return Err(RoomError::InvalidState(format!(
                    "room {} is {}",
                    room.id, inner.state
                )));
            }
            inner.state = RoomState::Playing;
            inner.allow_speech = false;
        }

        tracing::info!(room_id = %room.id, game = %name, "game started");
        room.broadcast(Notice::GameStarted { game: name.clone() });

        let result = tokio::select! {
            result = game.start() => result,
            reason = &mut self.aborted => Err(aborted(reason)),
        };
        Ok(room.game_ended(name, result))
    }
}

impl Drop for StartClaim {
    fn drop(&mut self) {
        let mut inner = self.room.lock();
        inner.abort = None;
        if inner.state.is_busy() {
            inner.state = RoomState::Waiting;
            inner.allow_speech = true;
            inner.locked = false;
        }
    }
}

impl std::fmt::Debug for StartClaim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartClaim")
            .field("room", &self.room.id)
            .field("game", &self.game.name())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Room")
            .field("id", &self.id)
            .field("name", &inner.name)
            .field("host", &inner.host.id())
            .field("size", &inner.players.len())
            .field("state", &inner.state)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room {}", self.id)
    }
}
