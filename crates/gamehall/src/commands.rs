//! The lobby command surface.
//!
//! Each method is one typed command, as issued by the chat adapter after it
//! parsed a participant's input and resolved their [`Profile`]. Commands
//! validate first and fail fast with a [`GamehallError`] before anything
//! is mutated or broadcast; the caller reports the error to the issuer.
//!
//! Raw text that is not a command goes to [`Lobby::receive`], which feeds
//! armed prompts first and otherwise treats `:`-prefixed lines as chat.

use std::sync::Arc;

use gamehall_protocol::{
    Address, ChannelId, Codec, Notice, PlayerId, Profile, RoomId, Seat, Seated, Transcript,
};
use gamehall_room::{
    GameOptions, Room, RoomError, RoomInfo, RoomOptions, RoomState, StartOutcome,
};
use gamehall_session::{Endpoint, Guest, Player};
use tokio::task::JoinHandle;

use crate::{GamehallError, Lobby};

/// Prefix that marks free text as room chat.
pub const CHAT_PREFIX: char = ':';

/// What a leave request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The player left; the room lives on.
    Left,
    /// The host handed the room to the player at `to` and left.
    Transferred { to: Seat },
    /// The room is gone (last player left, or the host chose to destroy).
    Destroyed,
    /// The host did not confirm a choice; nothing changed.
    Cancelled,
}

/// A leaving host's answer to the transfer prompt.
#[derive(Debug, PartialEq)]
enum HostChoice {
    Destroy,
    TransferTo(Seat),
}

impl HostChoice {
    /// `None` for anything that is not a seat number, so in-game replies
    /// and chat keep reaching their own listeners.
    fn parse(text: &str) -> Option<Self> {
        match text.parse::<Seat>().ok()? {
            Seat(0) => Some(Self::Destroy),
            seat => Some(Self::TransferTo(seat)),
        }
    }
}

impl Lobby {
    // -- Lookup helpers --

    /// The room `id` sits in, with their player endpoint.
    fn seated(&self, id: PlayerId) -> Result<(Arc<Room>, Arc<Player>), GamehallError> {
        let registry = self.registry();
        let player = registry.player(id).ok_or(RoomError::NotInRoom(id))?;
        let room = registry.room_of(id).ok_or(RoomError::NotInRoom(id))?;
        Ok((room, player))
    }

    /// Like [`seated`](Self::seated), but only for the room's host.
    fn hosted(&self, id: PlayerId) -> Result<(Arc<Room>, Arc<Player>), GamehallError> {
        let (room, player) = self.seated(id)?;
        if !room.is_host(id) {
            return Err(RoomError::NotHost(id).into());
        }
        Ok((room, player))
    }

    fn find_room(&self, id: &RoomId) -> Result<Arc<Room>, GamehallError> {
        Ok(self
            .registry()
            .room(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?)
    }

    fn ensure_free(&self, id: PlayerId) -> Result<(), GamehallError> {
        if let Some(room) = self.registry().room_of(id) {
            return Err(RoomError::AlreadyInRoom(id, room.id().clone()).into());
        }
        Ok(())
    }

    /// Tells a running game that `player` left. A game error terminates
    /// the game.
    async fn notify_game_leave(&self, room: &Room, player: &Arc<Player>) {
        if !room.state().is_playing() {
            return;
        }
        let Some(game) = room.game() else {
            return;
        };
        if let Err(e) = game.leave(player).await {
            tracing::info!(room_id = %room.id(), player_id = %player.id(), error = %e, "game ended by departure");
            let _ = room.terminate(e.to_string());
        }
    }

    // -- Membership --

    /// Opens a new room hosted by `profile`.
    pub fn create(
        &self,
        profile: Profile,
        mut options: RoomOptions,
    ) -> Result<RoomId, GamehallError> {
        self.ensure_free(profile.id)?;
        if options.capacity.is_none() {
            options.capacity = self.config().default_capacity;
        }
        let player = self.player_for(profile);
        let room = Room::open(self.registry(), player, options)?;
        Ok(room.id().clone())
    }

    /// Seats `profile` in room `id`.
    pub fn join(&self, profile: Profile, id: &RoomId) -> Result<Seat, GamehallError> {
        self.ensure_free(profile.id)?;
        let room = self.find_room(id)?;
        let player = self.player_for(profile);
        Ok(room.join(player)?)
    }

    /// Takes `id` out of their room.
    ///
    /// A host leaving a room with other players is first asked to pick a
    /// successor: a seat number transfers the room and `0` destroys it.
    /// A number that names no other player, or no answer in time, cancels.
    /// Other text passes by the prompt untouched.
    pub async fn leave(&self, id: PlayerId) -> Result<LeaveOutcome, GamehallError> {
        let (room, player) = self.seated(id)?;

        if !room.is_host(id) || room.size() == 1 {
            self.notify_game_leave(&room, &player).await;
            room.leave(id)?;
            return Ok(if room.state() == RoomState::Destroyed {
                LeaveOutcome::Destroyed
            } else {
                LeaveOutcome::Left
            });
        }

        let candidates: Vec<Seated> = room
            .info()
            .players
            .into_iter()
            .filter(|seated| Some(seated.seat) != player.seat())
            .collect();
        let _ = player.send(Notice::TransferPrompt { candidates });
        let choice = player
            .prompt(self.config().transfer_timeout, HostChoice::parse)
            .await;

        match choice {
            Some(HostChoice::Destroy) => {
                room.destroy()?;
                Ok(LeaveOutcome::Destroyed)
            }
            Some(HostChoice::TransferTo(seat)) => {
                if !room.is_host(id) {
                    return Ok(LeaveOutcome::Cancelled);
                }
                match room.transfer(seat, true) {
                    Ok(_) => {
                        self.notify_game_leave(&room, &player).await;
                        Ok(LeaveOutcome::Transferred { to: seat })
                    }
                    Err(RoomError::SeatsNotFound(_) | RoomError::TargetIsHost(_)) => {
                        Ok(LeaveOutcome::Cancelled)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            None => {
                tracing::debug!(room_id = %room.id(), player_id = %id, "leave cancelled");
                Ok(LeaveOutcome::Cancelled)
            }
        }
    }

    /// Removes the players at `seats`. Host only.
    ///
    /// Returns the names of the removed players.
    pub async fn kick(&self, host: PlayerId, seats: &[Seat]) -> Result<Vec<String>, GamehallError> {
        let (room, _) = self.hosted(host)?;
        let playing = room.state().is_playing();
        let kicked = room.kick(seats)?;
        if playing {
            if let Some(game) = room.game() {
                for player in &kicked {
                    if let Err(e) = game.leave(player).await {
                        let _ = room.terminate(e.to_string());
                        break;
                    }
                }
            }
        }
        Ok(kicked.iter().map(|p| p.name().to_string()).collect())
    }

    /// Hands host status to the player at `seat`. Host only.
    pub fn transfer(&self, host: PlayerId, seat: Seat) -> Result<(), GamehallError> {
        let (room, _) = self.hosted(host)?;
        room.transfer(seat, false)?;
        Ok(())
    }

    /// Destroys the host's room. Host only.
    pub fn destroy(&self, host: PlayerId) -> Result<(), GamehallError> {
        let (room, _) = self.hosted(host)?;
        room.destroy()?;
        Ok(())
    }

    /// Changes the host's room options. Host only.
    pub fn configure(&self, host: PlayerId, options: RoomOptions) -> Result<(), GamehallError> {
        let (room, _) = self.hosted(host)?;
        room.configure(options)?;
        Ok(())
    }

    // -- Games --

    /// Creates a game of type `name` and attaches it to the host's room.
    pub fn open_game(
        &self,
        host: PlayerId,
        name: &str,
        options: GameOptions,
    ) -> Result<(), GamehallError> {
        let (room, _) = self.hosted(host)?;
        let corridor = self
            .corridor(name)
            .ok_or_else(|| RoomError::UnknownGame(name.to_string()))?;
        let game = corridor
            .create(Arc::clone(&room), options)
            .map_err(RoomError::GameRejected)?;
        room.attach(game)?;
        Ok(())
    }

    /// Starts the attached game in the background. Host only.
    ///
    /// The readiness round needs the host's own input to flow through
    /// [`receive`](Self::receive) while it runs, so the game is driven by
    /// a spawned task; await the handle for the outcome. The room is
    /// claimed before this returns, so a second start fails right away.
    pub fn start(
        &self,
        host: PlayerId,
    ) -> Result<JoinHandle<Result<StartOutcome, RoomError>>, GamehallError> {
        let (room, _) = self.hosted(host)?;
        let claim = room.claim_start()?;
        tracing::info!(room_id = %room.id(), player_id = %host, "start requested");
        Ok(tokio::spawn(claim.run(self.config().ready_timeout)))
    }

    /// Aborts the running game. Host only.
    pub fn terminate(&self, host: PlayerId, reason: &str) -> Result<(), GamehallError> {
        let (room, _) = self.hosted(host)?;
        room.terminate(reason)?;
        Ok(())
    }

    // -- Input --

    /// Routes raw text from a seated player.
    ///
    /// Armed prompts see the text first. Otherwise a line starting with
    /// `:` is chat. Returns whether anything consumed the text.
    pub fn receive(&self, id: PlayerId, text: &str) -> Result<bool, GamehallError> {
        let (room, player) = self.seated(id)?;
        if player.receive(text) {
            return Ok(true);
        }
        match text.strip_prefix(CHAT_PREFIX) {
            Some(line) => {
                room.chat(&player, line)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Broadcasts a chat line from `id` to their room.
    pub fn chat(&self, id: PlayerId, text: &str) -> Result<(), GamehallError> {
        let (room, player) = self.seated(id)?;
        room.chat(&player, text)?;
        Ok(())
    }

    // -- Queries --

    /// The room `id` sits in.
    pub fn status(&self, id: PlayerId) -> Result<RoomInfo, GamehallError> {
        let (room, _) = self.seated(id)?;
        Ok(room.info())
    }

    /// Looks up a room by id, private or not.
    pub fn room(&self, id: &RoomId) -> Result<RoomInfo, GamehallError> {
        Ok(self.find_room(id)?.info())
    }

    /// Public rooms, by id.
    pub fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut rooms: Vec<RoomInfo> = self
            .registry()
            .rooms()
            .iter()
            .map(|room| room.info())
            .filter(|info| !info.private)
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// The message log of a room.
    pub fn transcript(&self, id: &RoomId) -> Result<Transcript, GamehallError> {
        Ok(self.find_room(id)?.transcript())
    }

    /// The message log of a room, encoded with `codec`.
    pub fn export(&self, id: &RoomId, codec: &impl Codec) -> Result<Vec<u8>, GamehallError> {
        Ok(codec.encode(&self.transcript(id)?)?)
    }

    // -- Guests --

    /// Makes `channel` observe room `id`, moving it from any room it
    /// watched before.
    pub fn watch(
        &self,
        channel: ChannelId,
        address: Address,
        id: &RoomId,
    ) -> Result<(), GamehallError> {
        let room = self.find_room(id)?;
        let guest = match self.registry().guest(&channel) {
            Some(guest) => {
                if let Some(previous) = guest.watching() {
                    if &previous == room.id() {
                        return Ok(());
                    }
                    if let Some(previous) = self.registry().room(&previous) {
                        previous.unwatch(&channel);
                    }
                }
                guest
            }
            None => Guest::new(
                channel,
                address,
                None,
                Arc::clone(&self.inner.transport),
                &self.config().session(),
            ),
        };
        room.watch(guest)?;
        Ok(())
    }

    /// Stops `channel` from observing its room. Returns `false` if it was
    /// not watching anything.
    pub fn unwatch(&self, channel: &ChannelId) -> bool {
        let Some(guest) = self.registry().guest(channel) else {
            return false;
        };
        guest
            .watching()
            .and_then(|id| self.registry().room(&id))
            .is_some_and(|room| room.unwatch(channel))
    }

    // -- Lifecycle --

    /// Destroys every room. Pending deliveries still drain.
    pub fn shutdown(&self) {
        let rooms = self.registry().rooms();
        tracing::info!(rooms = rooms.len(), "lobby shutting down");
        for room in rooms {
            if let Err(e) = room.destroy() {
                tracing::debug!(room_id = %room.id(), error = %e, "room already gone");
            }
        }
    }

    /// Flushes every seated player's queue.
    pub async fn flush(&self) {
        let players: Vec<Arc<Player>> = self
            .registry()
            .rooms()
            .iter()
            .flat_map(|room| room.players())
            .map(|(_, player)| player)
            .collect();
        for player in players {
            let _ = player.flush().wait().await;
        }
    }
}
