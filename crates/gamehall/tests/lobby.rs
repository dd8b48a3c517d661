//! Integration tests for the lobby command surface, end to end.
//!
//! Every test drives the lobby the way a chat adapter would: typed
//! commands plus raw text through `Lobby::receive`, with a
//! `LocalTransport` recording what participants were sent. Time is paused
//! so readiness and transfer deadlines are deterministic.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gamehall::prelude::*;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

// =========================================================================
// Test game: counts starts, optionally hangs until terminated
// =========================================================================

#[derive(Default, Deserialize)]
struct CountingOptions {
    #[serde(default)]
    hang: bool,
}

#[derive(Default)]
struct CountingCorridor {
    starts: Arc<AtomicUsize>,
}

impl Corridor for CountingCorridor {
    fn name(&self) -> &str {
        "counting"
    }

    fn create(&self, room: Arc<Room>, options: GameOptions) -> Result<Arc<dyn Game>, GameError> {
        let options: CountingOptions = options.parse()?;
        Ok(Arc::new(CountingGame {
            room,
            hang: options.hang,
            starts: Arc::clone(&self.starts),
        }))
    }
}

struct CountingGame {
    room: Arc<Room>,
    hang: bool,
    starts: Arc<AtomicUsize>,
}

#[async_trait]
impl Game for CountingGame {
    fn name(&self) -> &str {
        "counting"
    }

    async fn validate(&self) -> Result<(), GameError> {
        if self.room.size() < 2 {
            return Err(GameError::Rejected("needs two players".into()));
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), GameError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.room
            .broadcast(Content::game("counting.players", [self.room.size()]));
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn leave(&self, player: &Arc<Player>) -> Result<(), GameError> {
        Err(GameError::PlayerLeft(player.name().to_string()))
    }
}

// =========================================================================
// Helpers
// =========================================================================

struct Fixture {
    lobby: Lobby,
    deliveries: UnboundedReceiver<Delivery>,
    starts: Arc<AtomicUsize>,
}

fn fixture() -> Fixture {
    let (transport, deliveries) = LocalTransport::new();
    let corridor = CountingCorridor::default();
    let starts = Arc::clone(&corridor.starts);
    let lobby = Lobby::builder()
        .config(LobbyConfig {
            message_delay: Duration::ZERO,
            ready_timeout: Duration::from_secs(5),
            transfer_timeout: Duration::from_secs(30),
            ..LobbyConfig::default()
        })
        .corridor(corridor)
        .build(transport);
    Fixture {
        lobby,
        deliveries,
        starts,
    }
}

fn profile(id: u64, name: &str) -> Profile {
    Profile::new(PlayerId(id), name, Address::private("test", name))
}

/// Alice hosts; bob and carol join, in that order.
fn three_player_room(lobby: &Lobby) -> RoomId {
    let room = lobby.create(profile(1, "alice"), RoomOptions::default()).unwrap();
    lobby.join(profile(2, "bob"), &room).unwrap();
    lobby.join(profile(3, "carol"), &room).unwrap();
    room
}

/// Sends `text` as player `id` after `after`.
fn say_later(lobby: &Lobby, id: u64, after: Duration, text: &'static str) {
    let lobby = lobby.clone();
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        let _ = lobby.receive(PlayerId(id), text);
    });
}

fn notices(lobby: &Lobby, room: &RoomId) -> Vec<Notice> {
    lobby
        .transcript(room)
        .unwrap()
        .entries
        .iter()
        .filter_map(|content| content.as_notice().cloned())
        .collect()
}

fn drain(rx: &mut UnboundedReceiver<Delivery>) -> Vec<Delivery> {
    let mut seen = Vec::new();
    while let Ok(delivery) = rx.try_recv() {
        seen.push(delivery);
    }
    seen
}

// =========================================================================
// Create & join
// =========================================================================

#[tokio::test]
async fn test_capacity_two_rejects_third_player() {
    let f = fixture();
    let room = f
        .lobby
        .create(profile(1, "alice"), RoomOptions::default().with_capacity(2))
        .unwrap();

    assert_eq!(f.lobby.join(profile(2, "bob"), &room).unwrap(), Seat(2));
    assert_eq!(f.lobby.room(&room).unwrap().size, 2);

    let err = f.lobby.join(profile(3, "carol"), &room).unwrap_err();
    assert!(matches!(err, GamehallError::Room(RoomError::RoomFull(_))));
    assert_eq!(f.lobby.room(&room).unwrap().size, 2);
}

#[tokio::test]
async fn test_one_room_at_a_time() {
    let f = fixture();
    let room = f.lobby.create(profile(1, "alice"), RoomOptions::default()).unwrap();
    let other = f.lobby.create(profile(2, "bob"), RoomOptions::default()).unwrap();
    assert_ne!(room, other);

    assert!(matches!(
        f.lobby.create(profile(1, "alice"), RoomOptions::default()),
        Err(GamehallError::Room(RoomError::AlreadyInRoom(PlayerId(1), _)))
    ));
    assert!(matches!(
        f.lobby.join(profile(1, "alice"), &other),
        Err(GamehallError::Room(RoomError::AlreadyInRoom(PlayerId(1), _)))
    ));
}

#[tokio::test]
async fn test_join_unknown_room() {
    let f = fixture();
    assert!(matches!(
        f.lobby.join(profile(1, "alice"), &RoomId::from("999999")),
        Err(GamehallError::Room(RoomError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_default_capacity_applies_when_unset() {
    let (transport, _rx) = LocalTransport::new();
    let lobby = Lobby::builder()
        .config(LobbyConfig {
            default_capacity: Some(3),
            room_id_len: 4,
            ..LobbyConfig::default()
        })
        .build(transport);

    let room = lobby.create(profile(1, "alice"), RoomOptions::default()).unwrap();
    assert_eq!(room.as_str().len(), 4);
    assert_eq!(lobby.room(&room).unwrap().capacity, Some(3));
}

// =========================================================================
// Leave & host transfer
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_host_leaving_alone_destroys_room() {
    let f = fixture();
    let room = f.lobby.create(profile(1, "alice"), RoomOptions::default()).unwrap();

    let outcome = f.lobby.leave(PlayerId(1)).await.unwrap();

    assert_eq!(outcome, LeaveOutcome::Destroyed);
    assert!(matches!(
        f.lobby.room(&room),
        Err(GamehallError::Room(RoomError::NotFound(_)))
    ));
    assert!(matches!(
        f.lobby.status(PlayerId(1)),
        Err(GamehallError::Room(RoomError::NotInRoom(_)))
    ));
    assert_eq!(f.lobby.registry().room_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_host_leaving_transfers_to_chosen_seat() {
    let mut f = fixture();
    let room = three_player_room(&f.lobby);
    let before = notices(&f.lobby, &room).len();

    say_later(&f.lobby, 1, Duration::from_secs(1), "3");
    let outcome = f.lobby.leave(PlayerId(1)).await.unwrap();

    assert_eq!(outcome, LeaveOutcome::Transferred { to: Seat(3) });
    let info = f.lobby.room(&room).unwrap();
    assert_eq!(info.host, "carol");
    assert_eq!(info.size, 2);
    assert!(f.lobby.status(PlayerId(1)).is_err());

    let after = notices(&f.lobby, &room);
    assert_eq!(after.len(), before + 1);
    assert_eq!(
        after.last(),
        Some(&Notice::LeftTransfer {
            target: "carol".into(),
            source: "alice".into(),
        })
    );

    let prompt: Vec<Content> = drain(&mut f.deliveries)
        .into_iter()
        .filter(|d| d.address == Address::private("test", "alice"))
        .map(|d| d.content)
        .filter(|c| matches!(c.as_notice(), Some(Notice::TransferPrompt { .. })))
        .collect();
    assert_eq!(
        prompt,
        vec![Content::from(Notice::TransferPrompt {
            candidates: vec![
                Seated {
                    seat: Seat(2),
                    name: "bob".into()
                },
                Seated {
                    seat: Seat(3),
                    name: "carol".into()
                },
            ]
        })]
    );
}

#[tokio::test(start_paused = true)]
async fn test_host_answering_zero_destroys_room() {
    let f = fixture();
    let room = three_player_room(&f.lobby);

    say_later(&f.lobby, 1, Duration::from_secs(1), "0");
    let outcome = f.lobby.leave(PlayerId(1)).await.unwrap();

    assert_eq!(outcome, LeaveOutcome::Destroyed);
    assert!(f.lobby.room(&room).is_err());
    assert_eq!(f.lobby.registry().player_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_host_leave_prompt_passes_other_text_through() {
    let f = fixture();
    let room = three_player_room(&f.lobby);

    // A game move the host was already asked for.
    let moves = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&moves);
    let alice = f.lobby.registry().player(PlayerId(1)).unwrap();
    alice.listen(move |text| {
        let hit = text == "rock";
        if hit {
            counted.fetch_add(1, Ordering::SeqCst);
        }
        hit
    });

    let lobby = f.lobby.clone();
    let replies = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let mut routed: Vec<bool> = ["rock", ":brb", "wait, no"]
            .into_iter()
            .map(|text| lobby.receive(PlayerId(1), text).unwrap())
            .collect();
        tokio::time::sleep(Duration::from_secs(1)).await;
        // An empty seat is an explicit answer that cancels.
        routed.push(lobby.receive(PlayerId(1), "7").unwrap());
        routed
    });

    let started = Instant::now();
    assert_eq!(
        f.lobby.leave(PlayerId(1)).await.unwrap(),
        LeaveOutcome::Cancelled
    );
    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(replies.await.unwrap(), vec![true, true, false, true]);
    assert_eq!(moves.load(Ordering::SeqCst), 1);
    assert!(notices(&f.lobby, &room).contains(&Notice::Chat {
        source: "alice".into(),
        content: "brb".into()
    }));

    let info = f.lobby.room(&room).unwrap();
    assert_eq!(info.host, "alice");
    assert_eq!(info.size, 3);
}

#[tokio::test(start_paused = true)]
async fn test_host_leave_cancelled_by_timeout() {
    let f = fixture();
    let room = three_player_room(&f.lobby);

    let started = Instant::now();
    assert_eq!(
        f.lobby.leave(PlayerId(1)).await.unwrap(),
        LeaveOutcome::Cancelled
    );
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(f.lobby.room(&room).unwrap().host, "alice");
}

#[tokio::test(start_paused = true)]
async fn test_non_host_leaves_directly() {
    let f = fixture();
    let room = three_player_room(&f.lobby);

    assert_eq!(f.lobby.leave(PlayerId(2)).await.unwrap(), LeaveOutcome::Left);
    assert_eq!(f.lobby.room(&room).unwrap().size, 2);
    assert_eq!(
        notices(&f.lobby, &room).last(),
        Some(&Notice::Left {
            target: "bob".into()
        })
    );
    // Bob can start over right away.
    assert!(f.lobby.create(profile(2, "bob"), RoomOptions::default()).is_ok());
}

// =========================================================================
// Host-only commands
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_host_only_commands_reject_others() {
    let f = fixture();
    three_player_room(&f.lobby);

    let not_host = |result: Result<(), GamehallError>| {
        matches!(result, Err(GamehallError::Room(RoomError::NotHost(PlayerId(2)))))
    };
    assert!(not_host(f.lobby.transfer(PlayerId(2), Seat(3))));
    assert!(not_host(f.lobby.destroy(PlayerId(2))));
    assert!(not_host(f.lobby.configure(PlayerId(2), RoomOptions::default())));
    assert!(not_host(f.lobby.open_game(
        PlayerId(2),
        "counting",
        GameOptions::default()
    )));
    assert!(not_host(f.lobby.kick(PlayerId(2), &[Seat(3)]).await.map(|_| ())));
    assert!(f.lobby.start(PlayerId(2)).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_kick_and_transfer_through_lobby() {
    let f = fixture();
    let room = three_player_room(&f.lobby);

    let err = f.lobby.kick(PlayerId(1), &[Seat(2), Seat(8)]).await.unwrap_err();
    assert!(matches!(
        err,
        GamehallError::Room(RoomError::SeatsNotFound(ref seats)) if seats == &[Seat(8)]
    ));

    let kicked = f.lobby.kick(PlayerId(1), &[Seat(2)]).await.unwrap();
    assert_eq!(kicked, vec!["bob".to_string()]);
    assert!(f.lobby.status(PlayerId(2)).is_err());

    f.lobby.transfer(PlayerId(1), Seat(3)).unwrap();
    assert_eq!(f.lobby.room(&room).unwrap().host, "carol");

    f.lobby.destroy(PlayerId(3)).unwrap();
    assert!(f.lobby.room(&room).is_err());
}

// =========================================================================
// Games
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_open_unknown_game() {
    let f = fixture();
    three_player_room(&f.lobby);
    assert!(matches!(
        f.lobby.open_game(PlayerId(1), "chess", GameOptions::default()),
        Err(GamehallError::Room(RoomError::UnknownGame(_)))
    ));
    assert!(matches!(
        f.lobby.open_game(
            PlayerId(1),
            "counting",
            GameOptions::default().with("hang", "yes")
        ),
        Err(GamehallError::Room(RoomError::GameRejected(_)))
    ));
    assert!(matches!(
        f.lobby.start(PlayerId(1)),
        Err(GamehallError::Room(RoomError::NoGame))
    ));
    assert_eq!(f.lobby.games(), vec!["counting".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_player_cancels_start_after_deadline() {
    let f = fixture();
    let room = three_player_room(&f.lobby);
    f.lobby
        .open_game(PlayerId(1), "counting", GameOptions::default())
        .unwrap();

    let started = Instant::now();
    let handle = f.lobby.start(PlayerId(1)).unwrap();
    say_later(&f.lobby, 1, Duration::from_secs(1), "ready");
    say_later(&f.lobby, 2, Duration::from_secs(2), "ready");

    let outcome = handle.await.unwrap().unwrap();

    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(
        outcome,
        StartOutcome::Cancelled {
            missing: vec!["carol".into()]
        }
    );
    assert_eq!(f.starts.load(Ordering::SeqCst), 0);
    assert_eq!(f.lobby.room(&room).unwrap().state, RoomState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_game_runs_when_everyone_is_ready() {
    let f = fixture();
    let room = three_player_room(&f.lobby);
    f.lobby
        .open_game(PlayerId(1), "counting", GameOptions::default())
        .unwrap();
    assert_eq!(f.lobby.room(&room).unwrap().game.as_deref(), Some("counting"));

    let handle = f.lobby.start(PlayerId(1)).unwrap();
    for id in 1..=3 {
        say_later(&f.lobby, id, Duration::from_secs(1), "ok");
    }

    assert_eq!(handle.await.unwrap().unwrap(), StartOutcome::Finished);
    assert_eq!(f.starts.load(Ordering::SeqCst), 1);
    let entries = f.lobby.transcript(&room).unwrap().entries;
    assert!(entries.contains(&Content::game("counting.players", [3])));
}

#[tokio::test(start_paused = true)]
async fn test_join_refused_during_readiness_round() {
    let f = fixture();
    let room = f.lobby.create(profile(1, "alice"), RoomOptions::default()).unwrap();
    f.lobby.join(profile(2, "bob"), &room).unwrap();
    f.lobby
        .open_game(PlayerId(1), "counting", GameOptions::default())
        .unwrap();

    let handle = f.lobby.start(PlayerId(1)).unwrap();
    assert_eq!(f.lobby.room(&room).unwrap().state, RoomState::Starting);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(
        f.lobby.join(profile(4, "dave"), &room),
        Err(GamehallError::Room(RoomError::InvalidState(_)))
    ));
    assert!(f.lobby.receive(PlayerId(1), "ok").unwrap());
    assert!(f.lobby.receive(PlayerId(2), "ok").unwrap());

    assert_eq!(handle.await.unwrap().unwrap(), StartOutcome::Finished);
    let entries = f.lobby.transcript(&room).unwrap().entries;
    assert!(entries.contains(&Content::game("counting.players", [2])));
    assert!(!entries.contains(&Content::game("counting.players", [3])));

    // The room opens again once the game is over.
    f.lobby.join(profile(4, "dave"), &room).unwrap();
    assert_eq!(f.lobby.room(&room).unwrap().size, 3);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_refused_while_first_runs() {
    let f = fixture();
    let room = three_player_room(&f.lobby);
    f.lobby
        .open_game(PlayerId(1), "counting", GameOptions::default())
        .unwrap();

    let handle = f.lobby.start(PlayerId(1)).unwrap();
    assert!(matches!(
        f.lobby.start(PlayerId(1)),
        Err(GamehallError::Room(RoomError::InvalidState(_)))
    ));
    assert!(matches!(
        f.lobby
            .open_game(PlayerId(1), "counting", GameOptions::default()),
        Err(GamehallError::Room(RoomError::InvalidState(_)))
    ));
    for id in 1..=3 {
        say_later(&f.lobby, id, Duration::from_secs(1), "ok");
    }

    assert_eq!(handle.await.unwrap().unwrap(), StartOutcome::Finished);
    assert_eq!(f.starts.load(Ordering::SeqCst), 1);
    let log = notices(&f.lobby, &room);
    let ready_checks = log
        .iter()
        .filter(|n| matches!(n, Notice::ReadyCheck { .. }))
        .count();
    assert_eq!(ready_checks, 1);
    assert!(!log.iter().any(|n| matches!(n, Notice::StartCancelled { .. })));
    assert_eq!(f.lobby.room(&room).unwrap().state, RoomState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_mid_game_terminates_it() {
    let f = fixture();
    let room = three_player_room(&f.lobby);
    f.lobby
        .open_game(
            PlayerId(1),
            "counting",
            GameOptions::default().with("hang", true),
        )
        .unwrap();

    let handle = f.lobby.start(PlayerId(1)).unwrap();
    for id in 1..=3 {
        say_later(&f.lobby, id, Duration::from_secs(1), "ok");
    }
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(f.lobby.room(&room).unwrap().state, RoomState::Playing);
    assert!(matches!(
        f.lobby.receive(PlayerId(2), ":hello?"),
        Err(GamehallError::Room(RoomError::SpeechDisabled))
    ));

    assert_eq!(f.lobby.leave(PlayerId(2)).await.unwrap(), LeaveOutcome::Left);
    let outcome = handle.await.unwrap().unwrap();

    assert_eq!(
        outcome,
        StartOutcome::Terminated("game aborted: bob left the game".into())
    );
    assert_eq!(f.lobby.room(&room).unwrap().state, RoomState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_host_can_terminate_running_game() {
    let f = fixture();
    three_player_room(&f.lobby);
    f.lobby
        .open_game(
            PlayerId(1),
            "counting",
            GameOptions::default().with("hang", true),
        )
        .unwrap();
    let handle = f.lobby.start(PlayerId(1)).unwrap();
    for id in 1..=3 {
        say_later(&f.lobby, id, Duration::from_secs(1), "ok");
    }
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(f.lobby.start(PlayerId(1)).is_err());

    f.lobby.terminate(PlayerId(1), "enough").unwrap();
    assert!(matches!(
        handle.await.unwrap().unwrap(),
        StartOutcome::Terminated(_)
    ));
}

// =========================================================================
// Input, queries, guests
// =========================================================================

#[tokio::test]
async fn test_receive_routes_chat_and_ignores_plain_text() {
    let f = fixture();
    let room = three_player_room(&f.lobby);

    assert!(f.lobby.receive(PlayerId(2), ":hi there").unwrap());
    assert!(!f.lobby.receive(PlayerId(2), "hi there").unwrap());
    assert!(f.lobby.receive(PlayerId(9), ":hello").is_err());
    f.lobby.chat(PlayerId(3), "yo").unwrap();

    let chat: Vec<Notice> = notices(&f.lobby, &room)
        .into_iter()
        .filter(|n| matches!(n, Notice::Chat { .. }))
        .collect();
    assert_eq!(
        chat,
        vec![
            Notice::Chat {
                source: "bob".into(),
                content: "hi there".into()
            },
            Notice::Chat {
                source: "carol".into(),
                content: "yo".into()
            },
        ]
    );
}

#[tokio::test]
async fn test_list_rooms_hides_private_rooms() {
    let f = fixture();
    let public = f.lobby.create(profile(1, "alice"), RoomOptions::default()).unwrap();
    let hidden = f
        .lobby
        .create(profile(2, "bob"), RoomOptions::default().private())
        .unwrap();

    let listed: Vec<RoomId> = f.lobby.list_rooms().into_iter().map(|r| r.id).collect();
    assert_eq!(listed, vec![public]);
    // Private rooms are still reachable by id.
    assert!(f.lobby.room(&hidden).unwrap().private);

    f.lobby
        .configure(PlayerId(2), RoomOptions::default().with_name("open now"))
        .unwrap();
    assert_eq!(f.lobby.list_rooms().len(), 2);
}

#[tokio::test]
async fn test_guest_watches_and_unwatches() {
    let mut f = fixture();
    let room = three_player_room(&f.lobby);
    let other = f.lobby.create(profile(4, "dave"), RoomOptions::default()).unwrap();
    let channel = ChannelId::new("test", "hall");
    let address = Address::channel("test", "hall");

    f.lobby.watch(channel.clone(), address.clone(), &room).unwrap();
    f.lobby.chat(PlayerId(1), "welcome, guests").unwrap();

    // Moving to another room leaves the first one.
    f.lobby.watch(channel.clone(), address.clone(), &other).unwrap();
    assert!(f.lobby.registry().room(&room).unwrap().guests().is_empty());
    assert_eq!(f.lobby.registry().room(&other).unwrap().guests().len(), 1);

    assert!(f.lobby.unwatch(&channel));
    assert!(!f.lobby.unwatch(&channel));

    tokio::time::sleep(Duration::from_millis(10)).await;
    let to_guest: Vec<Content> = drain(&mut f.deliveries)
        .into_iter()
        .filter(|d| d.address == address)
        .map(|d| d.content)
        .collect();
    assert_eq!(
        to_guest,
        vec![Content::from(Notice::Chat {
            source: "alice".into(),
            content: "welcome, guests".into(),
        })]
    );
}

#[tokio::test]
async fn test_export_transcript_as_json() {
    let f = fixture();
    let room = three_player_room(&f.lobby);
    f.lobby.chat(PlayerId(2), "gg").unwrap();

    let bytes = f.lobby.export(&room, &JsonCodec).unwrap();
    let decoded: Transcript = JsonCodec.decode(&bytes).unwrap();
    assert_eq!(decoded, f.lobby.transcript(&room).unwrap());
    assert_eq!(decoded.entries.len(), 4);
}

#[tokio::test]
async fn test_shutdown_destroys_every_room() {
    let f = fixture();
    three_player_room(&f.lobby);
    f.lobby.create(profile(4, "dave"), RoomOptions::default()).unwrap();
    f.lobby.flush().await;

    f.lobby.shutdown();

    assert_eq!(f.lobby.registry().room_count(), 0);
    assert_eq!(f.lobby.registry().player_count(), 0);
    assert!(f.lobby.list_rooms().is_empty());
}
