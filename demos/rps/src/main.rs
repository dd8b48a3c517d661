use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gamehall::prelude::*;
use rand::Rng;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Game types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    const ALL: [Hand; 3] = [Hand::Rock, Hand::Paper, Hand::Scissors];

    fn parse(text: &str) -> Option<Hand> {
        match text.trim().to_ascii_uppercase().as_str() {
            "R" | "ROCK" => Some(Hand::Rock),
            "P" | "PAPER" => Some(Hand::Paper),
            "S" | "SCISSORS" => Some(Hand::Scissors),
            _ => None,
        }
    }

    fn letter(self) -> &'static str {
        match self {
            Hand::Rock => "R",
            Hand::Paper => "P",
            Hand::Scissors => "S",
        }
    }

    fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors) | (Hand::Paper, Hand::Rock) | (Hand::Scissors, Hand::Paper)
        )
    }
}

/// Indices of the players who take a round. A missing hand always loses.
fn round_winners(hands: &[Option<Hand>]) -> Vec<usize> {
    let mut shown: Vec<Hand> = hands.iter().flatten().copied().collect();
    shown.sort_by_key(|hand| hand.letter());
    shown.dedup();

    let winning = match shown.as_slice() {
        [only] if hands.iter().any(Option::is_none) => *only,
        [a, b] => {
            if a.beats(*b) {
                *a
            } else {
                *b
            }
        }
        // Nobody answered, everyone matched, or all three hands are out.
        _ => return Vec::new(),
    };

    hands
        .iter()
        .enumerate()
        .filter(|(_, hand)| **hand == Some(winning))
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RpsOptions {
    rounds: u32,
    move_timeout_secs: u64,
}

impl Default for RpsOptions {
    fn default() -> Self {
        Self {
            rounds: 3,
            move_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Game logic
// ---------------------------------------------------------------------------

struct RpsCorridor;

impl Corridor for RpsCorridor {
    fn name(&self) -> &str {
        "rps"
    }

    fn create(&self, room: Arc<Room>, options: GameOptions) -> Result<Arc<dyn Game>, GameError> {
        let options: RpsOptions = options.parse()?;
        if options.rounds == 0 {
            return Err(GameError::Rejected("rounds must be at least 1".into()));
        }
        Ok(Arc::new(Rps { room, options }))
    }
}

struct Rps {
    room: Arc<Room>,
    options: RpsOptions,
}

#[async_trait]
impl Game for Rps {
    fn name(&self) -> &str {
        "rps"
    }

    async fn validate(&self) -> Result<(), GameError> {
        if self.room.size() < 2 {
            return Err(GameError::Rejected(
                "rock-paper-scissors needs at least 2 players".into(),
            ));
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), GameError> {
        let timeout = Duration::from_secs(self.options.move_timeout_secs);
        let mut scores: BTreeMap<PlayerId, (String, u32)> = BTreeMap::new();

        for round in 1..=self.options.rounds {
            let players: Vec<Arc<Player>> =
                self.room.players().into_iter().map(|(_, p)| p).collect();
            if players.len() < 2 {
                return Err(GameError::Failed("not enough players left".into()));
            }

            self.room
                .broadcast(Content::game("rps.round", [round, self.options.rounds]));
            let answers = collect(
                &players,
                timeout,
                Some(Content::game("rps.choose", ["R", "P", "S"])),
                Hand::parse,
            )
            .await;

            let hands: Vec<Option<Hand>> = answers.iter().map(|(_, hand)| *hand).collect();
            let winners = round_winners(&hands);
            self.room.broadcast(Content::game(
                "rps.hands",
                answers
                    .iter()
                    .map(|(p, hand)| format!("{}:{}", p.name(), hand.map_or("-", Hand::letter))),
            ));
            for &i in &winners {
                let player = &answers[i].0;
                scores
                    .entry(player.id())
                    .or_insert_with(|| (player.name().to_string(), 0))
                    .1 += 1;
            }
            tracing::debug!(room_id = %self.room.id(), round, winners = winners.len(), "round played");
        }

        let best = scores.values().map(|(_, score)| *score).max().unwrap_or(0);
        let champions: Vec<PlayerId> = scores
            .iter()
            .filter(|(_, (_, score))| *score == best)
            .map(|(id, _)| *id)
            .collect();
        if champions.is_empty() {
            self.room.broadcast(Content::game("rps.draw", [best]));
            return Ok(());
        }

        let names: Vec<&str> = champions
            .iter()
            .filter_map(|id| scores.get(id))
            .map(|(name, _)| name.as_str())
            .collect();
        self.room.broadcast(Content::game("rps.winner", names));
        self.room
            .group()
            .filter(move |p| champions.contains(&p.id()))
            .silent()
            .broadcast(Content::game("rps.you_win", [best]));
        Ok(())
    }

    async fn leave(&self, player: &Arc<Player>) -> Result<(), GameError> {
        let remaining = self
            .room
            .players()
            .iter()
            .filter(|(_, p)| p.id() != player.id())
            .count();
        if remaining < 2 {
            return Err(GameError::PlayerLeft(player.name().to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Demo bootstrap
// ---------------------------------------------------------------------------

fn render(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Notice(notice) => format!("{notice:?}"),
        Content::Game { key, params } => format!("[{key}] {}", params.join(" ")),
        Content::Many(parts) => parts.iter().map(render).collect::<Vec<_>>().join(" / "),
    }
}

/// Plays for `id` until they are out of a room: a random hand now and then.
async fn bot(lobby: Lobby, id: PlayerId) {
    loop {
        let (pause, hand) = {
            let mut rng = rand::rng();
            (
                rng.random_range(100..600),
                Hand::ALL[rng.random_range(0..Hand::ALL.len())],
            )
        };
        tokio::time::sleep(Duration::from_millis(pause)).await;
        if lobby.receive(id, hand.letter()).is_err() {
            break;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), GamehallError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (transport, mut deliveries) = LocalTransport::new();
    let lobby = Lobby::builder()
        .config(LobbyConfig {
            message_delay: Duration::from_millis(20),
            ready_timeout: Duration::from_secs(5),
            ..LobbyConfig::default()
        })
        .corridor(RpsCorridor)
        .build(transport);

    tokio::spawn(async move {
        while let Some(delivery) = deliveries.recv().await {
            println!("{} <- {}", delivery.address, render(&delivery.content));
        }
    });

    let profiles: Vec<Profile> = ["alice", "bob", "carol"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| Profile::new(PlayerId(id), name, Address::private("demo", name)))
        .collect();
    let room = lobby.create(
        profiles[0].clone(),
        RoomOptions::default().with_name("rps night"),
    )?;
    for profile in &profiles[1..] {
        lobby.join(profile.clone(), &room)?;
    }
    lobby.open_game(
        PlayerId(1),
        "rps",
        GameOptions::default()
            .with("rounds", 3)
            .with("move_timeout_secs", 10),
    )?;

    let game = lobby.start(PlayerId(1))?;
    let bots: Vec<_> = profiles
        .iter()
        .map(|profile| tokio::spawn(bot(lobby.clone(), profile.id)))
        .collect();

    match game.await {
        Ok(outcome) => {
            let outcome = outcome?;
            tracing::info!(?outcome, "game over");
        }
        Err(e) => tracing::error!(error = %e, "game task failed"),
    }
    for bot in bots {
        bot.abort();
    }

    let transcript = lobby.transcript(&room)?;
    tracing::info!(room_id = %room, entries = transcript.entries.len(), "transcript");
    lobby.flush().await;
    lobby.shutdown();
    Ok(())
}
