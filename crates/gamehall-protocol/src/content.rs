//! Outbound content: what the core asks the adapter to deliver.
//!
//! The core never produces finished, localized text for its own events.
//! Instead it emits [`Notice`] values (structured system events) and the
//! chat adapter renders them in the recipient's locale. Game modules do the
//! same through [`Content::Game`], naming a message key plus positional
//! parameters.

use serde::{Deserialize, Serialize};

use crate::{RoomId, Seat};

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// A single deliverable message.
///
/// `#[serde(tag = "type", content = "data")]` gives adjacently tagged JSON:
///   `{ "type": "Text", "data": "hello" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Content {
    /// Verbatim text, delivered as-is.
    Text(String),

    /// A core system event.
    Notice(Notice),

    /// A game-module message: a localization key and its parameters.
    Game { key: String, params: Vec<String> },

    /// Several pieces delivered as one message, in order.
    Many(Vec<Content>),
}

impl Content {
    /// Verbatim text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A game message with positional parameters.
    pub fn game<I, S>(key: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self::Game {
            key: key.into(),
            params: params.into_iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Appends `next` after this content, flattening nested `Many`s.
    pub fn then(self, next: impl Into<Content>) -> Self {
        let mut parts = match self {
            Self::Many(parts) => parts,
            other => vec![other],
        };
        match next.into() {
            Self::Many(more) => parts.extend(more),
            other => parts.push(other),
        }
        Self::Many(parts)
    }

    /// Returns `true` if there is nothing to deliver.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Many(parts) => parts.iter().all(Content::is_empty),
            Self::Notice(_) | Self::Game { .. } => false,
        }
    }

    /// Returns the notice if this content is exactly one notice.
    pub fn as_notice(&self) -> Option<&Notice> {
        match self {
            Self::Notice(notice) => Some(notice),
            _ => None,
        }
    }
}

impl From<Notice> for Content {
    fn from(notice: Notice) -> Self {
        Self::Notice(notice)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A player listed by seat, as shown in prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seated {
    pub seat: Seat,
    pub name: String,
}

/// System events emitted by the room engine.
///
/// Names are display names at the time of the event; the adapter decides
/// how each notice reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    // -- Membership --
    /// A player joined the room.
    Joined { target: String },
    /// A player left on their own.
    Left { target: String },
    /// The host removed one or more players.
    Kicked { targets: Vec<String>, source: String },
    /// Private notice to a removed player. Never logged.
    KickedYou { room: RoomId, source: String },
    /// Host status moved from `source` to `target`.
    Transferred { target: String, source: String },
    /// The host handed the room to `target` and left.
    LeftTransfer { target: String, source: String },
    /// The room no longer exists.
    Destroyed { room: RoomId },

    // -- Game lifecycle --
    /// A game was attached to the room.
    GameAttached { game: String },
    /// Readiness round: every player must reply before the deadline.
    ReadyCheck { game: String, timeout_secs: u64 },
    /// Somebody did not acknowledge the readiness round in time.
    StartCancelled { missing: Vec<String> },
    /// The game is running; open chat is disabled.
    GameStarted { game: String },
    /// The game ran to completion.
    GameFinished { game: String },
    /// The game ended abnormally.
    GameTerminated { game: String, reason: String },

    // -- Chat & prompts --
    /// A room chat line.
    Chat { source: String, content: String },
    /// Hint appended to pause prompts ("send anything to continue").
    PauseHint,
    /// Hint appended to confirm prompts ("reply Y or N").
    ConfirmHint,
    /// Asks a leaving host to pick a successor (0 destroys the room).
    TransferPrompt { candidates: Vec<Seated> },
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// The broadcast log of one room, exported for audit or replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub room: RoomId,
    pub entries: Vec<Content>,
}
