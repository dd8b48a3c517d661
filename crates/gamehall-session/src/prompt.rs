//! Timed prompts.
//!
//! Every prompt is a [`Task`] with one party per asked player, a deadline,
//! and a deferred cleanup per armed listener. However the prompt ends, the
//! listeners are disarmed exactly once. A prompt that times out resolves
//! to `None`, which is distinct from every valid answer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use gamehall_protocol::{Content, Notice};
use gamehall_task::Task;

use crate::{Endpoint, Player};

type Slot<T> = Arc<Mutex<Option<T>>>;

fn store<T>(slot: &Slot<T>, value: T) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_none() {
        *slot = Some(value);
    }
}

fn take<T>(slot: &Slot<T>) -> Option<T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Appends `hint` to `content` unless the caller overrides it.
fn with_hint(content: impl Into<Content>, hint: Notice, override_hint: bool) -> Content {
    let content = content.into();
    if override_hint {
        content
    } else {
        content.then(hint)
    }
}

impl Player {
    /// Waits for the first input `matcher` accepts, up to `timeout`.
    ///
    /// Input the matcher rejects (returns `None` for) falls through to
    /// older listeners. Returns `None` if the deadline passes first.
    pub async fn prompt<T, F>(&self, timeout: Duration, matcher: F) -> Option<T>
    where
        T: Send + 'static,
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        let task = Task::new();
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let answer = Arc::clone(&slot);
        let party = task.party();

        let id = self.listen(move |text| match matcher(text) {
            Some(value) => {
                store(&answer, value);
                party.arrive();
                true
            }
            None => false,
        });
        let listeners = Arc::clone(&self.listeners);
        task.defer(move || {
            listeners.remove(id);
        });
        task.timeout(timeout);

        tracing::debug!(player_id = %self.id(), ?timeout, "prompt armed");
        task.execute().await;
        take(&slot)
    }

    /// Sends `content` and waits for any non-empty reply.
    ///
    /// A pause hint is appended unless `override_hint` is set. Returns
    /// `false` if nobody answered in time.
    pub async fn pause(
        &self,
        timeout: Duration,
        content: impl Into<Content>,
        override_hint: bool,
    ) -> bool {
        self.announce(with_hint(content, Notice::PauseHint, override_hint))
            .await;
        self.prompt(timeout, |text| (!text.trim().is_empty()).then_some(()))
            .await
            .is_some()
    }

    /// Sends `content` and waits for a `Y` or `N` reply (any case).
    ///
    /// A confirm hint is appended unless `override_hint` is set.
    pub async fn confirm(
        &self,
        timeout: Duration,
        content: impl Into<Content>,
        override_hint: bool,
    ) -> Option<bool> {
        self.announce(with_hint(content, Notice::ConfirmHint, override_hint))
            .await;
        self.prompt(timeout, |text| match text.trim().to_uppercase().as_str() {
            "Y" => Some(true),
            "N" => Some(false),
            _ => None,
        })
        .await
    }

    /// Waits for a reply that, upper-cased, is one of `choices`.
    ///
    /// Sends nothing; callers present the choices themselves.
    pub async fn select(&self, choices: &[&str], timeout: Duration) -> Option<String> {
        let choices: Vec<String> = choices.iter().map(|c| c.to_uppercase()).collect();
        self.prompt(timeout, move |text| {
            let reply = text.trim().to_uppercase();
            choices.contains(&reply).then_some(reply)
        })
        .await
    }

    /// Sends prompt content and waits until it was delivered, so answers
    /// are only collected once the player could have seen the question.
    async fn announce(&self, content: Content) {
        if let Err(e) = self.send(content).wait().await {
            tracing::debug!(player_id = %self.id(), error = %e, "prompt delivery failed");
        }
    }
}

/// Asks several players at once and gathers one answer from each.
///
/// `content`, if any, is queued to every player after their listener is
/// armed. The wait ends when every player answered or when `timeout`
/// elapses; players who did not answer get `None`. Results keep the order
/// of `players`.
pub async fn collect<T, F>(
    players: &[Arc<Player>],
    timeout: Duration,
    content: Option<Content>,
    matcher: F,
) -> Vec<(Arc<Player>, Option<T>)>
where
    T: Send + 'static,
    F: Fn(&str) -> Option<T> + Send + Sync + 'static,
{
    let task = Task::new();
    let matcher = Arc::new(matcher);
    let mut slots = Vec::with_capacity(players.len());

    for player in players {
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let answer = Arc::clone(&slot);
        let matcher = Arc::clone(&matcher);
        let party = task.party();

        let id = player.listen(move |text| match matcher(text) {
            Some(value) => {
                store(&answer, value);
                party.arrive();
                true
            }
            None => false,
        });
        let armed = Arc::clone(player);
        task.defer(move || {
            armed.unlisten(id);
        });
        slots.push((Arc::clone(player), slot));
    }

    if let Some(content) = content {
        for player in players {
            let _ = player.send(content.clone());
        }
    }

    task.timeout(timeout);
    task.execute().await;

    tracing::debug!(
        asked = players.len(),
        missing = task.pending(),
        "collection finished"
    );
    slots
        .into_iter()
        .map(|(player, slot)| {
            let value = take(&slot);
            (player, value)
        })
        .collect()
}
