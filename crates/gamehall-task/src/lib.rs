//! Multi-party timed coordination for gamehall.
//!
//! A [`Task`] is one in-flight wait of the shape "continue once every
//! registered party has answered, or once the deadline passes, whichever
//! comes first". Readiness checks, confirmations, and turn input all use
//! it, so timer and listener bookkeeping lives in exactly one place.
//!
//! # Lifecycle
//!
//! ```text
//! new() ─► party() × N ─► timeout(d) ─► execute().await
//!              │                            ▲
//!              └─ Party::arrive() × N ──────┤  (all parties arrived)
//!                 deadline elapsed ─────────┤
//!                 done() ───────────────────┘
//! ```
//!
//! Completion is idempotent. Cleanups registered with [`Task::defer`] run
//! exactly once, in registration order, when the task completes or when
//! the last handle is dropped without the task ever completing.
//!
//! # Example
//!
//! ```ignore
//! let task = Task::new();
//! let party = task.party();
//! let id = player.listen(move |_| { party.arrive(); true });
//! task.defer(move || player.unlisten(id));
//! task.timeout(Duration::from_secs(30));
//! task.execute().await;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;

type Cleanup = Box<dyn FnOnce() + Send>;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A cancellable, deadline-bound wait over any number of parties.
///
/// Cheap to clone; clones share the same completion state.
#[derive(Clone)]
pub struct Task {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    finished: watch::Sender<bool>,
}

#[derive(Default)]
struct State {
    done: bool,
    cleanups: Vec<Cleanup>,
    parties: usize,
    arrived: usize,
}

impl Task {
    /// Creates a task with no parties, no deadline, and no cleanups.
    pub fn new() -> Self {
        let (finished, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                finished,
            }),
        }
    }

    /// Registers a cleanup to run once when the task completes.
    ///
    /// If the task already completed, `cleanup` runs immediately.
    pub fn defer(&self, cleanup: impl FnOnce() + Send + 'static) {
        let mut state = self.inner.lock();
        if state.done {
            drop(state);
            cleanup();
            return;
        }
        state.cleanups.push(Box::new(cleanup));
    }

    /// Arms a deadline: the task completes after `after` unless something
    /// completes it earlier. The timer is cancelled on completion.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn timeout(&self, after: Duration) {
        let weak = Arc::downgrade(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(inner) = weak.upgrade() {
                tracing::debug!(?after, "task deadline elapsed");
                inner.finish();
            }
        });
        self.defer(move || timer.abort());
    }

    /// Registers one more party that must arrive before the task completes.
    ///
    /// Register every party before awaiting [`execute`](Self::execute):
    /// the task completes as soon as all parties registered *so far* have
    /// arrived.
    pub fn party(&self) -> Party {
        self.inner.lock().parties += 1;
        Party {
            task: Arc::downgrade(&self.inner),
            arrived: AtomicBool::new(false),
        }
    }

    /// Completes the task now. Calling it again is a no-op.
    pub fn done(&self) {
        self.inner.finish();
    }

    /// Waits until the task completes, however that happens.
    ///
    /// A task with no parties and no deadline only completes through
    /// [`done`](Self::done).
    pub async fn execute(&self) {
        let mut finished = self.inner.finished.subscribe();
        // The sender lives in `self.inner`, so the channel cannot close here.
        let _ = finished.wait_for(|done| *done).await;
    }

    /// Whether the task has completed.
    pub fn is_done(&self) -> bool {
        self.inner.lock().done
    }

    /// Whether every registered party has arrived.
    pub fn all_arrived(&self) -> bool {
        let state = self.inner.lock();
        state.arrived == state.parties
    }

    /// How many registered parties have not arrived.
    pub fn pending(&self) -> usize {
        let state = self.inner.lock();
        state.parties - state.arrived
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Task")
            .field("done", &state.done)
            .field("parties", &state.parties)
            .field("arrived", &state.arrived)
            .field("cleanups", &state.cleanups.len())
            .finish()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(&self) {
        let cleanups = {
            let mut state = self.lock();
            if state.done {
                return;
            }
            state.done = true;
            std::mem::take(&mut state.cleanups)
        };
        // Run outside the lock: cleanups may touch this task again.
        for cleanup in cleanups {
            cleanup();
        }
        self.finished.send_replace(true);
    }

    fn arrive(&self) {
        let complete = {
            let mut state = self.lock();
            if state.done {
                return;
            }
            state.arrived += 1;
            state.arrived >= state.parties
        };
        if complete {
            self.finish();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.done {
            return;
        }
        state.done = true;
        for cleanup in std::mem::take(&mut state.cleanups) {
            cleanup();
        }
    }
}

// ---------------------------------------------------------------------------
// Party
// ---------------------------------------------------------------------------

/// One participant in a [`Task`].
///
/// Holds only a weak reference, so an outstanding party never keeps a
/// finished or abandoned task alive.
pub struct Party {
    task: Weak<Inner>,
    arrived: AtomicBool,
}

impl Party {
    /// Signals that this party is done. Only the first call counts.
    pub fn arrive(&self) {
        if self.arrived.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.task.upgrade() {
            inner.arrive();
        }
    }

    /// Whether [`arrive`](Self::arrive) has been called.
    pub fn has_arrived(&self) -> bool {
        self.arrived.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Party")
            .field("arrived", &self.has_arrived())
            .finish()
    }
}
