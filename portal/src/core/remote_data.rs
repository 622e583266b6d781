//! Four-state lifecycle of one remote fetch.
//!
//! [`RemoteData`] is the value rendering code observes, only through
//! [`RemoteData::fold`]. [`Slot`] owns one such value for one concern and is
//! the only thing that moves it between states:
//!
//! ```text
//! NotAsked ──start──▶ Pending ──complete──▶ Success | Failure
//!                        ▲                         │
//!                        └─────────start───────────┘
//! ```
//!
//! Reaching `Success`/`Failure` requires the [`Ticket`] returned by
//! [`Slot::start`], so there is no way to write `NotAsked → Success`.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteData<E, A> {
    NotAsked,
    Pending,
    Failure(E),
    Success(A),
}

impl<E, A> RemoteData<E, A> {
    /// The single way to observe the state: every branch must be handled.
    pub fn fold<'a, R>(
        &'a self,
        on_not_asked: impl FnOnce() -> R,
        on_pending: impl FnOnce() -> R,
        on_failure: impl FnOnce(&'a E) -> R,
        on_success: impl FnOnce(&'a A) -> R,
    ) -> R {
        match self {
            RemoteData::NotAsked => on_not_asked(),
            RemoteData::Pending => on_pending(),
            RemoteData::Failure(err) => on_failure(err),
            RemoteData::Success(value) => on_success(value),
        }
    }

    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> RemoteData<E, B> {
        match self {
            RemoteData::NotAsked => RemoteData::NotAsked,
            RemoteData::Pending => RemoteData::Pending,
            RemoteData::Failure(err) => RemoteData::Failure(err),
            RemoteData::Success(value) => RemoteData::Success(f(value)),
        }
    }

    pub fn success(&self) -> Option<&A> {
        match self {
            RemoteData::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            RemoteData::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RemoteData::Pending)
    }
}

impl<E, A> From<Result<A, E>> for RemoteData<E, A> {
    fn from(result: Result<A, E>) -> Self {
        match result {
            Ok(value) => RemoteData::Success(value),
            Err(err) => RemoteData::Failure(err),
        }
    }
}

static NEXT_SLOT: AtomicU64 = AtomicU64::new(1);

/// Proof that a slot was started; redeemed once by [`Slot::complete`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a started fetch must be completed with its ticket"]
pub struct Ticket {
    slot: u64,
    generation: u64,
}

/// Exclusive owner of one [`RemoteData`] value.
#[derive(Debug)]
pub struct Slot<E, A> {
    id: u64,
    generation: u64,
    state: RemoteData<E, A>,
}

impl<E, A> Default for Slot<E, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, A> Slot<E, A> {
    pub fn new() -> Self {
        Self {
            id: NEXT_SLOT.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            state: RemoteData::NotAsked,
        }
    }

    pub fn state(&self) -> &RemoteData<E, A> {
        &self.state
    }

    pub fn fold<'a, R>(
        &'a self,
        on_not_asked: impl FnOnce() -> R,
        on_pending: impl FnOnce() -> R,
        on_failure: impl FnOnce(&'a E) -> R,
        on_success: impl FnOnce(&'a A) -> R,
    ) -> R {
        self.state.fold(on_not_asked, on_pending, on_failure, on_success)
    }

    /// `NotAsked | Failure | Success → Pending`.
    ///
    /// Starting while already pending supersedes the in-flight fetch: its
    /// ticket stops being accepted.
    pub fn start(&mut self) -> Ticket {
        self.generation += 1;
        self.state = RemoteData::Pending;
        Ticket {
            slot: self.id,
            generation: self.generation,
        }
    }

    /// `Pending → Success | Failure`.
    ///
    /// Returns `false` and leaves the state unchanged when `ticket` belongs to
    /// another slot or to a superseded start.
    pub fn complete(&mut self, ticket: Ticket, result: Result<A, E>) -> bool {
        if ticket.slot != self.id || ticket.generation != self.generation {
            debug!(
                slot = self.id,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "dropping stale completion"
            );
            return false;
        }
        self.state = RemoteData::from(result);
        true
    }

    /// Back to `NotAsked`; any in-flight ticket becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = RemoteData::NotAsked;
    }
}
