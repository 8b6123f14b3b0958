//! Registry of cancellable replay sessions.
//!
//! `ReplayRegistry` hands out one [`CancellationToken`] per session so that a
//! control task can stop any running replay by id without holding the
//! session itself.

use dashmap::DashMap;
use derive_more::{Display, From, Into};
use tokio_util::sync::CancellationToken;

/// Caller-chosen id under which a replay can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From, Into)]
#[display("replay session {_0}")]
pub struct ReplaySessionId(i64);

impl ReplaySessionId {
    #[must_use]
    pub const fn new(id: i64) -> Self { Self(id) }

    #[must_use]
    pub const fn get(self) -> i64 { self.0 }
}

/// Concurrent registry of cancellation tokens keyed by [`ReplaySessionId`].
#[derive(Debug, Default)]
pub struct ReplayRegistry(DashMap<ReplaySessionId, CancellationToken>);

impl ReplayRegistry {
    /// Register `id` and return the token its session should observe.
    ///
    /// Registering an id twice cancels the session that held it before.
    pub fn register(&self, id: ReplaySessionId) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.0.insert(id, token.clone()) {
            log::warn!("{id} registered twice; cancelling the earlier session");
            previous.cancel();
        }
        token
    }

    /// Cancel the session registered as `id`.
    ///
    /// Returns `false` when no such session is registered.
    pub fn cancel(&self, id: &ReplaySessionId) -> bool {
        match self.0.remove(id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Forget `id`, typically once its session has ended.
    pub fn remove(&self, id: &ReplaySessionId) { self.0.remove(id); }

    /// Cancel every registered session and empty the registry.
    pub fn cancel_all(&self) {
        self.0.retain(|_, token| {
            token.cancel();
            false
        });
    }

    /// IDs of registered sessions whose tokens have not been cancelled.
    ///
    /// Entries whose tokens were cancelled elsewhere are pruned.
    #[must_use]
    pub fn active_ids(&self) -> Vec<ReplaySessionId> {
        let mut ids = Vec::with_capacity(self.0.len());
        self.0.retain(|id, token| {
            if token.is_cancelled() {
                false
            } else {
                ids.push(*id);
                true
            }
        });
        ids
    }
}
