//! Commit events and their fan-out to subscribers.

use std::sync::RwLock;

use serde::Serialize;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::TryRecvError;

use crate::error::{Result, StoreError};
use crate::mutation::{Mutation, MutationKind};

/// Emitted once for every mutation the store applies.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommitEvent<L> {
    /// Per-store commit counter, starting at 1.
    pub seq: u64,
    pub kind: MutationKind,
    /// The mutation as it was committed.
    pub mutation: Mutation<L>,
    /// Session flag after the mutation.
    pub authorized: bool,
    /// Number of links after the mutation.
    pub link_count: usize,
}

/// Filter for subscribing to a subset of commits.
#[derive(Clone, Debug, Default)]
pub struct MutationFilter {
    /// If set, only commits of these kinds are delivered.
    pub kinds: Option<Vec<MutationKind>>,
}

impl MutationFilter {
    /// A filter that delivers every commit.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter that delivers only the given kinds.
    pub fn kinds(kinds: impl IntoIterator<Item = MutationKind>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
        }
    }

    /// A filter for `authorize` and `deAuthorize` only.
    pub fn session() -> Self {
        Self::kinds(MutationKind::ALL.into_iter().filter(|k| k.touches_session()))
    }

    /// Returns `true` if commits of `kind` pass this filter.
    pub fn matches(&self, kind: MutationKind) -> bool {
        match &self.kinds {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }
}

/// A broadcast channel receiver for commit events.
pub type CommitStream<L> = broadcast::Receiver<CommitEvent<L>>;

struct Subscriber<L> {
    filter: MutationFilter,
    sender: broadcast::Sender<CommitEvent<L>>,
}

/// Delivers commit events to matching subscribers.
pub(crate) struct CommitRouter<L> {
    subscribers: RwLock<Vec<Subscriber<L>>>,
}

impl<L: Clone> CommitRouter<L> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, filter: MutationFilter, capacity: usize) -> Result<CommitStream<L>> {
        let (sender, rx) = broadcast::channel(capacity.max(1));
        self.subscribers
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?
            .push(Subscriber { filter, sender });
        Ok(rx)
    }

    /// Returns `true` if at least one subscriber would want commits of `kind`.
    pub(crate) fn wants(&self, kind: MutationKind) -> Result<bool> {
        let subs = self
            .subscribers
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(subs.iter().any(|s| s.filter.matches(kind)))
    }

    /// Send an event to every matching subscriber, pruning closed channels.
    pub(crate) fn route(&self, event: &CommitEvent<L>) -> Result<()> {
        let mut subs = self
            .subscribers
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        subs.retain(|sub| {
            if sub.filter.matches(event.kind) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });
        Ok(())
    }
}

impl<L> CommitRouter<L> {
    pub(crate) fn subscriber_count(&self) -> Result<usize> {
        self.subscribers
            .read()
            .map(|s| s.len())
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Poison the subscriber lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.subscribers.write();
            panic!("poisoning subscriber lock");
        }));
    }
}
