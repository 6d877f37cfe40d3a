//! In-memory state store.
//!
//! [`InMemoryStore`] keeps the state behind a single `RwLock`. Every
//! mutation takes the write guard once, so a commit is never partially
//! visible. Commit events are routed before the guard is released, which
//! keeps delivery order equal to commit order.

use std::fmt;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::event::{CommitEvent, CommitRouter, CommitStream, MutationFilter};
use crate::mutation::Mutation;
use crate::state::StoreState;
use crate::traits::StateStore;

struct Inner<L> {
    state: StoreState<L>,
    seq: u64,
}

/// An in-memory implementation of [`StateStore`].
///
/// Construct one per application (or per test) and pass it by reference or
/// `Arc` to whatever needs it.
pub struct InMemoryStore<L> {
    inner: RwLock<Inner<L>>,
    router: CommitRouter<L>,
    config: StoreConfig,
}

impl<L: Clone> InMemoryStore<L> {
    /// Create an unauthorized store with no links.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::from_state(StoreState::default(), config)
    }

    /// Create a store that starts from an existing state.
    pub fn from_state(state: StoreState<L>, config: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(Inner { state, seq: 0 }),
            router: CommitRouter::new(),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of mutations applied so far.
    pub fn commit_count(&self) -> Result<u64> {
        Ok(self.read()?.seq)
    }

    /// Subscribe to commits matching `filter`.
    pub fn subscribe(&self, filter: MutationFilter) -> Result<CommitStream<L>> {
        self.router.subscribe(filter, self.config.channel_capacity)
    }

    /// Run `f` against the links without copying them.
    pub fn with_links<R>(&self, f: impl FnOnce(&[L]) -> R) -> Result<R> {
        Ok(f(self.read()?.state.links()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner<L>>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl<L: Clone> Default for InMemoryStore<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> fmt::Debug for InMemoryStore<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("config", &self.config)
            .field("subscribers", &self.router.subscriber_count().ok())
            .finish()
    }
}

impl<L> StateStore<L> for InMemoryStore<L>
where
    L: Clone + Send + Sync,
{
    fn commit(&self, mutation: Mutation<L>) -> Result<()> {
        let kind = mutation.kind();
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;

        // Router failures drop the event; they never undo or refuse a commit.
        let observed = match self.router.wants(kind) {
            Ok(true) => Some(mutation.clone()),
            Ok(false) => None,
            Err(e) => {
                warn!(mutation = %kind, error = %e, "commit router unavailable; event dropped");
                None
            }
        };

        if !inner.state.apply(mutation, self.config.index_policy)? {
            return Ok(());
        }
        inner.seq += 1;

        let authorized = inner.state.authorized();
        let link_count = inner.state.links().len();
        debug!(seq = inner.seq, mutation = %kind, authorized, link_count, "mutation committed");

        if let Some(mutation) = observed {
            let event = CommitEvent {
                seq: inner.seq,
                kind,
                mutation,
                authorized,
                link_count,
            };
            if let Err(e) = self.router.route(&event) {
                warn!(seq = event.seq, mutation = %kind, error = %e, "commit event not delivered");
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<StoreState<L>> {
        Ok(self.read()?.state.clone())
    }

    fn is_authorized(&self) -> Result<bool> {
        Ok(self.read()?.state.authorized())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.state.links().len())
    }

    fn link(&self, index: usize) -> Result<Option<L>> {
        Ok(self.read()?.state.links().get(index).cloned())
    }
}
