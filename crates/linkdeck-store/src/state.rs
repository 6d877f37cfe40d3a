//! The store's state and the rules for applying mutations to it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::IndexPolicy;
use crate::error::{Result, StoreError};
use crate::mutation::{Mutation, MutationKind};

/// Session flag plus the ordered link collection.
///
/// Values handed out by the store are snapshots; changing one has no effect
/// on the store it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState<L> {
    authorized: bool,
    links: Vec<L>,
}

impl<L> Default for StoreState<L> {
    fn default() -> Self {
        Self {
            authorized: false,
            links: Vec::new(),
        }
    }
}

impl<L> StoreState<L> {
    /// A state with the given session flag and links.
    pub fn new(authorized: bool, links: Vec<L>) -> Self {
        Self { authorized, links }
    }

    pub fn authorized(&self) -> bool {
        self.authorized
    }

    pub fn links(&self) -> &[L] {
        &self.links
    }

    /// Consume the state, returning the links.
    pub fn into_links(self) -> Vec<L> {
        self.links
    }

    /// Apply one mutation.
    ///
    /// Returns `Ok(true)` when the mutation was applied and `Ok(false)` when
    /// an out-of-range index was dropped under [`IndexPolicy::Ignore`]. A
    /// rejected mutation leaves the state exactly as it was.
    pub(crate) fn apply(&mut self, mutation: Mutation<L>, policy: IndexPolicy) -> Result<bool> {
        match mutation {
            Mutation::Authorize => self.authorized = true,
            Mutation::DeAuthorize => self.authorized = false,
            Mutation::HydrateLinks(links) => self.links = links,
            Mutation::DrainLinks => self.links = Vec::new(),
            Mutation::AddLink(link) => self.links.push(link),
            Mutation::RemoveLink(index) => {
                if !self.check_index(MutationKind::RemoveLink, index, policy)? {
                    return Ok(false);
                }
                self.links.remove(index);
            }
            Mutation::UpdateLink { link, index } => {
                if !self.check_index(MutationKind::UpdateLink, index, policy)? {
                    return Ok(false);
                }
                self.links[index] = link;
            }
        }
        Ok(true)
    }

    fn check_index(&self, op: MutationKind, index: usize, policy: IndexPolicy) -> Result<bool> {
        let len = self.links.len();
        if index < len {
            return Ok(true);
        }
        match policy {
            IndexPolicy::Reject => Err(StoreError::IndexOutOfRange { op, index, len }),
            IndexPolicy::Ignore => {
                warn!(op = %op, index, len, "index out of range; mutation ignored");
                Ok(false)
            }
        }
    }
}
