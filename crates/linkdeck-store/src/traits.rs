//! The [`StateStore`] trait defining the store interface.
//!
//! Views, routing guards, and response handlers depend on this trait rather
//! than on a concrete store, so each can be handed an independent instance
//! in tests.

use crate::error::Result;
use crate::mutation::Mutation;
use crate::state::StoreState;

/// A state container for the session flag and the ordered link collection.
///
/// Implementations must apply each mutation atomically: readers observe
/// either the state before a commit or the state after it, never a mix.
/// The named mutators are provided methods that build a [`Mutation`] and
/// hand it to [`commit`](StateStore::commit), so every change flows through
/// one entry point.
pub trait StateStore<L>: Send + Sync {
    /// Apply one mutation.
    fn commit(&self, mutation: Mutation<L>) -> Result<()>;

    /// A copy of the current state.
    fn snapshot(&self) -> Result<StoreState<L>>;

    /// Whether the session is authorized.
    fn is_authorized(&self) -> Result<bool>;

    /// Number of links in the collection.
    fn len(&self) -> Result<usize>;

    /// The link at `index`, or `None` if there is none.
    fn link(&self, index: usize) -> Result<Option<L>>;

    /// Returns `true` if the collection holds no links.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// A copy of all links, in order.
    fn links(&self) -> Result<Vec<L>> {
        Ok(self.snapshot()?.into_links())
    }

    /// Apply mutations in order, stopping at the first error.
    ///
    /// Returns the number of mutations committed. Mutations before the
    /// failing one stay applied.
    fn commit_all<I>(&self, mutations: I) -> Result<usize>
    where
        I: IntoIterator<Item = Mutation<L>>,
        Self: Sized,
    {
        let mut count = 0;
        for mutation in mutations {
            self.commit(mutation)?;
            count += 1;
        }
        Ok(count)
    }

    fn authorize(&self) -> Result<()> {
        self.commit(Mutation::Authorize)
    }

    fn de_authorize(&self) -> Result<()> {
        self.commit(Mutation::DeAuthorize)
    }

    /// Replace the collection with `links`, keeping their order.
    fn hydrate_links(&self, links: Vec<L>) -> Result<()> {
        self.commit(Mutation::HydrateLinks(links))
    }

    fn drain_links(&self) -> Result<()> {
        self.commit(Mutation::DrainLinks)
    }

    /// Append `link` to the end of the collection.
    fn add_link(&self, link: L) -> Result<()> {
        self.commit(Mutation::AddLink(link))
    }

    /// Remove the link at `index`; later links shift down by one.
    fn remove_link(&self, index: usize) -> Result<()> {
        self.commit(Mutation::RemoveLink(index))
    }

    /// Replace the link at `index`.
    fn update_link(&self, index: usize, link: L) -> Result<()> {
        self.commit(Mutation::UpdateLink { link, index })
    }
}
