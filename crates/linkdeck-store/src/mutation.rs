//! Named mutation commands.
//!
//! A [`Mutation`] is the unit of change the store accepts. Its JSON form
//! keeps the names API response handlers already dispatch with:
//!
//! ```text
//! {"type": "addLink", "payload": {...}}
//! {"type": "updateLink", "payload": {"link": {...}, "ind": 2}}
//! {"type": "removeLink", "payload": 2}
//! {"type": "drainLinks"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A synchronous, atomic state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Mutation<L> {
    /// Mark the session as authorized.
    Authorize,
    /// Mark the session as not authorized.
    DeAuthorize,
    /// Replace the whole link collection, keeping the given order.
    HydrateLinks(Vec<L>),
    /// Empty the link collection.
    DrainLinks,
    /// Append a link to the end of the collection.
    AddLink(L),
    /// Remove the link at a position; later links shift down by one.
    RemoveLink(usize),
    /// Replace the link at a position in place.
    UpdateLink {
        link: L,
        #[serde(rename = "ind")]
        index: usize,
    },
}

impl<L> Mutation<L> {
    /// The payload-free discriminant of this mutation.
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Authorize => MutationKind::Authorize,
            Mutation::DeAuthorize => MutationKind::DeAuthorize,
            Mutation::HydrateLinks(_) => MutationKind::HydrateLinks,
            Mutation::DrainLinks => MutationKind::DrainLinks,
            Mutation::AddLink(_) => MutationKind::AddLink,
            Mutation::RemoveLink(_) => MutationKind::RemoveLink,
            Mutation::UpdateLink { .. } => MutationKind::UpdateLink,
        }
    }
}

/// Identifies a mutation without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    Authorize,
    DeAuthorize,
    HydrateLinks,
    DrainLinks,
    AddLink,
    RemoveLink,
    UpdateLink,
}

impl MutationKind {
    /// Every mutation kind, in declaration order.
    pub const ALL: [MutationKind; 7] = [
        MutationKind::Authorize,
        MutationKind::DeAuthorize,
        MutationKind::HydrateLinks,
        MutationKind::DrainLinks,
        MutationKind::AddLink,
        MutationKind::RemoveLink,
        MutationKind::UpdateLink,
    ];

    /// The name handlers commit this mutation under.
    pub fn name(&self) -> &'static str {
        match self {
            MutationKind::Authorize => "authorize",
            MutationKind::DeAuthorize => "deAuthorize",
            MutationKind::HydrateLinks => "hydrateLinks",
            MutationKind::DrainLinks => "drainLinks",
            MutationKind::AddLink => "addLink",
            MutationKind::RemoveLink => "removeLink",
            MutationKind::UpdateLink => "updateLink",
        }
    }

    /// Returns `true` if this kind changes the session flag.
    pub fn touches_session(&self) -> bool {
        matches!(self, MutationKind::Authorize | MutationKind::DeAuthorize)
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
