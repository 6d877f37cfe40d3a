//! Application state store for linkdeck.
//!
//! The store holds the client's view of server state: a session flag that
//! records whether the user is authorized, and an ordered collection of link
//! records. Views read the state to render it; routing guards and API
//! response handlers change it by committing named mutations.
//!
//! # Architecture
//!
//! - **Session** is a single boolean. `authorize` sets it, `deAuthorize`
//!   clears it, and both are idempotent.
//! - **Links** are opaque records of any type `L`. The store never inspects
//!   them; it only stores, replaces, or removes them. Their order is the
//!   rendering order.
//! - **Mutations** are the only way to change state. Each one is applied
//!   atomically under a single write guard and runs to completion.
//! - **Commit events** are broadcast to subscribers after every applied
//!   mutation, in commit order.
//!
//! # Modules
//!
//! - [`error`]: Error types for store operations
//! - [`config`]: [`StoreConfig`] and the out-of-range [`IndexPolicy`]
//! - [`state`]: The [`StoreState`] snapshot and its mutation rules
//! - [`mutation`]: The [`Mutation`] command enum and [`MutationKind`]
//! - [`event`]: [`CommitEvent`] and subscription filtering
//! - [`traits`]: The [`StateStore`] trait defining the store interface
//! - [`memory`]: The `RwLock`-backed [`InMemoryStore`]

pub mod config;
pub mod error;
pub mod event;
pub mod memory;
pub mod mutation;
pub mod state;
pub mod traits;

pub use config::{IndexPolicy, StoreConfig};
pub use error::{Result, StoreError};
pub use event::{CommitEvent, CommitStream, MutationFilter, TryRecvError};
pub use memory::InMemoryStore;
pub use mutation::{Mutation, MutationKind};
pub use state::StoreState;
pub use traits::StateStore;
