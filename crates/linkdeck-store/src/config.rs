use serde::{Deserialize, Serialize};

/// What the store does when `removeLink` or `updateLink` names an index
/// that does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexPolicy {
    /// Fail with [`StoreError::IndexOutOfRange`](crate::StoreError) and leave
    /// the state untouched.
    #[default]
    Reject,
    /// Log a warning and leave the state untouched.
    Ignore,
}

/// Configuration for an [`InMemoryStore`](crate::InMemoryStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Out-of-range handling for index-based mutations.
    pub index_policy: IndexPolicy,
    /// Capacity of each subscriber's broadcast channel.
    pub channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_policy: IndexPolicy::Reject,
            channel_capacity: 1024,
        }
    }
}

impl StoreConfig {
    /// A configuration that silently drops out-of-range mutations.
    pub fn lenient() -> Self {
        Self {
            index_policy: IndexPolicy::Ignore,
            ..Default::default()
        }
    }
}
