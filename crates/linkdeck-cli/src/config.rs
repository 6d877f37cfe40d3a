use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use linkdeck_format::DisplayConfig;
use linkdeck_store::StoreConfig;

/// Settings read from the optional `--config` TOML file.
///
/// ```toml
/// [store]
/// index_policy = "ignore"
///
/// [display]
/// offset = "+0200"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("serializing configuration")
    }
}
