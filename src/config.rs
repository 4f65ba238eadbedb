use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::fs::atomic_write;

/// default branch created by `init`
pub const DEFAULT_BRANCH: &str = "master";

/// default zstd level for stored objects
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// repository configuration stored in config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// branch created and checked out by init
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// zstd level used when writing objects
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file, staging the new content in `tmp_dir`
    pub fn save(&self, tmp_dir: &Path, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        atomic_write(tmp_dir, path, content.as_bytes())
    }

    /// override the default branch name
    pub fn with_default_branch(mut self, name: impl Into<String>) -> Self {
        self.default_branch = name.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            compression_level: default_compression_level(),
        }
    }
}
