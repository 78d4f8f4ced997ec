pub mod types;

pub use types::{BranchesConfig, Config, GithubConfig, PatternsConfig};

use anyhow::{ensure, Context, Result};
use std::path::Path;
use tracing::debug;

/// File name looked up in the repository root when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "release-check.toml";

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.github.timeout_secs > 0,
            "github.timeout_secs must be at least 1 (got 0)"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load `explicit` if given, else `release-check.toml` under `repo_root`
    /// if present, else the defaults.
    pub fn discover(explicit: Option<&Path>, repo_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = repo_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!("Using config file {}", candidate.display());
            Self::load(&candidate)
        } else {
            debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
