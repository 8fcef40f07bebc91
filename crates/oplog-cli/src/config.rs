//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};

use oplog_core::ActivityRules;

fn default_max_in_flight() -> usize {
    8
}

/// Application configuration.
///
/// `key` and `url` have no defaults; a config without them is a startup
/// error.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenProject API key, sent as the Basic Auth password.
    pub key: String,
    /// Time-entries endpoint URL.
    pub url: String,
    /// Cap on concurrent in-flight submissions.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Activity classification rules.
    pub activity: ActivityRules,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("key", &"[REDACTED]")
            .field("url", &self.url)
            .field("max_in_flight", &self.max_in_flight)
            .field("activity", &self.activity)
            .finish()
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Layering, later wins: `~/.config/oplog/config.toml`, then the given
    /// file, then `OPLOG_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (OPLOG_*)
        figment = figment.merge(Env::prefixed("OPLOG_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for oplog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("oplog"))
}
