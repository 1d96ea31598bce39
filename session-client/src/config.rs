use std::path::PathBuf;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Where to persist the session; kept in memory when unset.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load `{name}.toml` (optional) with `SESSION_CLIENT__*` environment overrides.
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::with_name(name).required(false))
            // Example: SESSION_CLIENT__BASE_URL=http://localhost:3000
            .add_source(Environment::with_prefix("SESSION_CLIENT").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
