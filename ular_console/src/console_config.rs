use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use ular_client::config::ClientConfig;


pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Terminal client settings. Everything the browser client knows is accepted at the top level as
// well, e.g.:
//
//   request_timeout: 5s
//   poll_interval: 2s
//   default_topic: kimia
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(flatten)]
    pub client: ClientConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client: ClientConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_yaml(s: &str) -> Result<Self, serde_yaml::Error> { serde_yaml::from_str(s) }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("cannot parse config {}", path.display()))
    }
}
