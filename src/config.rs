use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::NUM_CELLS;
use crate::poll::DEFAULT_POLL_INTERVAL;
use crate::protocol::DEFAULT_API_PREFIX;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    // Path under which the game API lives, e.g. "/api/ular/".
    pub api_prefix: String,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    // Board size sent with `createroom`. The client always draws the standard 28-cell board.
    pub max_box: u32,
    pub default_topic: String,
    pub default_color: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_box: NUM_CELLS,
            default_topic: "biologi".to_owned(),
            default_color: "black".to_owned(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> { serde_json::from_str(s) }
}
