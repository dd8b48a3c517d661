//! Participant configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every participant endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum gap between two queued deliveries to the same participant.
    pub message_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            message_delay: Duration::from_millis(100),
        }
    }
}
