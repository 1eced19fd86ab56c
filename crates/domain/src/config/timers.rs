use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimersConfig {
    /// Pause between two heartbeat events.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Upper bound on a single socket read; the listener checks its
    /// control inlet at least this often.
    #[serde(default = "default_read_deadline_ms")]
    pub read_deadline_ms: u64,

    /// How long the supervisor waits for tasks to finish after a signal.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl TimersConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn read_deadline(&self) -> Duration {
        Duration::from_millis(self.read_deadline_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            read_deadline_ms: default_read_deadline_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

fn default_heartbeat_interval_ms() -> u64 {
    2_000
}

fn default_read_deadline_ms() -> u64 {
    1_000
}

fn default_shutdown_grace_ms() -> u64 {
    3_000
}
