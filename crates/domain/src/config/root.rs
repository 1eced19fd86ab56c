use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::timers::TimersConfig;

const LOCAL_CONFIG_PATH: &str = "twirl.toml";

/// Main configuration structure for Twirl
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (port, bind address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Heartbeat, read deadline and shutdown timings
    #[serde(default)]
    pub timers: TimersConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. twirl.toml in current directory
    /// 3. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(ms) = overrides.heartbeat_interval_ms {
            self.timers.heartbeat_interval_ms = ms;
        }
        if overrides.disable_listener {
            self.server.listener_enabled = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timers.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "Heartbeat interval cannot be 0".to_string(),
            ));
        }

        if self.timers.read_deadline_ms == 0 {
            return Err(ConfigError::Validation(
                "Read deadline cannot be 0".to_string(),
            ));
        }

        if self.server.listener_enabled {
            let addr = self.server.listen_address();
            addr.parse::<SocketAddr>().map_err(|e| {
                ConfigError::Validation(format!("Invalid listen address '{}': {}", addr, e))
            })?;
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
    pub heartbeat_interval_ms: Option<u64>,
    pub disable_listener: bool,
}
