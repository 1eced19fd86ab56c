//! Twirl Domain Layer
pub mod config;
pub mod dns_question;
pub mod errors;
pub mod event;

pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, ServerConfig, TimersConfig};
pub use dns_question::DnsQuestion;
pub use errors::DomainError;
pub use event::{Event, ShutdownSignal};
