use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Malformed DNS question #{index}: {reason}")]
    MalformedQuestion { index: u16, reason: String },

    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Signal registration failed: {0}")]
    SignalRegistration(String),
}
