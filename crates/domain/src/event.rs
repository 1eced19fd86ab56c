use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Catchable termination signals. Uncatchable ones (SIGKILL, SIGSTOP) have
/// no variant because they can never be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownSignal {
    /// Interactive interrupt (Ctrl-C, SIGINT).
    Interrupt,
    /// SIGTERM, as sent by service managers.
    Terminate,
    /// SIGQUIT.
    Quit,
}

impl ShutdownSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message passed between the supervisor and its background tasks.
///
/// Values are immutable once built; the variant alone decides how a
/// receiver interprets the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A termination signal was received. Terminal.
    Signal(ShutdownSignal),
    /// Periodic liveness pulse carrying the time it was generated.
    Heartbeat(DateTime<Utc>),
    /// Free-form diagnostic text.
    Status(Arc<str>),
}

impl Event {
    pub fn heartbeat_now() -> Self {
        Event::Heartbeat(Utc::now())
    }

    pub fn status(text: impl Into<Arc<str>>) -> Self {
        Event::Status(text.into())
    }
}
