//! Bridges OS termination signals into `Event::Signal`.
//!
//! ## Unix
//! Registered: `SIGINT`, `SIGTERM`, `SIGQUIT`. `SIGKILL` and `SIGSTOP`
//! cannot be caught and are never registered.
//!
//! ## Other platforms
//! Only Ctrl-C via [`tokio::signal::ctrl_c`].

use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument, Span};
use twirl_domain::{DomainError, Event, ShutdownSignal};
use twirl_infrastructure::bus::EventSender;

/// Registered signal streams. Registration must happen inside a tokio runtime.
#[cfg(unix)]
pub struct ShutdownSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    pub fn register() -> Result<Self, DomainError> {
        use tokio::signal::unix::{signal, SignalKind};

        let register = |kind: SignalKind| {
            signal(kind).map_err(|e| DomainError::SignalRegistration(e.to_string()))
        };

        Ok(Self {
            interrupt: register(SignalKind::interrupt())?,
            terminate: register(SignalKind::terminate())?,
            quit: register(SignalKind::quit())?,
        })
    }

    /// Waits for the next signal. `None` once every stream has ended.
    pub async fn recv(&mut self) -> Option<ShutdownSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ShutdownSignal::Interrupt),
            Some(()) = self.terminate.recv() => Some(ShutdownSignal::Terminate),
            Some(()) = self.quit.recv() => Some(ShutdownSignal::Quit),
            else => None,
        }
    }
}

#[cfg(not(unix))]
pub struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    pub fn register() -> Result<Self, DomainError> {
        Ok(Self)
    }

    pub async fn recv(&mut self) -> Option<ShutdownSignal> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|_| ShutdownSignal::Interrupt)
    }
}

pub struct SignalWatchJob {
    responses: EventSender,
    signals: Option<ShutdownSignals>,
    shutdown: CancellationToken,
    span: Span,
}

impl SignalWatchJob {
    pub fn new(responses: EventSender) -> Self {
        Self {
            responses,
            signals: None,
            shutdown: CancellationToken::new(),
            span: info_span!("signal_watch"),
        }
    }

    /// Registers the signal handlers now instead of when the job starts.
    pub fn register(mut self) -> Result<Self, DomainError> {
        self.signals = Some(ShutdownSignals::register()?);
        Ok(self)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(self) {
        let span = self.span.clone();
        self.watch().instrument(span).await
    }

    async fn watch(mut self) {
        let mut signals = match self.signals.take() {
            Some(signals) => signals,
            None => match ShutdownSignals::register() {
                Ok(signals) => signals,
                Err(e) => {
                    error!(error = %e, "Signal watcher failed to start");
                    let _ = self
                        .responses
                        .send(Event::status(format!("signal watcher unavailable: {}", e)))
                        .await;
                    return;
                }
            },
        };

        loop {
            let signal = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("SignalWatchJob: shutting down");
                    break;
                }
                received = signals.recv() => match received {
                    Some(signal) => signal,
                    None => break,
                },
            };

            info!(%signal, "Caught signal");
            tokio::select! {
                sent = self.responses.send(Event::Signal(signal)) => {
                    if sent.is_err() {
                        break;
                    }
                }
                _ = self.shutdown.cancelled() => break,
            }
        }
    }
}
