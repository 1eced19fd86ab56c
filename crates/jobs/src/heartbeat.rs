use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, trace, Instrument, Span};
use twirl_domain::Event;
use twirl_infrastructure::bus::EventSender;

const DEFAULT_INTERVAL_SECS: u64 = 2;
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Emits one `Heartbeat` into the response channel per interval.
pub struct HeartbeatJob {
    responses: EventSender,
    interval: Duration,
    shutdown: CancellationToken,
    span: Span,
}

impl HeartbeatJob {
    pub fn new(responses: EventSender) -> Self {
        Self {
            responses,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            shutdown: CancellationToken::new(),
            span: info_span!("heartbeat"),
        }
    }

    /// Intervals shorter than one millisecond are raised to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(self) {
        let span = self.span.clone();
        self.beat().instrument(span).await
    }

    async fn beat(self) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting heartbeat job"
        );

        // First beat after one full interval, not immediately.
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("HeartbeatJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let event = Event::heartbeat_now();
                    trace!(event = ?event, "Heartbeat");
                    tokio::select! {
                        sent = self.responses.send(event) => {
                            if sent.is_err() {
                                info!("HeartbeatJob: response channel closed");
                                break;
                            }
                        }
                        _ = self.shutdown.cancelled() => {
                            info!("HeartbeatJob: shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }
}
