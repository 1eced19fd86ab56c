//! Top-level event loop owning the process lifetime.
//!
//! ```text
//! SignalWatchJob ─┐
//! HeartbeatJob  ──┼──► response channel ──► Supervisor ──► control channel ──► DnsListener
//! DnsListener   ──┘         (cap 1)                          (cap 1)
//! ```
//!
//! Heartbeats are relayed with `try_send` only. A full control channel
//! already holds an undelivered heartbeat, so the new one is coalesced into
//! it: at most one heartbeat is ever pending and the loop never waits on the
//! listener.

use crate::runner::RunningJobs;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use twirl_domain::{Event, ShutdownSignal};
use twirl_infrastructure::bus::{EventReceiver, EventSender};

const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 3;

/// What the supervisor saw before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    pub heartbeats_received: u64,
    pub heartbeats_relayed: u64,
    /// Heartbeats folded into one already pending on the control channel.
    pub heartbeats_coalesced: u64,
    pub statuses_logged: u64,
    /// `None` when the loop ended because every producer went away.
    pub signal: Option<ShutdownSignal>,
    pub jobs_stopped: usize,
}

pub struct Supervisor {
    responses: EventReceiver,
    control: Option<EventSender>,
    jobs: RunningJobs,
    shutdown: CancellationToken,
    shutdown_grace: Duration,
    span: Span,
}

impl Supervisor {
    pub fn new(responses: EventReceiver) -> Self {
        Self {
            responses,
            control: None,
            jobs: RunningJobs::default(),
            shutdown: CancellationToken::new(),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
            span: info_span!("supervisor"),
        }
    }

    /// Control inlet of the listener; heartbeats are relayed there.
    pub fn with_control(mut self, control: EventSender) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_jobs(mut self, jobs: RunningJobs) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub async fn run(self) -> SupervisorReport {
        let span = self.span.clone();
        self.supervise().instrument(span).await
    }

    async fn supervise(mut self) -> SupervisorReport {
        let mut report = SupervisorReport::default();
        let mut running = true;

        while running {
            match self.responses.recv().await {
                Some(Event::Signal(signal)) => {
                    info!(%signal, "Signal received");
                    report.signal = Some(signal);
                    running = false;
                }
                Some(Event::Heartbeat(at)) => {
                    report.heartbeats_received += 1;
                    self.relay_heartbeat(Event::Heartbeat(at), &mut report);
                }
                Some(Event::Status(text)) => {
                    report.statuses_logged += 1;
                    info!("Got {}", text);
                }
                None => {
                    warn!("Every producer has gone away");
                    running = false;
                }
            }
        }

        report.jobs_stopped = self.stop(report.signal).await;

        info!(
            heartbeats_received = report.heartbeats_received,
            heartbeats_relayed = report.heartbeats_relayed,
            heartbeats_coalesced = report.heartbeats_coalesced,
            statuses_logged = report.statuses_logged,
            jobs_stopped = report.jobs_stopped,
            "Ending"
        );
        report
    }

    fn relay_heartbeat(&mut self, event: Event, report: &mut SupervisorReport) {
        let Some(control) = &self.control else {
            debug!("No listener attached; heartbeat not relayed");
            return;
        };

        match control.try_send(event) {
            Ok(()) => report.heartbeats_relayed += 1,
            Err(TrySendError::Full(_)) => {
                report.heartbeats_coalesced += 1;
                warn!("Control channel is blocked; previous heartbeat still pending");
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Control channel closed; listener is no longer running");
                self.control = None;
            }
        }
    }

    /// Tells the listener, cancels every job and joins them within the grace period.
    async fn stop(&mut self, signal: Option<ShutdownSignal>) -> usize {
        if let (Some(control), Some(signal)) = (&self.control, signal) {
            if control.try_send(Event::Signal(signal)).is_err() {
                debug!("Control channel busy; listener will stop on cancellation");
            }
        }
        self.shutdown.cancel();

        let jobs = std::mem::take(&mut self.jobs);
        jobs.join_until(Instant::now() + self.shutdown_grace).await
    }
}
