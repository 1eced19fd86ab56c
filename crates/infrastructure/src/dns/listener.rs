//! UDP listener that logs the questions of inbound DNS queries.
//!
//! The listener alternates between two phases until it closes:
//!
//! ```text
//! Listening ── read (≤ deadline) ──► Draining ── control inlet empty ──► Listening
//!     │                                 │
//!     └── fatal socket error ──► Closed ◄── Signal on control inlet
//! ```
//!
//! A socket read never outlives the read deadline and the control inlet is
//! only ever polled with `try_recv`, so a `Signal` is acted on within one
//! deadline of being enqueued. The socket is dropped on every exit path.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, trace, warn, Instrument, Span};
use twirl_domain::{DomainError, Event};

use super::events::{QuestionEmitter, QuestionEvent};
use super::question_reader::QuestionReader;
use super::socket::bind_udp_socket;
use crate::bus::{EventReceiver, EventSender};

/// Largest possible UDP payload.
const MAX_DATAGRAM_SIZE: usize = 65_536;

const DEFAULT_READ_DEADLINE: Duration = Duration::from_secs(1);

pub const HEARTBEAT_STATUS: &str = "Heartbeat on control channel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerState {
    Listening,
    Draining,
    Closed,
}

/// Why the listener task returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerExit {
    /// A `Signal` arrived on the control inlet.
    Signalled,
    /// The shutdown token was cancelled.
    Cancelled,
    /// The socket could not be bound; the loop never started.
    BindFailed,
    /// A non-timeout read error.
    SocketFailed,
    /// The supervisor dropped one of the channels.
    SupervisorGone,
}

pub struct DnsListener {
    bind_addr: SocketAddr,
    read_deadline: Duration,
    control: EventReceiver,
    responses: EventSender,
    emitter: QuestionEmitter,
    socket: Option<UdpSocket>,
    shutdown: CancellationToken,
    span: Span,
}

impl DnsListener {
    pub fn new(bind_addr: SocketAddr, control: EventReceiver, responses: EventSender) -> Self {
        Self {
            bind_addr,
            read_deadline: DEFAULT_READ_DEADLINE,
            control,
            responses,
            emitter: QuestionEmitter::new_disabled(),
            socket: None,
            shutdown: CancellationToken::new(),
            span: info_span!("dns_listener", addr = %bind_addr),
        }
    }

    pub fn with_read_deadline(mut self, deadline: Duration) -> Self {
        self.read_deadline = deadline;
        self
    }

    pub fn with_emitter(mut self, emitter: QuestionEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Uses an already bound socket instead of binding `bind_addr` on start.
    pub fn with_socket(mut self, socket: UdpSocket) -> Self {
        if let Ok(addr) = socket.local_addr() {
            self.bind_addr = addr;
            self.span = info_span!("dns_listener", addr = %addr);
        }
        self.socket = Some(socket);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub async fn run(self) -> ListenerExit {
        let span = self.span.clone();
        self.serve().instrument(span).await
    }

    async fn serve(mut self) -> ListenerExit {
        let socket = match self.socket.take() {
            Some(socket) => socket,
            None => match bind_udp_socket(self.bind_addr) {
                Ok(socket) => socket,
                Err(e) => {
                    error!(error = %e, "DNS listener failed to start");
                    let _ = self
                        .report(Event::status(format!("DNS listener unavailable: {}", e)))
                        .await;
                    return ListenerExit::BindFailed;
                }
            },
        };

        info!(
            read_deadline_ms = self.read_deadline.as_millis() as u64,
            "DNS listener ready"
        );

        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut state = ListenerState::Listening;
        let mut exit = ListenerExit::Cancelled;

        while state != ListenerState::Closed {
            let step = match state {
                ListenerState::Listening => self.poll_socket(&socket, &mut buffer).await,
                ListenerState::Draining => self.drain_control().await,
                ListenerState::Closed => break,
            };

            state = match (state, step) {
                (_, Err(reason)) => {
                    exit = reason;
                    ListenerState::Closed
                }
                (ListenerState::Listening, Ok(())) => ListenerState::Draining,
                (_, Ok(())) => ListenerState::Listening,
            };
        }

        drop(socket);
        info!(exit = ?exit, "DNS listener closed");
        exit
    }

    /// One bounded read. Timeouts and transient errors are normal ticks.
    async fn poll_socket(
        &self,
        socket: &UdpSocket,
        buffer: &mut [u8],
    ) -> Result<(), ListenerExit> {
        let read = tokio::select! {
            _ = self.shutdown.cancelled() => return Err(ListenerExit::Cancelled),
            read = tokio::time::timeout(self.read_deadline, socket.recv_from(buffer)) => read,
        };

        match read {
            Err(_) => {
                trace!("Read deadline reached");
                Ok(())
            }
            Ok(Ok((len, peer))) => {
                self.inspect(&buffer[..len], peer);
                Ok(())
            }
            Ok(Err(e)) if is_transient(&e) => {
                debug!(error = %e, "Transient UDP read error");
                Ok(())
            }
            Ok(Err(e)) => {
                let err = DomainError::Socket(e.to_string());
                error!(error = %err, "DNS listener read failed");
                let _ = self
                    .report(Event::status(format!("DNS listener stopped: {}", err)))
                    .await;
                Err(ListenerExit::SocketFailed)
            }
        }
    }

    fn inspect(&self, packet: &[u8], peer: SocketAddr) {
        debug!(len = packet.len(), %peer, "Got a datagram");

        let reader = match QuestionReader::new(packet) {
            Ok(reader) => reader,
            Err(e) => {
                warn!(%peer, error = %e, "Unparseable DNS message");
                return;
            }
        };

        let id = reader.id();
        for item in reader {
            match item {
                Ok(question) => {
                    info!(
                        %peer,
                        id,
                        record_type = %question.record_type,
                        "Got a question for {}",
                        question.name
                    );
                    self.emitter.emit(QuestionEvent::new(question, peer));
                }
                Err(e) => warn!(%peer, id, error = %e, "Unparseable DNS question"),
            }
        }
    }

    /// Consumes every queued control event without waiting.
    async fn drain_control(&mut self) -> Result<(), ListenerExit> {
        loop {
            match self.control.try_recv() {
                Ok(Event::Heartbeat(at)) => {
                    debug!(%at, "Heartbeat observed on control channel");
                    self.report(Event::status(HEARTBEAT_STATUS)).await?;
                }
                Ok(Event::Signal(signal)) => {
                    info!(%signal, "Shutdown requested on control channel");
                    return Err(ListenerExit::Signalled);
                }
                Ok(Event::Status(text)) => {
                    debug!(status = %text, "Ignoring status on control channel");
                }
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(ListenerExit::SupervisorGone),
            }
        }
    }

    /// Blocking send into the response channel, abandoned on shutdown.
    async fn report(&self, event: Event) -> Result<(), ListenerExit> {
        tokio::select! {
            sent = self.responses.send(event) => {
                sent.map_err(|_| ListenerExit::SupervisorGone)
            }
            _ = self.shutdown.cancelled() => Err(ListenerExit::Cancelled),
        }
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}
