//! Bounded event channels connecting the supervisor to its tasks.
//!
//! Both the response channel (tasks → supervisor) and the control channel
//! (supervisor → listener) hold a single event. A second `send` waits until
//! the first is consumed; a second `try_send` fails with `Full`. Nothing is
//! ever overwritten.

use tokio::sync::mpsc;
use twirl_domain::Event;

pub const CHANNEL_CAPACITY: usize = 1;

pub type EventSender = mpsc::Sender<Event>;
pub type EventReceiver = mpsc::Receiver<Event>;

/// Inlet through which every background task reports to the supervisor.
pub fn response_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Inlet through which the supervisor relays control events to the listener.
pub fn control_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(CHANNEL_CAPACITY)
}
