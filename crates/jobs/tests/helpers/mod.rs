#![allow(dead_code)]

use std::time::Duration;
use tokio::time::timeout;
use twirl_domain::Event;
use twirl_infrastructure::bus::EventReceiver;

pub const WAIT: Duration = Duration::from_secs(2);

pub async fn next_event(rx: &mut EventReceiver) -> Event {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}
