#![cfg(unix)]

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use twirl_domain::{Event, ShutdownSignal};
use twirl_infrastructure::bus::response_channel;
use twirl_jobs::SignalWatchJob;

mod helpers;
use helpers::{next_event, WAIT};

#[tokio::test]
async fn test_sigterm_becomes_signal_event() {
    let (tx, mut rx) = response_channel();
    let token = CancellationToken::new();
    let job = SignalWatchJob::new(tx)
        .register()
        .unwrap()
        .with_cancellation(token.clone());
    let handle = tokio::spawn(job.run());

    unsafe {
        libc::kill(libc::getpid(), libc::SIGTERM);
    }

    assert_eq!(
        next_event(&mut rx).await,
        Event::Signal(ShutdownSignal::Terminate)
    );

    token.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_watcher_stops_on_cancellation() {
    let (tx, _rx) = response_channel();
    let token = CancellationToken::new();
    let handle = tokio::spawn(SignalWatchJob::new(tx).with_cancellation(token.clone()).run());

    token.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}
