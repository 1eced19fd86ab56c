use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use twirl_domain::{Event, ShutdownSignal};
use twirl_infrastructure::bus::{control_channel, response_channel};
use twirl_jobs::{HeartbeatJob, JobRunner, Supervisor};

mod helpers;
use helpers::WAIT;

#[tokio::test]
async fn test_signal_ends_the_loop() {
    let (tx, rx) = response_channel();
    let token = CancellationToken::new();
    let handle = tokio::spawn(Supervisor::new(rx).with_shutdown_token(token.clone()).run());

    tx.send(Event::Signal(ShutdownSignal::Interrupt)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.signal, Some(ShutdownSignal::Interrupt));
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_heartbeats_coalesce_when_listener_is_slow() {
    let (tx, rx) = response_channel();
    let (control_tx, mut control_rx) = control_channel();
    let handle = tokio::spawn(Supervisor::new(rx).with_control(control_tx).run());

    for _ in 0..5 {
        tx.send(Event::heartbeat_now()).await.unwrap();
    }
    tx.send(Event::Signal(ShutdownSignal::Terminate)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.heartbeats_received, 5);
    assert_eq!(report.heartbeats_relayed, 1);
    assert_eq!(report.heartbeats_coalesced, 4);

    // Exactly one heartbeat was ever pending; the signal found no room.
    assert!(matches!(control_rx.try_recv(), Ok(Event::Heartbeat(_))));
    assert!(matches!(
        control_rx.try_recv(),
        Err(TryRecvError::Disconnected) | Err(TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_heartbeats_relay_when_listener_keeps_up() {
    let (tx, rx) = response_channel();
    let (control_tx, mut control_rx) = control_channel();
    let handle = tokio::spawn(Supervisor::new(rx).with_control(control_tx).run());

    for _ in 0..3 {
        tx.send(Event::heartbeat_now()).await.unwrap();
        let relayed = timeout(WAIT, control_rx.recv()).await.unwrap().unwrap();
        assert!(matches!(relayed, Event::Heartbeat(_)));
    }
    tx.send(Event::Signal(ShutdownSignal::Interrupt)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.heartbeats_relayed, 3);
    assert_eq!(report.heartbeats_coalesced, 0);
}

#[tokio::test]
async fn test_signal_is_forwarded_to_listener() {
    let (tx, rx) = response_channel();
    let (control_tx, mut control_rx) = control_channel();
    let handle = tokio::spawn(Supervisor::new(rx).with_control(control_tx).run());

    tx.send(Event::Signal(ShutdownSignal::Quit)).await.unwrap();
    timeout(WAIT, handle).await.unwrap().unwrap();

    assert_eq!(
        control_rx.try_recv().unwrap(),
        Event::Signal(ShutdownSignal::Quit)
    );
}

#[tokio::test]
async fn test_identical_statuses_are_each_logged() {
    let (tx, rx) = response_channel();
    let handle = tokio::spawn(Supervisor::new(rx).run());

    for _ in 0..4 {
        tx.send(Event::status("Heartbeat on control channel"))
            .await
            .unwrap();
    }
    tx.send(Event::Signal(ShutdownSignal::Interrupt)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.statuses_logged, 4);
}

#[tokio::test]
async fn test_without_listener_heartbeats_are_not_relayed() {
    let (tx, rx) = response_channel();
    let handle = tokio::spawn(Supervisor::new(rx).run());

    tx.send(Event::heartbeat_now()).await.unwrap();
    tx.send(Event::Signal(ShutdownSignal::Interrupt)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.heartbeats_received, 1);
    assert_eq!(report.heartbeats_relayed, 0);
    assert_eq!(report.heartbeats_coalesced, 0);
}

#[tokio::test]
async fn test_closed_control_channel_stops_relaying() {
    let (tx, rx) = response_channel();
    let (control_tx, control_rx) = control_channel();
    drop(control_rx);
    let handle = tokio::spawn(Supervisor::new(rx).with_control(control_tx).run());

    tx.send(Event::heartbeat_now()).await.unwrap();
    tx.send(Event::heartbeat_now()).await.unwrap();
    tx.send(Event::Signal(ShutdownSignal::Interrupt)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.heartbeats_received, 2);
    assert_eq!(report.heartbeats_relayed, 0);
    assert_eq!(report.heartbeats_coalesced, 0);
}

#[tokio::test]
async fn test_loop_ends_when_all_producers_are_gone() {
    let (tx, rx) = response_channel();
    let handle = tokio::spawn(Supervisor::new(rx).run());
    drop(tx);

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.signal, None);
}

#[tokio::test]
async fn test_jobs_are_joined_on_shutdown() {
    let (tx, rx) = response_channel();
    let token = CancellationToken::new();
    let jobs = JobRunner::new()
        .with_heartbeat(HeartbeatJob::new(tx.clone()).with_interval(Duration::from_secs(3600)))
        .with_shutdown_token(token.clone())
        .start();

    let handle = tokio::spawn(
        Supervisor::new(rx)
            .with_jobs(jobs)
            .with_shutdown_token(token)
            .run(),
    );
    tx.send(Event::Signal(ShutdownSignal::Interrupt)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.jobs_stopped, 1);
}

#[tokio::test]
async fn test_stuck_jobs_are_aborted_after_grace() {
    let (tx, rx) = response_channel();
    // No shared token: the heartbeat never hears about the shutdown.
    let jobs = JobRunner::new()
        .with_heartbeat(HeartbeatJob::new(tx.clone()).with_interval(Duration::from_secs(3600)))
        .start();

    let handle = tokio::spawn(
        Supervisor::new(rx)
            .with_jobs(jobs)
            .with_shutdown_grace(Duration::from_millis(50))
            .run(),
    );
    tx.send(Event::Signal(ShutdownSignal::Interrupt)).await.unwrap();

    let report = timeout(WAIT, handle).await.unwrap().unwrap();
    assert_eq!(report.jobs_stopped, 0);
}
