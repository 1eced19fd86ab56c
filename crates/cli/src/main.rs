use clap::Parser;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use twirl_domain::CliOverrides;
use twirl_infrastructure::bus::{control_channel, response_channel};
use twirl_infrastructure::dns::DnsListener;
use twirl_jobs::{HeartbeatJob, JobRunner, SignalWatchJob, Supervisor};

mod bootstrap;

#[derive(Parser)]
#[command(name = "twirl")]
#[command(version)]
#[command(about = "Twirl - event-driven DNS query listener")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// UDP port the DNS listener binds
    #[arg(short = 'p', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Heartbeat interval in milliseconds
    #[arg(long, value_name = "MS")]
    heartbeat_ms: Option<u64>,

    /// Run without the DNS listener (signals and heartbeats only)
    #[arg(long)]
    no_listener: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
        heartbeat_interval_ms: cli.heartbeat_ms,
        disable_listener: cli.no_listener,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting");

    let shutdown = CancellationToken::new();
    let (responses_tx, responses_rx) = response_channel();

    // Register before anything else runs so an early Ctrl-C is caught.
    let signal_watch = match SignalWatchJob::new(responses_tx.clone()).register() {
        Ok(job) => job,
        Err(e) => {
            warn!(error = %e, "Signal registration failed; retrying when the watcher starts");
            SignalWatchJob::new(responses_tx.clone())
        }
    };
    let heartbeat = HeartbeatJob::new(responses_tx.clone())
        .with_interval(config.timers.heartbeat_interval());

    let mut runner = JobRunner::new()
        .with_signal_watch(signal_watch)
        .with_heartbeat(heartbeat)
        .with_shutdown_token(shutdown.clone());

    let mut supervisor = Supervisor::new(responses_rx)
        .with_shutdown_token(shutdown.clone())
        .with_shutdown_grace(config.timers.shutdown_grace());

    if config.server.listener_enabled {
        let addr: SocketAddr = config.server.listen_address().parse()?;
        let (control_tx, control_rx) = control_channel();

        let listener = DnsListener::new(addr, control_rx, responses_tx.clone())
            .with_read_deadline(config.timers.read_deadline());

        runner = runner.with_listener(listener);
        supervisor = supervisor.with_control(control_tx);
    } else {
        info!("DNS listener disabled");
    }

    drop(responses_tx);

    let report = supervisor.with_jobs(runner.start()).run().await;
    debug!(report = ?report, "Supervisor finished");

    Ok(())
}
