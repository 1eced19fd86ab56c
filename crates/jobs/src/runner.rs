use crate::{HeartbeatJob, SignalWatchJob};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use twirl_infrastructure::dns::DnsListener;

pub trait SpawnableJob: Send + 'static {
    const NAME: &'static str;

    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self) -> JoinHandle<()>;
}

macro_rules! impl_spawnable_job {
    ($t:ty, $name:literal) => {
        impl SpawnableJob for $t {
            const NAME: &'static str = $name;

            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn start_job(self) -> JoinHandle<()> {
                tokio::spawn(async move {
                    self.run().await;
                })
            }
        }
    };
}

impl_spawnable_job!(HeartbeatJob, "heartbeat");
impl_spawnable_job!(SignalWatchJob, "signal_watch");
impl_spawnable_job!(DnsListener, "dns_listener");

fn spawn_job<J: SpawnableJob>(
    job: Option<J>,
    shutdown: &Option<CancellationToken>,
    running: &mut RunningJobs,
) {
    if let Some(job) = job {
        let job = match shutdown {
            Some(token) => job.with_cancellation(token.clone()),
            None => job,
        };
        running.push(J::NAME, job.start_job());
    }
}

/// Spawns the event producers. The listener is optional; without it only
/// signals and heartbeats reach the supervisor.
pub struct JobRunner {
    signal_watch: Option<SignalWatchJob>,
    heartbeat: Option<HeartbeatJob>,
    listener: Option<DnsListener>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            signal_watch: None,
            heartbeat: None,
            listener: None,
            shutdown: None,
        }
    }

    pub fn with_signal_watch(mut self, job: SignalWatchJob) -> Self {
        self.signal_watch = Some(job);
        self
    }

    pub fn with_heartbeat(mut self, job: HeartbeatJob) -> Self {
        self.heartbeat = Some(job);
        self
    }

    pub fn with_listener(mut self, listener: DnsListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub fn start(self) -> RunningJobs {
        info!("Starting background job runner");

        let mut running = RunningJobs::default();
        spawn_job(self.signal_watch, &self.shutdown, &mut running);
        spawn_job(self.heartbeat, &self.shutdown, &mut running);
        spawn_job(self.listener, &self.shutdown, &mut running);

        info!(jobs = running.len(), "All background jobs started");
        running
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles of spawned jobs, joined by the supervisor on shutdown.
#[derive(Default)]
pub struct RunningJobs {
    jobs: Vec<(&'static str, JoinHandle<()>)>,
}

impl RunningJobs {
    fn push(&mut self, name: &'static str, handle: JoinHandle<()>) {
        self.jobs.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|(name, _)| *name).collect()
    }

    /// Waits for every job until `deadline`; stragglers are aborted.
    /// Returns how many jobs finished on their own.
    pub async fn join_until(self, deadline: Instant) -> usize {
        let mut stopped = 0;
        for (name, mut handle) in self.jobs {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(_) => {
                    debug!(job = name, "Job stopped");
                    stopped += 1;
                }
                Err(_) => {
                    warn!(job = name, "Job did not stop within grace period; aborting");
                    handle.abort();
                }
            }
        }
        stopped
    }
}
