pub mod heartbeat;
pub mod runner;
pub mod signal_watch;
pub mod supervisor;

pub use heartbeat::HeartbeatJob;
pub use runner::{JobRunner, RunningJobs};
pub use signal_watch::{ShutdownSignals, SignalWatchJob};
pub use supervisor::{Supervisor, SupervisorReport};
