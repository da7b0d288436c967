use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or stepping a simulation.
///
/// Configuration problems are rejected before the first step runs. Anything raised by a step
/// means the write buffer is incomplete, so the simulation cannot continue from it.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected body count, worker count or physical parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),

    /// A worker panicked before finishing its interval.
    #[error("worker {worker} panicked during step")]
    WorkerPanicked { worker: usize },

    /// An earlier step failed and left the per-body state partially advanced.
    #[error("simulation state is poisoned by an earlier failed step")]
    Poisoned,

    /// The pooled backend could not be created.
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Scenario file could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Scenario file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
