pub mod error;
pub mod simulation;
pub mod configuration;
pub mod presentation;
pub mod benchmark;

pub use error::{Error, Result};

pub use simulation::states::{Body, BodyState, NVec2, PositionBuffers, ReadBuffer};
pub use simulation::partition::{Interval, Partition};
pub use simulation::forces::SoftenedGravity;
pub use simulation::integrator::{ForceIntegrator, IntervalKernel, IntervalMut, Snapshot};
pub use simulation::scheduler::FrameScheduler;
pub use simulation::engine::Engine;
pub use simulation::params::Parameters;
pub use simulation::initial::circular_cloud;
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    BodyConfig, CloudConfig, EngineConfig, ParametersConfig, ScenarioConfig, SchedulerConfig,
};

pub use presentation::{Frame, Presenter};
pub use presentation::headless::{run_headless, LogPresenter};

pub use benchmark::benchmark::bench_workers;
