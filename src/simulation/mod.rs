pub mod states;
pub mod params;
pub mod engine;
pub mod partition;
pub mod forces;
pub mod integrator;
pub mod scheduler;
pub mod initial;
pub mod scenario;
