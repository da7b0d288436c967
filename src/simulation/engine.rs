//! High-level runtime engine settings
//!
//! Selects how many workers share a step and which fork-join backend runs them.

use crate::configuration::config::SchedulerConfig;

#[derive(Debug, Clone)]
pub struct Engine {
    pub workers: usize, // one interval per worker
    pub scheduler: SchedulerConfig, // scoped threads or rayon pool
}
