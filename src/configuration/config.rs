//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – worker count and fork-join backend
//! - [`ParametersConfig`] – physical constants and the softening rule
//! - [`CloudConfig`]      – optional generated circular cloud of bodies
//! - [`BodyConfig`]       – explicit initial state for individual bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   workers: 4              # 1 <= workers <= body count
//!   scheduler: "scoped"     # or "rayon"
//!
//! parameters:
//!   G: 0.01                 # gravitational constant
//!   softening_d2: 1.0       # squared distance floor
//!   close_damping: 0.999    # velocity factor per close pair
//!   frames: 600             # frames for a headless run
//!
//! cloud:
//!   count: 2000
//!   center: [400.0, 400.0]
//!   radius: 400.0
//!   mass: 1.0
//!   heavy_mass: 100.0       # body 0
//!   seed: 42
//!
//! bodies:                   # appended after the cloud
//!   - x: [ 0.0, 0.0 ]
//!     v: [ 0.0, 0.0 ]
//!     m: 1.0
//! ```
//!
//! Everything is fixed at startup, there is no runtime reconfiguration.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::params::{DEFAULT_CLOSE_DAMPING, DEFAULT_G, DEFAULT_SOFTENING_D2};

/// Fork-join backend used by the frame scheduler
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerConfig {
    #[default]
    #[serde(rename = "scoped")] // fresh threads per step, joined before the step returns
    Scoped,

    #[serde(rename = "rayon")] // rayon pool with one scope per step
    Rayon,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub workers: usize, // number of intervals / concurrent workers
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(rename = "G", default = "default_g")]
    pub g: f64, // gravitational constant
    #[serde(default = "default_softening_d2")]
    pub softening_d2: f64, // minimum squared distance before clamping
    #[serde(default = "default_close_damping")]
    pub close_damping: f64, // velocity scale when the clamp fires
    #[serde(default = "default_frames")]
    pub frames: u64,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            g: DEFAULT_G,
            softening_d2: DEFAULT_SOFTENING_D2,
            close_damping: DEFAULT_CLOSE_DAMPING,
            frames: default_frames(),
        }
    }
}

fn default_g() -> f64 {
    DEFAULT_G
}

fn default_softening_d2() -> f64 {
    DEFAULT_SOFTENING_D2
}

fn default_close_damping() -> f64 {
    DEFAULT_CLOSE_DAMPING
}

fn default_frames() -> u64 {
    600
}

/// Circular cloud generator: body `i` sits at angle `-pi + 2pi * i / count`
/// and a random distance in `[0, radius]` from `center`
#[derive(Deserialize, Debug, Clone)]
pub struct CloudConfig {
    pub count: usize,
    pub center: [f64; 2],
    pub radius: f64,
    #[serde(default = "default_mass")]
    pub mass: f64, // mass of every body but the first
    pub heavy_mass: Option<f64>, // mass of body 0, defaults to `mass`
    pub seed: Option<u64>, // random when missing
}

fn default_mass() -> f64 {
    1.0
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // position [x, y]
    #[serde(default)]
    pub v: Vec<f64>, // velocity [x, y], zero when omitted
    pub m: f64, // mass
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    pub cloud: Option<CloudConfig>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}
