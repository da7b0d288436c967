//! Build fully-initialized simulations from configuration
//!
//! `Scenario` is the simulation context: it owns every per-body array, the double buffer and
//! its read role, the kernel, and the scheduler. Nothing lives in module-level state, so two
//! scenarios can run side by side.

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{Error, Result};
use crate::presentation::Frame;
use crate::simulation::engine::Engine;
use crate::simulation::initial::circular_cloud;
use crate::simulation::integrator::ForceIntegrator;
use crate::simulation::params::Parameters;
use crate::simulation::scheduler::FrameScheduler;
use crate::simulation::states::{Body, BodyState, NVec2, PositionBuffers};

#[derive(Debug)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    bodies: BodyState,
    buffers: PositionBuffers,
    integrator: ForceIntegrator,
    scheduler: FrameScheduler,
    running: bool, // run/pause flag, only consulted by `tick`
}

impl Scenario {
    /// Map a YAML-facing `ScenarioConfig` to a runtime scenario.
    ///
    /// Cloud bodies come first (so the heavy body is index 0), explicit bodies after.
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let mut bodies = match &cfg.cloud {
            Some(cloud) => circular_cloud(cloud)?,
            None => Vec::new(),
        };
        for bc in &cfg.bodies {
            bodies.push(body_from_config(bc)?);
        }

        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            g: p_cfg.g,
            softening_d2: p_cfg.softening_d2,
            close_damping: p_cfg.close_damping,
            frames: p_cfg.frames,
        };

        let engine = Engine {
            workers: cfg.engine.workers,
            scheduler: cfg.engine.scheduler,
        };

        Self::new(engine, parameters, &bodies)
    }

    /// Validate the setup, allocate every array once and partition the bodies.
    pub fn new(engine: Engine, parameters: Parameters, bodies: &[Body]) -> Result<Self> {
        if bodies.is_empty() {
            return Err(Error::InvalidConfig("scenario has no bodies".into()));
        }
        parameters.validate()?;

        let scheduler = FrameScheduler::new(&engine, bodies.len())?;
        let integrator = ForceIntegrator::new(parameters.gravity());
        let buffers = PositionBuffers::new(bodies.iter().map(|b| b.x).collect());

        log::info!(
            "Scenario: {} bodies, G = {}, softening_d2 = {}, close_damping = {}",
            bodies.len(),
            parameters.g,
            parameters.softening_d2,
            parameters.close_damping
        );

        Ok(Self {
            engine,
            parameters,
            bodies: BodyState::from_bodies(bodies),
            buffers,
            integrator,
            scheduler,
            running: false,
        })
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &BodyState {
        &self.bodies
    }

    pub fn buffers(&self) -> &PositionBuffers {
        &self.buffers
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Advance one frame regardless of the run flag.
    ///
    /// After a failed step every further step (and `tick`) returns `Error::Poisoned`.
    pub fn step(&mut self) -> Result<()> {
        self.scheduler
            .step(&self.integrator, &mut self.bodies, &mut self.buffers)
    }

    /// Advance one frame if running. Returns whether a step happened.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }
        self.step()?;
        Ok(true)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Start/pause. Pausing only stops future steps.
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        log::info!("simulation {}", if self.running { "running" } else { "paused" });
        self.running
    }

    /// Read-only view of the last completed frame for presentation.
    ///
    /// The returned `Frame` borrows the scenario, so it cannot outlive the next `step`.
    pub fn frame(&self) -> Frame<'_> {
        Frame::new(self.buffers.latest(), self.buffers.generation())
    }
}

fn body_from_config(bc: &BodyConfig) -> Result<Body> {
    let x = vec2(&bc.x, "x")?;
    let v = if bc.v.is_empty() {
        NVec2::zeros()
    } else {
        vec2(&bc.v, "v")?
    };
    if !bc.m.is_finite() {
        return Err(Error::InvalidConfig("body mass must be finite".into()));
    }
    Ok(Body { x, v, m: bc.m })
}

fn vec2(values: &[f64], field: &str) -> Result<NVec2> {
    match values {
        [x, y] => Ok(NVec2::new(*x, *y)),
        _ => Err(Error::InvalidConfig(format!(
            "body `{field}` needs 2 components, got {}",
            values.len()
        ))),
    }
}
