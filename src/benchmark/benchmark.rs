use std::time::Instant;

use crate::configuration::config::{CloudConfig, SchedulerConfig};
use crate::error::Result;
use crate::simulation::engine::Engine;
use crate::simulation::initial::circular_cloud;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::Body;

/// Helper to build the collapsing cloud used by every benchmark
fn make_bodies(n: usize) -> Result<Vec<Body>> {
    circular_cloud(&CloudConfig {
        count: n,
        center: [400.0, 400.0],
        radius: 400.0,
        mass: 1.0,
        heavy_mass: Some(100.0),
        seed: Some(42),
    })
}

/// Average wall-clock seconds per step for one engine setup
fn time_steps(engine: Engine, bodies: &[Body], steps: usize) -> Result<f64> {
    let mut scenario = Scenario::new(engine, Parameters::default(), bodies)?;

    // Warm up
    scenario.step()?;

    let t0 = Instant::now();
    for _ in 0..steps {
        scenario.step()?;
    }
    Ok(t0.elapsed().as_secs_f64() / steps.max(1) as f64)
}

/// Step time of an `n`-body cloud for each worker count and both backends.
/// Prints CSV so it can be pasted straight into a spreadsheet.
pub fn bench_workers(n: usize, worker_counts: &[usize], steps: usize) -> Result<()> {
    let bodies = make_bodies(n)?;

    println!("N,workers,scoped_ms,rayon_ms");

    for &workers in worker_counts {
        if workers == 0 || workers > n {
            log::warn!("bench_workers: skipping {workers} workers for {n} bodies");
            continue;
        }

        let scoped = time_steps(
            Engine {
                workers,
                scheduler: SchedulerConfig::Scoped,
            },
            &bodies,
            steps,
        )?;
        let pooled = time_steps(
            Engine {
                workers,
                scheduler: SchedulerConfig::Rayon,
            },
            &bodies,
            steps,
        )?;

        println!(
            "{},{},{:.6},{:.6}",
            n,
            workers,
            scoped * 1000.0,
            pooled * 1000.0
        );
    }

    Ok(())
}
