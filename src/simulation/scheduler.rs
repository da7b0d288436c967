//! Fork-join orchestration of a single simulation step
//!
//! One step:
//! 1. borrow (read, write) from the double buffer
//! 2. cut the write buffer, velocities and accelerations into one exclusive slice set per interval
//! 3. run one worker per interval and wait for all of them (barrier)
//! 4. swap the buffers, only if every worker finished
//!
//! A failed step poisons the scheduler: later steps are refused.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::configuration::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::simulation::engine::Engine;
use crate::simulation::integrator::{IntervalKernel, IntervalMut, Snapshot};
use crate::simulation::partition::Partition;
use crate::simulation::states::{BodyState, NVec2, PositionBuffers};

#[derive(Debug)]
enum Backend {
    /// Fresh threads every step, joined before `step` returns
    Scoped,
    /// Persistent rayon pool, one `scope` per step
    Pool(rayon::ThreadPool),
}

/// Runs steps over a fixed partition of the bodies
#[derive(Debug)]
pub struct FrameScheduler {
    partition: Partition,
    backend: Backend,
    poisoned: bool, // a step failed after workers started writing
}

impl FrameScheduler {
    /// Partition `n` bodies across `engine.workers` workers.
    pub fn new(engine: &Engine, n: usize) -> Result<Self> {
        let partition = Partition::new(n, engine.workers)?;

        let backend = match engine.scheduler {
            SchedulerConfig::Scoped => Backend::Scoped,
            SchedulerConfig::Rayon => Backend::Pool(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(engine.workers)
                    .thread_name(|i| format!("worker-{i}"))
                    .build()?,
            ),
        };

        log::info!(
            "FrameScheduler: {} bodies over {} workers ({:?})",
            n,
            partition.workers(),
            engine.scheduler
        );

        Ok(Self {
            partition,
            backend,
            poisoned: false,
        })
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// True once a step has failed; no further step will run
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Advance every body by one frame.
    ///
    /// Reads only the current read buffer and writes only the write buffer plus the
    /// velocity/acceleration columns. If a worker fails the buffers are not swapped, but the
    /// workers that did finish have already advanced their velocities and accelerations, so
    /// the state is inconsistent. The scheduler is then poisoned and every later call
    /// returns `Error::Poisoned`.
    pub fn step<K: IntervalKernel>(
        &mut self,
        kernel: &K,
        bodies: &mut BodyState,
        buffers: &mut PositionBuffers,
    ) -> Result<()> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }

        let n = self.partition.body_count();
        if bodies.len() != n || buffers.len() != n {
            return Err(Error::InvalidConfig(format!(
                "partition covers {n} bodies but state holds {} (buffers {})",
                bodies.len(),
                buffers.len()
            )));
        }

        let BodyState {
            masses,
            velocities,
            accelerations,
        } = bodies;
        let (read, write) = buffers.split();

        let snapshot = Snapshot {
            positions: read,
            masses: masses.as_slice(),
        };
        let jobs = self.jobs(write, velocities, accelerations)?;

        let outcome = match &self.backend {
            Backend::Scoped => run_scoped(kernel, snapshot, jobs),
            Backend::Pool(pool) => run_pooled(pool, kernel, snapshot, jobs),
        };
        if let Err(e) = outcome {
            log::warn!("step failed, scheduler poisoned: {e}");
            self.poisoned = true;
            return Err(e);
        }

        // all workers joined, the write buffer is complete
        buffers.swap();
        log::debug!("step complete, generation {}", buffers.generation());
        Ok(())
    }

    fn jobs<'a>(
        &self,
        positions: &'a mut [NVec2],
        velocities: &'a mut [NVec2],
        accelerations: &'a mut [NVec2],
    ) -> Result<Vec<IntervalMut<'a>>> {
        let mismatch = || Error::InvalidConfig("column length does not match partition".into());

        let positions = self.partition.split_mut(positions).ok_or_else(mismatch)?;
        let velocities = self.partition.split_mut(velocities).ok_or_else(mismatch)?;
        let accelerations = self
            .partition
            .split_mut(accelerations)
            .ok_or_else(mismatch)?;

        Ok(self
            .partition
            .intervals()
            .iter()
            .zip(positions)
            .zip(velocities)
            .zip(accelerations)
            .map(
                |(((interval, positions), velocities), accelerations)| IntervalMut {
                    interval: *interval,
                    positions,
                    velocities,
                    accelerations,
                },
            )
            .collect())
    }
}

fn run_scoped<K: IntervalKernel>(
    kernel: &K,
    snapshot: Snapshot<'_>,
    jobs: Vec<IntervalMut<'_>>,
) -> Result<()> {
    thread::scope(|s| {
        let mut outcome = Ok(());
        let mut handles = Vec::with_capacity(jobs.len());

        for (worker, job) in jobs.into_iter().enumerate() {
            log::trace!("worker {worker}: bodies {:?}", job.interval.range());
            let spawned = thread::Builder::new()
                .name(format!("worker-{worker}"))
                .spawn_scoped(s, move || kernel.integrate(snapshot, job));
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(e) => {
                    log::warn!("worker {worker} could not be spawned: {e}");
                    outcome = Err(Error::Spawn(e));
                    break;
                }
            }
        }

        // barrier
        for (worker, handle) in handles {
            if handle.join().is_err() {
                log::warn!("worker {worker} panicked");
                if outcome.is_ok() {
                    outcome = Err(Error::WorkerPanicked { worker });
                }
            }
        }

        outcome
    })
}

fn run_pooled<K: IntervalKernel>(
    pool: &rayon::ThreadPool,
    kernel: &K,
    snapshot: Snapshot<'_>,
    jobs: Vec<IntervalMut<'_>>,
) -> Result<()> {
    let failed: Vec<AtomicBool> = jobs.iter().map(|_| AtomicBool::new(false)).collect();

    // `scope` returns only once every spawned job has finished
    pool.scope(|s| {
        for (worker, job) in jobs.into_iter().enumerate() {
            log::trace!("pooled worker {worker}: bodies {:?}", job.interval.range());
            let failed = &failed[worker];
            s.spawn(move |_| {
                let run =
                    panic::catch_unwind(AssertUnwindSafe(|| kernel.integrate(snapshot, job)));
                if run.is_err() {
                    failed.store(true, Ordering::Relaxed);
                }
            });
        }
    });

    match failed.iter().position(|f| f.load(Ordering::Relaxed)) {
        Some(worker) => {
            log::warn!("worker {worker} panicked");
            Err(Error::WorkerPanicked { worker })
        }
        None => Ok(()),
    }
}
