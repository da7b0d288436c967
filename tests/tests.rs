use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use manybodies::{
    circular_cloud, run_headless, Body, BodyState, CloudConfig, Engine, Error, ForceIntegrator,
    Frame, FrameScheduler, IntervalKernel, IntervalMut, NVec2, Parameters, PositionBuffers,
    Presenter, ReadBuffer, Scenario, ScenarioConfig, SchedulerConfig, Snapshot,
};

/// Body at rest
pub fn body(x: f64, y: f64, m: f64) -> Body {
    Body {
        x: NVec2::new(x, y),
        v: NVec2::zeros(),
        m,
    }
}

pub fn engine(workers: usize) -> Engine {
    engine_on(workers, SchedulerConfig::Scoped)
}

pub fn engine_on(workers: usize, scheduler: SchedulerConfig) -> Engine {
    Engine { workers, scheduler }
}

/// Default physics parameters for tests (G = 0.01, d2 floor 1, damping 0.999)
pub fn test_params() -> Parameters {
    Parameters::default()
}

pub fn scenario(bodies: &[Body], workers: usize) -> Scenario {
    Scenario::new(engine(workers), test_params(), bodies).unwrap()
}

/// Deterministic cloud of `n` bodies
pub fn cloud(n: usize) -> Vec<Body> {
    circular_cloud(&CloudConfig {
        count: n,
        center: [0.0, 0.0],
        radius: 50.0,
        mass: 1.0,
        heavy_mass: Some(100.0),
        seed: Some(1234),
    })
    .unwrap()
}

fn assert_close(a: NVec2, b: NVec2, tol: f64) {
    assert!((a - b).norm() <= tol, "{a:?} != {b:?} (tol {tol})");
}

// ==================================================================================
// Force law tests
// ==================================================================================

#[test]
fn single_body_never_moves() {
    let mut sim = scenario(&[body(3.0, -4.0, 5.0)], 1);
    for _ in 0..50 {
        sim.step().unwrap();
    }

    assert_eq!(sim.frame().positions()[0], NVec2::new(3.0, -4.0));
    assert_eq!(sim.bodies().velocities[0], NVec2::zeros());
    assert_eq!(sim.bodies().accelerations[0], NVec2::zeros());
    assert_eq!(sim.frame().generation(), 50);
}

#[test]
fn equal_masses_attract_each_other() {
    let mut sim = scenario(&[body(0.0, 0.0, 1.0), body(10.0, 0.0, 1.0)], 2);
    sim.step().unwrap();

    let a = &sim.bodies().accelerations;
    // G * m / d2 * dir = 0.01 / 100 * 10
    assert_close(a[0], NVec2::new(0.001, 0.0), 1e-15);
    assert_close(a[1], NVec2::new(-0.001, 0.0), 1e-15);
    assert_eq!(a[0].norm(), a[1].norm());

    let x = sim.frame().positions();
    assert!(x[0].x > 0.0, "body 0 did not move towards body 1");
    assert!(x[1].x < 10.0, "body 1 did not move towards body 0");
    assert_eq!(x[0].y, 0.0);
    assert_eq!(x[1].y, 0.0);
}

#[test]
fn heavier_body_moves_less() {
    let mut sim = scenario(&[body(0.0, 0.0, 100.0), body(10.0, 0.0, 1.0)], 1);
    sim.step().unwrap();

    let x = sim.frame().positions();
    let moved_heavy = x[0].x;
    let moved_light = 10.0 - x[1].x;
    assert!(moved_heavy > 0.0 && moved_light > moved_heavy);
}

#[test]
fn close_pair_is_softened_and_damped() {
    let v0 = NVec2::new(1.0, 0.0);
    let v1 = NVec2::new(0.0, -1.0);
    let bodies = [
        Body {
            x: NVec2::new(0.0, 0.0),
            v: v0,
            m: 1.0,
        },
        // d2 = 0.5
        Body {
            x: NVec2::new(0.5, 0.5),
            v: v1,
            m: 1.0,
        },
    ];
    let mut sim = scenario(&bodies, 1);
    sim.step().unwrap();

    let p = test_params();
    let r = NVec2::new(0.5, 0.5);
    // d2 clamped to the floor
    let a0 = r * (p.g * 1.0 / p.softening_d2);
    let a1 = -r * (p.g * 1.0 / p.softening_d2);

    let state = sim.bodies();
    assert_close(state.accelerations[0], a0, 1e-15);
    assert_close(state.accelerations[1], a1, 1e-15);
    assert_close(state.velocities[0], v0 * 0.999 + a0, 1e-15);
    assert_close(state.velocities[1], v1 * 0.999 + a1, 1e-15);

    // never stronger than the clamped law allows
    let unclamped = r.norm() * p.g / 0.5;
    assert!(state.accelerations[0].norm() < unclamped);
    assert!(state.accelerations[0].norm() <= r.norm() * p.g + 1e-15);
}

#[test]
fn damping_compounds_per_close_neighbour() {
    let v = NVec2::new(0.0, 2.0);
    let bodies = [
        Body {
            x: NVec2::new(0.0, 0.0),
            v,
            m: 1.0,
        },
        body(0.5, 0.0, 1.0),
        body(-0.5, 0.0, 1.0),
    ];
    let mut sim = scenario(&bodies, 1);
    sim.step().unwrap();

    // the two neighbours cancel, only the damping remains
    let state = sim.bodies();
    assert_close(state.accelerations[0], NVec2::zeros(), 1e-15);
    assert_close(state.velocities[0], v * 0.999 * 0.999, 1e-15);
}

#[test]
fn relabeling_equal_bodies_swaps_results() {
    let heavy = body(0.0, 0.0, 100.0);
    let b = Body {
        x: NVec2::new(3.0, 1.0),
        v: NVec2::new(0.1, 0.0),
        m: 1.0,
    };
    let c = Body {
        x: NVec2::new(-2.0, 4.0),
        v: NVec2::new(0.0, -0.2),
        m: 1.0,
    };

    let mut first = scenario(&[heavy.clone(), b.clone(), c.clone()], 3);
    let mut second = scenario(&[heavy, c, b], 3);
    for _ in 0..5 {
        first.step().unwrap();
        second.step().unwrap();
    }

    let x1 = first.frame().positions();
    let x2 = second.frame().positions();
    assert_close(x1[0], x2[0], 1e-12);
    assert_close(x1[1], x2[2], 1e-12);
    assert_close(x1[2], x2[1], 1e-12);

    let v1 = &first.bodies().velocities;
    let v2 = &second.bodies().velocities;
    assert_close(v1[1], v2[2], 1e-12);
    assert_close(v1[2], v2[1], 1e-12);
}

// ==================================================================================
// Scheduler and buffer tests
// ==================================================================================

/// Counts how often each body index is written during a step
struct CountingKernel {
    writes: Vec<AtomicUsize>,
}

impl CountingKernel {
    fn new(n: usize) -> Self {
        Self {
            writes: (0..n).map(|_| AtomicUsize::new(0)).collect(),
        }
    }
}

impl IntervalKernel for CountingKernel {
    fn integrate(&self, snapshot: Snapshot<'_>, out: IntervalMut<'_>) {
        for (k, i) in out.interval.range().enumerate() {
            self.writes[i].fetch_add(1, Ordering::Relaxed);
            out.positions[k] = snapshot.positions[i] + NVec2::new(1.0, 0.0);
        }
    }
}

#[test]
fn every_index_written_exactly_once() {
    for scheduler in [SchedulerConfig::Scoped, SchedulerConfig::Rayon] {
        for (n, workers) in [(1, 1), (10, 3), (101, 7), (64, 64)] {
            let bodies = cloud(n);
            let mut state = BodyState::from_bodies(&bodies);
            let before: Vec<NVec2> = bodies.iter().map(|b| b.x).collect();
            let mut buffers = PositionBuffers::new(before.clone());

            let mut sched = FrameScheduler::new(&Engine { workers, scheduler }, n).unwrap();
            let kernel = CountingKernel::new(n);
            sched.step(&kernel, &mut state, &mut buffers).unwrap();

            for (i, count) in kernel.writes.iter().enumerate() {
                assert_eq!(count.load(Ordering::Relaxed), 1, "index {i}, n={n}, k={workers}");
            }
            for (old, new) in before.iter().zip(buffers.latest()) {
                assert_eq!(*new, old + NVec2::new(1.0, 0.0));
            }
        }
    }
}

#[test]
fn buffers_swap_only_after_a_step() {
    let bodies = cloud(12);
    let mut state = BodyState::from_bodies(&bodies);
    let mut buffers = PositionBuffers::new(bodies.iter().map(|b| b.x).collect());
    let mut sched = FrameScheduler::new(&engine(4), 12).unwrap();
    let kernel = CountingKernel::new(12);

    assert_eq!(buffers.read_buffer(), ReadBuffer::A);
    sched.step(&kernel, &mut state, &mut buffers).unwrap();
    assert_eq!(buffers.read_buffer(), ReadBuffer::B);
    assert_eq!(buffers.generation(), 1);

    sched.step(&kernel, &mut state, &mut buffers).unwrap();
    assert_eq!(buffers.read_buffer(), ReadBuffer::A);
    assert_eq!(buffers.generation(), 2);
    let shift = NVec2::new(1.0, 0.0);
    assert_eq!(buffers.latest()[0], bodies[0].x + shift + shift);
}

/// Panics in the worker owning body 0
struct FailingKernel;

impl IntervalKernel for FailingKernel {
    fn integrate(&self, _snapshot: Snapshot<'_>, out: IntervalMut<'_>) {
        if out.interval.contains(0) {
            panic!("simulated worker failure");
        }
    }
}

#[test]
fn failed_worker_keeps_previous_frame() {
    for scheduler in [SchedulerConfig::Scoped, SchedulerConfig::Rayon] {
        let bodies = cloud(8);
        let mut state = BodyState::from_bodies(&bodies);
        let mut buffers = PositionBuffers::new(bodies.iter().map(|b| b.x).collect());
        let mut sched = FrameScheduler::new(&engine_on(2, scheduler), 8).unwrap();

        let res = sched.step(&FailingKernel, &mut state, &mut buffers);
        assert!(
            matches!(res, Err(Error::WorkerPanicked { worker: 0 })),
            "{scheduler:?}: {res:?}"
        );
        assert!(sched.is_poisoned());
        assert_eq!(buffers.generation(), 0);
        assert_eq!(buffers.read_buffer(), ReadBuffer::A);
        assert_eq!(buffers.latest()[3], bodies[3].x);
    }
}

/// Real integrator, except the worker owning body 0 panics on its first call
struct PanicOnceKernel {
    inner: ForceIntegrator,
    armed: AtomicBool,
}

impl IntervalKernel for PanicOnceKernel {
    fn integrate(&self, snapshot: Snapshot<'_>, out: IntervalMut<'_>) {
        if out.interval.contains(0) && self.armed.swap(false, Ordering::Relaxed) {
            panic!("simulated worker failure");
        }
        self.inner.integrate(snapshot, out);
    }
}

#[test]
fn no_step_after_a_failed_step() {
    for scheduler in [SchedulerConfig::Scoped, SchedulerConfig::Rayon] {
        let bodies = cloud(8);
        let mut state = BodyState::from_bodies(&bodies);
        let mut buffers = PositionBuffers::new(bodies.iter().map(|b| b.x).collect());
        let mut sched = FrameScheduler::new(&engine_on(2, scheduler), 8).unwrap();
        let kernel = PanicOnceKernel {
            inner: ForceIntegrator::new(test_params().gravity()),
            armed: AtomicBool::new(true),
        };

        assert!(sched.step(&kernel, &mut state, &mut buffers).is_err());
        // the surviving worker already advanced its half of the velocities
        let after_failure = state.velocities.clone();
        assert_ne!(after_failure[5], bodies[5].v);

        let retry = sched.step(&kernel, &mut state, &mut buffers);
        assert!(matches!(retry, Err(Error::Poisoned)), "{scheduler:?}: {retry:?}");
        assert_eq!(state.velocities, after_failure);
        assert_eq!(buffers.generation(), 0);
    }
}

#[test]
fn cloud_rejects_non_finite_values() {
    let good = CloudConfig {
        count: 10,
        center: [0.0, 0.0],
        radius: 5.0,
        mass: 1.0,
        heavy_mass: Some(100.0),
        seed: Some(1),
    };
    assert!(circular_cloud(&good).is_ok());

    let bad = [
        CloudConfig {
            mass: f64::NAN,
            ..good.clone()
        },
        CloudConfig {
            heavy_mass: Some(f64::INFINITY),
            ..good.clone()
        },
        CloudConfig {
            center: [f64::NAN, 0.0],
            ..good.clone()
        },
    ];
    for cfg in &bad {
        assert!(matches!(circular_cloud(cfg), Err(Error::InvalidConfig(_))), "{cfg:?}");
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let bodies = cloud(200);

    let run = |workers: usize, scheduler: SchedulerConfig| {
        let engine = Engine { workers, scheduler };
        let mut sim = Scenario::new(engine, test_params(), &bodies).unwrap();
        for _ in 0..20 {
            sim.step().unwrap();
        }
        (sim.frame().positions().to_vec(), sim.bodies().velocities.clone())
    };

    let reference = run(4, SchedulerConfig::Scoped);
    assert_eq!(reference, run(4, SchedulerConfig::Scoped));
    // each body only depends on the previous frame, so the split does not matter either
    assert_eq!(reference, run(1, SchedulerConfig::Scoped));
    assert_eq!(reference, run(7, SchedulerConfig::Rayon));
}

// ==================================================================================
// Scenario tests
// ==================================================================================

#[test]
fn invalid_setups_are_rejected() {
    let bodies = cloud(4);

    assert!(matches!(
        Scenario::new(engine(0), test_params(), &bodies),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        Scenario::new(engine(5), test_params(), &bodies),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        Scenario::new(engine(1), test_params(), &[]),
        Err(Error::InvalidConfig(_))
    ));

    let mut p = test_params();
    p.close_damping = 0.0;
    assert!(Scenario::new(engine(1), p, &bodies).is_err());

    let mut p = test_params();
    p.softening_d2 = 0.0;
    assert!(Scenario::new(engine(1), p, &bodies).is_err());
}

#[test]
fn paused_scenario_does_not_step() {
    let mut sim = scenario(&cloud(10), 2);
    let before = sim.frame().positions().to_vec();

    assert!(!sim.tick().unwrap());
    assert_eq!(sim.frame().positions(), before.as_slice());

    assert!(sim.toggle_running());
    assert!(sim.tick().unwrap());
    assert_eq!(sim.frame().generation(), 1);
    assert_ne!(sim.frame().positions(), before.as_slice());

    assert!(!sim.toggle_running());
    assert!(!sim.tick().unwrap());
    assert_eq!(sim.frame().generation(), 1);
}

#[test]
fn cloud_is_seeded_and_bounded() {
    let cfg = CloudConfig {
        count: 500,
        center: [400.0, 400.0],
        radius: 400.0,
        mass: 1.0,
        heavy_mass: Some(100.0),
        seed: Some(9),
    };
    let a = circular_cloud(&cfg).unwrap();
    let b = circular_cloud(&cfg).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.len(), 500);
    assert_eq!(a[0].m, 100.0);
    assert!(a[1..].iter().all(|p| p.m == 1.0));
    let center = NVec2::new(400.0, 400.0);
    assert!(a.iter().all(|p| (p.x - center).norm() <= 400.0 + 1e-9));
    assert!(a.iter().all(|p| p.v == NVec2::zeros()));
}

#[test]
fn scenario_builds_from_yaml() {
    let cfg = ScenarioConfig::from_yaml_str(
        r#"
engine:
  workers: 3
  scheduler: "rayon"
parameters:
  G: 0.02
cloud:
  count: 30
  center: [0.0, 0.0]
  radius: 10.0
  heavy_mass: 50.0
  seed: 3
bodies:
  - x: [100.0, 100.0]
    v: [1.0, 0.0]
    m: 2.0
"#,
    )
    .unwrap();

    let sim = Scenario::build_scenario(cfg).unwrap();
    assert_eq!(sim.body_count(), 31);
    assert_eq!(sim.scheduler().partition().workers(), 3);
    assert_eq!(sim.bodies().masses[0], 50.0);
    assert_eq!(sim.bodies().masses[30], 2.0);
    assert_eq!(sim.bodies().velocities[30], NVec2::new(1.0, 0.0));
    assert_eq!(sim.frame().positions()[30], NVec2::new(100.0, 100.0));
    assert_eq!(sim.parameters.g, 0.02);
}

#[test]
fn malformed_body_vector_is_rejected() {
    let cfg = ScenarioConfig::from_yaml_str(
        "engine:\n  workers: 1\nbodies:\n  - x: [1.0, 2.0, 3.0]\n    m: 1.0\n",
    )
    .unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(Error::InvalidConfig(_))));
}

// ==================================================================================
// Presentation tests
// ==================================================================================

#[derive(Default)]
struct Recorder {
    generations: Vec<u64>,
    first_x: Vec<NVec2>,
}

impl Presenter for Recorder {
    fn present(&mut self, frame: Frame<'_>) -> manybodies::Result<()> {
        self.generations.push(frame.generation());
        self.first_x.push(frame.positions()[0]);
        Ok(())
    }
}

#[test]
fn headless_run_presents_every_frame() {
    let mut sim = scenario(&[body(0.0, 0.0, 1.0), body(10.0, 0.0, 1.0)], 2);
    let mut recorder = Recorder::default();
    run_headless(&mut sim, &mut recorder, 5).unwrap();

    assert_eq!(recorder.generations, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(recorder.first_x[0], NVec2::zeros());
    assert!(recorder.first_x.windows(2).all(|w| w[1].x > w[0].x));
    assert!(!sim.is_running());
}

#[test]
fn frame_summary() {
    let positions = [NVec2::new(0.0, 0.0), NVec2::new(4.0, -2.0), NVec2::new(2.0, 2.0)];
    let frame = Frame::new(&positions, 7);

    assert_eq!(frame.len(), 3);
    assert_eq!(frame.centroid(), Some(NVec2::new(2.0, 0.0)));
    assert_eq!(frame.bounds(), Some((NVec2::new(0.0, -2.0), NVec2::new(4.0, 2.0))));
    assert!(Frame::new(&[], 0).centroid().is_none());
}
