//! Per-interval integration kernel
//!
//! A kernel reads a complete `Snapshot` of the previous frame and writes only the slices of
//! its own interval (`IntervalMut`). The scheduler hands every worker one `IntervalMut`, so
//! disjoint writes are guaranteed by the borrow checker rather than by convention.

use super::forces::SoftenedGravity;
use super::partition::Interval;
use super::states::NVec2;

/// Read-only view of the last completed frame, shared by every worker
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub positions: &'a [NVec2],
    pub masses: &'a [f64],
}

/// Exclusive output slices for one interval.
///
/// `positions`, `velocities` and `accelerations` are all `interval.len()` long; local index `k`
/// is body `interval.from + k`.
#[derive(Debug)]
pub struct IntervalMut<'a> {
    pub interval: Interval,
    pub positions: &'a mut [NVec2],
    pub velocities: &'a mut [NVec2],
    pub accelerations: &'a mut [NVec2],
}

/// Work done by a single worker for a single step
pub trait IntervalKernel: Sync {
    fn integrate(&self, snapshot: Snapshot<'_>, out: IntervalMut<'_>);
}

/// Gravity + semi-implicit Euler over one interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceIntegrator {
    pub law: SoftenedGravity,
}

impl ForceIntegrator {
    pub fn new(law: SoftenedGravity) -> Self {
        Self { law }
    }
}

impl IntervalKernel for ForceIntegrator {
    fn integrate(&self, snapshot: Snapshot<'_>, out: IntervalMut<'_>) {
        let IntervalMut {
            interval,
            positions,
            velocities,
            accelerations,
        } = out;

        let bodies = positions
            .iter_mut()
            .zip(velocities.iter_mut())
            .zip(accelerations.iter_mut());

        for (i, ((x, v), a)) in interval.range().zip(bodies) {
            // acceleration has no inertia, it is rebuilt from scratch every step
            *a = self
                .law
                .accumulate(i, snapshot.positions, snapshot.masses, v);

            // v_n+1 = v_n + a_n, then x_n+1 = x_n + v_n+1
            *v += *a;
            *x = snapshot.positions[i] + *v;
        }
    }
}
