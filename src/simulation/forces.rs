//! Pairwise gravity law for the many-body kernel
//!
//! The law is deliberately simplified: the raw displacement `xj - xi` is scaled by
//! `G * mj / d2`, which keeps the inverse-square magnitude while skipping the square root
//! needed to normalize the direction.

use crate::simulation::states::NVec2;

/// Simplified 2D gravity with a squared-distance floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftenedGravity {
    pub g: f64, // gravitational constant
    pub softening_d2: f64, // d2 floor
    pub close_damping: f64, // velocity factor applied per close pair
}

impl SoftenedGravity {
    /// Total acceleration on body `i` from every other body in `positions`.
    ///
    /// Every pair closer than `softening_d2` clamps the distance and scales `velocity` by
    /// `close_damping`. The damping is applied once per close pair, so a body with several
    /// close neighbours is damped several times in the same step.
    pub fn accumulate(
        &self,
        i: usize,
        positions: &[NVec2],
        masses: &[f64],
        velocity: &mut NVec2,
    ) -> NVec2 {
        let xi = positions[i];
        let mut acc = NVec2::zeros();

        for (j, (xj, mj)) in positions.iter().zip(masses.iter()).enumerate() {
            // no self interaction
            if j == i {
                continue;
            }

            let r = xj - xi;
            let mut d2 = r.dot(&r);

            if d2 < self.softening_d2 {
                d2 = self.softening_d2;
                *velocity *= self.close_damping;
            }

            acc += r * (self.g * mj / d2);
        }

        acc
    }
}
