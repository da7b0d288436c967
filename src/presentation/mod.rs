//! Presentation boundary
//!
//! Renderers only ever see a `Frame`: the buffer holding the most recently completed step,
//! borrowed immutably. While a `Frame` is alive the scenario cannot be stepped, and while a
//! step runs no `Frame` can be taken, so a half-written buffer is never visible.

pub mod headless;

use crate::error::Result;
use crate::simulation::states::NVec2;

/// Latest completed positions and the generation they belong to
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    positions: &'a [NVec2],
    generation: u64,
}

impl<'a> Frame<'a> {
    pub fn new(positions: &'a [NVec2], generation: u64) -> Self {
        Self {
            positions,
            generation,
        }
    }

    pub fn positions(&self) -> &'a [NVec2] {
        self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Completed steps at the time this frame was taken
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Unweighted mean position
    pub fn centroid(&self) -> Option<NVec2> {
        if self.positions.is_empty() {
            return None;
        }
        let sum = self
            .positions
            .iter()
            .fold(NVec2::zeros(), |acc, x| acc + x);
        Some(sum / self.positions.len() as f64)
    }

    /// Axis-aligned (min, max) corners
    pub fn bounds(&self) -> Option<(NVec2, NVec2)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(lo, hi), x| {
            (lo.inf(x), hi.sup(x))
        }))
    }
}

/// Anything that consumes completed frames (window, logger, recorder)
pub trait Presenter {
    fn present(&mut self, frame: Frame<'_>) -> Result<()>;
}
