//! Window-less frame loop
//!
//! Drives a `Scenario` for a fixed number of frames and hands every completed frame to a
//! `Presenter`. `LogPresenter` writes a short summary through `log`.

use crate::error::Result;
use crate::presentation::{Frame, Presenter};
use crate::simulation::scenario::Scenario;

/// Logs centroid and extent every `every` frames
#[derive(Debug, Clone)]
pub struct LogPresenter {
    pub every: u64,
    presented: u64,
}

impl LogPresenter {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            presented: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, frame: Frame<'_>) -> Result<()> {
        self.presented += 1;
        if frame.generation() % self.every != 0 {
            return Ok(());
        }
        if let (Some(c), Some((lo, hi))) = (frame.centroid(), frame.bounds()) {
            log::info!(
                "frame {:6}: {} bodies, centroid ({:.2}, {:.2}), extent ({:.2}, {:.2})",
                frame.generation(),
                frame.len(),
                c.x,
                c.y,
                hi.x - lo.x,
                hi.y - lo.y
            );
        }
        Ok(())
    }
}

/// Start the scenario and run `frames` ticks, presenting after each one.
///
/// The initial frame is presented before the first step. Any step error is returned
/// immediately since the write buffer of a failed step cannot be used.
pub fn run_headless<P: Presenter>(
    scenario: &mut Scenario,
    presenter: &mut P,
    frames: u64,
) -> Result<()> {
    log::info!(
        "run_headless: {} bodies, {} frames",
        scenario.body_count(),
        frames
    );

    presenter.present(scenario.frame())?;
    scenario.set_running(true);

    for _ in 0..frames {
        scenario.tick()?;
        presenter.present(scenario.frame())?;
    }

    scenario.set_running(false);
    Ok(())
}
