//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant `g`,
//! - squared-distance floor `softening_d2` and the velocity factor applied when it triggers,
//! - number of frames a headless run advances

use crate::error::{Error, Result};
use crate::simulation::forces::SoftenedGravity;

pub const DEFAULT_G: f64 = 0.01;
pub const DEFAULT_SOFTENING_D2: f64 = 1.0;
pub const DEFAULT_CLOSE_DAMPING: f64 = 0.999;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub g: f64, // gravitational constant
    pub softening_d2: f64, // minimum squared distance
    pub close_damping: f64, // in (0, 1]
    pub frames: u64, // frames for a headless run
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: DEFAULT_G,
            softening_d2: DEFAULT_SOFTENING_D2,
            close_damping: DEFAULT_CLOSE_DAMPING,
            frames: 600,
        }
    }
}

impl Parameters {
    /// Reject values that would make the force law divide by zero or blow up
    pub fn validate(&self) -> Result<()> {
        if !self.g.is_finite() {
            return Err(Error::InvalidConfig("G must be finite".into()));
        }
        if !self.softening_d2.is_finite() || self.softening_d2 <= 0.0 {
            return Err(Error::InvalidConfig(
                "softening_d2 must be finite and > 0".into(),
            ));
        }
        if !(self.close_damping > 0.0 && self.close_damping <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "close_damping must be in (0, 1], got {}",
                self.close_damping
            )));
        }
        Ok(())
    }

    pub fn gravity(&self) -> SoftenedGravity {
        SoftenedGravity {
            g: self.g,
            softening_d2: self.softening_d2,
            close_damping: self.close_damping,
        }
    }
}
