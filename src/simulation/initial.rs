//! Initial conditions
//!
//! The default scenario is a cloud of equal bodies around one heavy body, all at rest, which
//! collapses on itself once the simulation starts.

use std::f64::consts::PI;

use rand::{rng, rngs::StdRng, Rng, SeedableRng};

use crate::configuration::config::CloudConfig;
use crate::error::{Error, Result};
use crate::simulation::states::{Body, NVec2};

/// Generate `cfg.count` bodies on a disc using polar coordinates.
///
/// Angles are evenly spread over `[-pi, pi)` and radii drawn uniformly from `[0, radius]`,
/// which gives a round cloud rather than the square one of uniform `(x, y)` sampling.
pub fn circular_cloud(cfg: &CloudConfig) -> Result<Vec<Body>> {
    if cfg.count == 0 {
        return Err(Error::InvalidConfig("cloud count must be > 0".into()));
    }
    if !cfg.radius.is_finite() || cfg.radius < 0.0 {
        return Err(Error::InvalidConfig(
            "cloud radius must be finite and >= 0".into(),
        ));
    }
    if !cfg.center.iter().all(|c| c.is_finite()) {
        return Err(Error::InvalidConfig("cloud center must be finite".into()));
    }
    if !cfg.mass.is_finite() || !cfg.heavy_mass.map_or(true, f64::is_finite) {
        return Err(Error::InvalidConfig("cloud masses must be finite".into()));
    }

    let mut rng: StdRng = match cfg.seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    };

    let center = NVec2::new(cfg.center[0], cfg.center[1]);
    let n = cfg.count as f64;

    let bodies = (0..cfg.count)
        .map(|i| {
            let theta = -PI + (i as f64 / n) * (2.0 * PI);
            let r = rng.random_range(0.0..=cfg.radius);
            let m = match (i, cfg.heavy_mass) {
                (0, Some(heavy)) => heavy,
                _ => cfg.mass,
            };
            Body {
                x: center + NVec2::new(theta.cos(), theta.sin()) * r,
                v: NVec2::zeros(),
                m,
            }
        })
        .collect();

    Ok(bodies)
}
