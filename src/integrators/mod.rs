//! The two integrators spec §4 names: Path Tracing (§4.8) and
//! Bidirectional Path Tracing with MIS (§4.9), plus the shared
//! direct-lighting estimator (§4.7) and MIS weight functions both use.

pub mod bpt;
pub mod direct_lighting;
pub mod light_distribution;
pub mod mis;
pub mod path_tracing;

use crate::config::{IntegratorKind, RenderConfig};
use crate::math::{Ray, RGB};
use crate::scene::Scene;
use light_distribution::LightDistribution;
use num_traits::Float;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Dispatches to whichever integrator `config.integrator` selects (spec
/// §6 "Integrator selector"); the scheduler's worker loop calls this once
/// per sample, oblivious to which concrete algorithm runs.
pub fn trace<const N: usize, T, P>(
    scene: &Scene<N, T, P>,
    lights: &LightDistribution<T>,
    config: &RenderConfig,
    rng: &mut Xoshiro256PlusPlus,
    ray: Ray<N, T>,
) -> Option<RGB>
where
    T: Float,
{
    match config.integrator {
        IntegratorKind::Pt => path_tracing::trace(scene, lights, config, rng, ray),
        IntegratorKind::Bpt => bpt::trace(scene, lights, config, rng, ray),
    }
}
