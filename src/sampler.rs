//! Stratified jittered per-pixel sampler (spec §4.11). Grounded on
//! `original_source/src/painter/painting/sampler.h`.
//!
//! Given `samples_per_pixel`, produces that many deterministic strata
//! inside the unit `(N-1)`-cube, one jittered sample per stratum, as a
//! dense vector of `(N-1)`-D points in `[0,1)` handed to the
//! [`crate::projector::Projector`] as sub-pixel offsets (spec §3
//! "Sampler & Paintbrush").

use crate::math::Vector;
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Reusable per-thread stratified sampler (spec §5 "Per-thread private
/// state": "a reusable sample-point buffer").
pub struct StratifiedSampler<const D: usize> {
    samples_per_pixel: u32,
    /// Side length of the integer stratum grid along each of the `D`
    /// axes, chosen so `strata_per_axis^D >= samples_per_pixel`; any
    /// leftover strata beyond `samples_per_pixel` are simply unused.
    strata_per_axis: u32,
}

impl<const D: usize> StratifiedSampler<D> {
    pub fn new(samples_per_pixel: u32) -> Self {
        let strata_per_axis = ((samples_per_pixel as f64).powf(1.0 / D as f64).ceil() as u32).max(1);
        StratifiedSampler {
            samples_per_pixel,
            strata_per_axis,
        }
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    /// Fills `out` with exactly `samples_per_pixel` jittered points in
    /// `[0,1)^D`, one per stratum (spec §4.11). `out` is cleared first;
    /// callers reuse the same `Vec` across pixels (spec §5).
    pub fn fill<T: num_traits::Float>(&self, rng: &mut Xoshiro256PlusPlus, out: &mut Vec<Vector<D, T>>) {
        out.clear();
        let n = self.strata_per_axis;
        let inv_n = T::one() / T::from(n).unwrap();
        let mut strata = Vec::with_capacity((n as usize).pow(D as u32));
        let mut index = [0u32; D];
        generate_strata_indices(n, &mut index, 0, &mut strata);

        // Shuffle so the first `samples_per_pixel` strata drawn are not
        // biased toward one corner of the cube when SPP doesn't evenly
        // divide strata_per_axis^D.
        for i in (1..strata.len()).rev() {
            let j = rng.gen_range(0..=i);
            strata.swap(i, j);
        }

        for stratum in strata.into_iter().take(self.samples_per_pixel as usize) {
            let point = Vector::<D, T>::from_fn(|axis| {
                let jitter: T = T::from(rng.gen_range(0.0..1.0)).unwrap();
                (T::from(stratum[axis]).unwrap() + jitter) * inv_n
            });
            out.push(point);
        }
    }
}

fn generate_strata_indices<const D: usize>(n: u32, index: &mut [u32; D], axis: usize, out: &mut Vec<[u32; D]>) {
    if axis == D {
        out.push(*index);
        return;
    }
    for v in 0..n {
        index[axis] = v;
        generate_strata_indices(n, index, axis + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;

    #[test]
    fn produces_exactly_spp_samples_in_unit_cube() {
        let sampler: StratifiedSampler<2> = StratifiedSampler::new(16);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut out = Vec::new();
        sampler.fill::<f64>(&mut rng, &mut out);
        assert_eq!(out.len(), 16);
        for p in &out {
            for c in p.components {
                assert!((0.0..1.0).contains(&c));
            }
        }
    }

    #[test]
    fn strata_cover_the_cube_roughly_evenly() {
        // With SPP a perfect square, each stratum should hold exactly one
        // sample, so no two samples should fall in the same quadrant.
        let sampler: StratifiedSampler<2> = StratifiedSampler::new(4);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut out = Vec::new();
        sampler.fill::<f64>(&mut rng, &mut out);
        let mut quadrants = std::collections::HashSet::new();
        for p in &out {
            let qx = (p.components[0] * 2.0) as i32;
            let qy = (p.components[1] * 2.0) as i32;
            assert!(quadrants.insert((qx, qy)), "two samples landed in the same quadrant");
        }
    }
}
