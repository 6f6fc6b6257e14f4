//! Discrete light-selection distribution shared by the direct-lighting
//! estimator (§4.7) and BPT's light-path walk (§4.9.1). Built once per
//! render from each light's [`crate::lights::LightSource::power`] (spec
//! §9 "Open question — equal-power light distribution"; resolved as a
//! runtime choice in `RenderConfig::equal_light_power`, see `DESIGN.md`).
//! No standalone `light_distribution.h` survived in `original_source/`;
//! grounded on the PDF/CDF discrete-distribution pattern used throughout
//! `original_source/src/painter/lights/*` for per-shape area sampling.

use ordered_float::OrderedFloat;
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct LightDistribution<T> {
    /// Ascending prefix sums of `pmf`; the last entry is exactly `1`.
    cumulative: Vec<T>,
    pmf: Vec<T>,
    /// Light indices ordered by descending power, kept for diagnostics
    /// (e.g. reporting which lights dominate a scene).
    by_power_desc: Vec<usize>,
}

impl<T: num_traits::Float> LightDistribution<T> {
    /// `equal_light_power == true` assigns every light the same
    /// probability mass; otherwise mass is proportional to `powers[i]`
    /// (falling back to uniform if every power is non-positive, e.g. an
    /// all-delta-light scene whose `power()` values are all zero by
    /// convention).
    pub fn new(powers: &[T], equal_light_power: bool) -> Self {
        let n = powers.len();
        assert!(n > 0, "a scene must have at least one light (spec §8)");

        let mut by_power_desc: Vec<usize> = (0..n).collect();
        by_power_desc.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(powers[i].to_f64().unwrap_or(0.0))));

        let total: T = powers.iter().fold(T::zero(), |acc, &p| acc + p);
        let pmf: Vec<T> = if equal_light_power || total <= T::zero() {
            vec![T::one() / T::from(n).unwrap(); n]
        } else {
            powers.iter().map(|&p| p / total).collect()
        };

        let mut acc = T::zero();
        let mut cumulative = Vec::with_capacity(n);
        for &p in &pmf {
            acc = acc + p;
            cumulative.push(acc);
        }
        if let Some(last) = cumulative.last_mut() {
            *last = T::one();
        }

        LightDistribution {
            cumulative,
            pmf,
            by_power_desc,
        }
    }

    /// Draws one light index and its selection probability mass.
    pub fn sample(&self, rng: &mut Xoshiro256PlusPlus) -> (usize, T) {
        let u = T::from(rng.gen_range(0.0..1.0)).unwrap();
        let idx = self
            .cumulative
            .partition_point(|&c| c < u)
            .min(self.cumulative.len() - 1);
        (idx, self.pmf[idx])
    }

    pub fn pmf(&self, index: usize) -> T {
        self.pmf[index]
    }

    pub fn len(&self) -> usize {
        self.pmf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pmf.is_empty()
    }

    pub fn by_power_desc(&self) -> &[usize] {
        &self.by_power_desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;

    #[test]
    fn equal_power_gives_uniform_pmf() {
        let dist = LightDistribution::new(&[10.0_f64, 1.0, 1000.0], true);
        for i in 0..3 {
            assert!((dist.pmf(i) - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn power_weighted_pmf_matches_fractions() {
        let dist = LightDistribution::new(&[1.0_f64, 3.0], false);
        assert!((dist.pmf(0) - 0.25).abs() < 1e-12);
        assert!((dist.pmf(1) - 0.75).abs() < 1e-12);
        assert_eq!(dist.by_power_desc(), &[1, 0]);
    }

    #[test]
    fn all_zero_power_falls_back_to_uniform() {
        let dist = LightDistribution::new(&[0.0_f64, 0.0], false);
        assert!((dist.pmf(0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sample_distribution_respects_pmf() {
        let dist = LightDistribution::new(&[1.0_f64, 9.0], false);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut counts = [0u32; 2];
        for _ in 0..10_000 {
            let (idx, _) = dist.sample(&mut rng);
            counts[idx] += 1;
        }
        let frac1 = counts[1] as f64 / 10_000.0;
        assert!((frac1 - 0.9).abs() < 0.02);
    }
}
