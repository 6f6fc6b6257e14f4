//! Pixel reconstruction filter and per-pixel sample accumulator (spec
//! §4.10). No standalone `samples/*.h` survived in the retrieved
//! `original_source/` pack (`SPEC_FULL.md` §A, module ledger), so this
//! is built from spec §4.10's prose directly, in the accumulator style
//! `raytracer.rs`'s teacher-era `PixelBuf`/`ColorBuf` used (per-pixel
//! buffer, reconstruct-on-read).

use crate::error::NumericError;
use crate::math::{Vector, RGB};
use parking_lot::Mutex;

/// Truncated Gaussian reconstruction filter, hard-coded per spec §4.10:
/// `radius = 1.5`, `σ = radius/2.5`, `alpha = -1/(2σ²)`, each axis
/// evaluated separably and subtracted by `gaussian(radius)`, clamped at
/// zero. Integer footprint radius is `ceil(max(0, radius-0.5)) = 1`.
pub struct GaussianFilter {
    radius: f64,
    alpha: f64,
    bias: f64,
}

impl GaussianFilter {
    pub const RADIUS: f64 = 1.5;
    /// `ceil(max(0, radius - 0.5))`, the integer pixel footprint each
    /// sample touches per axis: a `(2r+1)` window, `r = 1`.
    pub const INTEGER_RADIUS: i32 = 1;

    pub fn new() -> Self {
        let sigma = Self::RADIUS / 2.5;
        let alpha = -1.0 / (2.0 * sigma * sigma);
        let bias = (alpha * Self::RADIUS * Self::RADIUS).exp();
        GaussianFilter {
            radius: Self::RADIUS,
            alpha,
            bias,
        }
    }

    #[inline]
    fn gaussian_1d(&self, d: f64) -> f64 {
        ((self.alpha * d * d).exp() - self.bias).max(0.0)
    }

    /// Separable filter weight for a `D`-dimensional screen offset
    /// (pixel center minus the sub-pixel sample position, per axis).
    /// Zero outside the `radius` window on any axis.
    pub fn weight<const D: usize>(&self, offset: Vector<D, f64>) -> f64 {
        let mut w = 1.0;
        for i in 0..D {
            let d = offset.components[i];
            if d.abs() >= self.radius {
                return 0.0;
            }
            w *= self.gaussian_1d(d);
        }
        w
    }
}

impl Default for GaussianFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bound on how many observations a pixel's saturating counter reports
/// (spec §9 "Saturating sample count": "do not grow it unboundedly;
/// reconstruction relies only on the sum of weights").
const SATURATING_COUNT_MAX: u32 = u32::MAX;

/// One ring entry: a deposit's filter weight, its contribution key
/// (`filter_weight * sample_weight`), and the color carried (spec
/// §4.10 "Each color-sample deposit carries `(filter_weight, color)`").
#[derive(Debug, Clone, Copy)]
struct RingEntry {
    contribution: f64,
    filter_weight: f64,
    color: RGB,
}

/// A K=4 "best-by-contribution" ring buffer that also tracks the exact
/// running sum of filter weight and weighted color over *every* deposit,
/// discarded or not (spec §4.10 "preserving the accumulated sum and
/// total count of discarded samples"; reconstruction in §4.10 only ever
/// needs these running sums).
#[derive(Debug, Clone, Copy, Default)]
struct SampleRing {
    entries: [Option<RingEntry>; 4],
    sum_weight: f64,
    sum_weighted_color: [f64; 3],
    count: u32,
}

impl SampleRing {
    fn deposit(&mut self, filter_weight: f64, color: RGB, sample_weight: f64) {
        self.sum_weight += filter_weight;
        let c = color.to_rgb32();
        for i in 0..3 {
            self.sum_weighted_color[i] += filter_weight * c[i] as f64;
        }
        self.count = self.count.saturating_add(1).min(SATURATING_COUNT_MAX);

        let contribution = filter_weight * sample_weight;
        let entry = RingEntry {
            contribution,
            filter_weight,
            color,
        };
        // Replace the smallest-contribution slot (or an empty one) if
        // this entry ranks higher; the rest stay sorted by insertion
        // comparison only loosely (full sort isn't needed: only the
        // min is ever evicted).
        let mut min_idx = None;
        let mut min_val = f64::INFINITY;
        for (i, slot) in self.entries.iter().enumerate() {
            match slot {
                None => {
                    self.entries[i] = Some(entry);
                    return;
                }
                Some(e) if e.contribution < min_val => {
                    min_val = e.contribution;
                    min_idx = Some(i);
                }
                _ => {}
            }
        }
        if let Some(i) = min_idx {
            if contribution > min_val {
                self.entries[i] = Some(entry);
            }
        }
    }

    fn discarded_count(&self) -> u32 {
        let kept = self.entries.iter().filter(|e| e.is_some()).count() as u32;
        self.count.saturating_sub(kept)
    }
}

/// One output pixel's state: a color-sample ring and a background-sample
/// ring (spec §3 "Pixel"). Guarded by a [`parking_lot::Mutex`], the
/// crate's `other_examples`-grounded stand-in for the "lightweight
/// spinlock" spec §4.10 calls for (see `DESIGN.md`).
#[derive(Default)]
struct PixelState {
    color: SampleRing,
    background: SampleRing,
}

/// Reconstructed output for one pixel (spec §4.10 "Reconstructed pixel
/// color for output").
#[derive(Debug, Clone, Copy)]
pub struct PixelOutput {
    pub rgb: [f32; 3],
    pub alpha: f32,
}

/// Per-pixel sample buffers over the whole screen, shared read/write
/// across worker threads (spec §3 "Pixel buffers are shared across
/// threads and guarded by per-pixel locks").
pub struct PixelAccumulator<const D: usize> {
    screen_size: [usize; D],
    background_color: RGB,
    filter: GaussianFilter,
    pixels: Vec<Mutex<PixelState>>,
}

impl<const D: usize> PixelAccumulator<D> {
    pub fn new(screen_size: [usize; D], background_color: RGB) -> Self {
        let total: usize = screen_size.iter().product();
        PixelAccumulator {
            screen_size,
            background_color,
            filter: GaussianFilter::new(),
            pixels: (0..total).map(|_| Mutex::new(PixelState::default())).collect(),
        }
    }

    fn index(&self, coords: [i64; D]) -> Option<usize> {
        let mut idx = 0usize;
        let mut stride = 1usize;
        for i in 0..D {
            if coords[i] < 0 || coords[i] as usize >= self.screen_size[i] {
                return None;
            }
            idx += coords[i] as usize * stride;
            stride *= self.screen_size[i];
        }
        Some(idx)
    }

    /// Deposits one sample at a fractional sub-pixel `position` (spec
    /// §4.11's sampler output), splatting it into every pixel within the
    /// filter's integer footprint (spec §4.10 "Concurrency": "for every
    /// affected pixel in the `2r+1` neighborhood of each sample's
    /// integer pixel, grabs the spinlock, merges"). `result == None`
    /// means the primary ray missed with nothing to show (spec §4.8);
    /// otherwise `Some(color)` — note the teacher-consistent reading
    /// from `SPEC_FULL.md` §B.8: a miss with a non-black background
    /// still yields `Some(background_color + visible_lights)`, so a
    /// `None` deposit is the genuinely-empty case.
    pub fn deposit(&self, position: Vector<D, f64>, result: Option<RGB>) {
        let r = GaussianFilter::INTEGER_RADIUS as i64;
        let mut base = [0i64; D];
        for i in 0..D {
            base[i] = position.components[i].floor() as i64;
        }

        let (color, sample_weight, is_background) = match result {
            Some(c) => {
                if !c.is_finite() {
                    NumericError::log("pixels::deposit", format!("{c:?}"));
                    return;
                }
                (c, c.luminance() as f64, false)
            }
            None => (
                self.background_color,
                self.background_color.luminance() as f64,
                true,
            ),
        };

        let mut offset = [0i64; D];
        self.splat(&mut offset, 0, base, r, position, color, sample_weight, is_background);
    }

    #[allow(clippy::too_many_arguments)]
    fn splat(
        &self,
        offset: &mut [i64; D],
        axis: usize,
        base: [i64; D],
        r: i64,
        position: Vector<D, f64>,
        color: RGB,
        sample_weight: f64,
        is_background: bool,
    ) {
        if axis == D {
            let mut coords = [0i64; D];
            let mut filter_offset = Vector::<D, f64>::zero();
            for i in 0..D {
                coords[i] = base[i] + offset[i];
                let pixel_center = coords[i] as f64 + 0.5;
                filter_offset.components[i] = pixel_center - position.components[i];
            }
            let Some(idx) = self.index(coords) else {
                return;
            };
            let weight = self.filter.weight(filter_offset);
            if weight <= 0.0 {
                return;
            }
            let mut state = self.pixels[idx].lock();
            if is_background {
                state.background.deposit(weight, color, sample_weight);
            } else {
                state.color.deposit(weight, color, sample_weight);
            }
            return;
        }
        for d in -r..=r {
            offset[axis] = d;
            self.splat(offset, axis + 1, base, r, position, color, sample_weight, is_background);
        }
    }

    /// Reconstructs one pixel's RGB/alpha (spec §4.10): RGB is the
    /// weighted mean of every color and background deposit; alpha is the
    /// fraction of total filter weight contributed by color samples,
    /// `0` when the pixel received no samples at all (falls back to the
    /// configured background color, per spec §4.13 step 1's "initialize
    /// the per-pixel accumulator with ... background color").
    pub fn reconstruct(&self, coords: [usize; D]) -> PixelOutput {
        let mut idx_coords = [0i64; D];
        for i in 0..D {
            idx_coords[i] = coords[i] as i64;
        }
        let idx = self.index(idx_coords).expect("coords must be in bounds");
        let state = self.pixels[idx].lock();
        let total_weight = state.color.sum_weight + state.background.sum_weight;
        if total_weight <= 0.0 {
            let bg = self.background_color.to_rgb32();
            return PixelOutput { rgb: bg, alpha: 0.0 };
        }
        let mut rgb = [0f32; 3];
        for i in 0..3 {
            let sum = state.color.sum_weighted_color[i] + state.background.sum_weighted_color[i];
            let v = sum / total_weight;
            if !v.is_finite() {
                NumericError::log("pixels::reconstruct", format!("channel {i} = {v}"));
                rgb[i] = 0.0;
            } else {
                rgb[i] = v as f32;
            }
        }
        let alpha = (state.color.sum_weight / total_weight) as f32;
        PixelOutput { rgb, alpha }
    }

    pub fn screen_size(&self) -> [usize; D] {
        self.screen_size
    }

    /// Total discarded-beyond-K observations across both streams, for
    /// diagnostics (spec §3 "saturating count tracks total
    /// observations").
    pub fn discarded_count(&self, coords: [usize; D]) -> u32 {
        let mut idx_coords = [0i64; D];
        for i in 0..D {
            idx_coords[i] = coords[i] as i64;
        }
        let idx = self.index(idx_coords).expect("coords must be in bounds");
        let state = self.pixels[idx].lock();
        state.color.discarded_count() + state.background.discarded_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_zero_outside_radius() {
        let f = GaussianFilter::new();
        assert_eq!(f.weight(Vector::<2, f64> { components: [2.0, 0.0] }), 0.0);
        assert!(f.weight(Vector::<2, f64> { components: [0.0, 0.0] }) > 0.0);
    }

    #[test]
    fn single_color_sample_reconstructs_to_itself() {
        let acc: PixelAccumulator<2> = PixelAccumulator::new([8, 8], RGB::black());
        acc.deposit(
            Vector { components: [4.0, 4.0] },
            Some(RGB::new(0.5, 0.25, 0.75)),
        );
        let out = acc.reconstruct([4, 4]);
        assert!((out.rgb[0] - 0.5).abs() < 1e-4);
        assert!((out.rgb[1] - 0.25).abs() < 1e-4);
        assert!((out.rgb[2] - 0.75).abs() < 1e-4);
        assert!((out.alpha - 1.0).abs() < 1e-6);
    }

    #[test]
    fn background_only_pixel_has_zero_alpha() {
        let acc: PixelAccumulator<2> = PixelAccumulator::new([8, 8], RGB::new(0.2, 0.2, 0.2));
        acc.deposit(Vector { components: [4.0, 4.0] }, None);
        let out = acc.reconstruct([4, 4]);
        assert!(out.alpha < 1e-6);
        assert!((out.rgb[0] - 0.2).abs() < 1e-4);
    }

    #[test]
    fn untouched_pixel_reports_background_with_zero_alpha() {
        let acc: PixelAccumulator<2> = PixelAccumulator::new([8, 8], RGB::new(0.1, 0.1, 0.1));
        let out = acc.reconstruct([0, 0]);
        assert_eq!(out.alpha, 0.0);
        assert_eq!(out.rgb, [0.1, 0.1, 0.1]);
    }

    #[test]
    fn non_finite_sample_is_dropped_not_merged() {
        let acc: PixelAccumulator<2> = PixelAccumulator::new([8, 8], RGB::black());
        acc.deposit(
            Vector { components: [4.0, 4.0] },
            Some(RGB::new(f32::NAN, 0.0, 0.0)),
        );
        let out = acc.reconstruct([4, 4]);
        assert_eq!(out.alpha, 0.0);
    }
}
