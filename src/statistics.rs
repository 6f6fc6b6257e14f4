//! Pass/pixel/ray/sample counters (spec §3 "Statistics", §5 "Statistics
//! counters are incremented with relaxed atomics; the per-pass snapshot
//! is taken under a mutex"). Grounded on
//! `original_source/src/painter/painting/statistics.h`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A snapshot taken at a pass boundary (spec §6 "Statistics query").
#[derive(Debug, Clone, Copy)]
pub struct StatisticsSnapshot {
    pub pass_number: u32,
    pub pass_progress: f64,
    pub cumulative_pixels: u64,
    pub cumulative_rays: u64,
    pub cumulative_samples: u64,
    pub previous_pass_duration: Option<Duration>,
}

struct PassState {
    pass_number: u32,
    pass_start: Instant,
    previous_pass_duration: Option<Duration>,
}

/// Shared across all worker threads and outlives the scheduler (spec §3
/// "Lifecycles"). Per-pixel/ray/sample counters are relaxed atomics;
/// pass boundaries are serialized through a mutex-guarded [`PassState`].
pub struct Statistics {
    cumulative_pixels: AtomicU64,
    cumulative_rays: AtomicU64,
    cumulative_samples: AtomicU64,
    pixels_this_pass: AtomicU64,
    total_pixels: u64,
    pass: Mutex<PassState>,
}

impl Statistics {
    pub fn new(total_pixels: u64) -> Self {
        Statistics {
            cumulative_pixels: AtomicU64::new(0),
            cumulative_rays: AtomicU64::new(0),
            cumulative_samples: AtomicU64::new(0),
            pixels_this_pass: AtomicU64::new(0),
            total_pixels,
            pass: Mutex::new(PassState {
                pass_number: 0,
                pass_start: Instant::now(),
                previous_pass_duration: None,
            }),
        }
    }

    /// Called by a worker once per completed pixel, with that pixel's
    /// ray and sample counts (spec `SPEC_FULL.md` §B.6 "before/after
    /// snapshot of the scene's thread-local ray counter").
    pub fn pixel_done(&self, rays: u64, samples: u64) {
        self.cumulative_pixels.fetch_add(1, Ordering::Relaxed);
        self.pixels_this_pass.fetch_add(1, Ordering::Relaxed);
        self.cumulative_rays.fetch_add(rays, Ordering::Relaxed);
        self.cumulative_samples.fetch_add(samples, Ordering::Relaxed);
    }

    /// Called by the single publishing worker at the pass barrier (spec
    /// §4.13 step 2c).
    pub fn pass_done(&self) {
        let mut pass = self.pass.lock().unwrap();
        pass.previous_pass_duration = Some(pass.pass_start.elapsed());
    }

    /// Advances to the next pass: resets the per-pass pixel counter and
    /// pass-start clock (spec §4.13 step 2c).
    pub fn next_pass(&self) {
        let mut pass = self.pass.lock().unwrap();
        pass.pass_number += 1;
        pass.pass_start = Instant::now();
        self.pixels_this_pass.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        let pass = self.pass.lock().unwrap();
        let done = self.pixels_this_pass.load(Ordering::Relaxed);
        let progress = if self.total_pixels == 0 {
            1.0
        } else {
            (done as f64 / self.total_pixels as f64).min(1.0)
        };
        StatisticsSnapshot {
            pass_number: pass.pass_number,
            pass_progress: progress,
            cumulative_pixels: self.cumulative_pixels.load(Ordering::Relaxed),
            cumulative_rays: self.cumulative_rays.load(Ordering::Relaxed),
            cumulative_samples: self.cumulative_samples.load(Ordering::Relaxed),
            previous_pass_duration: pass.previous_pass_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_cumulative_counts_across_passes() {
        let stats = Statistics::new(4);
        stats.pixel_done(10, 2);
        stats.pixel_done(5, 2);
        stats.pass_done();
        stats.next_pass();
        stats.pixel_done(3, 1);

        let snap = stats.snapshot();
        assert_eq!(snap.pass_number, 1);
        assert_eq!(snap.cumulative_pixels, 3);
        assert_eq!(snap.cumulative_rays, 18);
        assert_eq!(snap.cumulative_samples, 5);
        assert!(snap.previous_pass_duration.is_some());
    }
}
