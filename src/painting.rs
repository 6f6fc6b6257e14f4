//! Parallel tile-based painting scheduler (spec §4.13). Grounded on
//! `original_source/src/painter/painting/painting_master.{h,cpp}`'s
//! worker-pool/pass-barrier structure, ported from the original's
//! explicit condition-variable handoff to `std::thread::scope` +
//! `std::sync::Barrier`, the idiomatic stable-Rust equivalent for a
//! fixed-size pool of threads that must all reach the same point before
//! any of them starts the next pass.
//!
//! The scheduler's image-publishing contract ([`crate::notifier::Notifier`])
//! is fixed at a 2-dimensional screen (spec §6 "Byte layout"), so
//! [`Painting`] fixes the projector's screen dimension at `D = 2` — the
//! rest of the crate (math, shapes, BVH, integrators) stays fully
//! `N`-dimensional; only this outward publishing layer is 2D, matching
//! what [`crate::notifier::Notifier`] actually exposes. See `DESIGN.md`.

use crate::config::RenderConfig;
use crate::error::{ConstructionError, RuntimeError};
use crate::integrators::light_distribution::LightDistribution;
use crate::integrators::trace;
use crate::math::Vector;
use crate::notifier::Notifier;
use crate::paintbrush::Paintbrush;
use crate::pixels::{GaussianFilter, PixelAccumulator};
use crate::projector::Projector;
use crate::sampler::StratifiedSampler;
use crate::scene::Scene;
use crate::statistics::Statistics;
use num_traits::Float;
use rand::SeedableRng as _;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;

/// Owns everything a render needs beyond the `Scene` itself: the pixel
/// order, the sample accumulator, the light-selection distribution (spec
/// §9 "Open question — equal-power light distribution", built once per
/// render from [`RenderConfig::equal_light_power`]), and the worker pool
/// (spec §4.13 step 2).
pub struct Painting<'a, const N: usize, T, P> {
    scene: &'a Scene<N, T, P>,
    notifier: &'a dyn Notifier,
    config: RenderConfig,
    paintbrush: Paintbrush<2>,
    accumulator: PixelAccumulator<2>,
    statistics: Statistics,
    lights: LightDistribution<T>,
    stop: AtomicBool,
    /// Set by whichever worker breaks out of a pass early because
    /// [`Painting::request_stop`] fired (spec §5 "no partial pass is
    /// published"); checked and cleared by thread 0 right before it would
    /// otherwise call [`Painting::publish`].
    pass_interrupted: AtomicBool,
}

impl<'a, const N: usize, T, P> Painting<'a, N, T, P>
where
    T: Float + Send + Sync,
    P: Projector<N, 2, T>,
{
    /// Validates `config` and the scene's screen size (spec §7/§8
    /// "Empty-scene safety") and builds the scheduler's per-render state.
    /// Does not start rendering; call [`Painting::run`] for that.
    pub fn new(scene: &'a Scene<N, T, P>, notifier: &'a dyn Notifier, config: RenderConfig) -> Result<Self, ConstructionError> {
        config.validate()?;

        let screen_size = scene.projector.screen_size();
        let min = 2 * GaussianFilter::INTEGER_RADIUS as usize;
        if screen_size[0] <= min || screen_size[1] <= min {
            return Err(ConstructionError::ScreenTooSmall {
                width: screen_size[0],
                height: screen_size[1],
                min,
            });
        }

        let powers: Vec<T> = scene.lights.iter().map(|l| l.power()).collect();
        let lights = LightDistribution::new(&powers, config.equal_light_power);

        let total_pixels = (screen_size[0] * screen_size[1]) as u64;
        Ok(Painting {
            scene,
            notifier,
            config,
            paintbrush: Paintbrush::new(screen_size),
            accumulator: PixelAccumulator::new(screen_size, scene.background_color),
            statistics: Statistics::new(total_pixels),
            lights,
            stop: AtomicBool::new(false),
            pass_interrupted: AtomicBool::new(false),
        })
    }

    /// Requests an early stop; in-flight passes finish their current
    /// pixel but no further pixels or passes are started (spec §6 "stop
    /// request: finishes the current pixel, then returns").
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Runs the worker pool to completion: either `config.max_pass_count`
    /// passes, or until [`Painting::request_stop`] is called (spec §4.13).
    /// Blocks the calling thread; a worker panic is caught, delivered to
    /// [`Notifier::error_message`], and returned as a [`RuntimeError`]
    /// rather than unwinding past this call.
    pub fn run(&self) -> Result<(), RuntimeError>
    where
        Scene<N, T, P>: Sync,
    {
        let thread_count = self.config.thread_count.get();
        let barrier = Barrier::new(thread_count);

        let panics: Result<(), RuntimeError> = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(thread_count);
            for thread_index in 0..thread_count {
                let barrier = &barrier;
                handles.push(scope.spawn(move || self.worker_loop(thread_index, barrier)));
            }
            let mut first_err = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        if first_err.is_none() {
                            first_err = Some(e);
                        }
                    }
                    Err(panic) => {
                        if first_err.is_none() {
                            first_err = Some(RuntimeError::message(panic_message(&panic)));
                        }
                    }
                }
            }
            match first_err {
                Some(e) => Err(e),
                None => Ok(()),
            }
        });

        if let Err(ref e) = panics {
            self.notifier.error_message(&e.to_string());
        }
        panics
    }

    /// One worker thread's whole lifetime: repeats passes until stopped,
    /// consuming pixels from the shared [`Paintbrush`] and synchronizing
    /// with every other worker at each pass boundary (spec §4.13 steps
    /// 2b-2c). Thread 0 is the single publishing worker (spec §6
    /// "Notifier callbacks... called by the single publishing worker").
    fn worker_loop(&self, thread_index: usize, barrier: &Barrier) -> Result<(), RuntimeError> {
        let mut sampler: StratifiedSampler<2> = StratifiedSampler::new(self.config.samples_per_pixel);
        let mut samples: Vec<Vector<2, f64>> = Vec::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x9E37_79B9_7F4A_7C15 ^ thread_index as u64);

        let mut pass_number = 0u32;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            if let Some(max) = self.config.max_pass_count {
                if pass_number >= max {
                    break;
                }
            }

            let mut pass_completed = true;
            while let Some(pixel) = self.paintbrush.next_pixel() {
                if self.stop.load(Ordering::Relaxed) {
                    pass_completed = false;
                    break;
                }
                self.notifier.thread_busy(thread_index, pixel);
                let rays_before = self.scene.thread_ray_count();

                sampler.fill(&mut rng, &mut samples);
                for &offset in &samples {
                    let position = Vector::<2, f64> {
                        components: [pixel[0] as f64 + offset.components[0], pixel[1] as f64 + offset.components[1]],
                    };
                    let sample_point = Vector::<2, T>::from_fn(|i| T::from(position.components[i]).unwrap());
                    let ray = self.scene.projector.ray(sample_point);
                    let result = trace(self.scene, &self.lights, &self.config, &mut rng, ray);
                    self.accumulator.deposit(position, result);
                }

                let rays_after = self.scene.thread_ray_count();
                self.statistics.pixel_done((rays_after - rays_before).max(0) as u64, samples.len() as u64);
                let out = self.accumulator.reconstruct(pixel);
                self.notifier.pixel_set(pixel, out.rgb);
                self.notifier.thread_free(thread_index);
            }
            if !pass_completed {
                self.pass_interrupted.store(true, Ordering::Relaxed);
            }

            barrier.wait();
            if thread_index == 0 && !self.pass_interrupted.swap(false, Ordering::Relaxed) {
                self.publish(pass_number);
            }
            barrier.wait();

            pass_number += 1;
        }
        Ok(())
    }

    /// Copies the accumulator's current reconstruction into the
    /// notifier's published images and advances pass bookkeeping (spec
    /// §4.13 step 2c, §6 "Outputs per pass"). Only ever called by thread
    /// 0, strictly between the two barrier waits that bracket a pass.
    fn publish(&self, pass_number: u32) {
        let [w, h] = self.accumulator.screen_size();
        let mut images = self.notifier.images(pass_number);
        for y in 0..h {
            for x in 0..w {
                let out = self.accumulator.reconstruct([x, y]);
                let idx = y * w + x;
                images.with_background.pixels[idx] = out.rgb;
                images.without_background.pixels[idx] =
                    [out.rgb[0] * out.alpha, out.rgb[1] * out.alpha, out.rgb[2] * out.alpha, out.alpha];
            }
        }
        drop(images);

        self.statistics.pass_done();
        self.notifier.pass_done(pass_number);
        self.statistics.next_pass();
        self.paintbrush.next_pass();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker thread panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::PointLight;
    use crate::math::RGB;
    use crate::notifier::NullNotifier;
    use crate::projector::PerspectiveProjector;
    use crate::shapes::{Parallelotope, Shape};
    use std::num::NonZeroUsize;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    fn test_scene() -> Scene<3, f64, PerspectiveProjector<3, 2, f64>> {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-1.0, -1.0, -1.0]),
            v([1.0, 1.0, 1.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn crate::lights::LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::new(8.0, 8.0, 8.0)))];
        let projector = PerspectiveProjector {
            origin: v([0.0, 0.0, -5.0]),
            distance: 1.0,
            screen_size: [8, 8],
        };
        Scene::new(RGB::new(0.05, 0.05, 0.05), None, projector, lights, shapes).unwrap()
    }

    #[test]
    fn rejects_screen_smaller_than_filter_footprint() {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-1.0, -1.0, -1.0]),
            v([1.0, 1.0, 1.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn crate::lights::LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::ONE))];
        let projector = PerspectiveProjector {
            origin: v([0.0, 0.0, -5.0]),
            distance: 1.0,
            screen_size: [2, 2],
        };
        let scene = Scene::new(RGB::black(), None, projector, lights, shapes).unwrap();
        let notifier = NullNotifier::new([2, 2]);
        let config = RenderConfig {
            thread_count: NonZeroUsize::new(1).unwrap(),
            ..RenderConfig::default()
        };
        let result = Painting::new(&scene, &notifier, config);
        assert!(matches!(result, Err(ConstructionError::ScreenTooSmall { .. })));
    }

    #[test]
    fn single_pass_single_thread_completes_and_publishes() {
        let scene = test_scene();
        let notifier = NullNotifier::new([8, 8]);
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_pass_count: Some(1),
            thread_count: NonZeroUsize::new(1).unwrap(),
            ..RenderConfig::default()
        };
        let painting = Painting::new(&scene, &notifier, config).unwrap();
        painting.run().unwrap();

        let snap = painting.statistics().snapshot();
        assert_eq!(snap.cumulative_pixels, 64);
        assert_eq!(snap.cumulative_samples, 64 * 4);
    }

    #[test]
    fn multiple_worker_threads_complete_one_pass() {
        let scene = test_scene();
        let notifier = NullNotifier::new([8, 8]);
        let config = RenderConfig {
            samples_per_pixel: 2,
            max_pass_count: Some(1),
            thread_count: NonZeroUsize::new(4).unwrap(),
            ..RenderConfig::default()
        };
        let painting = Painting::new(&scene, &notifier, config).unwrap();
        painting.run().unwrap();

        let snap = painting.statistics().snapshot();
        assert_eq!(snap.cumulative_pixels, 64);
    }

    #[test]
    fn request_stop_halts_before_a_second_pass() {
        let scene = test_scene();
        let notifier = NullNotifier::new([8, 8]);
        let config = RenderConfig {
            samples_per_pixel: 1,
            max_pass_count: None,
            thread_count: NonZeroUsize::new(1).unwrap(),
            ..RenderConfig::default()
        };
        let painting = Painting::new(&scene, &notifier, config).unwrap();
        painting.request_stop();
        painting.run().unwrap();

        let snap = painting.statistics().snapshot();
        assert_eq!(snap.pass_number, 0);
    }
}
