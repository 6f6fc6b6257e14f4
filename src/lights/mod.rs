//! The `LightSource` contract (spec §4.4): point, spot, ball, parallelotope,
//! distant, and infinite-area variants. Grounded on
//! `original_source/src/painter/objects.h`'s `LightSource` interface and
//! the per-variant files under `original_source/src/painter/lights/*`.
//!
//! Every variant is a separate struct implementing the same trait object
//! (`dyn LightSource`), the way `Scene` stores a `Vec<Box<dyn LightSource>>`
//! and addresses them by index (matching `Surface::light_source`'s
//! `Option<usize>` return, spec §4.3).

mod ball;
mod distant;
mod infinite_area;
mod parallelotope;
mod point;
mod spot;

pub use ball::BallLight;
pub use distant::DistantLight;
pub use infinite_area::InfiniteAreaLight;
pub use parallelotope::ParallelotopeLight;
pub use point::PointLight;
pub use spot::SpotLight;

use crate::math::{Ray, Vector, RGB};
use rand_xoshiro::Xoshiro256PlusPlus;

/// `{l, pdf, radiance, optional distance}` (spec §3). `distance.is_none()`
/// means the light is infinitely far away (distant/infinite-area).
#[derive(Debug, Clone, Copy)]
pub struct LightArriveSample<const N: usize, T> {
    pub l: Vector<N, T>,
    pub pdf: T,
    pub radiance: RGB,
    pub distance: Option<T>,
}

impl<const N: usize, T: num_traits::Float> LightArriveSample<N, T> {
    pub fn usable(&self) -> bool {
        self.pdf > T::zero() && !self.radiance.is_black()
    }
}

/// Same as [`LightArriveSample`] but for a direction already known
/// (spec §3 `LightArriveInfo`), returned by `arrive_info`.
#[derive(Debug, Clone, Copy)]
pub struct LightArriveInfo<T> {
    pub pdf: T,
    pub radiance: RGB,
}

impl<T: num_traits::Float> LightArriveInfo<T> {
    pub fn none() -> Self {
        LightArriveInfo {
            pdf: T::zero(),
            radiance: RGB::black(),
        }
    }

    pub fn usable(&self) -> bool {
        self.pdf > T::zero() && !self.radiance.is_black()
    }
}

/// `{ray, optional surface normal, pdf_pos, pdf_dir, radiance, infinite_distance}`
/// (spec §3), produced by `leave_sample` for BPT's light-path walk.
#[derive(Debug, Clone)]
pub struct LightLeaveSample<const N: usize, T> {
    pub ray: Ray<N, T>,
    pub normal: Option<Vector<N, T>>,
    pub pdf_pos: T,
    pub pdf_dir: T,
    pub radiance: RGB,
    pub infinite_distance: bool,
}

/// Uniform direction on the unit `(N-1)`-sphere via rejection sampling
/// inside the unit ball, the same technique `shapes::Parallelotope::sample`
/// uses for cosine-weighted sampling (grounded there on
/// `original_source/src/painter/lights/com/functions.h`'s `cosine_hemisphere`
/// helper, generalized here to the full sphere for `leave_sample`).
pub(crate) fn uniform_direction<const N: usize, T: num_traits::Float>(
    rng: &mut Xoshiro256PlusPlus,
) -> Vector<N, T> {
    use rand::Rng as _;
    loop {
        let v = Vector::<N, T>::from_fn(|_| T::from(rng.gen_range(-1.0..1.0)).unwrap());
        let len2 = v.length_squared();
        if len2 > T::zero() && len2 <= T::one() {
            if let Some(u) = v.normalized() {
                return u;
            }
        }
    }
}

/// All six built-in variants implement this (spec §4.4).
pub trait LightSource<const N: usize, T>: Send + Sync {
    /// Called once after the scene's bounding sphere is known. Distant and
    /// infinite-area lights use `scene_radius` to size their positional
    /// sampling disk; others ignore it.
    fn init(&mut self, scene_center: Vector<N, T>, scene_radius: T);

    fn arrive_sample(
        &self,
        rng: &mut Xoshiro256PlusPlus,
        surface_point: Vector<N, T>,
        surface_normal: Vector<N, T>,
    ) -> LightArriveSample<N, T>;

    fn arrive_info(&self, surface_point: Vector<N, T>, l: Vector<N, T>) -> LightArriveInfo<T>;

    fn leave_sample(&self, rng: &mut Xoshiro256PlusPlus) -> LightLeaveSample<N, T>;

    fn leave_pdf_pos(&self, dir: Vector<N, T>) -> T;

    fn leave_pdf_dir(&self, dir: Vector<N, T>) -> T;

    /// Radiance emitted in `dir`, if this light is physically emissive in
    /// that direction (e.g. a ball light's outward hemisphere); `None`
    /// otherwise.
    fn leave_radiance(&self, dir: Vector<N, T>) -> Option<RGB>;

    /// Scalar proxy used by [`crate::integrators::bpt::LightDistribution`]
    /// to weight this light when `equal_light_power == false`.
    fn power(&self) -> T;

    /// `true` ⇒ point/spot/distant lights: forbids BPT `s=1` connection
    /// except via explicit `arrive_sample` (spec §4.4, GLOSSARY).
    fn is_delta(&self) -> bool;

    /// `true` ⇒ environment-style: a ray miss is evaluated against this
    /// light via `leave_radiance`; its origin is at infinity.
    fn is_infinite_area(&self) -> bool;
}
