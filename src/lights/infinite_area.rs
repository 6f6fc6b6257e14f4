//! Environment (infinite-area) light: a uniform-radiance sky dome, the
//! simplest member of the family the spec's "environment lookup" contract
//! demands without pulling in image-based environment maps (spec §1, out
//! of scope: "image file I/O"). Grounded on
//! `original_source/src/painter/lights/infinite_area_light.{h,cpp}`.
//!
//! Any ray miss is evaluated against this light via `leave_radiance`; its
//! origin is effectively at infinity, so `leave_sample` places it on a
//! disk of radius `scene_radius` the same way `DistantLight` does, per the
//! `init` contract (spec §4.4).

use super::{uniform_direction, LightArriveInfo, LightArriveSample, LightLeaveSample, LightSource};
use crate::math::{unit_sphere_surface_area, Ray, Vector, RGB};
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct InfiniteAreaLight<const N: usize, T> {
    pub radiance: RGB,
    scene_center: Vector<N, T>,
    scene_radius: T,
}

impl<const N: usize, T: num_traits::Float> InfiniteAreaLight<N, T> {
    pub fn new(radiance: RGB) -> Self {
        InfiniteAreaLight {
            radiance,
            scene_center: Vector::zero(),
            scene_radius: T::one(),
        }
    }
}

impl<const N: usize, T: num_traits::Float + Send + Sync> LightSource<N, T> for InfiniteAreaLight<N, T> {
    fn init(&mut self, scene_center: Vector<N, T>, scene_radius: T) {
        self.scene_center = scene_center;
        self.scene_radius = scene_radius;
    }

    fn arrive_sample(
        &self,
        rng: &mut Xoshiro256PlusPlus,
        _surface_point: Vector<N, T>,
        surface_normal: Vector<N, T>,
    ) -> LightArriveSample<N, T> {
        // Cosine-weighted over the surface's hemisphere, matching the
        // cosine-weighted technique `shapes::Parallelotope::sample` uses,
        // so the returned solid-angle PDF is non-degenerate.
        loop {
            let v = Vector::<N, T>::from_fn(|_| T::from(rng.gen_range(-1.0..1.0)).unwrap());
            let len2 = v.length_squared();
            if len2 > T::epsilon() && len2 <= T::one() {
                let mut l = v.normalized().unwrap();
                if l.dot(surface_normal) < T::zero() {
                    l = -l;
                }
                let cos = l.dot(surface_normal);
                if cos <= T::zero() {
                    continue;
                }
                let pdf = cos / T::from(std::f64::consts::PI).unwrap();
                return LightArriveSample {
                    l,
                    pdf,
                    radiance: self.radiance,
                    distance: None,
                };
            }
        }
    }

    fn arrive_info(&self, _surface_point: Vector<N, T>, _l: Vector<N, T>) -> LightArriveInfo<T> {
        LightArriveInfo {
            pdf: T::one() / T::from(unit_sphere_surface_area::<N>()).unwrap(),
            radiance: self.radiance,
        }
    }

    fn leave_sample(&self, rng: &mut Xoshiro256PlusPlus) -> LightLeaveSample<N, T> {
        let dir = -uniform_direction::<N, T>(rng);
        let disk_center = self.scene_center - dir * self.scene_radius;
        let origin = loop {
            let offset = Vector::<N, T>::from_fn(|_| T::from(rng.gen_range(-1.0..1.0)).unwrap());
            let tangential = offset - dir * offset.dot(dir);
            if tangential.length_squared() <= self.scene_radius * self.scene_radius {
                break disk_center + tangential;
            }
        };
        let area = T::from(std::f64::consts::PI).unwrap() * self.scene_radius * self.scene_radius;
        LightLeaveSample {
            ray: Ray::new(origin, dir, T::infinity()),
            normal: None,
            pdf_pos: T::one() / area,
            pdf_dir: T::one() / T::from(unit_sphere_surface_area::<N>()).unwrap(),
            radiance: self.radiance,
            infinite_distance: true,
        }
    }

    fn leave_pdf_pos(&self, _dir: Vector<N, T>) -> T {
        let area = T::from(std::f64::consts::PI).unwrap() * self.scene_radius * self.scene_radius;
        T::one() / area
    }

    fn leave_pdf_dir(&self, _dir: Vector<N, T>) -> T {
        T::one() / T::from(unit_sphere_surface_area::<N>()).unwrap()
    }

    fn leave_radiance(&self, _dir: Vector<N, T>) -> Option<RGB> {
        Some(self.radiance)
    }

    fn power(&self) -> T {
        T::from(self.radiance.luminance()).unwrap() * self.scene_radius * self.scene_radius
    }

    fn is_delta(&self) -> bool {
        false
    }

    fn is_infinite_area(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;

    #[test]
    fn radiance_is_uniform_in_every_direction() {
        let light: InfiniteAreaLight<3, f64> = InfiniteAreaLight::new(RGB::new(0.5, 0.5, 0.5));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let s = light.arrive_sample(&mut rng, Vector::zero(), Vector::axis(2));
        assert_eq!(s.radiance, RGB::new(0.5, 0.5, 0.5));
        assert!(light.is_infinite_area());
    }
}
