//! Isotropic point light (spec §4.4). Grounded on
//! `original_source/src/painter/lights/point_light.{h,cpp}`.

use super::{uniform_direction, LightArriveInfo, LightArriveSample, LightLeaveSample, LightSource};
use crate::math::{unit_sphere_surface_area, Ray, Vector, RGB};
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct PointLight<const N: usize, T> {
    pub position: Vector<N, T>,
    /// Radiant intensity (power per solid angle), so `arrive_sample`
    /// divides by `distance^2` to get irradiance.
    pub intensity: RGB,
}

impl<const N: usize, T: num_traits::Float> PointLight<N, T> {
    pub fn new(position: Vector<N, T>, intensity: RGB) -> Self {
        PointLight { position, intensity }
    }
}

impl<const N: usize, T: num_traits::Float + Send + Sync> LightSource<N, T> for PointLight<N, T> {
    fn init(&mut self, _scene_center: Vector<N, T>, _scene_radius: T) {}

    fn arrive_sample(
        &self,
        _rng: &mut Xoshiro256PlusPlus,
        surface_point: Vector<N, T>,
        _surface_normal: Vector<N, T>,
    ) -> LightArriveSample<N, T> {
        let to_light = self.position - surface_point;
        let distance = to_light.length();
        let Some(l) = to_light.normalized() else {
            return LightArriveSample {
                l: Vector::axis(0),
                pdf: T::zero(),
                radiance: RGB::black(),
                distance: None,
            };
        };
        let d2 = (distance * distance).max(T::epsilon());
        LightArriveSample {
            l,
            pdf: T::one(),
            radiance: self.intensity.scale(1.0 / d2.to_f32().unwrap_or(1.0)),
            distance: Some(distance),
        }
    }

    fn arrive_info(&self, _surface_point: Vector<N, T>, _l: Vector<N, T>) -> LightArriveInfo<T> {
        // A delta light can never be hit by BRDF-sampled direction.
        LightArriveInfo::none()
    }

    fn leave_sample(&self, rng: &mut Xoshiro256PlusPlus) -> LightLeaveSample<N, T> {
        let dir = uniform_direction::<N, T>(rng);
        let pdf_dir = T::from(1.0 / unit_sphere_surface_area::<N>()).unwrap();
        LightLeaveSample {
            ray: Ray::new(self.position, dir, T::infinity()),
            normal: None,
            pdf_pos: T::one(),
            pdf_dir,
            radiance: self.intensity,
            infinite_distance: false,
        }
    }

    fn leave_pdf_pos(&self, _dir: Vector<N, T>) -> T {
        T::one()
    }

    fn leave_pdf_dir(&self, _dir: Vector<N, T>) -> T {
        T::from(1.0 / unit_sphere_surface_area::<N>()).unwrap()
    }

    fn leave_radiance(&self, _dir: Vector<N, T>) -> Option<RGB> {
        None
    }

    fn power(&self) -> T {
        T::from(self.intensity.luminance()).unwrap()
    }

    fn is_delta(&self) -> bool {
        true
    }

    fn is_infinite_area(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    #[test]
    fn arrive_sample_falls_off_with_distance_squared() {
        let light = PointLight::new(v([0.0, 0.0, 2.0]), RGB::new(1.0, 1.0, 1.0));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let s = light.arrive_sample(&mut rng, v([0.0, 0.0, 0.0]), v([0.0, 0.0, 1.0]));
        assert!((s.radiance.luminance() - 0.25).abs() < 1e-6);
        assert_eq!(s.distance, Some(2.0));
    }
}
