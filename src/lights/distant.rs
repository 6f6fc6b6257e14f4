//! Directional (sun-like) light, infinitely far away (spec §4.4). Grounded
//! on `original_source/src/painter/lights/distant_light.{h,cpp}`.
//!
//! `init` records `scene_radius` so `leave_sample` can place a virtual
//! origin disk `scene_radius` away, perpendicular to the light direction,
//! the way the original positions a "sampling disk of radius scene_radius"
//! (spec §4.4 `init` doc).

use super::{LightArriveInfo, LightArriveSample, LightLeaveSample, LightSource};
use crate::math::{Ray, Vector, RGB};
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct DistantLight<const N: usize, T> {
    /// Direction the light travels (from the light toward the scene).
    pub direction: Vector<N, T>,
    pub radiance: RGB,
    scene_center: Vector<N, T>,
    scene_radius: T,
}

impl<const N: usize, T: num_traits::Float> DistantLight<N, T> {
    pub fn new(direction: Vector<N, T>, radiance: RGB) -> Self {
        DistantLight {
            direction: direction.normalized().unwrap_or(Vector::axis(0)),
            radiance,
            scene_center: Vector::zero(),
            scene_radius: T::one(),
        }
    }

    /// Samples a point on the disk of radius `scene_radius`, orthogonal to
    /// `direction`, centered at `scene_center - direction * scene_radius`.
    fn disk_origin(&self, rng: &mut Xoshiro256PlusPlus) -> Vector<N, T> {
        let center = self.scene_center - self.direction * self.scene_radius;
        loop {
            let offset = Vector::<N, T>::from_fn(|_| T::from(rng.gen_range(-1.0..1.0)).unwrap());
            let tangential = offset - self.direction * offset.dot(self.direction);
            if tangential.length_squared() <= self.scene_radius * self.scene_radius {
                return center + tangential;
            }
        }
    }
}

impl<const N: usize, T: num_traits::Float + Send + Sync> LightSource<N, T> for DistantLight<N, T> {
    fn init(&mut self, scene_center: Vector<N, T>, scene_radius: T) {
        self.scene_center = scene_center;
        self.scene_radius = scene_radius;
    }

    fn arrive_sample(
        &self,
        _rng: &mut Xoshiro256PlusPlus,
        _surface_point: Vector<N, T>,
        _surface_normal: Vector<N, T>,
    ) -> LightArriveSample<N, T> {
        LightArriveSample {
            l: -self.direction,
            pdf: T::one(),
            radiance: self.radiance,
            distance: None,
        }
    }

    fn arrive_info(&self, _surface_point: Vector<N, T>, _l: Vector<N, T>) -> LightArriveInfo<T> {
        LightArriveInfo::none()
    }

    fn leave_sample(&self, rng: &mut Xoshiro256PlusPlus) -> LightLeaveSample<N, T> {
        let origin = self.disk_origin(rng);
        let area = T::from(std::f64::consts::PI).unwrap() * self.scene_radius * self.scene_radius;
        LightLeaveSample {
            ray: Ray::new(origin, self.direction, T::infinity()),
            normal: Some(-self.direction),
            pdf_pos: T::one() / area,
            pdf_dir: T::one(),
            radiance: self.radiance,
            infinite_distance: false,
        }
    }

    fn leave_pdf_pos(&self, _dir: Vector<N, T>) -> T {
        T::one() / (T::from(std::f64::consts::PI).unwrap() * self.scene_radius * self.scene_radius)
    }

    fn leave_pdf_dir(&self, _dir: Vector<N, T>) -> T {
        T::one()
    }

    fn leave_radiance(&self, _dir: Vector<N, T>) -> Option<RGB> {
        None
    }

    fn power(&self) -> T {
        T::from(self.radiance.luminance()).unwrap() * self.scene_radius * self.scene_radius
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
    fn arrive_sample_points_opposite_travel_direction() {
        let light = DistantLight::new(v([0.0, 0.0, -1.0]), RGB::ONE);
        let mut rng = rand_xoshiro::Xoshiro256PlusPlus::from_seed([0u8; 32]);
        let s = light.arrive_sample(&mut rng, v([0.0; 3]), v([0.0, 0.0, 1.0]));
        assert_eq!(s.l, v([0.0, 0.0, 1.0]));
        assert_eq!(s.distance, None);
    }
}
