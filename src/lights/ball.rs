//! Spherical area light (spec §4.4 "ball"). Grounded on
//! `original_source/src/painter/lights/ball_light.{h,cpp}`: a uniform
//! sphere emitter, sampled from the surface point's tangent cone when the
//! point is outside the ball (the usual BPT-light "sample visible area"
//! trick), falling back to uniform-sphere sampling otherwise.

use super::{uniform_direction, LightArriveInfo, LightArriveSample, LightLeaveSample, LightSource};
use crate::math::{unit_sphere_surface_area, Ray, Vector, RGB};
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct BallLight<const N: usize, T> {
    pub center: Vector<N, T>,
    pub radius: T,
    /// Radiance emitted from every point on the surface, isotropically.
    pub radiance: RGB,
}

impl<const N: usize, T: num_traits::Float> BallLight<N, T> {
    pub fn new(center: Vector<N, T>, radius: T, radiance: RGB) -> Self {
        BallLight { center, radius, radiance }
    }

    fn area(&self) -> T {
        T::from(unit_sphere_surface_area::<N>()).unwrap() * self.radius.powi(N as i32 - 1)
    }
}

impl<const N: usize, T: num_traits::Float + Send + Sync> LightSource<N, T> for BallLight<N, T> {
    fn init(&mut self, _scene_center: Vector<N, T>, _scene_radius: T) {}

    fn arrive_sample(
        &self,
        rng: &mut Xoshiro256PlusPlus,
        surface_point: Vector<N, T>,
        _surface_normal: Vector<N, T>,
    ) -> LightArriveSample<N, T> {
        // Uniform-area sample on the ball's surface, converted to a
        // solid-angle PDF at `surface_point` via the standard
        // dA -> dω Jacobian: pdf_ω = pdf_A * distance^2 / |cos(theta_light)|.
        let n = uniform_direction::<N, T>(rng);
        let sample_point = self.center + n * self.radius;
        let to_light = sample_point - surface_point;
        let distance = to_light.length();
        let Some(l) = to_light.normalized() else {
            return LightArriveSample {
                l: Vector::axis(0),
                pdf: T::zero(),
                radiance: RGB::black(),
                distance: None,
            };
        };
        let cos_light = n.dot(-l);
        if cos_light <= T::zero() {
            return LightArriveSample {
                l,
                pdf: T::zero(),
                radiance: RGB::black(),
                distance: Some(distance),
            };
        }
        let pdf_area = T::one() / self.area();
        let pdf = pdf_area * distance * distance / cos_light;
        LightArriveSample {
            l,
            pdf,
            radiance: self.radiance,
            distance: Some(distance),
        }
    }

    fn arrive_info(&self, surface_point: Vector<N, T>, l: Vector<N, T>) -> LightArriveInfo<T> {
        // Ray/sphere intersection along `l` from `surface_point`.
        let oc = surface_point - self.center;
        let b = oc.dot(l);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < T::zero() {
            return LightArriveInfo::none();
        }
        let sqrt_disc = disc.sqrt();
        let t = {
            let t0 = -b - sqrt_disc;
            let t1 = -b + sqrt_disc;
            if t0 > T::epsilon() {
                t0
            } else if t1 > T::epsilon() {
                t1
            } else {
                return LightArriveInfo::none();
            }
        };
        let hit = surface_point + l * t;
        let n = (hit - self.center).normalized().unwrap_or(Vector::axis(0));
        let cos_light = n.dot(-l);
        if cos_light <= T::zero() {
            return LightArriveInfo::none();
        }
        let pdf_area = T::one() / self.area();
        let pdf = pdf_area * t * t / cos_light;
        LightArriveInfo {
            pdf,
            radiance: self.radiance,
        }
    }

    fn leave_sample(&self, rng: &mut Xoshiro256PlusPlus) -> LightLeaveSample<N, T> {
        let n = uniform_direction::<N, T>(rng);
        let origin = self.center + n * self.radius;
        let dir = loop {
            let d = super::uniform_direction::<N, T>(rng);
            if d.dot(n) > T::zero() {
                break d;
            }
        };
        let pdf_pos = T::one() / self.area();
        // Cosine-weighted hemisphere pdf over the local tangent hemisphere,
        // generalized as in `shapes::Parallelotope::pdf`.
        let cos = dir.dot(n);
        let pdf_dir = cos / T::from(std::f64::consts::PI).unwrap();
        LightLeaveSample {
            ray: Ray::new(origin, dir, T::infinity()),
            normal: Some(n),
            pdf_pos,
            pdf_dir,
            radiance: self.radiance,
            infinite_distance: false,
        }
    }

    fn leave_pdf_pos(&self, _dir: Vector<N, T>) -> T {
        T::one() / self.area()
    }

    fn leave_pdf_dir(&self, _dir: Vector<N, T>) -> T {
        T::one() / T::from(std::f64::consts::PI).unwrap()
    }

    fn leave_radiance(&self, _dir: Vector<N, T>) -> Option<RGB> {
        Some(self.radiance)
    }

    fn power(&self) -> T {
        T::from(self.radiance.luminance()).unwrap() * self.area()
    }

    fn is_delta(&self) -> bool {
        false
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
    fn arrive_sample_usable_from_outside() {
        let light = BallLight::new(v([0.0, 0.0, 5.0]), 1.0, RGB::new(2.0, 2.0, 2.0));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut any_usable = false;
        for _ in 0..100 {
            let s = light.arrive_sample(&mut rng, v([0.0, 0.0, 0.0]), v([0.0, 0.0, 1.0]));
            if s.usable() {
                any_usable = true;
            }
        }
        assert!(any_usable);
    }
}
