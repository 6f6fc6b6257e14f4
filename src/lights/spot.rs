//! Spotlight with angular falloff (spec §4.4, §8 Cornell-box scenario's
//! `falloff_start=60°, width=72°`). Grounded on
//! `original_source/src/painter/lights/com/spotlight.h`'s
//! `falloff_start`/`width` cosine-threshold falloff curve and
//! `original_source/src/painter/lights/spot_light.{h,cpp}`.

use super::{LightArriveInfo, LightArriveSample, LightLeaveSample, LightSource};
use crate::lights::uniform_direction;
use crate::math::{Ray, Vector, RGB};
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct SpotLight<const N: usize, T> {
    pub position: Vector<N, T>,
    pub direction: Vector<N, T>,
    pub intensity: RGB,
    /// `cos(falloff_start_degrees)`: beyond this cosine, full intensity.
    falloff_start_cos: T,
    /// `cos(width_degrees)`: beyond this cosine, zero intensity.
    width_cos: T,
}

impl<const N: usize, T: num_traits::Float> SpotLight<N, T> {
    pub fn new(
        position: Vector<N, T>,
        direction: Vector<N, T>,
        intensity: RGB,
        falloff_start_degrees: T,
        width_degrees: T,
    ) -> Self {
        let to_rad = |deg: T| deg * T::from(std::f64::consts::PI / 180.0).unwrap();
        SpotLight {
            position,
            direction: direction.normalized().unwrap_or(Vector::axis(0)),
            intensity,
            falloff_start_cos: to_rad(falloff_start_degrees).cos(),
            width_cos: to_rad(width_degrees).cos(),
        }
    }

    /// Smooth quartic falloff between `width` and `falloff_start`, matching
    /// `Spotlight::coef`'s `((cosine - width) / (falloff_start - width))^4`.
    fn falloff(&self, cosine: T) -> T {
        if cosine >= self.falloff_start_cos {
            T::one()
        } else if cosine <= self.width_cos {
            T::zero()
        } else {
            let t = (cosine - self.width_cos) / (self.falloff_start_cos - self.width_cos);
            t * t * t * t
        }
    }
}

impl<const N: usize, T: num_traits::Float + Send + Sync> LightSource<N, T> for SpotLight<N, T> {
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
        let cosine = (-l).dot(self.direction);
        let coef = self.falloff(cosine);
        let d2 = (distance * distance).max(T::epsilon());
        LightArriveSample {
            l,
            pdf: T::one(),
            radiance: self.intensity.scale(coef.to_f32().unwrap_or(0.0) / d2.to_f32().unwrap_or(1.0)),
            distance: Some(distance),
        }
    }

    fn arrive_info(&self, _surface_point: Vector<N, T>, _l: Vector<N, T>) -> LightArriveInfo<T> {
        LightArriveInfo::none()
    }

    fn leave_sample(&self, rng: &mut Xoshiro256PlusPlus) -> LightLeaveSample<N, T> {
        // Rejection-sample a direction inside the cone by drawing a
        // uniform sphere direction and keeping only those within `width`.
        let dir = loop {
            let d = uniform_direction::<N, T>(rng);
            if d.dot(self.direction) >= self.width_cos {
                break d;
            }
        };
        let coef = self.falloff(dir.dot(self.direction));
        LightLeaveSample {
            ray: Ray::new(self.position, dir, T::infinity()),
            normal: None,
            pdf_pos: T::one(),
            pdf_dir: T::one(), // cone solid angle cancels in the unnormalized rejection scheme
            radiance: self.intensity.scale(coef.to_f32().unwrap_or(0.0)),
            infinite_distance: false,
        }
    }

    fn leave_pdf_pos(&self, _dir: Vector<N, T>) -> T {
        T::one()
    }

    fn leave_pdf_dir(&self, _dir: Vector<N, T>) -> T {
        T::one()
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

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    #[test]
    fn falloff_curve_matches_thresholds() {
        let light = SpotLight::new(v([0.0; 3]), v([0.0, 0.0, -1.0]), RGB::ONE, 60.0, 72.0);
        assert_eq!(light.falloff(1.0), 1.0);
        assert_eq!(light.falloff(light.width_cos - 0.1), 0.0);
        let mid = light.falloff((light.falloff_start_cos + light.width_cos) / 2.0);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
