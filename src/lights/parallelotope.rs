//! Axis-aligned parallelotope (rectangular) area light (spec §4.4, and the
//! Cornell-box "area light at the top face" scenario of §8). Grounded on
//! `original_source/src/painter/lights/parallelotope_light.{h,cpp}`.

use super::{LightArriveInfo, LightArriveSample, LightLeaveSample, LightSource};
use crate::math::{Ray, Vector, RGB};
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct ParallelotopeLight<const N: usize, T> {
    pub min: Vector<N, T>,
    pub max: Vector<N, T>,
    pub fixed_axis: usize,
    pub outward_normal: Vector<N, T>,
    pub radiance: RGB,
}

impl<const N: usize, T: num_traits::Float> ParallelotopeLight<N, T> {
    pub fn new(
        fixed_axis: usize,
        min: Vector<N, T>,
        max: Vector<N, T>,
        outward_normal: Vector<N, T>,
        radiance: RGB,
    ) -> Self {
        ParallelotopeLight {
            min,
            max,
            fixed_axis,
            outward_normal,
            radiance,
        }
    }

    fn area(&self) -> T {
        let mut a = T::one();
        for i in 0..N {
            if i != self.fixed_axis {
                a = a * (self.max.components[i] - self.min.components[i]);
            }
        }
        a
    }

    fn sample_point(&self, rng: &mut Xoshiro256PlusPlus) -> Vector<N, T> {
        Vector::from_fn(|i| {
            if i == self.fixed_axis {
                self.min.components[i]
            } else {
                let lo = self.min.components[i].to_f64().unwrap();
                let hi = self.max.components[i].to_f64().unwrap();
                T::from(rng.gen_range(lo..=hi)).unwrap()
            }
        })
    }
}

impl<const N: usize, T: num_traits::Float + Send + Sync> LightSource<N, T> for ParallelotopeLight<N, T> {
    fn init(&mut self, _scene_center: Vector<N, T>, _scene_radius: T) {}

    fn arrive_sample(
        &self,
        rng: &mut Xoshiro256PlusPlus,
        surface_point: Vector<N, T>,
        _surface_normal: Vector<N, T>,
    ) -> LightArriveSample<N, T> {
        let sample_point = self.sample_point(rng);
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
        let cos_light = self.outward_normal.dot(-l);
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
        let denom = l.components[self.fixed_axis];
        if denom.abs() < T::epsilon() {
            return LightArriveInfo::none();
        }
        let t = (self.min.components[self.fixed_axis] - surface_point.components[self.fixed_axis]) / denom;
        if t <= T::epsilon() {
            return LightArriveInfo::none();
        }
        let hit = surface_point + l * t;
        for i in 0..N {
            if i == self.fixed_axis {
                continue;
            }
            if hit.components[i] < self.min.components[i] || hit.components[i] > self.max.components[i] {
                return LightArriveInfo::none();
            }
        }
        let cos_light = self.outward_normal.dot(-l);
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
        let origin = self.sample_point(rng);
        let dir = loop {
            let d = super::uniform_direction::<N, T>(rng);
            if d.dot(self.outward_normal) > T::zero() {
                break d;
            }
        };
        let cos = dir.dot(self.outward_normal);
        LightLeaveSample {
            ray: Ray::new(origin, dir, T::infinity()),
            normal: Some(self.outward_normal),
            pdf_pos: T::one() / self.area(),
            pdf_dir: cos / T::from(std::f64::consts::PI).unwrap(),
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

    fn leave_radiance(&self, dir: Vector<N, T>) -> Option<RGB> {
        if dir.dot(self.outward_normal) > T::zero() {
            Some(self.radiance)
        } else {
            None
        }
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
    fn samples_land_inside_extent() {
        let light = ParallelotopeLight::new(2, v([-1.0, -1.0, 2.0]), v([1.0, 1.0, 2.0]), v([0.0, 0.0, -1.0]), RGB::ONE);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        for _ in 0..20 {
            let p = light.sample_point(&mut rng);
            assert!((-1.0..=1.0).contains(&p.components[0]));
            assert_eq!(p.components[2], 2.0);
        }
    }
}
