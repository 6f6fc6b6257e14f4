//! Planar N−1-cell lying in a coordinate hyperplane (spec §6's
//! "hyperplane parallelotope"): a finite flat patch fixed at one axis
//! coordinate with a rectangular extent over the remaining N−1 axes —
//! the shape Cornell-box-style scenes build their walls and the area
//! light out of (spec §8 "Cornell-box PT" scenario). Grounded on
//! `original_source/src/painter/shapes/hyperplane_parallelotope.h`'s
//! axis-aligned specialization.

use crate::math::{BoundingBox, Ray, Vector, RGB};
use crate::shapes::{Shape, ShapeIntersection};
use crate::surface::{Surface, SurfaceSample};
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::f64::consts::PI;

pub struct HyperplaneParallelotope<const N: usize, T> {
    pub fixed_axis: usize,
    pub fixed_value: T,
    /// Inclusive min/max over all axes; `fixed_axis`'s entries equal
    /// `fixed_value` and are otherwise ignored.
    pub min: Vector<N, T>,
    pub max: Vector<N, T>,
    pub outward_normal: Vector<N, T>,
    pub albedo: RGB,
    pub emission: Option<RGB>,
    pub light_index: Option<usize>,
}

impl<const N: usize, T: num_traits::Float> HyperplaneParallelotope<N, T> {
    pub fn new(
        fixed_axis: usize,
        fixed_value: T,
        min: Vector<N, T>,
        max: Vector<N, T>,
        outward_normal: Vector<N, T>,
        albedo: RGB,
    ) -> Self {
        HyperplaneParallelotope {
            fixed_axis,
            fixed_value,
            min,
            max,
            outward_normal,
            albedo,
            emission: None,
            light_index: None,
        }
    }

    pub fn with_emission(mut self, emission: RGB, light_index: usize) -> Self {
        self.emission = Some(emission);
        self.light_index = Some(light_index);
        self
    }

    fn inside_extent(&self, point: &Vector<N, T>) -> bool {
        for i in 0..N {
            if i == self.fixed_axis {
                continue;
            }
            if point.components[i] < self.min.components[i] || point.components[i] > self.max.components[i] {
                return false;
            }
        }
        true
    }
}

impl<const N: usize, T: num_traits::Float> Surface<N, T> for HyperplaneParallelotope<N, T> {
    fn point(&self, ray: &Ray<N, T>, distance: T) -> Vector<N, T> {
        let mut p = ray.point(distance);
        p.components[self.fixed_axis] = self.fixed_value;
        p
    }

    fn geometric_normal(&self, _point: &Vector<N, T>) -> Vector<N, T> {
        self.outward_normal
    }

    fn shading_normal(&self, _point: &Vector<N, T>) -> Option<Vector<N, T>> {
        None
    }

    fn light_source(&self, _point: &Vector<N, T>) -> Option<usize> {
        self.light_index
    }

    fn brdf(&self, _point: &Vector<N, T>, n: &Vector<N, T>, _v: &Vector<N, T>, l: &Vector<N, T>) -> RGB {
        if n.dot(*l) <= T::zero() {
            RGB::black()
        } else {
            self.albedo.scale(1.0 / PI as f32)
        }
    }

    fn pdf(&self, _point: &Vector<N, T>, n: &Vector<N, T>, _v: &Vector<N, T>, l: &Vector<N, T>) -> T {
        let cos = n.dot(*l);
        if cos <= T::zero() {
            T::zero()
        } else {
            cos / T::from(PI).unwrap()
        }
    }

    fn sample(
        &self,
        rng: &mut Xoshiro256PlusPlus,
        point: &Vector<N, T>,
        n: &Vector<N, T>,
        v: &Vector<N, T>,
    ) -> SurfaceSample<N, T> {
        loop {
            let mut d = Vector::<N, T>::from_fn(|_| T::from(rng.gen_range(-1.0..1.0)).unwrap());
            let len2 = d.length_squared();
            if len2 > T::one() || len2 < T::epsilon() {
                continue;
            }
            if d.dot(*n) < T::zero() {
                d = -d;
            }
            let Some(l) = d.normalized() else { continue };
            let pdf = self.pdf(point, n, v, &l);
            if pdf <= T::zero() {
                continue;
            }
            return SurfaceSample {
                l,
                pdf,
                brdf: self.brdf(point, n, v, &l),
            };
        }
    }

    fn is_specular(&self, _point: &Vector<N, T>) -> bool {
        false
    }

    fn alpha(&self, _point: &Vector<N, T>) -> T {
        T::one()
    }
}

impl<const N: usize, T: num_traits::Float> Shape<N, T> for HyperplaneParallelotope<N, T> {
    fn intersection_cost(&self) -> T {
        T::one()
    }

    fn intersect_bounds(&self, ray: &Ray<N, T>, max_distance: T) -> Option<T> {
        let denom = ray.direction.components[self.fixed_axis];
        if denom.abs() < T::epsilon() {
            return None;
        }
        let t = (self.fixed_value - ray.origin.components[self.fixed_axis]) / denom;
        if t > T::zero() && t < max_distance {
            Some(t)
        } else {
            None
        }
    }

    fn intersect(&self, ray: &Ray<N, T>, max_distance: T, bounding_distance: T) -> ShapeIntersection<'_, N, T> {
        let denom = ray.direction.components[self.fixed_axis];
        if denom.abs() < T::epsilon() {
            return ShapeIntersection::none(max_distance);
        }
        let t = bounding_distance;
        let point = ray.point(t);
        if t > T::zero() && t < max_distance && self.inside_extent(&point) {
            ShapeIntersection {
                distance: t,
                surface: Some(self),
            }
        } else {
            ShapeIntersection::none(max_distance)
        }
    }

    fn intersect_any(&self, ray: &Ray<N, T>, max_distance: T, bounding_distance: T) -> bool {
        self.intersect(ray, max_distance, bounding_distance).surface.is_some()
    }

    fn bounding_box(&self) -> BoundingBox<N, T> {
        let thin = T::from(1e-6).unwrap();
        let mut min = self.min;
        let mut max = self.max;
        min.components[self.fixed_axis] = self.fixed_value - thin;
        max.components[self.fixed_axis] = self.fixed_value + thin;
        BoundingBox::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    #[test]
    fn hits_plane_inside_extent() {
        let wall: HyperplaneParallelotope<3, f64> = HyperplaneParallelotope::new(
            2,
            0.0,
            v([-1.0, -1.0, 0.0]),
            v([1.0, 1.0, 0.0]),
            v([0.0, 0.0, 1.0]),
            RGB::new(0.7, 0.7, 0.7),
        );
        let ray = Ray::new(v([0.0, 0.0, -5.0]), v([0.0, 0.0, 1.0]), f64::INFINITY);
        let bound = wall.intersect_bounds(&ray, f64::INFINITY).unwrap();
        let hit = wall.intersect(&ray, f64::INFINITY, bound);
        assert!(hit.surface.is_some());
        assert!((hit.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn misses_outside_extent() {
        let wall: HyperplaneParallelotope<3, f64> = HyperplaneParallelotope::new(
            2,
            0.0,
            v([-1.0, -1.0, 0.0]),
            v([1.0, 1.0, 0.0]),
            v([0.0, 0.0, 1.0]),
            RGB::new(0.7, 0.7, 0.7),
        );
        let ray = Ray::new(v([5.0, 5.0, -5.0]), v([0.0, 0.0, 1.0]), f64::INFINITY);
        assert!(wall.intersect_bounds(&ray, f64::INFINITY).is_none());
    }
}
