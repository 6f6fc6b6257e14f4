//! Axis-aligned N-cell ("parallelotope"), one of the two built-in shapes
//! named by spec §6. Doubles as its own `Surface`: a single flat-shaded
//! diffuse (optionally emissive) box face, which is enough surface
//! contract for the integrators to exercise without pulling in the BRDF
//! math spec §1 excludes. Grounded in shape on
//! `original_source/src/painter/shapes/parallelotope.h`'s axis-aligned
//! specialization (`ParallelotopeAA`, also used by the BVH's overlap
//! test in `object_bvh.h`).

use crate::math::{BoundingBox, Ray, Vector, RGB};
use crate::shapes::{Shape, ShapeIntersection};
use crate::surface::{Surface, SurfaceSample};
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::f64::consts::PI;

pub struct Parallelotope<const N: usize, T> {
    pub min: Vector<N, T>,
    pub max: Vector<N, T>,
    pub albedo: RGB,
    pub emission: Option<RGB>,
    pub light_index: Option<usize>,
}

impl<const N: usize, T: num_traits::Float> Parallelotope<N, T> {
    pub fn new(min: Vector<N, T>, max: Vector<N, T>, albedo: RGB) -> Self {
        Parallelotope {
            min,
            max,
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

    fn face_normal(&self, point: &Vector<N, T>) -> Vector<N, T> {
        let mut best_axis = 0;
        let mut best_dist = T::infinity();
        let mut best_sign = T::one();
        for i in 0..N {
            let d_min = (point.components[i] - self.min.components[i]).abs();
            let d_max = (point.components[i] - self.max.components[i]).abs();
            if d_min < best_dist {
                best_dist = d_min;
                best_axis = i;
                best_sign = -T::one();
            }
            if d_max < best_dist {
                best_dist = d_max;
                best_axis = i;
                best_sign = T::one();
            }
        }
        Vector::axis(best_axis) * best_sign
    }
}

impl<const N: usize, T: num_traits::Float> Surface<N, T> for Parallelotope<N, T> {
    fn point(&self, ray: &Ray<N, T>, distance: T) -> Vector<N, T> {
        ray.point(distance)
    }

    fn geometric_normal(&self, point: &Vector<N, T>) -> Vector<N, T> {
        self.face_normal(point)
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
            // Lambertian: albedo / pi.
            self.albedo.scale(1.0 / PI as f32)
        }
    }

    fn pdf(&self, _point: &Vector<N, T>, n: &Vector<N, T>, _v: &Vector<N, T>, l: &Vector<N, T>) -> T {
        let cos = n.dot(*l);
        if cos <= T::zero() {
            T::zero()
        } else {
            // Cosine-weighted hemisphere PDF, generalized to N-1 angular
            // dimensions: cos(theta) / ((N-1)-sphere cap normalization).
            cos / T::from(PI).unwrap()
        }
    }

    fn sample(
        &self,
        rng: &mut Xoshiro256PlusPlus,
        _point: &Vector<N, T>,
        n: &Vector<N, T>,
        _v: &Vector<N, T>,
    ) -> SurfaceSample<N, T> {
        // Cosine-weighted sampling via rejection in the tangent frame
        // spanned by `n`'s orthogonal complement, generalized to N
        // dimensions by rejection sampling inside the unit ball and
        // reflecting into the hemisphere of `n`.
        loop {
            let mut v = Vector::<N, T>::from_fn(|_| T::from(rng.gen_range(-1.0..1.0)).unwrap());
            if v.length_squared() > T::one() || v.length_squared() < T::epsilon() {
                continue;
            }
            if v.dot(*n) < T::zero() {
                v = -v;
            }
            let Some(l) = v.normalized() else { continue };
            let pdf = self.pdf(_point, n, _v, &l);
            if pdf <= T::zero() {
                continue;
            }
            return SurfaceSample {
                l,
                pdf,
                brdf: self.brdf(_point, n, _v, &l),
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

impl<const N: usize, T: num_traits::Float> Shape<N, T> for Parallelotope<N, T> {
    fn intersection_cost(&self) -> T {
        T::one()
    }

    fn intersect_bounds(&self, ray: &Ray<N, T>, max_distance: T) -> Option<T> {
        let bb = self.bounding_box();
        bb.intersect(&ray.with_max_distance(max_distance))
            .map(|(t0, _)| if t0 > T::zero() { t0 } else { T::zero() })
            .filter(|&t| t < max_distance)
    }

    fn intersect(&self, ray: &Ray<N, T>, max_distance: T, _bounding_distance: T) -> ShapeIntersection<'_, N, T> {
        let bb = self.bounding_box();
        match bb.intersect(&ray.with_max_distance(max_distance)) {
            Some((t0, t1)) => {
                let t = if t0 > T::zero() { t0 } else { t1 };
                if t > T::zero() && t < max_distance {
                    ShapeIntersection {
                        distance: t,
                        surface: Some(self),
                    }
                } else {
                    ShapeIntersection::none(max_distance)
                }
            }
            None => ShapeIntersection::none(max_distance),
        }
    }

    fn intersect_any(&self, ray: &Ray<N, T>, max_distance: T, bounding_distance: T) -> bool {
        self.intersect(ray, max_distance, bounding_distance).surface.is_some()
    }

    fn bounding_box(&self) -> BoundingBox<N, T> {
        BoundingBox::new(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    #[test]
    fn ray_through_center_hits_near_face() {
        let box_: Parallelotope<3, f64> = Parallelotope::new(v([-1.0; 3]), v([1.0; 3]), RGB::new(0.8, 0.8, 0.8));
        let ray = Ray::new(v([-5.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let hit = box_.intersect(&ray, f64::INFINITY, 0.0);
        assert!(hit.surface.is_some());
        assert!((hit.distance - 4.0).abs() < 1e-9);
    }
}
