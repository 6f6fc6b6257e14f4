//! `Scene` (spec §4.5): wraps the BVH, shapes, lights, and projector;
//! provides `intersect`/`intersect_any` with geometric-normal-aware ray
//! offsetting and an optional clip-polytope cull. Grounded on
//! `original_source/src/painter/objects.h`'s `Scene` interface; the
//! clip-polytope policy follows spec §4.5/§9 prose directly (the
//! retrieved `original_source/` tree has no standalone `scene.cpp`).

use crate::error::ConstructionError;
use crate::geometry::{Bvh, BvhObject};
use crate::lights::LightSource;
use crate::math::{ray_offset_epsilon, Ray, Vector, RGB};
use crate::shapes::Shape;
use crate::surface::SurfaceIntersection;
use std::sync::atomic::{AtomicI64, Ordering};

/// A half-space `dot(n, p) <= d`, one face of the optional clip polytope
/// (spec §6 "clip_half_space").
#[derive(Debug, Clone, Copy)]
pub struct HalfSpace<const N: usize, T> {
    pub normal: Vector<N, T>,
    pub offset: T,
}

impl<const N: usize, T: num_traits::Float> HalfSpace<N, T> {
    /// Entry/exit distance along `ray` that stays inside this half-space,
    /// or `None` if the ray never enters it.
    fn clip(&self, ray: &Ray<N, T>) -> Option<(T, T)> {
        let denom = self.normal.dot(ray.direction);
        let num = self.offset - self.normal.dot(ray.origin);
        if denom.abs() < T::epsilon() {
            return if num >= T::zero() {
                Some((T::zero(), T::infinity()))
            } else {
                None
            };
        }
        let t = num / denom;
        if denom > T::zero() {
            Some((T::neg_infinity(), t))
        } else {
            Some((t, T::infinity()))
        }
    }
}

/// Intersection of all half-spaces in a clip polytope (spec §4.5 step 2).
pub struct ClipPolytope<const N: usize, T> {
    pub half_spaces: Vec<HalfSpace<N, T>>,
}

impl<const N: usize, T: num_traits::Float> ClipPolytope<N, T> {
    /// `(near, far)` interval the ray may travel while remaining inside
    /// every half-space, or `None` if the ray misses the polytope
    /// entirely. The far bound stays implicit in the source (spec §9 Open
    /// Question); this resolves it against `ray.max_distance`, an
    /// explicit field on [`Ray`] rather than one derived by subtraction
    /// (see `DESIGN.md`).
    pub fn clip(&self, ray: &Ray<N, T>) -> Option<(T, T)> {
        let mut lo = T::zero();
        let mut hi = ray.max_distance;
        for hs in &self.half_spaces {
            let (t0, t1) = hs.clip(ray)?;
            lo = lo.max(t0);
            hi = hi.min(t1);
            if hi <= lo {
                return None;
            }
        }
        Some((lo, hi))
    }
}

pub struct Scene<const N: usize, T, P> {
    pub background_color: RGB,
    pub clip_polytope: Option<ClipPolytope<N, T>>,
    pub projector: P,
    pub lights: Vec<Box<dyn LightSource<N, T>>>,
    pub shapes: Vec<Box<dyn Shape<N, T>>>,
    bvh: Bvh<N, T>,
    thread_ray_count: AtomicI64,
}

impl<const N: usize, T: num_traits::Float + Send + Sync, P> Scene<N, T, P> {
    pub fn new(
        background_color: RGB,
        clip_polytope: Option<ClipPolytope<N, T>>,
        projector: P,
        mut lights: Vec<Box<dyn LightSource<N, T>>>,
        shapes: Vec<Box<dyn Shape<N, T>>>,
    ) -> Result<Self, ConstructionError> {
        if lights.is_empty() && background_color.is_black() {
            return Err(ConstructionError::NoLightAndBlackBackground);
        }

        let objects: Vec<BvhObject<N, T>> = shapes
            .iter()
            .enumerate()
            .map(|(index, shape)| BvhObject {
                bounds: shape.bounding_box(),
                cost: shape.intersection_cost(),
                index,
            })
            .collect();
        let bvh = Bvh::build(objects);

        let (center, radius) = scene_bounding_sphere(&bvh);
        for light in &mut lights {
            light.init(center, radius);
        }

        Ok(Scene {
            background_color,
            clip_polytope,
            projector,
            lights,
            shapes,
            bvh,
            thread_ray_count: AtomicI64::new(0),
        })
    }

    pub fn thread_ray_count(&self) -> i64 {
        self.thread_ray_count.load(Ordering::Relaxed)
    }

    /// `intersect(geometric_normal, ray)` (spec §4.5), using `ray`'s own
    /// `max_distance`.
    pub fn intersect(
        &self,
        geometric_normal: Option<Vector<N, T>>,
        ray: &Ray<N, T>,
    ) -> Option<SurfaceIntersection<'_, N, T>> {
        self.intersect_max(geometric_normal, ray, ray.max_distance)
    }

    /// `intersect(geometric_normal, ray, max_distance)` (spec §4.5). Step
    /// 1: offsets the ray origin along `geometric_normal` to avoid
    /// self-intersection on the surface being left. Step 2: clips to the
    /// polytope. Step 3: delegates to the BVH, with a bounding-then-exact
    /// near-first pass over each leaf's shapes.
    pub fn intersect_max(
        &self,
        geometric_normal: Option<Vector<N, T>>,
        ray: &Ray<N, T>,
        max_distance: T,
    ) -> Option<SurfaceIntersection<'_, N, T>> {
        self.thread_ray_count.fetch_add(1, Ordering::Relaxed);

        let mut ray = ray.with_max_distance(max_distance);
        if let Some(n) = geometric_normal {
            ray = offset_ray(&ray, n);
        }

        if let Some(polytope) = &self.clip_polytope {
            match polytope.clip(&ray) {
                Some((near, far)) => ray = ray.moved(near).with_max_distance(far - near),
                None => return None,
            }
        }

        self.bvh
            .intersect(&ray, ray.max_distance, |indices, current_max| {
                self.nearest_in_leaf(&ray, indices, current_max)
            })
            .map(|(distance, surface)| SurfaceIntersection::new(surface, &ray, distance))
    }

    /// `intersect_any`: returns `true` on the first exact, non-transparent
    /// hit (spec §4.5 "Shadow").
    pub fn intersect_any(
        &self,
        geometric_normal: Option<Vector<N, T>>,
        ray: &Ray<N, T>,
        max_distance: T,
    ) -> bool {
        self.thread_ray_count.fetch_add(1, Ordering::Relaxed);

        let mut ray = ray.with_max_distance(max_distance);
        if let Some(n) = geometric_normal {
            ray = offset_ray(&ray, n);
        }

        if let Some(polytope) = &self.clip_polytope {
            match polytope.clip(&ray) {
                Some((near, far)) => ray = ray.moved(near).with_max_distance(far - near),
                None => return false,
            }
        }

        self.bvh.intersect_any(&ray, ray.max_distance, |indices| {
            indices.iter().any(|&i| {
                let shape = &self.shapes[i];
                match shape.intersect_bounds(&ray, ray.max_distance) {
                    Some(bound) => {
                        let hit = shape.intersect(&ray, ray.max_distance, bound);
                        match hit.surface {
                            Some(surface) => {
                                let point = surface.point(&ray, hit.distance);
                                surface.alpha(&point) > T::zero() || surface.light_source(&point).is_some()
                            }
                            None => false,
                        }
                    }
                    None => false,
                }
            })
        })
    }

    /// Finds the nearest exact hit among `indices` inside one BVH leaf: a
    /// bounding-then-exact pass over shapes sorted by bound distance,
    /// stopping as soon as the next bound exceeds the tightest exact hit
    /// found so far (spec §4.5 step 3). Alpha-zero surfaces that hold no
    /// light are skipped, per the `Shape`/`Surface` contract (spec §4.3).
    fn nearest_in_leaf<'a>(
        &'a self,
        ray: &Ray<N, T>,
        indices: &[usize],
        current_max: T,
    ) -> Option<(T, &'a dyn crate::surface::Surface<N, T>)> {
        let mut bounds: Vec<(T, usize)> = indices
            .iter()
            .filter_map(|&i| self.shapes[i].intersect_bounds(ray, current_max).map(|d| (d, i)))
            .collect();
        bounds.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut best: Option<(T, &'a dyn crate::surface::Surface<N, T>)> = None;
        for (bound, i) in bounds {
            let tightest = best.as_ref().map_or(current_max, |(d, _)| *d);
            if bound >= tightest {
                break;
            }
            let shape = &self.shapes[i];
            let hit = shape.intersect(ray, tightest, bound);
            if let Some(surface) = hit.surface {
                let point = surface.point(ray, hit.distance);
                if surface.alpha(&point) <= T::zero() && surface.light_source(&point).is_none() {
                    continue;
                }
                best = Some((hit.distance, surface));
            }
        }
        best
    }
}

/// `RAY_OFFSET`-scaled push of the ray origin along `n` (spec §4.5 step 1
/// / §5 "Numerical discipline"): scale proportional to the component
/// magnitude.
fn offset_ray<const N: usize, T: num_traits::Float>(ray: &Ray<N, T>, n: Vector<N, T>) -> Ray<N, T> {
    let eps = ray_offset_epsilon::<T>();
    let offset = Vector::<N, T>::from_fn(|i| n.components[i] * eps * ray.origin.components[i].abs().max(T::one()));
    ray.with_origin(ray.origin + offset)
}

fn scene_bounding_sphere<const N: usize, T: num_traits::Float>(bvh: &Bvh<N, T>) -> (Vector<N, T>, T) {
    match bvh.bounding_box() {
        Some(bb) => {
            let center = bb.center();
            let radius = bb.diagonal().length() / (T::one() + T::one());
            (center, radius.max(T::one()))
        }
        None => (Vector::zero(), T::one()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::PointLight;
    use crate::projector::PerspectiveProjector;
    use crate::shapes::Parallelotope;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    fn test_projector() -> PerspectiveProjector<3, 2, f64> {
        PerspectiveProjector {
            origin: v([0.0, 0.0, -5.0]),
            distance: 1.0,
            screen_size: [64, 64],
        }
    }

    #[test]
    fn rejects_empty_scene_with_black_background() {
        let result = Scene::new(RGB::black(), None, test_projector(), vec![], vec![]);
        assert_eq!(result.err(), Some(ConstructionError::NoLightAndBlackBackground));
    }

    #[test]
    fn finds_nearest_box_along_ray() {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-1.0, -1.0, -1.0]),
            v([1.0, 1.0, 1.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::ONE))];
        let scene = Scene::new(RGB::black(), None, test_projector(), lights, shapes).unwrap();

        let ray = Ray::new(v([-5.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let hit = scene.intersect(None, &ray).expect("ray should hit the box");
        assert!((hit.distance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn intersect_any_detects_occluder() {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-1.0, -1.0, -1.0]),
            v([1.0, 1.0, 1.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::ONE))];
        let scene = Scene::new(RGB::black(), None, test_projector(), lights, shapes).unwrap();

        let ray = Ray::new(v([-5.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        assert!(scene.intersect_any(None, &ray, f64::INFINITY));

        let missing_ray = Ray::new(v([-5.0, 5.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        assert!(!scene.intersect_any(None, &missing_ray, f64::INFINITY));
    }
}
