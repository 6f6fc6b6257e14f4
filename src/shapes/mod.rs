//! The `Shape` contract (spec §4.2): a uniform intersectable-object
//! interface the BVH and `Scene` operate on without knowing concrete
//! shape kinds. Grounded on `original_source/src/painter/objects.h`'s
//! `Shape`/`ShapeIntersection`.

use crate::math::{BoundingBox, Ray};
use crate::surface::Surface;

pub mod hyperplane_parallelotope;
pub mod mesh;
pub mod parallelotope;

pub use hyperplane_parallelotope::HyperplaneParallelotope;
pub use mesh::Facet;
pub use parallelotope::Parallelotope;

/// Result of `Shape::intersect`: `surface.is_none()` is the null state.
pub struct ShapeIntersection<'a, const N: usize, T> {
    pub distance: T,
    pub surface: Option<&'a dyn Surface<N, T>>,
}

impl<'a, const N: usize, T> ShapeIntersection<'a, N, T> {
    pub fn none(distance: T) -> Self {
        ShapeIntersection {
            distance,
            surface: None,
        }
    }
}

/// Uniform contract for all intersectable objects (spec §4.2). Built-in
/// implementations: `Parallelotope` (N-cell), `HyperplaneParallelotope`
/// (planar N-1-cell), and `mesh::Facet` (an (N-1)-simplex with optional
/// per-vertex normals). Mesh *loading* (file parsing, convex-hull
/// construction) is out of scope (spec §1); the in-memory facet shape
/// itself is not.
pub trait Shape<const N: usize, T>: Surface<N, T> + Send + Sync {
    /// Relative cost used by the BVH's SAH split heuristic.
    fn intersection_cost(&self) -> T;

    /// Cheap bound test; must never return a distance `>= max_distance`.
    fn intersect_bounds(&self, ray: &Ray<N, T>, max_distance: T) -> Option<T>;

    /// Exact test; `bounding_distance < max_distance` is guaranteed by
    /// the caller (spec §4.2 policy).
    fn intersect(&self, ray: &Ray<N, T>, max_distance: T, bounding_distance: T) -> ShapeIntersection<'_, N, T>;

    fn intersect_any(&self, ray: &Ray<N, T>, max_distance: T, bounding_distance: T) -> bool;

    fn bounding_box(&self) -> BoundingBox<N, T>;
}
