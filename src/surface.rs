//! The `Surface` contract (spec §4.3): the interface every hit exposes,
//! independent of what concrete shape produced it. Grounded on
//! `original_source/src/painter/objects.h`'s `Surface`/`SurfaceSample`.
//! BRDF math itself is out of scope (spec §1) — only the contract shape
//! is specified; concrete surfaces in `shapes::*` implement simple
//! Lambertian/specular reflectance so the integrators have something real
//! to exercise in tests.

use crate::math::{Ray, Vector, RGB};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Both geometric and shading normal at a hit point. `shading == geometric`
/// when `flat_shading` is forced (spec §6) or the surface has no smooth
/// normal field (spec §3).
#[derive(Debug, Clone, Copy)]
pub struct Normals<const N: usize, T> {
    pub geometric: Vector<N, T>,
    pub shading: Vector<N, T>,
}

/// Result of `Surface::sample`: an importance-sampled outgoing direction.
/// `usable()` mirrors `objects.h`'s `SurfaceSample::usable`.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSample<const N: usize, T> {
    pub l: Vector<N, T>,
    pub pdf: T,
    pub brdf: RGB,
}

impl<const N: usize, T: num_traits::Float> SurfaceSample<N, T> {
    pub fn usable(&self) -> bool {
        self.pdf > T::zero() && !self.brdf.is_black()
    }
}

/// Queries a hit exposes, independent of which concrete `Shape` produced
/// it (spec §4.3). Object-safe so scenes can return `&dyn Surface`
/// borrowed straight from `Scene`'s permanently-owned shape storage.
pub trait Surface<const N: usize, T> {
    /// Surface-snapped point; mesh facets and planar shapes may
    /// re-project the ray point onto the primitive to avoid drift.
    fn point(&self, ray: &Ray<N, T>, distance: T) -> Vector<N, T>;

    fn geometric_normal(&self, point: &Vector<N, T>) -> Vector<N, T>;

    /// `None` means flat shading: the caller should use `geometric_normal`.
    fn shading_normal(&self, point: &Vector<N, T>) -> Option<Vector<N, T>>;

    fn light_source(&self, point: &Vector<N, T>) -> Option<usize>;

    fn brdf(&self, point: &Vector<N, T>, n: &Vector<N, T>, v: &Vector<N, T>, l: &Vector<N, T>) -> RGB;

    /// Reverse-direction PDF density (solid-angle measure) for `l` given
    /// outgoing direction `v` — used both for direct-lighting MIS (§4.7)
    /// and BPT's "reversed" bookkeeping (§4.9).
    fn pdf(&self, point: &Vector<N, T>, n: &Vector<N, T>, v: &Vector<N, T>, l: &Vector<N, T>) -> T;

    fn sample(
        &self,
        rng: &mut Xoshiro256PlusPlus,
        point: &Vector<N, T>,
        n: &Vector<N, T>,
        v: &Vector<N, T>,
    ) -> SurfaceSample<N, T>;

    /// `true` ⇒ directions from `sample` are delta and must not be
    /// connected in BPT (spec §4.3, GLOSSARY "Specular surface").
    fn is_specular(&self, point: &Vector<N, T>) -> bool;

    /// `alpha == 0` ⇒ present but invisible to rays unless it holds a
    /// light (spec §4.3); traversal skips such hits.
    fn alpha(&self, point: &Vector<N, T>) -> T;
}

/// A `Surface` hit bound to the ray/distance that produced it; null-state
/// (`None`) when there was no hit. Mirrors `objects.h`'s
/// `SurfaceIntersection`, with the invariant `point == ray.point(distance)`
/// upheld by construction.
pub struct SurfaceIntersection<'a, const N: usize, T> {
    pub surface: &'a dyn Surface<N, T>,
    pub point: Vector<N, T>,
    pub distance: T,
}

impl<'a, const N: usize, T: Copy> SurfaceIntersection<'a, N, T> {
    pub fn new(surface: &'a dyn Surface<N, T>, ray: &Ray<N, T>, distance: T) -> Self {
        SurfaceIntersection {
            surface,
            point: surface.point(ray, distance),
            distance,
        }
    }

    pub fn geometric_normal(&self) -> Vector<N, T> {
        self.surface.geometric_normal(&self.point)
    }

    pub fn shading_normal(&self) -> Option<Vector<N, T>> {
        self.surface.shading_normal(&self.point)
    }

    /// Resolved normals, collapsing shading into geometric when absent or
    /// when `flat_shading` is forced (spec §6/§9).
    pub fn normals(&self, flat_shading: bool) -> Normals<N, T> {
        let geometric = self.geometric_normal();
        let shading = if flat_shading {
            geometric
        } else {
            self.shading_normal().unwrap_or(geometric)
        };
        Normals { geometric, shading }
    }
}
