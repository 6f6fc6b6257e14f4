//! `Ray(N,T)` (spec §3): origin, unit direction, and — per the clip-plane
//! Open Question resolution in `DESIGN.md` — an explicit `max_distance`
//! carried on the ray itself rather than derived from a far-plane
//! position, matching `objects.h`'s `Ray::max_distance` field.

use super::vector::Vector;
use num_traits::Float;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray<const N: usize, T> {
    pub origin: Vector<N, T>,
    pub direction: Vector<N, T>,
    pub max_distance: T,
}

impl<const N: usize, T: Float> Ray<N, T> {
    pub fn new(origin: Vector<N, T>, direction: Vector<N, T>, max_distance: T) -> Self {
        Ray {
            origin,
            direction,
            max_distance,
        }
    }

    #[inline]
    pub fn point(&self, d: T) -> Vector<N, T> {
        self.origin + self.direction * d
    }

    #[inline]
    pub fn moved(&self, d: T) -> Self {
        Ray {
            origin: self.point(d),
            direction: self.direction,
            max_distance: self.max_distance - d,
        }
    }

    #[inline]
    pub fn with_origin(&self, origin: Vector<N, T>) -> Self {
        Ray { origin, ..*self }
    }

    #[inline]
    pub fn with_max_distance(&self, max_distance: T) -> Self {
        Ray {
            max_distance,
            ..*self
        }
    }

    #[inline]
    pub fn reversed(&self) -> Self {
        Ray {
            origin: self.origin,
            direction: -self.direction,
            max_distance: self.max_distance,
        }
    }
}
