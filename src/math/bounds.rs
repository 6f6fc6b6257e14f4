//! `BoundingBox(N,T)` (spec §3): axis-aligned min/max corners, with the
//! slab-method ray test used both by the BVH (`geometry::bvh`) and by
//! per-shape `intersect_bounds` implementations (spec §4.2).

use super::vector::Vector;
use super::ray::Ray;
use num_traits::Float;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox<const N: usize, T> {
    pub min: Vector<N, T>,
    pub max: Vector<N, T>,
}

impl<const N: usize, T: Float> BoundingBox<N, T> {
    pub fn new(min: Vector<N, T>, max: Vector<N, T>) -> Self {
        BoundingBox { min, max }
    }

    pub fn empty() -> Self {
        BoundingBox {
            min: Vector::splat(T::infinity()),
            max: Vector::splat(-T::infinity()),
        }
    }

    #[inline]
    pub fn diagonal(&self) -> Vector<N, T> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vector<N, T> {
        (self.min + self.max) / (T::one() + T::one())
    }

    /// Surface area of the (N-1)-boundary, used by the BVH's SAH cost
    /// model. For N=3 this is the usual box surface area.
    pub fn surface(&self) -> T {
        let d = self.diagonal();
        let mut total = T::zero();
        for i in 0..N {
            let mut face = T::one();
            for j in 0..N {
                if j != i {
                    face = face * d.components[j];
                }
            }
            total = total + face;
        }
        total + total
    }

    pub fn union(&self, other: &Self) -> Self {
        BoundingBox {
            min: self.min.min_components(other.min),
            max: self.max.max_components(other.max),
        }
    }

    pub fn union_point(&self, p: Vector<N, T>) -> Self {
        BoundingBox {
            min: self.min.min_components(p),
            max: self.max.max_components(p),
        }
    }

    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        let mut best = 0;
        for i in 1..N {
            if d.components[i] > d.components[best] {
                best = i;
            }
        }
        best
    }

    /// Slab-method ray/box intersection, returning the entry/exit
    /// distance interval clamped to `[0, ray.max_distance]`, or `None` if
    /// the ray misses.
    pub fn intersect(&self, ray: &Ray<N, T>) -> Option<(T, T)> {
        let mut t_min = T::zero();
        let mut t_max = ray.max_distance;
        for i in 0..N {
            let inv_d = T::one() / ray.direction.components[i];
            let mut t0 = (self.min.components[i] - ray.origin.components[i]) * inv_d;
            let mut t1 = (self.max.components[i] - ray.origin.components[i]) * inv_d;
            if inv_d < T::zero() {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max <= t_min {
                return None;
            }
        }
        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    #[test]
    fn hits_centered_box() {
        let b = BoundingBox::new(v([-1.0, -1.0, -1.0]), v([1.0, 1.0, 1.0]));
        let r = Ray::new(v([-5.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let (t0, t1) = b.intersect(&r).unwrap();
        assert!((t0 - 4.0).abs() < 1e-9);
        assert!((t1 - 6.0).abs() < 1e-9);
    }

    #[test]
    fn misses_box() {
        let b = BoundingBox::new(v([-1.0, -1.0, -1.0]), v([1.0, 1.0, 1.0]));
        let r = Ray::new(v([-5.0, 5.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        assert!(b.intersect(&r).is_none());
    }
}
