//! The `Projector` contract (spec §6): given a sub-pixel point on the
//! screen, returns a primary ray into the `N`-dimensional scene. Concrete
//! projector math (perspective/parallel/spherical) is explicitly out of
//! scope (spec §1) — only the interface, plus a minimal perspective
//! implementation so the integrators and scheduler have something real to
//! drive in tests (the same "just enough of the excluded math to exercise
//! the contract" policy `shapes::Parallelotope` follows for BRDFs).
//! Grounded on `original_source/src/painter/objects.h`'s `Projector`.
//!
//! The screen is `D`-dimensional; callers are expected to use `D = N - 1`
//! (stable Rust's const generics cannot express that arithmetic relation
//! in a trait bound, so it is an invariant enforced by construction — see
//! `Scene::new`'s dimension check — rather than by the type system).

use crate::math::{Ray, Vector};

pub trait Projector<const N: usize, const D: usize, T>: Send + Sync {
    fn screen_size(&self) -> [usize; D];

    /// `point`'s components are fractional pixel coordinates in
    /// `[0, screen_size[i])` per axis, as produced by the stratified
    /// jittered sampler (spec §4.11).
    fn ray(&self, point: Vector<D, T>) -> Ray<N, T>;
}

/// Perspective projector looking down the last scene axis, with the image
/// plane centered at `distance` in front of `origin`.
pub struct PerspectiveProjector<const N: usize, const D: usize, T> {
    pub origin: Vector<N, T>,
    pub distance: T,
    pub screen_size: [usize; D],
}

impl<const N: usize, const D: usize, T: num_traits::Float> Projector<N, D, T>
    for PerspectiveProjector<N, D, T>
{
    fn screen_size(&self) -> [usize; D] {
        self.screen_size
    }

    fn ray(&self, point: Vector<D, T>) -> Ray<N, T> {
        debug_assert_eq!(D, N - 1, "screen dimension must be scene dimension - 1");
        let two = T::one() + T::one();
        let mut dir = Vector::<N, T>::zero();
        for i in 0..D {
            let size = T::from(self.screen_size[i]).unwrap();
            let ndc = (point.components[i] / size) * two - T::one();
            dir.components[i] = ndc;
        }
        dir.components[N - 1] = self.distance;
        let dir = dir.normalized().unwrap_or(Vector::axis(N - 1));
        Ray::new(self.origin, dir, T::infinity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_screen_points_straight_ahead() {
        let p: PerspectiveProjector<3, 2, f64> = PerspectiveProjector {
            origin: Vector::zero(),
            distance: 1.3,
            screen_size: [256, 256],
        };
        let ray = p.ray(Vector {
            components: [128.0, 128.0],
        });
        assert!(ray.direction.components[0].abs() < 1e-9);
        assert!(ray.direction.components[1].abs() < 1e-9);
        assert!(ray.direction.components[2] > 0.0);
    }
}
