//! The opaque additive `Color` type used throughout the renderer (spec §3:
//! "Color is an opaque additive module with: black check, luminance,
//! componentwise multiply, multiply-add, scalar divide, RGB32 projection,
//! finiteness check"). Spectral sampling policy is explicitly out of
//! scope (§1), so this stays a fixed 3-channel linear RGB value, backed by
//! the teacher's `cgmath::Vector3<f32>` the way `raytracer.rs`'s
//! `ColorBuf` uses it for its accumulator.

use cgmath::{Vector3, Zero as _};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGB(pub Vector3<f32>);

impl RGB {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        RGB(Vector3::new(r, g, b))
    }

    pub fn black() -> Self {
        RGB(Vector3::zero())
    }

    #[inline]
    pub fn is_black(self) -> bool {
        self.0.x == 0.0 && self.0.y == 0.0 && self.0.z == 0.0
    }

    /// Rec. 709 luma coefficients, used throughout as the "luminance-like
    /// proxy" spec §4.10 requires for filter-weight contribution keys and
    /// as the `luminance(β)` used by Russian roulette (§4.8).
    #[inline]
    pub fn luminance(self) -> f32 {
        0.2126 * self.0.x + 0.7152 * self.0.y + 0.0722 * self.0.z
    }

    #[inline]
    pub fn mul(self, rhs: Self) -> Self {
        RGB(Vector3::new(
            self.0.x * rhs.0.x,
            self.0.y * rhs.0.y,
            self.0.z * rhs.0.z,
        ))
    }

    #[inline]
    pub fn scale(self, s: f32) -> Self {
        RGB(self.0 * s)
    }

    #[inline]
    pub fn div(self, s: f32) -> Self {
        RGB(self.0 / s)
    }

    #[inline]
    pub fn add(self, rhs: Self) -> Self {
        RGB(self.0 + rhs.0)
    }

    /// `self + a * b`, the fused multiply-add spec §3 calls for; avoids
    /// building an intermediate `RGB` in the many `color += β * x` sites.
    #[inline]
    pub fn mul_add(self, a: Self, b: Self) -> Self {
        RGB(self.0 + Vector3::new(a.0.x * b.0.x, a.0.y * b.0.y, a.0.z * b.0.z))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.x.is_finite() && self.0.y.is_finite() && self.0.z.is_finite()
    }

    /// Projection to an interleaved RGB32 triple, the byte layout spec §6
    /// publishes images in.
    #[inline]
    pub fn to_rgb32(self) -> [f32; 3] {
        [self.0.x, self.0.y, self.0.z]
    }

    pub const ONE: RGB = RGB::new(1.0, 1.0, 1.0);
}

impl std::ops::Add for RGB {
    type Output = RGB;
    fn add(self, rhs: RGB) -> RGB {
        RGB::add(self, rhs)
    }
}

impl std::ops::Mul<f32> for RGB {
    type Output = RGB;
    fn mul(self, rhs: f32) -> RGB {
        RGB::scale(self, rhs)
    }
}

impl Default for RGB {
    fn default() -> Self {
        RGB::black()
    }
}
