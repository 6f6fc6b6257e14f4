//! Mesh facets (spec §6 built-in shape list: "mesh (triangles/simplices
//! + per-vertex normals)"; §3 `Surface` "polymorphic over {mesh facet,
//! parallelotope face, hyperplane-parallelotope}"). Mesh *loading* is
//! explicitly out of scope (spec §1 "Mesh loading ... out of scope"),
//! but the in-memory facet shape itself is a named built-in and is the
//! object under test in spec §8's "random spherical meshes" / "spherical
//! triangulated mesh" scenarios, so it is implemented here the same way
//! `parallelotope.rs`/`hyperplane_parallelotope.rs` implement their
//! shapes: as both a `Shape` and its own flat/smooth-shaded `Surface`.
//!
//! Grounded on `original_source/src/painter/shapes/mesh.h`'s facet
//! (there: a 3D triangle with a precomputed plane normal and optional
//! per-vertex normal interpolation for smooth shading). Generalized here
//! to the crate's const-generic `N`: a facet is an `(N-1)`-simplex with
//! `N` vertices embedded in `N`-dimensional space (a triangle when
//! `N = 3`), found by solving the `N x N` linear system relating the
//! ray's origin/direction and the facet's `N-1` edge vectors — the
//! natural N-dimensional generalization of the Möller–Trumbore test the
//! original's 3D-only code performs with a closed-form cross product.

use crate::math::{BoundingBox, Ray, Vector, RGB};
use crate::shapes::{Shape, ShapeIntersection};
use crate::surface::{Surface, SurfaceSample};
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::f64::consts::PI;

/// Distance below which a ray/facet hit is rejected as self-intersection
/// noise, mirroring the small epsilons other shapes compare `t` against.
const T_MIN: f64 = 1e-9;
/// Slack applied to barycentric containment tests so a hit exactly on a
/// facet's shared edge isn't dropped by floating round-off.
const BARY_EPS: f64 = 1e-7;

/// A single mesh facet: `N` vertices spanning an `(N-1)`-simplex (a
/// triangle for `N = 3`). `vertex_normals` enables smooth (Phong-style)
/// shading via barycentric interpolation; `None` means every point on
/// the facet shares the precomputed flat `geometric_normal`.
pub struct Facet<const N: usize, T> {
    pub vertices: [Vector<N, T>; N],
    pub vertex_normals: Option<[Vector<N, T>; N]>,
    geometric_normal: Vector<N, T>,
    pub albedo: RGB,
    pub emission: Option<RGB>,
    pub light_index: Option<usize>,
}

impl<const N: usize, T: num_traits::Float> Facet<N, T> {
    pub fn new(vertices: [Vector<N, T>; N], vertex_normals: Option<[Vector<N, T>; N]>, albedo: RGB) -> Self {
        let edges: Vec<Vector<N, T>> = (1..N).map(|i| vertices[i] - vertices[0]).collect();
        let mut normal = generalized_normal(&edges);
        if let Some(normals) = &vertex_normals {
            let avg = normals
                .iter()
                .fold(Vector::<N, T>::zero(), |acc, n| acc + *n);
            if normal.dot(avg) < T::zero() {
                normal = -normal;
            }
        }
        Facet {
            vertices,
            vertex_normals,
            geometric_normal: normal,
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

    /// Edge vectors `v_i - v_0` for `i in 1..N`, used by both the exact
    /// ray solve and the point-projection barycentric solve.
    fn edges(&self) -> [Vector<N, T>; N] {
        // N entries allocated, only the first N-1 are meaningful; keeps
        // this a plain array (no N-1 const-generic arithmetic needed).
        let mut out = [self.vertices[0]; N];
        for i in 1..N {
            out[i] = self.vertices[i] - self.vertices[0];
        }
        out
    }

    /// Solves `org + t*dir = v0 + sum_{i=1}^{N-1} b_i * e_i` for
    /// `(b_1..b_{N-1}, t)`. Returns `None` if the ray is parallel to the
    /// facet's hyperplane (singular system).
    fn solve_ray(&self, ray: &Ray<N, T>) -> Option<([T; N], T)> {
        let edges = self.edges();
        let mut a = [[T::zero(); N]; N];
        for row in 0..N {
            for col in 0..N - 1 {
                a[row][col] = edges[col + 1].components[row];
            }
            a[row][N - 1] = -ray.direction.components[row];
        }
        let rhs = ray.origin - self.vertices[0];
        let x = solve_square(a, rhs.components)?;
        let mut b = [T::zero(); N];
        let mut sum = T::zero();
        for i in 1..N {
            b[i] = x[i - 1];
            sum = sum + x[i - 1];
        }
        b[0] = T::one() - sum;
        Some((b, x[N - 1]))
    }

    fn barycentric_valid(&self, b: &[T; N]) -> bool {
        let eps = T::from(BARY_EPS).unwrap();
        b.iter().all(|&bi| bi >= -eps)
    }

    /// Projects an arbitrary point (assumed to lie near the facet's
    /// hyperplane) onto barycentric coordinates via least squares:
    /// `min_b || (point - v0) - E b ||`, i.e. solving the normal
    /// equations `E^T E b = E^T (point - v0)`.
    fn barycentric_of_point(&self, point: &Vector<N, T>) -> [T; N] {
        let edges = self.edges();
        let rel = *point - self.vertices[0];
        let cols = N - 1;
        let mut ata = vec![vec![T::zero(); cols]; cols];
        let mut atb = vec![T::zero(); cols];
        for i in 0..cols {
            for j in 0..cols {
                ata[i][j] = edges[i + 1].dot(edges[j + 1]);
            }
            atb[i] = edges[i + 1].dot(rel);
        }
        let x = solve_vec(ata, atb).unwrap_or_else(|| vec![T::zero(); cols]);
        let mut b = [T::zero(); N];
        let mut sum = T::zero();
        for i in 0..cols {
            b[i + 1] = x[i];
            sum = sum + x[i];
        }
        b[0] = T::one() - sum;
        b
    }
}

impl<const N: usize, T: num_traits::Float> Surface<N, T> for Facet<N, T> {
    fn point(&self, ray: &Ray<N, T>, distance: T) -> Vector<N, T> {
        // Snap onto the facet's affine hull from its own barycentric
        // combination rather than the raw ray evaluation, avoiding drift
        // (spec §4.3 "mesh facets ... may re-project").
        match self.solve_ray(ray) {
            Some((b, _)) => {
                let mut p = self.vertices[0];
                for i in 1..N {
                    p = p + (self.vertices[i] - self.vertices[0]) * b[i];
                }
                p
            }
            None => ray.point(distance),
        }
    }

    fn geometric_normal(&self, _point: &Vector<N, T>) -> Vector<N, T> {
        self.geometric_normal
    }

    fn shading_normal(&self, point: &Vector<N, T>) -> Option<Vector<N, T>> {
        let normals = self.vertex_normals?;
        let b = self.barycentric_of_point(point);
        let mut n = Vector::<N, T>::zero();
        for i in 0..N {
            n = n + normals[i] * b[i];
        }
        n.normalized()
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

impl<const N: usize, T: num_traits::Float> Shape<N, T> for Facet<N, T> {
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
        let t_min = T::from(T_MIN).unwrap();
        match self.solve_ray(ray) {
            Some((b, t)) if t > t_min && t < max_distance && self.barycentric_valid(&b) => ShapeIntersection {
                distance: t,
                surface: Some(self),
            },
            _ => ShapeIntersection::none(max_distance),
        }
    }

    fn intersect_any(&self, ray: &Ray<N, T>, max_distance: T, bounding_distance: T) -> bool {
        self.intersect(ray, max_distance, bounding_distance).surface.is_some()
    }

    fn bounding_box(&self) -> BoundingBox<N, T> {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min = min.min_components(*v);
            max = max.max_components(*v);
        }
        BoundingBox::new(min, max)
    }
}

/// Cofactor-expansion generalized cross product: given `N-1` vectors in
/// `R^N` (as a slice, since `N-1` cannot be named as a const generic in
/// stable Rust), returns a unit vector orthogonal to all of them. This is
/// the N-dimensional generalization of the 3D cross product used to find
/// a triangle's plane normal.
fn generalized_normal<const N: usize, T: num_traits::Float>(edges: &[Vector<N, T>]) -> Vector<N, T> {
    let mut components = [T::zero(); N];
    for k in 0..N {
        let mut minor = vec![vec![T::zero(); N - 1]; edges.len()];
        for (row, e) in edges.iter().enumerate() {
            let mut col = 0;
            for j in 0..N {
                if j != k {
                    minor[row][col] = e.components[j];
                    col += 1;
                }
            }
        }
        let sign = if k % 2 == 0 { T::one() } else { -T::one() };
        components[k] = sign * determinant(minor);
    }
    Vector { components }
        .normalized()
        .unwrap_or_else(|| Vector::axis(0))
}

/// Determinant of a square matrix via Gaussian elimination with partial
/// pivoting. `O(n^3)`; only called once per facet at construction time
/// (plane normal) or occasionally for barycentric-of-point projections,
/// never on the hot per-ray-sample path.
fn determinant<T: num_traits::Float>(mut m: Vec<Vec<T>>) -> T {
    let n = m.len();
    if n == 0 {
        return T::one();
    }
    let mut sign = T::one();
    let mut det = T::one();
    for col in 0..n {
        let mut pivot = col;
        let mut best = m[col][col].abs();
        for row in col + 1..n {
            if m[row][col].abs() > best {
                best = m[row][col].abs();
                pivot = row;
            }
        }
        if best <= T::epsilon() {
            return T::zero();
        }
        if pivot != col {
            m.swap(pivot, col);
            sign = -sign;
        }
        det = det * m[col][col];
        for row in col + 1..n {
            let factor = m[row][col] / m[col][col];
            for c in col..n {
                m[row][c] = m[row][c] - factor * m[col][c];
            }
        }
    }
    det * sign
}

/// Solves a fixed-size `N x N` linear system via Gaussian elimination
/// with partial pivoting. Used for the ray/facet intersection solve.
fn solve_square<const N: usize, T: num_traits::Float>(mut a: [[T; N]; N], mut b: [T; N]) -> Option<[T; N]> {
    for col in 0..N {
        let mut pivot = col;
        let mut best = a[col][col].abs();
        for row in col + 1..N {
            if a[row][col].abs() > best {
                best = a[row][col].abs();
                pivot = row;
            }
        }
        if best <= T::epsilon() {
            return None;
        }
        if pivot != col {
            a.swap(pivot, col);
            b.swap(pivot, col);
        }
        for row in col + 1..N {
            let factor = a[row][col] / a[col][col];
            if factor == T::zero() {
                continue;
            }
            for c in col..N {
                a[row][c] = a[row][c] - factor * a[col][c];
            }
            b[row] = b[row] - factor * b[col];
        }
    }
    let mut x = [T::zero(); N];
    for row in (0..N).rev() {
        let mut sum = b[row];
        for c in row + 1..N {
            sum = sum - a[row][c] * x[c];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

/// Variable-size analog of `solve_square`, used for the `(N-1) x (N-1)`
/// least-squares normal-equation solve in `barycentric_of_point`.
fn solve_vec<T: num_traits::Float>(mut a: Vec<Vec<T>>, mut b: Vec<T>) -> Option<Vec<T>> {
    let n = a.len();
    if n == 0 {
        return Some(vec![]);
    }
    for col in 0..n {
        let mut pivot = col;
        let mut best = a[col][col].abs();
        for row in col + 1..n {
            if a[row][col].abs() > best {
                best = a[row][col].abs();
                pivot = row;
            }
        }
        if best <= T::epsilon() {
            return None;
        }
        if pivot != col {
            a.swap(pivot, col);
            b.swap(pivot, col);
        }
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == T::zero() {
                continue;
            }
            for c in col..n {
                a[row][c] = a[row][c] - factor * a[col][c];
            }
            b[row] = b[row] - factor * b[col];
        }
    }
    let mut x = vec![T::zero(); n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for c in row + 1..n {
            sum = sum - a[row][c] * x[c];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

/// Builds the facets of a triangulated icosphere approximation, used by
/// the test suite's "spherical triangulated mesh" scenarios (spec §8
/// invariants 1/3, "Visibility consistency"). Not a scene-file loader
/// (out of scope, spec §1) — just an in-memory generator so tests can
/// exercise the mesh `Shape`/`Surface` contract without one.
pub fn icosphere_facets<T: num_traits::Float>(radius: T, albedo: RGB) -> Vec<Facet<3, T>> {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    // 12 icosahedron vertices, golden-ratio construction.
    let p = phi;
    let verts_raw: [[f64; 3]; 12] = [
        [-1.0, p, 0.0],
        [1.0, p, 0.0],
        [-1.0, -p, 0.0],
        [1.0, -p, 0.0],
        [0.0, -1.0, p],
        [0.0, 1.0, p],
        [0.0, -1.0, -p],
        [0.0, 1.0, -p],
        [p, 0.0, -1.0],
        [p, 0.0, 1.0],
        [-p, 0.0, -1.0],
        [-p, 0.0, 1.0],
    ];
    let verts: Vec<Vector<3, T>> = verts_raw
        .iter()
        .map(|c| {
            let v = Vector {
                components: [T::from(c[0]).unwrap(), T::from(c[1]).unwrap(), T::from(c[2]).unwrap()],
            };
            v.normalized().unwrap() * radius
        })
        .collect();
    const FACE_INDICES: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    FACE_INDICES
        .iter()
        .map(|&[a, b, c]| {
            let tri = [verts[a], verts[b], verts[c]];
            let normals = [
                (verts[a] / radius),
                (verts[b] / radius),
                (verts[c] / radius),
            ];
            Facet::new(tri, Some(normals), albedo)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    #[test]
    fn ray_through_triangle_center_hits() {
        let facet: Facet<3, f64> = Facet::new(
            [v([-1.0, -1.0, 0.0]), v([1.0, -1.0, 0.0]), v([0.0, 1.0, 0.0])],
            None,
            RGB::new(0.8, 0.8, 0.8),
        );
        let ray = Ray::new(v([0.0, -0.3, -5.0]), v([0.0, 0.0, 1.0]), f64::INFINITY);
        let hit = facet.intersect(&ray, f64::INFINITY, 0.0);
        assert!(hit.surface.is_some());
        assert!((hit.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let facet: Facet<3, f64> = Facet::new(
            [v([-1.0, -1.0, 0.0]), v([1.0, -1.0, 0.0]), v([0.0, 1.0, 0.0])],
            None,
            RGB::new(0.8, 0.8, 0.8),
        );
        let ray = Ray::new(v([5.0, 5.0, -5.0]), v([0.0, 0.0, 1.0]), f64::INFINITY);
        let hit = facet.intersect(&ray, f64::INFINITY, 0.0);
        assert!(hit.surface.is_none());
    }

    #[test]
    fn smooth_normal_interpolates_between_vertex_normals() {
        let n_left = v([-1.0, 0.0, 0.0]);
        let n_right = v([1.0, 0.0, 0.0]);
        let n_top = v([0.0, 1.0, 0.0]);
        let facet: Facet<3, f64> = Facet::new(
            [v([-1.0, -1.0, 0.0]), v([1.0, -1.0, 0.0]), v([0.0, 1.0, 0.0])],
            Some([n_left, n_right, n_top]),
            RGB::new(0.8, 0.8, 0.8),
        );
        // Midpoint of the base edge should average the two base normals.
        let mid = v([0.0, -1.0, 0.0]);
        let n = facet.shading_normal(&mid).unwrap();
        assert!((n.components[0]).abs() < 1e-6);
    }

    #[test]
    fn icosphere_facets_cover_a_closed_surface() {
        let facets = icosphere_facets(2.0_f64, RGB::new(0.5, 0.5, 0.5));
        assert_eq!(facets.len(), 20);
        // A ray through the center should hit two facets (entry/exit)
        // when tested against the whole set via linear scan.
        let ray = Ray::new(v([-10.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let hits: usize = facets
            .iter()
            .filter(|f| f.intersect(&ray, f64::INFINITY, 0.0).surface.is_some())
            .count();
        assert_eq!(hits, 2);
    }
}
