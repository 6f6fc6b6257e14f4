//! Bidirectional Path Tracing integrator with MIS (spec §4.9). Grounded
//! on `original_source/src/painter/integrators/bpt/`'s subpath-then-connect
//! structure: an eye subpath and a light subpath are each built
//! independently, then every valid `(s, t)` split of a fixed total path
//! length is connected and combined.
//!
//! `SPEC_FULL.md` §B.2 calls for one struct per vertex kind rather than a
//! single generic vertex; [`Vertex`] keeps that as a tagged enum
//! (`Camera`/`Light`/`Surface`) but — a documented simplification, see
//! `DESIGN.md` — folds the distinct "infinite light" kind into `Light`:
//! [`crate::lights::InfiniteAreaLight::leave_sample`] already projects
//! the light onto a finite sampling disk (spec §4.4), so its subpath
//! vertex needs no special-cased PDF conversion to participate in a
//! connection.
//!
//! The MIS weight (spec §4.9.2) is the exact Veach-style per-vertex
//! reversed-PDF reweighting, grounded on
//! `original_source/src/painter/integrators/bpt/mis.cpp::mis_weight` and
//! `vertex_pdf.h`'s `compute_pdf`/`compute_light_pdf`/`compute_light_origin_pdf`:
//! each vertex carries both the forward area-PDF it was actually sampled
//! with and a reversed area-PDF, a handful of which are overwritten per
//! connection to reflect "what if this edge had been sampled instead",
//! before the balance heuristic (β=1, [`crate::integrators::mis::balance_heuristic`])
//! combines them into one weight.

use crate::config::RenderConfig;
use crate::integrators::light_distribution::LightDistribution;
use crate::integrators::mis::balance_heuristic;
use crate::lights::LightSource;
use crate::math::{Ray, Vector, RGB};
use crate::scene::Scene;
use crate::surface::{Normals, Surface};
use crate::visibility::{occluded_between, occluded_towards};
use num_traits::Float;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Spec §4.9's path-length cap, shared by both subpath walks and the
/// connection loop's `t + s - 2 <= MAX_DEPTH` filter.
const MAX_DEPTH: usize = 5;

#[derive(Clone, Copy)]
enum VertexKind<'s, const N: usize, T> {
    Camera,
    Light(&'s dyn LightSource<N, T>),
    Surface(&'s dyn Surface<N, T>),
}

/// One subpath vertex (spec §4.9.1's "vertex list"). `incoming` is the
/// direction the subpath arrived from (`None` at the subpath's own
/// start); `beta` is the path throughput/importance carried up to and
/// including this vertex. `pdf_forward`/`pdf_reversed` are area-measure
/// PDFs (spec §4.9.2) — `pdf_reversed` is filled in as the walk builds
/// the *next* vertex, then further overwritten per-connection by
/// [`mis_weight`]; both are meaningless (and unused) on the `Camera`
/// vertex.
struct Vertex<'s, const N: usize, T> {
    point: Vector<N, T>,
    normals: Normals<N, T>,
    incoming: Option<Vector<N, T>>,
    beta: RGB,
    pdf_forward: T,
    pdf_reversed: T,
    connectible: bool,
    kind: VertexKind<'s, N, T>,
}

impl<'s, const N: usize, T: Float> Vertex<'s, N, T> {
    fn light_index(&self) -> Option<usize> {
        match self.kind {
            VertexKind::Surface(s) => s.light_source(&self.point),
            _ => None,
        }
    }
}

/// The `LightSource` a vertex came from, if any: either the vertex
/// itself sits on the sampled light's disk (`VertexKind::Light`), or it's
/// an eye-path surface that happens to be emissive (`light_index`).
/// Grounded on `mis.cpp`'s `make_nodes` visiting `vertex::Light` and
/// `vertex::Surface::is_light()` the same way.
fn vertex_light<'a, const N: usize, T, P>(
    v: &Vertex<'a, N, T>,
    scene: &'a Scene<N, T, P>,
) -> Option<&'a dyn LightSource<N, T>>
where
    T: Float,
{
    match v.kind {
        VertexKind::Light(light) => Some(light),
        VertexKind::Surface(_) => v.light_index().map(|i| scene.lights[i].as_ref()),
        VertexKind::Camera => None,
    }
}

/// Converts a solid-angle PDF sampled at `vertex` into an area-measure
/// PDF at `next`, the standard BPT vertex conversion (`N-1` falls out of
/// how a solid angle subtends an area element at distance `r` in `N`
/// dimensions — spec's dimension-general geometry term, matching
/// `shapes::lights::ball.rs`'s `powi(N as i32 - 1)` convention).
fn solid_angle_to_area_pdf<const N: usize, T: Float>(pdf: T, direction: Vector<N, T>, distance: T, next_normal: Vector<N, T>) -> T {
    if distance <= T::zero() {
        return T::zero();
    }
    let cosine = direction.dot(next_normal).abs();
    pdf * cosine / distance.powi(N as i32 - 1)
}

/// `compute_pdf(prev, vertex, next)` (`vertex_pdf.h`): the area-PDF at
/// `next` as if `vertex` (always a `Surface`) had sampled toward `next`
/// given it arrived from `prev`. `prev`'s direction is always just the
/// point-difference toward it — true for `Surface` and `Light` vertices,
/// and for `Camera` too since its stored point is the ray origin the
/// vertex actually lies along.
fn transport_pdf<const N: usize, T>(prev: &Vertex<'_, N, T>, vertex: &Vertex<'_, N, T>, next: &Vertex<'_, N, T>) -> T
where
    T: Float,
{
    let VertexKind::Surface(surface) = vertex.kind else {
        return T::zero();
    };
    let Some(to_prev) = (prev.point - vertex.point).normalized() else {
        return T::zero();
    };
    let delta_next = next.point - vertex.point;
    let distance = delta_next.length();
    if distance <= T::zero() {
        return T::zero();
    }
    let to_next = delta_next / distance;
    let pdf = surface.pdf(&vertex.point, &vertex.normals.shading, &to_prev, &to_next);
    solid_angle_to_area_pdf(pdf, to_next, distance, next.normals.shading)
}

/// `compute_light_pdf(light_vertex, next)`: the area-PDF of `light_vertex`'s
/// light emitting directly toward `next`, whether `light_vertex` is the
/// light-path's own sampled vertex or an eye-path vertex that happens to
/// sit on an emissive surface.
fn compute_light_pdf<const N: usize, T, P>(scene: &Scene<N, T, P>, light_vertex: &Vertex<'_, N, T>, next: &Vertex<'_, N, T>) -> T
where
    T: Float,
{
    let Some(light) = vertex_light(light_vertex, scene) else {
        return T::zero();
    };
    let delta = next.point - light_vertex.point;
    let distance = delta.length();
    if distance <= T::zero() {
        return T::zero();
    }
    let direction = delta / distance;
    let pdf = light.leave_pdf_dir(direction);
    solid_angle_to_area_pdf(pdf, direction, distance, next.normals.shading)
}

/// `compute_light_origin_pdf(light_vertex)`: always called on an
/// emissive eye-path surface vertex (spec §4.9.2's `s=0` case), never on
/// the light-path's own vertex.
fn compute_light_origin_pdf<const N: usize, T, P>(scene: &Scene<N, T, P>, v: &Vertex<'_, N, T>) -> T
where
    T: Float,
{
    let (Some(light), Some(incoming)) = (vertex_light(v, scene), v.incoming) else {
        return T::zero();
    };
    light.leave_pdf_pos(-incoming)
}

/// Builds either subpath up to `MAX_DEPTH` surface bounces beyond the
/// given starting vertex (spec §4.9.1's "walk"), tracking forward/reversed
/// area-PDFs as it goes. `pdf_forward_solid_angle` is the directional PDF
/// of the ray that produced `path`'s current last vertex (1 for the
/// camera's pinhole ray, `pdf_dir` for a light's emission direction).
fn walk<const N: usize, T, P>(
    scene: &Scene<N, T, P>,
    config: &RenderConfig,
    rng: &mut Xoshiro256PlusPlus,
    mut beta: RGB,
    mut pdf_forward_solid_angle: T,
    mut cur_ray: Ray<N, T>,
    mut last_normal: Option<Vector<N, T>>,
    camera_path: bool,
    path: &mut Vec<Vertex<'_, N, T>>,
) where
    T: Float,
{
    for _ in 0..MAX_DEPTH {
        let Some(hit) = scene.intersect(last_normal, &cur_ray) else {
            break;
        };
        let normals = hit.normals(config.flat_shading);

        let prev_point = path.last().unwrap().point;
        let delta = hit.point - prev_point;
        let distance = delta.length();
        if distance <= T::zero() {
            break;
        }
        let arrival = delta / distance;
        let pdf_forward = solid_angle_to_area_pdf(pdf_forward_solid_angle, arrival, distance, normals.shading);

        path.push(Vertex {
            point: hit.point,
            normals,
            incoming: Some(cur_ray.direction),
            beta,
            pdf_forward,
            pdf_reversed: T::zero(),
            connectible: !hit.surface.is_specular(&hit.point),
            kind: VertexKind::Surface(hit.surface),
        });

        let outgoing = -cur_ray.direction;
        let sample = hit.surface.sample(rng, &hit.point, &normals.shading, &outgoing);
        if !sample.usable() {
            break;
        }

        let reversed_solid_angle = hit.surface.pdf(&hit.point, &normals.shading, &sample.l, &outgoing);
        let prev_idx = path.len() - 2;
        if !matches!(path[prev_idx].kind, VertexKind::Camera) {
            let to_prev = -arrival;
            path[prev_idx].pdf_reversed = solid_angle_to_area_pdf(reversed_solid_angle, to_prev, distance, path[prev_idx].normals.shading);
        }

        let cos = sample.l.dot(normals.shading).abs();
        if cos <= T::zero() {
            break;
        }
        beta = beta.mul(sample.brdf).scale((cos / sample.pdf).to_f32().unwrap_or(0.0));
        if !camera_path {
            beta = beta.scale(normal_correction(normals, sample.l, outgoing).to_f32().unwrap_or(0.0));
        }
        if beta.is_black() {
            break;
        }

        pdf_forward_solid_angle = sample.pdf;
        last_normal = Some(normals.geometric);
        cur_ray = Ray::new(hit.point, sample.l, T::infinity());
    }
}

/// `correct_normals` (`bpt.cpp`): the adjoint-BSDF normal correction for
/// light subpaths (spec §4.9 step on "normal correction"), `0` when the
/// denominator vanishes.
fn normal_correction<const N: usize, T: Float>(normals: Normals<N, T>, l: Vector<N, T>, v: Vector<N, T>) -> T {
    let denominator = v.dot(normals.geometric) * l.dot(normals.shading);
    if denominator == T::zero() {
        return T::zero();
    }
    let numerator = v.dot(normals.shading) * l.dot(normals.geometric);
    (numerator / denominator).abs()
}

/// Builds the eye (camera) subpath: vertex 0 is the camera itself;
/// subsequent vertices are BRDF-sampled bounces (spec §4.9.1).
fn build_eye_path<'s, const N: usize, T, P>(
    scene: &'s Scene<N, T, P>,
    config: &RenderConfig,
    rng: &mut Xoshiro256PlusPlus,
    ray: Ray<N, T>,
) -> Vec<Vertex<'s, N, T>>
where
    T: Float,
{
    let mut path = vec![Vertex {
        point: ray.origin,
        normals: Normals {
            geometric: ray.direction,
            shading: ray.direction,
        },
        incoming: None,
        beta: RGB::ONE,
        pdf_forward: T::zero(),
        pdf_reversed: T::zero(),
        connectible: true,
        kind: VertexKind::Camera,
    }];
    walk(scene, config, rng, RGB::ONE, T::one(), ray, None, true, &mut path);
    path
}

/// Builds the light subpath from a single chosen light's `leave_sample`
/// (spec §4.9.1). Vertex 0 sits on (or at the sampling disk of) the
/// light itself; it is never connected to directly (see module docs —
/// the `s=1` strategy uses `arrive_sample` from the receiver instead) but
/// anchors the walk that produces `s>=2` connection vertices.
fn build_light_path<'s, const N: usize, T, P>(
    scene: &'s Scene<N, T, P>,
    config: &RenderConfig,
    rng: &mut Xoshiro256PlusPlus,
    light: &'s dyn LightSource<N, T>,
    light_pmf: T,
) -> Vec<Vertex<'s, N, T>>
where
    T: Float,
{
    let leave = light.leave_sample(rng);
    let normal0 = leave.normal.unwrap_or(leave.ray.direction);
    let denom = (leave.pdf_pos * light_pmf).max(T::epsilon());
    let vertex0_beta = leave.radiance.scale((T::one() / denom).to_f32().unwrap_or(0.0));
    let mut path = vec![Vertex {
        point: leave.ray.origin,
        normals: Normals {
            geometric: normal0,
            shading: normal0,
        },
        incoming: None,
        beta: vertex0_beta,
        pdf_forward: light_pmf * leave.pdf_pos,
        pdf_reversed: T::zero(),
        connectible: !light.is_delta(),
        kind: VertexKind::Light(light),
    }];

    let cos0 = leave.ray.direction.dot(normal0).abs();
    let beta = vertex0_beta.scale((cos0 / leave.pdf_dir).to_f32().unwrap_or(0.0));
    if beta.is_black() {
        return path;
    }
    walk(scene, config, rng, beta, leave.pdf_dir, leave.ray, leave.normal, false, &mut path);
    path
}

/// `s=0`: the eye subpath's own endpoint happens to sit on an emissive
/// surface (spec §4.9.2). Requires `t>=2` since `eye_path[0]` is the
/// camera itself, not a surface.
fn connect_s0<const N: usize, T, P>(scene: &Scene<N, T, P>, eye_path: &[Vertex<'_, N, T>], t: usize) -> Option<RGB>
where
    T: Float,
{
    if t < 2 {
        return None;
    }
    let v = &eye_path[t - 1];
    let light_index = v.light_index()?;
    let incoming = v.incoming?;
    let light = scene.lights[light_index].as_ref();
    let prev_point = eye_path[t - 2].point;
    let info = light.arrive_info(prev_point, incoming);
    if !info.usable() {
        return None;
    }
    Some(v.beta.mul(info.radiance))
}

/// `s=1`: connects the eye subpath's vertex `t-1` directly to a fresh
/// light sample via `arrive_sample` (spec §4.9.2) — the same
/// receiver-driven importance sampling the direct-lighting estimator
/// uses (§4.7), substituted here for the naive area-sampled
/// `light_path[0]` connection because it has much lower variance for the
/// same light (see module docs).
fn connect_s1<const N: usize, T, P>(
    scene: &Scene<N, T, P>,
    eye_path: &[Vertex<'_, N, T>],
    t: usize,
    light: &dyn LightSource<N, T>,
    light_pmf: T,
    rng: &mut Xoshiro256PlusPlus,
) -> Option<RGB>
where
    T: Float,
{
    if t < 2 {
        return None;
    }
    let v = &eye_path[t - 1];
    let VertexKind::Surface(surface) = v.kind else {
        return None;
    };
    if !v.connectible {
        return None;
    }
    let incoming = v.incoming?;
    let n = v.normals.shading;
    let outgoing = -incoming;

    let arrive = light.arrive_sample(rng, v.point, n);
    if !arrive.usable() {
        return None;
    }
    let cos = arrive.l.dot(n);
    if cos <= T::zero() {
        return None;
    }
    let brdf = surface.brdf(&v.point, &n, &outgoing, &arrive.l);
    if brdf.is_black() {
        return None;
    }
    if occluded_towards(scene, v.point, v.normals, arrive.l, arrive.distance) {
        return None;
    }
    let pdf = arrive.pdf * light_pmf;
    let factor = (cos / pdf).to_f32().unwrap_or(0.0);
    Some(v.beta.mul(brdf).mul(arrive.radiance).scale(factor))
}

/// `s>=2`: connects two fully-built subpath surface vertices (spec
/// §4.9.2's general case), with a BRDF evaluated at each end and a
/// `1/distance^(N-1)` geometry term, gated by [`occluded_between`].
fn connect_general<const N: usize, T, P>(
    scene: &Scene<N, T, P>,
    eye_path: &[Vertex<'_, N, T>],
    light_path: &[Vertex<'_, N, T>],
    s: usize,
    t: usize,
) -> Option<RGB>
where
    T: Float,
{
    if t < 2 || s < 2 {
        return None;
    }
    let e = &eye_path[t - 1];
    let l = &light_path[s - 1];
    if !e.connectible || !l.connectible {
        return None;
    }
    let VertexKind::Surface(e_surface) = e.kind else {
        return None;
    };
    let VertexKind::Surface(l_surface) = l.kind else {
        return None;
    };
    let e_incoming = e.incoming?;
    let l_incoming = l.incoming?;

    let delta = l.point - e.point;
    let distance = delta.length();
    if distance <= T::zero() {
        return None;
    }
    let dir_e_to_l = delta / distance;

    let e_cos = dir_e_to_l.dot(e.normals.shading);
    let l_cos = (-dir_e_to_l).dot(l.normals.shading);
    if e_cos <= T::zero() || l_cos <= T::zero() {
        return None;
    }

    let e_brdf = e_surface.brdf(&e.point, &e.normals.shading, &(-e_incoming), &dir_e_to_l);
    if e_brdf.is_black() {
        return None;
    }
    let l_brdf = l_surface.brdf(&l.point, &l.normals.shading, &(-l_incoming), &(-dir_e_to_l));
    if l_brdf.is_black() {
        return None;
    }

    if occluded_between(scene, e.point, e.normals, l.point, l.normals) {
        return None;
    }

    let geometry = (e_cos * l_cos / distance.powi(N as i32 - 1)).to_f32().unwrap_or(0.0);
    Some(e.beta.mul(e_brdf).mul(l.beta).mul(l_brdf).scale(geometry))
}

#[derive(Clone, Copy)]
struct Node<T> {
    forward: T,
    reversed: T,
    connectible: bool,
}

fn make_nodes<const N: usize, T: Float>(path: &[Vertex<'_, N, T>], count: usize) -> Vec<Node<T>> {
    path[..count]
        .iter()
        .map(|v| Node {
            forward: v.pdf_forward,
            reversed: v.pdf_reversed,
            connectible: v.connectible,
        })
        .collect()
}

fn set_connectible<T>(nodes: &mut [Node<T>]) {
    if let Some(last) = nodes.last_mut() {
        last.connectible = true;
    }
}

/// `map(v)` (`mis.cpp`): avoids a division by zero on a delta edge, where
/// the true PDF is a Dirac spike represented here as `0`.
fn mis_map<T: Float>(v: T) -> T {
    if v == T::zero() {
        T::one()
    } else {
        v
    }
}

fn light_sum<T: Float>(light: &[Node<T>]) -> T {
    if light.is_empty() {
        return T::zero();
    }
    let mut sum = T::zero();
    let mut ri = T::one();
    for i in (1..light.len()).rev() {
        ri = ri * mis_map(light[i].reversed) / mis_map(light[i].forward);
        if light[i].connectible && light[i - 1].connectible {
            sum = sum + ri;
        }
    }
    if light[0].connectible {
        ri = ri * mis_map(light[0].reversed) / mis_map(light[0].forward);
        sum = sum + ri;
    }
    sum
}

fn camera_sum<T: Float>(camera: &[Node<T>]) -> T {
    if camera.len() <= 1 {
        return T::zero();
    }
    let mut sum = T::zero();
    let mut ri = T::one();
    for i in (2..camera.len()).rev() {
        ri = ri * mis_map(camera[i].reversed) / mis_map(camera[i].forward);
        if camera[i].connectible && camera[i - 1].connectible {
            sum = sum + ri;
        }
    }
    if camera[1].connectible && camera[0].connectible {
        ri = ri * mis_map(camera[1].reversed) / mis_map(camera[1].forward);
        sum = sum + ri;
    }
    sum
}

/// Spec §4.9.2's BPT connection weight, matching `mis.cpp::mis_weight`
/// exactly: builds the `(pdf_forward, pdf_reversed, connectible)` node
/// arrays for the prefixes actually used by this `(s, t)` connection,
/// overwrites the reversed PDFs that depend on the connection itself
/// (rather than on how each subpath happened to be built), then combines
/// with the balance heuristic.
fn mis_weight<const N: usize, T, P>(
    scene: &Scene<N, T, P>,
    light_path: &[Vertex<'_, N, T>],
    eye_path: &[Vertex<'_, N, T>],
    s: usize,
    t: usize,
) -> T
where
    T: Float,
{
    if s + t == 2 {
        return T::one();
    }

    let mut light_nodes = make_nodes(light_path, s);
    let mut camera_nodes = make_nodes(eye_path, t);

    if s == 0 {
        camera_nodes[t - 1].reversed = compute_light_origin_pdf(scene, &eye_path[t - 1]);
        camera_nodes[t - 2].reversed = compute_light_pdf(scene, &eye_path[t - 1], &eye_path[t - 2]);
    } else {
        light_nodes[s - 1].reversed = transport_pdf(&eye_path[t - 2], &eye_path[t - 1], &light_path[s - 1]);
        if t > 2 {
            camera_nodes[t - 2].reversed = transport_pdf(&light_path[s - 1], &eye_path[t - 1], &eye_path[t - 2]);
        }
        if s == 1 {
            camera_nodes[t - 1].reversed = compute_light_pdf(scene, &light_path[s - 1], &eye_path[t - 1]);
        } else {
            light_nodes[s - 2].reversed = transport_pdf(&eye_path[t - 1], &light_path[s - 1], &light_path[s - 2]);
            camera_nodes[t - 1].reversed = transport_pdf(&light_path[s - 2], &light_path[s - 1], &eye_path[t - 1]);
        }
    }

    set_connectible(&mut light_nodes);
    set_connectible(&mut camera_nodes);

    let ls = light_sum(&light_nodes);
    let cs = camera_sum(&camera_nodes);
    balance_heuristic(T::one(), [ls, cs].into_iter())
}

/// Traces one camera ray with bidirectional path tracing, returning the
/// radiance estimate (spec §4.9). Mirrors [`crate::integrators::path_tracing::trace`]'s
/// miss/None convention: `None` only when the ray leaves the scene with
/// nothing (background and infinite lights both black).
pub fn trace<const N: usize, T, P>(
    scene: &Scene<N, T, P>,
    lights: &LightDistribution<T>,
    config: &RenderConfig,
    rng: &mut Xoshiro256PlusPlus,
    ray: Ray<N, T>,
) -> Option<RGB>
where
    T: Float,
{
    if lights.is_empty() {
        return None;
    }
    let (light_index, light_pmf) = lights.sample(rng);
    let light = scene.lights[light_index].as_ref();

    let eye_path = build_eye_path(scene, config, rng, ray);
    let light_path = build_light_path(scene, config, rng, light, light_pmf);

    let max_t = eye_path.len();
    let max_s = light_path.len();
    let mut radiance = RGB::black();

    if max_t < 2 {
        let mut miss = scene.background_color;
        for l in &scene.lights {
            if l.is_infinite_area() {
                if let Some(r) = l.leave_radiance(ray.direction) {
                    miss = miss.add(r);
                }
            }
        }
        return if miss.is_black() { None } else { Some(miss) };
    }

    for t in 2..=max_t {
        for s in 0..=max_s {
            if t + s < 2 || t + s - 2 > MAX_DEPTH {
                continue;
            }
            let contribution = match s {
                0 => connect_s0(scene, &eye_path, t),
                1 => connect_s1(scene, &eye_path, t, light, light_pmf, rng),
                _ => connect_general(scene, &eye_path, &light_path, s, t),
            };
            let Some(c) = contribution else { continue };
            if c.is_black() {
                continue;
            }
            let weight = mis_weight(scene, &light_path, &eye_path, s, t);
            radiance = radiance.add(c.scale(weight.to_f32().unwrap_or(0.0)));
        }
    }

    Some(radiance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::PointLight;
    use crate::projector::PerspectiveProjector;
    use crate::shapes::{Parallelotope, Shape};
    use rand::SeedableRng as _;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    fn test_scene() -> Scene<3, f64, PerspectiveProjector<3, 2, f64>> {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-10.0, -1.0, -10.0]),
            v([10.0, 0.0, 10.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn crate::lights::LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::new(20.0, 20.0, 20.0)))];
        let projector = PerspectiveProjector {
            origin: v([0.0, 5.0, -5.0]),
            distance: 1.0,
            screen_size: [16, 16],
        };
        Scene::new(RGB::black(), None, projector, lights, shapes).unwrap()
    }

    #[test]
    fn ray_hitting_lit_floor_returns_nonzero_radiance() {
        let scene = test_scene();
        let dist = LightDistribution::new(&[scene.lights[0].power()], true);
        let config = RenderConfig {
            integrator: crate::config::IntegratorKind::Bpt,
            ..RenderConfig::default()
        };
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let ray = Ray::new(v([0.0, 5.0, -5.0]), v([0.0, -0.3, 1.0]).normalized().unwrap(), f64::INFINITY);
        let result = trace(&scene, &dist, &config, &mut rng, ray);
        assert!(result.is_some());
    }

    #[test]
    fn ray_missing_everything_returns_background() {
        let scene = test_scene();
        let dist = LightDistribution::new(&[scene.lights[0].power()], true);
        let config = RenderConfig::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
        let ray = Ray::new(v([0.0, 50.0, -5.0]), v([0.0, 1.0, 0.0]), f64::INFINITY);
        let result = trace(&scene, &dist, &config, &mut rng, ray);
        assert!(result.is_none());
    }

    #[test]
    fn mis_weight_for_the_shortest_path_is_one() {
        let scene = test_scene();
        let eye: Vec<Vertex<'_, 3, f64>> = vec![
            Vertex {
                point: v([0.0, 5.0, -5.0]),
                normals: Normals {
                    geometric: v([0.0, 0.0, 1.0]),
                    shading: v([0.0, 0.0, 1.0]),
                },
                incoming: None,
                beta: RGB::ONE,
                pdf_forward: 0.0,
                pdf_reversed: 0.0,
                connectible: true,
                kind: VertexKind::Camera,
            },
            Vertex {
                point: v([0.0, 0.0, 0.0]),
                normals: Normals {
                    geometric: v([0.0, 1.0, 0.0]),
                    shading: v([0.0, 1.0, 0.0]),
                },
                incoming: Some(v([0.0, -1.0, 1.0]).normalized().unwrap()),
                beta: RGB::ONE,
                pdf_forward: 1.0,
                pdf_reversed: 0.0,
                connectible: true,
                kind: VertexKind::Camera,
            },
        ];
        let light: Vec<Vertex<'_, 3, f64>> = Vec::new();
        let w = mis_weight(&scene, &light, &eye, 0, 2);
        assert!((w - 1.0).abs() < 1e-12);
    }
}
