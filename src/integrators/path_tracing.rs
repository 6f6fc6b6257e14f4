//! Path Tracing integrator (spec §4.8). Grounded on
//! `original_source/src/painter/integrators/path_tracing.{h,cpp}`: unidirectional
//! path tracing with next-event-estimation direct lighting at every
//! diffuse vertex, emitted radiance counted only where MIS couldn't have
//! sampled it (the camera's first hit, and any vertex reached by a
//! specular/delta scatter), and Russian-roulette termination once the
//! path is long enough to no longer be worth its ray cost.

use crate::config::RenderConfig;
use crate::integrators::direct_lighting::estimate_direct;
use crate::integrators::light_distribution::LightDistribution;
use crate::math::{Ray, Vector, RGB};
use crate::scene::Scene;
use num_traits::Float;
use rand::Rng as _;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Russian roulette never fires before this many bounces (spec §4.8).
const RR_MIN_DEPTH: u32 = 4;
const RR_MIN_SURVIVAL: f64 = 0.05;
const RR_MAX_SURVIVAL: f64 = 0.95;

/// Hard bounce cap beyond which the path is always terminated,
/// independent of Russian roulette. Not named by the spec directly; a
/// defensive bound so a pathological near-white BRDF loop (RR surviving
/// at its 0.95 ceiling indefinitely) cannot hang a worker thread.
const MAX_DEPTH: u32 = 64;

/// Traces one camera ray to termination, returning the radiance seen
/// along it, or `None` when the ray leaves the scene with nothing to
/// show at all — a black background and no infinite-area light visible
/// (spec `SPEC_FULL.md` §B.8: any other miss still yields `Some`, since
/// the background color itself is a sample).
pub fn trace<const N: usize, T, P>(
    scene: &Scene<N, T, P>,
    lights: &LightDistribution<T>,
    config: &RenderConfig,
    rng: &mut Xoshiro256PlusPlus,
    mut ray: Ray<N, T>,
) -> Option<RGB>
where
    T: Float,
{
    let mut radiance = RGB::black();
    let mut beta = RGB::ONE;
    let mut specular_bounce = true;
    let mut last_normal: Option<Vector<N, T>> = None;
    let mut depth = 0u32;
    let mut any_hit = false;

    loop {
        let hit = match scene.intersect(last_normal, &ray) {
            Some(hit) => hit,
            None => {
                if specular_bounce {
                    radiance = radiance.add(beta.mul(miss_radiance(scene, ray.direction)));
                }
                break;
            }
        };
        any_hit = true;
        let normals = hit.normals(config.flat_shading);
        let outgoing = -ray.direction;

        if specular_bounce {
            if let Some(light_index) = hit.surface.light_source(&hit.point) {
                let light = scene.lights[light_index].as_ref();
                let info = light.arrive_info(ray.origin, ray.direction);
                if info.usable() {
                    radiance = radiance.add(beta.mul(info.radiance));
                }
            }
        }

        if depth >= MAX_DEPTH {
            break;
        }

        if !hit.surface.is_specular(&hit.point) {
            let direct = estimate_direct(scene, lights, rng, hit.point, normals, outgoing, hit.surface);
            radiance = radiance.add(beta.mul(direct));
        }

        let sample = hit.surface.sample(rng, &hit.point, &normals.shading, &outgoing);
        if !sample.usable() {
            break;
        }
        let cos = sample.l.dot(normals.shading).abs();
        if cos <= T::zero() {
            break;
        }
        let scale = (cos / sample.pdf).to_f32().unwrap_or(0.0);
        beta = beta.mul(sample.brdf).scale(scale);
        if beta.is_black() {
            break;
        }

        specular_bounce = hit.surface.is_specular(&hit.point);
        last_normal = Some(normals.geometric);
        ray = Ray::new(hit.point, sample.l, T::infinity());
        depth += 1;

        if depth >= RR_MIN_DEPTH {
            let survival = (beta.luminance() as f64).clamp(RR_MIN_SURVIVAL, RR_MAX_SURVIVAL);
            if rng.gen_range(0.0..1.0) > survival {
                break;
            }
            beta = beta.scale((1.0 / survival) as f32);
        }
    }

    if !any_hit && radiance.is_black() {
        None
    } else {
        Some(radiance)
    }
}

/// Background plus any infinite-area lights' emission in `direction`
/// (spec §4.8 "miss case").
fn miss_radiance<const N: usize, T, P>(scene: &Scene<N, T, P>, direction: Vector<N, T>) -> RGB
where
    T: Float,
{
    let mut color = scene.background_color;
    for light in &scene.lights {
        if light.is_infinite_area() {
            if let Some(r) = light.leave_radiance(direction) {
                color = color.add(r);
            }
        }
    }
    color
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

    #[test]
    fn camera_ray_hitting_background_returns_background_color() {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-1.0, -1.0, -1.0]),
            v([1.0, 1.0, 1.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn crate::lights::LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::ONE))];
        let background = RGB::new(0.1, 0.2, 0.3);
        let projector = PerspectiveProjector {
            origin: v([0.0, 0.0, -5.0]),
            distance: 1.0,
            screen_size: [16, 16],
        };
        let scene = Scene::new(background, None, projector, lights, shapes).unwrap();
        let dist = LightDistribution::new(&[scene.lights[0].power()], true);
        let config = RenderConfig::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);

        let ray = Ray::new(v([-5.0, 5.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let result = trace(&scene, &dist, &config, &mut rng, ray);
        assert_eq!(result.unwrap(), background);
    }

    #[test]
    fn black_background_and_no_light_hit_is_none() {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-1.0, -1.0, -1.0]),
            v([1.0, 1.0, 1.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn crate::lights::LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::ONE))];
        let scene = Scene::new(RGB::black(), None, projector_missing_box(), lights, shapes).unwrap();
        let dist = LightDistribution::new(&[scene.lights[0].power()], true);
        let config = RenderConfig::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);

        let ray = Ray::new(v([-5.0, 5.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let result = trace(&scene, &dist, &config, &mut rng, ray);
        assert!(result.is_none());
    }

    fn projector_missing_box() -> PerspectiveProjector<3, 2, f64> {
        PerspectiveProjector {
            origin: v([0.0, 0.0, -5.0]),
            distance: 1.0,
            screen_size: [16, 16],
        }
    }

    #[test]
    fn ray_hitting_diffuse_box_under_light_returns_some_color() {
        let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![Box::new(Parallelotope::new(
            v([-1.0, -1.0, -1.0]),
            v([1.0, 1.0, 1.0]),
            RGB::new(0.8, 0.8, 0.8),
        ))];
        let lights: Vec<Box<dyn crate::lights::LightSource<3, f64>>> =
            vec![Box::new(PointLight::new(v([0.0, 5.0, 0.0]), RGB::new(10.0, 10.0, 10.0)))];
        let scene = Scene::new(RGB::black(), None, projector_missing_box(), lights, shapes).unwrap();
        let dist = LightDistribution::new(&[scene.lights[0].power()], true);
        let config = RenderConfig::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);

        let ray = Ray::new(v([-5.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let result = trace(&scene, &dist, &config, &mut rng, ray);
        assert!(result.is_some());
    }
}
