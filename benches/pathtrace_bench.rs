//! Benchmarks the two integrators (spec §4.8/§4.9) end to end through
//! [`painter_core::painting::Painting`], one Criterion group per
//! integrator, mirroring the teacher's `raytrace_bench.rs` (non-mutated
//! scene setup, `group.bench_function` per configuration).

use criterion::{criterion_group, criterion_main, Criterion};
use painter_core::config::{IntegratorKind, RenderConfig};
use painter_core::lights::{LightSource, PointLight};
use painter_core::math::{Vector, RGB};
use painter_core::notifier::NullNotifier;
use painter_core::painting::Painting;
use painter_core::projector::PerspectiveProjector;
use painter_core::scene::Scene;
use painter_core::shapes::{Parallelotope, Shape};
use std::num::NonZeroUsize;

fn v(c: [f64; 3]) -> Vector<3, f64> {
    Vector { components: c }
}

fn cornell_ish_scene() -> Scene<3, f64, PerspectiveProjector<3, 2, f64>> {
    let shapes: Vec<Box<dyn Shape<3, f64>>> = vec![
        Box::new(Parallelotope::new(v([-5.0, -1.0, -5.0]), v([5.0, 0.0, 5.0]), RGB::new(0.7, 0.7, 0.7))),
        Box::new(Parallelotope::new(v([-5.0, 0.0, -5.0]), v([-4.0, 4.0, 5.0]), RGB::new(0.7, 0.1, 0.1))),
        Box::new(Parallelotope::new(v([4.0, 0.0, -5.0]), v([5.0, 4.0, 5.0]), RGB::new(0.1, 0.7, 0.1))),
        Box::new(Parallelotope::new(v([-1.0, 0.0, -1.0]), v([1.0, 2.0, 1.0]), RGB::new(0.8, 0.8, 0.8))),
    ];
    let lights: Vec<Box<dyn LightSource<3, f64>>> = vec![Box::new(PointLight::new(v([0.0, 4.5, 0.0]), RGB::new(20.0, 20.0, 20.0)))];
    let projector = PerspectiveProjector {
        origin: v([0.0, 2.0, -6.0]),
        distance: 1.2,
        screen_size: [48, 32],
    };
    Scene::new(RGB::black(), None, projector, lights, shapes).unwrap()
}

fn integrator_bench(c: &mut Criterion) {
    let scene = cornell_ish_scene();
    let notifier = NullNotifier::new([48, 32]);
    let mut group = c.benchmark_group("integrators");
    group.sample_size(20);

    for integrator in [IntegratorKind::Pt, IntegratorKind::Bpt] {
        let label = match integrator {
            IntegratorKind::Pt => "path_tracing",
            IntegratorKind::Bpt => "bidirectional",
        };
        group.bench_function(label, |b| {
            b.iter(|| {
                let config = RenderConfig {
                    integrator,
                    samples_per_pixel: 2,
                    max_pass_count: Some(1),
                    thread_count: NonZeroUsize::new(1).unwrap(),
                    ..RenderConfig::default()
                };
                let painting = Painting::new(&scene, &notifier, config).unwrap();
                painting.run().unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, integrator_bench);
criterion_main!(benches);
