//! Benchmarks the BVH build (spec §4.1's deterministic SAH construction)
//! and steady-state ray intersection against a scattered field of boxes,
//! grounded on the teacher's `raytrace_bench.rs` structure (non-mutated
//! `TestData`, one `Criterion` group per axis of interest).

use criterion::{criterion_group, criterion_main, Criterion};
use painter_core::geometry::{Bvh, BvhObject};
use painter_core::math::{BoundingBox, Ray, Vector};

fn scattered_boxes(count: usize) -> Vec<BvhObject<3, f64>> {
    (0..count)
        .map(|i| {
            let x = (i % 32) as f64 * 3.0;
            let y = ((i / 32) % 32) as f64 * 3.0;
            let z = (i / (32 * 32)) as f64 * 3.0;
            let min = Vector { components: [x, y, z] };
            let max = Vector {
                components: [x + 1.0, y + 1.0, z + 1.0],
            };
            BvhObject {
                bounds: BoundingBox::new(min, max),
                cost: 1.0,
                index: i,
            }
        })
        .collect()
}

fn build_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_build");
    for &count in &[100usize, 1_000, 10_000] {
        group.bench_function(format!("objects_{count}"), |b| {
            b.iter_batched(
                || scattered_boxes(count),
                |objects| Bvh::build(objects),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn intersect_bench(c: &mut Criterion) {
    let bvh = Bvh::build(scattered_boxes(10_000));
    let mut group = c.benchmark_group("bvh_intersect");
    group.bench_function("diagonal_ray", |b| {
        let ray = Ray::new(
            Vector { components: [-10.0, -10.0, -10.0] },
            Vector { components: [1.0, 1.0, 1.0] }.normalized().unwrap(),
            f64::INFINITY,
        );
        b.iter(|| bvh.intersect(&ray, f64::INFINITY, |indices, max| indices.first().map(|&i| (max, i))));
    });
    group.finish();
}

criterion_group!(benches, build_bench, intersect_bench);
criterion_main!(benches);
