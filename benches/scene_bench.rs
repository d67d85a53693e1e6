//! Scene construction and recolor benchmarks
//!
//! Run with:
//! `cargo bench --bench scene_bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use measurements_panel::scene::{Scene, SceneData, recolor_points, redraw_color_attribute_means, render};
use measurements_panel::{ColorAssignment, Collection, Grouping, Layout, Measurement, StrainColorMap};
use std::hint::black_box;

const GROUPS: usize = 24;
const CLADES: [&str; 4] = ["3C", "2a", "2a1", "1b"];

fn collection(size: usize) -> Collection {
    let measurements = (0..size)
        .map(|i| {
            Measurement::new(i, format!("strain-{}", i % 500), (i % 97) as f64 * 0.75, (i * 37 % 100) as f64)
                .with_field("serum", format!("serum-{}", i % GROUPS))
        })
        .collect();
    let mut collection = Collection::new("bench", measurements);
    collection.groupings.push(Grouping {
        key: "serum".to_string(),
        order: Vec::new(),
    });
    collection.complete_group_orders();
    collection
}

fn colors() -> StrainColorMap {
    (0..500)
        .map(|i| {
            let clade = CLADES[i % CLADES.len()];
            (format!("strain-{}", i), ColorAssignment::new(clade, "#4e79a7"))
        })
        .collect()
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene/render");
    let layout = Layout::default();
    for size in [1_000usize, 10_000] {
        let collection = collection(size);
        let data = SceneData::build(&collection, "serum", 800.0, &layout);
        let mut scene = Scene::new(800.0, layout.clone());
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                render(&mut scene, black_box(&data));
                black_box(scene.node_count());
            });
        });
    }
    group.finish();
}

fn bench_recolor(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene/recolor");
    let layout = Layout::default();
    let colors = colors();
    let legend: Vec<String> = CLADES.iter().map(|c| c.to_string()).collect();
    for size in [1_000usize, 10_000] {
        let collection = collection(size);
        let data = SceneData::build(&collection, "serum", 800.0, &layout);
        let mut scene = Scene::new(800.0, layout.clone());
        render(&mut scene, &data);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                recolor_points(&mut scene, black_box(&colors));
                redraw_color_attribute_means(&mut scene, &data, &colors, &legend);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render, bench_recolor);
criterion_main!(benches);
