//! # Scene Benchmark
//!
//! Frame costs for a wide widget grid: animator updates, layout cascades,
//! pointer dispatch and draw recording.
//!
//! Run with: `cargo bench --package trellis_ui`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::{Rect, Vec2};
use trellis_ui::{
    AnimatedProperty, AnimationFunction, Anchors, Animator, ColoredQuad, DrawList, MouseButton, NodeId,
    Scene, SceneConfig,
};

/// Builds a root panel holding `rows * rows` anchored panels, each with one
/// animated quad.
fn grid(rows: usize) -> (Scene, NodeId) {
    let mut scene = Scene::with_config(SceneConfig::deterministic(1));
    let side = 1024.0;
    let cell = side / rows as f32;
    let root = scene
        .create_container("root", Rect::new(0.0, 0.0, side, side))
        .unwrap();
    scene.add_root(root).unwrap();

    for row in 0..rows {
        for col in 0..rows {
            let rect = Rect::new(col as f32 * cell, row as f32 * cell, cell, cell);
            let panel = scene.create_container(format!("panel_{row}_{col}"), rect).unwrap();
            scene.visual_mut(panel).unwrap().set_anchors(Anchors::ALL);
            scene.add_child(root, panel).unwrap();

            let quad = scene
                .create_widget(
                    format!("quad_{row}_{col}"),
                    Rect::new(2.0, 2.0, cell - 4.0, cell - 4.0),
                    Box::new(ColoredQuad),
                )
                .unwrap();
            scene.add_child(panel, quad).unwrap();

            let pulse = Animator::new(AnimatedProperty::Alpha)
                .function(AnimationFunction::SineAbs)
                .range(64.0, 191.0)
                .looping();
            let animator = scene.create_animator(format!("pulse_{row}_{col}"), pulse).unwrap();
            scene.add_child(quad, animator).unwrap();
        }
    }

    (scene, root)
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_update");

    for rows in [8, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(rows * rows), &rows, |b, &rows| {
            let (mut scene, _) = grid(rows);
            b.iter(|| scene.update(black_box(1.0 / 60.0)));
        });
    }

    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let (mut scene, root) = grid(32);
    let mut wide = false;

    c.bench_function("scene_cascade_1k", |b| {
        b.iter(|| {
            wide = !wide;
            let width = if wide { 1280.0 } else { 1024.0 };
            black_box(scene.set_size(root, Vec2::new(width, 1024.0)))
        });
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let (mut scene, _) = grid(32);

    c.bench_function("scene_mouse_down_1k", |b| {
        b.iter(|| black_box(scene.mouse_down(Vec2::new(700.0, 700.0), MouseButton::Left)));
    });

    c.bench_function("scene_node_under_point_1k", |b| {
        b.iter(|| black_box(scene.node_under_point(Vec2::new(700.0, 700.0))));
    });
}

fn bench_draw(c: &mut Criterion) {
    let (scene, _) = grid(32);
    let mut list = DrawList::new();

    c.bench_function("scene_draw_1k", |b| {
        b.iter(|| {
            list.clear();
            scene.draw(&mut list);
            black_box(list.quad_count())
        });
    });
}

criterion_group!(benches, bench_update, bench_cascade, bench_dispatch, bench_draw);
criterion_main!(benches);
