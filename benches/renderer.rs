use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use neon_rs_renderer::config::Config;
use neon_rs_renderer::filters::build_defs;
use neon_rs_renderer::geometry::{MeasuredSize, Orientation, resolve_geometry};
use neon_rs_renderer::mounts::place_mounts;
use neon_rs_renderer::render::{render_svg, settled_frame};
use neon_rs_renderer::transition::LightAnimator;
use neon_rs_renderer::uid::Uid;
use std::hint::black_box;

const CASES: [(&str, Orientation, u32, u32); 4] = [
    ("ring_small", Orientation::Circle, 64, 64),
    ("ring_large", Orientation::Circle, 1024, 1024),
    ("bar_horizontal", Orientation::Horizontal, 1200, 48),
    ("bar_vertical", Orientation::Vertical, 48, 900),
];

fn config_for(orientation: Orientation, width: u32, height: u32) -> Config {
    let mut config = Config::default();
    config.neon.orientation = orientation;
    config.render.width = width as f64;
    config.render.height = height as f64;
    config
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    for (name, orientation, width, height) in CASES {
        let config = config_for(orientation, width, height);
        let size = MeasuredSize::new(width, height);
        group.bench_with_input(BenchmarkId::from_parameter(name), &size, |b, size| {
            b.iter(|| {
                let geometry = resolve_geometry(orientation, black_box(*size), config.neon.stroke);
                black_box(place_mounts(&geometry, &config.neon.mounts).len());
            });
        });
    }
    group.finish();
}

fn bench_defs(c: &mut Criterion) {
    let mut group = c.benchmark_group("defs");
    let uid = Uid::new("bench");
    for (name, orientation, width, height) in CASES {
        let config = config_for(orientation, width, height);
        let geometry = resolve_geometry(orientation, MeasuredSize::new(width, height), config.neon.stroke);
        group.bench_with_input(BenchmarkId::from_parameter(name), &geometry, |b, geometry| {
            b.iter(|| {
                let defs = build_defs(&uid, black_box(geometry), &config.neon);
                black_box(defs.glow.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let uid = Uid::new("bench");
    for (name, orientation, width, height) in CASES {
        let config = config_for(orientation, width, height);
        let frame = settled_frame(&config.neon, true);
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter(|| {
                let svg = render_svg(black_box(config), &frame, &uid);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_transition(c: &mut Criterion) {
    let config = Config::default();
    c.bench_function("transition/toggle_60fps", |b| {
        b.iter(|| {
            let mut animator = LightAnimator::new(&config.neon, true);
            animator.set_lights(false);
            while !animator.is_settled() {
                animator.advance(16.0);
                black_box(animator.frame());
            }
        });
    });
}

criterion_group!(benches, bench_geometry, bench_defs, bench_render, bench_transition);
criterion_main!(benches);
