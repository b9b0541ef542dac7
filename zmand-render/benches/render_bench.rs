use criterion::{criterion_group, criterion_main, Criterion};

use zmand_core::ViewState;
use zmand_render::{render, PixelBuffer, SchemeTable};

fn bench_full_frame_render(c: &mut Criterion) {
    let view = ViewState::for_frame(640, 480).unwrap();
    let table = SchemeTable::builtin();
    let scheme = table.get(0).unwrap();
    let mut buf = PixelBuffer::new(640, 480).unwrap();
    let workers = std::thread::available_parallelism().map_or(1, |n| n.get());

    c.bench_function("full_frame_640x480", |b| {
        b.iter(|| render(&view, scheme, workers, 640, 480, &mut buf).unwrap());
    });
}

fn bench_deep_zoom(c: &mut Criterion) {
    let mut view = ViewState::with_bounds(-0.7454, 0.1130, 1e-4, 1.0).unwrap();
    view.zoom_in(0.5).unwrap();
    let table = SchemeTable::builtin();
    let scheme = table.get(2).unwrap();
    let mut buf = PixelBuffer::new(256, 256).unwrap();

    c.bench_function("render_256x256_deep", |b| {
        b.iter(|| render(&view, scheme, 4, 256, 256, &mut buf).unwrap());
    });
}

fn bench_blur(c: &mut Criterion) {
    let view = ViewState::for_frame(640, 480).unwrap();
    let table = SchemeTable::builtin();
    let mut buf = PixelBuffer::new(640, 480).unwrap();
    render(&view, table.get(0).unwrap(), 4, 640, 480, &mut buf).unwrap();

    c.bench_function("blur_640x480", |b| {
        b.iter(|| buf.blur().unwrap());
    });
}

criterion_group!(benches, bench_full_frame_render, bench_deep_zoom, bench_blur);
criterion_main!(benches);
