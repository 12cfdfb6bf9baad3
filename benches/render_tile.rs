use criterion::{black_box, criterion_group, criterion_main, Criterion};

use agg_watermark::rendering_buffer::RenderingBuffer;
use agg_watermark::span_image_filter_rgba::draw_image_scaled;
use agg_watermark::span_pattern_rgba::fill_pattern;
use agg_watermark::{PixfmtRgba32, Rgba8, TileRenderer, WatermarkConfig};

fn bench_render_tile(c: &mut Criterion) {
    let renderer = TileRenderer::new();
    let default = WatermarkConfig::default();
    c.bench_function("render_tile_default", |b| {
        b.iter(|| renderer.render_tile(black_box(&default)).unwrap())
    });

    let large = WatermarkConfig::new("CONFIDENTIAL DRAFT DO NOT DISTRIBUTE")
        .with_font_size(48.0)
        .with_tile_size(600.0, 400.0)
        .with_rotation(45.0);
    c.bench_function("render_tile_large", |b| {
        b.iter(|| renderer.render_tile(black_box(&large)).unwrap())
    });
}

fn bench_composite(c: &mut Criterion) {
    let mut photo = RenderingBuffer::new(2000, 1500);
    photo.clear(Rgba8::new_opaque(180, 170, 160));
    let tile = TileRenderer::new()
        .render_tile(&WatermarkConfig::default())
        .unwrap();

    c.bench_function("scale_2000x1500_to_1200x900", |b| {
        let mut dst = RenderingBuffer::new(1200, 900);
        b.iter(|| draw_image_scaled(&mut dst, black_box(&photo)))
    });

    c.bench_function("fill_pattern_1200x900", |b| {
        let mut dst = RenderingBuffer::new(1200, 900);
        b.iter(|| {
            dst.clear(Rgba8::new_opaque(255, 255, 255));
            let mut pf = PixfmtRgba32::new(&mut dst);
            fill_pattern(&mut pf, black_box(tile.pixels()));
        })
    });
}

criterion_group!(benches, bench_render_tile, bench_composite);
criterion_main!(benches);
