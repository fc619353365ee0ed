//! Benchmarks for the per-frame filter kernels.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use inkframe::filter::{create_filter, FilterContext, HeapAllocator};
use inkframe::processing::{RemapParams, ToneMatrix};
use inkframe::types::{Frame, LinkProps, PixelFormat};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn test_frame(format: PixelFormat) -> Frame {
    let mut frame = Frame::new(WIDTH, HEIGHT, format).expect("frame");
    for (p, plane) in frame.planes_mut().iter_mut().enumerate() {
        for y in 0..plane.height() {
            for (x, v) in plane.row_mut(y).iter_mut().enumerate() {
                *v = (p * 31 + x + y * 3) as u8;
            }
        }
    }
    frame
}

/// Benchmark each filter on a writable 720p frame.
fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_frame");
    group.throughput(Throughput::Elements(WIDTH as u64 * HEIGHT as u64));

    let chains = [
        "monocomic=gray",
        "monocomic=dot",
        "monocomic=pattern",
        "yuvrangeconv=full",
        "yuvrangeconv=mode=y:il=16:ih=235:ol=0:oh=255",
        "showinfo=metadata",
    ];

    for description in chains {
        let mut filter = create_filter(description).expect("filter");
        filter
            .configure(&LinkProps::new(WIDTH, HEIGHT, PixelFormat::Yuv420p))
            .expect("configure");

        group.bench_function(BenchmarkId::from_parameter(description), |b| {
            b.iter_batched(
                || test_frame(PixelFormat::Yuv420p),
                |frame| {
                    let mut allocator = HeapAllocator;
                    let mut out = Vec::with_capacity(1);
                    let mut ctx = FilterContext::new(&mut allocator, &mut out);
                    filter.filter_frame(frame, &mut ctx).expect("filter_frame");
                    black_box(out)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

/// Benchmark table construction done at configure time.
fn bench_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("tables");

    group.bench_function("remap_gamma", |b| {
        b.iter(|| RemapParams::new(80, 168, 0, 255).with_gamma(black_box(2.2)).build())
    });

    group.bench_function("tone_dot", |b| b.iter(|| ToneMatrix::dot(black_box(false))));

    group.bench_function("tone_pattern", |b| {
        b.iter(|| ToneMatrix::pattern(black_box(45), false))
    });

    group.finish();
}

criterion_group!(benches, bench_filters, bench_tables);
criterion_main!(benches);
