use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use limiar_image::{Image, ImageSize};
use limiar_imgproc::parallel::ExecutionStrategy;
use limiar_imgproc::stats::global_average;
use limiar_imgproc::threshold::{
    threshold_bernsen, threshold_global, threshold_niblack, threshold_sauvola, BernsenParams,
    LocalWindow, NiblackParams, SauvolaParams,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_image(width: usize, height: usize) -> Image<u8, 1> {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..(width * height)).map(|_| rng.random()).collect();
    Image::new(ImageSize { width, height }, data).unwrap()
}

fn bench_global(c: &mut Criterion) {
    let mut group = c.benchmark_group("ThresholdGlobal");

    let (w, h) = (1920, 1080);
    let src = create_test_image(w, h);
    let average = global_average(&src).unwrap();

    for (name, strategy) in [
        ("serial", ExecutionStrategy::Serial),
        ("parallel_rows", ExecutionStrategy::ParallelRows),
        ("fixed_4", ExecutionStrategy::Fixed(4)),
    ] {
        group.bench_with_input(
            BenchmarkId::new(name, format!("{}x{}", w, h)),
            &src,
            |b, src| {
                let mut dst = Image::from_size_val(src.size(), 0).unwrap();
                b.iter(|| {
                    threshold_global(src, &mut dst, average, strategy).unwrap();
                })
            },
        );
    }

    group.finish();
}

fn bench_local(c: &mut Criterion) {
    let mut group = c.benchmark_group("ThresholdLocal");
    group.sample_size(10);

    // local windows are O(n^2) per pixel, keep the image small
    let (w, h) = (640, 480);
    let src = create_test_image(w, h);

    for window_size in [3, 10] {
        let window = LocalWindow {
            size: window_size,
            ..Default::default()
        };
        let id = format!("{}x{}_n{}", w, h, window_size);

        for (name, strategy) in [
            ("serial", ExecutionStrategy::Serial),
            ("parallel_rows", ExecutionStrategy::ParallelRows),
        ] {
            group.bench_with_input(
                BenchmarkId::new(format!("bernsen_{name}"), &id),
                &src,
                |b, src| {
                    let mut dst = Image::from_size_val(src.size(), 0).unwrap();
                    b.iter(|| {
                        threshold_bernsen(src, &mut dst, &window, &BernsenParams::default(), strategy)
                            .unwrap();
                    })
                },
            );

            group.bench_with_input(
                BenchmarkId::new(format!("niblack_{name}"), &id),
                &src,
                |b, src| {
                    let mut dst = Image::from_size_val(src.size(), 0).unwrap();
                    b.iter(|| {
                        threshold_niblack(src, &mut dst, &window, &NiblackParams::default(), strategy)
                            .unwrap();
                    })
                },
            );

            group.bench_with_input(
                BenchmarkId::new(format!("sauvola_{name}"), &id),
                &src,
                |b, src| {
                    let mut dst = Image::from_size_val(src.size(), 0).unwrap();
                    b.iter(|| {
                        threshold_sauvola(src, &mut dst, &window, &SauvolaParams::default(), strategy)
                            .unwrap();
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_global, bench_local);
criterion_main!(benches);
