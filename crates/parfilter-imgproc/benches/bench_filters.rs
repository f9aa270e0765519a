use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use parfilter_image::GrayImage;
use parfilter_imgproc::config::{FilterConfig, Schedule};
use parfilter_imgproc::filter::{filter_parallel, filter_serial, filter_tiled, kernels, sobel_parallel};

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Convolution");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        for kernel_name in ["gaussian", "gaussian_5x5"].iter() {
            group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

            let parameter_string = format!("{}x{}x{}", width, height, kernel_name);

            // input image
            let image_data = (0..width * height).map(|i| (i % 251) as u8).collect();
            let image = GrayImage::new([*width, *height].into(), image_data).unwrap();
            let kernel = kernels::kernel_by_name(kernel_name).unwrap();

            group.bench_with_input(
                BenchmarkId::new("filter_serial", &parameter_string),
                &image,
                |b, i| b.iter(|| black_box(filter_serial(i, &kernel))),
            );

            for schedule in Schedule::ALL {
                let config = FilterConfig::new().with_schedule(schedule);
                group.bench_with_input(
                    BenchmarkId::new(format!("filter_parallel_{schedule}"), &parameter_string),
                    &image,
                    |b, i| b.iter(|| black_box(filter_parallel(i, &kernel, &config))),
                );
            }

            for tile_size in [32, 64, 128] {
                let config = FilterConfig::new().with_tiling(tile_size);
                group.bench_with_input(
                    BenchmarkId::new(format!("filter_tiled_{tile_size}"), &parameter_string),
                    &image,
                    |b, i| b.iter(|| black_box(filter_tiled(i, &kernel, &config))),
                );
            }
        }

        let image = GrayImage::from_size_val([*width, *height].into(), 0).unwrap();
        group.bench_with_input(
            BenchmarkId::new("sobel_parallel", format!("{}x{}", width, height)),
            &image,
            |b, i| b.iter(|| black_box(sobel_parallel(i, &FilterConfig::default()))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
