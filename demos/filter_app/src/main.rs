use std::{path::PathBuf, time::Instant};

use argh::FromArgs;

use parfilter::image::{GrayImage, ImageSize};
use parfilter::imgproc::{
    config::{FilterConfig, Schedule},
    core, filter, histogram, parallel,
};

#[derive(FromArgs, Debug)]
/// Apply a convolution filter to a synthetic image, serially or in parallel.
struct Args {
    /// filter to apply; `sobel` or `edges` selects the gradient magnitude
    #[argh(option, short = 'f', default = "String::from(\"gaussian\")")]
    filter: String,

    /// comma separated list of filters applied in order, overrides --filter
    #[argh(option)]
    chain: Option<String>,

    /// number of threads, 0 uses all the cores
    #[argh(option, short = 't', default = "0")]
    threads: usize,

    /// scheduling policy: static, dynamic or guided
    #[argh(option, short = 's', default = "Schedule::Static")]
    schedule: Schedule,

    /// chunk size in rows, 0 selects the policy default
    #[argh(option, short = 'c', default = "0")]
    chunk: usize,

    /// split the image into square tiles
    #[argh(switch)]
    tiled: bool,

    /// tile edge length in pixels
    #[argh(option, default = "64")]
    tile_size: usize,

    /// path to a JSON file with the execution options, overrides the flags above
    #[argh(option)]
    config: Option<PathBuf>,

    /// size of the generated image as WxH
    #[argh(option, default = "String::from(\"1024x1024\")")]
    size: String,

    /// test pattern: 0=gradient, 1=checker, 2=circles, 3=stripes, 4=edges
    #[argh(option, default = "0")]
    pattern: u8,

    /// run the serial implementation only
    #[argh(switch)]
    serial: bool,

    /// time the serial and the parallel implementations
    #[argh(switch)]
    compare: bool,

    /// list the available filters and exit
    #[argh(switch, short = 'l')]
    list: bool,
}

fn parse_size(s: &str) -> Result<ImageSize, Box<dyn std::error::Error>> {
    let (width, height) = match s.split_once('x') {
        Some((w, h)) => (w.parse()?, h.parse()?),
        None => {
            let side = s.parse()?;
            (side, side)
        }
    };
    Ok(ImageSize { width, height })
}

/// Generate a synthetic grayscale test pattern.
fn generate_test_image(size: ImageSize, pattern: u8) -> Result<GrayImage, Box<dyn std::error::Error>> {
    let (w, h) = (size.width.max(1), size.height.max(1));
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);

    let mut data = Vec::with_capacity(size.area());
    for y in 0..size.height {
        for x in 0..size.width {
            let v = match pattern {
                0 => ((x + y) * 255 / (w + h - 2).max(1)) as u8,
                1 => {
                    if (x / 32 + y / 32) % 2 == 0 {
                        255
                    } else {
                        0
                    }
                }
                2 => {
                    let r = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                    if (r as usize / 20) % 2 == 0 {
                        220
                    } else {
                        30
                    }
                }
                3 => {
                    if (x / 16) % 2 == 0 {
                        200
                    } else {
                        50
                    }
                }
                4 => {
                    let inside = x > w / 4 && x < 3 * w / 4 && y > h / 4 && y < 3 * h / 4;
                    if inside {
                        255
                    } else {
                        0
                    }
                }
                p => return Err(format!("unknown pattern: {p}").into()),
            };
            data.push(v);
        }
    }

    Ok(GrayImage::new(size, data)?)
}

enum Operation {
    Sobel,
    Chain(Vec<String>),
}

impl Operation {
    fn run_serial(&self, image: &GrayImage) -> Result<GrayImage, filter::FilterError> {
        match self {
            Operation::Sobel => Ok(filter::sobel_serial(image)),
            Operation::Chain(names) => filter::filter_chain_serial(image, names),
        }
    }

    fn run_parallel(
        &self,
        image: &GrayImage,
        config: &FilterConfig,
    ) -> Result<GrayImage, filter::FilterError> {
        match self {
            Operation::Sobel => filter::sobel_parallel(image, config),
            Operation::Chain(names) => filter::filter_chain_parallel(image, names, config),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.list {
        println!("Available filters:");
        for name in filter::kernels::list_kernels() {
            let kernel = filter::kernels::kernel_by_name(name)?;
            println!("  {name:<16} {}", kernel.name());
        }
        println!("  {:<16} Sobel gradient magnitude", "sobel");
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => {
            let mut config = FilterConfig::new()
                .with_num_threads(args.threads)
                .with_schedule(args.schedule)
                .with_chunk_size(args.chunk);
            config.tiled = args.tiled;
            config.tile_size = args.tile_size;
            config
        }
    };
    log::debug!("config: {config:?}");

    let size = parse_size(&args.size)?;
    println!(
        "Generating test image {}x{} (pattern {})...",
        size.width, size.height, args.pattern
    );
    let image = generate_test_image(size, args.pattern)?;

    let operation = match args.chain.as_deref() {
        Some(chain) => {
            let names = chain.split(',').map(|s| s.trim().to_string()).collect::<Vec<_>>();
            println!("Filter chain: {}", names.join(" -> "));
            Operation::Chain(names)
        }
        None if args.filter == "sobel" || args.filter == "edges" => {
            println!("Filter: Sobel Edge Detection");
            Operation::Sobel
        }
        None => {
            let kernel = filter::kernels::kernel_by_name(&args.filter)?;
            println!("Filter: {} ({}x{})", kernel.name(), kernel.size(), kernel.size());
            Operation::Chain(vec![args.filter.clone()])
        }
    };

    let threads = parallel::WorkerPool::new(config.num_threads)?.num_workers();
    let megapixels = size.area() as f64 / 1e6;

    let output = if args.compare {
        println!("\n--- Serial vs Parallel Comparison ---");

        let start = Instant::now();
        let serial = operation.run_serial(&image)?;
        let serial_ms = start.elapsed().as_secs_f64() * 1e3;
        println!("Serial time: {serial_ms:.3} ms");

        let start = Instant::now();
        let parallel = operation.run_parallel(&image, &config)?;
        let parallel_ms = start.elapsed().as_secs_f64() * 1e3;

        let speedup = serial_ms / parallel_ms;
        println!("Parallel time ({threads} threads): {parallel_ms:.3} ms");
        println!("Speedup: {speedup:.2}x");
        println!("Efficiency: {:.1}%", speedup / threads as f64 * 100.0);
        println!("Throughput: {:.2} MP/s", megapixels / (parallel_ms / 1e3));
        println!("Identical output: {}", serial == parallel);

        parallel
    } else if args.serial {
        let start = Instant::now();
        let output = operation.run_serial(&image)?;
        println!(
            "Serial execution time: {:.3} ms",
            start.elapsed().as_secs_f64() * 1e3
        );
        output
    } else {
        print!("Using {threads} threads, schedule: {}", config.schedule);
        if config.chunk_size > 0 {
            print!(" (chunk={})", config.chunk_size);
        }
        if config.tiled {
            print!(" [tiled, tile_size={}]", config.tile_size);
        }
        println!();

        let start = Instant::now();
        let output = operation.run_parallel(&image, &config)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;
        println!("Parallel execution time: {elapsed_ms:.3} ms");
        println!("Throughput: {:.2} MP/s", megapixels / (elapsed_ms / 1e3));
        output
    };

    let stats = core::statistics(&output, &config)?;
    let hist = histogram::histogram(&output, &config)?;
    let mode = hist
        .iter()
        .enumerate()
        .max_by_key(|&(_, count)| *count)
        .map_or(0, |(value, _)| value);

    println!(
        "Output: min={} max={} mean={:.2} std={:.2} mode={mode}",
        stats.min,
        stats.max,
        stats.mean,
        stats.variance.max(0.0).sqrt()
    );

    Ok(())
}
