use std::ops::Range;

use parfilter_image::Image;

use super::kernels::{Kernel, SOBEL_X, SOBEL_Y};
use super::{tiled, FilterError};
use crate::{config::FilterConfig, parallel};

/// The per-pixel operation shared by every execution path.
#[derive(Clone, Copy)]
pub(crate) enum PixelOp<'a> {
    Convolve(&'a Kernel),
    Sobel,
}

impl PixelOp<'_> {
    /// Fill `out` with the output samples of row `y` for the columns in `xs`.
    ///
    /// `out` holds `xs.len() * C` interleaved samples.
    pub(crate) fn fill_segment<const C: usize>(
        &self,
        src: &Image<C>,
        y: usize,
        xs: Range<usize>,
        out: &mut [u8],
    ) {
        for (x, pixel) in xs.zip(out.chunks_exact_mut(C)) {
            for (ch, sample) in pixel.iter_mut().enumerate() {
                *sample = match self {
                    PixelOp::Convolve(kernel) => convolve_at(src, kernel, x, y, ch),
                    PixelOp::Sobel => sobel_at(src, x, y, ch),
                };
            }
        }
    }

    fn fill_rows<const C: usize>(&self, src: &Image<C>, rows: Range<usize>, out: &mut [u8]) {
        let stride = src.row_stride();
        if stride == 0 {
            return;
        }
        for (y, row) in rows.zip(out.chunks_exact_mut(stride)) {
            self.fill_segment(src, y, 0..src.width(), row);
        }
    }

    pub(crate) fn run_serial<const C: usize>(&self, src: &Image<C>) -> Image<C> {
        let mut dst = src.zeros_like();
        self.fill_rows(src, 0..src.height(), dst.as_slice_mut());
        dst
    }

    pub(crate) fn run_parallel<const C: usize>(
        &self,
        src: &Image<C>,
        config: &FilterConfig,
    ) -> Result<Image<C>, FilterError> {
        if config.tiled {
            return tiled::run_tiled(self, src, config);
        }

        let mut dst = src.zeros_like();
        parallel::par_iter_row_blocks(config, dst.as_slice_mut(), src.row_stride(), |rows, out| {
            self.fill_rows(src, rows, out)
        })?;

        Ok(dst)
    }
}

#[inline]
fn saturate(value: f32, max_val: u8) -> u8 {
    value.clamp(0.0, max_val as f32) as u8
}

#[inline]
fn convolve_at<const C: usize>(
    src: &Image<C>,
    kernel: &Kernel,
    x: usize,
    y: usize,
    ch: usize,
) -> u8 {
    let r = kernel.radius() as isize;
    let (x, y) = (x as isize, y as isize);

    let mut sum = 0.0f32;
    for ky in -r..=r {
        for kx in -r..=r {
            let sample = src.get_clamped(x + kx, y + ky, ch) as f32;
            sum += sample * kernel.at((kx + r) as usize, (ky + r) as usize);
        }
    }

    saturate(sum / kernel.divisor(), src.max_val())
}

#[inline]
fn sobel_at<const C: usize>(src: &Image<C>, x: usize, y: usize, ch: usize) -> u8 {
    let (x, y) = (x as isize, y as isize);

    let (mut gx, mut gy) = (0.0f32, 0.0f32);
    for ky in 0..3 {
        for kx in 0..3 {
            let sample = src.get_clamped(x + kx as isize - 1, y + ky as isize - 1, ch) as f32;
            gx += sample * SOBEL_X[ky * 3 + kx];
            gy += sample * SOBEL_Y[ky * 3 + kx];
        }
    }

    (gx * gx + gy * gy).sqrt().min(src.max_val() as f32) as u8
}

/// Convolve an image with a kernel on the calling thread.
///
/// Pixels outside the image are replaced by the nearest edge pixel. Each
/// weighted sum is divided by the kernel divisor, saturated to
/// `[0, max_val]` and truncated. Channels are filtered independently.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
///
/// # Returns
///
/// A new image with the same size and max value as `src`.
///
/// # Example
///
/// ```
/// use parfilter_image::GrayImage;
/// use parfilter_imgproc::filter::{filter_serial, kernels::kernel_by_name};
///
/// let image = GrayImage::from_size_val([4, 4].into(), 100).unwrap();
/// let kernel = kernel_by_name("box_blur").unwrap();
///
/// let blurred = filter_serial(&image, &kernel);
/// assert_eq!(blurred.as_slice(), &[100u8; 16]);
/// ```
pub fn filter_serial<const C: usize>(src: &Image<C>, kernel: &Kernel) -> Image<C> {
    PixelOp::Convolve(kernel).run_serial(src)
}

/// Convolve an image with a kernel using multiple threads.
///
/// The output is byte-identical to [`filter_serial`] for every schedule,
/// chunk size, thread count and tile size. When `config.tiled` is set the
/// work is split into square tiles, see [`filter_tiled`](super::filter_tiled).
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
/// * `config` - The execution options.
///
/// # Errors
///
/// Fails if the thread pool cannot be built or the tile size is zero.
///
/// # Example
///
/// ```
/// use parfilter_image::GrayImage;
/// use parfilter_imgproc::config::{FilterConfig, Schedule};
/// use parfilter_imgproc::filter::{filter_parallel, filter_serial, kernels::kernel_by_name};
///
/// let image = GrayImage::new([4, 2].into(), vec![0, 10, 20, 30, 40, 50, 60, 70]).unwrap();
/// let kernel = kernel_by_name("gaussian").unwrap();
/// let config = FilterConfig::new().with_num_threads(2).with_schedule(Schedule::Guided);
///
/// let parallel = filter_parallel(&image, &kernel, &config).unwrap();
/// assert_eq!(parallel, filter_serial(&image, &kernel));
/// ```
pub fn filter_parallel<const C: usize>(
    src: &Image<C>,
    kernel: &Kernel,
    config: &FilterConfig,
) -> Result<Image<C>, FilterError> {
    PixelOp::Convolve(kernel).run_parallel(src, config)
}

/// Compute the Sobel gradient magnitude on the calling thread.
///
/// Each output sample is `min(sqrt(gx² + gy²), max_val)` truncated, where
/// `gx` and `gy` are the responses to [`SOBEL_X`] and [`SOBEL_Y`] with
/// clamp-to-edge borders.
pub fn sobel_serial<const C: usize>(src: &Image<C>) -> Image<C> {
    PixelOp::Sobel.run_serial(src)
}

/// Compute the Sobel gradient magnitude using multiple threads.
///
/// Identical to [`sobel_serial`] under every configuration.
pub fn sobel_parallel<const C: usize>(
    src: &Image<C>,
    config: &FilterConfig,
) -> Result<Image<C>, FilterError> {
    PixelOp::Sobel.run_parallel(src, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Schedule;
    use crate::filter::kernels::kernel_by_name;
    use parfilter_image::{GrayImage, ImageError, RgbImage};

    fn gradient(width: usize, height: usize) -> Result<GrayImage, ImageError> {
        let data = (0..width * height)
            .map(|i| ((i % width) * 255 / width) as u8)
            .collect();
        GrayImage::new([width, height].into(), data)
    }

    #[test]
    fn test_box_blur_constant() -> Result<(), FilterError> {
        let image = GrayImage::from_size_val([4, 4].into(), 100)?;
        let kernel = kernel_by_name("box_blur")?;
        let out = filter_serial(&image, &kernel);
        assert_eq!(out.as_slice(), &[100u8; 16]);
        Ok(())
    }

    #[test]
    fn test_identity_preserves_input() -> Result<(), FilterError> {
        let image = gradient(5, 5)?;
        let out = filter_serial(&image, &kernel_by_name("identity")?);
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn test_box_blur_clamps_edges() -> Result<(), FilterError> {
        #[rustfmt::skip]
        let image = GrayImage::new([3, 3].into(), vec![
            0, 0, 0,
            0, 90, 0,
            0, 0, 0,
        ])?;
        let out = filter_serial(&image, &kernel_by_name("box_blur")?);
        // every 3x3 neighbourhood contains the center exactly once
        assert_eq!(out.as_slice(), &[10u8; 9]);
        Ok(())
    }

    #[test]
    fn test_saturation_and_truncation() -> Result<(), FilterError> {
        #[rustfmt::skip]
        let image = GrayImage::new([3, 1].into(), vec![
            0, 200, 0,
        ])?;
        let out = filter_serial(&image, &kernel_by_name("sharpen")?);
        // 5*200 saturates, the neighbours go negative and clamp to zero
        assert_eq!(out.as_slice(), &[0, 255, 0]);

        let image = GrayImage::new([2, 1].into(), vec![0, 10])?;
        let kernel = Kernel::new(vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0], 3, 3.0, "third")?;
        let out = filter_serial(&image, &kernel);
        assert_eq!(out.as_slice(), &[0, 3]);
        Ok(())
    }

    #[test]
    fn test_output_respects_max_val() -> Result<(), FilterError> {
        let image = GrayImage::with_max_val([3, 3].into(), 15, vec![15; 9])?;
        let out = filter_serial(&image, &kernel_by_name("sharpen_strong")?);
        assert_eq!(out.max_val(), 15);
        assert!(out.as_slice().iter().all(|&v| v <= 15));

        let out = sobel_serial(&GrayImage::with_max_val([2, 1].into(), 15, vec![0, 15])?);
        assert_eq!(out.as_slice(), &[15, 15]);
        Ok(())
    }

    #[test]
    fn test_sobel_constant_is_zero() -> Result<(), FilterError> {
        let image = GrayImage::from_size_val([8, 8].into(), 77)?;
        assert_eq!(sobel_serial(&image).as_slice(), &[0u8; 64]);
        Ok(())
    }

    #[test]
    fn test_sobel_vertical_edge() -> Result<(), FilterError> {
        #[rustfmt::skip]
        let image = GrayImage::new([4, 1].into(), vec![
            0, 0, 10, 10,
        ])?;
        let out = sobel_serial(&image);
        // gx = 4 * 10 at the two columns next to the step
        assert_eq!(out.as_slice(), &[0, 40, 40, 0]);
        Ok(())
    }

    #[test]
    fn test_rgb_channels_are_independent() -> Result<(), FilterError> {
        let image = RgbImage::new([2, 2].into(), [10, 20, 30].repeat(4))?;
        let out = filter_serial(&image, &kernel_by_name("gaussian")?);
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn test_parallel_matches_serial() -> Result<(), FilterError> {
        let image = gradient(13, 11)?;
        let kernel = kernel_by_name("emboss")?;
        let expected = filter_serial(&image, &kernel);
        for schedule in Schedule::ALL {
            for threads in [1, 3] {
                let config = FilterConfig::new()
                    .with_num_threads(threads)
                    .with_schedule(schedule);
                assert_eq!(filter_parallel(&image, &kernel, &config)?, expected);
                assert_eq!(sobel_parallel(&image, &config)?, sobel_serial(&image));
            }
        }
        Ok(())
    }

    #[test]
    fn test_empty_image() -> Result<(), FilterError> {
        let image = GrayImage::new([0, 3].into(), vec![])?;
        let kernel = kernel_by_name("box_blur")?;
        assert!(filter_serial(&image, &kernel).is_empty());
        assert!(filter_parallel(&image, &kernel, &FilterConfig::default())?.is_empty());
        Ok(())
    }
}
