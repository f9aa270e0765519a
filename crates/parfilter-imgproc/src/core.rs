use std::sync::{Mutex, PoisonError};

use parfilter_image::Image;

use crate::config::FilterConfig;
use crate::parallel::{self, ParallelError};

/// Global statistics of the samples of an image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageStatistics {
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Mean of all the samples.
    pub mean: f64,
    /// Population variance of all the samples.
    pub variance: f64,
}

/// Running sums over a set of samples.
///
/// Integer sums make merging exact, so the result does not depend on how the
/// samples were split between workers.
#[derive(Debug, Clone, Copy)]
struct Moments {
    count: u64,
    sum: u64,
    sum_sq: u64,
    min: u8,
    max: u8,
}

impl Default for Moments {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0,
            sum_sq: 0,
            min: u8::MAX,
            max: u8::MIN,
        }
    }
}

impl Moments {
    fn accumulate(&mut self, samples: &[u8]) {
        for &v in samples {
            let v64 = v as u64;
            self.sum += v64;
            self.sum_sq += v64 * v64;
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
        self.count += samples.len() as u64;
    }

    fn merge(&mut self, other: Moments) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    fn finish(self) -> ImageStatistics {
        if self.count == 0 {
            return ImageStatistics::default();
        }

        let n = self.count as f64;
        let mean = self.sum as f64 / n;
        let variance = self.sum_sq as f64 / n - mean.powi(2);

        ImageStatistics {
            min: self.min as f64,
            max: self.max as f64,
            mean,
            variance,
        }
    }
}

/// Compute the minimum, maximum, mean and variance of an image on the calling
/// thread.
///
/// All the samples are pooled, so for color images the statistics cover the
/// interleaved channels together. An empty image yields all zeros.
pub fn statistics_serial<const C: usize>(image: &Image<C>) -> ImageStatistics {
    let mut moments = Moments::default();
    moments.accumulate(image.as_slice());
    moments.finish()
}

/// Compute the minimum, maximum, mean and variance of an image in parallel.
///
/// Each worker accumulates private integer sums over the sample blocks it is
/// given and merges them into the shared total once. The result equals
/// [`statistics_serial`] for every configuration.
///
/// The variance is the population variance `E[x²] - E[x]²`.
///
/// # Example
///
/// ```
/// use parfilter_image::GrayImage;
/// use parfilter_imgproc::config::FilterConfig;
/// use parfilter_imgproc::core::statistics;
///
/// let image = GrayImage::new([4, 1].into(), vec![0, 10, 20, 30]).unwrap();
///
/// let stats = statistics(&image, &FilterConfig::default()).unwrap();
/// assert_eq!(stats.min, 0.0);
/// assert_eq!(stats.max, 30.0);
/// assert_eq!(stats.mean, 15.0);
/// assert_eq!(stats.variance, 125.0);
/// ```
pub fn statistics<const C: usize>(
    image: &Image<C>,
    config: &FilterConfig,
) -> Result<ImageStatistics, ParallelError> {
    let samples = image.as_slice();
    let total = Mutex::new(Moments::default());

    parallel::par_fold_samples(
        config,
        samples.len(),
        &total,
        Moments::default,
        |local, range| local.accumulate(&samples[range]),
        Moments::merge,
    )?;

    let total = total.into_inner().unwrap_or_else(PoisonError::into_inner);
    Ok(total.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Schedule;
    use parfilter_image::{GrayImage, ImageError, RgbImage};

    #[test]
    fn test_statistics_serial() -> Result<(), ImageError> {
        let image = GrayImage::new([2, 2].into(), vec![0, 10, 20, 30])?;
        let stats = statistics_serial(&image);
        assert_eq!(
            stats,
            ImageStatistics {
                min: 0.0,
                max: 30.0,
                mean: 15.0,
                variance: 125.0
            }
        );
        Ok(())
    }

    #[test]
    fn test_statistics_empty() -> Result<(), Box<dyn std::error::Error>> {
        let image = GrayImage::new([0, 0].into(), vec![])?;
        assert_eq!(statistics_serial(&image), ImageStatistics::default());
        assert_eq!(
            statistics(&image, &FilterConfig::default())?,
            ImageStatistics::default()
        );
        Ok(())
    }

    #[test]
    fn test_statistics_constant() -> Result<(), Box<dyn std::error::Error>> {
        let image = RgbImage::from_size_val([7, 5].into(), 42)?;
        let stats = statistics(&image, &FilterConfig::new().with_num_threads(2))?;
        assert_eq!(stats.min, 42.0);
        assert_eq!(stats.max, 42.0);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.variance, 0.0);
        Ok(())
    }

    #[test]
    fn test_statistics_parallel_matches_serial() -> Result<(), Box<dyn std::error::Error>> {
        let data = (0..31 * 23).map(|i| (i * 97 % 251) as u8).collect();
        let image = GrayImage::new([31, 23].into(), data)?;
        let expected = statistics_serial(&image);

        for schedule in Schedule::ALL {
            for threads in [1, 2, 5] {
                let config = FilterConfig::new()
                    .with_num_threads(threads)
                    .with_schedule(schedule)
                    .with_chunk_size(3);
                assert_eq!(statistics(&image, &config)?, expected);
            }
        }
        Ok(())
    }

    #[test]
    fn test_statistics_single_row() -> Result<(), Box<dyn std::error::Error>> {
        let data = (0..20_000).map(|i| (i * 13 % 256) as u8).collect();
        let image = GrayImage::new([20_000, 1].into(), data)?;
        let expected = statistics_serial(&image);

        for schedule in Schedule::ALL {
            let config = FilterConfig::new()
                .with_num_threads(4)
                .with_schedule(schedule);
            assert_eq!(statistics(&image, &config)?, expected, "{schedule}");
        }
        Ok(())
    }
}
