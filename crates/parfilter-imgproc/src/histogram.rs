use std::sync::{Mutex, PoisonError};

use parfilter_image::Image;

use crate::config::FilterConfig;
use crate::parallel::{self, ParallelError};

/// Number of bins of an 8-bit histogram.
pub const NUM_BINS: usize = 256;

/// A 256-bin histogram of 8-bit samples.
pub type Histogram = [u64; NUM_BINS];

fn count_into(hist: &mut Histogram, samples: &[u8]) {
    for &v in samples {
        hist[v as usize] += 1;
    }
}

/// Compute the sample histogram of an image on the calling thread.
///
/// Color images are counted over all their interleaved samples.
pub fn histogram_serial<const C: usize>(image: &Image<C>) -> Histogram {
    let mut hist = [0; NUM_BINS];
    count_into(&mut hist, image.as_slice());
    hist
}

/// Compute the sample histogram of an image in parallel.
///
/// Every worker counts into a private histogram and adds it to the shared one
/// exactly once. The bins always sum to the number of samples.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `config` - The execution options.
///
/// # Example
///
/// ```
/// use parfilter_image::GrayImage;
/// use parfilter_imgproc::config::FilterConfig;
/// use parfilter_imgproc::histogram::histogram;
///
/// let image = GrayImage::new([5, 2].into(), vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 255]).unwrap();
///
/// let hist = histogram(&image, &FilterConfig::new().with_num_threads(2)).unwrap();
/// assert_eq!(hist[0], 9);
/// assert_eq!(hist[255], 1);
/// assert_eq!(hist.iter().sum::<u64>(), 10);
/// ```
pub fn histogram<const C: usize>(
    image: &Image<C>,
    config: &FilterConfig,
) -> Result<Histogram, ParallelError> {
    let samples = image.as_slice();
    let shared = Mutex::new([0u64; NUM_BINS]);

    parallel::par_fold_samples(
        config,
        samples.len(),
        &shared,
        || [0u64; NUM_BINS],
        |local, range| count_into(local, &samples[range]),
        |total, local| {
            for (t, l) in total.iter_mut().zip(local.iter()) {
                *t += l;
            }
        },
    )?;

    Ok(shared.into_inner().unwrap_or_else(PoisonError::into_inner))
}
