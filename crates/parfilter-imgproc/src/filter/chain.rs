use parfilter_image::Image;

use super::kernels::{kernel_by_name, Kernel};
use super::{filter_parallel, filter_serial, FilterError};
use crate::config::FilterConfig;

fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Vec<Kernel>, FilterError> {
    names
        .iter()
        .map(|name| kernel_by_name(name.as_ref()).map_err(FilterError::from))
        .collect()
}

/// Apply a sequence of named kernels in order on the calling thread.
///
/// Every name is resolved before any filtering starts, so an unknown name
/// fails the whole call. An empty sequence returns a copy of the input.
///
/// # Example
///
/// ```
/// use parfilter_image::GrayImage;
/// use parfilter_imgproc::filter::filter_chain_serial;
///
/// let image = GrayImage::from_size_val([4, 4].into(), 50).unwrap();
///
/// let out = filter_chain_serial(&image, &["gaussian", "sharpen"]).unwrap();
/// assert_eq!(out, image);
///
/// assert!(filter_chain_serial(&image, &["gaussian", "not_a_filter"]).is_err());
/// ```
pub fn filter_chain_serial<const C: usize, S: AsRef<str>>(
    src: &Image<C>,
    names: &[S],
) -> Result<Image<C>, FilterError> {
    let kernels = resolve(names)?;

    let mut current = src.clone();
    for kernel in &kernels {
        log::debug!("chain step: {}", kernel.name());
        current = filter_serial(&current, kernel);
    }

    Ok(current)
}

/// Apply a sequence of named kernels in order, each step in parallel.
///
/// Equal to [`filter_chain_serial`] for every configuration.
pub fn filter_chain_parallel<const C: usize, S: AsRef<str>>(
    src: &Image<C>,
    names: &[S],
    config: &FilterConfig,
) -> Result<Image<C>, FilterError> {
    let kernels = resolve(names)?;

    let mut current = src.clone();
    for kernel in &kernels {
        log::debug!("chain step: {} ({})", kernel.name(), config.schedule);
        current = filter_parallel(&current, kernel, config)?;
    }

    Ok(current)
}
