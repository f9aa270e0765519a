//! Parallel convolution filters and reductions for 8-bit images.
//!
//! ```
//! use parfilter::image::GrayImage;
//! use parfilter::imgproc::{config::FilterConfig, filter};
//!
//! let image = GrayImage::from_size_val([8, 8].into(), 10).unwrap();
//! let kernel = filter::kernels::kernel_by_name("gaussian").unwrap();
//!
//! let out = filter::filter_parallel(&image, &kernel, &FilterConfig::default()).unwrap();
//! assert_eq!(out, image);
//! ```

#[doc(inline)]
pub use parfilter_image as image;

#[doc(inline)]
pub use parfilter_imgproc as imgproc;
