#![deny(missing_docs)]
//! Pixel buffer types for grayscale and interleaved color images.

/// image representation as a flat row-major pixel buffer.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{GrayImage, Image, ImageSize, RgbImage, DEFAULT_MAX_VALUE};
