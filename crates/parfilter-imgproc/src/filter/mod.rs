//! Filter operations
//!
//! This module provides convolution filters over 8-bit images, executed
//! serially, row-parallel or tile-parallel with identical results.

use parfilter_image::ImageError;
use thiserror::Error;

use crate::parallel::ParallelError;

/// Filter kernels
pub mod kernels;

/// Convolution operations
mod convolution;
pub use convolution::*;

/// Tiled convolution
mod tiled;
pub use tiled::*;

/// Filter chains
mod chain;
pub use chain::*;

/// Errors raised by the filter operations.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    /// Kernel lookup or construction failed.
    #[error(transparent)]
    Kernel(#[from] kernels::KernelError),

    /// The output image could not be built.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The workers could not be set up.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// Tiles must be at least one pixel wide.
    #[error("invalid tile size: {0}")]
    InvalidTileSize(usize),
}
