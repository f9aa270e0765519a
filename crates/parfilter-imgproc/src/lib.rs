#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
/// color conversion module.
pub mod color;

/// execution options shared by the parallel operations.
pub mod config;

/// image statistics module.
pub mod core;

/// convolution filtering module.
pub mod filter;

/// compute image histogram module.
pub mod histogram;

/// module containing parallization utilities.
pub mod parallel;
