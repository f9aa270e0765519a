use thiserror::Error;

/// Errors raised while building or looking up a kernel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// No kernel is registered under the given name.
    #[error("unknown kernel: {0}")]
    UnknownKernel(String),

    /// The kernel size is not a positive odd number.
    #[error("kernel size must be odd and >= 1, got {0}")]
    InvalidSize(usize),

    /// The number of weights does not match `size * size`.
    #[error("kernel has {0} weights, expected {1}")]
    WeightCountMismatch(usize, usize),
}

/// A square convolution kernel with a normalization divisor.
///
/// The weights are stored row-major, so `at(kx, ky)` reads column `kx` of row
/// `ky`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f32>,
    size: usize,
    divisor: f32,
    name: String,
}

impl Kernel {
    /// Create a new kernel.
    ///
    /// # Arguments
    ///
    /// * `weights` - The `size * size` weights in row-major order.
    /// * `size` - The edge length of the kernel, odd and at least 1.
    /// * `divisor` - The normalization factor applied after the weighted sum.
    /// * `name` - A display name.
    ///
    /// The divisor is not validated; a zero divisor is a caller error.
    ///
    /// # Example
    ///
    /// ```
    /// use parfilter_imgproc::filter::kernels::Kernel;
    ///
    /// let kernel = Kernel::new(vec![1.0; 9], 3, 9.0, "mean").unwrap();
    /// assert_eq!(kernel.radius(), 1);
    /// assert_eq!(kernel.weight_sum(), 9.0);
    /// ```
    pub fn new(
        weights: Vec<f32>,
        size: usize,
        divisor: f32,
        name: impl Into<String>,
    ) -> Result<Self, KernelError> {
        if size == 0 || size % 2 == 0 {
            return Err(KernelError::InvalidSize(size));
        }
        if weights.len() != size * size {
            return Err(KernelError::WeightCountMismatch(weights.len(), size * size));
        }
        Ok(Self {
            weights,
            size,
            divisor,
            name: name.into(),
        })
    }

    /// Edge length of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Maximum offset from the center reached by the weights.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Normalization divisor.
    pub fn divisor(&self) -> f32 {
        self.divisor
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weights in row-major order.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at column `kx` and row `ky`.
    #[inline]
    pub fn at(&self, kx: usize, ky: usize) -> f32 {
        self.weights[ky * self.size + kx]
    }

    /// Sum of all weights before division.
    ///
    /// Kernels whose weight sum equals their divisor leave flat regions unchanged.
    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// A registered kernel: canonical name first, then its aliases.
struct CatalogEntry {
    names: &'static [&'static str],
    size: usize,
    divisor: f32,
    display: &'static str,
    weights: &'static [f32],
}

impl CatalogEntry {
    fn build(&self) -> Kernel {
        Kernel {
            weights: self.weights.to_vec(),
            size: self.size,
            divisor: self.divisor,
            name: self.display.to_string(),
        }
    }
}

#[rustfmt::skip]
const CATALOG: &[CatalogEntry] = &[
    // 3x3 kernels
    CatalogEntry {
        names: &["box_blur", "box_blur_3x3", "blur", "average"],
        size: 3, divisor: 9.0, display: "Box Blur 3x3",
        weights: &[
            1.0, 1.0, 1.0,
            1.0, 1.0, 1.0,
            1.0, 1.0, 1.0,
        ],
    },
    CatalogEntry {
        names: &["gaussian", "gaussian_blur", "gaussian_blur_3x3", "gaussian_3x3"],
        size: 3, divisor: 16.0, display: "Gaussian Blur 3x3",
        weights: &[
            1.0, 2.0, 1.0,
            2.0, 4.0, 2.0,
            1.0, 2.0, 1.0,
        ],
    },
    CatalogEntry {
        names: &["sharpen", "sharpen_3x3"],
        size: 3, divisor: 1.0, display: "Sharpen 3x3",
        weights: &[
             0.0, -1.0,  0.0,
            -1.0,  5.0, -1.0,
             0.0, -1.0,  0.0,
        ],
    },
    CatalogEntry {
        names: &["sharpen_strong", "strong_sharpen"],
        size: 3, divisor: 1.0, display: "Strong Sharpen 3x3",
        weights: &[
            -1.0, -1.0, -1.0,
            -1.0,  9.0, -1.0,
            -1.0, -1.0, -1.0,
        ],
    },
    CatalogEntry {
        names: &["sobel_x", "sobel_x_3x3", "sobelx"],
        size: 3, divisor: 1.0, display: "Sobel X",
        weights: &SOBEL_X,
    },
    CatalogEntry {
        names: &["sobel_y", "sobel_y_3x3", "sobely"],
        size: 3, divisor: 1.0, display: "Sobel Y",
        weights: &SOBEL_Y,
    },
    CatalogEntry {
        names: &["prewitt_x", "prewittx"],
        size: 3, divisor: 1.0, display: "Prewitt X",
        weights: &[
            -1.0, 0.0, 1.0,
            -1.0, 0.0, 1.0,
            -1.0, 0.0, 1.0,
        ],
    },
    CatalogEntry {
        names: &["prewitt_y", "prewitty"],
        size: 3, divisor: 1.0, display: "Prewitt Y",
        weights: &[
            -1.0, -1.0, -1.0,
             0.0,  0.0,  0.0,
             1.0,  1.0,  1.0,
        ],
    },
    CatalogEntry {
        names: &["laplacian", "laplacian_3x3"],
        size: 3, divisor: 1.0, display: "Laplacian",
        weights: &[
            0.0,  1.0, 0.0,
            1.0, -4.0, 1.0,
            0.0,  1.0, 0.0,
        ],
    },
    CatalogEntry {
        names: &["emboss", "emboss_3x3"],
        size: 3, divisor: 1.0, display: "Emboss",
        weights: &[
            -2.0, -1.0, 0.0,
            -1.0,  1.0, 1.0,
             0.0,  1.0, 2.0,
        ],
    },
    CatalogEntry {
        names: &["identity", "identity_3x3"],
        size: 3, divisor: 1.0, display: "Identity",
        weights: &[
            0.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 0.0,
        ],
    },
    // 5x5 kernels
    CatalogEntry {
        names: &["box_blur_5x5", "blur_5x5"],
        size: 5, divisor: 25.0, display: "Box Blur 5x5",
        weights: &[1.0; 25],
    },
    CatalogEntry {
        names: &["gaussian_5x5", "gaussian_blur_5x5"],
        size: 5, divisor: 256.0, display: "Gaussian Blur 5x5",
        weights: &[
            1.0,  4.0,  6.0,  4.0, 1.0,
            4.0, 16.0, 24.0, 16.0, 4.0,
            6.0, 24.0, 36.0, 24.0, 6.0,
            4.0, 16.0, 24.0, 16.0, 4.0,
            1.0,  4.0,  6.0,  4.0, 1.0,
        ],
    },
    CatalogEntry {
        names: &["unsharp_mask", "unsharp", "unsharp_mask_5x5"],
        size: 5, divisor: 256.0, display: "Unsharp Mask 5x5",
        weights: &[
            -1.0,  -4.0,  -6.0,  -4.0, -1.0,
            -4.0, -16.0, -24.0, -16.0, -4.0,
            -6.0, -24.0, 476.0, -24.0, -6.0,
            -4.0, -16.0, -24.0, -16.0, -4.0,
            -1.0,  -4.0,  -6.0,  -4.0, -1.0,
        ],
    },
    CatalogEntry {
        names: &["sobel_x_5x5"],
        size: 5, divisor: 1.0, display: "Sobel X 5x5",
        weights: &[
            -1.0,  -2.0, 0.0,  2.0, 1.0,
            -4.0,  -8.0, 0.0,  8.0, 4.0,
            -6.0, -12.0, 0.0, 12.0, 6.0,
            -4.0,  -8.0, 0.0,  8.0, 4.0,
            -1.0,  -2.0, 0.0,  2.0, 1.0,
        ],
    },
    CatalogEntry {
        names: &["sobel_y_5x5"],
        size: 5, divisor: 1.0, display: "Sobel Y 5x5",
        weights: &[
            -1.0, -4.0,  -6.0, -4.0, -1.0,
            -2.0, -8.0, -12.0, -8.0, -2.0,
             0.0,  0.0,   0.0,  0.0,  0.0,
             2.0,  8.0,  12.0,  8.0,  2.0,
             1.0,  4.0,   6.0,  4.0,  1.0,
        ],
    },
    CatalogEntry {
        names: &["log_5x5", "log", "laplacian_of_gaussian"],
        size: 5, divisor: 1.0, display: "LoG 5x5",
        weights: &[
             0.0,  0.0, -1.0,  0.0,  0.0,
             0.0, -1.0, -2.0, -1.0,  0.0,
            -1.0, -2.0, 16.0, -2.0, -1.0,
             0.0, -1.0, -2.0, -1.0,  0.0,
             0.0,  0.0, -1.0,  0.0,  0.0,
        ],
    },
];

/// Horizontal 3x3 Sobel operator, row-major.
#[rustfmt::skip]
pub const SOBEL_X: [f32; 9] = [
    -1.0, 0.0, 1.0,
    -2.0, 0.0, 2.0,
    -1.0, 0.0, 1.0,
];

/// Vertical 3x3 Sobel operator, row-major.
#[rustfmt::skip]
pub const SOBEL_Y: [f32; 9] = [
    -1.0, -2.0, -1.0,
     0.0,  0.0,  0.0,
     1.0,  2.0,  1.0,
];

/// Look up a kernel by name, ignoring ASCII case.
///
/// Every canonical name returned by [`list_kernels`] is accepted, as well as a
/// few aliases such as `blur` for `box_blur`.
///
/// # Errors
///
/// Returns [`KernelError::UnknownKernel`] if no kernel matches.
///
/// # Example
///
/// ```
/// use parfilter_imgproc::filter::kernels::{kernel_by_name, KernelError};
///
/// let kernel = kernel_by_name("Gaussian").unwrap();
/// assert_eq!(kernel.size(), 3);
/// assert_eq!(kernel.divisor(), 16.0);
///
/// assert_eq!(
///     kernel_by_name("not_a_filter"),
///     Err(KernelError::UnknownKernel("not_a_filter".to_string()))
/// );
/// ```
pub fn kernel_by_name(name: &str) -> Result<Kernel, KernelError> {
    let lower = name.to_ascii_lowercase();
    CATALOG
        .iter()
        .find(|entry| entry.names.contains(&lower.as_str()))
        .map(CatalogEntry::build)
        .ok_or_else(|| KernelError::UnknownKernel(name.to_string()))
}

/// Canonical names of all the registered kernels, 3x3 kernels first.
pub fn list_kernels() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.names[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_new_validates_size() {
        assert_eq!(
            Kernel::new(vec![1.0; 4], 2, 1.0, "even"),
            Err(KernelError::InvalidSize(2))
        );
        assert_eq!(
            Kernel::new(vec![], 0, 1.0, "empty"),
            Err(KernelError::InvalidSize(0))
        );
        assert_eq!(
            Kernel::new(vec![1.0; 8], 3, 1.0, "short"),
            Err(KernelError::WeightCountMismatch(8, 9))
        );
    }

    #[test]
    fn test_kernel_at_is_row_major() -> Result<(), KernelError> {
        let kernel = kernel_by_name("sobel_x")?;
        assert_eq!(kernel.at(0, 0), -1.0);
        assert_eq!(kernel.at(2, 1), 2.0);
        assert_eq!(kernel.at(0, 1), -2.0);
        assert_eq!(kernel.radius(), 1);
        Ok(())
    }

    #[test]
    fn test_lookup_is_case_insensitive() -> Result<(), KernelError> {
        assert_eq!(kernel_by_name("BOX_BLUR")?, kernel_by_name("box_blur")?);
        assert_eq!(kernel_by_name("Blur")?.name(), "Box Blur 3x3");
        assert_eq!(kernel_by_name("LoG")?.name(), "LoG 5x5");
        Ok(())
    }

    #[test]
    fn test_unknown_kernel() {
        assert_eq!(
            kernel_by_name("not_a_filter"),
            Err(KernelError::UnknownKernel("not_a_filter".to_string()))
        );
    }

    #[test]
    fn test_every_listed_kernel_resolves() -> Result<(), KernelError> {
        let names = list_kernels();
        assert_eq!(names.len(), 17);
        for name in names {
            let kernel = kernel_by_name(name)?;
            assert_eq!(kernel.size() % 2, 1);
            assert_eq!(kernel.weights().len(), kernel.size() * kernel.size());
        }
        Ok(())
    }

    #[test]
    fn test_smoothing_kernels_preserve_flat_regions() -> Result<(), KernelError> {
        for name in [
            "box_blur",
            "gaussian",
            "sharpen",
            "sharpen_strong",
            "identity",
            "box_blur_5x5",
            "gaussian_5x5",
            "unsharp_mask",
        ] {
            let kernel = kernel_by_name(name)?;
            assert_eq!(kernel.weight_sum(), kernel.divisor(), "{name}");
        }
        Ok(())
    }

    #[test]
    fn test_derivative_kernels_sum_to_zero() -> Result<(), KernelError> {
        for name in [
            "sobel_x",
            "sobel_y",
            "prewitt_x",
            "prewitt_y",
            "laplacian",
            "sobel_x_5x5",
            "sobel_y_5x5",
            "log_5x5",
        ] {
            assert_eq!(kernel_by_name(name)?.weight_sum(), 0.0, "{name}");
        }
        Ok(())
    }
}
