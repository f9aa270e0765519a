use crate::error::ImageError;

/// The default maximum sample value of an 8-bit image.
pub const DEFAULT_MAX_VALUE: u8 = 255;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use parfilter_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an 8-bit image as a flat row-major buffer.
///
/// Pixels are stored row by row and channels are interleaved, so the sample of
/// channel `c` at `(x, y)` lives at `(y * width + x) * CHANNELS + c`. Every
/// sample is bounded by [`Image::max_val`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image<const CHANNELS: usize> {
    size: ImageSize,
    max_val: u8,
    data: Vec<u8>,
}

/// A single channel grayscale image.
pub type GrayImage = Image<1>;

/// A three channel image with interleaved red, green and blue samples.
pub type RgbImage = Image<3>;

impl<const CHANNELS: usize> Image<CHANNELS> {
    /// Create a new image from pixel data with the default max value of 255.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use parfilter_image::{Image, ImageSize};
    ///
    /// let image = Image::<3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::with_max_val(size, DEFAULT_MAX_VALUE, data)
    }

    /// Create a new image from pixel data with an explicit max value.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidChannelShape`] if the data length does not
    /// match the size, or [`ImageError::SampleOutOfRange`] if any sample is
    /// larger than `max_val`.
    pub fn with_max_val(size: ImageSize, max_val: u8, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = size.area() * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        if let Some(&sample) = data.iter().find(|&&v| v > max_val) {
            return Err(ImageError::SampleOutOfRange(sample, max_val));
        }

        Ok(Self {
            size,
            max_val,
            data,
        })
    }

    /// Create a new image with the given size where every sample is `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use parfilter_image::{Image, ImageSize};
    ///
    /// let image = Image::<1>::from_size_val([4, 3].into(), 100).unwrap();
    ///
    /// assert_eq!(image.as_slice(), &[100u8; 12]);
    /// ```
    pub fn from_size_val(size: ImageSize, val: u8) -> Result<Self, ImageError> {
        Self::new(size, vec![val; size.area() * CHANNELS])
    }

    /// Allocate a zero-filled image with the same size and max value as `self`.
    pub fn zeros_like(&self) -> Self {
        Self {
            size: self.size,
            max_val: self.max_val,
            data: vec![0; self.data.len()],
        }
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Get the maximum sample value of the image.
    pub fn max_val(&self) -> u8 {
        self.max_val
    }

    /// Number of samples in a single row (`width * CHANNELS`).
    pub fn row_stride(&self) -> usize {
        self.size.width * CHANNELS
    }

    /// Total number of samples in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the samples as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get the samples as a mutable slice.
    ///
    /// Callers are responsible for keeping every sample within `max_val`.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the image and return its samples.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Get one row of samples.
    ///
    /// PRECONDITION: `y < height`.
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.row_stride();
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Get a sample with bounds checking.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::PixelIndexOutOfBounds`] or
    /// [`ImageError::ChannelIndexOutOfBounds`] for invalid coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use parfilter_image::{GrayImage, ImageError};
    ///
    /// let image = GrayImage::new([2, 1].into(), vec![7, 9]).unwrap();
    ///
    /// assert_eq!(image.get(1, 0, 0), Ok(9));
    /// assert_eq!(image.get(2, 0, 0), Err(ImageError::PixelIndexOutOfBounds(2, 0, 2, 1)));
    /// ```
    pub fn get(&self, x: usize, y: usize, ch: usize) -> Result<u8, ImageError> {
        let idx = self.checked_index(x, y, ch)?;
        Ok(self.data[idx])
    }

    /// Set a sample with bounds checking.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid coordinates or when `val` exceeds `max_val`.
    pub fn set(&mut self, x: usize, y: usize, ch: usize, val: u8) -> Result<(), ImageError> {
        if val > self.max_val {
            return Err(ImageError::SampleOutOfRange(val, self.max_val));
        }
        let idx = self.checked_index(x, y, ch)?;
        self.data[idx] = val;
        Ok(())
    }

    /// Get a sample without coordinate validation.
    ///
    /// Intended for hot loops whose bounds have been validated once up front.
    /// Panics if the computed index falls outside the buffer.
    #[inline]
    pub fn get_unchecked(&self, x: usize, y: usize, ch: usize) -> u8 {
        self.data[(y * self.size.width + x) * CHANNELS + ch]
    }

    /// Get a sample with clamp-to-edge boundary handling.
    ///
    /// Out-of-range coordinates are replaced by the nearest edge coordinate.
    ///
    /// PRECONDITION: the image is not empty.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize, ch: usize) -> u8 {
        let x = x.clamp(0, self.size.width as isize - 1) as usize;
        let y = y.clamp(0, self.size.height as isize - 1) as usize;
        self.get_unchecked(x, y, ch)
    }

    /// Extract a single channel as a grayscale image.
    ///
    /// # Errors
    ///
    /// If the channel index is out of bounds, an error is returned.
    pub fn channel(&self, channel: usize) -> Result<Image<1>, ImageError> {
        if channel >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(channel, CHANNELS));
        }

        let data = self
            .data
            .chunks_exact(CHANNELS)
            .map(|pixel| pixel[channel])
            .collect();

        Image::<1>::with_max_val(self.size, self.max_val, data)
    }

    /// Split the image into its channels.
    pub fn split_channels(&self) -> Result<Vec<Image<1>>, ImageError> {
        (0..CHANNELS).map(|ch| self.channel(ch)).collect()
    }

    fn checked_index(&self, x: usize, y: usize, ch: usize) -> Result<usize, ImageError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.size.width,
                self.size.height,
            ));
        }
        if ch >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, CHANNELS));
        }
        Ok((y * self.size.width + x) * CHANNELS + ch)
    }
}
