use parfilter_image::{GrayImage, ImageError, RgbImage};
use rayon::prelude::*;

/// Define the RGB weights for the grayscale conversion.
const RW: f32 = 0.299;
const GW: f32 = 0.587;
const BW: f32 = 0.114;

/// Convert an RGB image to grayscale using the formula:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
///
/// The result is rounded to the nearest integer and clamped to the max value
/// of `dst`.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use parfilter_image::{GrayImage, RgbImage};
/// use parfilter_imgproc::color::gray_from_rgb;
///
/// let image = RgbImage::new([2, 1].into(), vec![255, 255, 255, 255, 0, 0]).unwrap();
/// let mut gray = GrayImage::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_rgb(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[255, 76]);
/// ```
pub fn gray_from_rgb(src: &RgbImage, dst: &mut GrayImage) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let max_val = dst.max_val() as f32;

    src.as_slice()
        .par_chunks_exact(3)
        .zip(dst.as_slice_mut().par_iter_mut())
        .for_each(|(rgb, gray)| {
            let y = RW * rgb[0] as f32 + GW * rgb[1] as f32 + BW * rgb[2] as f32;
            *gray = y.round().min(max_val) as u8;
        });

    Ok(())
}

/// Convert a grayscale image to RGB by replicating the sample into every
/// channel.
///
/// The output keeps the max value of the input.
pub fn rgb_from_gray(src: &GrayImage) -> Result<RgbImage, ImageError> {
    let data = src.as_slice().iter().flat_map(|&v| [v, v, v]).collect();
    RgbImage::with_max_val(src.size(), src.max_val(), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_from_rgb_weights() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = RgbImage::new([4, 1].into(), vec![
            0, 0, 0,
            0, 255, 0,
            0, 0, 255,
            100, 100, 100,
        ])?;
        let mut gray = GrayImage::from_size_val(image.size(), 0)?;
        gray_from_rgb(&image, &mut gray)?;
        assert_eq!(gray.as_slice(), &[0, 150, 29, 100]);
        Ok(())
    }

    #[test]
    fn gray_from_rgb_size_mismatch() -> Result<(), ImageError> {
        let image = RgbImage::from_size_val([2, 2].into(), 0)?;
        let mut gray = GrayImage::from_size_val([2, 3].into(), 0)?;
        assert_eq!(
            gray_from_rgb(&image, &mut gray),
            Err(ImageError::InvalidImageSize(2, 2, 2, 3))
        );
        Ok(())
    }

    #[test]
    fn rgb_from_gray_replicates() -> Result<(), ImageError> {
        let gray = GrayImage::with_max_val([2, 1].into(), 200, vec![7, 200])?;
        let rgb = rgb_from_gray(&gray)?;
        assert_eq!(rgb.as_slice(), &[7, 7, 7, 200, 200, 200]);
        assert_eq!(rgb.max_val(), 200);
        Ok(())
    }
}
