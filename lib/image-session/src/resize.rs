use crate::{Error, PixelBuffer, Result};
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image as FrImage,
};

/// Largest target size in pixels, 16384x16384 or 1 GiB of RGBA.
pub const MAX_PIXELS: u64 = 16384 * 16384;

/// Rejects empty targets and targets whose RGBA buffer exceeds [`MAX_PIXELS`].
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }

    match (width as u64).checked_mul(height as u64) {
        Some(pixels) if pixels <= MAX_PIXELS => Ok(()),
        _ => Err(Error::InvalidDimension { width, height }),
    }
}

/// Resample `image` to `width`x`height` with a Lanczos3 convolution.
///
/// Alpha is premultiplied during filtering so transparent edges do not bleed.
pub fn lanczos_resize(image: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer> {
    validate_dimensions(width, height)?;

    let (src_width, src_height) = image.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(Error::EmptyImage);
    }

    if (src_width, src_height) == (width, height) {
        return Ok(image.clone());
    }

    let src_image =
        FrImage::from_vec_u8(src_width, src_height, image.as_raw().clone(), PixelType::U8x4)?;
    let mut dst_image = FrImage::new(width, height, PixelType::U8x4);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    Resizer::new().resize(&src_image, &mut dst_image, &options)?;

    PixelBuffer::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| Error::ImageProcessing("Failed to create resized image".to_string()))
}

/// Height matching `width` under `aspect_ratio` (width / height), never 0.
pub fn height_for_width(width: u32, aspect_ratio: f64) -> u32 {
    ((width as f64 / aspect_ratio).round() as u32).max(1)
}

/// Width matching `height` under `aspect_ratio` (width / height), never 0.
pub fn width_for_height(height: u32, aspect_ratio: f64) -> u32 {
    ((height as f64 * aspect_ratio).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_resize_exact_size() -> Result<()> {
        let img = PixelBuffer::from_pixel(10, 6, Rgba([10, 20, 30, 255]));

        for (w, h) in [(1, 1), (3, 7), (20, 12), (10, 6), (33, 2)] {
            let out = lanczos_resize(&img, w, h)?;
            assert_eq!(out.dimensions(), (w, h));
            assert_eq!(out.as_raw().len(), (w * h * 4) as usize);
        }
        Ok(())
    }

    #[test]
    fn test_resize_solid_color_stays_solid() -> Result<()> {
        let img = PixelBuffer::from_pixel(8, 8, Rgba([200, 100, 50, 255]));
        let out = lanczos_resize(&img, 5, 13)?;

        for pixel in out.pixels() {
            assert!(pixel[0].abs_diff(200) <= 1);
            assert!(pixel[1].abs_diff(100) <= 1);
            assert!(pixel[2].abs_diff(50) <= 1);
            assert!(pixel[3] >= 254);
        }
        Ok(())
    }

    #[test]
    fn test_resize_rejects_zero() {
        let img = PixelBuffer::new(4, 4);

        assert!(matches!(
            lanczos_resize(&img, 0, 100),
            Err(Error::InvalidDimension { width: 0, height: 100 })
        ));
        assert!(matches!(
            lanczos_resize(&img, 100, 0),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_validate_dimensions_cap() {
        assert!(validate_dimensions(16384, 16384).is_ok());
        assert!(validate_dimensions(1, 1).is_ok());
        assert!(validate_dimensions(16384, 16385).is_err());
        assert!(validate_dimensions(u32::MAX, 2).is_err());
        assert!(validate_dimensions(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn test_aspect_helpers() {
        assert_eq!(height_for_width(1024, 16.0 / 9.0), 576);
        assert_eq!(height_for_width(100, 3.0), 33);
        assert_eq!(height_for_width(1, 1000.0), 1);
        assert_eq!(width_for_height(480, 4.0 / 3.0), 640);
    }
}
