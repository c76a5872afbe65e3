use crate::{
    DEFAULT_TOLERANCE, Error, MAX_TOLERANCE, Result,
    color::{color_distance, reference_color, threshold},
};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, RgbaImage};
use rayon::prelude::*;

const MASK_KEEP: u8 = 255;
const MASK_KEY: u8 = 0;

/// Flat single-color chroma-key.
///
/// Every pixel whose RGB distance to the color of pixel (0,0) is below
/// `tolerance * 2.55` gets alpha 0. RGB channels are never touched and
/// disconnected regions matching the key color are removed as well.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BackgroundRemover {
    /// 0-100
    #[derivative(Default(value = "DEFAULT_TOLERANCE"))]
    tolerance: u8,
}

impl BackgroundRemover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    fn validate(&self) -> Result<()> {
        if self.tolerance > MAX_TOLERANCE {
            return Err(Error::InvalidTolerance(self.tolerance));
        }

        Ok(())
    }

    // mask is grayscale (0=background, 255=foreground)
    pub fn get_mask(&self, image: &RgbaImage) -> Result<GrayImage> {
        self.validate()?;

        let (width, height) = image.dimensions();
        let Some(reference) = reference_color(image) else {
            return Ok(GrayImage::new(width, height));
        };

        let threshold = threshold(self.tolerance);
        let mask = image
            .as_raw()
            .par_chunks_exact(4)
            .map(|pixel| {
                if color_distance([pixel[0], pixel[1], pixel[2]], reference.0) < threshold {
                    MASK_KEY
                } else {
                    MASK_KEEP
                }
            })
            .collect::<Vec<u8>>();

        GrayImage::from_raw(width, height, mask)
            .ok_or_else(|| Error::ImageProcessing("Failed to create mask".to_string()))
    }

    pub fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        self.validate()?;

        let Some(reference) = reference_color(image) else {
            return Ok(image.clone());
        };

        let threshold = threshold(self.tolerance);
        let mut result = image.clone();
        let keyed: usize = result
            .par_chunks_exact_mut(4)
            .map(|pixel| {
                if color_distance([pixel[0], pixel[1], pixel[2]], reference.0) < threshold {
                    pixel[3] = 0;
                    1
                } else {
                    0
                }
            })
            .sum();

        log::debug!(
            "chroma-key {:?} tolerance {}: {} of {} pixels keyed out",
            reference.0,
            self.tolerance,
            keyed,
            image.width() as usize * image.height() as usize
        );

        Ok(result)
    }

    pub fn remove_with_mask(&self, image: &RgbaImage) -> Result<(RgbaImage, GrayImage)> {
        let mask = self.get_mask(image)?;
        let result = Self::remove_background(image, &mask)?;
        Ok((result, mask))
    }

    /// Zero the alpha of every pixel the mask marks as background.
    pub fn remove_background(image: &RgbaImage, mask: &GrayImage) -> Result<RgbaImage> {
        if image.dimensions() != mask.dimensions() {
            return Err(Error::MaskSizeMismatch {
                width: image.width(),
                height: image.height(),
                mask_width: mask.width(),
                mask_height: mask.height(),
            });
        }

        let mut result = image.clone();
        result
            .par_chunks_exact_mut(4)
            .zip(mask.as_raw().par_iter())
            .filter(|(_, mask_value)| **mask_value == MASK_KEY)
            .for_each(|(pixel, _)| pixel[3] = 0);

        Ok(result)
    }

    /// Undo a removal by handing back a fresh copy of the opaque baseline.
    pub fn restore(baseline: &RgbaImage) -> RgbaImage {
        baseline.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn red_corner_blue_rest() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(2, 2, BLUE);
        img.put_pixel(0, 0, RED);
        img
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 37 % 256) as u8, (y * 53 % 256) as u8, ((x + y) * 11 % 256) as u8, 255])
        })
    }

    #[test]
    fn test_all_white_fully_keyed() -> Result<()> {
        let img = RgbaImage::from_pixel(2, 2, WHITE);
        let out = BackgroundRemover::new().with_tolerance(10).remove(&img)?;

        assert!(out.pixels().all(|p| p[3] == 0));
        assert!(out.pixels().all(|p| p[0] == 255 && p[1] == 255 && p[2] == 255));
        Ok(())
    }

    #[test]
    fn test_only_corner_keyed() -> Result<()> {
        let img = red_corner_blue_rest();
        let out = BackgroundRemover::new().with_tolerance(10).remove(&img)?;

        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 0), BLUE);
        assert_eq!(*out.get_pixel(0, 1), BLUE);
        assert_eq!(*out.get_pixel(1, 1), BLUE);
        Ok(())
    }

    #[test]
    fn test_zero_tolerance_exact_match_only() -> Result<()> {
        let mut img = RgbaImage::from_pixel(3, 1, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([100, 100, 101, 255]));

        let out = BackgroundRemover::new().with_tolerance(0).remove(&img)?;

        // distance 0 is not below a threshold of 0
        assert!(out.pixels().all(|p| p[3] == 255));
        Ok(())
    }

    #[test]
    fn test_max_tolerance_saturates() -> Result<()> {
        let mut img = RgbaImage::from_pixel(4, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([254, 0, 0, 255]));
        img.put_pixel(2, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(3, 0, Rgba([255, 255, 255, 255]));

        let out = BackgroundRemover::new().with_tolerance(100).remove(&img)?;

        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(1, 0)[3], 0);
        assert_eq!(out.get_pixel(2, 0)[3], 255);
        assert_eq!(out.get_pixel(3, 0)[3], 255);
        Ok(())
    }

    #[test]
    fn test_rgb_and_existing_alpha_untouched() -> Result<()> {
        let mut img = gradient(16, 9);
        img.put_pixel(5, 5, Rgba([1, 2, 3, 77]));

        let out = BackgroundRemover::new().with_tolerance(20).remove(&img)?;

        for (src, dst) in img.pixels().zip(out.pixels()) {
            assert_eq!(src.0[0..3], dst.0[0..3]);
            assert!(dst[3] == src[3] || dst[3] == 0);
        }
        Ok(())
    }

    #[test]
    fn test_disconnected_regions_keyed() -> Result<()> {
        let mut img = RgbaImage::from_pixel(5, 5, BLUE);
        img.put_pixel(0, 0, WHITE);
        img.put_pixel(4, 4, WHITE);
        img.put_pixel(2, 2, WHITE);

        let out = BackgroundRemover::new().with_tolerance(5).remove(&img)?;

        assert_eq!(out.get_pixel(2, 2)[3], 0);
        assert_eq!(out.get_pixel(4, 4)[3], 0);
        assert_eq!(out.get_pixel(1, 1)[3], 255);
        Ok(())
    }

    #[test]
    fn test_remove_is_idempotent_on_baseline() -> Result<()> {
        let baseline = gradient(20, 10);
        let remover = BackgroundRemover::new().with_tolerance(40);

        let once = remover.remove(&baseline)?;
        let twice = remover.remove(&baseline)?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_restore_round_trip() -> Result<()> {
        let baseline = red_corner_blue_rest();
        let removed = BackgroundRemover::new().remove(&baseline)?;
        assert_ne!(removed, baseline);

        assert_eq!(BackgroundRemover::restore(&baseline), baseline);
        Ok(())
    }

    #[test]
    fn test_mask_matches_remove() -> Result<()> {
        let img = gradient(12, 12);
        let remover = BackgroundRemover::new().with_tolerance(35);

        let (with_mask, mask) = remover.remove_with_mask(&img)?;
        assert_eq!(with_mask, remover.remove(&img)?);
        assert_eq!(mask.dimensions(), img.dimensions());
        assert_eq!(mask.get_pixel(0, 0)[0], MASK_KEY);
        Ok(())
    }

    #[test]
    fn test_mask_size_mismatch() {
        let img = RgbaImage::new(2, 2);
        let mask = GrayImage::new(3, 2);

        assert!(matches!(
            BackgroundRemover::remove_background(&img, &mask),
            Err(Error::MaskSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_tolerance() {
        let img = red_corner_blue_rest();
        let remover = BackgroundRemover::new().with_tolerance(101);

        assert!(matches!(remover.remove(&img), Err(Error::InvalidTolerance(101))));
        assert!(matches!(remover.get_mask(&img), Err(Error::InvalidTolerance(101))));
    }

    #[test]
    fn test_empty_image() -> Result<()> {
        let img = RgbaImage::new(0, 0);
        let out = BackgroundRemover::new().remove(&img)?;

        assert_eq!(out.dimensions(), (0, 0));
        Ok(())
    }

    #[test]
    fn test_default_tolerance() {
        assert_eq!(BackgroundRemover::new().tolerance(), DEFAULT_TOLERANCE);
        assert_eq!(
            crate::remove(&red_corner_blue_rest(), 10)
                .ok()
                .map(|i| i.get_pixel(0, 0)[3]),
            Some(0)
        );
    }
}
