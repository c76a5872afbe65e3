pub mod color;
pub mod remover;

pub use color::{color_distance, reference_color, threshold};
pub use remover::BackgroundRemover;

use image::RgbaImage;

/// Highest accepted tolerance on the 0-100 scale.
pub const MAX_TOLERANCE: u8 = 100;

/// Tolerance used when nothing else was configured.
pub const DEFAULT_TOLERANCE: u8 = 30;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid tolerance: {0}, expected 0-100")]
    InvalidTolerance(u8),

    #[error("Mask size {mask_width}x{mask_height} does not match image size {width}x{height}")]
    MaskSizeMismatch {
        width: u32,
        height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}

/// Key out every pixel close to the color of pixel (0,0).
///
/// Shorthand for `BackgroundRemover::new().with_tolerance(tolerance).remove(image)`.
pub fn remove(image: &RgbaImage, tolerance: u8) -> Result<RgbaImage> {
    BackgroundRemover::new().with_tolerance(tolerance).remove(image)
}
