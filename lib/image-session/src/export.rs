use crate::{Error, PixelBuffer, Result, params::DEFAULT_QUALITY, params::MAX_PERCENT};
use derivative::Derivative;
use derive_setters::Setters;
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use rayon::prelude::*;

const FILE_NAME_PREFIX: &str = "processed_image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Lossless, keeps alpha
    #[default]
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
        }
    }

    pub fn is_lossy(&self) -> bool {
        match self {
            ExportFormat::Png => false,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ExportOptions {
    #[derivative(Default(value = "ExportFormat::Png"))]
    pub format: ExportFormat,

    /// 0-100, only used by lossy formats
    #[derivative(Default(value = "DEFAULT_QUALITY"))]
    pub quality: u8,

    /// Keep keyed-out pixels transparent instead of flattening onto white
    #[derivative(Default(value = "false"))]
    pub preserve_transparency: bool,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub data: Vec<u8>,
    pub format: ExportFormat,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// `processed_image_<unix-millis>.<ext>`
pub fn file_name(format: ExportFormat) -> String {
    format!(
        "{}_{}.{}",
        FILE_NAME_PREFIX,
        cutil::time::timestamp_millis(),
        format.extension()
    )
}

/// Draw `image` over an opaque white canvas (source-over).
pub fn composite_on_white(image: &PixelBuffer) -> PixelBuffer {
    let mut result = image.clone();

    result.par_chunks_exact_mut(4).for_each(|pixel| {
        let alpha = pixel[3] as u32;
        for channel in pixel.iter_mut().take(3) {
            *channel = ((*channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
        pixel[3] = 255;
    });

    result
}

/// Encode `image` in the requested format. Nothing is returned on failure.
pub fn encode(image: &PixelBuffer, options: &ExportOptions) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }

    let quality = if options.quality > MAX_PERCENT {
        log::warn!("quality {} out of range, clamped to {MAX_PERCENT}", options.quality);
        MAX_PERCENT
    } else {
        options.quality
    };

    if !options.format.is_lossy() {
        log::debug!("quality {quality} ignored by lossless {:?}", options.format);
    }

    let mut data = Vec::new();
    match options.format {
        ExportFormat::Png => PngEncoder::new(&mut data)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| Error::Encode(e.to_string()))?,
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_file_name() {
        let name = file_name(ExportFormat::Png);
        let stamp = name
            .strip_prefix("processed_image_")
            .and_then(|s| s.strip_suffix(".png"))
            .unwrap();

        assert!(!stamp.is_empty());
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_composite_on_white() {
        let mut img = PixelBuffer::new(3, 1);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 128]));

        let out = composite_on_white(&img);

        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*out.get_pixel(2, 0), Rgba([127, 127, 127, 255]));
    }

    #[test]
    fn test_encode_png_keeps_alpha() {
        let mut img = PixelBuffer::from_pixel(4, 3, Rgba([1, 2, 3, 255]));
        img.put_pixel(0, 0, Rgba([1, 2, 3, 0]));

        let data = encode(&img, &ExportOptions::new()).unwrap();
        assert!(data.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(&data).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_encode_quality_is_inert_for_png() {
        let img = PixelBuffer::from_pixel(5, 5, Rgba([9, 8, 7, 255]));

        let low = encode(&img, &ExportOptions::new().with_quality(1)).unwrap();
        let high = encode(&img, &ExportOptions::new().with_quality(250)).unwrap();
        assert_eq!(low, high);
    }

    #[test]
    fn test_encode_empty() {
        assert!(matches!(
            encode(&PixelBuffer::new(0, 7), &ExportOptions::new()),
            Err(Error::EmptyImage)
        ));
    }

    #[test]
    fn test_format() {
        assert_eq!(ExportFormat::default().extension(), "png");
        assert_eq!(ExportFormat::Png.mime_type(), "image/png");
    }
}
