use image::{Rgb, RgbaImage};

/// Scale factor from the 0-100 tolerance slider to RGB distance units.
pub const TOLERANCE_SCALE: f64 = 2.55;

/// Background reference color: the RGB of pixel (0,0), its alpha ignored.
///
/// Returns `None` for an empty image.
pub fn reference_color(image: &RgbaImage) -> Option<Rgb<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    let pixel = image.get_pixel(0, 0);
    Some(Rgb([pixel[0], pixel[1], pixel[2]]))
}

/// Euclidean distance between two colors in RGB space.
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;

    (dr * dr + dg * dg + db * db).sqrt()
}

/// Distance below which a pixel counts as background.
///
/// Not clamped: at 100 the threshold is 255, well under the largest possible
/// distance (~441.67), so only strongly different colors survive.
pub fn threshold(tolerance: u8) -> f64 {
    tolerance as f64 * TOLERANCE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_reference_color_ignores_alpha() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([9, 9, 9, 255]));
        img.put_pixel(0, 0, Rgba([10, 20, 30, 0]));

        assert_eq!(reference_color(&img), Some(Rgb([10, 20, 30])));
    }

    #[test]
    fn test_reference_color_empty() {
        assert_eq!(reference_color(&RgbaImage::new(0, 0)), None);
    }

    #[test]
    fn test_color_distance() {
        assert_eq!(color_distance([1, 2, 3], [1, 2, 3]), 0.0);
        assert_eq!(color_distance([0, 0, 0], [3, 4, 0]), 5.0);
        assert_eq!(color_distance([0, 0, 0], [255, 0, 0]), 255.0);

        let d = color_distance([255, 0, 0], [0, 0, 255]);
        assert!((d - 360.624).abs() < 0.001);

        let max = color_distance([0, 0, 0], [255, 255, 255]);
        assert!((max - 441.673).abs() < 0.001);
    }

    #[test]
    fn test_threshold() {
        assert_eq!(threshold(0), 0.0);
        assert!((threshold(10) - 25.5).abs() < 1e-9);
        assert!((threshold(100) - 255.0).abs() < 1e-9);
    }
}
