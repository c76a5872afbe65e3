use crate::{Error, Result};
use derivative::Derivative;
use derive_setters::Setters;

pub const DEFAULT_TOLERANCE: u8 = background_remover::DEFAULT_TOLERANCE;
pub const DEFAULT_QUALITY: u8 = 90;
pub const MAX_PERCENT: u8 = 100;

/// Parameters a front end exposes next to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EditorParams {
    /// Chroma-key tolerance, 0-100
    #[derivative(Default(value = "DEFAULT_TOLERANCE"))]
    pub tolerance: u8,

    /// Export quality in percent
    #[derivative(Default(value = "DEFAULT_QUALITY"))]
    pub quality: u8,

    /// Derive the height from the width when resizing
    #[derivative(Default(value = "false"))]
    pub maintain_aspect_ratio: bool,
}

impl EditorParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tolerance(&mut self, tolerance: u8) -> Result<()> {
        if tolerance > MAX_PERCENT {
            return Err(Error::InvalidTolerance(tolerance));
        }

        self.tolerance = tolerance;
        Ok(())
    }

    pub fn set_quality(&mut self, quality: u8) -> Result<()> {
        if quality > MAX_PERCENT {
            return Err(Error::InvalidQuality(quality));
        }

        self.quality = quality;
        Ok(())
    }

    /// Tolerance and quality go back to their defaults, aspect locking is kept.
    pub fn reset(&mut self) {
        self.tolerance = DEFAULT_TOLERANCE;
        self.quality = DEFAULT_QUALITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = EditorParams::new();
        assert_eq!(params.tolerance, 30);
        assert_eq!(params.quality, 90);
        assert!(!params.maintain_aspect_ratio);
    }

    #[test]
    fn test_setters_validate() {
        let mut params = EditorParams::new();

        assert!(params.set_tolerance(100).is_ok());
        assert!(matches!(params.set_tolerance(101), Err(Error::InvalidTolerance(101))));
        assert_eq!(params.tolerance, 100);

        assert!(params.set_quality(0).is_ok());
        assert!(matches!(params.set_quality(200), Err(Error::InvalidQuality(200))));
        assert_eq!(params.quality, 0);
    }

    #[test]
    fn test_reset_keeps_aspect_lock() {
        let mut params = EditorParams::new()
            .with_tolerance(70)
            .with_quality(10)
            .with_maintain_aspect_ratio(true);

        params.reset();

        assert_eq!(params.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(params.quality, DEFAULT_QUALITY);
        assert!(params.maintain_aspect_ratio);
    }
}
