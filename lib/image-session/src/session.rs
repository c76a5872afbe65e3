use crate::{
    Error, PixelBuffer, Result,
    export::{self, ExportOptions, ExportedImage},
    params::{EditorParams, MAX_PERCENT},
    resize,
    staged::{RemoveJob, ResizeJob, StagedBuffer, StagedKind, render_remove, render_resize},
};
use image::{DynamicImage, ImageDecoder, ImageReader, metadata::Orientation};
use std::io::Cursor;

/// One loaded image and everything derived from it.
///
/// `current` is what gets shown and exported, `baseline` is the clean
/// snapshot of the last load/resize that background removal works from and
/// restore goes back to. Buffers are only ever replaced whole.
#[derive(Debug, Clone)]
pub struct ImageSession {
    original: PixelBuffer,
    current: PixelBuffer,
    baseline: PixelBuffer,
    background_removed: bool,
    params: EditorParams,
    generation: u64,
}

impl ImageSession {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let original = decode(bytes)?;

        log::info!("Loaded image {}x{}", original.width(), original.height());

        Ok(Self {
            current: original.clone(),
            baseline: original.clone(),
            original,
            background_removed: false,
            params: EditorParams::default(),
            generation: 0,
        })
    }

    pub fn with_params(mut self, params: EditorParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the image. Parameters are kept; on error nothing changes.
    pub fn reload(&mut self, bytes: &[u8]) -> Result<()> {
        let original = decode(bytes)?;

        log::info!("Reloaded image {}x{}", original.width(), original.height());

        self.current = original.clone();
        self.baseline = original.clone();
        self.original = original;
        self.background_removed = false;
        self.generation += 1;
        Ok(())
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    pub fn current(&self) -> &PixelBuffer {
        &self.current
    }

    pub fn baseline(&self) -> &PixelBuffer {
        &self.baseline
    }

    pub fn original_size(&self) -> (u32, u32) {
        self.original.dimensions()
    }

    pub fn current_size(&self) -> (u32, u32) {
        self.current.dimensions()
    }

    pub fn is_background_removed(&self) -> bool {
        self.background_removed
    }

    pub fn params(&self) -> &EditorParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut EditorParams {
        &mut self.params
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Native width / height.
    pub fn aspect_ratio(&self) -> f64 {
        let (width, height) = self.original_size();
        width as f64 / height as f64
    }

    pub fn height_for_width(&self, width: u32) -> u32 {
        resize::height_for_width(width, self.aspect_ratio())
    }

    pub fn width_for_height(&self, height: u32) -> u32 {
        resize::width_for_height(height, self.aspect_ratio())
    }

    /// Resample the original to `width`x`height`. Any removal is dropped.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let staged = self.stage_resize(width, height)?;
        self.commit(staged)
    }

    /// Resize keeping the native aspect ratio.
    pub fn resize_to_width(&mut self, width: u32) -> Result<()> {
        if width == 0 {
            return Err(Error::InvalidDimension { width, height: 0 });
        }

        self.resize(width, self.height_for_width(width))
    }

    /// Key out the background of the baseline and show the result.
    pub fn remove_background(&mut self, tolerance: u8) -> Result<()> {
        let staged = self.stage_remove(tolerance)?;
        self.commit(staged)
    }

    /// Key out the background using the tolerance in the parameters.
    pub fn remove_background_with_params(&mut self) -> Result<()> {
        self.remove_background(self.params.tolerance)
    }

    pub fn restore_background(&mut self) {
        self.current = self.baseline.clone();
        self.background_removed = false;
        self.generation += 1;
    }

    /// Back to the native image and default parameters.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        self.baseline = self.original.clone();
        self.background_removed = false;
        self.params.reset();
        self.generation += 1;

        log::info!("Reset to {}x{}", self.original.width(), self.original.height());
    }

    /// Encode `current`. A removed background is flattened onto white unless
    /// the options ask to preserve transparency.
    pub fn export(&self, options: &ExportOptions) -> Result<ExportedImage> {
        let (width, height) = self.current_size();
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }

        let flattened;
        let image = if self.background_removed && !options.preserve_transparency {
            flattened = export::composite_on_white(&self.current);
            &flattened
        } else {
            &self.current
        };

        let data = export::encode(image, options)?;
        let file_name = export::file_name(options.format);

        log::info!("Exported {file_name}: {width}x{height}, {} bytes", data.len());

        Ok(ExportedImage {
            data,
            format: options.format,
            file_name,
            width,
            height,
        })
    }

    pub fn export_with_params(&self) -> Result<ExportedImage> {
        self.export(&ExportOptions::new().with_quality(self.params.quality))
    }

    pub fn resize_job(&self, width: u32, height: u32) -> Result<ResizeJob> {
        validate_dimension(width, height)?;

        Ok(ResizeJob {
            generation: self.generation,
            original: self.original.clone(),
            width,
            height,
        })
    }

    pub fn remove_job(&self, tolerance: u8) -> Result<RemoveJob> {
        validate_tolerance(tolerance)?;

        Ok(RemoveJob {
            generation: self.generation,
            baseline: self.baseline.clone(),
            tolerance,
        })
    }

    pub fn stage_resize(&self, width: u32, height: u32) -> Result<StagedBuffer> {
        validate_dimension(width, height)?;

        Ok(StagedBuffer {
            generation: self.generation,
            kind: StagedKind::Resize,
            image: render_resize(&self.original, width, height)?,
        })
    }

    pub fn stage_remove(&self, tolerance: u8) -> Result<StagedBuffer> {
        validate_tolerance(tolerance)?;

        Ok(StagedBuffer {
            generation: self.generation,
            kind: StagedKind::RemoveBackground { tolerance },
            image: render_remove(&self.baseline, tolerance)?,
        })
    }

    /// Swap a staged buffer in. Stale results are rejected untouched.
    pub fn commit(&mut self, staged: StagedBuffer) -> Result<()> {
        if staged.generation != self.generation {
            log::debug!(
                "discard staged {:?}: generation {} != {}",
                staged.kind,
                staged.generation,
                self.generation
            );
            return Err(Error::StaleResult);
        }

        match staged.kind {
            StagedKind::Resize => {
                log::debug!("Resized to {}x{}", staged.image.width(), staged.image.height());

                self.baseline = staged.image.clone();
                self.current = staged.image;
                self.background_removed = false;
            }
            StagedKind::RemoveBackground { tolerance } => {
                self.current = staged.image;
                self.params.tolerance = tolerance;
                self.background_removed = true;
            }
        }

        self.generation += 1;
        Ok(())
    }
}

// EXIF orientation is applied so rotated camera photos load upright.
fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::Decode(e.to_string()))?
        .into_decoder()
        .map_err(|e| Error::Decode(e.to_string()))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image =
        DynamicImage::from_decoder(decoder).map_err(|e| Error::Decode(e.to_string()))?;
    image.apply_orientation(orientation);
    let image = image.to_rgba8();

    if image.width() == 0 || image.height() == 0 {
        return Err(Error::Decode(format!(
            "zero sized image: {}x{}",
            image.width(),
            image.height()
        )));
    }

    Ok(image)
}

fn validate_dimension(width: u32, height: u32) -> Result<()> {
    resize::validate_dimensions(width, height)
}

fn validate_tolerance(tolerance: u8) -> Result<()> {
    if tolerance > MAX_PERCENT {
        return Err(Error::InvalidTolerance(tolerance));
    }

    Ok(())
}
