pub mod export;
pub mod params;
pub mod resize;
pub mod session;
pub mod shared;
pub mod staged;

pub use export::{ExportFormat, ExportOptions, ExportedImage};
pub use params::EditorParams;
pub use session::ImageSession;
pub use shared::SharedImageSession;
pub use staged::{RemoveJob, ResizeJob, StagedBuffer, StagedKind};

/// Raw RGBA8 raster, row-major, `width * height * 4` bytes.
pub type PixelBuffer = image::RgbaImage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid dimension: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    #[error("Image is empty")]
    EmptyImage,

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Invalid tolerance: {0}, expected 0-100")]
    InvalidTolerance(u8),

    #[error("Invalid quality: {0}, expected 0-100")]
    InvalidQuality(u8),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Staged result belongs to an outdated session state")]
    StaleResult,

    #[error("Session lock poisoned")]
    Poisoned,

    #[error("Image resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Image buffer error: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Background remover error: {0}")]
    Remover(#[from] background_remover::Error),
}
