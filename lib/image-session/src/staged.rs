//! Work that is computed away from the session and committed afterwards.
//!
//! A job owns a copy of its source buffer, so it can run on any thread while
//! the session stays usable. The resulting [`StagedBuffer`] carries the
//! generation it was computed from; committing it after the session moved on
//! fails with [`Error::StaleResult`](crate::Error::StaleResult). Dropping a
//! job or a staged buffer discards the work.

use crate::{PixelBuffer, Result, resize::lanczos_resize};
use background_remover::BackgroundRemover;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    Resize,
    RemoveBackground { tolerance: u8 },
}

/// A fully built replacement for the session's working buffer.
#[derive(Debug, Clone)]
pub struct StagedBuffer {
    pub(crate) generation: u64,
    pub(crate) kind: StagedKind,
    pub(crate) image: PixelBuffer,
}

impl StagedBuffer {
    pub fn kind(&self) -> StagedKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }
}

#[derive(Debug, Clone)]
pub struct ResizeJob {
    pub(crate) generation: u64,
    pub(crate) original: PixelBuffer,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl ResizeJob {
    pub fn run(&self) -> Result<StagedBuffer> {
        Ok(StagedBuffer {
            generation: self.generation,
            kind: StagedKind::Resize,
            image: render_resize(&self.original, self.width, self.height)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RemoveJob {
    pub(crate) generation: u64,
    pub(crate) baseline: PixelBuffer,
    pub(crate) tolerance: u8,
}

impl RemoveJob {
    pub fn run(&self) -> Result<StagedBuffer> {
        Ok(StagedBuffer {
            generation: self.generation,
            kind: StagedKind::RemoveBackground {
                tolerance: self.tolerance,
            },
            image: render_remove(&self.baseline, self.tolerance)?,
        })
    }
}

pub(crate) fn render_resize(
    original: &PixelBuffer,
    width: u32,
    height: u32,
) -> Result<PixelBuffer> {
    lanczos_resize(original, width, height)
}

pub(crate) fn render_remove(baseline: &PixelBuffer, tolerance: u8) -> Result<PixelBuffer> {
    Ok(BackgroundRemover::new()
        .with_tolerance(tolerance)
        .remove(baseline)?)
}
