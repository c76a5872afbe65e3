use crate::{Error, ExportOptions, ExportedImage, ImageSession, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// A session that several callers can drive.
///
/// Every mutation happens under one lock. The pixel work of resize and
/// background removal runs outside of it and is committed afterwards, so a
/// concurrent reload or resize turns the late result into
/// [`Error::StaleResult`] instead of overwriting newer state.
#[derive(Debug, Clone)]
pub struct SharedImageSession {
    inner: Arc<Mutex<ImageSession>>,
}

impl SharedImageSession {
    pub fn new(session: ImageSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn load(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(ImageSession::load(bytes)?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ImageSession>> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    pub fn with<R>(&self, f: impl FnOnce(&ImageSession) -> R) -> Result<R> {
        Ok(f(&*self.lock()?))
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut ImageSession) -> R) -> Result<R> {
        Ok(f(&mut *self.lock()?))
    }

    pub fn reload(&self, bytes: &[u8]) -> Result<()> {
        self.lock()?.reload(bytes)
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<()> {
        let job = self.lock()?.resize_job(width, height)?;
        let staged = job.run()?;
        self.lock()?.commit(staged)
    }

    pub fn remove_background(&self, tolerance: u8) -> Result<()> {
        let job = self.lock()?.remove_job(tolerance)?;
        let staged = job.run()?;
        self.lock()?.commit(staged)
    }

    pub fn restore_background(&self) -> Result<()> {
        self.lock()?.restore_background();
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        self.lock()?.reset();
        Ok(())
    }

    pub fn export(&self, options: &ExportOptions) -> Result<ExportedImage> {
        self.lock()?.export(options)
    }
}
