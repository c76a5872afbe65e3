use crate::{command::Command, config::Config};
use image_session::{EditorParams, ExportOptions, ImageSession};
use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{BufRead, ErrorKind, Write},
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum EditorError {
    #[error("No image loaded")]
    NoImage,

    #[error("Resize needs a width and a height unless the aspect ratio is locked")]
    MissingDimension,

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Session(#[from] image_session::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub original_size: Option<(u32, u32)>,
    pub current_size: Option<(u32, u32)>,
    pub background_removed: bool,
    pub params: EditorParams,
    pub preserve_transparency: bool,
}

/// What a front end needs to show after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded { width: u32, height: u32 },
    Resized { width: u32, height: u32 },
    BackgroundRemoved { tolerance: u8 },
    BackgroundRestored,
    NothingToRestore,
    Exported { path: PathBuf, size: u64 },
    Reset { width: u32, height: u32 },
    Params(EditorParams),
    Transparency(bool),
    Info(Status),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Loaded { width, height } => write!(f, "loaded {width} × {height}"),
            Outcome::Resized { width, height } => write!(f, "resized to {width} × {height}"),
            Outcome::BackgroundRemoved { tolerance } => {
                write!(f, "background removed (tolerance {tolerance})")
            }
            Outcome::BackgroundRestored => write!(f, "background restored"),
            Outcome::NothingToRestore => write!(f, "nothing to restore"),
            Outcome::Exported { path, size } => write!(
                f,
                "exported {} ({})",
                path.display(),
                cutil::fs::pretty_bytes_size(*size)
            ),
            Outcome::Reset { width, height } => write!(f, "reset to {width} × {height}"),
            Outcome::Params(params) => write!(
                f,
                "tolerance {}, quality {}%, aspect ratio {}",
                params.tolerance,
                params.quality,
                if params.maintain_aspect_ratio { "locked" } else { "free" }
            ),
            Outcome::Transparency(on) => write!(f, "preserve transparency: {on}"),
            Outcome::Info(status) => {
                match (status.original_size, status.current_size) {
                    (Some((ow, oh)), Some((cw, ch))) => {
                        write!(f, "original {ow} × {oh}, current {cw} × {ch}")?
                    }
                    _ => write!(f, "no image")?,
                }
                write!(
                    f,
                    ", background removed: {}, tolerance {}, quality {}%",
                    status.background_removed, status.params.tolerance, status.params.quality
                )
            }
        }
    }
}

/// The command-driven side of the editor: at most one session, the
/// parameters to use before an image exists, and where exports go.
#[derive(Debug, Default)]
pub struct Editor {
    session: Option<ImageSession>,
    params: EditorParams,
    preserve_transparency: bool,
    output_dir: PathBuf,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            session: None,
            params: config.params(),
            preserve_transparency: config.export.preserve_transparency,
            output_dir: config.output_dir().to_path_buf(),
        }
    }

    pub fn session(&self) -> Option<&ImageSession> {
        self.session.as_ref()
    }

    pub fn params(&self) -> &EditorParams {
        match &self.session {
            Some(session) => session.params(),
            None => &self.params,
        }
    }

    fn params_mut(&mut self) -> &mut EditorParams {
        match &mut self.session {
            Some(session) => session.params_mut(),
            None => &mut self.params,
        }
    }

    /// Decides whether a front end offers "remove" or "restore".
    pub fn is_background_removed(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_background_removed())
    }

    pub fn status(&self) -> Status {
        Status {
            original_size: self.session.as_ref().map(|s| s.original_size()),
            current_size: self.session.as_ref().map(|s| s.current_size()),
            background_removed: self.is_background_removed(),
            params: *self.params(),
            preserve_transparency: self.preserve_transparency,
        }
    }

    fn loaded(&mut self) -> EditorResult<&mut ImageSession> {
        self.session.as_mut().ok_or(EditorError::NoImage)
    }

    pub fn dispatch(&mut self, command: Command) -> EditorResult<Outcome> {
        log::debug!("dispatch {command:?}");

        match command {
            Command::Load(path) => self.load(&path),
            Command::Resize { width, height } => self.resize(width, height),
            Command::RemoveBackground(tolerance) => {
                let tolerance = tolerance.unwrap_or(self.params().tolerance);
                self.loaded()?.remove_background(tolerance)?;
                Ok(Outcome::BackgroundRemoved { tolerance })
            }
            Command::RestoreBackground => match &mut self.session {
                Some(session) => {
                    session.restore_background();
                    Ok(Outcome::BackgroundRestored)
                }
                None => Ok(Outcome::NothingToRestore),
            },
            Command::Export(dir) => self.export(dir),
            Command::Reset => {
                let session = self.loaded()?;
                session.reset();
                let (width, height) = session.current_size();
                Ok(Outcome::Reset { width, height })
            }
            Command::Tolerance(tolerance) => {
                self.params_mut().set_tolerance(tolerance)?;
                Ok(Outcome::Params(*self.params()))
            }
            Command::Quality(quality) => {
                self.params_mut().set_quality(quality)?;
                Ok(Outcome::Params(*self.params()))
            }
            Command::Aspect(on) => {
                self.params_mut().maintain_aspect_ratio = on;
                Ok(Outcome::Params(*self.params()))
            }
            Command::Transparency(on) => {
                self.preserve_transparency = on;
                Ok(Outcome::Transparency(on))
            }
            Command::Info => Ok(Outcome::Info(self.status())),
        }
    }

    fn load(&mut self, path: &Path) -> EditorResult<Outcome> {
        let bytes = fs::read(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match &mut self.session {
            Some(session) => session.reload(&bytes)?,
            None => {
                let session = ImageSession::load(&bytes)?.with_params(self.params);
                self.session = Some(session);
            }
        }

        let (width, height) = self.loaded()?.original_size();
        log::info!("Loaded {}", path.display());
        Ok(Outcome::Loaded { width, height })
    }

    fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> EditorResult<Outcome> {
        let session = self.loaded()?;

        let (width, height) = if session.params().maintain_aspect_ratio {
            match (width, height) {
                (Some(width), _) => (width, session.height_for_width(width)),
                (None, Some(height)) => (session.width_for_height(height), height),
                (None, None) => return Err(EditorError::MissingDimension),
            }
        } else {
            match (width, height) {
                (Some(width), Some(height)) => (width, height),
                _ => return Err(EditorError::MissingDimension),
            }
        };

        session.resize(width, height)?;
        Ok(Outcome::Resized { width, height })
    }

    fn export(&mut self, dir: Option<PathBuf>) -> EditorResult<Outcome> {
        let dir = dir.unwrap_or_else(|| self.output_dir.clone());
        let options = ExportOptions::new()
            .with_quality(self.params().quality)
            .with_preserve_transparency(self.preserve_transparency);

        let exported = self.loaded()?.export(&options)?;

        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(&dir).map_err(|source| EditorError::Io {
                path: dir.clone(),
                source,
            })?;
        }

        let path = write_unique(&dir, &exported.file_name, &exported.data)?;

        Ok(Outcome::Exported {
            path,
            size: exported.data.len() as u64,
        })
    }

    /// Dispatch every command line of `reader` in order. A failing line is
    /// reported and skipped; the number of failures is returned.
    pub fn run_script(&mut self, reader: impl BufRead) -> usize {
        let mut failures = 0;

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("line {line_no}: read failed: {e}");
                    failures += 1;
                    break;
                }
            };

            let command = match Command::parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("line {line_no}: {e:#}");
                    failures += 1;
                    continue;
                }
            };

            failures += usize::from(!self.run(command));
        }

        failures
    }

    /// Dispatch commands in order, stopping nowhere. Returns the failures.
    pub fn run_all(&mut self, commands: impl IntoIterator<Item = Command>) -> usize {
        commands
            .into_iter()
            .filter(|command| !self.run(command.clone()))
            .count()
    }

    fn run(&mut self, command: Command) -> bool {
        match self.dispatch(command.clone()) {
            Ok(outcome) => {
                log::info!("{outcome}");
                true
            }
            Err(e) => {
                log::warn!("{command:?} failed: {e}");
                false
            }
        }
    }
}

// Never overwrites: a taken name gets a `_N` suffix before the extension.
fn write_unique(dir: &Path, file_name: &str, data: &[u8]) -> EditorResult<PathBuf> {
    let name = Path::new(file_name);
    let stem = name.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    let extension = name.extension().and_then(|s| s.to_str());

    for n in 0u32.. {
        let candidate = match (n, extension) {
            (0, _) => file_name.to_string(),
            (n, Some(ext)) => format!("{stem}_{n}.{ext}"),
            (n, None) => format!("{stem}_{n}"),
        };
        let path = dir.join(candidate);

        let file = OpenOptions::new().write(true).create_new(true).open(&path);
        match file {
            Ok(mut file) => {
                file.write_all(data).map_err(|source| EditorError::Io {
                    path: path.clone(),
                    source,
                })?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying next name", path.display());
            }
            Err(source) => return Err(EditorError::Io { path, source }),
        }
    }

    Err(EditorError::Io {
        path: dir.join(file_name),
        source: ErrorKind::AlreadyExists.into(),
    })
}
