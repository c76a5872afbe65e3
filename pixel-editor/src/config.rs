use anyhow::{Context, Result, bail};
use derivative::Derivative;
use image_session::EditorParams;
use log::{debug, warn};
use once_cell::sync::Lazy;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(default)]
    pub editor: EditorSetting,

    #[serde(default)]
    pub export: ExportSetting,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct EditorSetting {
    #[derivative(Default(value = "30"))]
    pub tolerance: u8,

    #[derivative(Default(value = "90"))]
    pub quality: u8,

    #[derivative(Default(value = "false"))]
    pub maintain_aspect_ratio: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct ExportSetting {
    /// Empty means the working directory
    pub output_dir: String,

    #[derivative(Default(value = "false"))]
    pub preserve_transparency: bool,
}

impl Config {
    /// Resolves the config path, then loads it or writes the defaults.
    pub fn init(&mut self, config_path: Option<PathBuf>) -> Result<()> {
        self.config_path = match config_path {
            Some(path) => path,
            None => {
                let app_dirs = AppDirs::new(Some(APP_NAME), true)
                    .with_context(|| "no config directory on this platform")?;
                app_dirs.config_dir.join(format!("{APP_NAME}.toml"))
            }
        };

        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        self.load().with_context(|| "load config file failed")?;
        debug!("{:?}", self);
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let text = match fs::read_to_string(&self.config_path) {
            Ok(text) => text,
            Err(_) => return self.write_defaults(),
        };

        match toml::from_str::<Config>(&text) {
            Ok(mut c) => {
                c.config_path = self.config_path.clone();
                c.is_first_run = self.is_first_run;
                *self = c;
                Ok(())
            }
            Err(e) => {
                warn!("invalid config {}: {e}", self.config_path.display());

                if let Some(bak_file) = self.config_path.as_os_str().to_str() {
                    _ = fs::copy(&self.config_path, format!("{}.bak", bak_file));
                }

                self.write_defaults()
            }
        }
    }

    fn write_defaults(&mut self) -> Result<()> {
        self.is_first_run = true;

        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)?),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config from toml format failed. {e:?}")),
        }
    }

    /// Editor parameters, out of range values fall back to the defaults.
    pub fn params(&self) -> EditorParams {
        let mut params =
            EditorParams::new().with_maintain_aspect_ratio(self.editor.maintain_aspect_ratio);

        if let Err(e) = params.set_tolerance(self.editor.tolerance) {
            warn!("config: {e}");
        }

        if let Err(e) = params.set_quality(self.editor.quality) {
            warn!("config: {e}");
        }

        params
    }

    pub fn output_dir(&self) -> &Path {
        Path::new(&self.export.output_dir)
    }
}

/// Initializes the global configuration
///
/// This should be called once at application startup.
pub fn init(config_path: Option<PathBuf>) -> Result<()> {
    match CONFIG.lock() {
        Ok(mut config) => config.init(config_path),
        Err(_) => bail!("config lock poisoned"),
    }
}

/// Returns a clone of the current configuration
pub fn all() -> Config {
    match CONFIG.lock() {
        Ok(config) => config.clone(),
        Err(e) => e.into_inner().clone(),
    }
}

/// Saves a new configuration and updates the global instance
pub fn save(conf: Config) -> Result<()> {
    match CONFIG.lock() {
        Ok(mut config) => {
            *config = conf;
            config.save()
        }
        Err(_) => bail!("config lock poisoned"),
    }
}
