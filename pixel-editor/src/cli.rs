use crate::command::Command;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Resize an image, key out its background and export it as PNG.
#[derive(Parser, Debug)]
#[command(name = "pixel-editor", version, about)]
pub struct Cli {
    /// Config file, defaults to the platform config directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Edit one image in a single pass
    Edit(EditArgs),

    /// Dispatch a command script, one command per line
    Run {
        /// Script file, stdin when omitted or `-`
        script: Option<PathBuf>,
    },

    /// Change the stored defaults
    Settings(SettingsArgs),
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Input image (PNG or JPEG)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Directory the result is written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Derive the missing side from the aspect ratio
    #[arg(long)]
    pub keep_aspect: bool,

    #[arg(short, long)]
    pub remove_background: bool,

    /// Chroma-key tolerance
    #[arg(short, long, value_name = "0-100", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub tolerance: Option<u8>,

    /// Export quality in percent
    #[arg(short, long, value_name = "0-100", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Keep keyed-out pixels transparent instead of flattening onto white
    #[arg(long)]
    pub preserve_transparency: bool,
}

impl EditArgs {
    /// The same edit expressed as editor commands.
    pub fn to_commands(&self) -> Vec<Command> {
        let mut commands = vec![];

        if self.keep_aspect {
            commands.push(Command::Aspect(true));
        }

        if let Some(tolerance) = self.tolerance {
            commands.push(Command::Tolerance(tolerance));
        }

        if let Some(quality) = self.quality {
            commands.push(Command::Quality(quality));
        }

        if self.preserve_transparency {
            commands.push(Command::Transparency(true));
        }

        commands.push(Command::Load(self.input.clone()));

        if self.width.is_some() || self.height.is_some() {
            commands.push(Command::Resize {
                width: self.width,
                height: self.height,
            });
        }

        if self.remove_background {
            commands.push(Command::RemoveBackground(None));
        }

        commands.push(Command::Export(self.output_dir.clone()));
        commands
    }
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[arg(long, value_name = "0-100", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub tolerance: Option<u8>,

    #[arg(long, value_name = "0-100", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    #[arg(long, value_name = "BOOL")]
    pub keep_aspect: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub preserve_transparency: Option<bool>,

    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,
}
