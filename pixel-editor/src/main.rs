use anyhow::{Context, Result};
use clap::Parser;
use pixel_editor::{
    Editor,
    cli::{Cli, CliCommand, SettingsArgs},
    config,
};
use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
    process::ExitCode,
};

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    config::init(cli.config.clone())?;
    let conf = config::all();
    log::debug!("config file: {}", conf.config_path.display());

    let failures = match cli.command {
        CliCommand::Edit(args) => Editor::from_config(&conf).run_all(args.to_commands()),
        CliCommand::Run { script } => {
            let mut editor = Editor::from_config(&conf);

            match script.as_deref() {
                Some(path) if path != Path::new("-") => {
                    let file = File::open(path)
                        .with_context(|| format!("open script {} failed", path.display()))?;
                    editor.run_script(BufReader::new(file))
                }
                _ => editor.run_script(io::stdin().lock()),
            }
        }
        CliCommand::Settings(args) => {
            update_settings(args)?;
            0
        }
    };

    if failures > 0 {
        log::warn!("{failures} command(s) failed");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn update_settings(args: SettingsArgs) -> Result<()> {
    let mut conf = config::all();

    if let Some(tolerance) = args.tolerance {
        conf.editor.tolerance = tolerance;
    }

    if let Some(quality) = args.quality {
        conf.editor.quality = quality;
    }

    if let Some(keep_aspect) = args.keep_aspect {
        conf.editor.maintain_aspect_ratio = keep_aspect;
    }

    if let Some(preserve_transparency) = args.preserve_transparency {
        conf.export.preserve_transparency = preserve_transparency;
    }

    if let Some(output_dir) = args.output_dir {
        conf.export.output_dir = output_dir;
    }

    let path = conf.config_path.clone();
    config::save(conf)?;
    log::info!("Saved settings to {}", path.display());
    Ok(())
}
