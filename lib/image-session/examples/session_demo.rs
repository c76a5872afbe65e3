use anyhow::{Context, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use image_session::{ExportOptions, ImageSession};
use std::{fs, io::Cursor, path::PathBuf, time::Instant};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let output_dir = PathBuf::from("./output");
    if !output_dir.exists() {
        fs::create_dir(&output_dir)?;
    }

    // studio backdrop with a dark square subject
    let img = RgbaImage::from_fn(800, 600, |x, y| {
        if (250..550).contains(&x) && (150..450).contains(&y) {
            Rgba([40, 40, 60, 255])
        } else {
            Rgba([240, 240, 235, 255])
        }
    });
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;

    let mut session = ImageSession::load(bytes.get_ref())?;

    let start = Instant::now();
    session.resize_to_width(400)?;
    log::info!("Resize to {:?} spent: {:?}", session.current_size(), start.elapsed());

    let start = Instant::now();
    session.remove_background(30)?;
    log::info!("Remove background spent: {:?}", start.elapsed());

    for (suffix, options) in [
        ("white", ExportOptions::new()),
        ("transparent", ExportOptions::new().with_preserve_transparency(true)),
    ] {
        let exported = session.export(&options)?;
        let output_path = output_dir.join(format!("{suffix}_{}", exported.file_name));
        fs::write(&output_path, &exported.data)
            .with_context(|| output_path.to_string_lossy().to_string())?;
        log::info!("Saving result to: {:?}", output_path);
    }

    session.restore_background();
    log::info!("Restored, background removed: {}", session.is_background_removed());

    Ok(())
}
