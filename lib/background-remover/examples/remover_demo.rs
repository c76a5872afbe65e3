use anyhow::{Context, Result};
use background_remover::BackgroundRemover;
use image::{Rgba, RgbaImage};
use std::{fs, path::PathBuf, time::Instant};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let output_dir = PathBuf::from("./output");
    if !output_dir.exists() {
        fs::create_dir(&output_dir)?;
    }

    // green screen with a red disc in the middle
    let img = RgbaImage::from_fn(640, 480, |x, y| {
        let (dx, dy) = (x as i64 - 320, y as i64 - 240);
        if dx * dx + dy * dy < 150 * 150 {
            Rgba([200, 30, 30, 255])
        } else {
            Rgba([20, (200 + (x % 20)) as u8, 40, 255])
        }
    });
    log::info!("Image size: {}x{}", img.width(), img.height());

    for tolerance in [0, 10, 30, 60, 100] {
        let remover = BackgroundRemover::new().with_tolerance(tolerance);

        let start = Instant::now();
        let (result, mask) = remover.remove_with_mask(&img)?;
        log::info!("Tolerance {tolerance}: remove background spent {:?}", start.elapsed());

        let output_path = output_dir.join(format!("chroma_key_{tolerance}.png"));
        result
            .save(&output_path)
            .with_context(|| output_path.to_string_lossy().to_string())?;
        log::info!("Saving result to: {:?}", output_path);

        let mask_path = output_dir.join(format!("mask_{tolerance}.png"));
        mask.save(&mask_path)?;
        log::info!("Saving mask to: {:?}", mask_path);
    }

    Ok(())
}
