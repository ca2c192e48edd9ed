//! Image output: ASCII PPM and PNG.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ember_renderer::{color_to_rgb, ImageBuffer};

/// Write `image` as an ASCII (P3) PPM.
pub fn write_ppm<W: Write>(image: &ImageBuffer, gamma: bool, mut writer: W) -> io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for color in image.pixels() {
        let [r, g, b] = color_to_rgb(*color, gamma);
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    writer.flush()
}

/// Save `image` to `target`.
///
/// `-` writes a PPM to stdout; otherwise the format follows the file
/// extension (`.ppm` or `.png`).
pub fn save_image(image: &ImageBuffer, gamma: bool, target: &str) -> Result<()> {
    if target == "-" {
        let stdout = io::stdout();
        return write_ppm(image, gamma, BufWriter::new(stdout.lock()))
            .context("Failed to write image to stdout");
    }

    let path = Path::new(target);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("ppm") => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_ppm(image, gamma, BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Some("png") => {
            image::save_buffer(
                path,
                &image.to_rgb8(gamma),
                image.width,
                image.height,
                image::ColorType::Rgb8,
            )
            .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        _ => bail!("Unsupported output format for {} (expected .ppm or .png)", path.display()),
    }

    log::info!("Saved to {}", path.display());
    Ok(())
}
