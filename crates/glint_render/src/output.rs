//! Writing rendered images to disk.
//!
//! Plain-text PPM is written by hand; every other format goes through the
//! `image` crate. Both share the same gamma and quantization.

use crate::error::{OutputError, OutputResult};
use crate::ImageBuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write an image as ASCII PPM (P3), top row first.
pub fn write_ppm<W: Write>(image: &ImageBuffer, mut writer: W) -> OutputResult<()> {
    check_size(image)?;

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }

    writer.flush()?;
    Ok(())
}

/// Save an image, picking the format from the file extension.
///
/// `.ppm` (any case) is written as ASCII PPM, anything else is encoded by
/// the `image` crate.
pub fn save(image: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let file = File::create(path)?;
        write_ppm(image, BufWriter::new(file))?;
    } else {
        check_size(image)?;
        let expected = image.width as usize * image.height as usize;
        let buffer = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
            .ok_or(OutputError::SizeMismatch {
                expected,
                actual: image.pixels.len(),
            })?;
        buffer.save(path)?;
    }

    log::info!("Wrote {}", path.display());
    Ok(())
}

fn check_size(image: &ImageBuffer) -> OutputResult<()> {
    let expected = image.width as usize * image.height as usize;
    if image.pixels.len() != expected {
        return Err(OutputError::SizeMismatch {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}
