//! Grid saving utilities.

use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::error::{Error, Result};

use super::{Grid, RGB_CHANNELS};

/// Save an HWC byte grid as an image file.
///
/// The format is inferred from the extension; `jpg`/`jpeg` are encoded with
/// the given quality, everything else goes through the encoder registered for
/// that extension (PNG when the path has none).
///
/// # Arguments
///
/// * `grid` - HWC array with three channels
/// * `path` - Output file path
/// * `quality` - JPEG quality (1-100), ignored for other formats
///
/// # Errors
///
/// Returns an error if the grid is not three-channel, the extension has no
/// encoder, or encoding fails.
pub fn save_grid<P: AsRef<Path>>(grid: &Grid, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();

    let img = DynamicImage::ImageRgb8(grid_to_image(grid)?);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let mut output = std::fs::File::create(path)?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
            img.write_with_encoder(encoder)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        _ => {
            let format = image::ImageFormat::from_extension(&extension).ok_or_else(|| {
                Error::InvalidParameter {
                    name: "extension".to_string(),
                    reason: format!("no image encoder for .{extension}"),
                }
            })?;
            img.save_with_format(path, format)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }

    Ok(())
}

/// Copy an HWC grid into an RGB image buffer.
fn grid_to_image(grid: &Grid) -> Result<RgbImage> {
    let (height, width, channels) = grid.dim();
    if channels != RGB_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: format!("{RGB_CHANNELS} channels"),
            actual: format!("{channels} channels"),
        });
    }

    let too_large = |dim: usize| Error::UnsupportedDimensions {
        width,
        height,
        reason: format!("{dim} does not fit in u32"),
    };
    let w = u32::try_from(width).map_err(|_| too_large(width))?;
    let h = u32::try_from(height).map_err(|_| too_large(height))?;

    let raw: Vec<u8> = grid.iter().copied().collect();
    RgbImage::from_raw(w, h, raw).ok_or_else(|| Error::ShapeMismatch {
        expected: format!("{width}x{height}x{RGB_CHANNELS} bytes"),
        actual: format!("{} bytes", grid.len()),
    })
}
