//! Writing side-by-side translation samples during training.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::image::{merge_images, save_grid, to_data, ByteBatch, ImageTensor};
use crate::model::{no_grad, Device, Generator, ModeGuard};

/// Directory samples are written to unless told otherwise.
pub const DEFAULT_SAMPLE_DIR: &str = "samples_cyclegan";

/// Settings for [`save_samples`].
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Batch size the grid is laid out for; the grid shows
    /// `floor(sqrt(batch_size))^2` pairs.
    pub batch_size: usize,

    /// Output directory, created on demand.
    pub sample_dir: PathBuf,

    /// Image file extension, which also selects the encoder.
    pub extension: String,

    /// JPEG quality (1-100), ignored for other formats.
    pub quality: u8,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            batch_size: 16,
            sample_dir: PathBuf::from(DEFAULT_SAMPLE_DIR),
            extension: "png".to_string(),
            quality: 95,
        }
    }
}

impl SampleConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidParameter {
                name: "batch_size".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.extension.is_empty() || !self.extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::InvalidParameter {
                name: "extension".to_string(),
                reason: "must be a non-empty alphanumeric extension without the dot".to_string(),
            });
        }

        if !(1..=100).contains(&self.quality) {
            return Err(Error::InvalidParameter {
                name: "quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        Ok(())
    }
}

/// Translation direction of a sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Originals from X next to their translations into Y.
    XToY,
    /// Originals from Y next to their translations into X.
    YToX,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XToY => write!(f, "X-Y"),
            Self::YToX => write!(f, "Y-X"),
        }
    }
}

/// Files written by one [`save_samples`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    pub x_to_y: PathBuf,
    pub y_to_x: PathBuf,
}

/// Path of the sample grid for `iteration`, e.g. `sample-000005-X-Y.png`.
#[must_use]
pub fn sample_path(dir: &Path, iteration: usize, direction: Direction, extension: &str) -> PathBuf {
    dir.join(format!("sample-{iteration:06}-{direction}.{extension}"))
}

/// Translate the fixed batches in both directions and save comparison grids.
///
/// Both generators are switched to eval mode and the forward passes run with
/// gradient tracking disabled. The originals and translations are converted
/// to bytes and tiled into an X-Y grid (X next to `G_XtoY(X)`) and a Y-X grid
/// (Y next to `G_YtoX(Y)`), written into `config.sample_dir`. The directory is
/// created if missing.
///
/// Both generators are back in train mode when this returns, whether it
/// succeeded or not.
///
/// # Errors
///
/// Returns an error if the config is invalid, a forward pass fails, the
/// batches cannot be tiled, or a grid cannot be written.
pub fn save_samples<GYX, GXY>(
    iteration: usize,
    fixed_y: &ImageTensor,
    fixed_x: &ImageTensor,
    g_y_to_x: &mut GYX,
    g_x_to_y: &mut GXY,
    device: Device,
    config: &SampleConfig,
) -> Result<SamplePaths>
where
    GYX: Generator + ?Sized,
    GXY: Generator + ?Sized,
{
    let mut g_x_to_y = ModeGuard::eval(g_x_to_y);
    let mut g_y_to_x = ModeGuard::eval(g_y_to_x);

    config.validate()?;

    let (fake_x, fake_y) = {
        let _no_grad = no_grad();
        let fake_x = g_y_to_x.forward(fixed_y, device)?;
        let fake_y = g_x_to_y.forward(fixed_x, device)?;
        (fake_x, fake_y)
    };

    let (x, fake_x) = (to_data(fixed_x)?, to_data(&fake_x)?);
    let (y, fake_y) = (to_data(fixed_y)?, to_data(&fake_y)?);

    fs::create_dir_all(&config.sample_dir).map_err(|source| Error::SampleDir {
        path: config.sample_dir.clone(),
        source,
    })?;

    let x_to_y = write_grid(&x, &fake_y, iteration, Direction::XToY, config)?;
    let y_to_x = write_grid(&y, &fake_x, iteration, Direction::YToX, config)?;

    Ok(SamplePaths { x_to_y, y_to_x })
}

fn write_grid(
    originals: &ByteBatch,
    translations: &ByteBatch,
    iteration: usize,
    direction: Direction,
    config: &SampleConfig,
) -> Result<PathBuf> {
    let merged = merge_images(originals.view(), translations.view(), config.batch_size)?;
    let path = sample_path(&config.sample_dir, iteration, direction, &config.extension);

    save_grid(&merged, &path, config.quality)?;
    tracing::info!("Saved {}", path.display());

    Ok(path)
}
