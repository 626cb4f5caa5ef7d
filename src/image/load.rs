//! Loading fixed sample batches from image files.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};
use ndarray::{s, Array3};

use crate::error::{Error, Result};

use super::{ImageTensor, RGB_CHANNELS};

/// Load images from disk into one normalized batch.
///
/// Every image is:
/// 1. Loaded from its path
/// 2. Resized to `size` x `size`
/// 3. Converted to RGB if necessary
/// 4. Normalized to [-1, 1]
///
/// The batch is NCHW with shape `(paths.len(), 3, size, size)`, the layout
/// generators and [`super::merge_images`] expect. Typical use is building
/// the fixed X and Y batches that get translated at every sampling step.
///
/// # Errors
///
/// Returns an error if any image cannot be loaded, or if `size` is zero.
pub fn load_batch<P: AsRef<Path>>(paths: &[P], size: u32) -> Result<ImageTensor> {
    if size == 0 {
        return Err(Error::InvalidParameter {
            name: "size".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    let side = size as usize;
    let mut batch = ImageTensor::zeros((paths.len(), RGB_CHANNELS, side, side));

    for (idx, path) in paths.iter().enumerate() {
        let path = path.as_ref();

        let img = image::open(path).map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;

        batch
            .slice_mut(s![idx, .., .., ..])
            .assign(&image_to_tensor(&img, size));
    }

    tracing::debug!("Loaded batch of {} images at {size}x{size}", paths.len());

    Ok(batch)
}

/// Convert a `DynamicImage` to a normalized CHW tensor.
fn image_to_tensor(img: &DynamicImage, size: u32) -> Array3<f32> {
    let rgb = img.resize_exact(size, size, FilterType::Lanczos3).to_rgb8();

    let side = size as usize;
    let mut tensor = Array3::<f32>::zeros((RGB_CHANNELS, side, side));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..RGB_CHANNELS {
            // Normalize from [0, 255] to [-1, 1]
            tensor[[c, y, x]] = (f32::from(pixel[c]) / 127.5) - 1.0;
        }
    }

    tensor
}
