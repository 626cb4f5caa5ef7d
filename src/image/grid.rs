//! Tiling of source/target pairs into a comparison grid.

use ndarray::{s, Array3, ArrayView4};

use crate::error::{Error, Result};

use super::RGB_CHANNELS;

/// Number of grid rows (and pairs per row) for a batch size.
///
/// This is `floor(sqrt(batch_size))`, so the grid holds `rows * rows` pairs.
#[must_use]
pub const fn grid_rows(batch_size: usize) -> usize {
    batch_size.isqrt()
}

/// Create a grid of source/target image pairs.
///
/// Both batches are NCHW with three channels and identical shapes. The grid
/// has `row = floor(sqrt(batch_size))` rows, each holding `row` pairs with
/// the source on the left and its target directly to the right. Pair `idx`
/// lands in row `idx / row`, pair column `idx % row`.
///
/// Pairs beyond `row * row` are dropped and unfilled cells keep
/// `T::default()`. The result is HWC with shape `(row * h, row * w * 2, 3)`.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the batches differ in shape or do not
/// have three channels.
pub fn merge_images<T: Copy + Default>(
    sources: ArrayView4<'_, T>,
    targets: ArrayView4<'_, T>,
    batch_size: usize,
) -> Result<Array3<T>> {
    if sources.shape() != targets.shape() {
        return Err(Error::ShapeMismatch {
            expected: format!("targets shaped like sources {:?}", sources.shape()),
            actual: format!("{:?}", targets.shape()),
        });
    }

    let (_, channels, h, w) = sources.dim();
    if channels != RGB_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: format!("{RGB_CHANNELS} channels"),
            actual: format!("{channels} channels"),
        });
    }

    let row = grid_rows(batch_size);
    let mut merged = Array3::<T>::from_elem((RGB_CHANNELS, row * h, row * w * 2), T::default());

    let pairs = sources.outer_iter().zip(targets.outer_iter());
    for (idx, (source, target)) in pairs.take(row * row).enumerate() {
        let i = idx / row;
        let j = idx % row;
        merged
            .slice_mut(s![.., i * h..(i + 1) * h, (j * 2) * w..(j * 2 + 1) * w])
            .assign(&source);
        merged
            .slice_mut(s![.., i * h..(i + 1) * h, (j * 2 + 1) * w..(j * 2 + 2) * w])
            .assign(&target);
    }

    // CHW -> HWC for the image encoder
    Ok(merged.permuted_axes([1, 2, 0]).as_standard_layout().into_owned())
}
