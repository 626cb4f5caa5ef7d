//! Image batch conversion, tiling, loading, and saving utilities.

mod convert;
mod grid;
mod load;
mod save;

pub use convert::{to_data, ToHost};
pub use grid::{grid_rows, merge_images};
pub use load::load_batch;
pub use save::save_grid;

use ndarray::{Array3, Array4};

/// Image batch in NCHW format (batch, channels, height, width).
/// Values are normalized to [-1, 1], the range generators consume and produce.
pub type ImageTensor = Array4<f32>;

/// Image batch in NCHW format with display values in [0, 255].
pub type ByteBatch = Array4<u8>;

/// Comparison grid in HWC format, ready for an image encoder.
pub type Grid = Array3<u8>;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;
