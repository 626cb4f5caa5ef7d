//! # `cyclegan-utils`
//!
//! Helpers that sit next to a `CycleGAN` training loop: persisting the two
//! generators and two discriminators, turning normalized batches into byte
//! images, tiling source/translation pairs into comparison grids, and writing
//! those grids to disk at sampling checkpoints.
//!
//! Models stay outside this crate. Anything that implements [`Generator`]
//! (and [`StateDict`] for checkpointing) can be plugged in; an ONNX Runtime
//! backed [`OnnxGenerator`] is provided for exported generators.
//!
//! ## Example
//!
//! ```no_run
//! use cyclegan_utils::{image, save_samples, Device, OnnxGenerator, SampleConfig};
//!
//! # fn main() -> cyclegan_utils::Result<()> {
//! let device = Device::preferred();
//! let mut g_x_to_y = OnnxGenerator::load("G_XtoY.onnx", device)?;
//! let mut g_y_to_x = OnnxGenerator::load("G_YtoX.onnx", device)?;
//!
//! let fixed_x = image::load_batch(&["x/0.png", "x/1.png", "x/2.png", "x/3.png"], 128)?;
//! let fixed_y = image::load_batch(&["y/0.png", "y/1.png", "y/2.png", "y/3.png"], 128)?;
//!
//! let config = SampleConfig { batch_size: 4, ..SampleConfig::default() };
//! save_samples(100, &fixed_y, &fixed_x, &mut g_y_to_x, &mut g_x_to_y, device, &config)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod model;
pub mod training;

pub use error::{Error, Result};
pub use model::{Device, Generator, Mode, OnnxGenerator, ParameterSet, StateDict};
pub use training::{
    checkpoint, load_checkpoint, save_samples, Checkpoint, SampleConfig, SamplePaths,
};
