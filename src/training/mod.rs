//! Checkpointing and sampling steps called from a training loop.

mod checkpoint;
mod samples;

pub use checkpoint::{
    checkpoint, load_checkpoint, load_state_dict, save_state_dict, Checkpoint,
    CHECKPOINT_EXTENSION, DEFAULT_CHECKPOINT_DIR,
};
pub use samples::{
    sample_path, save_samples, Direction, SampleConfig, SamplePaths, DEFAULT_SAMPLE_DIR,
};
