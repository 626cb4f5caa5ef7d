//! Custom error types for cyclegan-utils.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the cyclegan-utils library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Grid dimensions are not supported by the image encoder.
    #[error("unsupported image dimensions {width}x{height}: {reason}")]
    UnsupportedDimensions {
        width: usize,
        height: usize,
        reason: String,
    },

    /// Failed to write a parameter file.
    #[error("failed to save checkpoint to {path}: {source}")]
    CheckpointSave {
        path: PathBuf,
        #[source]
        source: safetensors::SafeTensorError,
    },

    /// A parameter file could not be read back.
    #[error("failed to load checkpoint from {path}: {reason}")]
    CheckpointLoad { path: PathBuf, reason: String },

    /// Failed to create the sample output directory.
    #[error("failed to create sample directory {path}: {source}")]
    SampleDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load an ONNX model.
    #[error("failed to load ONNX model {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },

    /// Model inference failed.
    #[error("model inference failed: {source}")]
    Inference {
        #[source]
        source: ort::Error,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shape mismatch in tensor operations.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

/// Result type alias for cyclegan-utils operations.
pub type Result<T> = std::result::Result<T, Error>;
