//! Generators exported to ONNX and run through ONNX Runtime.

use std::path::{Path, PathBuf};

use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Error, Result};
use crate::image::{ImageTensor, ToHost};

use super::{Device, Generator, Mode};

/// A generator loaded from an ONNX export.
///
/// The exported graph is already an inference graph, so [`Mode`] is only
/// tracked, not applied. The session is rebuilt when a forward pass asks for
/// a different device than the one it was built for.
pub struct OnnxGenerator {
    path: PathBuf,
    session: Session,
    device: Device,
    mode: Mode,
}

impl OnnxGenerator {
    /// Load an exported generator for `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn load<P: AsRef<Path>>(path: P, device: Device) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let session = build_session(&path, device)?;

        Ok(Self {
            path,
            session,
            device,
            mode: Mode::Train,
        })
    }

    /// Path the model was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Device the current session runs on.
    #[must_use]
    pub const fn device(&self) -> Device {
        self.device
    }
}

impl Generator for OnnxGenerator {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn forward(&mut self, input: &ImageTensor, device: Device) -> Result<ImageTensor> {
        if device != self.device {
            tracing::debug!(
                "Moving {} from {} to {device}",
                self.path.display(),
                self.device
            );
            self.session = build_session(&self.path, device)?;
            self.device = device;
        }

        let input_value =
            Tensor::from_array(input.clone()).map_err(|source| Error::Inference { source })?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|source| Error::Inference { source })?;

        // Get first output
        let output = outputs
            .values()
            .next()
            .ok_or_else(|| Error::ShapeMismatch {
                expected: "translated batch output".to_string(),
                actual: "no output".to_string(),
            })?;

        Ok(output.to_host()?.into_owned())
    }
}

/// Build an inference session for `device`.
fn build_session(path: &Path, device: Device) -> Result<Session> {
    let model_error = |source| Error::ModelLoad {
        path: path.to_path_buf(),
        source,
    };

    let builder = Session::builder().map_err(model_error)?;

    let builder = match device {
        Device::Cpu => builder,
        Device::Cuda { ordinal } => builder
            .with_execution_providers([CUDAExecutionProvider::default()
                .with_device_id(ordinal)
                .build()])
            .map_err(model_error)?,
    };

    tracing::debug!("Loading {} on {device}", path.display());

    builder.commit_from_file(path).map_err(model_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxGenerator::load(dir.path().join("G_XtoY.onnx"), Device::Cpu);

        assert!(matches!(result, Err(Error::ModelLoad { .. })));
    }
}
