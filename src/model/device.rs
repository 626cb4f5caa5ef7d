//! Compute device selection.

use std::fmt;

use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};

/// Where a forward pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// Host CPU.
    #[default]
    Cpu,
    /// CUDA accelerator with the given device ordinal.
    Cuda { ordinal: i32 },
}

impl Device {
    /// The best device available right now: the first CUDA device if the
    /// CUDA execution provider can be used, otherwise the CPU.
    ///
    /// This queries the runtime on every call; callers decide whether to
    /// keep the answer.
    #[must_use]
    pub fn preferred() -> Self {
        match CUDAExecutionProvider::default().is_available() {
            Ok(true) => Self::Cuda { ordinal: 0 },
            Ok(false) => Self::Cpu,
            Err(err) => {
                tracing::debug!("CUDA availability check failed, using CPU: {err}");
                Self::Cpu
            }
        }
    }

    /// Whether this device is an accelerator rather than the host.
    #[must_use]
    pub const fn is_accelerator(&self) -> bool {
        matches!(self, Self::Cuda { .. })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda { ordinal } => write!(f, "cuda:{ordinal}"),
        }
    }
}
