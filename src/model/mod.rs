//! Model-facing interfaces: modes, devices, gradient scopes, parameters.

mod device;
mod grad;
mod onnx;

pub use device::Device;
pub use grad::{is_grad_enabled, no_grad, NoGradGuard};
pub use onnx::OnnxGenerator;

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use ndarray::ArrayD;

use crate::error::Result;
use crate::image::ImageTensor;

/// Named model weights, ordered by parameter name.
pub type ParameterSet = BTreeMap<String, ArrayD<f32>>;

/// Whether a model behaves as during training or as during inference.
///
/// Eval disables stochastic layers such as dropout and freezes batch-norm
/// statistics in frameworks that have them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

/// An image-to-image translation model.
pub trait Generator {
    /// Current mode.
    fn mode(&self) -> Mode;

    /// Switch between training and evaluation behaviour.
    fn set_mode(&mut self, mode: Mode);

    /// Translate an NCHW batch in [-1, 1], running on `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn forward(&mut self, input: &ImageTensor, device: Device) -> Result<ImageTensor>;
}

/// A model whose parameters can be read out for persistence.
pub trait StateDict {
    /// Snapshot of the current parameters. Never mutates the model.
    fn state_dict(&self) -> ParameterSet;
}

/// Puts a generator into eval mode and returns it to train mode on drop.
///
/// The restore runs on every exit path, including `?` returns and panics.
pub struct ModeGuard<'a, G: Generator + ?Sized> {
    model: &'a mut G,
}

impl<'a, G: Generator + ?Sized> ModeGuard<'a, G> {
    /// Switch `model` to [`Mode::Eval`] for the lifetime of the guard.
    pub fn eval(model: &'a mut G) -> Self {
        model.set_mode(Mode::Eval);
        Self { model }
    }
}

impl<G: Generator + ?Sized> Deref for ModeGuard<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.model
    }
}

impl<G: Generator + ?Sized> DerefMut for ModeGuard<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.model
    }
}

impl<G: Generator + ?Sized> Drop for ModeGuard<'_, G> {
    fn drop(&mut self) {
        self.model.set_mode(Mode::Train);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Identity {
        mode: Mode,
    }

    impl Generator for Identity {
        fn mode(&self) -> Mode {
            self.mode
        }

        fn set_mode(&mut self, mode: Mode) {
            self.mode = mode;
        }

        fn forward(&mut self, input: &ImageTensor, _device: Device) -> Result<ImageTensor> {
            Ok(input.clone())
        }
    }

    #[test]
    fn test_guard_switches_and_restores() {
        let mut model = Identity::default();
        {
            let guard = ModeGuard::eval(&mut model);
            assert_eq!(guard.mode(), Mode::Eval);
        }
        assert_eq!(model.mode(), Mode::Train);
    }

    #[test]
    fn test_guard_restores_train_from_eval() {
        let mut model = Identity { mode: Mode::Eval };
        drop(ModeGuard::eval(&mut model));
        assert_eq!(model.mode(), Mode::Train);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let mut model = Identity::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ModeGuard::eval(&mut model);
            panic!("inference blew up");
        }));

        assert!(result.is_err());
        assert_eq!(model.mode(), Mode::Train);
    }

    #[test]
    fn test_forward_through_guard() {
        let mut model = Identity::default();
        let input = ImageTensor::from_elem((1, 3, 2, 2), 0.25);

        let mut guard = ModeGuard::eval(&mut model);
        let output = guard.forward(&input, Device::Cpu).unwrap();

        assert_eq!(output, input);
    }
}
