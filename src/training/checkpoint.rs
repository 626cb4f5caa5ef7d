//! Persisting generator and discriminator parameters.

use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};
use safetensors::{tensor::TensorView, Dtype, SafeTensors};

use crate::error::{Error, Result};
use crate::model::{ParameterSet, StateDict};

/// Directory the training loop checkpoints into unless told otherwise.
pub const DEFAULT_CHECKPOINT_DIR: &str = "checkpoints_cyclegan";

/// Extension of every parameter file.
pub const CHECKPOINT_EXTENSION: &str = "safetensors";

const G_X_TO_Y: &str = "G_XtoY";
const G_Y_TO_X: &str = "G_YtoX";
const D_X: &str = "D_X";
const D_Y: &str = "D_Y";

/// The four parameter sets of a `CycleGAN` checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub g_x_to_y: ParameterSet,
    pub g_y_to_x: ParameterSet,
    pub d_x: ParameterSet,
    pub d_y: ParameterSet,
}

/// Path of the parameter file for `role` inside `dir`.
fn role_path(dir: &Path, role: &str) -> PathBuf {
    dir.join(format!("{role}.{CHECKPOINT_EXTENSION}"))
}

/// Save the parameters of both generators and both discriminators.
///
/// Writes `G_XtoY`, `G_YtoX`, `D_X` and `D_Y` (as `.safetensors`) into
/// `checkpoint_dir`, overwriting earlier checkpoints. The directory is not
/// created here; it has to exist already.
///
/// # Errors
///
/// Returns [`Error::CheckpointSave`] if the directory is missing or a file
/// cannot be written.
pub fn checkpoint<P: AsRef<Path>>(
    iteration: usize,
    g_x_to_y: &dyn StateDict,
    g_y_to_x: &dyn StateDict,
    d_x: &dyn StateDict,
    d_y: &dyn StateDict,
    checkpoint_dir: P,
) -> Result<()> {
    let dir = checkpoint_dir.as_ref();

    for (role, model) in [
        (G_X_TO_Y, g_x_to_y),
        (G_Y_TO_X, g_y_to_x),
        (D_X, d_x),
        (D_Y, d_y),
    ] {
        save_state_dict(&model.state_dict(), role_path(dir, role))?;
    }

    tracing::info!(
        "Saved checkpoint for iteration {iteration} to {}",
        dir.display()
    );
    Ok(())
}

/// Read back the four parameter sets written by [`checkpoint`].
///
/// # Errors
///
/// Returns [`Error::CheckpointLoad`] if any file is missing or malformed.
pub fn load_checkpoint<P: AsRef<Path>>(checkpoint_dir: P) -> Result<Checkpoint> {
    let dir = checkpoint_dir.as_ref();

    Ok(Checkpoint {
        g_x_to_y: load_state_dict(role_path(dir, G_X_TO_Y))?,
        g_y_to_x: load_state_dict(role_path(dir, G_Y_TO_X))?,
        d_x: load_state_dict(role_path(dir, D_X))?,
        d_y: load_state_dict(role_path(dir, D_Y))?,
    })
}

/// Write one parameter set as a safetensors file of little-endian `f32`s.
///
/// # Errors
///
/// Returns [`Error::CheckpointSave`] if the file cannot be written.
pub fn save_state_dict<P: AsRef<Path>>(state: &ParameterSet, path: P) -> Result<()> {
    let path = path.as_ref();
    let save_error = |source| Error::CheckpointSave {
        path: path.to_path_buf(),
        source,
    };

    // safetensors borrows its data, so the byte buffers outlive the views
    let buffers: Vec<(&str, Vec<usize>, Vec<u8>)> = state
        .iter()
        .map(|(name, array)| {
            let bytes = array.iter().flat_map(|v| v.to_le_bytes()).collect();
            (name.as_str(), array.shape().to_vec(), bytes)
        })
        .collect();

    let views = buffers
        .iter()
        .map(|(name, shape, bytes)| {
            TensorView::new(Dtype::F32, shape.clone(), bytes).map(|view| (*name, view))
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(save_error)?;

    safetensors::serialize_to_file(views, &None, path).map_err(save_error)?;

    tracing::debug!("Wrote {} parameters to {}", state.len(), path.display());
    Ok(())
}

/// Read one parameter set written by [`save_state_dict`].
///
/// # Errors
///
/// Returns [`Error::CheckpointLoad`] if the file cannot be read, is not a
/// safetensors file, or holds anything other than `f32` tensors.
pub fn load_state_dict<P: AsRef<Path>>(path: P) -> Result<ParameterSet> {
    let path = path.as_ref();
    let load_error = |reason: String| Error::CheckpointLoad {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|err| load_error(err.to_string()))?;
    let tensors = SafeTensors::deserialize(&bytes).map_err(|err| load_error(err.to_string()))?;

    let mut state = ParameterSet::new();
    for (name, view) in tensors.tensors() {
        if view.dtype() != Dtype::F32 {
            return Err(load_error(format!(
                "parameter {name} has dtype {:?}, expected F32",
                view.dtype()
            )));
        }

        let values: Vec<f32> = view
            .data()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        let array = ArrayD::from_shape_vec(IxDyn(view.shape()), values)
            .map_err(|err| load_error(format!("parameter {name}: {err}")))?;
        state.insert(name, array);
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2};

    struct Weights(ParameterSet);

    impl StateDict for Weights {
        fn state_dict(&self) -> ParameterSet {
            self.0.clone()
        }
    }

    fn weights(scale: f32) -> Weights {
        let mut state = ParameterSet::new();
        state.insert(
            "conv1.weight".to_string(),
            Array2::from_shape_fn((2, 3), |(i, j)| {
                #[allow(clippy::cast_precision_loss)]
                let v = (i * 3 + j) as f32;
                v * scale
            })
            .into_dyn(),
        );
        state.insert("conv1.bias".to_string(), arr1(&[scale, -scale]).into_dyn());
        Weights(state)
    }

    #[test]
    fn test_writes_four_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let (gxy, gyx, dx, dy) = (weights(1.0), weights(2.0), weights(3.0), weights(4.0));

        checkpoint(10, &gxy, &gyx, &dx, &dy, dir.path()).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "D_X.safetensors",
                "D_Y.safetensors",
                "G_XtoY.safetensors",
                "G_YtoX.safetensors",
            ]
        );
        for name in names {
            assert!(std::fs::metadata(dir.path().join(name)).unwrap().len() > 0);
        }
    }

    #[test]
    fn test_roundtrip_preserves_roles() {
        let dir = tempfile::tempdir().unwrap();
        let (gxy, gyx, dx, dy) = (weights(1.0), weights(2.0), weights(3.0), weights(4.0));

        checkpoint(0, &gxy, &gyx, &dx, &dy, dir.path()).unwrap();
        let loaded = load_checkpoint(dir.path()).unwrap();

        assert_eq!(loaded.g_x_to_y, gxy.0);
        assert_eq!(loaded.g_y_to_x, gyx.0);
        assert_eq!(loaded.d_x, dx.0);
        assert_eq!(loaded.d_y, dy.0);
        assert_eq!(loaded.d_y["conv1.weight"].shape(), &[2, 3]);
    }

    #[test]
    fn test_overwrites_previous_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let old = weights(1.0);
        let new = weights(5.0);

        checkpoint(1, &old, &old, &old, &old, dir.path()).unwrap();
        checkpoint(2, &new, &new, &new, &new, dir.path()).unwrap();

        let loaded = load_checkpoint(dir.path()).unwrap();
        assert_eq!(loaded.g_x_to_y, new.0);
    }

    #[test]
    fn test_empty_parameter_set_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.safetensors");

        save_state_dict(&ParameterSet::new(), &path).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        assert!(load_state_dict(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let w = weights(1.0);

        let err = checkpoint(0, &w, &w, &w, &w, &missing).unwrap_err();

        assert!(matches!(err, Error::CheckpointSave { .. }));
        assert!(!missing.exists());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("G_XtoY.safetensors");
        std::fs::write(&path, b"not a checkpoint").unwrap();

        let err = load_state_dict(&path).unwrap_err();

        assert!(matches!(err, Error::CheckpointLoad { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            load_checkpoint(dir.path()),
            Err(Error::CheckpointLoad { .. })
        ));
    }
}
