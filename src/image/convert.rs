//! Conversion of normalized batches into displayable bytes.

use ndarray::{ArrayView4, CowArray, Ix4};

use crate::error::{Error, Result};

use super::{ByteBatch, ImageTensor};

/// A batch that can be brought into host memory as an `f32` NCHW array.
///
/// Plain arrays are borrowed as-is. Framework tensors are detached from
/// whatever runtime owns them and copied into an owned host array, so the
/// conversion never touches the original.
pub trait ToHost {
    /// Borrow or copy the batch into host memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor is not a 4-D `f32` tensor.
    fn to_host(&self) -> Result<CowArray<'_, f32, Ix4>>;
}

impl ToHost for ImageTensor {
    fn to_host(&self) -> Result<CowArray<'_, f32, Ix4>> {
        Ok(CowArray::from(self.view()))
    }
}

impl ToHost for ArrayView4<'_, f32> {
    fn to_host(&self) -> Result<CowArray<'_, f32, Ix4>> {
        Ok(CowArray::from(self.view()))
    }
}

impl ToHost for ort::value::DynValue {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn to_host(&self) -> Result<CowArray<'_, f32, Ix4>> {
        let (shape_info, data) = self
            .try_extract_tensor::<f32>()
            .map_err(|source| Error::Inference { source })?;

        // Safe: tensor dimensions are always non-negative and within bounds
        let dims: Vec<usize> = shape_info.iter().map(|&x| x as usize).collect();

        if dims.len() != 4 {
            return Err(Error::ShapeMismatch {
                expected: "4D tensor".to_string(),
                actual: format!("{}D tensor", dims.len()),
            });
        }

        let host = ImageTensor::from_shape_vec((dims[0], dims[1], dims[2], dims[3]), data.to_vec())
            .map_err(|_| Error::ShapeMismatch {
                expected: format!("{dims:?}"),
                actual: "reshape failed".to_string(),
            })?;

        Ok(CowArray::from(host))
    }
}

/// Convert a batch in [-1, 1] to bytes in [0, 255].
///
/// Each value maps to `clamp((x + 1) * 127.5, 0, 255)` truncated toward zero.
/// Out-of-range values saturate instead of wrapping and NaN becomes 0.
/// The output has the same NCHW shape as the input.
///
/// # Errors
///
/// Returns an error if a framework tensor cannot be copied to the host.
pub fn to_data<T: ToHost + ?Sized>(batch: &T) -> Result<ByteBatch> {
    let host = batch.to_host()?;
    Ok(host.mapv(denormalize))
}

/// Denormalize a value from [-1, 1] to [0, 255] with clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn denormalize(value: f32) -> u8 {
    // Safe: clamped to [0, 255] range before casting
    let scaled = (value + 1.0) * 127.5;
    scaled.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_denormalize() {
        assert_eq!(denormalize(-1.0), 0);
        assert_eq!(denormalize(0.0), 127);
        assert_eq!(denormalize(1.0), 255);
    }

    #[test]
    fn test_denormalize_clamp() {
        assert_eq!(denormalize(-2.0), 0);
        assert_eq!(denormalize(2.0), 255);
        assert_eq!(denormalize(f32::INFINITY), 255);
        assert_eq!(denormalize(f32::NEG_INFINITY), 0);
    }

    #[test]
    fn test_denormalize_nan() {
        assert_eq!(denormalize(f32::NAN), 0);
    }

    #[test]
    fn test_to_data_keeps_shape() {
        let batch = Array4::<f32>::zeros((2, 3, 4, 5));
        let bytes = to_data(&batch).unwrap();

        assert_eq!(bytes.shape(), &[2, 3, 4, 5]);
        assert!(bytes.iter().all(|&b| b == 127));
    }

    #[test]
    fn test_to_data_does_not_mutate_input() {
        let batch = Array4::from_shape_fn((1, 3, 2, 2), |(_, c, y, x)| {
            #[allow(clippy::cast_precision_loss)]
            let v = (c + y + x) as f32;
            v / 4.0 - 1.0
        });
        let before = batch.clone();

        let _ = to_data(&batch).unwrap();

        assert_eq!(batch, before);
    }

    #[test]
    fn test_to_data_from_view() {
        let batch = Array4::from_elem((1, 3, 2, 2), 1.0_f32);
        let bytes = to_data(&batch.view()).unwrap();

        assert!(bytes.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_to_data_endpoints_and_clamp() {
        let values = [-3.0_f32, -1.0, -0.5, 0.0, 0.5, 1.0, 3.0];
        let batch = Array4::from_shape_vec((1, 1, 1, values.len()), values.to_vec()).unwrap();
        let bytes = to_data(&batch).unwrap();

        assert_eq!(
            bytes.iter().copied().collect::<Vec<_>>(),
            vec![0, 0, 63, 127, 191, 255, 255]
        );
    }

    #[test]
    fn test_to_data_from_onnx_value() {
        let batch = Array4::from_elem((1, 3, 2, 2), -1.0_f32);
        let value = ort::value::Tensor::from_array(batch).unwrap().into_dyn();
        let bytes = to_data(&value).unwrap();

        assert_eq!(bytes.shape(), &[1, 3, 2, 2]);
        assert!(bytes.iter().all(|&b| b == 0));
    }
}
