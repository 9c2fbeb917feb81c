// Tensor runtime seam
// Everything the classifier needs from an inference backend: load a model,
// wrap raw data in a tensor, run the model, read the output back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric kind of a tensor's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ElementKind {
    Float32,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Float32 => "float32",
        }
    }
}

/// Fixed input geometry expected by the model (NHWC, batch of one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputShape {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl InputShape {
    pub const fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Number of values in one sample, or `None` if it overflows `usize`
    pub fn checked_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.channels)
    }

    /// Number of values in one sample. Saturates at `usize::MAX`, which no
    /// real sample can match.
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tensor dimensions: `[1, height, width, channels]`
    pub fn dims(&self) -> [usize; 4] {
        [1, self.height, self.width, self.channels]
    }
}

impl Default for InputShape {
    fn default() -> Self {
        Self::new(64, 64, 3)
    }
}

impl std::fmt::Display for InputShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// Errors raised by a tensor runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),

    #[error("failed to load model from {location}: {reason}")]
    Load { location: String, reason: String },

    #[error("tensor data has {actual} values but shape {shape:?} needs {expected}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("element kind {0} is not supported by this runtime")]
    UnsupportedKind(&'static str),

    #[error("model execution failed: {0}")]
    Execution(String),

    #[error("failed to read tensor data: {0}")]
    Readout(String),
}

/// External inference backend.
///
/// Tensors are owned values; dropping one releases whatever native memory
/// backs it, so callers get release on every path without an explicit
/// dispose call.
#[async_trait]
pub trait TensorRuntime: Send + Sync {
    /// Loaded model handle
    type Model: Send + Sync;
    /// Runtime tensor
    type Tensor: Send + Sync;

    /// Load a model from a location (usually a file path)
    async fn load_model(&self, location: &str) -> Result<Self::Model, RuntimeError>;

    /// Build a tensor from flat data and a shape
    fn make_tensor(
        &self,
        data: &[f32],
        shape: &[usize],
        kind: ElementKind,
    ) -> Result<Self::Tensor, RuntimeError>;

    /// Run the model over one input tensor
    fn predict(&self, model: &Self::Model, input: &Self::Tensor)
        -> Result<Self::Tensor, RuntimeError>;

    /// Read a tensor's values out as f32
    async fn data(&self, tensor: &Self::Tensor) -> Result<Vec<f32>, RuntimeError>;
}

/// Check that `data` fills `shape` exactly
pub fn check_shape(data: &[f32], shape: &[usize]) -> Result<(), RuntimeError> {
    let expected = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .unwrap_or(usize::MAX);
    if data.len() != expected {
        return Err(RuntimeError::ShapeMismatch {
            shape: shape.to_vec(),
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape() {
        let shape = InputShape::default();
        assert_eq!(shape.len(), 64 * 64 * 3);
        assert_eq!(shape.dims(), [1, 64, 64, 3]);
        assert_eq!(shape.to_string(), "64x64x3");
    }

    #[test]
    fn test_oversized_shape_does_not_overflow() {
        let huge = InputShape::new(1 << 32, 1 << 32, 3);
        assert_eq!(huge.checked_len(), None);
        assert_eq!(huge.len(), usize::MAX);
        assert!(!huge.is_empty());

        let err = check_shape(&[0.0; 4], &[usize::MAX, 2]).unwrap_err();
        assert!(matches!(err, RuntimeError::ShapeMismatch { expected: usize::MAX, .. }));
    }

    #[test]
    fn test_check_shape() {
        assert!(check_shape(&[0.0; 6], &[1, 2, 3]).is_ok());

        let err = check_shape(&[0.0; 5], &[1, 2, 3]).unwrap_err();
        match err {
            RuntimeError::ShapeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
