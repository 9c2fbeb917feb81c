// Model loaders: ONNX Runtime backend
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod onnx_config;

#[cfg(feature = "onnx")]
pub use onnx::{OnnxModel, OnnxRuntime, OnnxTensor};
pub use onnx_config::{ExecutionProvider, OnnxLoadConfig};
