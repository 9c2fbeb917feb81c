// Letter classification models
// Runtime seam, ONNX backend, preprocessing and output decoding.

pub mod classifier;
pub mod decode;
pub mod loaders;
pub mod preprocess;
pub mod runtime;

pub use classifier::{ClassifierOptions, LetterClassifier};
pub use decode::Prediction;
pub use runtime::{ElementKind, InputShape, RuntimeError, TensorRuntime};
