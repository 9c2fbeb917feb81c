// Fingerspell - sign-language letter classifier
// Library exports

pub mod config;
pub mod models;

pub use config::Config;
pub use models::{ClassifierOptions, InputShape, LetterClassifier, Prediction, TensorRuntime};
