// Letter classifier
// Owns the current model handle and runs single-sample inference through a
// TensorRuntime. Every failure is logged and collapsed to false/None.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::decode::{decode, Prediction};
use super::runtime::{ElementKind, InputShape, RuntimeError, TensorRuntime};

/// Default cutoff a class score must exceed to be accepted
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Default letter for class index 0
pub const DEFAULT_LETTER_BASE: char = 'A';

/// Fixed parameters of a classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierOptions {
    pub shape: InputShape,
    pub confidence_threshold: f32,
    pub letter_base: char,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            shape: InputShape::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            letter_base: DEFAULT_LETTER_BASE,
        }
    }
}

/// Load-then-infer context around one model slot
pub struct LetterClassifier<R: TensorRuntime> {
    runtime: R,
    options: ClassifierOptions,
    current: RwLock<Option<Arc<R::Model>>>,
}

impl<R: TensorRuntime> LetterClassifier<R> {
    pub fn new(runtime: R) -> Self {
        Self::with_options(runtime, ClassifierOptions::default())
    }

    pub fn with_options(runtime: R, options: ClassifierOptions) -> Self {
        Self {
            runtime,
            options,
            current: RwLock::new(None),
        }
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    pub fn shape(&self) -> InputShape {
        self.options.shape
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Whether a model is currently loaded
    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Load a model and make it current.
    ///
    /// Returns `false` on any failure; a previously loaded model stays in place.
    pub async fn load_model(&self, path: &str) -> bool {
        info!("Loading model from: {}", path);

        match self.runtime.load_model(path).await {
            Ok(model) => {
                *self.current.write().await = Some(Arc::new(model));
                info!("Model loaded: {}", path);
                true
            }
            Err(e) => {
                error!("Failed to load model: {}", e);
                false
            }
        }
    }

    /// Classify one sample to a letter, or `None` if there is no confident result
    pub async fn run_inference(&self, sample: &[f32]) -> Option<char> {
        self.predict(sample).await.map(|p| p.letter)
    }

    /// Like [`run_inference`](Self::run_inference) but keeps index and confidence
    pub async fn predict(&self, sample: &[f32]) -> Option<Prediction> {
        // Snapshot the handle; a concurrent load does not affect this call.
        let model = match self.current.read().await.as_ref() {
            Some(model) => Arc::clone(model),
            None => {
                debug!("Inference requested before a model was loaded");
                return None;
            }
        };

        let expected = self.options.shape.len();
        if sample.len() != expected {
            warn!(
                "Rejecting sample of {} values, expected {} ({})",
                sample.len(),
                expected,
                self.options.shape
            );
            return None;
        }

        match self.scores(&model, sample).await {
            Ok(scores) => {
                let prediction = decode(
                    &scores,
                    self.options.confidence_threshold,
                    self.options.letter_base,
                );
                debug!(classes = scores.len(), ?prediction, "Inference complete");
                prediction
            }
            Err(e) => {
                warn!("Inference failed: {}", e);
                None
            }
        }
    }

    async fn scores(&self, model: &R::Model, sample: &[f32]) -> Result<Vec<f32>, RuntimeError> {
        let dims = self.options.shape.dims();
        let input = self
            .runtime
            .make_tensor(sample, &dims, ElementKind::Float32)?;
        let output = self.runtime.predict(model, &input)?;
        // input and output drop here on both the Ok and Err paths
        self.runtime.data(&output).await
    }
}
