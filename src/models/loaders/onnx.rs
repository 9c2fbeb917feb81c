use async_trait::async_trait;
use ndarray::{ArrayD, IxDyn};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, CoreMLExecutionProvider,
    DirectMLExecutionProvider, ExecutionProviderDispatch,
};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use super::onnx_config::{ExecutionProvider, OnnxLoadConfig};
use crate::models::runtime::{check_shape, ElementKind, RuntimeError, TensorRuntime};

/// ONNX Runtime backend for the classifier
pub struct OnnxRuntime {
    config: OnnxLoadConfig,
}

impl OnnxRuntime {
    pub fn new(config: OnnxLoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OnnxLoadConfig {
        &self.config
    }
}

impl Default for OnnxRuntime {
    fn default() -> Self {
        Self::new(OnnxLoadConfig::default())
    }
}

/// Loaded ONNX model
pub struct OnnxModel {
    // Session::run needs &mut
    session: Mutex<Session>,
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("model_path", &self.model_path)
            .finish()
    }
}

/// f32 tensor owned by ONNX Runtime; freed on drop
pub struct OnnxTensor(Tensor<f32>);

/// A model with no outputs has nothing to classify
fn require_outputs(count: usize) -> Result<(), RuntimeError> {
    if count == 0 {
        return Err(RuntimeError::Readout("model produced no outputs".to_string()));
    }
    Ok(())
}

/// Create ONNX Runtime session with execution providers
fn create_session(model_path: &Path, config: &OnnxLoadConfig) -> ort::Result<Session> {
    info!("Creating ONNX session from: {:?}", model_path);

    let providers = execution_providers(config);

    let level = if config.optimize_graph {
        GraphOptimizationLevel::Level3
    } else {
        GraphOptimizationLevel::Disable
    };

    let session = Session::builder()?
        .with_optimization_level(level)?
        .with_intra_threads(config.intra_threads)?
        .with_execution_providers(providers)?
        .commit_from_file(model_path)?;

    info!("ONNX session created successfully");
    Ok(session)
}

/// Map configured providers to ONNX Runtime dispatchers
fn execution_providers(config: &OnnxLoadConfig) -> Vec<ExecutionProviderDispatch> {
    config
        .resolved_providers()
        .into_iter()
        .map(|provider| {
            debug!("Requesting {} execution provider", provider.name());
            match provider {
                ExecutionProvider::CoreML => CoreMLExecutionProvider::default().build(),
                ExecutionProvider::CUDA => CUDAExecutionProvider::default().build(),
                ExecutionProvider::DirectML => DirectMLExecutionProvider::default().build(),
                ExecutionProvider::CPU => CPUExecutionProvider::default().build(),
            }
        })
        .collect()
}

#[async_trait]
impl TensorRuntime for OnnxRuntime {
    type Model = OnnxModel;
    type Tensor = OnnxTensor;

    async fn load_model(&self, location: &str) -> Result<OnnxModel, RuntimeError> {
        let model_path = PathBuf::from(location);
        if !model_path.is_file() {
            return Err(RuntimeError::ModelNotFound(location.to_string()));
        }

        let config = self.config.clone();
        let path = model_path.clone();
        let session = tokio::task::spawn_blocking(move || create_session(&path, &config))
            .await
            .map_err(|e| RuntimeError::Load {
                location: location.to_string(),
                reason: e.to_string(),
            })?
            .map_err(|e| RuntimeError::Load {
                location: location.to_string(),
                reason: e.to_string(),
            })?;

        Ok(OnnxModel {
            session: Mutex::new(session),
            model_path,
        })
    }

    fn make_tensor(
        &self,
        data: &[f32],
        shape: &[usize],
        kind: ElementKind,
    ) -> Result<OnnxTensor, RuntimeError> {
        if kind != ElementKind::Float32 {
            return Err(RuntimeError::UnsupportedKind(kind.name()));
        }
        check_shape(data, shape)?;

        let array = ArrayD::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|e| {
            RuntimeError::Execution(format!("failed to shape input tensor: {}", e))
        })?;
        Tensor::from_array(array)
            .map(OnnxTensor)
            .map_err(|e| RuntimeError::Execution(e.to_string()))
    }

    // Runs inline on the caller's task: one 1x64x64x3 forward pass is short,
    // and inference stays single-threaded with at most one call in flight.
    fn predict(&self, model: &OnnxModel, input: &OnnxTensor) -> Result<OnnxTensor, RuntimeError> {
        let mut session = model
            .session
            .lock()
            .map_err(|_| RuntimeError::Execution("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![&input.0])
            .map_err(|e| RuntimeError::Execution(e.to_string()))?;

        require_outputs(outputs.len())?;

        // Copy the first output out so it outlives the session borrow
        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| RuntimeError::Readout(e.to_string()))?;
        let flat = vec![scores.len() as i64];
        Tensor::from_array((flat, scores.to_vec()))
            .map(OnnxTensor)
            .map_err(|e| RuntimeError::Execution(e.to_string()))
    }

    async fn data(&self, tensor: &OnnxTensor) -> Result<Vec<f32>, RuntimeError> {
        let (_, values) = tensor
            .0
            .try_extract_tensor::<f32>()
            .map_err(|e| RuntimeError::Readout(e.to_string()))?;
        Ok(values.to_vec())
    }
}
