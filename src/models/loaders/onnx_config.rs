use serde::{Deserialize, Serialize};

/// Configuration for building ONNX Runtime sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnnxLoadConfig {
    /// Execution providers to try, in order.
    /// If None, uses the platform default (CPU is always appended as fallback)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_providers: Option<Vec<ExecutionProvider>>,

    /// Threads used for parallel ops within a layer
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,

    /// Run ONNX Runtime's full graph optimization pass
    #[serde(default = "default_true")]
    pub optimize_graph: bool,
}

fn default_intra_threads() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Default for OnnxLoadConfig {
    fn default() -> Self {
        Self {
            execution_providers: None,
            intra_threads: default_intra_threads(),
            optimize_graph: true,
        }
    }
}

impl OnnxLoadConfig {
    /// Providers to register, CPU last
    pub fn resolved_providers(&self) -> Vec<ExecutionProvider> {
        let mut providers = self
            .execution_providers
            .clone()
            .unwrap_or_else(ExecutionProvider::default_for_platform);
        providers.retain(|p| *p != ExecutionProvider::CPU);
        providers.push(ExecutionProvider::CPU);
        providers
    }
}

/// Execution provider options for ONNX Runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionProvider {
    /// CoreML (Apple Neural Engine on Apple Silicon)
    CoreML,
    /// CPU (fallback, works everywhere)
    CPU,
    /// CUDA (NVIDIA GPUs, Linux/Windows)
    CUDA,
    /// DirectML (Windows GPU acceleration)
    DirectML,
}

impl ExecutionProvider {
    /// Accelerated provider for this build target, followed by CPU
    pub fn default_for_platform() -> Vec<Self> {
        let accelerated = if cfg!(target_os = "macos") {
            Some(ExecutionProvider::CoreML)
        } else if cfg!(target_os = "windows") {
            Some(ExecutionProvider::DirectML)
        } else if cfg!(all(target_os = "linux", feature = "cuda")) {
            Some(ExecutionProvider::CUDA)
        } else {
            None
        };
        accelerated
            .into_iter()
            .chain(std::iter::once(ExecutionProvider::CPU))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecutionProvider::CoreML => "CoreML",
            ExecutionProvider::CPU => "CPU",
            ExecutionProvider::CUDA => "CUDA",
            ExecutionProvider::DirectML => "DirectML",
        }
    }
}

impl std::fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
