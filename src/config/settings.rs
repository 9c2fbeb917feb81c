// Configuration structs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::{ENV_CONFIDENCE_THRESHOLD, ENV_MODEL_PATH};
use crate::models::classifier::{
    ClassifierOptions, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_LETTER_BASE,
};
use crate::models::loaders::OnnxLoadConfig;
use crate::models::InputShape;

/// Model location and ONNX Runtime session settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the .onnx model file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(flatten)]
    pub onnx: OnnxLoadConfig,
}

/// Decision rule applied to the model's class scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A class is accepted only when its score is strictly above this
    pub confidence_threshold: f32,
    /// Letter for class index 0
    pub letter_base: char,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            letter_base: DEFAULT_LETTER_BASE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    /// Model input geometry (width × height × channels)
    #[serde(default)]
    pub input: InputShape,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Apply `FINGERSPELL_*` overrides from the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_MODEL_PATH).filter(|p| !p.is_empty()) {
            self.model.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_CONFIDENCE_THRESHOLD).filter(|t| !t.is_empty()) {
            self.classifier.confidence_threshold = raw
                .trim()
                .parse::<f32>()
                .with_context(|| format!("{} must be a number, got '{}'", ENV_CONFIDENCE_THRESHOLD, raw))?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let InputShape {
            width,
            height,
            channels,
        } = self.input;
        if width == 0 || height == 0 || channels == 0 {
            bail!("Input dimensions must be non-zero, got {}", self.input);
        }
        // Images are resized with u32 dimensions
        if u32::try_from(width).is_err() || u32::try_from(height).is_err() {
            bail!("Input width and height must fit in 32 bits, got {}", self.input);
        }
        if self.input.checked_len().is_none() {
            bail!("Input {} has more values than fit in memory", self.input);
        }

        let t = self.classifier.confidence_threshold;
        if !(0.0..=1.0).contains(&t) {
            bail!("confidence_threshold must be within [0, 1], got {}", t);
        }

        if !self.classifier.letter_base.is_alphabetic() {
            bail!(
                "letter_base must be a letter, got '{}'",
                self.classifier.letter_base
            );
        }

        if self.model.onnx.intra_threads == 0 {
            bail!("intra_threads must be at least 1");
        }

        Ok(())
    }

    /// Options for building a classifier from this config
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            shape: self.input,
            confidence_threshold: self.classifier.confidence_threshold,
            letter_base: self.classifier.letter_base,
        }
    }
}
