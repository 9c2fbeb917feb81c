// Integration tests for the letter classifier
// Drives LetterClassifier through a scripted in-memory runtime

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::Notify;

use fingerspell::config::Config;
use fingerspell::models::{ElementKind, InputShape, RuntimeError};
use fingerspell::{LetterClassifier, TensorRuntime};

/// Runtime whose models return fixed score vectors
#[derive(Default)]
struct ScriptedRuntime {
    models: Mutex<HashMap<String, Vec<f32>>>,
    /// When set, readout waits for a notification
    gate: Option<Notify>,
}

impl ScriptedRuntime {
    fn add(&self, location: &str, scores: &[f32]) {
        self.models
            .lock()
            .unwrap()
            .insert(location.to_string(), scores.to_vec());
    }
}

#[async_trait]
impl TensorRuntime for ScriptedRuntime {
    type Model = Vec<f32>;
    type Tensor = Vec<f32>;

    async fn load_model(&self, location: &str) -> Result<Vec<f32>, RuntimeError> {
        self.models
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| RuntimeError::Load {
                location: location.to_string(),
                reason: "corrupt model".to_string(),
            })
    }

    fn make_tensor(
        &self,
        data: &[f32],
        shape: &[usize],
        _kind: ElementKind,
    ) -> Result<Vec<f32>, RuntimeError> {
        fingerspell::models::runtime::check_shape(data, shape)?;
        Ok(data.to_vec())
    }

    fn predict(&self, model: &Vec<f32>, _input: &Vec<f32>) -> Result<Vec<f32>, RuntimeError> {
        Ok(model.clone())
    }

    async fn data(&self, tensor: &Vec<f32>) -> Result<Vec<f32>, RuntimeError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(tensor.clone())
    }
}

fn blank_sample() -> Vec<f32> {
    vec![0.0; InputShape::default().len()]
}

#[tokio::test]
async fn test_default_shape_end_to_end() {
    let runtime = ScriptedRuntime::default();
    let mut scores = vec![0.01; 26];
    scores[7] = 0.93;
    runtime.add("letters.onnx", &scores);

    let classifier = LetterClassifier::new(runtime);
    assert_eq!(classifier.run_inference(&blank_sample()).await, None);

    assert!(classifier.load_model("letters.onnx").await);
    assert_eq!(classifier.run_inference(&blank_sample()).await, Some('H'));
}

#[tokio::test]
async fn test_low_confidence_is_no_result() {
    let runtime = ScriptedRuntime::default();
    runtime.add("m", &[0.3, 0.45, 0.25]);

    let classifier = LetterClassifier::new(runtime);
    assert!(classifier.load_model("m").await);
    assert_eq!(classifier.run_inference(&blank_sample()).await, None);
}

#[tokio::test]
async fn test_ties_pick_lowest_index() {
    let runtime = ScriptedRuntime::default();
    runtime.add("m", &[0.1, 0.8, 0.8, 0.8]);

    let classifier = LetterClassifier::new(runtime);
    assert!(classifier.load_model("m").await);
    assert_eq!(classifier.run_inference(&blank_sample()).await, Some('B'));
}

#[tokio::test]
async fn test_corrupt_model_keeps_previous() {
    let runtime = ScriptedRuntime::default();
    runtime.add("good", &[0.0, 0.0, 0.99]);

    let classifier = LetterClassifier::new(runtime);
    assert!(classifier.load_model("good").await);
    assert!(!classifier.load_model("corrupt").await);
    assert_eq!(classifier.run_inference(&blank_sample()).await, Some('C'));
}

#[tokio::test]
async fn test_config_drives_classifier_options() {
    let config = Config::from_toml(
        r#"
        [input]
        width = 8
        height = 8
        channels = 1

        [classifier]
        confidence_threshold = 0.9
        letter_base = "a"
        "#,
    )
    .unwrap();
    config.validate().unwrap();

    let runtime = ScriptedRuntime::default();
    runtime.add("m", &[0.0, 0.85, 0.0]);
    runtime.add("sure", &[0.0, 0.95, 0.0]);

    let classifier = LetterClassifier::with_options(runtime, config.classifier_options());
    let sample = vec![0.0; 64];

    let options = classifier.options();
    assert_eq!(options.shape, InputShape::new(8, 8, 1));
    assert_eq!(options.confidence_threshold, 0.9);
    assert_eq!(options.letter_base, 'a');
    assert_eq!(classifier.shape().len(), 64);

    assert!(classifier.load_model("m").await);
    assert_eq!(classifier.run_inference(&sample).await, None);

    assert!(classifier.load_model("sure").await);
    assert_eq!(classifier.run_inference(&sample).await, Some('b'));

    // Default-sized input no longer matches
    assert_eq!(classifier.run_inference(&blank_sample()).await, None);
}

#[tokio::test]
async fn test_load_during_inference_does_not_affect_in_flight_call() {
    let runtime = ScriptedRuntime {
        gate: Some(Notify::new()),
        ..ScriptedRuntime::default()
    };
    runtime.add("first", &[0.9, 0.0]);
    runtime.add("second", &[0.0, 0.9]);

    let classifier = LetterClassifier::new(runtime);
    assert!(classifier.load_model("first").await);

    let sample = blank_sample();
    let (result, swapped) = tokio::join!(classifier.run_inference(&sample), async {
        let swapped = classifier.load_model("second").await;
        if let Some(gate) = &classifier.runtime().gate {
            gate.notify_one();
        }
        swapped
    });

    assert!(swapped);
    assert_eq!(result, Some('A'));
}
