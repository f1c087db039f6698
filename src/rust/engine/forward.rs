use std::collections::HashMap;
use std::fmt;
use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use log::{debug, info};

use super::error::EngineError;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Output name preferred when the graph exposes several outputs.
const PROBABILITIES_OUTPUT: &str = "probabilities";

/// Runs the trained classifier on one encoded feature vector.
///
/// Implementations return the raw class scores for a single row. They may
/// block; the inference client moves calls onto the blocking pool.
pub trait ForwardPass: Send + Sync + fmt::Debug {
    fn forward(&self, features: &[f32]) -> Result<Vec<f32>, EngineError>;
}

/// Tensor names used to feed and read the classifier graph.
///
/// When unset, the first graph input is used, and the output named
/// `probabilities` if present, otherwise the first output.
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    pub input_name: Option<String>,
    pub output_name: Option<String>,
}

/// An ONNX classifier taking a `[1, n_features]` float tensor.
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_index: usize,
}

impl OnnxClassifier {
    /// Builds a session from in-memory model bytes and resolves its tensor names.
    pub fn from_memory(
        model_bytes: &[u8],
        runtime: &RuntimeConfig,
        config: &InferenceConfig,
    ) -> Result<Self, EngineError> {
        let session = create_session_builder(runtime)?
            .commit_from_memory(model_bytes)
            .map_err(|e| EngineError::ArtifactError(format!("Failed to load classifier graph: {}", e)))?;
        Self::from_session(session, config)
    }

    fn from_session(session: Session, config: &InferenceConfig) -> Result<Self, EngineError> {
        if session.inputs.is_empty() {
            return Err(EngineError::ArtifactError("Classifier graph has no inputs".into()));
        }
        if session.outputs.is_empty() {
            return Err(EngineError::ArtifactError("Classifier graph has no outputs".into()));
        }

        let input_name = match &config.input_name {
            Some(name) => {
                if !session.inputs.iter().any(|input| &input.name == name) {
                    return Err(EngineError::ArtifactError(format!(
                        "Classifier graph has no input named '{}'",
                        name
                    )));
                }
                name.clone()
            }
            None => session.inputs[0].name.clone(),
        };

        let output_index = match &config.output_name {
            Some(name) => session
                .outputs
                .iter()
                .position(|output| &output.name == name)
                .ok_or_else(|| {
                    EngineError::ArtifactError(format!("Classifier graph has no output named '{}'", name))
                })?,
            None => session
                .outputs
                .iter()
                .position(|output| output.name == PROBABILITIES_OUTPUT)
                .unwrap_or(0),
        };

        info!(
            "Classifier graph ready (input: '{}', output: '{}')",
            input_name, session.outputs[output_index].name
        );

        Ok(Self {
            session,
            input_name,
            output_index,
        })
    }
}

impl ForwardPass for OnnxClassifier {
    fn forward(&self, features: &[f32]) -> Result<Vec<f32>, EngineError> {
        let input_array = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| EngineError::InferenceError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input)
                .map_err(|e| EngineError::InferenceError(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| EngineError::InferenceError(format!("Failed to run classifier: {}", e)))?;
        let output_tensor = outputs[self.output_index]
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::InferenceError(format!("Failed to extract output tensor: {}", e)))?;

        let scores: Vec<f32> = output_tensor.iter().copied().collect();
        debug!("Classifier produced {} scores", scores.len());
        Ok(scores)
    }
}
