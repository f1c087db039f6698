use std::fmt;

/// Represents the different types of errors that can occur in the personalization engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Inference was requested before the model artifact finished loading,
    /// or after loading failed
    ModelNotReady,
    /// One of the artifact parts could not be loaded or parsed
    ArtifactError(String),
    /// The forward pass failed or produced an unusable output
    InferenceError(String),
    /// A profile value is outside its declared domain
    ValidationError(String),
    /// An operation was invoked in a lifecycle state that does not allow it
    InvalidState(String),
    /// A newer personalization request finished first; this result was discarded
    Superseded,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelNotReady => write!(f, "Model not ready"),
            Self::ArtifactError(msg) => write!(f, "Artifact error: {}", msg),
            Self::InferenceError(msg) => write!(f, "Inference error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Self::Superseded => write!(f, "Request superseded by a newer personalization run"),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(EngineError::ModelNotReady.to_string(), "Model not ready");
        assert_eq!(
            EngineError::ArtifactError("model.onnx: not found".into()).to_string(),
            "Artifact error: model.onnx: not found"
        );
        assert!(EngineError::Superseded.to_string().contains("superseded"));
    }
}
