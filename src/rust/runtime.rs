use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use std::sync::OnceLock;

use crate::engine::EngineError;

static ENVIRONMENT: OnceLock<Result<(), String>> = OnceLock::new();

/// ONNX Runtime settings used when a classifier session is created.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0, // Let ONNX Runtime decide
            intra_threads: 1,
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

fn copy_level(level: &GraphOptimizationLevel) -> GraphOptimizationLevel {
    match level {
        GraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
        GraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
        GraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        GraphOptimizationLevel::Disable => GraphOptimizationLevel::Disable,
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: copy_level(&self.optimization_level),
        }
    }
}

/// Commits the process-wide ONNX Runtime environment once.
///
/// Later calls return the outcome of the first attempt.
pub fn ensure_initialized() -> Result<(), EngineError> {
    ENVIRONMENT
        .get_or_init(|| {
            ort::init()
                .with_name("tailor")
                .commit()
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(|e| EngineError::ArtifactError(format!("Failed to initialize ONNX Runtime: {}", e)))
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, EngineError> {
    ensure_initialized()?;
    let build_err = |e: ort::Error| EngineError::ArtifactError(e.to_string());
    let mut builder = Session::builder().map_err(build_err)?;

    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads).map_err(build_err)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads).map_err(build_err)?;
    }

    builder = builder
        .with_optimization_level(copy_level(&config.optimization_level))
        .map_err(build_err)?;

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.inter_threads, 0);
        assert_eq!(config.intra_threads, 1);
        assert!(matches!(config.optimization_level, GraphOptimizationLevel::Level3));
    }

    #[test]
    fn test_config_clone() {
        let config = RuntimeConfig {
            inter_threads: 2,
            intra_threads: 4,
            optimization_level: GraphOptimizationLevel::Level1,
        };
        let cloned = config.clone();
        assert_eq!(cloned.inter_threads, 2);
        assert_eq!(cloned.intra_threads, 4);
        assert!(matches!(cloned.optimization_level, GraphOptimizationLevel::Level1));
    }
}
