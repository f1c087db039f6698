use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{error, info, warn};

use super::encoder::EncoderTables;
use super::error::EngineError;
use super::forward::{ForwardPass, InferenceConfig, OnnxClassifier};
use crate::runtime::RuntimeConfig;

/// File name of the classifier graph inside an artifact bundle.
pub const MODEL_FILE: &str = "model.onnx";
/// File name of the ordered feature-column list.
pub const COLUMNS_FILE: &str = "feature_columns.json";
/// File name of the per-column category encoders.
pub const ENCODERS_FILE: &str = "label_encoders.json";

/// A loaded classifier together with the metadata needed to feed it.
///
/// Immutable once loaded.
#[derive(Clone)]
pub struct ModelArtifact {
    pub classifier: Arc<dyn ForwardPass>,
    pub feature_columns: Vec<String>,
    pub encoders: EncoderTables,
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("classifier", &self.classifier)
            .field("feature_columns", &self.feature_columns)
            .field("encoders", &self.encoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModelArtifact {
    /// Parses the two JSON parts of a bundle and pairs them with a classifier.
    pub fn from_parts(
        classifier: Arc<dyn ForwardPass>,
        columns_json: &str,
        encoders_json: &str,
    ) -> Result<Self, EngineError> {
        let feature_columns: Vec<String> = serde_json::from_str(columns_json)
            .map_err(|e| EngineError::ArtifactError(format!("Invalid feature column list: {}", e)))?;
        let encoders: EncoderTables = serde_json::from_str(encoders_json)
            .map_err(|e| EngineError::ArtifactError(format!("Invalid label encoders: {}", e)))?;

        if feature_columns.is_empty() {
            warn!("Artifact declares no feature columns");
        }
        for column in encoders.keys() {
            if !feature_columns.contains(column) {
                warn!("Encoder table for '{}' does not match any feature column", column);
            }
        }

        Ok(Self {
            classifier,
            feature_columns,
            encoders,
        })
    }
}

/// Source of a [`ModelArtifact`].
///
/// A load either yields all three parts or fails as a whole.
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<ModelArtifact, EngineError>> + Send;
}

/// Loads a bundle laid out as `model.onnx`, `feature_columns.json` and
/// `label_encoders.json` inside one directory.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    dir: PathBuf,
    runtime: RuntimeConfig,
    inference: InferenceConfig,
}

impl ArtifactDir {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            runtime: RuntimeConfig::default(),
            inference: InferenceConfig::default(),
        }
    }

    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime = config;
        self
    }

    pub fn with_inference_config(mut self, config: InferenceConfig) -> Self {
        self.inference = config;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn columns_path(&self) -> PathBuf {
        self.dir.join(COLUMNS_FILE)
    }

    pub fn encoders_path(&self) -> PathBuf {
        self.dir.join(ENCODERS_FILE)
    }

    async fn read_part(path: PathBuf) -> Result<Vec<u8>, EngineError> {
        tokio::fs::read(&path).await.map_err(|e| {
            error!("Failed to read artifact part {:?}: {}", path, e);
            EngineError::ArtifactError(format!("Failed to read {}: {}", path.display(), e))
        })
    }
}

impl ArtifactLoader for ArtifactDir {
    async fn load(&self) -> Result<ModelArtifact, EngineError> {
        info!("Loading model artifact from {:?}", self.dir);

        let (model_bytes, columns_bytes, encoders_bytes) = tokio::try_join!(
            Self::read_part(self.model_path()),
            Self::read_part(self.columns_path()),
            Self::read_part(self.encoders_path()),
        )?;

        let columns_json = String::from_utf8(columns_bytes)
            .map_err(|e| EngineError::ArtifactError(format!("{} is not UTF-8: {}", COLUMNS_FILE, e)))?;
        let encoders_json = String::from_utf8(encoders_bytes)
            .map_err(|e| EngineError::ArtifactError(format!("{} is not UTF-8: {}", ENCODERS_FILE, e)))?;

        let runtime = self.runtime.clone();
        let inference = self.inference.clone();
        let classifier = tokio::task::spawn_blocking(move || {
            OnnxClassifier::from_memory(&model_bytes, &runtime, &inference)
        })
        .await
        .map_err(|e| EngineError::ArtifactError(format!("Classifier loading task failed: {}", e)))??;

        let artifact = ModelArtifact::from_parts(Arc::new(classifier), &columns_json, &encoders_json)?;
        info!(
            "Model artifact loaded ({} feature columns, {} encoder tables)",
            artifact.feature_columns.len(),
            artifact.encoders.len()
        );
        Ok(artifact)
    }
}
