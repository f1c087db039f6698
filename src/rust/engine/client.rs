use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::artifact::{ArtifactLoader, ModelArtifact};
use super::encoder::encode_features;
use super::error::EngineError;
use super::prediction::RawPrediction;
use crate::profile::UserProfile;

/// Lifecycle of the model artifact as seen from outside the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

enum ClientState {
    Uninitialized,
    Loading,
    Ready(Arc<ModelArtifact>),
    Failed(String),
}

/// Transient per-call inference input. Counted while alive so leaks are observable.
struct InferenceScope {
    features: Vec<f32>,
    live: Arc<AtomicUsize>,
}

impl InferenceScope {
    fn acquire(live: &Arc<AtomicUsize>, features: Vec<f32>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            features,
            live: Arc::clone(live),
        }
    }
}

impl Drop for InferenceScope {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the model artifact and runs inference against it.
///
/// `initialize` is one-shot: a failed load leaves the client in `Error` for
/// good. `predict` only runs once the client is `Ready`.
pub struct ModelInferenceClient {
    state: RwLock<ClientState>,
    live_buffers: Arc<AtomicUsize>,
}

impl Default for ModelInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelInferenceClient {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ClientState::Uninitialized),
            live_buffers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn status(&self) -> ClientStatus {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ClientState::Uninitialized => ClientStatus::Uninitialized,
            ClientState::Loading => ClientStatus::Loading,
            ClientState::Ready(_) => ClientStatus::Ready,
            ClientState::Failed(_) => ClientStatus::Error,
        }
    }

    /// The reason initialization failed, if it did.
    pub fn failure(&self) -> Option<String> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ClientState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    pub fn artifact(&self) -> Option<Arc<ModelArtifact>> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ClientState::Ready(artifact) => Some(Arc::clone(artifact)),
            _ => None,
        }
    }

    /// Number of inference buffers currently held by in-flight calls.
    pub fn live_buffers(&self) -> usize {
        self.live_buffers.load(Ordering::SeqCst)
    }

    /// Loads the artifact bundle. All parts load together or the client fails.
    pub async fn initialize<L: ArtifactLoader>(&self, loader: &L) -> Result<(), EngineError> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if !matches!(*state, ClientState::Uninitialized) {
                return Err(EngineError::InvalidState("Model client already initialized".into()));
            }
            *state = ClientState::Loading;
        }
        info!("Initializing model inference client");

        let result = loader.load().await;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(artifact) => {
                info!(
                    "Model ready ({} feature columns)",
                    artifact.feature_columns.len()
                );
                *state = ClientState::Ready(Arc::new(artifact));
                Ok(())
            }
            Err(e) => {
                error!("Failed to load model: {}", e);
                *state = ClientState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Encodes `profile`, runs the classifier and returns its verdict.
    pub async fn predict(&self, profile: &UserProfile) -> Result<RawPrediction, EngineError> {
        let artifact = self.artifact().ok_or(EngineError::ModelNotReady)?;

        let features = encode_features(profile, &artifact.feature_columns, &artifact.encoders);
        let scope = InferenceScope::acquire(&self.live_buffers, features);
        let classifier = Arc::clone(&artifact.classifier);

        // The scope moves into the blocking task so it is released when the
        // forward pass ends, even if this future is dropped first.
        let scores = tokio::task::spawn_blocking(move || {
            let scores = classifier.forward(&scope.features);
            drop(scope);
            scores
        })
        .await
        .map_err(|e| EngineError::InferenceError(format!("Inference task failed: {}", e)))??;

        RawPrediction::from_scores(&scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngagementClass, ForwardPass};

    #[derive(Debug)]
    struct Fixed(Vec<f32>);

    impl ForwardPass for Fixed {
        fn forward(&self, _features: &[f32]) -> Result<Vec<f32>, EngineError> {
            Ok(self.0.clone())
        }
    }

    struct StaticLoader(Vec<f32>);

    impl ArtifactLoader for StaticLoader {
        async fn load(&self) -> Result<ModelArtifact, EngineError> {
            ModelArtifact::from_parts(Arc::new(Fixed(self.0.clone())), r#"["Age"]"#, "{}")
        }
    }

    struct BrokenLoader;

    impl ArtifactLoader for BrokenLoader {
        async fn load(&self) -> Result<ModelArtifact, EngineError> {
            Err(EngineError::ArtifactError("feature_columns.json: not found".into()))
        }
    }

    #[tokio::test]
    async fn test_predict_before_initialize() {
        let client = ModelInferenceClient::new();
        assert_eq!(client.status(), ClientStatus::Uninitialized);
        let result = client.predict(&UserProfile::default()).await;
        assert_eq!(result.unwrap_err(), EngineError::ModelNotReady);
        assert_eq!(client.live_buffers(), 0);
    }

    #[tokio::test]
    async fn test_initialize_then_predict() -> Result<(), EngineError> {
        let client = ModelInferenceClient::new();
        client.initialize(&StaticLoader(vec![0.1, 0.2, 0.7])).await?;
        assert_eq!(client.status(), ClientStatus::Ready);

        let raw = client.predict(&UserProfile::default()).await?;
        assert_eq!(raw.class, EngagementClass::High);
        assert_eq!(client.live_buffers(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_initialize_is_terminal() {
        let client = ModelInferenceClient::new();
        assert!(client.initialize(&BrokenLoader).await.is_err());
        assert_eq!(client.status(), ClientStatus::Error);
        assert!(client.failure().unwrap().contains("feature_columns.json"));

        let retry = client.initialize(&StaticLoader(vec![0.3, 0.3, 0.4])).await;
        assert!(matches!(retry, Err(EngineError::InvalidState(_))));
        assert_eq!(client.status(), ClientStatus::Error);
        assert_eq!(
            client.predict(&UserProfile::default()).await.unwrap_err(),
            EngineError::ModelNotReady
        );
    }
}
