//! Survey-driven UI personalization.
//!
//! A user's survey answers are encoded into a feature vector, run through a
//! pretrained ONNX engagement classifier, and turned into design tokens by a
//! fixed set of rules. The [`PersonalizationOrchestrator`] ties model loading,
//! personalization runs and presets together and pushes every committed token
//! profile to a [`ThemeApplier`].
//!
//! # Basic Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use tailor::{ArtifactDir, PersonalizationOrchestrator, PropertyStore, UserProfileUpdate};
//!
//! let theme = Arc::new(PropertyStore::new());
//! let orchestrator = PersonalizationOrchestrator::new(theme.clone());
//! orchestrator.initialize(&ArtifactDir::new("model")).await?;
//!
//! orchestrator.update_user_profile(&UserProfileUpdate {
//!     age: Some(65),
//!     accessibility: Some(5),
//!     ..Default::default()
//! });
//! let prediction = orchestrator.run_personalization().await?;
//! println!("{}: {:?}", prediction.class_name(), theme.get("--font-base"));
//! # Ok(())
//! # }
//! ```

pub mod engine;
mod runtime;
pub mod artifact_manager;
pub mod orchestrator;
pub mod presets;
pub mod profile;
pub mod theme;
pub mod tokens;

pub use engine::{
    ArtifactDir, ArtifactLoader, EngagementClass, EngineError, ForwardPass, InferenceConfig,
    ModelArtifact, ModelInferenceClient, Prediction, RawPrediction,
};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use artifact_manager::{ArtifactError, ArtifactInfo, ArtifactManager};
pub use orchestrator::{ModelStatus, PersonalizationOrchestrator, PersonalizationState};
pub use presets::Preset;
pub use profile::{Gender, Platform, UserExperience, UserProfile, UserProfileUpdate};
pub use theme::{PropertyStore, ThemeApplier};
pub use tokens::{map_tokens, ColorScheme, ContrastLevel, Density, DesignTokenProfile, Motion};

pub fn init_logger() {
    env_logger::init();
}
