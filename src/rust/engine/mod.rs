//! The personalization engine: artifact loading, feature encoding, inference
//! and the rules layered on top of the classifier.

mod error;
mod artifact;
mod client;
mod encoder;
mod forward;
mod prediction;
pub mod rules;

pub use error::EngineError;
pub use artifact::{ArtifactDir, ArtifactLoader, ModelArtifact, COLUMNS_FILE, ENCODERS_FILE, MODEL_FILE};
pub use client::{ClientStatus, ModelInferenceClient};
pub use encoder::{encode_features, EncoderTables, FeatureColumn, FeatureValue, NEUTRAL_VALUE};
pub use forward::{ForwardPass, InferenceConfig, OnnxClassifier};
pub use prediction::{EngagementClass, Prediction, RawPrediction, CLASS_LABELS, NUM_CLASSES};
