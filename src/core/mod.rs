// Core engine exports
pub mod analytics;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod predictor;
pub mod scoring;
pub mod store;
pub mod trainer;

pub use analytics::{summarize, AnalyticsReport, AttributePopularity, TeamSupportRate};
pub use classifier::{LogisticModel, TrainingParams, MODEL_FAMILY};
pub use encoder::encode;
pub use error::EngineError;
pub use predictor::{sort_scores, Prediction, Predictor};
pub use scoring::{heuristic_score, ProfileRegistry, WeightProfile, SENTIMENT_V1_PROFILE, UNIFORM_PROFILE};
pub use store::{ModelArtifact, ModelMetadata, ModelStore};
pub use trainer::{build_dataset, Dataset, PreferenceLookup, Trainer};
