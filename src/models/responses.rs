use serde::{Deserialize, Serialize};

use crate::models::domain::{QuestionnaireId, TeamScore, TrainOutcome};

/// Response for the predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub questionnaire_id: QuestionnaireId,
    pub scores: Vec<TeamScore>,
    pub model_used: Option<String>,
    pub weights_profile: String,
}

/// Response for the train endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResponse {
    pub status: String,
    pub partition: String,
    #[serde(flatten)]
    pub outcome: TrainOutcome,
}

/// Response for the model deletion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteModelResponse {
    pub status: String,
    pub partition: String,
    pub removed: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
