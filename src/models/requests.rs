use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::QuestionnaireId;

/// Request to rank teams for a questionnaire
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "questionnaireId")]
    pub questionnaire_id: QuestionnaireId,
    /// Share of the model probability in the final score
    #[serde(default)]
    pub blend: Option<f64>,
    #[serde(default, alias = "weightsProfile")]
    pub weights_profile: Option<String>,
}

/// Partition selector shared by train, predict and admin routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartitionQuery {
    #[serde(default, alias = "sport")]
    pub partition: Option<String>,
}
