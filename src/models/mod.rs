// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Attribute, AttributeId, AttributeSet, EntityId, FeedbackRow, FlagSet, Partition, PartitionName, PreferenceSet, QuestionnaireId, Team, TeamScore, TrainOutcome};
pub use requests::{PartitionQuery, PredictRequest};
pub use responses::{DeleteModelResponse, ErrorResponse, HealthResponse, PredictResponse, TrainResponse};
