use thiserror::Error;

/// Errors raised by the scoring and training engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No feedback available for training")]
    NoTrainingData,

    #[error("Not enough class variety in feedback to train a model")]
    InsufficientLabelDiversity,

    #[error("Model store I/O error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt model artifact: {0}")]
    CorruptArtifact(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl EngineError {
    /// Stable machine-readable kind, surfaced alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::Validation(_) => "validation_error",
            EngineError::NoTrainingData => "no_training_data",
            EngineError::InsufficientLabelDiversity => "insufficient_label_diversity",
            EngineError::Storage(_) => "storage_error",
            EngineError::Serialization(_) => "serialization_error",
            EngineError::CorruptArtifact(_) => "corrupt_artifact",
            EngineError::Catalog(_) => "catalog_error",
        }
    }

    /// Whether the caller can fix the failure by changing input or data
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::NotFound(_)
                | EngineError::Validation(_)
                | EngineError::NoTrainingData
                | EngineError::InsufficientLabelDiversity
        )
    }
}
