use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::EngineError;
use crate::models::{Attribute, FeedbackRow, Partition, PreferenceSet, QuestionnaireId, Team};

/// Read access to the stored attributes, teams, questionnaires and feedback.
///
/// Implementations return already-validated data in a stable order
/// (ascending id) so feature positions line up across calls.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every attribute, active or not, ordered by id
    async fn attributes(&self) -> Result<Vec<Attribute>, EngineError>;

    /// Teams of a partition with their attribute sets, ordered by id
    async fn teams(&self, partition: &Partition) -> Result<Vec<Team>, EngineError>;

    /// Responses recorded for a questionnaire; `None` if it does not exist
    async fn preference_set(
        &self,
        questionnaire_id: QuestionnaireId,
    ) -> Result<Option<PreferenceSet>, EngineError>;

    /// Bulk variant of [`Catalog::preference_set`]; unknown ids are omitted
    async fn preference_sets(
        &self,
        questionnaire_ids: &[QuestionnaireId],
    ) -> Result<HashMap<QuestionnaireId, PreferenceSet>, EngineError> {
        let mut sets = HashMap::with_capacity(questionnaire_ids.len());
        for &id in questionnaire_ids {
            if let Some(prefs) = self.preference_set(id).await? {
                sets.insert(id, prefs);
            }
        }
        Ok(sets)
    }

    /// Every questionnaire's responses, used for analytics
    async fn questionnaires(&self) -> Result<Vec<PreferenceSet>, EngineError>;

    /// All feedback in insertion order
    async fn feedback(&self) -> Result<Vec<FeedbackRow>, EngineError>;

    /// Whether the backing store is reachable
    async fn health_check(&self) -> Result<bool, EngineError> {
        Ok(true)
    }
}
