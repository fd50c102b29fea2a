use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::core::EngineError;
use crate::models::{
    Attribute, AttributeId, EntityId, FeedbackRow, FlagSet, Partition, PreferenceSet,
    QuestionnaireId, Team,
};
use crate::services::catalog::Catalog;

#[derive(Debug, Default)]
struct State {
    attributes: BTreeMap<AttributeId, Attribute>,
    teams: BTreeMap<EntityId, Team>,
    questionnaires: BTreeMap<QuestionnaireId, PreferenceSet>,
    feedback: Vec<FeedbackRow>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_attributes<'a, I>(&self, ids: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = &'a AttributeId>,
    {
        for id in ids {
            if !self.attributes.contains_key(id) {
                return Err(EngineError::Validation(format!("Attribute {} does not exist", id)));
            }
        }
        Ok(())
    }
}

/// Catalog held in process memory.
///
/// Enforces the same rules as the database-backed catalog: unique names
/// (case-insensitive), known attribute ids, existing questionnaires and
/// teams for feedback.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<State>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_attribute(&self, name: &str) -> Result<AttributeId, EngineError> {
        let mut state = self.state.write().await;
        if state.attributes.values().any(|a| a.name.eq_ignore_ascii_case(name)) {
            return Err(EngineError::Validation(format!("Attribute name already exists: {}", name)));
        }
        let id = state.next_id();
        state.attributes.insert(
            id,
            Attribute {
                id,
                name: name.to_string(),
                description: None,
                active: true,
            },
        );
        Ok(id)
    }

    pub async fn add_team(
        &self,
        name: &str,
        meta: Option<serde_json::Value>,
    ) -> Result<EntityId, EngineError> {
        let mut state = self.state.write().await;
        if state.teams.values().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(EngineError::Validation(format!("Team name already exists: {}", name)));
        }
        let id = state.next_id();
        state.teams.insert(
            id,
            Team {
                id,
                name: name.to_string(),
                meta,
                attributes: FlagSet::new(),
            },
        );
        Ok(id)
    }

    /// Upsert attribute values for a team
    pub async fn set_team_attributes(
        &self,
        team_id: EntityId,
        values: &[(AttributeId, bool)],
    ) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        state.check_attributes(values.iter().map(|(id, _)| id))?;
        let team = state
            .teams
            .get_mut(&team_id)
            .ok_or_else(|| EngineError::NotFound(format!("Team {}", team_id)))?;
        for &(id, value) in values {
            team.attributes.insert(id, value);
        }
        Ok(())
    }

    pub async fn create_questionnaire(&self) -> QuestionnaireId {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.questionnaires.insert(id, FlagSet::new());
        id
    }

    /// Upsert questionnaire answers
    pub async fn submit_responses(
        &self,
        questionnaire_id: QuestionnaireId,
        values: &[(AttributeId, bool)],
    ) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        state.check_attributes(values.iter().map(|(id, _)| id))?;
        let prefs = state
            .questionnaires
            .get_mut(&questionnaire_id)
            .ok_or_else(|| EngineError::NotFound(format!("Questionnaire {}", questionnaire_id)))?;
        for &(id, value) in values {
            prefs.insert(id, value);
        }
        Ok(())
    }

    pub async fn submit_feedback(
        &self,
        questionnaire_id: QuestionnaireId,
        team_id: EntityId,
        supported: bool,
    ) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        if !state.questionnaires.contains_key(&questionnaire_id) || !state.teams.contains_key(&team_id) {
            return Err(EngineError::NotFound("Questionnaire or Team".to_string()));
        }
        state.feedback.push(FeedbackRow {
            questionnaire_id,
            team_id,
            supported,
        });
        Ok(())
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn attributes(&self) -> Result<Vec<Attribute>, EngineError> {
        Ok(self.state.read().await.attributes.values().cloned().collect())
    }

    async fn teams(&self, partition: &Partition) -> Result<Vec<Team>, EngineError> {
        Ok(self
            .state
            .read()
            .await
            .teams
            .values()
            .filter(|t| t.in_partition(partition))
            .cloned()
            .collect())
    }

    async fn preference_set(
        &self,
        questionnaire_id: QuestionnaireId,
    ) -> Result<Option<PreferenceSet>, EngineError> {
        Ok(self.state.read().await.questionnaires.get(&questionnaire_id).cloned())
    }

    async fn questionnaires(&self) -> Result<Vec<PreferenceSet>, EngineError> {
        Ok(self.state.read().await.questionnaires.values().cloned().collect())
    }

    async fn feedback(&self) -> Result<Vec<FeedbackRow>, EngineError> {
        Ok(self.state.read().await.feedback.clone())
    }
}
