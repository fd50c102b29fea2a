use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::core::{
    summarize, AnalyticsReport, EngineError, ModelStore, Prediction, Predictor, ProfileRegistry,
    Trainer, TrainingParams,
};
use crate::models::{AttributeId, EntityId, Partition, QuestionnaireId, TrainOutcome};
use crate::services::catalog::Catalog;

/// Train / predict / delete entry points wired to a catalog and model store.
///
/// Every call reads a fresh snapshot from the catalog. Training runs for the
/// same partition must not overlap; callers serialize them.
pub struct Recommender<C: Catalog + ?Sized> {
    catalog: Arc<C>,
    store: ModelStore,
    trainer: Trainer,
    predictor: Predictor,
    default_profile: String,
}

impl<C: Catalog + ?Sized> Clone for Recommender<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            store: self.store.clone(),
            trainer: self.trainer.clone(),
            predictor: self.predictor.clone(),
            default_profile: self.default_profile.clone(),
        }
    }
}

impl<C: Catalog + ?Sized> Recommender<C> {
    pub fn new(
        catalog: Arc<C>,
        store: ModelStore,
        profiles: ProfileRegistry,
        params: TrainingParams,
        default_profile: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            trainer: Trainer::new(store.clone(), params),
            predictor: Predictor::new(store.clone(), profiles),
            store,
            default_profile: default_profile.into(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Fit and persist a model for the partition from all stored feedback;
    /// returns the resolved partition alongside the outcome
    pub async fn train(
        &self,
        partition: Option<&str>,
    ) -> Result<(Partition, TrainOutcome), EngineError> {
        let partition = Partition::parse(partition)?;

        let feedback = self.catalog.feedback().await?;
        let attribute_ids: Vec<AttributeId> = self
            .catalog
            .attributes()
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        let teams = self.catalog.teams(&partition).await?;

        // Fetch only the questionnaires whose feedback survives the filter
        let team_ids: HashSet<EntityId> = teams.iter().map(|t| t.id).collect();
        let questionnaire_ids: Vec<QuestionnaireId> = feedback
            .iter()
            .filter(|f| team_ids.contains(&f.team_id))
            .map(|f| f.questionnaire_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let preferences = self.catalog.preference_sets(&questionnaire_ids).await?;

        tracing::info!(
            "Training partition {}: {} feedback rows, {} teams, {} attributes",
            partition,
            feedback.len(),
            teams.len(),
            attribute_ids.len()
        );

        let outcome =
            self.trainer
                .train(&feedback, &attribute_ids, &teams, &preferences, &partition)?;
        Ok((partition, outcome))
    }

    /// Rank the partition's teams for a questionnaire
    pub async fn predict(
        &self,
        questionnaire_id: QuestionnaireId,
        blend: Option<f64>,
        profile_name: Option<&str>,
        partition: Option<&str>,
    ) -> Result<Prediction, EngineError> {
        let partition = Partition::parse(partition)?;

        let preferences = self
            .catalog
            .preference_set(questionnaire_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Questionnaire {}", questionnaire_id)))?;

        let attributes = self.catalog.attributes().await?;
        let attribute_ids: Vec<AttributeId> = attributes.iter().map(|a| a.id).collect();
        preferences.validate_against(&attribute_ids)?;
        let attribute_names: HashMap<AttributeId, String> =
            attributes.into_iter().map(|a| (a.id, a.name)).collect();

        let teams = self.catalog.teams(&partition).await?;
        let profile_name = profile_name.unwrap_or(&self.default_profile);

        let prediction = self.predictor.predict(
            &preferences,
            &teams,
            &attribute_names,
            profile_name,
            blend,
            &partition,
        )?;

        tracing::info!(
            "Ranked {} teams for questionnaire {} (partition {}, model {:?}, profile {})",
            prediction.scores.len(),
            questionnaire_id,
            partition,
            prediction.model_used,
            prediction.profile
        );

        Ok(prediction)
    }

    /// Drop the partition's model; returns the removed artifact names
    pub async fn delete_model(
        &self,
        partition: Option<&str>,
    ) -> Result<(Partition, Vec<String>), EngineError> {
        let partition = Partition::parse(partition)?;
        let removed = self.store.delete(&partition)?;
        Ok((partition, removed))
    }

    /// Answer and feedback statistics across all stored data
    pub async fn analytics(&self) -> Result<AnalyticsReport, EngineError> {
        let attributes = self.catalog.attributes().await?;
        let questionnaires = self.catalog.questionnaires().await?;
        let teams = self.catalog.teams(&Partition::Default).await?;
        let feedback = self.catalog.feedback().await?;

        Ok(summarize(&attributes, &questionnaires, &teams, &feedback))
    }
}
