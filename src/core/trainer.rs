use std::collections::{HashMap, HashSet};

use crate::core::classifier::{LogisticModel, TrainingParams};
use crate::core::encoder::encode;
use crate::core::error::EngineError;
use crate::core::store::ModelStore;
use crate::models::{
    AttributeId, EntityId, FeedbackRow, Partition, PreferenceSet, QuestionnaireId, Team,
    TrainOutcome,
};

/// Source of the preference set a piece of feedback was given under
pub trait PreferenceLookup {
    /// `None` when no questionnaire with this id exists
    fn preference_set(&self, id: QuestionnaireId) -> Option<PreferenceSet>;
}

impl PreferenceLookup for HashMap<QuestionnaireId, PreferenceSet> {
    fn preference_set(&self, id: QuestionnaireId) -> Option<PreferenceSet> {
        self.get(&id).cloned()
    }
}

/// Labeled examples in a fixed feature order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<bool>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of distinct label values present
    pub fn label_variety(&self) -> usize {
        let positives = self.labels.iter().any(|l| *l);
        let negatives = self.labels.iter().any(|l| !*l);
        positives as usize + negatives as usize
    }
}

/// Turn feedback into labeled feature vectors.
///
/// Feedback for teams outside `teams` is dropped, which keeps one
/// partition's history out of another partition's model. Each preference set
/// is looked up once no matter how many feedback rows reference it.
pub fn build_dataset<L: PreferenceLookup + ?Sized>(
    feedback: &[FeedbackRow],
    attribute_universe: &[AttributeId],
    teams: &[Team],
    lookup: &L,
) -> Result<Dataset, EngineError> {
    let teams_by_id: HashMap<EntityId, &Team> = teams.iter().map(|t| (t.id, t)).collect();
    let mut preference_cache: HashMap<QuestionnaireId, PreferenceSet> = HashMap::new();
    let mut dataset = Dataset::default();
    let mut skipped = 0usize;

    for row in feedback {
        let team = match teams_by_id.get(&row.team_id) {
            Some(team) => team,
            None => {
                skipped += 1;
                continue;
            }
        };

        if !preference_cache.contains_key(&row.questionnaire_id) {
            let prefs = lookup.preference_set(row.questionnaire_id).ok_or_else(|| {
                EngineError::NotFound(format!("Questionnaire {}", row.questionnaire_id))
            })?;
            preference_cache.insert(row.questionnaire_id, prefs);
        }
        let prefs = &preference_cache[&row.questionnaire_id];

        dataset
            .features
            .push(encode(prefs, &team.attributes, attribute_universe));
        dataset.labels.push(row.supported);
    }

    tracing::debug!(
        "Built dataset: {} rows kept, {} outside the team universe, {} questionnaires",
        dataset.len(),
        skipped,
        preference_cache.len()
    );

    Ok(dataset)
}

/// Fits a fresh model for one partition and commits it to the store
#[derive(Debug, Clone)]
pub struct Trainer {
    store: ModelStore,
    params: TrainingParams,
}

impl Trainer {
    pub fn new(store: ModelStore, params: TrainingParams) -> Self {
        Self { store, params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Refit from scratch over all retained feedback.
    ///
    /// Nothing is written unless fitting succeeds.
    pub fn train<L: PreferenceLookup + ?Sized>(
        &self,
        feedback: &[FeedbackRow],
        attribute_universe: &[AttributeId],
        teams: &[Team],
        lookup: &L,
        partition: &Partition,
    ) -> Result<TrainOutcome, EngineError> {
        let dataset = build_dataset(feedback, attribute_universe, teams, lookup)?;

        if dataset.is_empty() {
            return Err(EngineError::NoTrainingData);
        }
        if dataset.label_variety() < 2 {
            return Err(EngineError::InsufficientLabelDiversity);
        }

        let model = LogisticModel::fit(&dataset.features, &dataset.labels, &self.params)?;

        let team_ids: Vec<EntityId> = teams.iter().map(|t| t.id).collect();
        self.store
            .save(&model, attribute_universe, &team_ids, partition)?;

        let universe: HashSet<EntityId> = team_ids.iter().copied().collect();
        let distinct_teams: HashSet<EntityId> = feedback
            .iter()
            .map(|f| f.team_id)
            .filter(|id| universe.contains(id))
            .collect();
        tracing::info!(
            "Trained partition {} on {} rows ({} teams with feedback, {} features)",
            partition,
            dataset.len(),
            distinct_teams.len(),
            attribute_universe.len()
        );

        Ok(TrainOutcome {
            trained_on_rows: dataset.len(),
            attributes: attribute_universe.to_vec(),
            teams: team_ids,
            saved: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlagSet;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn team(id: EntityId, attrs: Vec<(AttributeId, i32)>) -> Team {
        Team {
            id,
            name: format!("Team {}", id),
            meta: None,
            attributes: FlagSet::from_pairs(attrs),
        }
    }

    fn fb(questionnaire_id: QuestionnaireId, team_id: EntityId, supported: bool) -> FeedbackRow {
        FeedbackRow {
            questionnaire_id,
            team_id,
            supported,
        }
    }

    struct CountingLookup {
        inner: HashMap<QuestionnaireId, PreferenceSet>,
        calls: Cell<usize>,
    }

    impl PreferenceLookup for CountingLookup {
        fn preference_set(&self, id: QuestionnaireId) -> Option<PreferenceSet> {
            self.calls.set(self.calls.get() + 1);
            self.inner.get(&id).cloned()
        }
    }

    #[test]
    fn test_dataset_encodes_intersection() {
        let lookup = HashMap::from([(1, FlagSet::from_pairs(vec![(10, 1), (20, 1)]))]);
        let teams = vec![team(100, vec![(10, 1), (20, 0), (30, 1)])];

        let dataset = build_dataset(&[fb(1, 100, true)], &[10, 20, 30], &teams, &lookup).unwrap();

        assert_eq!(dataset.features, vec![vec![1.0, 0.0, 0.0]]);
        assert_eq!(dataset.labels, vec![true]);
    }

    #[test]
    fn test_dataset_caches_preference_lookups() {
        let lookup = CountingLookup {
            inner: HashMap::from([(1, FlagSet::from_pairs(vec![(10, 1)]))]),
            calls: Cell::new(0),
        };
        let teams = vec![team(100, vec![(10, 1)]), team(200, vec![])];
        let feedback = vec![fb(1, 100, true), fb(1, 200, false), fb(1, 100, true)];

        let dataset = build_dataset(&feedback, &[10], &teams, &lookup).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(lookup.calls.get(), 1);
    }

    #[test]
    fn test_dataset_missing_questionnaire_is_not_found() {
        let lookup: HashMap<QuestionnaireId, PreferenceSet> = HashMap::new();
        let teams = vec![team(100, vec![])];

        let result = build_dataset(&[fb(9, 100, true)], &[], &teams, &lookup);
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_train_filters_out_of_partition_feedback() {
        let dir = TempDir::new().unwrap();
        let trainer = Trainer::new(ModelStore::new(dir.path()), TrainingParams::default());
        let lookup = HashMap::from([(1, FlagSet::from_pairs(vec![(10, 1)]))]);
        let teams = vec![team(100, vec![(10, 1)]), team(200, vec![])];
        let feedback = vec![fb(1, 100, true), fb(1, 200, false), fb(1, 999, true)];

        let outcome = trainer
            .train(&feedback, &[10], &teams, &lookup, &Partition::Default)
            .unwrap();

        assert_eq!(outcome.trained_on_rows, 2);
        assert_eq!(outcome.teams, vec![100, 200]);
        assert!(outcome.saved);
    }

    #[test]
    fn test_train_single_label_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let trainer = Trainer::new(store.clone(), TrainingParams::default());
        let lookup = HashMap::from([(1, FlagSet::from_pairs(vec![(10, 1)]))]);
        let teams = vec![team(100, vec![(10, 1)])];

        let result = trainer.train(
            &[fb(1, 100, true), fb(1, 100, true)],
            &[10],
            &teams,
            &lookup,
            &Partition::Default,
        );

        assert!(matches!(result, Err(EngineError::InsufficientLabelDiversity)));
        assert!(store.load(&Partition::Default).unwrap().is_none());
    }

    #[test]
    fn test_named_partition_keeps_default_model() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let trainer = Trainer::new(store.clone(), TrainingParams::default());
        let lookup = HashMap::from([(1, FlagSet::from_pairs(vec![(10, 1)]))]);
        let tagged = |id, sport: &str| Team {
            meta: Some(serde_json::json!({ "sport": sport })),
            ..team(id, vec![(10, (id % 200 == 100) as i32)])
        };
        let teams = vec![tagged(100, ""), tagged(200, ""), tagged(300, "rugby")];
        let feedback = vec![fb(1, 100, true), fb(1, 200, false), fb(1, 300, true)];

        trainer
            .train(&feedback, &[10], &teams, &lookup, &Partition::Default)
            .unwrap();

        // Blank names resolve to the default partition itself, never a named one
        assert_eq!(Partition::parse(Some("")).unwrap(), Partition::Default);

        let rugby = Partition::parse(Some("Rugby")).unwrap();
        let rugby_teams: Vec<Team> = teams
            .iter()
            .filter(|t| t.in_partition(&rugby))
            .cloned()
            .collect();
        let rugby_feedback = vec![fb(1, 300, true), fb(1, 300, false)];
        trainer
            .train(&rugby_feedback, &[10], &rugby_teams, &lookup, &rugby)
            .unwrap();

        let default = store.load(&Partition::Default).unwrap().unwrap();
        assert_eq!(default.entity_ids(), &[100, 200, 300]);
        let named = store.load(&rugby).unwrap().unwrap();
        assert_eq!(named.entity_ids(), &[300]);
    }

    #[test]
    fn test_train_without_rows_is_no_training_data() {
        let dir = TempDir::new().unwrap();
        let trainer = Trainer::new(ModelStore::new(dir.path()), TrainingParams::default());
        let lookup: HashMap<QuestionnaireId, PreferenceSet> = HashMap::new();
        let teams = vec![team(100, vec![])];

        let result = trainer.train(&[fb(1, 555, true)], &[10], &teams, &lookup, &Partition::Default);
        assert!(matches!(result, Err(EngineError::NoTrainingData)));
    }
}
