use std::collections::HashMap;

use crate::core::encoder::encode;
use crate::core::error::EngineError;
use crate::core::scoring::{heuristic_score, ProfileRegistry};
use crate::core::store::{ModelArtifact, ModelStore};
use crate::models::{AttributeId, Partition, PreferenceSet, Team, TeamScore};

/// Ranked scores plus which path produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub scores: Vec<TeamScore>,
    /// Model family used, `None` when only the heuristic ran
    pub model_used: Option<String>,
    /// Weight profile actually applied after fallback
    pub profile: String,
}

/// Blends heuristic and model scores into a ranking.
///
/// # Scoring
/// - no model: `heuristic`
/// - model and a blend in [0, 1]: `blend * model + (1 - blend) * heuristic`
/// - model without a usable blend: `model`
#[derive(Debug, Clone)]
pub struct Predictor {
    store: ModelStore,
    profiles: ProfileRegistry,
}

impl Predictor {
    pub fn new(store: ModelStore, profiles: ProfileRegistry) -> Self {
        Self { store, profiles }
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    /// Score every team for a preference set using the partition's latest model
    pub fn predict(
        &self,
        preferences: &PreferenceSet,
        teams: &[Team],
        attribute_names: &HashMap<AttributeId, String>,
        profile_name: &str,
        blend: Option<f64>,
        partition: &Partition,
    ) -> Result<Prediction, EngineError> {
        let artifact = self.store.load(partition)?;
        if artifact.is_none() {
            tracing::debug!("No model for partition {}, scoring by heuristic only", partition);
        }

        self.rank(
            preferences,
            teams,
            attribute_names,
            profile_name,
            blend,
            artifact.as_ref(),
        )
    }

    /// Score against an already loaded model (or none)
    pub fn rank(
        &self,
        preferences: &PreferenceSet,
        teams: &[Team],
        attribute_names: &HashMap<AttributeId, String>,
        profile_name: &str,
        blend: Option<f64>,
        artifact: Option<&ModelArtifact>,
    ) -> Result<Prediction, EngineError> {
        let profile = self.profiles.resolve(profile_name);
        let blend = blend.filter(|b| b.is_finite() && (0.0..=1.0).contains(b));

        let mut scores = Vec::with_capacity(teams.len());
        for team in teams {
            let heuristic = heuristic_score(preferences, &team.attributes, profile, attribute_names);

            let score = match artifact {
                None => heuristic,
                Some(artifact) => {
                    // Training-time order, never the live attribute list
                    let features = encode(preferences, &team.attributes, artifact.attribute_ids());
                    let model_prob = artifact
                        .model
                        .predict_proba(&features)
                        .map_err(|e| EngineError::CorruptArtifact(e.to_string()))?;
                    match blend {
                        Some(b) => b * model_prob + (1.0 - b) * heuristic,
                        None => model_prob,
                    }
                }
            };

            scores.push(TeamScore {
                team_id: team.id,
                team_name: team.name.clone(),
                score,
            });
        }

        sort_scores(&mut scores);

        Ok(Prediction {
            scores,
            model_used: artifact.map(|a| a.model_family().to_string()),
            profile: profile.name().to_string(),
        })
    }
}

/// Highest score first; equal scores by ascending team id
pub fn sort_scores(scores: &mut [TeamScore]) {
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
}
