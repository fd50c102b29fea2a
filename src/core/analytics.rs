use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Attribute, AttributeId, EntityId, FeedbackRow, PreferenceSet, Team};

/// How often users answered "yes" to an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePopularity {
    pub attribute_id: AttributeId,
    pub name: String,
    pub yes_count: u64,
    pub total_answers: u64,
    pub yes_rate: f64,
}

/// Share of feedback that supported a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSupportRate {
    pub team_id: EntityId,
    pub team_name: String,
    pub support_yes: u64,
    pub total: u64,
    pub support_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_questionnaires: usize,
    pub total_feedback: usize,
    pub total_teams: usize,
    pub total_attributes: usize,
    pub attribute_popularity: Vec<AttributePopularity>,
    pub team_support_rate: Vec<TeamSupportRate>,
}

#[inline]
fn rate(yes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        yes as f64 / total as f64
    }
}

/// Aggregate answer and feedback counts, ordered by attribute / team id
pub fn summarize(
    attributes: &[Attribute],
    questionnaires: &[PreferenceSet],
    teams: &[Team],
    feedback: &[FeedbackRow],
) -> AnalyticsReport {
    let mut answers: HashMap<AttributeId, (u64, u64)> = HashMap::new();
    for prefs in questionnaires {
        for (id, value) in prefs.answers() {
            let entry = answers.entry(id).or_default();
            entry.0 += value as u64;
            entry.1 += 1;
        }
    }

    let mut support: HashMap<EntityId, (u64, u64)> = HashMap::new();
    for row in feedback {
        let entry = support.entry(row.team_id).or_default();
        entry.0 += row.supported as u64;
        entry.1 += 1;
    }

    let mut attribute_popularity: Vec<AttributePopularity> = attributes
        .iter()
        .map(|a| {
            let (yes, total) = answers.get(&a.id).copied().unwrap_or_default();
            AttributePopularity {
                attribute_id: a.id,
                name: a.name.clone(),
                yes_count: yes,
                total_answers: total,
                yes_rate: rate(yes, total),
            }
        })
        .collect();
    attribute_popularity.sort_by_key(|a| a.attribute_id);

    let mut team_support_rate: Vec<TeamSupportRate> = teams
        .iter()
        .map(|t| {
            let (yes, total) = support.get(&t.id).copied().unwrap_or_default();
            TeamSupportRate {
                team_id: t.id,
                team_name: t.name.clone(),
                support_yes: yes,
                total,
                support_rate: rate(yes, total),
            }
        })
        .collect();
    team_support_rate.sort_by_key(|t| t.team_id);

    AnalyticsReport {
        total_questionnaires: questionnaires.len(),
        total_feedback: feedback.len(),
        total_teams: teams.len(),
        total_attributes: attributes.len(),
        attribute_popularity,
        team_support_rate,
    }
}
