//! Teamfit Algo - team recommendation scoring and training engine
//!
//! Ranks sports teams for a fan's questionnaire by blending a weighted
//! attribute-overlap heuristic with a logistic model learned from
//! support feedback. Models are trained and stored per sport partition.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{encode, heuristic_score, EngineError, ModelStore, Predictor, ProfileRegistry, Trainer, WeightProfile};
pub use models::{Attribute, FeedbackRow, Partition, PreferenceSet, Team, TeamScore, TrainOutcome};
pub use services::{Catalog, InMemoryCatalog, Recommender};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlagSet;

    #[test]
    fn test_library_exports() {
        let prefs = FlagSet::from_pairs(vec![(1, 1), (2, 0)]);
        let attrs = FlagSet::from_pairs(vec![(1, 1)]);
        assert_eq!(encode(&prefs, &attrs, &[1, 2]), vec![1.0, 0.0]);
    }
}
