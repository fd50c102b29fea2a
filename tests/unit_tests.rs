// Unit tests for the scoring primitives

mod common;

use std::collections::HashMap;

use common::{create_test_team, flags};
use teamfit_algo::core::{
    encode, heuristic_score, sort_scores, LogisticModel, ProfileRegistry, TrainingParams,
    WeightProfile, SENTIMENT_V1_PROFILE, UNIFORM_PROFILE,
};
use teamfit_algo::models::{AttributeId, TeamScore};

fn demo_names() -> HashMap<AttributeId, String> {
    HashMap::from([
        (1, "Community Engagement".to_string()),
        (2, "Youth Academy".to_string()),
        (3, "Budget Conscious".to_string()),
        (4, "Derby Specialists".to_string()),
    ])
}

#[test]
fn test_encode_bits_are_intersection() {
    let prefs = flags(&[(1, 1), (2, 1), (3, 0), (4, 1)]);
    let team = create_test_team(10, "Harbour", &[(1, 1), (2, 0), (3, 1)]);

    for order in [vec![1, 2, 3, 4], vec![4, 3, 2, 1], vec![2], vec![]] {
        let features = encode(&prefs, &team.attributes, &order);
        assert_eq!(features.len(), order.len());
        for (bit, id) in features.iter().zip(&order) {
            let expected = prefs.is_set(*id) && team.attributes.is_set(*id);
            assert_eq!(*bit, if expected { 1.0 } else { 0.0 });
        }
    }
}

#[test]
fn test_heuristic_bounds() {
    let registry = ProfileRegistry::builtin();
    let names = demo_names();
    let teams = [
        create_test_team(1, "All", &[(1, 1), (2, 1), (3, 1), (4, 1)]),
        create_test_team(2, "None", &[]),
        create_test_team(3, "Some", &[(2, 1), (4, 1)]),
    ];
    let prefs = flags(&[(1, 1), (2, 1), (3, 0), (4, 1)]);

    for profile in [UNIFORM_PROFILE, SENTIMENT_V1_PROFILE] {
        let profile = registry.resolve(profile);
        for team in &teams {
            let score = heuristic_score(&prefs, &team.attributes, profile, &names);
            assert!((0.0..=1.0).contains(&score));
        }
        assert_eq!(heuristic_score(&prefs, &teams[0].attributes, profile, &names), 1.0);
        assert_eq!(heuristic_score(&prefs, &teams[1].attributes, profile, &names), 0.0);
    }
}

#[test]
fn test_heuristic_zero_without_wanted_attributes() {
    let profile = WeightProfile::sentiment_v1();
    let prefs = flags(&[(1, 0), (2, 0)]);
    let team = create_test_team(1, "All", &[(1, 1), (2, 1)]);

    assert_eq!(heuristic_score(&prefs, &team.attributes, &profile, &demo_names()), 0.0);
}

#[test]
fn test_profile_does_not_flip_equal_overlap() {
    // Both teams cover the same wanted attributes, so no profile may separate them
    let registry = ProfileRegistry::builtin();
    let names = demo_names();
    let prefs = flags(&[(1, 1), (2, 1), (3, 1)]);
    let a = create_test_team(1, "A", &[(1, 1), (3, 1), (4, 0)]);
    let b = create_test_team(2, "B", &[(1, 1), (3, 1), (4, 1)]);

    for name in [UNIFORM_PROFILE, SENTIMENT_V1_PROFILE] {
        let profile = registry.resolve(name);
        let sa = heuristic_score(&prefs, &a.attributes, profile, &names);
        let sb = heuristic_score(&prefs, &b.attributes, profile, &names);
        assert_eq!(sa, sb, "profile {} separated equal overlap", name);
    }
}

#[test]
fn test_sentiment_profile_reweights() {
    let names = demo_names();
    let prefs = flags(&[(1, 1), (3, 1)]);
    let engaged = create_test_team(1, "Engaged", &[(1, 1)]);

    let uniform = heuristic_score(&prefs, &engaged.attributes, &WeightProfile::uniform(), &names);
    let sentiment =
        heuristic_score(&prefs, &engaged.attributes, &WeightProfile::sentiment_v1(), &names);

    assert_eq!(uniform, 0.5);
    // Community Engagement 1.4 against Budget Conscious 1.0
    assert!((sentiment - 1.4 / 2.4).abs() < 1e-12);
}

#[test]
fn test_unknown_profile_falls_back_to_uniform() {
    let registry = ProfileRegistry::builtin();
    assert_eq!(registry.resolve("does-not-exist").name(), UNIFORM_PROFILE);
    assert_eq!(registry.resolve("Sentiment_V1").name(), SENTIMENT_V1_PROFILE);
}

#[test]
fn test_sort_scores_ties_by_team_id() {
    let mut scores = vec![
        TeamScore { team_id: 7, team_name: "G".into(), score: 0.4 },
        TeamScore { team_id: 3, team_name: "C".into(), score: 0.9 },
        TeamScore { team_id: 5, team_name: "E".into(), score: 0.4 },
    ];
    sort_scores(&mut scores);

    let order: Vec<i64> = scores.iter().map(|s| s.team_id).collect();
    assert_eq!(order, vec![3, 5, 7]);
}

#[test]
fn test_classifier_probabilities_in_unit_interval() {
    let features = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let labels = vec![true, true, false, false];
    let model = LogisticModel::fit(&features, &labels, &TrainingParams::default()).unwrap();

    for row in &features {
        let p = model.predict_proba(row).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }
    assert!(model.predict_proba(&[1.0, 0.0]).unwrap() > model.predict_proba(&[0.0, 1.0]).unwrap());
    assert!(model.predict_proba(&[1.0]).is_err());
}
