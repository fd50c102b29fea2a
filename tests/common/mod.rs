// Shared fixtures for the integration test suites
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use teamfit_algo::core::{ModelStore, ProfileRegistry, TrainingParams, UNIFORM_PROFILE};
use teamfit_algo::models::{AttributeId, EntityId, FlagSet, QuestionnaireId, Team};
use teamfit_algo::{InMemoryCatalog, Recommender};

pub fn flags(pairs: &[(AttributeId, i32)]) -> FlagSet {
    FlagSet::from_pairs(pairs.iter().copied())
}

pub fn create_test_team(id: EntityId, name: &str, pairs: &[(AttributeId, i32)]) -> Team {
    Team {
        id,
        name: name.to_string(),
        meta: None,
        attributes: flags(pairs),
    }
}

pub fn recommender(catalog: Arc<InMemoryCatalog>, dir: &Path) -> Recommender<InMemoryCatalog> {
    Recommender::new(
        catalog,
        ModelStore::new(dir),
        ProfileRegistry::builtin(),
        TrainingParams::default(),
        UNIFORM_PROFILE,
    )
}

/// Ids handed out by [`seed_demo`]
pub struct Demo {
    pub attributes: Vec<AttributeId>,
    pub city: EntityId,
    pub united: EntityId,
    pub rovers: EntityId,
    pub q1: QuestionnaireId,
    pub q2: QuestionnaireId,
}

/// Five attributes, three teams, two questionnaires and six feedback rows
pub async fn seed_demo(catalog: &InMemoryCatalog) -> Demo {
    let mut attributes = Vec::new();
    for name in [
        "Offensive Style",
        "Defense Focus",
        "Youth Development",
        "Local Talent",
        "Big Budget",
    ] {
        attributes.push(catalog.add_attribute(name).await.unwrap());
    }
    let with = |bits: [bool; 5]| -> Vec<(AttributeId, bool)> {
        attributes.iter().copied().zip(bits).collect()
    };

    let city = catalog
        .add_team("City FC", Some(serde_json::json!({"league": "Premier"})))
        .await
        .unwrap();
    let united = catalog
        .add_team("United SC", Some(serde_json::json!({"league": "Championship"})))
        .await
        .unwrap();
    let rovers = catalog
        .add_team("Rovers", Some(serde_json::json!({"league": "League One"})))
        .await
        .unwrap();

    catalog
        .set_team_attributes(city, &with([true, false, true, false, true]))
        .await
        .unwrap();
    catalog
        .set_team_attributes(united, &with([false, true, false, true, false]))
        .await
        .unwrap();
    catalog
        .set_team_attributes(rovers, &with([true, true, false, true, false]))
        .await
        .unwrap();

    let q1 = catalog.create_questionnaire().await;
    let q2 = catalog.create_questionnaire().await;
    catalog
        .submit_responses(q1, &with([true, false, true, false, true]))
        .await
        .unwrap();
    catalog
        .submit_responses(q2, &with([false, true, false, true, false]))
        .await
        .unwrap();

    for (q, team, supported) in [
        (q1, city, true),
        (q1, united, false),
        (q1, rovers, true),
        (q2, city, false),
        (q2, united, true),
        (q2, rovers, true),
    ] {
        catalog.submit_feedback(q, team, supported).await.unwrap();
    }

    Demo {
        attributes,
        city,
        united,
        rovers,
        q1,
        q2,
    }
}
