use std::collections::HashMap;

use crate::core::error::EngineError;
use crate::models::{AttributeId, AttributeSet, PreferenceSet};

/// Profile applied when a caller names nothing or something unknown
pub const UNIFORM_PROFILE: &str = "uniform";

/// Built-in profile boosting the attributes fans weigh most
pub const SENTIMENT_V1_PROFILE: &str = "sentiment_v1";

const SENTIMENT_V1_WEIGHTS: &[(&str, f64)] = &[
    ("Community Engagement", 1.4),
    ("Possession Play", 1.2),
    ("Youth Academy", 1.3),
    ("National Team Contributors", 1.3),
    ("Iconic Players", 1.2),
    ("Atmospheric Stadium", 1.2),
    ("Budget Conscious", 1.0),
    ("Derby Specialists", 1.1),
    ("Big Match Temperament", 1.2),
    ("Sustainability Focus", 1.0),
    ("Historic Success", 1.3),
    ("Global Fanbase", 1.2),
];

/// Named overlay of attribute weights on top of a uniform 1.0 baseline
#[derive(Debug, Clone, PartialEq)]
pub struct WeightProfile {
    name: String,
    weights: HashMap<String, f64>,
}

impl WeightProfile {
    /// Create a profile, rejecting weights that are not positive and finite
    pub fn new(name: impl Into<String>, weights: HashMap<String, f64>) -> Result<Self, EngineError> {
        let name = name.into().to_lowercase();
        if let Some((attr, w)) = weights.iter().find(|(_, w)| !(w.is_finite() && **w > 0.0)) {
            return Err(EngineError::Validation(format!(
                "Profile {} has invalid weight {} for {}",
                name, w, attr
            )));
        }
        Ok(Self { name, weights })
    }

    pub fn uniform() -> Self {
        Self {
            name: UNIFORM_PROFILE.to_string(),
            weights: HashMap::new(),
        }
    }

    pub fn sentiment_v1() -> Self {
        Self {
            name: SENTIMENT_V1_PROFILE.to_string(),
            weights: SENTIMENT_V1_WEIGHTS
                .iter()
                .map(|(name, w)| (name.to_string(), *w))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weight for an attribute name, 1.0 when the profile does not mention it
    #[inline]
    pub fn weight(&self, attribute_name: &str) -> f64 {
        self.weights.get(attribute_name).copied().unwrap_or(1.0)
    }
}

/// Set of weight profiles addressable by name
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, WeightProfile>,
}

impl ProfileRegistry {
    /// Registry holding only the built-in `uniform` and `sentiment_v1` profiles
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();
        for profile in [WeightProfile::uniform(), WeightProfile::sentiment_v1()] {
            profiles.insert(profile.name.clone(), profile);
        }
        Self { profiles }
    }

    /// Add or replace a profile; `uniform` is fixed and cannot be replaced
    pub fn register(&mut self, profile: WeightProfile) -> Result<(), EngineError> {
        if profile.name == UNIFORM_PROFILE {
            return Err(EngineError::Validation(
                "The uniform profile cannot be redefined".to_string(),
            ));
        }
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Look a profile up case-insensitively, falling back to `uniform`
    pub fn resolve(&self, name: &str) -> &WeightProfile {
        self.profiles
            .get(&name.to_lowercase())
            .or_else(|| self.profiles.get(UNIFORM_PROFILE))
            .unwrap_or_else(|| uniform_profile())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn uniform_profile() -> &'static WeightProfile {
    static UNIFORM: std::sync::OnceLock<WeightProfile> = std::sync::OnceLock::new();
    UNIFORM.get_or_init(WeightProfile::uniform)
}

/// Weighted share of the wanted attributes a team actually has, in [0, 1].
///
/// desired = sum of weights of attributes the user wants
/// matched = sum of weights of wanted attributes the team has
/// score   = matched / desired, or 0.0 when nothing is wanted
pub fn heuristic_score(
    preferences: &PreferenceSet,
    attributes: &AttributeSet,
    profile: &WeightProfile,
    attribute_names: &HashMap<AttributeId, String>,
) -> f64 {
    let mut desired = 0.0;
    let mut matched = 0.0;

    for id in preferences.selected() {
        let weight = attribute_names
            .get(&id)
            .map(|name| profile.weight(name))
            .unwrap_or(1.0);

        desired += weight;
        if attributes.is_set(id) {
            matched += weight;
        }
    }

    if desired <= 0.0 {
        return 0.0;
    }

    (matched / desired).clamp(0.0, 1.0)
}
