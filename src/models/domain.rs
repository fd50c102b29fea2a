use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::EngineError;

/// Stable attribute identifier
pub type AttributeId = i64;

/// Stable team identifier
pub type EntityId = i64;

/// Questionnaire identifier, one preference set per questionnaire
pub type QuestionnaireId = i64;

/// A named boolean property a team may have and a user may want
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool { true }

/// Binary answers keyed by attribute.
///
/// Used both for what a user wants (preference set) and for what a team has
/// (attribute set). Keys that were never answered read as 0; an explicit 0 is
/// still kept so analytics can tell "answered no" from "not asked".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeMap<AttributeId, bool>);

/// What a user wants, one flag per answered attribute
pub type PreferenceSet = FlagSet;

/// What a team has, one flag per assigned attribute
pub type AttributeSet = FlagSet;

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(attribute, value)` pairs; any non-zero value counts as set
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (AttributeId, i32)>,
    {
        Self(pairs.into_iter().map(|(id, v)| (id, v != 0)).collect())
    }

    pub fn insert(&mut self, id: AttributeId, value: bool) {
        self.0.insert(id, value);
    }

    /// True only when the attribute is present and set to 1
    #[inline]
    pub fn is_set(&self, id: AttributeId) -> bool {
        self.0.get(&id).copied().unwrap_or(false)
    }

    /// Attributes explicitly set to 1, in id order
    pub fn selected(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.0.iter().filter(|(_, v)| **v).map(|(id, _)| *id)
    }

    /// Every recorded answer, including explicit zeros
    pub fn answers(&self) -> impl Iterator<Item = (AttributeId, bool)> + '_ {
        self.0.iter().map(|(id, v)| (*id, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject keys that are not part of the known attribute universe
    pub fn validate_against(&self, known: &[AttributeId]) -> Result<(), EngineError> {
        for id in self.0.keys() {
            if !known.contains(id) {
                return Err(EngineError::Validation(format!(
                    "Attribute {} does not exist",
                    id
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(AttributeId, bool)> for FlagSet {
    fn from_iter<T: IntoIterator<Item = (AttributeId, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A recommendable team with its current attribute assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: EntityId,
    pub name: String,
    /// Free-form metadata; the `sport` key is the partition tag
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl Team {
    /// Partition tag stored in metadata, if any
    pub fn sport(&self) -> Option<&str> {
        self.meta.as_ref()?.get("sport")?.as_str()
    }

    /// Whether this team belongs to the given partition
    pub fn in_partition(&self, partition: &Partition) -> bool {
        match partition {
            Partition::Default => true,
            Partition::Named(name) => self
                .sport()
                .map(|s| s.eq_ignore_ascii_case(name.as_str()))
                .unwrap_or(false),
        }
    }
}

/// One observed outcome: did the user behind a questionnaire support a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRow {
    pub questionnaire_id: QuestionnaireId,
    pub team_id: EntityId,
    pub supported: bool,
}

/// Key segregating training data and trained models.
///
/// `Default` covers every team; a named partition only the teams tagged with
/// that sport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Partition {
    #[default]
    Default,
    Named(PartitionName),
}

/// Normalized partition name: non-empty, lowercase `[a-z0-9_-]`, never
/// `default`. Only [`Partition::parse`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionName(String);

impl PartitionName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Partition {
    /// Parse an optional caller-supplied partition name.
    ///
    /// Blank names and `default` map to `Default`. Names are lowercased and
    /// must consist of `[a-z0-9_-]` since they key persisted artifacts.
    pub fn parse(name: Option<&str>) -> Result<Self, EngineError> {
        let raw = match name.map(str::trim) {
            None | Some("") => return Ok(Partition::Default),
            Some(raw) => raw.to_lowercase(),
        };

        if raw == "default" {
            return Ok(Partition::Default);
        }

        if !raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(EngineError::Validation(format!(
                "Invalid partition name: {}",
                raw
            )));
        }

        Ok(Partition::Named(PartitionName(raw)))
    }

    /// Key used for artifact names
    pub fn key(&self) -> &str {
        match self {
            Partition::Default => "default",
            Partition::Named(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of a successful training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOutcome {
    pub trained_on_rows: usize,
    pub attributes: Vec<AttributeId>,
    pub teams: Vec<EntityId>,
    pub saved: bool,
}

/// Ranked prediction for a single team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    pub team_id: EntityId,
    pub team_name: String,
    pub score: f64,
}
