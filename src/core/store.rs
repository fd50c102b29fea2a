use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::classifier::{LogisticModel, MODEL_FAMILY};
use crate::core::error::EngineError;
use crate::models::{AttributeId, EntityId, Partition};

/// Metadata record published for each trained model.
///
/// `attribute_ids` is the exact feature order the model was fitted on and
/// must be used for every prediction made with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: Uuid,
    pub model_family: String,
    pub attribute_ids: Vec<AttributeId>,
    pub entity_ids: Vec<EntityId>,
    pub partition: String,
    pub trained_at: DateTime<Utc>,
    /// File name of the classifier blob this record points at
    pub blob: String,
}

/// A loaded model together with the universe it was trained against
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub model: LogisticModel,
    pub metadata: ModelMetadata,
}

impl ModelArtifact {
    pub fn attribute_ids(&self) -> &[AttributeId] {
        &self.metadata.attribute_ids
    }

    pub fn entity_ids(&self) -> &[EntityId] {
        &self.metadata.entity_ids
    }

    pub fn model_family(&self) -> &str {
        &self.metadata.model_family
    }
}

/// File-backed store holding the latest model per partition.
///
/// Per partition `p` the directory holds a metadata record
/// `model_meta_<p>.json` and the blob it names, `model_<p>.<version>.json`.
/// Blobs are written first and the metadata record is published last via
/// rename, so readers see either the previous model or the new one.
///
/// Concurrent saves for the same partition must be serialized by the caller;
/// the last one to publish wins.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a model, superseding whatever the partition held before
    pub fn save(
        &self,
        model: &LogisticModel,
        attribute_ids: &[AttributeId],
        entity_ids: &[EntityId],
        partition: &Partition,
    ) -> Result<ModelMetadata, EngineError> {
        let key = partition.key().to_string();
        fs::create_dir_all(&self.root)?;

        let version = Uuid::new_v4();
        let blob = blob_name(&key, &version);
        write_atomic(&self.root.join(&blob), &serde_json::to_vec(model)?)?;

        let metadata = ModelMetadata {
            version,
            model_family: MODEL_FAMILY.to_string(),
            attribute_ids: attribute_ids.to_vec(),
            entity_ids: entity_ids.to_vec(),
            partition: key.clone(),
            trained_at: Utc::now(),
            blob,
        };
        write_atomic(
            &self.root.join(meta_name(&key)),
            &serde_json::to_vec_pretty(&metadata)?,
        )?;

        for stale in self.blob_names(&key)? {
            if blob_version(&key, &stale) == Some(version) {
                continue;
            }
            if let Err(e) = fs::remove_file(self.root.join(&stale)) {
                tracing::warn!("Failed to remove superseded model blob {}: {}", stale, e);
            }
        }

        tracing::info!(
            "Saved model {} for partition {} ({} features, {} teams)",
            version,
            key,
            attribute_ids.len(),
            entity_ids.len()
        );

        Ok(metadata)
    }

    /// Latest model for the partition, or `None` when nothing was trained yet
    pub fn load(&self, partition: &Partition) -> Result<Option<ModelArtifact>, EngineError> {
        self.load_with(partition, |blob| fs::read(self.root.join(blob)))
    }

    fn load_with<F>(
        &self,
        partition: &Partition,
        mut read_blob: F,
    ) -> Result<Option<ModelArtifact>, EngineError>
    where
        F: FnMut(&str) -> std::io::Result<Vec<u8>>,
    {
        let key = partition.key().to_string();

        // A save racing with us may remove the blob we were pointed at after
        // publishing a newer record; one re-read of the record picks that up.
        for _ in 0..2 {
            let metadata = match self.read_metadata(&key)? {
                Some(metadata) => metadata,
                None => return Ok(None),
            };

            let bytes = match read_blob(&metadata.blob) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let model: LogisticModel = serde_json::from_slice(&bytes)?;

            if model.n_features() != metadata.attribute_ids.len() {
                return Err(EngineError::CorruptArtifact(format!(
                    "Model {} has {} coefficients but records {} attributes",
                    metadata.version,
                    model.n_features(),
                    metadata.attribute_ids.len()
                )));
            }

            tracing::debug!("Loaded model {} for partition {}", metadata.version, key);
            return Ok(Some(ModelArtifact { model, metadata }));
        }

        tracing::warn!("Model record for partition {} points at a missing blob", key);
        Ok(None)
    }

    /// Remove every artifact of the partition; returns the removed file names
    pub fn delete(&self, partition: &Partition) -> Result<Vec<String>, EngineError> {
        let key = partition.key().to_string();
        let mut removed = Vec::new();

        let meta = meta_name(&key);
        match fs::remove_file(self.root.join(&meta)) {
            Ok(()) => removed.push(meta),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        for blob in self.blob_names(&key)? {
            match fs::remove_file(self.root.join(&blob)) {
                Ok(()) => removed.push(blob),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!("Deleted {} model artifacts for partition {}", removed.len(), key);
        Ok(removed)
    }

    fn read_metadata(&self, key: &str) -> Result<Option<ModelMetadata>, EngineError> {
        match fs::read(self.root.join(meta_name(key))) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn blob_names(&self, key: &str) -> Result<Vec<String>, EngineError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if blob_version(key, &name).is_some() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

fn meta_name(key: &str) -> String {
    format!("model_meta_{}.json", key)
}

fn blob_name(key: &str, version: &Uuid) -> String {
    format!("model_{}.{}.json", key, version)
}

fn blob_version(key: &str, file_name: &str) -> Option<Uuid> {
    let rest = file_name.strip_prefix(&format!("model_{}.", key))?;
    Uuid::parse_str(rest.strip_suffix(".json")?).ok()
}

/// Write to a temp file in the same directory, then rename over `path`
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), EngineError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let write = || -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    };

    write().map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        EngineError::from(e)
    })
}
