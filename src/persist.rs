use std::{fs, io::Write, path::Path};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::knn::DEFAULT_K;
use crate::types::{CentroidLabel, FeatureVector, Label};

pub const AUDIO_KEY: &str = "clasificador_audio";
pub const IMAGE_KEY: &str = "clasificador_imagen";

/// Learned K-NN state: the whole training set plus k.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioModelState {
    pub k: usize,
    #[serde(rename = "audios_entrenamiento")]
    pub training_vectors: Vec<FeatureVector>,
    #[serde(rename = "labels_audio_entrenamiento")]
    pub training_labels: Vec<Label>,
}

/// Learned nearest-centroid state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageModelState {
    #[serde(rename = "centroides")]
    pub centroids: Vec<FeatureVector>,
    #[serde(rename = "etiquetas_centroides")]
    pub centroid_labels: Vec<CentroidLabel>,
}

/// Persisted model: two independent sub-models. `None` means unavailable
/// and is written as `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModelDocument {
    #[serde(rename = "clasificador_audio")]
    pub audio: Option<AudioModelState>,
    #[serde(rename = "clasificador_imagen")]
    pub image: Option<ImageModelState>,
}

/// Serializes and restores [`ModelDocument`]s.
pub struct ModelStore;

impl ModelStore {
    pub fn save(audio: Option<AudioModelState>, image: Option<ImageModelState>) -> ModelDocument {
        ModelDocument { audio, image }
    }

    /// Parse a document. A missing or `null` sub-model (or a sub-model whose
    /// data fields are `null`) is unavailable; missing data keys or wrong types
    /// are corrupt.
    pub fn load(doc: &Value) -> Result<ModelDocument> {
        let root = doc.as_object().ok_or_else(|| corrupt("document is not a JSON object"))?;
        if !root.contains_key(AUDIO_KEY) && !root.contains_key(IMAGE_KEY) {
            return Err(corrupt(format!("neither {AUDIO_KEY} nor {IMAGE_KEY} is present")));
        }
        let audio = match sub_object(root, AUDIO_KEY)? {
            Some(obj) => load_audio(obj)?,
            None => None,
        };
        let image = match sub_object(root, IMAGE_KEY)? {
            Some(obj) => load_image(obj)?,
            None => None,
        };
        if audio.is_none() { tracing::warn!("audio model unavailable in document"); }
        if image.is_none() { tracing::warn!("image model unavailable in document"); }
        Ok(ModelDocument { audio, image })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<ModelDocument> {
        let v: Value = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
        Self::load(&v)
    }

    pub fn read_file(path: &Path) -> Result<ModelDocument> {
        let bytes = fs::read(path)?;
        Self::from_slice(&bytes)
    }
}

impl ModelDocument {
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::Io(e.into()))
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| Error::Io(e.into()))
    }

    /// Write via a temp file in the target directory, then rename over `path`.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.to_json_vec()?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        tracing::info!(path = %path.display(), "model document written");
        Ok(())
    }
}

fn corrupt(msg: impl Into<String>) -> Error { Error::CorruptModel(msg.into()) }

fn sub_object<'a>(root: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Map<String, Value>>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj)),
        Some(_) => Err(corrupt(format!("{key} is not an object"))),
    }
}

/// `Ok(None)` for an explicit `null`; missing key or wrong type is corrupt.
fn field<T: DeserializeOwned>(obj: &Map<String, Value>, sub: &str, key: &str) -> Result<Option<T>> {
    match obj.get(key) {
        None => Err(corrupt(format!("{sub}.{key} is missing"))),
        Some(Value::Null) => Ok(None),
        Some(v) => T::deserialize(v).map(Some).map_err(|e| corrupt(format!("{sub}.{key}: {e}"))),
    }
}

fn load_audio(obj: &Map<String, Value>) -> Result<Option<AudioModelState>> {
    let k = match obj.get("k") {
        None | Some(Value::Null) => DEFAULT_K,
        Some(v) => v
            .as_u64()
            .map(|k| k as usize)
            .ok_or_else(|| corrupt(format!("{AUDIO_KEY}.k is not a non-negative integer")))?,
    };
    let vectors: Option<Vec<FeatureVector>> = field(obj, AUDIO_KEY, "audios_entrenamiento")?;
    let labels: Option<Vec<Label>> = field(obj, AUDIO_KEY, "labels_audio_entrenamiento")?;
    Ok(match (vectors, labels) {
        (Some(training_vectors), Some(training_labels)) => Some(AudioModelState { k, training_vectors, training_labels }),
        _ => None,
    })
}

fn load_image(obj: &Map<String, Value>) -> Result<Option<ImageModelState>> {
    let centroids: Option<Vec<FeatureVector>> = field(obj, IMAGE_KEY, "centroides")?;
    let labels: Option<Vec<CentroidLabel>> = field(obj, IMAGE_KEY, "etiquetas_centroides")?;
    Ok(match (centroids, labels) {
        (Some(centroids), Some(centroid_labels)) => Some(ImageModelState { centroids, centroid_labels }),
        _ => None,
    })
}
