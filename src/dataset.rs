use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FeatureVector, Label};

/// Feature dataset produced by the extraction collaborators.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "audio")]
    pub audio: Vec<FeatureVector>,
    #[serde(rename = "etiquetas_audio")]
    pub audio_labels: Vec<Label>,
    #[serde(rename = "imagen")]
    pub image: Vec<FeatureVector>,
    #[serde(rename = "etiquetas_imagen")]
    pub image_labels: Vec<Label>,
}

/// Borrowed `vectors[i] <-> labels[i]` view.
#[derive(Clone, Copy, Debug)]
pub struct LabeledSet<'a> {
    pub vectors: &'a [FeatureVector],
    pub labels: &'a [Label],
}

impl<'a> LabeledSet<'a> {
    pub fn len(&self) -> usize { self.vectors.len() }
    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }
}

impl Dataset {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::DatasetNotFound(path.to_path_buf())),
            Err(e) => return Err(Error::DatasetCorrupt { path: path.to_path_buf(), reason: e.to_string() }),
        };
        let ds: Dataset = serde_json::from_slice(&bytes)
            .map_err(|e| Error::DatasetCorrupt { path: path.to_path_buf(), reason: e.to_string() })?;
        tracing::info!(
            path = %path.display(),
            audio = ds.audio.len(),
            image = ds.image.len(),
            "dataset loaded"
        );
        Ok(ds)
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_vec_pretty(self).map_err(io::Error::from)?)?;
        Ok(())
    }

    pub fn audio_set(&self) -> LabeledSet<'_> { LabeledSet { vectors: &self.audio, labels: &self.audio_labels } }
    pub fn image_set(&self) -> LabeledSet<'_> { LabeledSet { vectors: &self.image, labels: &self.image_labels } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::DatasetNotFound(_)));
    }

    #[test]
    fn malformed_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.json");
        fs::write(&p, br#"{"audio": [[1.0]], "etiquetas_audio": ["a"]}"#).unwrap();
        assert!(matches!(Dataset::from_file(&p), Err(Error::DatasetCorrupt { .. })));
        fs::write(&p, b"not json").unwrap();
        assert!(matches!(Dataset::from_file(&p), Err(Error::DatasetCorrupt { .. })));
    }

    #[test]
    fn reads_the_collaborator_format() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("datos_procesados.json");
        fs::write(
            &p,
            br#"{"audio": [[1.0, 2.0]], "etiquetas_audio": ["papa"],
                 "imagen": [[0.5], [0.7]], "etiquetas_imagen": ["papa", "berenjena"]}"#,
        )
        .unwrap();
        let ds = Dataset::from_file(&p).unwrap();
        assert_eq!(ds.audio_set().len(), 1);
        assert_eq!(ds.image_set().labels[1], "berenjena");

        let out = dir.path().join("copy.json");
        ds.write_file(&out).unwrap();
        assert_eq!(Dataset::from_file(&out).unwrap(), ds);
    }
}
