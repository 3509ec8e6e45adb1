use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::centroid::NearestCentroidClassifier;
use crate::error::{Error, Result};
use crate::features::FeatureExtractor;
use crate::knn::KnnClassifier;
use crate::persist::{ModelDocument, ModelStore};
use crate::types::{CentroidLabel, Label};

/// Immutable classifiers built from one model document. Either side may be
/// unavailable.
#[derive(Clone, Debug, Default)]
pub struct LoadedModels {
    pub audio: Option<KnnClassifier>,
    pub image: Option<NearestCentroidClassifier>,
}

impl LoadedModels {
    pub fn from_document(doc: &ModelDocument) -> Result<Self> {
        let audio = doc.audio.as_ref().map(KnnClassifier::from_state).transpose()?;
        let image = doc.image.as_ref().map(NearestCentroidClassifier::from_state).transpose()?;
        Ok(Self { audio, image })
    }

    pub fn predict_audio(&self, v: &[f32]) -> Result<Label> {
        self.audio.as_ref().ok_or(Error::NotFitted { model: "audio classifier" })?.predict(v)
    }

    pub fn predict_image(&self, v: &[f32]) -> Result<CentroidLabel> {
        let ncc = self.image.as_ref().ok_or(Error::NotFitted { model: "image classifier" })?;
        ncc.predict(v).cloned()
    }
}

/// Shared handle for a prediction-serving boundary. Predictions read a
/// snapshot; `reload` swaps in a fully built replacement.
#[derive(Clone, Debug, Default)]
pub struct ModelHandle {
    current: Arc<RwLock<Arc<LoadedModels>>>,
}

impl ModelHandle {
    pub fn new(models: LoadedModels) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(models))) }
    }

    pub fn from_document(doc: &ModelDocument) -> Result<Self> {
        Ok(Self::new(LoadedModels::from_document(doc)?))
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::from_document(&ModelStore::read_file(path)?)
    }

    pub fn snapshot(&self) -> Arc<LoadedModels> {
        // a poisoned lock still holds a complete snapshot
        match self.current.read() {
            Ok(g) => Arc::clone(&*g),
            Err(p) => Arc::clone(&*p.into_inner()),
        }
    }

    pub fn predict_audio(&self, v: &[f32]) -> Result<Label> { self.snapshot().predict_audio(v) }
    pub fn predict_image(&self, v: &[f32]) -> Result<CentroidLabel> { self.snapshot().predict_image(v) }

    /// Extract features from raw bytes, then classify.
    pub fn predict_audio_raw<E: FeatureExtractor>(&self, extractor: &mut E, raw: &[u8]) -> Result<Label> {
        let v = extractor.extract(raw)?;
        self.predict_audio(&v)
    }

    pub fn predict_image_raw<E: FeatureExtractor>(&self, extractor: &mut E, raw: &[u8]) -> Result<CentroidLabel> {
        let v = extractor.extract(raw)?;
        self.predict_image(&v)
    }

    /// Build the new models first; on error the current ones stay in place.
    pub fn reload(&self, path: &Path) -> Result<()> {
        let next = Arc::new(LoadedModels::from_document(&ModelStore::read_file(path)?)?);
        self.replace(next);
        tracing::info!(path = %path.display(), "models reloaded");
        Ok(())
    }

    pub fn replace(&self, next: Arc<LoadedModels>) {
        match self.current.write() {
            Ok(mut g) => *g = next,
            Err(p) => *p.into_inner() = next,
        }
    }
}
