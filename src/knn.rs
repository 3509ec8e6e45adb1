use crate::error::{check_training_set, Error, Result};
use crate::metric;
use crate::persist::AudioModelState;
use crate::types::{majority_first_seen, stable_top_k, FeatureVector, Label, Neighbor};

pub const DEFAULT_K: usize = 5;

/// Exact K-nearest-neighbors classifier. The retained training set is the model.
///
/// Rows are stored row-major and concatenated; `predict` never mutates state,
/// so a fitted classifier can be shared across threads.
#[derive(Clone, Debug)]
pub struct KnnClassifier {
    k: usize,
    dim: usize,
    labels: Vec<Label>,
    vecs: Vec<f32>, // concatenated rows of length `dim`
}

impl Default for KnnClassifier {
    fn default() -> Self { Self::new(DEFAULT_K) }
}

impl KnnClassifier {
    pub fn new(k: usize) -> Self {
        Self { k, dim: 0, labels: Vec::new(), vecs: Vec::new() }
    }
    pub fn k(&self) -> usize { self.k }
    pub fn dim(&self) -> usize { self.dim }
    pub fn len(&self) -> usize { self.labels.len() }
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }
    pub fn is_fitted(&self) -> bool { !self.labels.is_empty() }

    /// Replace the training set. On error the previous state is kept.
    pub fn fit(&mut self, vectors: &[FeatureVector], labels: &[Label]) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter { name: "k", message: "must be at least 1" });
        }
        let dim = check_training_set(vectors, labels.len())?;
        let mut vecs = Vec::with_capacity(vectors.len() * dim);
        for v in vectors { vecs.extend_from_slice(v); }
        self.dim = dim;
        self.vecs = vecs;
        self.labels = labels.to_vec();
        tracing::debug!(rows = self.labels.len(), dim, k = self.k, "knn fitted");
        Ok(())
    }

    #[inline]
    fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dim; let end = start + self.dim; &self.vecs[start..end]
    }

    fn check_query(&self, q: &[f32]) -> Result<()> {
        if !self.is_fitted() { return Err(Error::NotFitted { model: "knn classifier" }); }
        if q.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, found: q.len() });
        }
        Ok(())
    }

    /// The k nearest training rows, nearest first; equal distances keep training order.
    pub fn neighbors(&self, q: &[f32]) -> Result<Vec<Neighbor>> {
        self.check_query(q)?;
        let mut hits = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            hits.push(Neighbor { index: i, distance: metric::euclidean_f64(q, self.row(i)) });
        }
        Ok(stable_top_k(hits, self.k))
    }

    /// Majority label among the k nearest neighbors. Tied tallies go to the
    /// label of the selected neighbor with the lowest training index; rows
    /// outside the k nearest play no part.
    pub fn predict(&self, q: &[f32]) -> Result<Label> {
        let mut idx: Vec<usize> = self.neighbors(q)?.iter().map(|n| n.index).collect();
        idx.sort_unstable();
        let winner = majority_first_seen(idx.iter().map(|&i| self.labels[i].as_str()))
            .ok_or(Error::NotFitted { model: "knn classifier" })?;
        Ok(winner.to_string())
    }

    pub fn labels(&self) -> &[Label] { &self.labels }

    pub fn vectors(&self) -> Vec<FeatureVector> {
        (0..self.len()).map(|i| self.row(i).to_vec()).collect()
    }

    /// Snapshot for the model document.
    pub fn state(&self) -> AudioModelState {
        AudioModelState { k: self.k, training_vectors: self.vectors(), training_labels: self.labels.clone() }
    }

    /// Rebuild from a persisted snapshot; validated like `fit`.
    pub fn from_state(state: &AudioModelState) -> Result<Self> {
        let mut knn = KnnClassifier::new(state.k);
        knn.fit(&state.training_vectors, &state.training_labels)?;
        Ok(knn)
    }
}
