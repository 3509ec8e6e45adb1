use serde::Serialize;

use crate::centroid::NearestCentroidClassifier;
use crate::error::{Error, Result};
use crate::knn::KnnClassifier;
use crate::types::{FeatureVector, Label};

/// Correct predictions over a labeled set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Score { pub correct: usize, pub total: usize, pub percent: f64 }

impl Score {
    pub fn new(correct: usize, total: usize) -> Self {
        Self { correct, total, percent: accuracy_percent(correct, total) }
    }

    /// Wilson 95% lower bound on the hit rate, as a percentage.
    pub fn lower_bound_percent(&self) -> f64 {
        if self.total == 0 { return 0.0; }
        wilson_lower_bound(self.correct, self.total, 1.96) * 100.0
    }
}

/// Percentage of correct predictions; 0 for an empty set.
pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { (correct as f64) / (total as f64) * 100.0 }
}

fn check_lengths(vectors: &[FeatureVector], labels: &[Label]) -> Result<()> {
    if vectors.len() != labels.len() {
        return Err(Error::LengthMismatch { vectors: vectors.len(), labels: labels.len() });
    }
    Ok(())
}

pub fn evaluate_audio(knn: &KnnClassifier, vectors: &[FeatureVector], labels: &[Label]) -> Result<Score> {
    check_lengths(vectors, labels)?;
    let mut hit = 0usize;
    for (v, truth) in vectors.iter().zip(labels) {
        if knn.predict(v)? == *truth { hit += 1; }
    }
    Ok(Score::new(hit, vectors.len()))
}

/// Unlabeled centroids never count as correct.
pub fn evaluate_image(ncc: &NearestCentroidClassifier, vectors: &[FeatureVector], labels: &[Label]) -> Result<Score> {
    check_lengths(vectors, labels)?;
    let mut hit = 0usize;
    for (v, truth) in vectors.iter().zip(labels) {
        if ncc.predict(v)?.matches(truth) { hit += 1; }
    }
    Ok(Score::new(hit, vectors.len()))
}

/// Per-label feature mean and population variance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelStats {
    pub label: Label,
    pub count: usize,
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
}

/// Statistics per label, labels in first-seen order.
pub fn label_stats(vectors: &[FeatureVector], labels: &[Label]) -> Result<Vec<LabelStats>> {
    check_lengths(vectors, labels)?;
    let mut order: Vec<&Label> = Vec::new();
    for l in labels {
        if !order.contains(&l) { order.push(l); }
    }
    let mut out = Vec::with_capacity(order.len());
    for label in order {
        let rows: Vec<&FeatureVector> = vectors.iter().zip(labels).filter(|(_, l)| *l == label).map(|(v, _)| v).collect();
        let dim = rows[0].len();
        let n = rows.len() as f64;
        let mut mean = vec![0.0f64; dim];
        for r in &rows {
            if r.len() != dim { return Err(Error::DimensionMismatch { expected: dim, found: r.len() }); }
            for d in 0..dim { mean[d] += r[d] as f64; }
        }
        for m in mean.iter_mut() { *m /= n; }
        let mut variance = vec![0.0f64; dim];
        for r in &rows {
            for d in 0..dim { let x = r[d] as f64 - mean[d]; variance[d] += x * x; }
        }
        for v in variance.iter_mut() { *v /= n; }
        out.push(LabelStats { label: label.clone(), count: rows.len(), mean, variance });
    }
    Ok(out)
}

/// Wilson score lower bound for a Bernoulli proportion; 0 with no trials.
pub fn wilson_lower_bound(successes: usize, trials: usize, z: f64) -> f64 {
    if trials == 0 { return 0.0; }
    let n = trials as f64;
    let phat = (successes as f64) / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = phat + z2 / (2.0 * n);
    let margin = z * ((phat * (1.0 - phat) + z2 / (4.0 * n)) / n).sqrt();
    (center - margin) / denom
}
