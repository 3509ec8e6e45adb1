use serde::{Deserialize, Serialize};

use crate::centroid::NearestCentroidClassifier;
use crate::error::{check_class_labels, check_training_set, Error, Result};
use crate::metric;
use crate::seed::SplitMix64;
use crate::types::{majority_first_seen, CentroidLabel, FeatureVector, Label};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    /// Number of centroids C.
    pub clusters: usize,
    pub max_iters: usize,
    /// Stop once total centroid displacement drops below this.
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self { Self { clusters: 4, max_iters: 300, tol: 1e-4, seed: 7 } }
}

/// Result of one k-means fit.
#[derive(Clone, Debug)]
pub struct KMeansFit {
    pub centroids: Vec<FeatureVector>,
    pub labels: Vec<CentroidLabel>,
    /// Centroid index of every training row from the last assignment step.
    pub assignments: Vec<usize>,
    pub iterations: usize,
    /// Total displacement after each completed iteration.
    pub displacements: Vec<f64>,
    pub converged: bool,
    /// Within-cluster sum of squared distances for the final assignment.
    pub inertia: f64,
}

impl KMeansFit {
    pub fn into_classifier(self) -> Result<NearestCentroidClassifier> {
        NearestCentroidClassifier::load(self.centroids, self.labels)
    }

    /// Rows per centroid in the last assignment.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centroids.len()];
        for &a in &self.assignments { sizes[a] += 1; }
        sizes
    }
}

/// Seeded k-means++ with Lloyd iterations and majority-label centroids.
#[derive(Clone, Copy, Debug, Default)]
pub struct KMeansTrainer {
    params: KMeansParams,
}

impl KMeansTrainer {
    pub fn new(params: KMeansParams) -> Self { Self { params } }
    pub fn params(&self) -> &KMeansParams { &self.params }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    fn check_params(&self) -> Result<()> {
        let p = &self.params;
        if p.clusters == 0 {
            return Err(Error::InvalidParameter { name: "clusters", message: "must be at least 1" });
        }
        if p.max_iters == 0 {
            return Err(Error::InvalidParameter { name: "max_iters", message: "must be at least 1" });
        }
        if !p.tol.is_finite() || p.tol < 0.0 {
            return Err(Error::InvalidParameter { name: "tol", message: "must be finite and non-negative" });
        }
        Ok(())
    }

    pub fn fit(&self, data: &[FeatureVector], labels: &[Label]) -> Result<KMeansFit> {
        let dim = check_training_set(data, labels.len())?;
        check_class_labels(labels)?;
        self.check_params()?;
        let k = self.params.clusters;
        let n = data.len();
        let mut rng = SplitMix64::new(self.params.seed);

        let mut centers = seed_plus_plus(data, k, &mut rng);

        // --- Lloyd iterations
        let mut assign: Vec<usize> = vec![0; n];
        let mut displacements = Vec::new();
        let mut converged = false;
        let mut iterations = 0usize;
        for it in 0..self.params.max_iters {
            iterations = it + 1;
            // Assign
            for i in 0..n { assign[i] = nearest_center(&centers, &data[i]).0; }
            // Update
            let mut sums = vec![vec![0.0f64; dim]; k];
            let mut counts = vec![0usize; k];
            for i in 0..n {
                let c = assign[i]; counts[c] += 1;
                for d in 0..dim { sums[c][d] += data[i][d] as f64; }
            }
            let mut new_centers = Vec::with_capacity(k);
            for c in 0..k {
                if counts[c] > 0 {
                    let inv = 1.0 / counts[c] as f64;
                    new_centers.push(sums[c].iter().map(|s| (s * inv) as f32).collect::<Vec<f32>>());
                } else {
                    // empty cluster keeps its previous position
                    new_centers.push(centers[c].clone());
                }
            }
            let shift: f64 = centers.iter().zip(&new_centers)
                .map(|(a, b)| metric::squared_euclidean_f64(a, b))
                .sum::<f64>()
                .sqrt();
            centers = new_centers;
            displacements.push(shift);
            tracing::trace!(iteration = iterations, displacement = shift, "lloyd step");
            if shift < self.params.tol { converged = true; break; }
        }

        let mut inertia = 0.0f64;
        for i in 0..n { inertia += metric::squared_euclidean_f64(&data[i], &centers[assign[i]]); }

        let centroid_labels = label_centroids(k, &assign, labels);
        tracing::debug!(
            clusters = k, iterations, converged, inertia,
            unlabeled = centroid_labels.iter().filter(|l| l.is_unlabeled()).count(),
            "kmeans fitted"
        );

        Ok(KMeansFit {
            centroids: centers,
            labels: centroid_labels,
            assignments: assign,
            iterations,
            displacements,
            converged,
            inertia,
        })
    }
}

/// k-means++ seeding: first center uniform, then each next center drawn with
/// probability proportional to squared distance to the nearest chosen center.
fn seed_plus_plus(data: &[FeatureVector], k: usize, rng: &mut SplitMix64) -> Vec<FeatureVector> {
    let n = data.len();
    let first = rng.gen_index(n);
    let mut centers: Vec<FeatureVector> = vec![data[first].clone()];
    let mut nearest: Vec<f64> = vec![f64::INFINITY; n];
    while centers.len() < k {
        let last = &centers[centers.len() - 1];
        for i in 0..n {
            let d = metric::squared_euclidean_f64(&data[i], last);
            if d < nearest[i] { nearest[i] = d; }
        }
        let idx = rng.weighted_index(&nearest);
        centers.push(data[idx].clone());
    }
    centers
}

/// (index, squared distance) of the nearest center; ties keep the lowest index.
#[inline]
pub(crate) fn nearest_center(centers: &[FeatureVector], v: &[f32]) -> (usize, f64) {
    let mut best_c = 0usize;
    let mut best_d = f64::INFINITY;
    for (c, center) in centers.iter().enumerate() {
        let d = metric::squared_euclidean_f64(v, center);
        if d < best_d { best_d = d; best_c = c; }
    }
    (best_c, best_d)
}

fn label_centroids(k: usize, assign: &[usize], labels: &[Label]) -> Vec<CentroidLabel> {
    (0..k)
        .map(|c| {
            let members = assign.iter().zip(labels).filter(|(a, _)| **a == c).map(|(_, l)| l.as_str());
            match majority_first_seen(members) {
                Some(l) => CentroidLabel::Class(l.to_string()),
                None => CentroidLabel::Unlabeled,
            }
        })
        .collect()
}
