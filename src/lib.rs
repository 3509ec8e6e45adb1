//! huerta — from-scratch vegetable classifiers over audio and image features.
//!
//! Modules:
//! - `metric`: Euclidean distance helpers.
//! - `types`: FeatureVector, Label, CentroidLabel, stable_top_k.
//! - `seed`: SplitMix64 for reproducible k-means++ draws.
//! - `knn`: KnnClassifier (audio).
//! - `kmeans`: seeded k-means++ trainer with majority-labeled centroids.
//! - `centroid`: NearestCentroidClassifier (image).
//! - `persist`: ModelStore and the JSON model document.
//! - `dataset`: the feature dataset consumed for training.
//! - `eval`: accuracy, per-label stats, Wilson bound.
//! - `train`: best-of-N TrainingOrchestrator.
//! - `serve`: ModelHandle for concurrent predict with atomic reload.
//! - `features`: FeatureExtractor seam for the extraction collaborators.

pub mod error;
pub mod metric;
pub mod types;
pub mod seed;
pub mod knn;
pub mod kmeans;
pub mod centroid;
pub mod persist;
pub mod dataset;
pub mod eval;
pub mod train;
pub mod serve;
pub mod features;

pub use error::{Error, Result};
pub use types::{CentroidLabel, FeatureVector, Label, Neighbor, stable_top_k, UNLABELED};
pub use knn::KnnClassifier;
pub use kmeans::{KMeansFit, KMeansParams, KMeansTrainer};
pub use centroid::NearestCentroidClassifier;
pub use persist::{AudioModelState, ImageModelState, ModelDocument, ModelStore};
pub use dataset::Dataset;
pub use train::{TrainParams, TrainerPhase, TrainingOrchestrator, TrainingOutcome};
pub use serve::{LoadedModels, ModelHandle};
pub use features::{FeatureExtractor, PrecomputedFeatures};
