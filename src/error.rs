use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the classifiers, the model store and the trainer.
#[derive(Debug, Error)]
pub enum Error {
    /// Predict called before fit/load.
    #[error("{model} is not fitted; fit or load it first")]
    NotFitted {
        /// Which classifier.
        model: &'static str,
    },

    /// Vector and label sequences differ in length.
    #[error("length mismatch: {vectors} vectors but {labels} labels")]
    LengthMismatch {
        /// Number of feature vectors.
        vectors: usize,
        /// Number of labels.
        labels: usize,
    },

    /// No training rows.
    #[error("empty dataset")]
    EmptyDataset,

    /// Vectors compared in one operation have different lengths.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A feature vector contains NaN or an infinity.
    #[error("non-finite value in feature vector {row}")]
    NonFinite {
        /// Row index of the offending vector.
        row: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Centroids and centroid labels cannot be paired 1:1.
    #[error("invalid centroid data: {centroids} centroids, {labels} labels")]
    InvalidCentroidData {
        /// Number of centroids.
        centroids: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Persisted model document is malformed.
    #[error("corrupt model document: {0}")]
    CorruptModel(String),

    /// Dataset file does not exist.
    #[error("dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// Dataset file exists but cannot be parsed.
    #[error("corrupt dataset {}: {reason}", .path.display())]
    DatasetCorrupt {
        /// Dataset path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Every training trial failed.
    #[error("no successful trial out of {trials}")]
    NoSuccessfulTrial {
        /// Number of attempted trials.
        trials: usize,
    },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Validate a training set: non-empty, paired, one dimension, finite.
/// Returns the shared dimension.
pub(crate) fn check_training_set(vectors: &[Vec<f32>], labels_len: usize) -> Result<usize> {
    if vectors.len() != labels_len {
        return Err(Error::LengthMismatch { vectors: vectors.len(), labels: labels_len });
    }
    if vectors.is_empty() {
        return Err(Error::EmptyDataset);
    }
    let dim = vectors[0].len();
    if dim == 0 {
        return Err(Error::InvalidParameter { name: "vectors", message: "feature vectors must not be empty" });
    }
    for (row, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(Error::DimensionMismatch { expected: dim, found: v.len() });
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(Error::NonFinite { row });
        }
    }
    Ok(dim)
}

/// Class labels for centroid training must not collide with the empty-cluster
/// sentinel, which the model document cannot tell apart from a real class.
pub(crate) fn check_class_labels(labels: &[String]) -> Result<()> {
    if labels.iter().any(|l| l == crate::types::UNLABELED) {
        return Err(Error::InvalidParameter { name: "labels", message: "Sin_Etiqueta is reserved for empty clusters" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_set_checks_in_order() {
        assert!(matches!(check_training_set(&[vec![1.0]], 2), Err(Error::LengthMismatch { vectors: 1, labels: 2 })));
        assert!(matches!(check_training_set(&[], 0), Err(Error::EmptyDataset)));
        assert!(matches!(
            check_training_set(&[vec![1.0, 2.0], vec![1.0]], 2),
            Err(Error::DimensionMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(check_training_set(&[vec![1.0], vec![f32::NAN]], 2), Err(Error::NonFinite { row: 1 })));
        assert_eq!(check_training_set(&[vec![1.0, 2.0]], 1).unwrap(), 2);
    }

    #[test]
    fn sentinel_is_not_a_class_label() {
        assert!(check_class_labels(&["papa".to_string(), "yuca".to_string()]).is_ok());
        assert!(matches!(
            check_class_labels(&["papa".to_string(), "Sin_Etiqueta".to_string()]),
            Err(Error::InvalidParameter { name: "labels", .. })
        ));
    }
}
