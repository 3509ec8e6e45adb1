use crate::error::{Error, Result};
use crate::kmeans::nearest_center;
use crate::persist::ImageModelState;
use crate::types::{CentroidLabel, FeatureVector, UNLABELED};

/// Predicts the label of the nearest labeled centroid.
#[derive(Clone, Debug, Default)]
pub struct NearestCentroidClassifier {
    centroids: Vec<FeatureVector>,
    labels: Vec<CentroidLabel>,
}

impl NearestCentroidClassifier {
    /// Pair centroids with labels 1:1. A `Class` spelled like the sentinel is
    /// rejected: once saved it would read back as `Unlabeled`.
    pub fn load(centroids: Vec<FeatureVector>, labels: Vec<CentroidLabel>) -> Result<Self> {
        if centroids.len() != labels.len() || centroids.is_empty() {
            return Err(Error::InvalidCentroidData { centroids: centroids.len(), labels: labels.len() });
        }
        if labels.iter().any(|l| l.as_class() == Some(UNLABELED)) {
            return Err(Error::InvalidParameter { name: "labels", message: "Sin_Etiqueta is reserved for empty clusters" });
        }
        let dim = centroids[0].len();
        for (row, c) in centroids.iter().enumerate() {
            if c.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, found: c.len() });
            }
            if c.iter().any(|x| !x.is_finite()) {
                return Err(Error::NonFinite { row });
            }
        }
        Ok(Self { centroids, labels })
    }

    pub fn len(&self) -> usize { self.centroids.len() }
    pub fn is_empty(&self) -> bool { self.centroids.is_empty() }
    pub fn dim(&self) -> usize { self.centroids.first().map_or(0, |c| c.len()) }
    pub fn centroids(&self) -> &[FeatureVector] { &self.centroids }
    pub fn labels(&self) -> &[CentroidLabel] { &self.labels }

    /// Index and squared distance of the nearest centroid (lowest index on ties).
    pub fn nearest(&self, q: &[f32]) -> Result<(usize, f64)> {
        if self.centroids.is_empty() {
            return Err(Error::NotFitted { model: "nearest-centroid classifier" });
        }
        if q.len() != self.dim() {
            return Err(Error::DimensionMismatch { expected: self.dim(), found: q.len() });
        }
        Ok(nearest_center(&self.centroids, q))
    }

    pub fn predict(&self, q: &[f32]) -> Result<&CentroidLabel> {
        let (i, _) = self.nearest(q)?;
        Ok(&self.labels[i])
    }

    pub fn state(&self) -> ImageModelState {
        ImageModelState { centroids: self.centroids.clone(), centroid_labels: self.labels.clone() }
    }

    pub fn from_state(state: &ImageModelState) -> Result<Self> {
        Self::load(state.centroids.clone(), state.centroid_labels.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ncc() -> NearestCentroidClassifier {
        NearestCentroidClassifier::load(
            vec![vec![0.0, 0.5], vec![5.0, 5.5], vec![9.0, 0.0]],
            vec!["X".into(), "Y".into(), CentroidLabel::Unlabeled],
        )
        .unwrap()
    }

    #[test]
    fn centroid_self_query_returns_its_label() {
        let m = ncc();
        for (c, l) in m.centroids().iter().zip(m.labels()) {
            assert_eq!(m.predict(c).unwrap(), l);
        }
    }

    #[test]
    fn nearest_wins() {
        let m = ncc();
        assert!(m.predict(&[0.0, 0.4]).unwrap().matches("X"));
        assert!(m.predict(&[8.0, 1.0]).unwrap().is_unlabeled());
    }

    #[test]
    fn equidistant_goes_to_lowest_index() {
        let m = NearestCentroidClassifier::load(vec![vec![-1.0], vec![1.0]], vec!["L".into(), "R".into()]).unwrap();
        assert_eq!(m.nearest(&[0.0]).unwrap().0, 0);
    }

    #[test]
    fn load_and_predict_errors() {
        assert!(matches!(
            NearestCentroidClassifier::load(vec![vec![1.0]], vec![]),
            Err(Error::InvalidCentroidData { centroids: 1, labels: 0 })
        ));
        let empty = NearestCentroidClassifier::default();
        assert!(matches!(empty.predict(&[1.0]), Err(Error::NotFitted { .. })));
        assert!(matches!(ncc().predict(&[1.0]), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn sentinel_spelled_as_a_class_is_rejected() {
        let err = NearestCentroidClassifier::load(
            vec![vec![0.0], vec![1.0]],
            vec!["papa".into(), CentroidLabel::Class(UNLABELED.to_string())],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "labels", .. }));
        // the real sentinel is fine
        assert!(NearestCentroidClassifier::load(vec![vec![0.0]], vec![CentroidLabel::Unlabeled]).is_ok());
    }

    #[test]
    fn huge_features_pick_the_right_centroid() {
        let m = NearestCentroidClassifier::load(vec![vec![0.0], vec![1e19]], vec!["near0".into(), "far".into()]).unwrap();
        assert!(m.predict(&[1e20]).unwrap().matches("far"));
        let (i, d) = m.nearest(&[1e20]).unwrap();
        assert_eq!(i, 1);
        assert!(d.is_finite());
        assert!(m.predict(&[1.0]).unwrap().matches("near0"));
    }
}
