use huerta::{KMeansParams, KMeansTrainer, KnnClassifier, ModelDocument, ModelStore, NearestCentroidClassifier};
use proptest::prelude::*;

fn labeled(data: &[Vec<f32>]) -> Vec<String> {
    (0..data.len()).map(|i| format!("l{}", i % 3)).collect()
}

proptest! {
    #[test]
    fn prop_knn_self_query_k1(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 3), 1..30)
    ) {
        let labels = labeled(&data);
        let mut knn = KnnClassifier::new(1);
        knn.fit(&data, &labels).unwrap();
        for v in &data {
            // duplicates resolve to the first equal row
            let first = data.iter().position(|w| w == v).unwrap();
            prop_assert_eq!(knn.predict(v).unwrap(), labels[first].clone());
        }
    }

    #[test]
    fn prop_kmeans_returns_c_centroids(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..25),
        c in 1usize..6,
        seed in any::<u64>()
    ) {
        let labels = labeled(&data);
        let fit = KMeansTrainer::new(KMeansParams { clusters: c, seed, ..KMeansParams::default() })
            .fit(&data, &labels)
            .unwrap();
        prop_assert_eq!(fit.centroids.len(), c);
        prop_assert_eq!(fit.labels.len(), c);
        for (sz, l) in fit.cluster_sizes().iter().zip(&fit.labels) {
            prop_assert_eq!(*sz == 0, l.is_unlabeled());
        }
        let ncc = fit.into_classifier().unwrap();
        for cent in ncc.centroids() {
            // duplicate centroids answer with the lowest index
            let first = ncc.centroids().iter().position(|w| w == cent).unwrap();
            prop_assert_eq!(ncc.predict(cent).unwrap(), &ncc.labels()[first]);
        }
    }

    #[test]
    fn prop_document_round_trip(
        vecs in prop::collection::vec(prop::collection::vec(-1e6f32..1e6, 4), 1..10),
        k in 1usize..9
    ) {
        let labels = labeled(&vecs);
        let mut knn = KnnClassifier::new(k);
        knn.fit(&vecs, &labels).unwrap();
        let ncc = NearestCentroidClassifier::load(vecs.clone(), labels.iter().map(|l| l.as_str().into()).collect()).unwrap();
        let doc: ModelDocument = ModelStore::save(Some(knn.state()), Some(ncc.state()));
        let back = ModelStore::from_slice(&doc.to_json_vec().unwrap()).unwrap();
        prop_assert_eq!(back, doc);
    }
}
