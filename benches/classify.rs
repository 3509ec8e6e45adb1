use criterion::{black_box, criterion_group, criterion_main, Criterion};
use huerta::{KMeansParams, KMeansTrainer, KnnClassifier};
use rand::prelude::*;

fn synthetic(n: usize, d: usize) -> (Vec<Vec<f32>>, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<Vec<f32>> = (0..n).map(|_| (0..d).map(|_| rng.gen::<f32>()).collect()).collect();
    let labels = (0..n).map(|i| format!("c{}", i % 4)).collect();
    (data, labels)
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let (data, labels) = synthetic(1000, 7);

    group.bench_function("kmeans_fit_n1000_d7_c4", |b| {
        b.iter(|| {
            let t = KMeansTrainer::new(KMeansParams { seed: 7, ..KMeansParams::default() });
            t.fit(black_box(&data), black_box(&labels)).unwrap();
        })
    });

    let mut knn = KnnClassifier::new(5);
    knn.fit(&data, &labels).unwrap();
    let q = data[17].clone();
    group.bench_function("knn_predict_n1000_d7_k5", |b| {
        b.iter(|| knn.predict(black_box(&q)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
