/// Squared Euclidean distance in f32. Overflows to infinity once a coordinate
/// difference passes about 1.8e19; the classifiers use the f64 variants.
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut s = 0.0f32;
    for i in 0..a.len() {
        let d = a[i] - b[i];
        s += d * d;
    }
    s
}

/// Euclidean (L2) distance.
#[inline]
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    squared_euclidean(a, b).sqrt()
}

/// Squared distance accumulated in f64. Squares of large f32 features overflow
/// f32, so every nearest-neighbor and nearest-centroid scan goes through this.
#[inline]
pub fn squared_euclidean_f64(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (*x as f64) - (*y as f64);
            d * d
        })
        .sum()
}

/// Euclidean distance computed in f64.
#[inline]
pub fn euclidean_f64(a: &[f32], b: &[f32]) -> f64 {
    squared_euclidean_f64(a, b).sqrt()
}
