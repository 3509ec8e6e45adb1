/// SplitMix64 for seedable, reproducible k-means++ draws.
#[derive(Clone, Copy, Debug)]
pub struct SplitMix64 { state: u64 }

impl SplitMix64 {
    pub fn new(seed: u64) -> Self { Self { state: seed } }
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut z = { self.state = self.state.wrapping_add(0x9E3779B97F4A7C15); self.state };
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        let x = self.next_u64() >> 11; // 53 bits
        (x as f64) * (1.0 / ((1u64 << 53) as f64))
    }
    /// Uniform index in `0..end`. `end` must be non-zero.
    #[inline]
    pub fn gen_index(&mut self, end: usize) -> usize {
        debug_assert!(end > 0);
        (self.next_u64() % (end as u64)) as usize
    }

    /// Draw an index with probability `weights[i] / sum(weights)`.
    /// Zero-weight entries are never chosen unless every weight is zero,
    /// in which case the draw is uniform.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        debug_assert!(!weights.is_empty());
        let sum: f64 = weights.iter().sum();
        if !(sum > 0.0) || !sum.is_finite() {
            return self.gen_index(weights.len());
        }
        let mut r = self.next_f64() * sum;
        let mut last_positive = 0usize;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 { continue; }
            if r < w { return i; }
            r -= w;
            last_positive = i;
        }
        // rounding left a sliver of mass past the end
        last_positive
    }

    /// Seed for trial `trial` of a run seeded with `run_seed`.
    /// Independent of how many draws a previous trial consumed.
    pub fn derive(run_seed: u64, trial: u64) -> u64 {
        let mut sm = SplitMix64::new(run_seed ^ trial.wrapping_mul(0xD1B54A32D192ED03));
        sm.next_u64()
    }
}
