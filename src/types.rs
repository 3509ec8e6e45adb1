use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-length numeric summary of one audio clip or photograph.
pub type FeatureVector = Vec<f32>;

/// Class name, compared by exact string equality.
pub type Label = String;

/// Sentinel written for a centroid whose cluster received no training members.
pub const UNLABELED: &str = "Sin_Etiqueta";

/// Label attached to a centroid. Serialized as a bare string; `Unlabeled`
/// round-trips through [`UNLABELED`], so the sentinel string is reserved and
/// always reads back as `Unlabeled`. K-means fitting and
/// `NearestCentroidClassifier::load` reject it as a class name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CentroidLabel {
    Class(Label),
    Unlabeled,
}

impl CentroidLabel {
    pub fn as_class(&self) -> Option<&str> {
        match self {
            CentroidLabel::Class(l) => Some(l.as_str()),
            CentroidLabel::Unlabeled => None,
        }
    }

    pub fn is_unlabeled(&self) -> bool { matches!(self, CentroidLabel::Unlabeled) }

    /// True only for a real class equal to `label`; the sentinel never matches.
    pub fn matches(&self, label: &str) -> bool { self.as_class() == Some(label) }
}

impl From<String> for CentroidLabel {
    fn from(s: String) -> Self {
        if s == UNLABELED { CentroidLabel::Unlabeled } else { CentroidLabel::Class(s) }
    }
}

impl From<&str> for CentroidLabel {
    fn from(s: &str) -> Self { CentroidLabel::from(s.to_string()) }
}

impl From<CentroidLabel> for String {
    fn from(l: CentroidLabel) -> Self {
        match l {
            CentroidLabel::Class(s) => s,
            CentroidLabel::Unlabeled => UNLABELED.to_string(),
        }
    }
}

impl fmt::Display for CentroidLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentroidLabel::Class(s) => f.write_str(s),
            CentroidLabel::Unlabeled => f.write_str(UNLABELED),
        }
    }
}

/// A training row and its distance to a query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor { pub index: usize, pub distance: f64 }

/// Stable top-k by (distance asc, index asc) for determinism.
pub fn stable_top_k(mut hits: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    hits.sort_by(|a, b| {
        match a.distance.total_cmp(&b.distance) {
            std::cmp::Ordering::Equal => a.index.cmp(&b.index),
            ord => ord,
        }
    });
    hits.truncate(k.min(hits.len()));
    hits
}

/// Most frequent label; ties go to the label seen first in iteration order.
pub(crate) fn majority_first_seen<'a, I>(labels: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    // (label, count) in first-seen order
    let mut tally: Vec<(&'a str, usize)> = Vec::new();
    for l in labels {
        match tally.iter_mut().find(|(seen, _)| *seen == l) {
            Some((_, c)) => *c += 1,
            None => tally.push((l, 1)),
        }
    }
    let mut best: Option<(&'a str, usize)> = None;
    for (l, c) in tally {
        if best.map_or(true, |(_, bc)| c > bc) { best = Some((l, c)); }
    }
    best.map(|(l, _)| l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_breaks_distance_ties_by_index() {
        let hits = vec![
            Neighbor { index: 3, distance: 1.0 },
            Neighbor { index: 1, distance: 1.0 },
            Neighbor { index: 2, distance: 0.5 },
        ];
        let top = stable_top_k(hits, 2);
        assert_eq!(top.iter().map(|h| h.index).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn top_k_larger_than_input_keeps_everything() {
        let hits = vec![Neighbor { index: 0, distance: 2.0 }];
        assert_eq!(stable_top_k(hits, 5).len(), 1);
    }

    #[test]
    fn majority_prefers_first_seen_on_tie() {
        assert_eq!(majority_first_seen(["B", "A", "A", "B"]), Some("B"));
        assert_eq!(majority_first_seen(["B", "A", "A"]), Some("A"));
        assert_eq!(majority_first_seen(std::iter::empty()), None);
    }

    #[test]
    fn sentinel_round_trips_through_serde() {
        let labels = vec![CentroidLabel::from("papa"), CentroidLabel::Unlabeled];
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"["papa","Sin_Etiqueta"]"#);
        let back: Vec<CentroidLabel> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, labels);
        assert!(back[1].is_unlabeled());
        assert!(!back[1].matches(UNLABELED));
    }

    #[test]
    fn sentinel_string_always_reads_as_unlabeled() {
        let back: CentroidLabel = serde_json::from_str(r#""Sin_Etiqueta""#).unwrap();
        assert_eq!(back, CentroidLabel::Unlabeled);
        assert_eq!(CentroidLabel::from(UNLABELED), CentroidLabel::Unlabeled);
    }
}
