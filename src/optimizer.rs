use crate::detection::detect;
use crate::pattern::{Extremum, ExtremumKind, PatternLabel, PatternResult};
use crate::schema::DetectionStrategy;
use crate::transitions::{transitions_from_indices, TransitionMark};
use crate::utils::mean;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Consecutive points at most this many months apart share a cluster.
pub const CLUSTER_GAP_MONTHS: u32 = 2;

/// A single mark standing in for a group of nearby extrema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterMark {
    pub month: f64,
    pub value: f64,
    /// Majority kind within the cluster; ties go to `Peak`.
    pub kind: ExtremumKind,
    pub original_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizedMark {
    Transition(TransitionMark),
    Cluster(ClusterMark),
}

impl OptimizedMark {
    pub fn month(&self) -> f64 {
        match self {
            Self::Transition(mark) => mark.month,
            Self::Cluster(mark) => mark.month,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Transition(mark) => mark.value,
            Self::Cluster(mark) => mark.value,
        }
    }

    pub fn is_optimized(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }
}

/// Picks the mark derivation suited to the classified pattern.
///
/// `values` is the series the marks are drawn on (percentages or absolute
/// calls); `peaks` and `valleys` are the indices the pattern was built from.
pub fn optimize_marks(
    pattern: &PatternResult,
    values: &[f64],
    peaks: &[usize],
    valleys: &[usize],
) -> Vec<OptimizedMark> {
    match pattern.label {
        PatternLabel::ClusteredPoints => cluster_marks(&pattern.ordered_points, values)
            .into_iter()
            .map(OptimizedMark::Cluster)
            .collect(),
        PatternLabel::NonAlternating | PatternLabel::TooManyPoints => {
            let strict = detect(values, DetectionStrategy::QuartileStrict);
            debug!(
                "{} pattern: re-deriving marks from quartile picks {:?}/{:?}",
                pattern.label, strict.peaks, strict.valleys
            );
            wrap(transitions_from_indices(&strict.peaks, &strict.valleys, values))
        }
        PatternLabel::Normal | PatternLabel::InsufficientPoints | PatternLabel::Complex => {
            wrap(transitions_from_indices(peaks, valleys, values))
        }
    }
}

fn wrap(marks: Vec<TransitionMark>) -> Vec<OptimizedMark> {
    marks.into_iter().map(OptimizedMark::Transition).collect()
}

/// Groups month-sorted points, starting a new group whenever the gap to the
/// previous point exceeds [`CLUSTER_GAP_MONTHS`].
pub fn segment_clusters(points: &[Extremum]) -> Vec<Vec<Extremum>> {
    let mut clusters: Vec<Vec<Extremum>> = Vec::new();

    for point in points {
        let joins_previous = clusters
            .last()
            .and_then(|cluster| cluster.last())
            .is_some_and(|prev| point.month - prev.month <= CLUSTER_GAP_MONTHS);

        match clusters.last_mut() {
            Some(cluster) if joins_previous => cluster.push(*point),
            _ => clusters.push(vec![*point]),
        }
    }

    clusters
}

/// One mark per multi-member cluster; singletons produce nothing.
pub fn cluster_marks(points: &[Extremum], values: &[f64]) -> Vec<ClusterMark> {
    segment_clusters(points)
        .into_iter()
        .filter(|cluster| cluster.len() > 1)
        .map(|cluster| {
            let months: Vec<f64> = cluster.iter().map(|p| p.month as f64).collect();
            let member_values: Vec<f64> = cluster
                .iter()
                .map(|p| values.get(p.source_index).copied().unwrap_or(p.value))
                .collect();

            let peak_count = cluster
                .iter()
                .filter(|p| p.kind == ExtremumKind::Peak)
                .count();
            let valley_count = cluster.len() - peak_count;
            let kind = if peak_count >= valley_count {
                ExtremumKind::Peak
            } else {
                ExtremumKind::Valley
            };

            ClusterMark {
                month: mean(&months),
                value: mean(&member_values),
                kind,
                original_points: cluster.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::classify;

    const VALUES: [f64; 12] = [2.0, 5.0, 9.0, 5.0, 2.0, 1.0, 3.0, 8.0, 12.0, 7.0, 3.0, 1.0];

    #[test]
    fn test_normal_pattern_uses_plain_transitions() {
        let pattern = classify(&[2, 8], &[0, 5], &VALUES);
        assert_eq!(pattern.label, PatternLabel::Normal);

        let marks = optimize_marks(&pattern, &VALUES, &[2, 8], &[0, 5]);
        let plain = transitions_from_indices(&[2, 8], &[0, 5], &VALUES);
        assert_eq!(marks, wrap(plain));
        assert!(marks.iter().all(|m| !m.is_optimized()));
    }

    #[test]
    fn test_clustered_pattern_collapses_each_cluster() {
        // 1v, 2p, 7v, 8p
        let (peaks, valleys) = ([1, 7], [0, 6]);
        let pattern = classify(&peaks, &valleys, &VALUES);
        assert_eq!(pattern.label, PatternLabel::ClusteredPoints);

        let marks = optimize_marks(&pattern, &VALUES, &peaks, &valleys);
        assert_eq!(marks.len(), 2);

        match &marks[0] {
            OptimizedMark::Cluster(mark) => {
                assert_eq!(mark.month, 1.5);
                assert_eq!(mark.value, 3.5);
                assert_eq!(mark.kind, ExtremumKind::Peak);
                assert_eq!(mark.original_points, 2);
            }
            other => panic!("expected cluster mark, got {:?}", other),
        }
        assert_eq!(marks[1].month(), 7.5);
        assert_eq!(marks[1].value(), 5.5);
    }

    #[test]
    fn test_cluster_majority_kind() {
        // 1v, 2v, 3p
        let pattern = classify(&[2], &[0, 1], &VALUES);
        let marks = cluster_marks(&pattern.ordered_points, &VALUES);
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].kind, ExtremumKind::Valley);
        assert_eq!(marks[0].original_points, 3);
        assert_eq!(marks[0].month, 2.0);
    }

    #[test]
    fn test_singleton_clusters_are_dropped() {
        // 1v, 2p, 6v
        let pattern = classify(&[1], &[0, 5], &VALUES);
        assert_eq!(pattern.label, PatternLabel::ClusteredPoints);
        let marks = optimize_marks(&pattern, &VALUES, &[1], &[0, 5]);
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].month(), 1.5);
    }

    #[test]
    fn test_segment_clusters_gap_rule() {
        let pattern = classify(&[2, 8], &[0, 5, 11], &VALUES);
        let clusters = segment_clusters(&pattern.ordered_points);
        // 1,3 share a cluster (gap 2); 6, 9, 12 are each 3 apart
        let sizes: Vec<usize> = clusters.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![2, 1, 1, 1]);
    }

    #[test]
    fn test_too_many_points_rerun_with_quartiles() {
        let (peaks, valleys) = ([2, 8], [0, 5, 11]);
        let pattern = classify(&peaks, &valleys, &VALUES);
        assert_eq!(pattern.label, PatternLabel::TooManyPoints);

        let marks = optimize_marks(&pattern, &VALUES, &peaks, &valleys);
        // quartile picks: peaks {3, 9}, valleys {6, 12} in months
        let expected = wrap(transitions_from_indices(&[2, 8], &[5, 11], &VALUES));
        assert_eq!(marks, expected);
        assert_eq!(marks.len(), 4);
    }

    #[test]
    fn test_non_alternating_rerun_with_quartiles() {
        let pattern = classify(&[2, 7], &[11], &VALUES);
        assert_eq!(pattern.label, PatternLabel::NonAlternating);
        let marks = optimize_marks(&pattern, &VALUES, &[2, 7], &[11]);
        assert_eq!(marks.len(), 4);
    }

    #[test]
    fn test_insufficient_points_use_plain_transitions() {
        let pattern = classify(&[8], &[5], &VALUES);
        assert_eq!(pattern.label, PatternLabel::InsufficientPoints);
        let marks = optimize_marks(&pattern, &VALUES, &[8], &[5]);
        assert_eq!(marks.len(), 2);
    }
}
