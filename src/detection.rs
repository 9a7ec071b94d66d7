//! Peak and valley detection over a twelve-month series.
//!
//! The series is treated as open-ended: January and December are only
//! compared against their single interior neighbour. Wraparound between
//! the two is handled later by the transition mapper.

use crate::schema::DetectionStrategy;
use crate::utils::{distinct_count, is_degenerate, mean, percentile};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn of(values: &[f64]) -> Self {
        Self {
            q1: percentile(values, 25.0),
            median: percentile(values, 50.0),
            q3: percentile(values, 75.0),
        }
    }
}

/// Peak and valley indices (0-based, ascending, disjoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionResult {
    pub strategy: DetectionStrategy,
    pub peaks: Vec<usize>,
    pub valleys: Vec<usize>,
    /// Height threshold used by the local-extremum scan (the series mean).
    pub threshold: Option<f64>,
    /// Diagnostic quartiles; only computed by `QuartileStrict`.
    pub quartiles: Option<Quartiles>,
}

impl DetectionResult {
    fn empty(strategy: DetectionStrategy) -> Self {
        Self {
            strategy,
            peaks: Vec::new(),
            valleys: Vec::new(),
            threshold: None,
            quartiles: None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.peaks.len() + self.valleys.len()
    }
}

pub fn detect(values: &[f64], strategy: DetectionStrategy) -> DetectionResult {
    if is_degenerate(values) {
        debug!(
            "Degenerate series ({} values, all identical); no extrema for {}",
            values.len(),
            strategy
        );
        return DetectionResult::empty(strategy);
    }

    let result = match strategy.min_distance() {
        Some(distance) => detect_local_extrema(values, strategy, distance),
        None => detect_by_rank(values),
    };

    debug!(
        "{} detected peaks {:?} and valleys {:?}",
        strategy, result.peaks, result.valleys
    );

    result
}

fn detect_local_extrema(
    values: &[f64],
    strategy: DetectionStrategy,
    distance: usize,
) -> DetectionResult {
    let threshold = mean(values);
    let peaks = find_local_maxima(values, threshold, distance);

    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    let valleys = find_local_maxima(&negated, -threshold, distance);

    DetectionResult {
        strategy,
        peaks,
        valleys,
        threshold: Some(threshold),
        quartiles: None,
    }
}

/// Strict local maxima at or above `height`, thinned so that no two kept
/// maxima are closer than `distance` samples. Higher maxima win; equal
/// heights keep the earlier index.
pub fn find_local_maxima(values: &[f64], height: f64, distance: usize) -> Vec<usize> {
    let n = values.len();
    let mut candidates: Vec<usize> = (0..n)
        .filter(|&i| {
            let left = i.checked_sub(1).map(|j| values[j]);
            let right = (i + 1 < n).then(|| values[i + 1]);
            if left.is_none() && right.is_none() {
                return false;
            }
            left.map_or(true, |l| values[i] > l)
                && right.map_or(true, |r| values[i] > r)
                && values[i] >= height
        })
        .collect();

    candidates.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));

    let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().all(|&k| k.abs_diff(candidate) >= distance) {
            kept.push(candidate);
        }
    }

    kept.sort_unstable();
    kept
}

/// The two lowest months become valleys and the two highest of the remaining
/// months become peaks. Equal values resolve toward the lower month index.
fn detect_by_rank(values: &[f64]) -> DetectionResult {
    let quartiles = Quartiles::of(values);

    if distinct_count(values) < 4 {
        debug!(
            "Only {} distinct values; ranking ties resolve toward earlier months",
            distinct_count(values)
        );
    }

    let mut ascending: Vec<usize> = (0..values.len()).collect();
    ascending.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut valleys: Vec<usize> = ascending.iter().take(2).copied().collect();

    let mut descending: Vec<usize> = ascending
        .iter()
        .skip(valleys.len())
        .copied()
        .collect();
    descending.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));

    let mut peaks: Vec<usize> = descending.into_iter().take(2).collect();

    peaks.sort_unstable();
    valleys.sort_unstable();

    DetectionResult {
        strategy: DetectionStrategy::QuartileStrict,
        peaks,
        valleys,
        threshold: None,
        quartiles: Some(quartiles),
    }
}
