use crate::utils::index_to_month;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adjacent points closer than this many months are reported as clustered.
pub const MIN_POINT_SPACING: u32 = 2;

/// A seasonal curve is considered ideal with exactly this many extrema.
pub const EXPECTED_POINT_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ExtremumKind {
    Peak,
    Valley,
}

impl fmt::Display for ExtremumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peak => f.write_str("peak"),
            Self::Valley => f.write_str("valley"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Extremum {
    /// Calendar month, 1..=12.
    pub month: u32,
    pub value: f64,
    pub kind: ExtremumKind,
    /// 0-based index into the analysed series.
    pub source_index: usize,
}

/// Tags peaks and valleys and sorts them by month.
///
/// Indices outside `values` are skipped.
pub fn order_points(peaks: &[usize], valleys: &[usize], values: &[f64]) -> Vec<Extremum> {
    let tagged = peaks
        .iter()
        .map(|&i| (i, ExtremumKind::Peak))
        .chain(valleys.iter().map(|&i| (i, ExtremumKind::Valley)));

    let mut points: Vec<Extremum> = tagged
        .filter_map(|(index, kind)| {
            values.get(index).map(|&value| Extremum {
                month: index_to_month(index),
                value,
                kind,
                source_index: index,
            })
        })
        .collect();

    points.sort_by_key(|p| p.month);
    points
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum PatternLabel {
    #[schemars(description = "Four well-separated, alternating peaks and valleys")]
    Normal,
    #[schemars(description = "At least two adjacent points are less than two months apart")]
    ClusteredPoints,
    #[schemars(description = "Two peaks or two valleys follow each other")]
    NonAlternating,
    #[schemars(description = "Fewer than four points were detected")]
    InsufficientPoints,
    #[schemars(description = "More than four points were detected")]
    TooManyPoints,
    #[schemars(description = "None of the other rules apply")]
    Complex,
}

impl PatternLabel {
    pub fn baseline_recommendation(&self) -> &'static str {
        match self {
            Self::Normal => "Optimal pattern: Well-separated alternating peaks and valleys",
            Self::ClusteredPoints => {
                "Consider merging nearby points or using different detection parameters"
            }
            Self::NonAlternating => {
                "Consider adjusting detection method or using mathematical strict approach"
            }
            Self::InsufficientPoints => "Increase sensitivity or check data quality",
            Self::TooManyPoints => "Reduce sensitivity or use mathematical strict method",
            Self::Complex => "Pattern requires manual review",
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "Normal",
            Self::ClusteredPoints => "Clustered Points",
            Self::NonAlternating => "Non-Alternating",
            Self::InsufficientPoints => "Insufficient Points",
            Self::TooManyPoints => "Too Many Points",
            Self::Complex => "Complex",
        };
        f.write_str(name)
    }
}

/// First matching rule wins.
pub fn classify_label(is_alternating: bool, too_close_count: usize, point_count: usize) -> PatternLabel {
    if is_alternating && too_close_count == 0 && point_count == EXPECTED_POINT_COUNT {
        PatternLabel::Normal
    } else if too_close_count > 0 {
        PatternLabel::ClusteredPoints
    } else if !is_alternating {
        PatternLabel::NonAlternating
    } else if point_count < EXPECTED_POINT_COUNT {
        PatternLabel::InsufficientPoints
    } else if point_count > EXPECTED_POINT_COUNT {
        PatternLabel::TooManyPoints
    } else {
        PatternLabel::Complex
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PatternResult {
    pub label: PatternLabel,
    pub is_alternating: bool,
    /// Every detected peak and valley, sorted by month.
    pub ordered_points: Vec<Extremum>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl PatternResult {
    pub fn total_points(&self) -> usize {
        self.ordered_points.len()
    }
}

pub fn classify(peaks: &[usize], valleys: &[usize], values: &[f64]) -> PatternResult {
    let ordered_points = order_points(peaks, valleys, values);

    let mut consecutive = Vec::new();
    let mut too_close = Vec::new();

    for pair in ordered_points.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);

        if current.kind == next.kind {
            consecutive.push(format!(
                "Consecutive {}s in months {} and {}",
                current.kind, current.month, next.month
            ));
        }

        let distance = next.month - current.month;
        if distance < MIN_POINT_SPACING {
            too_close.push(format!(
                "{} (month {}) and {} (month {}) are too close ({} month{})",
                current.kind,
                current.month,
                next.kind,
                next.month,
                distance,
                if distance == 1 { "" } else { "s" }
            ));
        }
    }

    let is_alternating = consecutive.is_empty();
    let circular_issues = year_end_issues(&ordered_points);
    let label = classify_label(is_alternating, too_close.len(), ordered_points.len());

    let mut recommendations = vec![label.baseline_recommendation().to_string()];
    if !too_close.is_empty() {
        recommendations
            .push("Consider using 'Mathematical Strict' method for better separation".to_string());
    }
    if !is_alternating {
        recommendations
            .push("Try 'Hybrid (3-4 months)' method for better seasonal patterns".to_string());
    }

    let issues: Vec<String> = consecutive
        .into_iter()
        .chain(too_close)
        .chain(circular_issues)
        .collect();

    debug!(
        "Classified {} points as {} ({} issues)",
        ordered_points.len(),
        label,
        issues.len()
    );

    PatternResult {
        label,
        is_alternating,
        ordered_points,
        issues,
        recommendations,
    }
}

fn year_end_issues(points: &[Extremum]) -> Vec<String> {
    let january = points.iter().find(|p| p.month == 1);
    points
        .iter()
        .filter(|p| p.month == 12)
        .filter_map(|december| {
            january.map(|jan| {
                format!(
                    "Year-end transition: {} in December and {} in January",
                    december.kind, jan.kind
                )
            })
        })
        .collect()
}
