//! Midpoint marks between consecutive peaks and valleys.
//!
//! Only differing-kind neighbours produce a mark. The December/January
//! boundary is a single extra edge between the last and first point in
//! month order, anchored at month 0.5.

use crate::pattern::{order_points, Extremum, ExtremumKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Month coordinate of the mark spanning December and January.
pub const CIRCULAR_ANCHOR_MONTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum TransitionDirection {
    ValleyToPeak,
    PeakToValley,
}

impl TransitionDirection {
    pub fn from_kind(current: ExtremumKind) -> Self {
        match current {
            ExtremumKind::Valley => Self::ValleyToPeak,
            ExtremumKind::Peak => Self::PeakToValley,
        }
    }

    /// Semantic colour for the rendering layer.
    pub fn color(&self) -> &'static str {
        match self {
            Self::ValleyToPeak => "growth",
            Self::PeakToValley => "decline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransitionMark {
    #[schemars(description = "Midpoint month; 0.5 for the December→January mark")]
    pub month: f64,
    pub value: f64,
    pub direction: TransitionDirection,
    #[schemars(description = "True for the mark spanning the year boundary; draw it at months 1 and 12")]
    pub is_circular: bool,
    pub from_position: String,
    pub to_position: String,
}

impl TransitionMark {
    pub fn transition_label(&self) -> String {
        format!("{}→{}", self.from_position, self.to_position)
    }
}

/// An extremum with its running ordinal (`v1`, `p1`, `v2`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedPoint {
    pub point: Extremum,
    pub position: String,
}

pub fn assign_positions(points: &[Extremum]) -> Vec<PositionedPoint> {
    let mut valley_count = 0;
    let mut peak_count = 0;

    points
        .iter()
        .map(|point| {
            let position = match point.kind {
                ExtremumKind::Valley => {
                    valley_count += 1;
                    format!("v{}", valley_count)
                }
                ExtremumKind::Peak => {
                    peak_count += 1;
                    format!("p{}", peak_count)
                }
            };
            PositionedPoint {
                point: *point,
                position,
            }
        })
        .collect()
}

/// Marks for month-sorted `points`.
pub fn map_transitions(points: &[Extremum]) -> Vec<TransitionMark> {
    let positioned = assign_positions(points);
    let mut marks = Vec::new();

    for pair in positioned.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        if current.point.kind == next.point.kind {
            continue;
        }
        marks.push(TransitionMark {
            month: (current.point.month + next.point.month) as f64 / 2.0,
            value: (current.point.value + next.point.value) / 2.0,
            direction: TransitionDirection::from_kind(current.point.kind),
            is_circular: false,
            from_position: current.position.clone(),
            to_position: next.position.clone(),
        });
    }

    if let (Some(first), Some(last)) = (positioned.first(), positioned.last()) {
        if positioned.len() > 1 && first.point.kind != last.point.kind {
            marks.push(TransitionMark {
                month: CIRCULAR_ANCHOR_MONTH,
                value: (last.point.value + first.point.value) / 2.0,
                direction: TransitionDirection::from_kind(last.point.kind),
                is_circular: true,
                from_position: last.position.clone(),
                to_position: first.position.clone(),
            });
        }
    }

    marks
}

/// Marks for raw peak/valley indices over `values`.
pub fn transitions_from_indices(
    peaks: &[usize],
    valleys: &[usize],
    values: &[f64],
) -> Vec<TransitionMark> {
    map_transitions(&order_points(peaks, valleys, values))
}
