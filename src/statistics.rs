use crate::annual::AnnualTable;
use crate::utils::{index_to_month, mean};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeriesStatistics {
    pub peak_count: usize,
    pub valley_count: usize,
    pub monthly_average: f64,
    /// Highest month minus lowest month.
    pub max_variation: f64,
    /// Month (1..=12) with the highest value, earliest on ties.
    pub most_active_month: Option<u32>,
}

impl SeriesStatistics {
    pub fn compute(values: &[f64], peaks: &[usize], valleys: &[usize]) -> Self {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            peak_count: peaks.len(),
            valley_count: valleys.len(),
            monthly_average: mean(values),
            max_variation: if values.is_empty() { 0.0 } else { max - min },
            most_active_month: argmax(values).map(index_to_month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnualStatistics {
    pub years_analyzed: usize,
    /// Mean over years of (max − min) across non-zero months.
    pub average_annual_variation: f64,
    /// Month with the highest mean across year rows.
    pub most_active_month: Option<u32>,
}

impl AnnualStatistics {
    pub fn compute(table: &AnnualTable) -> Self {
        let variations: Vec<f64> = table
            .rows
            .values()
            .filter_map(|row| {
                let nonzero: Vec<f64> = row.iter().copied().filter(|v| *v > 0.0).collect();
                if nonzero.is_empty() {
                    return None;
                }
                let max = nonzero.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let min = nonzero.iter().copied().fold(f64::INFINITY, f64::min);
                Some(max - min)
            })
            .collect();

        let column_means: Vec<f64> = (0..12)
            .map(|month| {
                let column: Vec<f64> = table.rows.values().map(|row| row[month]).collect();
                mean(&column)
            })
            .collect();

        Self {
            years_analyzed: table.rows.len(),
            average_annual_variation: mean(&variations),
            most_active_month: if table.rows.is_empty() {
                None
            } else {
                argmax(&column_means).map(index_to_month)
            },
        }
    }
}

fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
