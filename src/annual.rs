use crate::aggregator::{to_percentages, MonthlyProfile};
use crate::error::{Result, SeasonalityError};
use crate::schema::{AnalysisMode, CallRecord, MonthlyValues};
use crate::utils::{index_to_month, is_valid_month};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const HISTORICAL_TOTAL_LABEL: &str = "Historical Total";

/// Year × month breakdown for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnualTable {
    pub entity_id: u64,
    pub mode: AnalysisMode,
    /// One row per year with data; missing months are zero.
    pub rows: BTreeMap<i32, MonthlyValues>,
    /// Multi-year aggregate in the same mode, for cross-checking the rows.
    pub historical_total: Option<MonthlyValues>,
}

impl AnnualTable {
    pub fn years(&self) -> Vec<i32> {
        self.rows.keys().copied().collect()
    }

    pub fn row(&self, year: i32) -> Option<&MonthlyValues> {
        self.rows.get(&year)
    }

    /// Rows in display order, labelled, with the historical row last.
    pub fn labelled_rows(&self) -> Vec<(String, &MonthlyValues)> {
        let mut rows: Vec<(String, &MonthlyValues)> = self
            .rows
            .iter()
            .map(|(year, values)| (year.to_string(), values))
            .collect();
        if let Some(total) = &self.historical_total {
            rows.push((HISTORICAL_TOTAL_LABEL.to_string(), total));
        }
        rows
    }

    /// Months (1..=12) holding a non-zero value.
    pub fn nonzero_months(values: &MonthlyValues) -> Vec<u32> {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| index_to_month(i))
            .collect()
    }

    /// `(max month, min month)` over non-zero cells, earliest month on ties.
    pub fn row_extremes(values: &MonthlyValues) -> Option<(u32, u32)> {
        let nonzero: Vec<(usize, f64)> = values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| *v != 0.0)
            .collect();

        let (mut max, mut min) = (*nonzero.first()?, *nonzero.first()?);
        for &(i, v) in &nonzero[1..] {
            if v > max.1 {
                max = (i, v);
            }
            if v < min.1 {
                min = (i, v);
            }
        }

        Some((index_to_month(max.0), index_to_month(min.0)))
    }
}

/// Builds the per-year table for `entity_id`, or `Ok(None)` without records.
///
/// `historical` is the multi-year profile appended as the historical row.
pub fn build_annual_table<'a, I>(
    records: I,
    entity_id: u64,
    mode: AnalysisMode,
    historical: Option<&MonthlyProfile>,
) -> Result<Option<AnnualTable>>
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let mut calls_by_year: BTreeMap<i32, [u64; 12]> = BTreeMap::new();

    for record in records.into_iter().filter(|r| r.entity_id == entity_id) {
        if !is_valid_month(record.month) {
            return Err(SeasonalityError::InvalidMonth {
                entity_id,
                year: record.year,
                month: record.month,
            });
        }
        calls_by_year.entry(record.year).or_insert([0; 12])[(record.month - 1) as usize] +=
            record.calls;
    }

    if calls_by_year.is_empty() {
        return Ok(None);
    }

    let rows: BTreeMap<i32, MonthlyValues> = calls_by_year
        .into_iter()
        .map(|(year, calls)| (year, row_values(&calls, mode)))
        .collect();

    let historical_total = historical.map(|profile| match mode {
        AnalysisMode::Percentages => profile.percentages,
        AnalysisMode::Absolute => profile.absolute(),
    });

    debug!(
        "Built annual table for entity {} with {} years ({} mode)",
        entity_id,
        rows.len(),
        mode
    );

    Ok(Some(AnnualTable {
        entity_id,
        mode,
        rows,
        historical_total,
    }))
}

fn row_values(calls: &[u64; 12], mode: AnalysisMode) -> MonthlyValues {
    match mode {
        AnalysisMode::Percentages => to_percentages(calls, calls.iter().sum()),
        AnalysisMode::Absolute => {
            let mut values = [0.0; 12];
            for (slot, c) in values.iter_mut().zip(calls.iter()) {
                *slot = *c as f64;
            }
            values
        }
    }
}
