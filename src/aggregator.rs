use crate::error::{Result, SeasonalityError};
use crate::schema::{CallRecord, MonthlyValues};
use crate::utils::is_valid_month;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Multi-year monthly totals for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyProfile {
    pub entity_id: u64,
    /// Sum of calls per calendar month across every year.
    pub monthly_calls: [u64; 12],
    /// `monthly_calls` as a share of `total_calls`, in percent. All zero when
    /// `total_calls` is zero.
    pub percentages: MonthlyValues,
    pub total_calls: u64,
}

impl MonthlyProfile {
    /// Monthly call totals as floating-point values.
    pub fn absolute(&self) -> MonthlyValues {
        let mut values = [0.0; 12];
        for (slot, calls) in values.iter_mut().zip(self.monthly_calls.iter()) {
            *slot = *calls as f64;
        }
        values
    }
}

pub fn validate_records(records: &[CallRecord]) -> Result<()> {
    for record in records {
        if !is_valid_month(record.month) {
            return Err(SeasonalityError::InvalidMonth {
                entity_id: record.entity_id,
                year: record.year,
                month: record.month,
            });
        }
    }
    Ok(())
}

/// Reduces every record of `entity_id` to twelve monthly slots.
///
/// Returns `Ok(None)` when no record belongs to the entity.
pub fn aggregate_monthly<'a, I>(records: I, entity_id: u64) -> Result<Option<MonthlyProfile>>
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let mut monthly_calls = [0u64; 12];
    let mut matched = 0usize;

    for record in records.into_iter().filter(|r| r.entity_id == entity_id) {
        if !is_valid_month(record.month) {
            return Err(SeasonalityError::InvalidMonth {
                entity_id,
                year: record.year,
                month: record.month,
            });
        }
        monthly_calls[(record.month - 1) as usize] += record.calls;
        matched += 1;
    }

    if matched == 0 {
        debug!("No records found for entity {}", entity_id);
        return Ok(None);
    }

    let total_calls: u64 = monthly_calls.iter().sum();
    let percentages = to_percentages(&monthly_calls, total_calls);

    debug!(
        "Aggregated {} records for entity {} ({} calls)",
        matched, entity_id, total_calls
    );

    Ok(Some(MonthlyProfile {
        entity_id,
        monthly_calls,
        percentages,
        total_calls,
    }))
}

pub(crate) fn to_percentages(monthly_calls: &[u64; 12], total_calls: u64) -> MonthlyValues {
    let mut percentages = [0.0; 12];
    if total_calls == 0 {
        return percentages;
    }
    for (slot, calls) in percentages.iter_mut().zip(monthly_calls.iter()) {
        *slot = *calls as f64 / total_calls as f64 * 100.0;
    }
    percentages
}
