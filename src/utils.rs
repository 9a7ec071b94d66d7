use chrono::Month;

pub const MONTHS_PER_YEAR: usize = 12;

/// Full English month name for a 1-based calendar month.
pub fn month_name(month: u32) -> Option<&'static str> {
    let month = u8::try_from(month).ok()?;
    Month::try_from(month).ok().map(|m| m.name())
}

/// Three-letter month abbreviation for a 1-based calendar month.
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    month_name(month).map(|name| &name[..3])
}

pub fn is_valid_month(month: u32) -> bool {
    (1..=MONTHS_PER_YEAR as u32).contains(&month)
}

/// 1-based calendar month for a 0-based series index.
pub fn index_to_month(index: usize) -> u32 {
    index as u32 + 1
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentile with linear interpolation between closest ranks.
/// `q` is expressed in percent (0..=100).
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// A series is degenerate when every value is identical (including all zero).
/// Such a series has no peaks or valleys under any strategy.
pub fn is_degenerate(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}

/// Count of distinct values, treating values as equal only when bit-identical.
pub fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}
