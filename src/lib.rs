//! # Call Seasonality
//!
//! Finds the seasonal peaks and valleys in a company's month-by-month call
//! volume, classifies the shape of that curve, and derives the transition
//! marks a chart draws between consecutive extrema.
//!
//! ## Core Concepts
//!
//! - **Monthly profile**: every record of one company folded into twelve
//!   calendar-month totals and their share of the overall total
//! - **Peak / Valley**: a month that is a local maximum above (minimum below)
//!   the series mean, or a top/bottom-two month for the strict strategy
//! - **Pattern**: a qualitative label for the detected extrema (Normal,
//!   Clustered Points, Non-Alternating, ...) with issues and recommendations
//! - **Transition mark**: a midpoint between a valley and the following peak
//!   (growth) or a peak and the following valley (decline), plus one mark
//!   across the December → January boundary
//! - **Annual table**: year × month breakdown with a Historical Total row
//!
//! ## Example
//!
//! ```rust,ignore
//! use call_seasonality::*;
//!
//! let records = vec![
//!     CallRecord::new(42, 2023, 1, 120),
//!     CallRecord::new(42, 2023, 7, 480),
//!     // ...
//! ];
//!
//! let analyzer = SeasonalityAnalyzer::new(AnalysisConfig::default())?;
//! if let Some(report) = analyzer.report(&records, 42)? {
//!     println!("{}: {}", report.entity_id, report.pattern.label);
//! }
//! ```

pub mod aggregator;
pub mod annual;
pub mod detection;
pub mod error;
pub mod ingestion;
pub mod optimizer;
pub mod pattern;
pub mod schema;
pub mod statistics;
pub mod transitions;
pub mod utils;

pub use aggregator::{aggregate_monthly, validate_records, MonthlyProfile};
pub use annual::{build_annual_table, AnnualTable, HISTORICAL_TOTAL_LABEL};
pub use detection::{detect, find_local_maxima, DetectionResult, Quartiles};
pub use error::{Result, SeasonalityError};
pub use ingestion::{entity_directory, records_for_entity, summarize_entity, EntitySummary};
pub use optimizer::{cluster_marks, optimize_marks, ClusterMark, OptimizedMark};
pub use pattern::{classify, Extremum, ExtremumKind, PatternLabel, PatternResult};
pub use schema::*;
pub use statistics::{AnnualStatistics, SeriesStatistics};
pub use transitions::{
    map_transitions, transitions_from_indices, TransitionDirection, TransitionMark,
};

use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detected seasonal structure for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InflectionAnalysis {
    pub entity_id: u64,
    pub strategy: DetectionStrategy,
    pub months: [u32; 12],
    pub percentages: MonthlyValues,
    /// 0-based month indices.
    pub peaks: Vec<usize>,
    /// 0-based month indices.
    pub valleys: Vec<usize>,
    pub total_calls: u64,
    pub raw_monthly: [u64; 12],
    pub threshold: Option<f64>,
    pub quartiles: Option<Quartiles>,
}

impl InflectionAnalysis {
    fn from_profile(profile: &MonthlyProfile, detection: DetectionResult) -> Self {
        let mut months = [0u32; 12];
        for (i, month) in months.iter_mut().enumerate() {
            *month = utils::index_to_month(i);
        }
        Self {
            entity_id: profile.entity_id,
            strategy: detection.strategy,
            months,
            percentages: profile.percentages,
            peaks: detection.peaks,
            valleys: detection.valleys,
            total_calls: profile.total_calls,
            raw_monthly: profile.monthly_calls,
            threshold: detection.threshold,
            quartiles: detection.quartiles,
        }
    }

    /// The series a chart shows for `mode`.
    pub fn display_values(&self, mode: AnalysisMode) -> MonthlyValues {
        match mode {
            AnalysisMode::Percentages => self.percentages,
            AnalysisMode::Absolute => self.profile().absolute(),
        }
    }

    pub fn profile(&self) -> MonthlyProfile {
        MonthlyProfile {
            entity_id: self.entity_id,
            monthly_calls: self.raw_monthly,
            percentages: self.percentages,
            total_calls: self.total_calls,
        }
    }

    pub fn is_peak(&self, index: usize) -> bool {
        self.peaks.contains(&index)
    }

    pub fn is_valley(&self, index: usize) -> bool {
        self.valleys.contains(&index)
    }
}

pub struct SeasonalityAnalyzer {
    config: AnalysisConfig,
}

impl SeasonalityAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn accepted<'a>(&self, records: &'a [CallRecord]) -> Vec<&'a CallRecord> {
        records.iter().filter(|r| self.config.accepts(r)).collect()
    }

    pub fn analyze(
        &self,
        records: &[CallRecord],
        entity_id: u64,
    ) -> Result<Option<InflectionAnalysis>> {
        let accepted = self.accepted(records);
        analyze_accepted(&accepted, entity_id, self.config.strategy)
    }

    pub fn annual_table(
        &self,
        records: &[CallRecord],
        entity_id: u64,
    ) -> Result<Option<AnnualTable>> {
        let accepted = self.accepted(records);
        let historical = if self.config.include_historical_total {
            aggregate_monthly(accepted.iter().copied(), entity_id)?
        } else {
            None
        };
        build_annual_table(
            accepted.iter().copied(),
            entity_id,
            self.config.mode,
            historical.as_ref(),
        )
    }

    /// Full analysis for one entity, or `Ok(None)` when it has no records.
    pub fn report(
        &self,
        records: &[CallRecord],
        entity_id: u64,
    ) -> Result<Option<SeasonalityReport>> {
        info!(
            "Analyzing entity {} with {} strategy ({} mode)",
            entity_id, self.config.strategy, self.config.mode
        );

        let accepted = self.accepted(records);
        debug!(
            "{} of {} records pass the year filter",
            accepted.len(),
            records.len()
        );

        let Some(analysis) = analyze_accepted(&accepted, entity_id, self.config.strategy)? else {
            info!("No data for entity {}", entity_id);
            return Ok(None);
        };

        let mode = self.config.mode;
        let values = analysis.display_values(mode);

        let pattern = classify(&analysis.peaks, &analysis.valleys, &values);
        let transitions = transitions_from_indices(&analysis.peaks, &analysis.valleys, &values);
        let optimized_marks = optimize_marks(&pattern, &values, &analysis.peaks, &analysis.valleys);

        let profile = analysis.profile();
        let historical = self.config.include_historical_total.then_some(&profile);
        let Some(annual_table) =
            build_annual_table(accepted.iter().copied(), entity_id, mode, historical)?
        else {
            return Ok(None);
        };

        let series_statistics = SeriesStatistics::compute(&values, &analysis.peaks, &analysis.valleys);
        let annual_statistics = AnnualStatistics::compute(&annual_table);

        info!(
            "Entity {}: {} pattern, {} optimized marks over {} years",
            entity_id,
            pattern.label,
            optimized_marks.len(),
            annual_statistics.years_analyzed
        );

        Ok(Some(SeasonalityReport {
            entity_id,
            strategy: self.config.strategy,
            mode,
            analysis,
            pattern,
            transitions,
            optimized_marks,
            annual_table,
            series_statistics,
            annual_statistics,
        }))
    }
}

fn analyze_accepted(
    records: &[&CallRecord],
    entity_id: u64,
    strategy: DetectionStrategy,
) -> Result<Option<InflectionAnalysis>> {
    let Some(profile) = aggregate_monthly(records.iter().copied(), entity_id)? else {
        return Ok(None);
    };
    let detection = detect(&profile.percentages, strategy);
    Ok(Some(InflectionAnalysis::from_profile(&profile, detection)))
}

/// Aggregates and runs detection for one entity over every record given.
pub fn analyze(
    records: &[CallRecord],
    entity_id: u64,
    strategy: DetectionStrategy,
) -> Result<Option<InflectionAnalysis>> {
    let all: Vec<&CallRecord> = records.iter().collect();
    analyze_accepted(&all, entity_id, strategy)
}

/// Pattern-aware marks for the chart; see [`optimize_marks`].
pub fn transitions(
    pattern: &PatternResult,
    values: &[f64],
    peaks: &[usize],
    valleys: &[usize],
) -> Vec<OptimizedMark> {
    optimize_marks(pattern, values, peaks, valleys)
}

/// Year × month table with the Historical Total row appended.
pub fn annual_table(
    records: &[CallRecord],
    entity_id: u64,
    mode: AnalysisMode,
) -> Result<Option<AnnualTable>> {
    let historical = aggregate_monthly(records, entity_id)?;
    build_annual_table(records, entity_id, mode, historical.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike_records() -> Vec<CallRecord> {
        let raw = [10, 10, 10, 40, 10, 10, 10, 10, 10, 10, 10, 40];
        raw.iter()
            .enumerate()
            .map(|(i, calls)| CallRecord::new(11, 2023, i as u32 + 1, *calls))
            .collect()
    }

    #[test]
    fn test_analyze_spike_series() {
        let analysis = analyze(&spike_records(), 11, DetectionStrategy::Hybrid)
            .unwrap()
            .unwrap();
        assert_eq!(analysis.peaks, vec![3, 11]);
        assert!(analysis.valleys.is_empty());
        assert_eq!(analysis.total_calls, 180);
        assert_eq!(analysis.raw_monthly[3], 40);
        assert_eq!(analysis.months[0], 1);
        assert_eq!(analysis.months[11], 12);
        assert!(analysis.is_peak(11));
        assert!(!analysis.is_valley(11));
    }

    #[test]
    fn test_analyze_unknown_entity() {
        let result = analyze(&spike_records(), 12, DetectionStrategy::Hybrid).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_display_values_by_mode() {
        let analysis = analyze(&spike_records(), 11, DetectionStrategy::Hybrid)
            .unwrap()
            .unwrap();
        assert_eq!(analysis.display_values(AnalysisMode::Absolute)[3], 40.0);
        assert!((analysis.display_values(AnalysisMode::Percentages)[3] - 40.0 / 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_report_for_spike_series() {
        let analyzer = SeasonalityAnalyzer::new(AnalysisConfig::default()).unwrap();
        let report = analyzer.report(&spike_records(), 11).unwrap().unwrap();

        assert_eq!(report.pattern.label, PatternLabel::NonAlternating);
        assert_eq!(report.pattern.total_points(), 2);
        // consecutive peaks 4 and 12 produce no plain marks
        assert!(report.transitions.is_empty());
        // the optimizer falls back to the strict two-and-two picks
        assert!(!report.optimized_marks.is_empty());
        assert_eq!(report.series_statistics.peak_count, 2);
        assert_eq!(report.annual_statistics.years_analyzed, 1);
        assert!(report.annual_table.historical_total.is_some());
    }

    #[test]
    fn test_report_respects_historical_toggle() {
        let config = AnalysisConfig {
            include_historical_total: false,
            mode: AnalysisMode::Absolute,
            ..AnalysisConfig::default()
        };
        let analyzer = SeasonalityAnalyzer::new(config).unwrap();
        let report = analyzer.report(&spike_records(), 11).unwrap().unwrap();
        assert!(report.annual_table.historical_total.is_none());
        assert_eq!(report.annual_table.mode, AnalysisMode::Absolute);
        assert_eq!(report.series_statistics.max_variation, 30.0);
    }

    #[test]
    fn test_min_year_filter_can_empty_an_entity() {
        let records = vec![CallRecord::new(1, 2012, 3, 50), CallRecord::new(1, 2013, 4, 50)];
        let analyzer = SeasonalityAnalyzer::new(AnalysisConfig::default()).unwrap();
        assert!(analyzer.report(&records, 1).unwrap().is_none());
        assert!(analyzer.annual_table(&records, 1).unwrap().is_none());

        let unfiltered = SeasonalityAnalyzer::new(AnalysisConfig {
            min_year: None,
            ..AnalysisConfig::default()
        })
        .unwrap();
        assert!(unfiltered.analyze(&records, 1).unwrap().is_some());
    }

    #[test]
    fn test_analyzer_rejects_invalid_config() {
        let config = AnalysisConfig {
            min_year: Some(-5),
            ..AnalysisConfig::default()
        };
        assert!(SeasonalityAnalyzer::new(config).is_err());
    }

    #[test]
    fn test_free_annual_table_includes_historical_row() {
        let table = annual_table(&spike_records(), 11, AnalysisMode::Percentages)
            .unwrap()
            .unwrap();
        let historical = table.historical_total.unwrap();
        assert_eq!(&historical, table.row(2023).unwrap());
    }
}
