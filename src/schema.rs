use crate::annual::AnnualTable;
use crate::error::{Result, SeasonalityError};
use crate::optimizer::OptimizedMark;
use crate::pattern::PatternResult;
use crate::statistics::{AnnualStatistics, SeriesStatistics};
use crate::transitions::TransitionMark;
use crate::InflectionAnalysis;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Twelve calendar-month slots, January first.
pub type MonthlyValues = [f64; 12];

/// Records older than this year are dropped by the default configuration.
pub const DEFAULT_MIN_YEAR: i32 = 2015;

/// One aggregated row from the call warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CallRecord {
    #[schemars(description = "Identifier of the company the calls belong to")]
    pub entity_id: u64,

    #[serde(default)]
    #[schemars(description = "Display name of the company, if known")]
    pub entity_name: Option<String>,

    #[serde(default)]
    #[schemars(description = "Location state of the calls, if known")]
    pub state: Option<String>,

    #[schemars(description = "Calendar year of the calls")]
    pub year: i32,

    #[schemars(description = "Calendar month of the calls (1 = January, 12 = December)")]
    pub month: u32,

    #[schemars(description = "Number of calls received in that year and month")]
    pub calls: u64,
}

impl CallRecord {
    pub fn new(entity_id: u64, year: i32, month: u32, calls: u64) -> Self {
        Self {
            entity_id,
            entity_name: None,
            state: None,
            year,
            month,
            calls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DetectionStrategy {
    #[schemars(
        description = "Local maxima/minima above/below the mean with at least 2 months between extrema of the same kind."
    )]
    Sensitive,

    #[default]
    #[schemars(
        description = "Same scan as Sensitive but requires 3 months between extrema of the same kind. Best suited to seasonal curves."
    )]
    Hybrid,

    #[schemars(description = "Always picks the two highest months as peaks and the two lowest as valleys.")]
    QuartileStrict,
}

impl DetectionStrategy {
    /// Minimum distance in months between two extrema of the same kind.
    /// `None` for strategies that do not scan for local extrema.
    pub fn min_distance(&self) -> Option<usize> {
        match self {
            Self::Sensitive => Some(2),
            Self::Hybrid => Some(3),
            Self::QuartileStrict => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sensitive => "Original (find_peaks)",
            Self::Hybrid => "Hybrid (3-4 months)",
            Self::QuartileStrict => "Mathematical Strict",
        }
    }
}

impl fmt::Display for DetectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sensitive => "sensitive",
            Self::Hybrid => "hybrid",
            Self::QuartileStrict => "quartile_strict",
        };
        f.write_str(name)
    }
}

impl FromStr for DetectionStrategy {
    type Err = SeasonalityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sensitive" | "original" | "original (find_peaks)" => Ok(Self::Sensitive),
            "hybrid" | "hybrid (3-4 months)" => Ok(Self::Hybrid),
            "quartile_strict" | "quartilestrict" | "strict" | "mathematical strict" => {
                Ok(Self::QuartileStrict)
            }
            _ => Err(SeasonalityError::InvalidStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AnalysisMode {
    #[default]
    #[schemars(description = "Each month as a percentage of the total calls")]
    Percentages,

    #[schemars(description = "Each month as an absolute number of calls")]
    Absolute,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentages => f.write_str("percentages"),
            Self::Absolute => f.write_str("absolute"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = SeasonalityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentages" | "percentage" => Ok(Self::Percentages),
            "absolute" | "absolute numbers" => Ok(Self::Absolute),
            _ => Err(SeasonalityError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    #[schemars(description = "Peak/valley detection strategy")]
    pub strategy: DetectionStrategy,

    #[schemars(description = "Whether displayed values are percentages or absolute call counts")]
    pub mode: AnalysisMode,

    #[schemars(description = "Records with an earlier year are ignored. Null keeps every record.")]
    pub min_year: Option<i32>,

    #[schemars(description = "Append the multi-year 'Historical Total' row to the annual table")]
    pub include_historical_total: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strategy: DetectionStrategy::default(),
            mode: AnalysisMode::default(),
            min_year: Some(DEFAULT_MIN_YEAR),
            include_historical_total: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(year) = self.min_year {
            if !(1900..=9999).contains(&year) {
                return Err(SeasonalityError::InvalidConfig(format!(
                    "min_year {} is outside 1900..=9999",
                    year
                )));
            }
        }
        Ok(())
    }

    pub fn accepts(&self, record: &CallRecord) -> bool {
        self.min_year.map_or(true, |min| record.year >= min)
    }
}

/// Everything derived for one entity in a single analysis request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SeasonalityReport {
    pub entity_id: u64,
    pub strategy: DetectionStrategy,
    pub mode: AnalysisMode,
    pub analysis: InflectionAnalysis,
    pub pattern: PatternResult,
    #[schemars(description = "Unoptimized midpoint marks between adjacent peaks and valleys")]
    pub transitions: Vec<TransitionMark>,
    #[schemars(description = "Marks after pattern-specific optimization; these are the ones to draw")]
    pub optimized_marks: Vec<OptimizedMark>,
    pub annual_table: AnnualTable,
    pub series_statistics: SeriesStatistics,
    pub annual_statistics: AnnualStatistics,
}

impl SeasonalityReport {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SeasonalityReport)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "hybrid".parse::<DetectionStrategy>().unwrap(),
            DetectionStrategy::Hybrid
        );
        assert_eq!(
            "Original (find_peaks)".parse::<DetectionStrategy>().unwrap(),
            DetectionStrategy::Sensitive
        );
        assert_eq!(
            "Mathematical Strict".parse::<DetectionStrategy>().unwrap(),
            DetectionStrategy::QuartileStrict
        );
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = "wavelet".parse::<DetectionStrategy>().unwrap_err();
        assert!(matches!(err, SeasonalityError::InvalidStrategy(ref s) if s == "wavelet"));
    }

    #[test]
    fn test_strategy_display_round_trip() {
        for strategy in [
            DetectionStrategy::Sensitive,
            DetectionStrategy::Hybrid,
            DetectionStrategy::QuartileStrict,
        ] {
            let parsed: DetectionStrategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "Absolute Numbers".parse::<AnalysisMode>().unwrap(),
            AnalysisMode::Absolute
        );
        assert!("relative".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config = AnalysisConfig::from_json(r#"{"strategy": "Sensitive"}"#).unwrap();
        assert_eq!(config.strategy, DetectionStrategy::Sensitive);
        assert_eq!(config.mode, AnalysisMode::Percentages);
        assert_eq!(config.min_year, Some(DEFAULT_MIN_YEAR));
        assert!(config.include_historical_total);
    }

    #[test]
    fn test_config_rejects_unknown_strategy() {
        let result = AnalysisConfig::from_json(r#"{"strategy": "Wavelet"}"#);
        assert!(matches!(
            result,
            Err(SeasonalityError::SerializationError(_))
        ));
    }

    #[test]
    fn test_config_rejects_out_of_range_year() {
        let result = AnalysisConfig::from_json(r#"{"min_year": 12}"#);
        assert!(matches!(result, Err(SeasonalityError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_min_year_filter() {
        let config = AnalysisConfig::default();
        assert!(!config.accepts(&CallRecord::new(1, 2014, 5, 10)));
        assert!(config.accepts(&CallRecord::new(1, 2015, 5, 10)));

        let unfiltered = AnalysisConfig {
            min_year: None,
            ..AnalysisConfig::default()
        };
        assert!(unfiltered.accepts(&CallRecord::new(1, 1999, 5, 10)));
    }

    #[test]
    fn test_report_schema_generation() {
        let schema_json = SeasonalityReport::schema_as_json().unwrap();
        assert!(schema_json.contains("optimized_marks"));
        assert!(schema_json.contains("annual_table"));
        assert!(schema_json.contains("QuartileStrict"));
    }
}
