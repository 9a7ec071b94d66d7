use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeasonalityError {
    #[error("Unknown detection strategy '{0}': expected sensitive, hybrid or quartile_strict")]
    InvalidStrategy(String),

    #[error("Unknown analysis mode '{0}': expected percentages or absolute")]
    InvalidMode(String),

    #[error("Invalid month {month} in record for entity {entity_id} (year {year}): must be between 1 and 12")]
    InvalidMonth {
        entity_id: u64,
        year: i32,
        month: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SeasonalityError>;
