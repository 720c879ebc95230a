//! Error types for the CFO copilot

use crate::models::TrendMonth;
use thiserror::Error;

/// Result type alias for copilot operations outside the analyzer
pub type Result<T> = std::result::Result<T, CopilotError>;

/// Failures while reading a table source.
///
/// A source that simply does not exist is not an error: the loader
/// substitutes its built-in table instead.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read {table}: {source}")]
    Read {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{table} is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} row {row}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        table: &'static str,
        row: usize,
        column: String,
        value: String,
    },
}

/// Typed failure of a single metric computation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Data source error: {0}")]
    Data(#[from] DataError),

    #[error("Month '{month}' is not present in {table}")]
    MonthNotFound { table: &'static str, month: String },

    #[error("Invalid parameters for {function}: {reason}")]
    InvalidParams {
        function: &'static str,
        reason: String,
    },

    #[error("Function not registered: {0}")]
    FunctionNotRegistered(String),

    #[error("{} of {} trend month(s) could not be computed", failed_months(.0), .0.len())]
    IncompleteTrend(Vec<TrendMonth>),
}

fn failed_months(months: &[TrendMonth]) -> usize {
    months.iter().filter(|m| m.outcome.is_err()).count()
}

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Analysis error: {0}")]
    AnalysisError(#[from] AnalysisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
