//! Error types for parameter loading and projection

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    /// A year-indexed input has no entry for a year the engine needs
    #[error("Missing parameter: {field} has no entry for year {year}")]
    MissingParameter { field: String, year: u32 },

    /// A required input is absent or has the wrong shape
    #[error("Invalid parameter: {field} ({reason})")]
    InvalidParameter { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectionError {
    pub fn missing(field: &str, year: u32) -> Self {
        Self::MissingParameter {
            field: field.to_string(),
            year,
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
