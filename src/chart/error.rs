use thiserror::Error;

/// Errors that can occur while loading chart data or driving a chart
#[derive(Debug, Error)]
pub enum ChartError {
    /// I/O error (reading a data file, writing a frame)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural CSV error (unbalanced quotes, ragged rows)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Property file could not be parsed
    #[error("Properties error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (invalid property values that have no usable default)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The same key appeared twice in one snapshot
    #[error("Duplicate key in snapshot: {0}")]
    DuplicateKey(String),

    /// Scale could not be built from the given domain/range
    #[error("Scale error: {0}")]
    Scale(String),
}

/// Type alias for Results using ChartError
pub type Result<T> = std::result::Result<T, ChartError>;
