use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Error type covering the failures that can occur while a population table
/// is loaded, resolved, aggregated, or exported.
///
/// Every variant is terminal for the current render pass: callers report it
/// and stop before any chart data is produced.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The source could not be read or decoded into a table.
    #[error("cannot read source {origin}: {reason}")]
    SourceUnreadable { origin: String, reason: String },

    /// The administrative-region column is absent from the header.
    #[error("required column '{0}' not found in header")]
    MissingRequiredColumn(String),

    /// No column header matched the per-age total pattern.
    #[error("no age columns found among {column_count} columns")]
    NoAgeColumnsFound { column_count: usize },

    /// Two qualifying columns resolved to the same age.
    #[error("age {age} appears in both '{first}' and '{second}'")]
    DuplicateAge {
        age: u32,
        first: String,
        second: String,
    },

    /// A qualifying column carried an age above the configured ceiling.
    #[error("column '{column}' resolves to age {age}, above the ceiling of {ceiling}")]
    AgeOutOfRange {
        column: String,
        age: u32,
        ceiling: u32,
    },

    /// A population cell still held non-digit characters after separator stripping.
    #[error("malformed count '{value}' in column '{column}' for region '{region}'")]
    MalformedCount {
        region: String,
        column: String,
        value: String,
    },

    /// A summed count no longer fits in 64 bits.
    #[error("count for region '{region}' in column '{column}' overflows")]
    CountOverflow { region: String, column: String },

    /// Aggregation was requested without any region selected.
    #[error("no region selected")]
    EmptySelection,

    /// One or more selected region keys matched no rows.
    #[error("unknown region(s): {}", .0.join(", "))]
    UnknownRegion(Vec<String>),

    /// A render was requested before any table was loaded.
    #[error("no population table loaded")]
    NotLoaded,

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a configuration value cannot be honoured.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl DashboardError {
    pub(crate) fn unreadable(origin: impl Into<String>, reason: impl ToString) -> Self {
        DashboardError::SourceUnreadable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}
