//! Error types for the analytics engine.

use thiserror::Error;

/// All errors produced by engine operations.
///
/// Every error is returned to the immediate caller; the engine never retries
/// or swallows one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// The operation needs at least one value or row and got none.
    #[error("input is empty")]
    EmptyInput,
    /// The operation needs more values than it received.
    #[error("need at least {min_required} values, got {actual}")]
    InsufficientData { min_required: usize, actual: usize },
    /// Paired sequences differ in length.
    #[error("expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// A row has no cell at the requested column index.
    #[error("row {row} has {len} cells, column index {column} is out of range")]
    RowTooShort { row: usize, column: usize, len: usize },
    /// A cell could not be parsed as a number.
    #[error("row {row}, column {column}: '{value}' is not a number")]
    ParseFailure {
        row: usize,
        column: usize,
        value: String,
    },
    /// A named column does not exist in the header.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },
    /// A group or pivot key does not exist.
    #[error("key '{key}' not found")]
    KeyNotFound { key: String },
    /// A correlation denominator is zero (one sequence is constant).
    #[error("zero variance in correlation input")]
    ZeroVariance,
    /// A standard deviation of zero made a standardised score undefined.
    #[error("standard deviation is zero")]
    DegenerateDistribution,
    /// An enumerated method or function name is not recognised.
    #[error("unknown method '{name}'")]
    UnknownMethod { name: String },
    /// An enumerated operator or order is not supported.
    #[error("unsupported operation '{name}'")]
    UnsupportedOperation { name: String },
    /// A numeric parameter is outside its valid range.
    #[error("invalid {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
    /// A value is outside the domain of a transform (e.g. log of a non-positive number).
    #[error("row {row}: value {value} is outside the transform's domain")]
    OutOfDomain { row: usize, value: f64 },
}

/// Coarse classification used by callers to map errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    InsufficientData,
    DimensionMismatch,
    ParseFailure,
    ColumnNotFound,
    KeyNotFound,
    ZeroVariance,
    DegenerateDistribution,
    UnknownMethod,
    UnsupportedOperation,
    InvalidArgument,
}

impl AnalyticsError {
    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::DimensionMismatch { .. } | Self::RowTooShort { .. } => {
                ErrorKind::DimensionMismatch
            }
            Self::ParseFailure { .. } => ErrorKind::ParseFailure,
            Self::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            Self::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Self::ZeroVariance => ErrorKind::ZeroVariance,
            Self::DegenerateDistribution => ErrorKind::DegenerateDistribution,
            Self::UnknownMethod { .. } => ErrorKind::UnknownMethod,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::InvalidArgument { .. } | Self::OutOfDomain { .. } => ErrorKind::InvalidArgument,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
