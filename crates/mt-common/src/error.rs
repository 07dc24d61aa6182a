//! Error types for Markov Tagger.
//!
//! Structured error handling with stable error codes for machine parsing and
//! category classification for grouping. Configuration errors fail fast with
//! a descriptive message; numerical edge cases inside the estimators are
//! handled by named substitution policies and never surface here as
//! NaN/Infinity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Markov Tagger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid configuration (order, smoothing method, trainer settings).
    Config,
    /// Counting and probability estimation errors.
    Estimation,
    /// Decoding and scoring errors.
    Decode,
    /// Persistence and record-format errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Estimation => write!(f, "estimation"),
            ErrorCategory::Decode => write!(f, "decode"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Markov Tagger.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("invalid model order {order}: order must be at least 1")]
    InvalidOrder { order: usize },

    #[error("unknown smoothing method: {0:?}")]
    UnknownSmoothingMethod(String),

    #[error("invalid trainer configuration: {0}")]
    InvalidTrainerConfig(String),

    // Estimation errors (20-29)
    #[error("cannot estimate a model from an empty sample set")]
    EmptyTrainingData,

    #[error("labeled sample has {states} states but {observations} observations")]
    SampleLengthMismatch { states: usize, observations: usize },

    #[error("estimation failed: {0}")]
    Estimation(String),

    // Decode errors (30-39)
    #[error("cannot decode an empty observation sequence")]
    EmptyObservationSequence,

    #[error("path has {states} states but {observations} observations")]
    PathLengthMismatch { states: usize, observations: usize },

    #[error("model has no states to decode over")]
    EmptyStateSpace,

    #[error("search width must be at least 1, got {width}")]
    InvalidSearchWidth { width: usize },

    // I/O errors (40-49)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed model record: {0}")]
    MalformedRecord(String),

    #[error("model record count mismatch: expected {expected} {kind} entries, found {found}")]
    RecordCountMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}

impl Error {
    /// Stable error code, grouped by category:
    /// 10-19 configuration, 20-29 estimation, 30-39 decode, 40-49 I/O.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidOrder { .. } => 10,
            Error::UnknownSmoothingMethod(_) => 11,
            Error::InvalidTrainerConfig(_) => 12,
            Error::EmptyTrainingData => 20,
            Error::SampleLengthMismatch { .. } => 21,
            Error::Estimation(_) => 22,
            Error::EmptyObservationSequence => 30,
            Error::PathLengthMismatch { .. } => 31,
            Error::EmptyStateSpace => 32,
            Error::InvalidSearchWidth { .. } => 33,
            Error::Io(_) => 40,
            Error::MalformedRecord(_) => 41,
            Error::RecordCountMismatch { .. } => 42,
        }
    }

    /// Error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidOrder { .. }
            | Error::UnknownSmoothingMethod(_)
            | Error::InvalidTrainerConfig(_) => ErrorCategory::Config,

            Error::EmptyTrainingData
            | Error::SampleLengthMismatch { .. }
            | Error::Estimation(_) => ErrorCategory::Estimation,

            Error::EmptyObservationSequence
            | Error::PathLengthMismatch { .. }
            | Error::EmptyStateSpace
            | Error::InvalidSearchWidth { .. } => ErrorCategory::Decode,

            Error::Io(_) | Error::MalformedRecord(_) | Error::RecordCountMismatch { .. } => {
                ErrorCategory::Io
            }
        }
    }
}
