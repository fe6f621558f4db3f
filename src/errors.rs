//! Error types for ephemeris I/O and interpolation
//!
//! Two tiers of conditions exist. Fatal format violations (bad declaration
//! line, wrong file signature, group label or constant count mismatches) mean
//! the input is not a valid instance of the format and abort the operation.
//! Soft conditions (end of stream while reading a block, a query outside the
//! ephemeris validity window) are reported as distinguishable results the
//! caller can act on.

use thiserror::Error;

/// Main error type for ephemeris operations
#[derive(Error, Debug)]
pub enum EphError {
    /// Error when an underlying stream operation fails
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when the file format is invalid or unsupported
    #[error("invalid ephemeris format: {0}")]
    InvalidFormat(String),

    /// Error when a GROUP label in a text header is not the expected one
    #[error("badly formed header; expected {expected:?}, found {found:?}")]
    GroupMismatch {
        /// The 12-character label the reader expected
        expected: String,
        /// What the stream actually contained
        found: String,
    },

    /// Error when the constant name and value counts disagree
    #[error("number of constant names ({names}) and values ({values}) not equal")]
    ConstantCountMismatch {
        /// Count declared by the name section
        names: usize,
        /// Count declared by the value section
        values: usize,
    },

    /// Error when a date is outside the range covered by the ephemeris
    #[error("date {jd} is outside ephemeris range ({start_jd}..{end_jd})")]
    OutOfRange {
        /// The Julian date that was requested
        jd: f64,
        /// The start of the ephemeris range
        start_jd: f64,
        /// The end of the ephemeris range
        end_jd: f64,
    },

    /// Error when a data block needed for interpolation ends prematurely
    #[error("ephemeris data ends before block {block} is complete")]
    TruncatedData {
        /// The 0-based block index that could not be read
        block: usize,
    },
}

/// Result type for ephemeris operations
pub type Result<T> = std::result::Result<T, EphError>;
