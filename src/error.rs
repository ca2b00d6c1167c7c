//! Error types for position conversion.
//!
//! Every failure carries the offending value and the bound it violated so
//! callers can log it or turn it into a protocol error. None of these are
//! programming errors: a stale position from an old document version is an
//! expected input.

use std::fmt;

use thiserror::Error;

/// Unit a column is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnUnit {
    Bytes,
    Utf16,
}

impl fmt::Display for ColumnUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnUnit::Bytes => f.write_str("bytes"),
            ColumnUnit::Utf16 => f.write_str("UTF-16 code units"),
        }
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An offset or parser position lies outside its file.
    OutOfRange,
    /// A line index is past the last line.
    InvalidLine,
    /// A column is past the end of its line or splits a character.
    InvalidColumn,
    /// A range is inverted, or edits overlap.
    InvalidRange,
    /// A document update arrived with a version that is not newer.
    StaleVersion,
    /// No document is open under the given uri.
    DocumentNotFound,
}

/// Error type for all mapping operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Parser position outside `[base, base + size]` of a file.
    #[error("pos {pos} is not in range [{base}:{end}] of file {file}")]
    PosOutOfRange {
        pos: usize,
        file: String,
        base: usize,
        end: usize,
    },

    /// Byte offset outside `[0, size]` of a file.
    #[error("offset {offset} is not in range for file {file} of size {size}")]
    OffsetOutOfRange {
        offset: usize,
        file: String,
        size: usize,
    },

    /// A file does not fit in what is left of the position space.
    #[error("file {file} of size {size} does not fit in the position space at base {base}")]
    PositionSpaceExhausted {
        file: String,
        size: usize,
        base: usize,
    },

    #[error("line {line} is out of range (file has {line_count} lines)")]
    InvalidLine { line: u32, line_count: usize },

    #[error("column {column} is beyond end of line {line} ({len} {unit})")]
    ColumnOutOfRange {
        line: u32,
        column: usize,
        len: usize,
        unit: ColumnUnit,
    },

    #[error("byte column {column} of line {line} is not on a character boundary")]
    NotCharBoundary { line: u32, column: usize },

    #[error("invalid range: end offset {end} precedes start offset {start}")]
    InvertedRange { start: usize, end: usize },

    #[error("overlapping edits: {previous:?} overlaps {next:?}")]
    OverlappingEdits {
        previous: std::ops::Range<usize>,
        next: std::ops::Range<usize>,
    },

    #[error("stale version {received} for {uri} (current version is {current})")]
    StaleVersion {
        uri: String,
        current: i32,
        received: i32,
    },

    #[error("document not found: {uri}")]
    DocumentNotFound { uri: String },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PosOutOfRange { .. }
            | Error::OffsetOutOfRange { .. }
            | Error::PositionSpaceExhausted { .. } => ErrorKind::OutOfRange,
            Error::InvalidLine { .. } => ErrorKind::InvalidLine,
            Error::ColumnOutOfRange { .. } | Error::NotCharBoundary { .. } => {
                ErrorKind::InvalidColumn
            }
            Error::InvertedRange { .. } | Error::OverlappingEdits { .. } => {
                ErrorKind::InvalidRange
            }
            Error::StaleVersion { .. } => ErrorKind::StaleVersion,
            Error::DocumentNotFound { .. } => ErrorKind::DocumentNotFound,
        }
    }

    /// Create a document not found error.
    pub fn document_not_found(uri: impl Into<String>) -> Self {
        Error::DocumentNotFound { uri: uri.into() }
    }
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;
