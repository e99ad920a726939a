//! Error types for loading and querying the name database.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single record line could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The line did not hold a name followed by exactly one rank per decade.
    #[error("expected a name and {expected} ranks, found {found} tokens")]
    WrongTokenCount { expected: usize, found: usize },

    /// A rank token was not an integer.
    #[error("rank '{token}' is not an integer")]
    InvalidRank { token: String },

    /// A rank was an integer but outside `0..=MAX_RANK`.
    #[error("rank {value} is outside 0..={max}")]
    RankOutOfRange { value: i64, max: u16 },
}

/// Errors returned while building a [`crate::database::NameDatabase`].
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The record source could not be opened.
    #[error("name data unavailable at {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading failed part way through the source.
    #[error("failed to read name data: {0}")]
    Read(#[from] std::io::Error),

    /// The first bad record; construction stops here.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        line: usize,
        #[source]
        reason: RecordError,
    },
}

/// Errors returned by [`crate::database::NameDatabase::lookup`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("No name in database: {name}")]
    NameNotFound { name: String },
}
