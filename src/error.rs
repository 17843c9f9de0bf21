//! Error type for the reconciliation and aggregation stages.

use std::fmt;
use thiserror::Error;

/// Result alias for the algorithmic stages.
pub type Result<T> = std::result::Result<T, RefmodError>;

/// Which sequence a cursor ran off the end of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Reference,
    Query,
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceKind::Reference => f.write_str("reference"),
            SequenceKind::Query => f.write_str("query"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefmodError {
    #[error("malformed edit script '{script}': {reason}")]
    MalformedEditScript { script: String, reason: String },

    #[error("unsupported edit operation '{op}' in alignment of query '{query_id}'")]
    UnknownEditOperation { query_id: String, op: char },

    #[error("modification code '{code}' not found in dictionary column '{column}'")]
    DictionaryLookup { column: String, code: char },

    #[error(
        "edit script of query '{query_id}' runs past the end of the {sequence} \
         (cursor {cursor}, length {length})"
    )]
    SequenceLengthMismatch {
        query_id: String,
        sequence: SequenceKind,
        cursor: usize,
        length: usize,
    },

    #[error("reference file '{path}' contains no header or sequence")]
    MissingReferenceHeader { path: String },

    #[error("no query sequence named '{query_id}'")]
    MissingQuery { query_id: String },

    #[error("alignment of query '{query_id}' has invalid reference start {ref_start}")]
    InvalidAnchor { query_id: String, ref_start: u64 },

    #[error("invalid Positions value '{value}': expected '<start>-<end>'")]
    InvalidPositions { value: String },
}
