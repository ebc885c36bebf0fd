use crate::node::NodeKind;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlockParError>;

#[derive(Debug, Error)]
pub enum BlockParError {
    /// A named parameter or block (or the `index`-th occurrence of it) does not exist.
    #[error("{kind} `{name}` (occurrence {index}) not found")]
    NotFound {
        kind: NodeKind,
        name: String,
        index: usize,
    },

    #[error("{what} index {index} is out of range (len={len})")]
    Range {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("node at position {position} is {found}, expected {expected}")]
    TypeMismatch {
        position: usize,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("value `{value}` is not a valid {expected}")]
    Format {
        value: String,
        expected: &'static str,
    },

    #[error("Offset {offset} (line {line}, column {column}): {reason}")]
    Parse {
        offset: usize,
        line: usize,
        column: usize,
        reason: ParseErrorReason,
    },

    #[error("cannot resolve path `{path}` at segment `{segment}`: {reason}")]
    Path {
        path: String,
        segment: String,
        reason: &'static str,
    },

    /// Errors related to the file collaborator
    #[error("Failed to read or write {}: {source}", .path.display())]
    Io { source: io::Error, path: PathBuf },

    #[error("An I/O error has occurred: {source}")]
    Stream {
        #[from]
        source: io::Error,
    },

    #[error("Failed to decode text as {encoding}: {message}")]
    Decode {
        encoding: &'static str,
        message: String,
    },

    #[error("Failed to encode text as {encoding}: {message}")]
    Encode {
        encoding: &'static str,
        message: String,
    },
}

/// What exactly went wrong while parsing a text document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorReason {
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    #[error("`}}` without a matching `{{`")]
    UnmatchedCloseBrace,
    #[error("block `{0}` is never closed")]
    UnclosedBlock(String),
    #[error("expected `=` or `{{` after `{0}`")]
    MissingEquals(String),
    #[error("expected a name, found `{0}`")]
    ExpectedName(char),
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

impl BlockParError {
    pub(crate) fn range(what: &'static str, index: usize, len: usize) -> Self {
        BlockParError::Range { what, index, len }
    }

    pub(crate) fn format(value: &str, expected: &'static str) -> Self {
        BlockParError::Format {
            value: value.to_owned(),
            expected,
        }
    }

    pub(crate) fn param_not_found(name: &str, index: usize) -> Self {
        BlockParError::NotFound {
            kind: NodeKind::Param,
            name: name.to_owned(),
            index,
        }
    }

    pub(crate) fn block_not_found(name: &str) -> Self {
        BlockParError::NotFound {
            kind: NodeKind::Block,
            name: name.to_owned(),
            index: 0,
        }
    }

    /// Source offset (in bytes) for parse errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            BlockParError::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
